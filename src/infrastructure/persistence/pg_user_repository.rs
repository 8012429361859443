//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::Owner;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: Uuid,
    email: String,
}

impl From<OwnerRow> for Owner {
    fn from(r: OwnerRow) -> Self {
        Owner {
            id: r.id,
            email: r.email,
        }
    }
}

pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, AppError> {
        let row = sqlx::query_as::<_, OwnerRow>("SELECT id, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Owner::from))
    }

    async fn create(&self, email: &str) -> Result<Owner, AppError> {
        let row = sqlx::query_as::<_, OwnerRow>(
            "INSERT INTO users (id, email) VALUES ($1, $2) RETURNING id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }
}
