//! PostgreSQL implementation of domain repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::Domain;
use crate::domain::repositories::DomainRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct DomainRow {
    id: Uuid,
    domain: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl From<DomainRow> for Domain {
    fn from(r: DomainRow) -> Self {
        Domain {
            id: r.id,
            domain: r.domain,
            is_default: r.is_default,
            created_at: r.created_at,
        }
    }
}

pub struct PgDomainRepository {
    pool: Arc<PgPool>,
}

impl PgDomainRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DomainRepository for PgDomainRepository {
    async fn get_default(&self) -> Result<Domain, AppError> {
        let row = sqlx::query_as::<_, DomainRow>(
            "SELECT id, domain, is_default, created_at FROM domains WHERE is_default LIMIT 1",
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Domain::from).ok_or_else(|| {
            AppError::dependency(
                "No default domain configured",
                json!({ "hint": "mark one row in domains as is_default" }),
            )
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Domain>, AppError> {
        let row = sqlx::query_as::<_, DomainRow>(
            "SELECT id, domain, is_default, created_at FROM domains WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Domain::from))
    }
}
