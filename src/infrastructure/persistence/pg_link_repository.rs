//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_code;

/// Columns selected for every link read, joined with the domain name.
const LINK_COLUMNS: &str = r#"
    l.id, l.owner_id, l.domain_id, d.domain, l.code, l.destination_url, l.title,
    l.is_active, l.click_limit, l.click_count, l.expire_at, l.password_hash,
    l.created_at, l.last_accessed_at
"#;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    owner_id: Uuid,
    domain_id: Uuid,
    domain: Option<String>,
    code: String,
    destination_url: String,
    title: Option<String>,
    is_active: bool,
    click_limit: Option<i32>,
    click_count: i64,
    expire_at: Option<DateTime<Utc>>,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    last_accessed_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            owner_id: r.owner_id,
            domain_id: r.domain_id,
            domain: r.domain,
            code: r.code,
            destination_url: r.destination_url,
            title: r.title,
            is_active: r.is_active,
            click_limit: r.click_limit,
            click_count: r.click_count,
            expire_at: r.expire_at,
            password_hash: r.password_hash,
            created_at: r.created_at,
            last_accessed_at: r.last_accessed_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            WITH l AS (
                INSERT INTO links (id, owner_id, domain_id, code, destination_url, title, expire_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            )
            SELECT {LINK_COLUMNS}
            FROM l
            LEFT JOIN domains d ON d.id = l.domain_id
            "#
        );

        sqlx::query_as::<_, LinkRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new_link.owner_id)
            .bind(new_link.domain_id)
            .bind(&new_link.code)
            .bind(&new_link.destination_url)
            .bind(&new_link.title)
            .bind(new_link.expire_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map(Link::from)
            .map_err(|e| {
                if is_unique_violation_on_code(&e) {
                    AppError::conflict(
                        "Short code already exists",
                        json!({ "code": new_link.code }),
                    )
                } else {
                    e.into()
                }
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links l LEFT JOIN domains d ON d.id = l.domain_id WHERE l.id = $1"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links l
            LEFT JOIN domains d ON d.id = l.domain_id
            WHERE l.code = $1
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links l
            LEFT JOIN domains d ON d.id = l.domain_id
            WHERE l.owner_id = $1
            ORDER BY l.created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn update(&self, link: &Link) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            WITH l AS (
                UPDATE links
                SET destination_url = $2,
                    title = $3,
                    expire_at = $4,
                    is_active = $5
                WHERE id = $1
                RETURNING *
            )
            SELECT {LINK_COLUMNS}
            FROM l
            LEFT JOIN domains d ON d.id = l.domain_id
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(link.id)
            .bind(&link.destination_url)
            .bind(&link.title)
            .bind(link.expire_at)
            .bind(link.is_active)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from).ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "id": link.id }))
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM links WHERE code = $1)")
            .bind(code)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(exists)
    }

    async fn find_expired_active(&self, now: DateTime<Utc>) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links l
            LEFT JOIN domains d ON d.id = l.domain_id
            WHERE l.is_active AND l.expire_at IS NOT NULL AND l.expire_at <= $1
            ORDER BY l.expire_at
            "#
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(now)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn deactivate(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result =
            sqlx::query("UPDATE links SET is_active = FALSE WHERE id = ANY($1) AND is_active")
                .bind(ids)
                .execute(self.pool.as_ref())
                .await?;

        Ok(result.rows_affected())
    }
}
