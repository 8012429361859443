//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record(&self, click: NewClick) -> Result<Click, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO link_clicks (
                link_id, clicked_at, ip_address, country_code, city,
                device, os, browser, referrer, is_bot, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(click.link_id)
        .bind(click.clicked_at)
        .bind(&click.ip_address)
        .bind(&click.country_code)
        .bind(&click.city)
        .bind(&click.device)
        .bind(&click.os)
        .bind(&click.browser)
        .bind(&click.referrer)
        .bind(click.is_bot)
        .bind(&click.user_agent)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE links
            SET click_count = click_count + 1,
                last_accessed_at = GREATEST(COALESCE(last_accessed_at, $2), $2)
            WHERE id = $1
            "#,
        )
        .bind(click.link_id)
        .bind(click.clicked_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(click.into_click(id))
    }

    async fn count_for_link(&self, link_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
