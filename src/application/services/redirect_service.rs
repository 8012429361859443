//! Public redirect resolution.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::click_event::{ClickEvent, RequestMeta};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::normalize_code;

/// Result of a code lookup on the public path.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub link_id: Uuid,
    pub destination_url: String,
    pub is_active: bool,
}

/// Resolves codes for anonymous visitors and hands clicks to ingestion.
pub struct RedirectService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    click_sender: mpsc::Sender<ClickEvent>,
}

impl<L: LinkRepository + ?Sized> RedirectService<L> {
    pub fn new(link_repository: Arc<L>, click_sender: mpsc::Sender<ClickEvent>) -> Self {
        Self {
            link_repository,
            click_sender,
        }
    }

    /// Looks a code up without any owner check.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown code.
    pub async fn resolve(&self, code: &str) -> Result<Resolution, AppError> {
        let code = normalize_code(code);

        let link = self
            .link_repository
            .find_by_code(&code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        Ok(Resolution {
            link_id: link.id,
            destination_url: link.destination_url,
            is_active: link.is_active,
        })
    }

    /// Resolves a code for redirecting and enqueues the click.
    ///
    /// The click is queued without waiting; a full queue drops it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown code and
    /// [`AppError::Inactive`] for a deactivated link. No click is queued in
    /// either case.
    pub async fn redirect(&self, code: &str, meta: RequestMeta) -> Result<String, AppError> {
        let resolution = self.resolve(code).await?;

        if !resolution.is_active {
            return Err(AppError::inactive(
                "Short link is no longer active",
                json!({ "code": normalize_code(code) }),
            ));
        }

        self.enqueue_click(ClickEvent::new(resolution.link_id, meta));

        Ok(resolution.destination_url)
    }

    fn enqueue_click(&self, event: ClickEvent) {
        let link_id = event.link_id;
        match self.click_sender.try_send(event) {
            Ok(()) => debug!(%link_id, "click queued"),
            Err(TrySendError::Full(_)) => {
                metrics::counter!("clicks_dropped_total", "reason" => "queue_full").increment(1);
                warn!(%link_id, "click queue full, dropping click");
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!("clicks_dropped_total", "reason" => "queue_closed").increment(1);
                warn!(%link_id, "click queue closed, dropping click");
            }
        }
    }

    /// Remaining capacity of the click queue, for health checks.
    pub fn queue_capacity(&self) -> usize {
        self.click_sender.capacity()
    }

    pub fn queue_is_closed(&self) -> bool {
        self.click_sender.is_closed()
    }
}
