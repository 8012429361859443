//! Background expiration sweeper.
//!
//! Each sweep finds active links whose expiry has passed, deactivates them
//! in one batch write and then notifies each link's owner by mail. A link
//! picked up by a sweep therefore ends it either deactivated and notified,
//! or deactivated with the notification failure logged.
//!
//! If the batch write fails nobody is notified; the same links are found
//! again on the next sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::Link;
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::error::AppError;
use crate::infrastructure::notifier::{Notifier, NotifyError};

/// Outcome of a single sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Links found expired and still active.
    pub expired: usize,
    /// Rows actually flipped to inactive.
    pub deactivated: u64,
    pub notified: usize,
    pub notify_failed: usize,
    /// Links whose owner record no longer exists.
    pub owner_missing: usize,
}

/// Why a single owner was not notified.
#[derive(Debug, thiserror::Error)]
pub enum OwnerNotifyError {
    #[error("owner lookup failed: {0}")]
    Lookup(#[from] AppError),

    #[error(transparent)]
    Delivery(#[from] NotifyError),
}

pub struct ExpirationSweeper<L, U>
where
    L: LinkRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    link_repository: Arc<L>,
    user_repository: Arc<U>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl<L, U> ExpirationSweeper<L, U>
where
    L: LinkRepository + ?Sized + 'static,
    U: UserRepository + ?Sized + 'static,
{
    pub fn new(
        link_repository: Arc<L>,
        user_repository: Arc<U>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        Self {
            link_repository,
            user_repository,
            notifier,
            interval,
        }
    }

    /// Runs one scan, deactivation and notification pass.
    ///
    /// # Errors
    ///
    /// Returns the store error if the scan or the batch deactivation fails.
    /// Notification failures are counted in the report, not returned.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let expired = self.link_repository.find_expired_active(now).await?;
        let mut report = SweepReport {
            expired: expired.len(),
            ..SweepReport::default()
        };

        if expired.is_empty() {
            debug!("sweep found no expired links");
            return Ok(report);
        }

        let ids: Vec<Uuid> = expired.iter().map(|l| l.id).collect();
        report.deactivated = self.link_repository.deactivate(&ids).await?;
        metrics::counter!("links_expired_total").increment(report.deactivated);

        for link in &expired {
            match self.notify_owner(link).await {
                Ok(true) => report.notified += 1,
                Ok(false) => report.owner_missing += 1,
                Err(e) => {
                    metrics::counter!("expiry_notifications_failed_total").increment(1);
                    warn!(link_id = %link.id, code = %link.code, error = %e, "expiry notification failed");
                    report.notify_failed += 1;
                }
            }
        }

        info!(
            expired = report.expired,
            deactivated = report.deactivated,
            notified = report.notified,
            notify_failed = report.notify_failed,
            "expired links deactivated"
        );

        Ok(report)
    }

    /// Returns `Ok(false)` when the owner is gone and nothing was sent.
    async fn notify_owner(&self, link: &Link) -> Result<bool, OwnerNotifyError> {
        let owner = self.user_repository.find_by_id(link.owner_id).await?;

        let Some(owner) = owner else {
            warn!(link_id = %link.id, owner_id = %link.owner_id, "owner not found, skipping notification");
            return Ok(false);
        };

        let (subject, body) = expiry_message(link);
        self.notifier.notify(&owner.email, &subject, &body).await?;

        Ok(true)
    }

    /// Sweeps immediately, then every interval until `shutdown` flips to
    /// `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Expiration sweeper started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.sweep_once(Utc::now()).await {
                error!(error = %e, "expiration sweep failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Expiration sweeper stopped");
    }

    /// Spawns [`Self::run`] and returns a handle that stops it.
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        SweeperHandle { shutdown_tx, task }
    }
}

/// Subject and HTML body of the expiry mail.
pub fn expiry_message(link: &Link) -> (String, String) {
    let subject = format!("Your link {} has expired", link.code);
    let expired_on = link
        .expire_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "an unknown date".to_string());
    let body = format!(
        "Your short link <b>{}</b> expired on {}.",
        link.code, expired_on
    );
    (subject, body)
}

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper and waits for its current iteration to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "expiration sweeper task panicked");
        }
    }
}
