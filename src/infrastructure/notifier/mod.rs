//! Outbound owner notifications.
//!
//! The expiration sweeper only depends on [`Notifier`]. [`SmtpNotifier`]
//! delivers mail through lettre; [`LogNotifier`] writes the message to the
//! log when SMTP is not configured.

pub mod log_notifier;
pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

pub use log_notifier::LogNotifier;
pub use smtp::{SmtpNotifier, SmtpSettings, TlsMode};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("delivery failed: {0}")]
    Transport(String),
}

/// Sends a message to a single recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, subject: &str, body: &str)
    -> Result<(), NotifyError>;
}

/// Picks the notifier for the configured SMTP settings.
///
/// # Errors
///
/// Fails if SMTP is configured but the transport cannot be built.
pub fn build_notifier(smtp: Option<&SmtpSettings>) -> Result<Arc<dyn Notifier>, NotifyError> {
    match smtp {
        Some(settings) => {
            let notifier = SmtpNotifier::new(settings)?;
            info!(host = %settings.host, port = settings.port, "Notifier: SMTP");
            Ok(Arc::new(notifier))
        }
        None => {
            info!("Notifier: log only (SMTP_HOST not set)");
            Ok(Arc::new(LogNotifier))
        }
    }
}
