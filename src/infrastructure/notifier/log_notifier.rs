//! Log-only notifier.

use async_trait::async_trait;
use tracing::info;

use super::{Notifier, NotifyError};

/// Notifier that only logs. Used when no SMTP host is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        info!(recipient, subject, body, "notification (smtp disabled)");
        Ok(())
    }
}
