//! Click enrichment and persistence.

use std::sync::Arc;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::infrastructure::geoip::{GeoInfo, GeoLookup};
use crate::infrastructure::user_agent::classify_user_agent;
use crate::utils::client_ip::resolve_client_ip;

/// Stored user-agent width.
pub const MAX_USER_AGENT_LEN: usize = 512;
/// Stored referrer width.
pub const MAX_REFERRER_LEN: usize = 2083;
/// Stored width of the device, OS and browser columns.
const MAX_LABEL_LEN: usize = 100;

/// Store retries after the first attempt.
const PERSIST_RETRIES: usize = 3;

/// Enriches raw click events and writes them to the store.
///
/// Geo and user-agent failures never fail a click; they only leave the
/// corresponding fields empty.
pub struct ClickIngestionService<C: ClickRepository + ?Sized> {
    click_repository: Arc<C>,
    geo: Arc<dyn GeoLookup>,
    geo_timeout: Duration,
    retry_base: Duration,
}

impl<C: ClickRepository + ?Sized> ClickIngestionService<C> {
    pub fn new(click_repository: Arc<C>, geo: Arc<dyn GeoLookup>, geo_timeout: Duration) -> Self {
        Self {
            click_repository,
            geo,
            geo_timeout,
            retry_base: Duration::from_millis(50),
        }
    }

    /// Overrides the first backoff delay. Tests use a tiny value.
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    /// Derives the stored click from raw request metadata.
    pub async fn enrich(&self, event: &ClickEvent) -> NewClick {
        let meta = &event.meta;
        let ip = resolve_client_ip(meta.forwarded_for.as_deref(), meta.peer_ip);

        let geo = match tokio::time::timeout(self.geo_timeout, self.geo.lookup(ip)).await {
            Ok(geo) => geo.unwrap_or_default(),
            Err(_) => {
                debug!(%ip, provider = self.geo.name(), "geo lookup timed out");
                GeoInfo::default()
            }
        };

        let user_agent = meta
            .user_agent
            .as_deref()
            .map(str::trim)
            .filter(|ua| !ua.is_empty());
        let ua_info = user_agent.map(classify_user_agent).unwrap_or_default();

        NewClick {
            link_id: event.link_id,
            clicked_at: event.occurred_at,
            ip_address: ip.to_string(),
            country_code: geo.country_code,
            city: geo.city.map(|c| truncate(&c, MAX_LABEL_LEN)),
            device: ua_info.device_family.map(|d| truncate(&d, MAX_LABEL_LEN)),
            os: ua_info.os.map(|o| truncate(&o, MAX_LABEL_LEN)),
            browser: ua_info.browser.map(|b| truncate(&b, MAX_LABEL_LEN)),
            referrer: meta
                .referrer
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(|r| truncate(r, MAX_REFERRER_LEN)),
            is_bot: ua_info.is_bot,
            user_agent: user_agent.map(|ua| truncate(ua, MAX_USER_AGENT_LEN)),
        }
    }

    /// Enriches and persists a click, retrying store failures with
    /// exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns the last store error once retries are exhausted.
    pub async fn ingest(&self, event: ClickEvent) -> Result<Click, AppError> {
        let click = self.enrich(&event).await;

        // delays of base*2, base*4, base*8
        let base_ms = self.retry_base.as_millis().max(1) as u64;
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(base_ms)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(PERSIST_RETRIES);

        let link_id = event.link_id;
        let mut attempt = 0usize;
        RetryIf::spawn(
            strategy,
            || {
                attempt += 1;
                let current = attempt;
                let click = click.clone();
                async move {
                    let result = self.click_repository.record(click).await;
                    if let Err(e) = &result {
                        warn!(attempt = current, %link_id, error = %e, "click write failed");
                    }
                    result
                }
            },
            |e: &AppError| matches!(e, AppError::Dependency { .. }),
        )
        .await
    }
}

/// Cuts `s` to at most `max` characters on a char boundary.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
