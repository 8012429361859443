//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};
use std::net::IpAddr;
use uuid::Uuid;

/// Raw request metadata captured on the redirect path.
///
/// Nothing here is parsed yet; the ingestion pipeline resolves the client
/// IP and classifies the user agent off the request path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestMeta {
    /// Raw `X-Forwarded-For` header value.
    pub forwarded_for: Option<String>,
    /// Transport peer address.
    pub peer_ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// A redirect that should be recorded as a click.
///
/// Sent from the redirect path to the click worker through a bounded
/// channel, so the HTTP response never waits on enrichment or the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub link_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub meta: RequestMeta,
}

impl ClickEvent {
    /// Creates an event stamped with the current time.
    pub fn new(link_id: Uuid, meta: RequestMeta) -> Self {
        Self {
            link_id,
            occurred_at: Utc::now(),
            meta,
        }
    }
}
