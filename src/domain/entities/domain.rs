//! Domain entity: the host name short links are served from.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub id: Uuid,
    pub domain: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Domain {
    /// Public short URL for `code` on this domain. Always HTTPS.
    pub fn short_url(&self, code: &str) -> String {
        short_url(&self.domain, code)
    }
}

pub fn short_url(domain: &str, code: &str) -> String {
    format!("https://{}/{}", domain.trim_end_matches('/'), code)
}
