//! Click entity representing a single enriched redirect event.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored click. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub id: i64,
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: String,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub os: Option<String>,
    pub browser: Option<String>,
    pub referrer: Option<String>,
    pub is_bot: bool,
    pub user_agent: Option<String>,
}

/// Enriched click ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: String,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub os: Option<String>,
    pub browser: Option<String>,
    pub referrer: Option<String>,
    pub is_bot: bool,
    pub user_agent: Option<String>,
}

impl NewClick {
    /// Builds the stored form once the database has assigned an id.
    pub fn into_click(self, id: i64) -> Click {
        Click {
            id,
            link_id: self.link_id,
            clicked_at: self.clicked_at,
            ip_address: self.ip_address,
            country_code: self.country_code,
            city: self.city,
            device: self.device,
            os: self.os,
            browser: self.browser,
            referrer: self.referrer,
            is_bot: self.is_bot,
            user_agent: self.user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_click_keeps_fields() {
        let link_id = Uuid::new_v4();
        let now = Utc::now();
        let new_click = NewClick {
            link_id,
            clicked_at: now,
            ip_address: "203.0.113.7".to_string(),
            country_code: Some("DE".to_string()),
            city: Some("Berlin".to_string()),
            device: Some("pc".to_string()),
            os: Some("Linux".to_string()),
            browser: Some("Firefox 128.0".to_string()),
            referrer: None,
            is_bot: false,
            user_agent: Some("Mozilla/5.0".to_string()),
        };

        let click = new_click.into_click(7);

        assert_eq!(click.id, 7);
        assert_eq!(click.link_id, link_id);
        assert_eq!(click.clicked_at, now);
        assert_eq!(click.country_code.as_deref(), Some("DE"));
        assert!(click.referrer.is_none());
    }
}
