//! Link entity representing a short-code mapping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A short link owned by a single user.
///
/// `domain` is the joined domain name; it is read-only and only used to
/// render the public short URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub domain_id: Uuid,
    pub domain: Option<String>,
    pub code: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub is_active: bool,
    pub click_limit: Option<i32>,
    pub click_count: i64,
    pub expire_at: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link has an expiry at or before `now`.
    ///
    /// Expiry alone does not block redirects; the sweeper turns expired
    /// links inactive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_at.is_some_and(|e| e <= now)
    }

    pub fn is_owned_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id
    }

    /// Applies the fields present in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: LinkPatch) {
        if let Some(url) = patch.destination_url {
            self.destination_url = url;
        }
        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(expire_at) = patch.expire_at {
            self.expire_at = Some(expire_at);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub owner_id: Uuid,
    pub domain_id: Uuid,
    pub code: String,
    pub destination_url: String,
    pub title: Option<String>,
    pub expire_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged; there is no way to clear a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPatch {
    pub destination_url: Option<String>,
    pub title: Option<String>,
    pub expire_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.destination_url.is_none()
            && self.title.is_none()
            && self.expire_at.is_none()
            && self.is_active.is_none()
    }
}

#[cfg(test)]
pub(crate) fn sample_link(code: &str, owner_id: Uuid) -> Link {
    Link {
        id: Uuid::new_v4(),
        owner_id,
        domain_id: Uuid::new_v4(),
        domain: Some("s.example.com".to_string()),
        code: code.to_string(),
        destination_url: "https://example.com/landing".to_string(),
        title: Some("Landing".to_string()),
        is_active: true,
        click_limit: None,
        click_count: 0,
        expire_at: None,
        password_hash: None,
        created_at: Utc::now(),
        last_accessed_at: None,
    }
}
