#![allow(dead_code)]

//! In-memory store and state builders shared by the integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

use shortlink_engine::application::services::auth_service::hash_token;
use shortlink_engine::application::services::{AuthService, LinkService, RedirectService};
use shortlink_engine::domain::click_event::ClickEvent;
use shortlink_engine::domain::entities::{Click, Domain, Link, NewClick, NewLink, Owner};
use shortlink_engine::domain::repositories::{
    ApiToken, ClickRepository, DomainRepository, LinkRepository, TokenRepository, UserRepository,
};
use shortlink_engine::error::AppError;
use shortlink_engine::infrastructure::notifier::{Notifier, NotifyError};
use shortlink_engine::state::AppState;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const DEFAULT_DOMAIN: &str = "s.example.com";
pub const DEFAULT_DOMAIN_ID: Uuid = Uuid::from_u128(1);

#[derive(Default)]
struct Tables {
    links: Vec<Link>,
    clicks: Vec<Click>,
    users: HashMap<Uuid, Owner>,
    domains: Vec<Domain>,
    tokens: Vec<ApiToken>,
}

/// Implements every repository trait over plain vectors.
///
/// Mirrors the PostgreSQL constraints the services rely on: globally unique
/// codes and click rows bumping the parent counter.
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        let tables = Tables {
            domains: vec![Domain {
                id: DEFAULT_DOMAIN_ID,
                domain: DEFAULT_DOMAIN.to_string(),
                is_default: true,
                created_at: Utc::now(),
            }],
            ..Tables::default()
        };
        Arc::new(Self {
            tables: Mutex::new(tables),
        })
    }

    pub fn add_owner(&self, email: &str) -> Owner {
        let owner = Owner {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.tables
            .lock()
            .unwrap()
            .users
            .insert(owner.id, owner.clone());
        owner
    }

    pub fn add_domain(&self, name: &str) -> Domain {
        let domain = Domain {
            id: Uuid::new_v4(),
            domain: name.to_string(),
            is_default: false,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().domains.push(domain.clone());
        domain
    }

    /// Issues a raw bearer token for `owner_id` and returns it.
    pub fn issue_token(&self, owner_id: Uuid) -> String {
        let raw = format!("token-{}", Uuid::new_v4());
        let hash = hash_token(SIGNING_SECRET, &raw).unwrap();
        let mut tables = self.tables.lock().unwrap();
        let id = tables.tokens.len() as i64 + 1;
        tables.tokens.push(ApiToken {
            id,
            name: format!("token {id}"),
            token_hash: hash,
            owner_id,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        });
        raw
    }

    pub fn revoke_all_tokens(&self) {
        for token in &mut self.tables.lock().unwrap().tokens {
            token.revoked_at = Some(Utc::now());
        }
    }

    /// Inserts a link directly, bypassing allocation.
    pub fn insert_link(
        &self,
        owner_id: Uuid,
        code: &str,
        destination_url: &str,
        is_active: bool,
        expire_at: Option<DateTime<Utc>>,
    ) -> Link {
        let link = Link {
            id: Uuid::new_v4(),
            owner_id,
            domain_id: DEFAULT_DOMAIN_ID,
            domain: Some(DEFAULT_DOMAIN.to_string()),
            code: code.to_string(),
            destination_url: destination_url.to_string(),
            title: None,
            is_active,
            click_limit: None,
            click_count: 0,
            expire_at,
            password_hash: None,
            created_at: Utc::now(),
            last_accessed_at: None,
        };
        self.tables.lock().unwrap().links.push(link.clone());
        link
    }

    pub fn link(&self, id: Uuid) -> Option<Link> {
        self.tables
            .lock()
            .unwrap()
            .links
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }

    pub fn link_count(&self) -> usize {
        self.tables.lock().unwrap().links.len()
    }

    pub fn clicks(&self) -> Vec<Click> {
        self.tables.lock().unwrap().clicks.clone()
    }

    fn domain_name(tables: &Tables, domain_id: Uuid) -> Option<String> {
        tables
            .domains
            .iter()
            .find(|d| d.id == domain_id)
            .map(|d| d.domain.clone())
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut tables = self.tables.lock().unwrap();

        if tables
            .links
            .iter()
            .any(|l| l.code == new_link.code)
        {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": new_link.code }),
            ));
        }

        let link = Link {
            id: Uuid::new_v4(),
            owner_id: new_link.owner_id,
            domain_id: new_link.domain_id,
            domain: Self::domain_name(&tables, new_link.domain_id),
            code: new_link.code,
            destination_url: new_link.destination_url,
            title: new_link.title,
            is_active: true,
            click_limit: None,
            click_count: 0,
            expire_at: new_link.expire_at,
            password_hash: None,
            created_at: Utc::now(),
            last_accessed_at: None,
        };
        tables.links.push(link.clone());
        Ok(link)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError> {
        Ok(self.link(id))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.links.iter().find(|l| l.code == code).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Link>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut links: Vec<Link> = tables
            .links
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn update(&self, link: &Link) -> Result<Link, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables
            .links
            .iter_mut()
            .find(|l| l.id == link.id)
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "id": link.id })))?;

        stored.destination_url = link.destination_url.clone();
        stored.title = link.title.clone();
        stored.expire_at = link.expire_at;
        stored.is_active = link.is_active;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.links.len();
        tables.links.retain(|l| l.id != id);
        let deleted = tables.links.len() < before;
        if deleted {
            tables.clicks.retain(|c| c.link_id != id);
        }
        Ok(deleted)
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.links.iter().any(|l| l.code == code))
    }

    async fn find_expired_active(&self, now: DateTime<Utc>) -> Result<Vec<Link>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .links
            .iter()
            .filter(|l| l.is_active && l.is_expired_at(now))
            .cloned()
            .collect())
    }

    async fn deactivate(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let mut changed = 0;
        for link in tables.links.iter_mut() {
            if link.is_active && ids.contains(&link.id) {
                link.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn record(&self, click: NewClick) -> Result<Click, AppError> {
        let mut tables = self.tables.lock().unwrap();

        let link = tables
            .links
            .iter_mut()
            .find(|l| l.id == click.link_id)
            .ok_or_else(|| {
                AppError::dependency("Parent link is gone", json!({ "link_id": click.link_id }))
            })?;
        link.click_count += 1;
        link.last_accessed_at = Some(click.clicked_at);

        let click = click.into_click(tables.clicks.len() as i64 + 1);
        tables.clicks.push(click.clone());
        Ok(click)
    }

    async fn count_for_link(&self, link_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.clicks.iter().filter(|c| c.link_id == link_id).count() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, AppError> {
        Ok(self.tables.lock().unwrap().users.get(&id).cloned())
    }

    async fn create(&self, email: &str) -> Result<Owner, AppError> {
        Ok(self.add_owner(email))
    }
}

#[async_trait]
impl DomainRepository for MemoryStore {
    async fn get_default(&self) -> Result<Domain, AppError> {
        let tables = self.tables.lock().unwrap();
        tables
            .domains
            .iter()
            .find(|d| d.is_default)
            .cloned()
            .ok_or_else(|| AppError::dependency("No default domain configured", json!({})))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Domain>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.domains.iter().find(|d| d.id == id).cloned())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn find_owner(&self, token_hash: &str) -> Result<Option<Uuid>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .tokens
            .iter()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .map(|t| t.owner_id))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(token) = tables.tokens.iter_mut().find(|t| t.token_hash == token_hash) {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        name: &str,
        token_hash: &str,
        owner_id: Uuid,
    ) -> Result<ApiToken, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let token = ApiToken {
            id: tables.tokens.len() as i64 + 1,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            owner_id,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tables.tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.tables.lock().unwrap().tokens.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.tokens.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.tokens.iter().find(|t| t.name == name).cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(token) = tables.tokens.iter_mut().find(|t| t.id == id) {
            token.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}

/// Notifier that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
    fail_for: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Makes every message to `recipient` fail.
    pub fn fail_for(&self, recipient: &str) {
        self.fail_for.lock().unwrap().push(recipient.to_string());
    }

    /// `(recipient, subject, body)` of every delivered message.
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.fail_for.lock().unwrap().iter().any(|r| r == recipient) {
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push((
            recipient.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

/// Builds handler state over `store` with a click queue of `capacity`.
pub fn create_test_state(
    store: Arc<MemoryStore>,
    capacity: usize,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(capacity);

    let link_repo: Arc<dyn LinkRepository> = store.clone();
    let domain_repo: Arc<dyn DomainRepository> = store.clone();
    let token_repo: Arc<dyn TokenRepository> = store;

    let state = AppState {
        link_service: Arc::new(LinkService::new(link_repo.clone(), domain_repo.clone())),
        redirect_service: Arc::new(RedirectService::new(link_repo, tx)),
        auth_service: Arc::new(AuthService::new(token_repo, SIGNING_SECRET.to_string())),
        domain_repository: domain_repo,
    };

    (state, rx)
}

/// Polls until `store` holds at least `count` clicks, for up to two seconds.
pub async fn wait_for_clicks(store: &MemoryStore, count: usize) -> Vec<Click> {
    for _ in 0..200 {
        let clicks = store.clicks();
        if clicks.len() >= count {
            return clicks;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("expected {count} clicks, found {}", store.clicks().len());
}
