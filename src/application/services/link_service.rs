//! Link creation, owner-scoped retrieval and mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::slug_allocator::SlugAllocator;
use crate::domain::entities::{Domain, Link, LinkPatch, NewLink};
use crate::domain::repositories::{DomainRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::code_generator::normalize_code;
use crate::utils::destination_url::canonicalize_destination;

/// Insert attempts for a random code that loses a race at insert time.
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Input for [`LinkService::create_link`].
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    pub destination_url: String,
    pub custom_alias: Option<String>,
    pub title: Option<String>,
    pub expire_at: Option<DateTime<Utc>>,
    /// Falls back to the default domain when absent.
    pub domain_id: Option<Uuid>,
}

/// How an owner addresses one of their links.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkRef {
    Id(Uuid),
    Code(String),
}

/// Owner-facing link operations.
///
/// Every operation except [`Self::code_exists`] takes the caller's owner id
/// and refuses to touch links owned by someone else.
pub struct LinkService<L: LinkRepository + ?Sized, D: DomainRepository + ?Sized> {
    link_repository: Arc<L>,
    domain_repository: Arc<D>,
    allocator: SlugAllocator<L>,
}

impl<L: LinkRepository + ?Sized, D: DomainRepository + ?Sized> LinkService<L, D> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>, domain_repository: Arc<D>) -> Self {
        Self {
            allocator: SlugAllocator::new(link_repository.clone()),
            link_repository,
            domain_repository,
        }
    }

    /// Creates a short link for `owner_id`.
    ///
    /// # Code Allocation
    ///
    /// - A custom alias is validated and used as-is, or rejected with a conflict
    /// - Otherwise an 8-character random code is allocated
    /// - If a random code is claimed between the check and the insert, a new
    ///   one is allocated (up to 3 inserts)
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL, alias or domain is invalid.
    /// Returns [`AppError::Conflict`] if the custom alias is taken.
    /// Returns [`AppError::AllocationExhausted`] if no free random code was found
    /// or every random code was claimed before its insert.
    pub async fn create_link(&self, owner_id: Uuid, input: CreateLink) -> Result<Link, AppError> {
        let destination_url = canonicalize_destination(&input.destination_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let domain = self.resolve_domain(input.domain_id).await?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let slug = self.allocator.allocate(input.custom_alias.as_deref()).await?;

            let new_link = NewLink {
                owner_id,
                domain_id: domain.id,
                code: slug.code.clone(),
                destination_url: destination_url.clone(),
                title: input.title.clone(),
                expire_at: input.expire_at,
            };

            match self.link_repository.insert(new_link).await {
                Ok(link) => {
                    info!(link_id = %link.id, code = %link.code, %owner_id, "link created");
                    return Ok(link);
                }
                Err(AppError::Conflict { .. })
                    if !slug.custom && attempt < MAX_INSERT_ATTEMPTS =>
                {
                    warn!(attempt, code = %slug.code, "code claimed concurrently, reallocating");
                }
                Err(AppError::Conflict { .. }) if !slug.custom => {
                    return Err(AppError::exhausted(
                        "Failed to store a unique code",
                        json!({ "attempts": MAX_INSERT_ATTEMPTS }),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolves a link by id or code on behalf of its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no such link exists.
    /// Returns [`AppError::Unauthorized`] if it belongs to another owner.
    pub async fn resolve_for_owner(
        &self,
        link_ref: LinkRef,
        owner_id: Uuid,
    ) -> Result<Link, AppError> {
        let (link, key) = match link_ref {
            LinkRef::Id(id) => (
                self.link_repository.find_by_id(id).await?,
                json!({ "id": id }),
            ),
            LinkRef::Code(code) => {
                let code = normalize_code(&code);
                (
                    self.link_repository.find_by_code(&code).await?,
                    json!({ "code": code }),
                )
            }
        };

        let link = link.ok_or_else(|| AppError::not_found("Short link not found", key))?;

        if !link.is_owned_by(owner_id) {
            return Err(AppError::unauthorized(
                "Link belongs to another owner",
                json!({ "id": link.id }),
            ));
        }

        Ok(link)
    }

    pub async fn get_link(&self, id: Uuid, owner_id: Uuid) -> Result<Link, AppError> {
        self.resolve_for_owner(LinkRef::Id(id), owner_id).await
    }

    pub async fn get_link_by_code(&self, code: &str, owner_id: Uuid) -> Result<Link, AppError> {
        self.resolve_for_owner(LinkRef::Code(code.to_string()), owner_id)
            .await
    }

    /// All links of `owner_id`, newest first.
    pub async fn list_links(&self, owner_id: Uuid) -> Result<Vec<Link>, AppError> {
        self.link_repository.find_by_owner(owner_id).await
    }

    /// Applies the present fields of `patch` to an owned link.
    ///
    /// Absent fields keep their stored values.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve_for_owner`], plus [`AppError::Validation`]
    /// for an invalid destination URL.
    pub async fn update_link(
        &self,
        id: Uuid,
        owner_id: Uuid,
        mut patch: LinkPatch,
    ) -> Result<Link, AppError> {
        let mut link = self.get_link(id, owner_id).await?;

        if let Some(url) = patch.destination_url.take() {
            let url = canonicalize_destination(&url).map_err(|e| {
                AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
            })?;
            patch.destination_url = Some(url);
        }

        if patch.is_empty() {
            return Ok(link);
        }

        link.apply(patch);
        let updated = self.link_repository.update(&link).await?;

        info!(link_id = %updated.id, %owner_id, "link updated");
        Ok(updated)
    }

    /// Deletes an owned link together with its clicks.
    pub async fn delete_link(&self, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let link = self.get_link(id, owner_id).await?;

        if !self.link_repository.delete(link.id).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "id": id }),
            ));
        }

        info!(link_id = %id, %owner_id, "link deleted");
        Ok(())
    }

    /// Reports whether a code is already in use. Read-only.
    pub async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Ok(false);
        }
        self.link_repository.exists_by_code(&code).await
    }

    async fn resolve_domain(&self, domain_id: Option<Uuid>) -> Result<Domain, AppError> {
        match domain_id {
            Some(id) => self.domain_repository.find_by_id(id).await?.ok_or_else(|| {
                AppError::bad_request("Domain not found", json!({ "domain_id": id }))
            }),
            None => self.domain_repository.get_default().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::link::sample_link;
    use crate::domain::repositories::{MockDomainRepository, MockLinkRepository};
    use chrono::Duration;

    fn default_domain() -> Domain {
        Domain {
            id: Uuid::new_v4(),
            domain: "s.example.com".to_string(),
            is_default: true,
            created_at: Utc::now(),
        }
    }

    fn domain_repo_with_default() -> MockDomainRepository {
        let mut repo = MockDomainRepository::new();
        let domain = default_domain();
        repo.expect_get_default()
            .returning(move || Ok(domain.clone()));
        repo
    }

    fn link_from(new_link: NewLink) -> Link {
        Link {
            id: Uuid::new_v4(),
            owner_id: new_link.owner_id,
            domain_id: new_link.domain_id,
            domain: Some("s.example.com".to_string()),
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
        }
    }

    fn service(
        links: MockLinkRepository,
        domains: MockDomainRepository,
    ) -> LinkService<MockLinkRepository, MockDomainRepository> {
        LinkService::new(Arc::new(links), Arc::new(domains))
    }

    #[tokio::test]
    async fn test_create_with_custom_alias() {
        let owner = Uuid::new_v4();
        let mut links = MockLinkRepository::new();
        links
            .expect_exists_by_code()
            .withf(|code| code == "launch-day")
            .times(1)
            .returning(|_| Ok(false));
        links
            .expect_insert()
            .withf(move |l| {
                l.code == "launch-day"
                    && l.owner_id == owner
                    && l.destination_url == "https://example.com/launch"
            })
            .times(1)
            .returning(|l| Ok(link_from(l)));

        let link = service(links, domain_repo_with_default())
            .create_link(
                owner,
                CreateLink {
                    destination_url: "https://EXAMPLE.com/launch#top".to_string(),
                    custom_alias: Some("Launch-Day".to_string()),
                    ..CreateLink::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(link.code, "launch-day");
        assert_eq!(link.destination_url, "https://example.com/launch");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_url_before_touching_store() {
        let mut links = MockLinkRepository::new();
        links.expect_exists_by_code().never();
        links.expect_insert().never();
        let mut domains = MockDomainRepository::new();
        domains.expect_get_default().never();

        let err = service(links, domains)
            .create_link(
                Uuid::new_v4(),
                CreateLink {
                    destination_url: "ftp://example.com".to_string(),
                    ..CreateLink::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_taken_alias_does_not_insert() {
        let mut links = MockLinkRepository::new();
        links.expect_exists_by_code().times(1).returning(|_| Ok(true));
        links.expect_insert().never();

        let err = service(links, domain_repo_with_default())
            .create_link(
                Uuid::new_v4(),
                CreateLink {
                    destination_url: "https://example.com".to_string(),
                    custom_alias: Some("taken".to_string()),
                    ..CreateLink::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_exhausted_persists_nothing() {
        let mut links = MockLinkRepository::new();
        links.expect_exists_by_code().times(10).returning(|_| Ok(true));
        links.expect_insert().never();

        let err = service(links, domain_repo_with_default())
            .create_link(
                Uuid::new_v4(),
                CreateLink {
                    destination_url: "https://example.com".to_string(),
                    ..CreateLink::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AllocationExhausted { .. }));
    }

    #[tokio::test]
    async fn test_create_retries_random_code_on_insert_conflict() {
        let mut links = MockLinkRepository::new();
        links.expect_exists_by_code().times(2).returning(|_| Ok(false));

        let mut seq = mockall::Sequence::new();
        links
            .expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("race", json!({}))));
        links
            .expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|l| Ok(link_from(l)));

        let link = service(links, domain_repo_with_default())
            .create_link(
                Uuid::new_v4(),
                CreateLink {
                    destination_url: "https://example.com".to_string(),
                    ..CreateLink::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(link.code.len(), 8);
    }

    #[tokio::test]
    async fn test_create_random_code_insert_conflicts_exhaust() {
        let mut links = MockLinkRepository::new();
        links
            .expect_exists_by_code()
            .times(MAX_INSERT_ATTEMPTS)
            .returning(|_| Ok(false));
        links
            .expect_insert()
            .times(MAX_INSERT_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("race", json!({}))));

        let err = service(links, domain_repo_with_default())
            .create_link(
                Uuid::new_v4(),
                CreateLink {
                    destination_url: "https://example.com".to_string(),
                    ..CreateLink::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AllocationExhausted { .. }));
    }

    #[tokio::test]
    async fn test_create_custom_alias_insert_conflict_is_not_retried() {
        let mut links = MockLinkRepository::new();
        links.expect_exists_by_code().times(1).returning(|_| Ok(false));
        links
            .expect_insert()
            .times(1)
            .returning(|_| Err(AppError::conflict("race", json!({}))));

        let err = service(links, domain_repo_with_default())
            .create_link(
                Uuid::new_v4(),
                CreateLink {
                    destination_url: "https://example.com".to_string(),
                    custom_alias: Some("contested".to_string()),
                    ..CreateLink::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_unknown_domain_is_validation() {
        let mut links = MockLinkRepository::new();
        links.expect_insert().never();
        let mut domains = MockDomainRepository::new();
        domains.expect_find_by_id().times(1).returning(|_| Ok(None));

        let err = service(links, domains)
            .create_link(
                Uuid::new_v4(),
                CreateLink {
                    destination_url: "https://example.com".to_string(),
                    domain_id: Some(Uuid::new_v4()),
                    ..CreateLink::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_owner_lookup_wrong_owner_is_unauthorized() {
        let owner = Uuid::new_v4();
        let link = sample_link("mine", owner);
        let id = link.id;

        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .withf(move |i| *i == id)
            .returning(move |_| Ok(Some(link.clone())));

        let err = service(links, MockDomainRepository::new())
            .get_link(id, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_owner_lookup_missing_is_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_code().returning(|_| Ok(None));

        let err = service(links, MockDomainRepository::new())
            .get_link_by_code("ghost", Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_owner_lookup_by_code_normalizes() {
        let owner = Uuid::new_v4();
        let link = sample_link("promo", owner);

        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .withf(|code| code == "promo")
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let found = service(links, MockDomainRepository::new())
            .get_link_by_code(" PROMO ", owner)
            .await
            .unwrap();

        assert_eq!(found.code, "promo");
    }

    #[tokio::test]
    async fn test_update_title_only_keeps_other_fields() {
        let owner = Uuid::new_v4();
        let mut link = sample_link("keep", owner);
        let expiry = Utc::now() + Duration::days(7);
        link.expire_at = Some(expiry);
        let id = link.id;
        let original = link.clone();

        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(move |_| Ok(Some(link.clone())));
        links
            .expect_update()
            .withf(move |l| {
                l.title.as_deref() == Some("New title")
                    && l.destination_url == original.destination_url
                    && l.expire_at == Some(expiry)
                    && l.is_active
            })
            .times(1)
            .returning(|l| Ok(l.clone()));

        let updated = service(links, MockDomainRepository::new())
            .update_link(
                id,
                owner,
                LinkPatch {
                    title: Some("New title".to_string()),
                    ..LinkPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title.as_deref(), Some("New title"));
        assert_eq!(updated.expire_at, Some(expiry));
    }

    #[tokio::test]
    async fn test_update_validates_destination() {
        let owner = Uuid::new_v4();
        let link = sample_link("bad-url", owner);
        let id = link.id;

        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(move |_| Ok(Some(link.clone())));
        links.expect_update().never();

        let err = service(links, MockDomainRepository::new())
            .update_link(
                id,
                owner,
                LinkPatch {
                    destination_url: Some("mailto:someone@example.com".to_string()),
                    ..LinkPatch::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_other_owner_does_not_write() {
        let link = sample_link("theirs", Uuid::new_v4());
        let id = link.id;

        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(move |_| Ok(Some(link.clone())));
        links.expect_update().never();

        let err = service(links, MockDomainRepository::new())
            .update_link(
                id,
                Uuid::new_v4(),
                LinkPatch {
                    is_active: Some(false),
                    ..LinkPatch::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_id().returning(|_| Ok(None));
        links.expect_delete().never();

        let err = service(links, MockDomainRepository::new())
            .delete_link(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_owned_link() {
        let owner = Uuid::new_v4();
        let link = sample_link("bye", owner);
        let id = link.id;

        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_id()
            .returning(move |_| Ok(Some(link.clone())));
        links
            .expect_delete()
            .withf(move |i| *i == id)
            .times(1)
            .returning(|_| Ok(true));

        let result = service(links, MockDomainRepository::new())
            .delete_link(id, owner)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_code_exists_is_idempotent() {
        let mut links = MockLinkRepository::new();
        links
            .expect_exists_by_code()
            .withf(|code| code == "abc12345")
            .times(2)
            .returning(|_| Ok(true));
        links.expect_insert().never();
        links.expect_update().never();

        let svc = service(links, MockDomainRepository::new());

        assert!(svc.code_exists("ABC12345").await.unwrap());
        assert!(svc.code_exists("abc12345").await.unwrap());
    }
}
