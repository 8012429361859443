use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::domain::repositories::{DomainRepository, LinkRepository, TokenRepository};

pub type DynLinkService = LinkService<dyn LinkRepository, dyn DomainRepository>;
pub type DynRedirectService = RedirectService<dyn LinkRepository>;
pub type DynAuthService = AuthService<dyn TokenRepository>;

/// Shared handler state. Services are built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub redirect_service: Arc<DynRedirectService>,
    pub auth_service: Arc<DynAuthService>,
    /// Used by the health check to reach the store.
    pub domain_repository: Arc<dyn DomainRepository>,
}
