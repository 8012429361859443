//! Geo lookup contract and provider selection.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::maxmind::MaxMindGeoLookup;

/// Location resolved for an IP address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 country code (e.g. "DE", "US").
    pub country_code: Option<String>,
    /// English city name.
    pub city: Option<String>,
}

/// Resolves an IP address to a location.
///
/// Lookups are soft: any failure (private range, missing entry, corrupt
/// database) yields `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

/// Lookup that never resolves anything.
pub struct NullGeoLookup;

#[async_trait]
impl GeoLookup for NullGeoLookup {
    async fn lookup(&self, _ip: IpAddr) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Picks the geo provider for the configured database path.
///
/// A missing or unreadable database disables geo enrichment instead of
/// failing start-up.
pub fn build_geo_lookup(db_path: Option<&str>) -> Arc<dyn GeoLookup> {
    let lookup: Arc<dyn GeoLookup> = match db_path {
        Some(path) => match MaxMindGeoLookup::open(path) {
            Ok(provider) => {
                info!(path, "GeoIP: using MaxMind database");
                Arc::new(provider)
            }
            Err(e) => {
                warn!(path, error = %e, "GeoIP: failed to open MaxMind database, geo disabled");
                Arc::new(NullGeoLookup)
            }
        },
        None => {
            info!("GeoIP: no database configured, geo disabled");
            Arc::new(NullGeoLookup)
        }
    };

    lookup
}
