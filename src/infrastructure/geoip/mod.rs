//! Geo lookup for click enrichment.
//!
//! [`GeoLookup`] is the seam the ingestion pipeline depends on.
//! [`MaxMindGeoLookup`] reads a local GeoLite2/GeoIP2 City database;
//! [`NullGeoLookup`] is used when no database is configured.

pub mod maxmind;
pub mod provider;

pub use maxmind::MaxMindGeoLookup;
pub use provider::{GeoInfo, GeoLookup, NullGeoLookup, build_geo_lookup};

#[cfg(test)]
pub use provider::MockGeoLookup;
