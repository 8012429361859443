//! MaxMind City database lookup.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::Reader;
use tracing::trace;

use super::provider::{GeoInfo, GeoLookup};

/// Reads a local `GeoLite2-City.mmdb` / `GeoIP2-City.mmdb` file.
///
/// The reader is loaded into memory once and shared read-only.
pub struct MaxMindGeoLookup {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindGeoLookup {
    pub fn open(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

#[async_trait]
impl GeoLookup for MaxMindGeoLookup {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo> {
        if ip.is_unspecified() || ip.is_loopback() {
            return None;
        }

        let result = self.reader.lookup(ip).ok()?;
        let city: maxminddb::geoip2::City = result.decode().ok()??;

        let country_code = city.country.iso_code.map(String::from);
        let city_name = city.city.names.english.map(|s| s.to_string());

        trace!(%ip, ?country_code, ?city_name, "MaxMind lookup");

        if country_code.is_none() && city_name.is_none() {
            return None;
        }

        Some(GeoInfo {
            country_code,
            city: city_name,
        })
    }

    fn name(&self) -> &'static str {
        "maxmind"
    }
}
