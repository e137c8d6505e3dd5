//! Wire shapes of the geocoding services and their translation into
//! [`LocationContext`].

use ns_core::LocationContext;
use serde::Deserialize;
use std::env;
use std::fmt;

pub const REVERSE_GEOCODE_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";
pub const FORWARD_GEOCODE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";
pub const IP_LOCATION_URL: &str = "https://ipapi.co/json/";

#[derive(Clone)]
pub struct GeocodingConfig {
    pub reverse_url: String,
    pub forward_url: String,
    pub forward_api_key: Option<String>,
    pub ip_url: String,
}

impl GeocodingConfig {
    pub fn from_env() -> Self {
        Self {
            reverse_url: env::var("REVERSE_GEOCODE_URL").unwrap_or_else(|_| REVERSE_GEOCODE_URL.to_string()),
            forward_url: env::var("GEOCODE_URL").unwrap_or_else(|_| FORWARD_GEOCODE_URL.to_string()),
            forward_api_key: env::var("OPENCAGE_API_KEY").ok().filter(|k| !k.is_empty()),
            ip_url: env::var("IP_LOCATION_URL").unwrap_or_else(|_| IP_LOCATION_URL.to_string()),
        }
    }

    /// All three services served from one base URL, e.g. a local mirror.
    pub fn with_base_url(base: &str, forward_api_key: Option<String>) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            reverse_url: format!("{}/reverse", base),
            forward_url: format!("{}/geocode", base),
            forward_api_key: forward_api_key.filter(|k| !k.is_empty()),
            ip_url: format!("{}/ip", base),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            reverse_url: REVERSE_GEOCODE_URL.to_string(),
            forward_url: FORWARD_GEOCODE_URL.to_string(),
            forward_api_key: None,
            ip_url: IP_LOCATION_URL.to_string(),
        }
    }
}

impl fmt::Debug for GeocodingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeocodingConfig")
            .field("reverse_url", &self.reverse_url)
            .field("forward_url", &self.forward_url)
            .field("forward_api_key", &self.forward_api_key.as_ref().map(|_| "<redacted>"))
            .field("ip_url", &self.ip_url)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ReverseGeocodeResponse {
    pub city: String,
    pub locality: String,
    pub principal_subdivision: String,
    pub country_name: String,
    pub country_code: String,
}

impl ReverseGeocodeResponse {
    fn city(&self) -> &str {
        if self.city.is_empty() {
            &self.locality
        } else {
            &self.city
        }
    }

    pub fn into_context(self, latitude: f64, longitude: f64) -> LocationContext {
        let formatted = format_parts(&[self.city(), &self.principal_subdivision, &self.country_name])
            .unwrap_or_else(|| "Unknown Location".to_string());
        LocationContext {
            latitude,
            longitude,
            city: self.city().to_string(),
            state: self.principal_subdivision,
            country: self.country_name,
            country_code: self.country_code,
            formatted,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForwardGeocodeResponse {
    #[serde(default)]
    pub results: Vec<ForwardGeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForwardGeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub components: Components,
    #[serde(default)]
    pub formatted: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Components {
    pub city: Option<String>,
    pub town: Option<String>,
    pub state: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

impl From<ForwardGeocodeResult> for LocationContext {
    fn from(result: ForwardGeocodeResult) -> Self {
        let c = result.components;
        LocationContext {
            latitude: result.geometry.lat,
            longitude: result.geometry.lng,
            city: c.city.or(c.town).unwrap_or_default(),
            state: c.state.or(c.province).unwrap_or_default(),
            country: c.country.unwrap_or_default(),
            country_code: c.country_code.unwrap_or_default(),
            formatted: result.formatted,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IpLocationResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: String,
    pub region: String,
    pub country_name: String,
    pub country_code: String,
    pub error: bool,
    pub reason: Option<String>,
}

impl IpLocationResponse {
    pub fn into_context(self) -> LocationContext {
        let formatted = format_parts(&[&self.city, &self.region, &self.country_name]).unwrap_or_default();
        LocationContext {
            latitude: self.latitude.unwrap_or_default(),
            longitude: self.longitude.unwrap_or_default(),
            city: self.city,
            state: self.region,
            country: self.country_name,
            country_code: self.country_code,
            formatted,
        }
    }
}

fn format_parts(parts: &[&str]) -> Option<String> {
    let present: Vec<&str> = parts.iter().copied().filter(|p| !p.is_empty()).collect();
    (!present.is_empty()).then(|| present.join(", "))
}
