use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::category::Category;
use crate::error::{Error, LocationError};

/// A resolved geographic context. Place-name fields are empty when unknown,
/// e.g. when only raw device coordinates were available.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationContext {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
    pub country: String,
    pub country_code: String,
    pub formatted: String,
}

impl LocationContext {
    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Default::default()
        }
    }

    pub fn country_code(&self) -> Option<&str> {
        let code = self.country_code.trim();
        (!code.is_empty()).then_some(code)
    }

    /// Country usable as a store filter; the `Global` placeholder is not one.
    pub fn filter_country(&self) -> Option<&str> {
        let country = self.country.trim();
        (!country.is_empty() && country != "Global").then_some(country)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationPreference {
    #[default]
    Global,
    Current,
    Custom,
}

impl LocationPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationPreference::Global => "global",
            LocationPreference::Current => "current",
            LocationPreference::Custom => "custom",
        }
    }
}

impl fmt::Display for LocationPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationPreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "current" => Ok(Self::Current),
            "custom" => Ok(Self::Custom),
            other => Err(Error::InvalidRequest(format!("Unknown location preference: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    /// Preferred categories, deduplicated, in the order the user chose them.
    pub categories: Vec<Category>,
    pub location_preference: LocationPreference,
    pub selected_location: Option<LocationContext>,
}

impl Preferences {
    pub fn primary_category(&self) -> Option<Category> {
        self.categories.first().copied()
    }
}

/// Seam between the session store and the location resolver.
#[async_trait]
pub trait Locator: Send + Sync {
    /// Device location, falling back to IP lookup when the device path is
    /// unavailable.
    async fn locate_current(&self) -> Result<LocationContext, LocationError>;

    /// Low-friction IP based lookup.
    async fn locate_by_ip(&self) -> Result<LocationContext, LocationError>;

    /// Forward-geocode free text such as "Austin, TX".
    async fn geocode(&self, query: &str) -> Result<LocationContext, LocationError>;
}
