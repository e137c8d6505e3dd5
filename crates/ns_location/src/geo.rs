use ns_core::LocationPreference;
use serde::Serialize;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres (haversine).
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationScope {
    Neighborhood,
    #[default]
    City,
    State,
    Country,
    Global,
}

/// Radius within which news counts as local; `None` means unlimited.
pub fn news_radius_km(scope: LocationScope) -> Option<f64> {
    match scope {
        LocationScope::Neighborhood => Some(5.0),
        LocationScope::City => Some(50.0),
        LocationScope::State => Some(200.0),
        LocationScope::Country => Some(1000.0),
        LocationScope::Global => None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationOption {
    pub value: LocationPreference,
    pub label: &'static str,
}

pub fn location_options() -> Vec<LocationOption> {
    vec![
        LocationOption {
            value: LocationPreference::Global,
            label: "Global News",
        },
        LocationOption {
            value: LocationPreference::Current,
            label: "Use My Location",
        },
        LocationOption {
            value: LocationPreference::Custom,
            label: "Choose Location...",
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularLocation {
    pub country: &'static str,
    pub country_code: &'static str,
    pub cities: &'static [&'static str],
}

pub const POPULAR_LOCATIONS: &[PopularLocation] = &[
    PopularLocation {
        country: "United States",
        country_code: "US",
        cities: &["New York", "Los Angeles", "Chicago", "Houston"],
    },
    PopularLocation {
        country: "United Kingdom",
        country_code: "GB",
        cities: &["London", "Manchester", "Birmingham", "Liverpool"],
    },
    PopularLocation {
        country: "Nigeria",
        country_code: "NG",
        cities: &["Lagos", "Abuja", "Port Harcourt", "Kano"],
    },
    PopularLocation {
        country: "Canada",
        country_code: "CA",
        cities: &["Toronto", "Vancouver", "Montreal", "Calgary"],
    },
    PopularLocation {
        country: "Australia",
        country_code: "AU",
        cities: &["Sydney", "Melbourne", "Brisbane", "Perth"],
    },
    PopularLocation {
        country: "India",
        country_code: "IN",
        cities: &["Mumbai", "Delhi", "Bangalore", "Chennai"],
    },
];
