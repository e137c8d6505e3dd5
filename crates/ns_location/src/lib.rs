//! Location resolution for the news feed: device, IP and free-text modes,
//! plus a few geographic helpers.

pub mod geo;
pub mod geocode;
pub mod platform;
pub mod resolver;

pub use geo::{distance_km, location_options, news_radius_km, LocationOption, LocationScope, PopularLocation, POPULAR_LOCATIONS};
pub use geocode::GeocodingConfig;
pub use platform::{Coordinates, FixedPosition, PermissionState, PlatformGeolocation, PositionOptions, UnsupportedPlatform};
pub use resolver::{LocationResolver, ResolveMode};
