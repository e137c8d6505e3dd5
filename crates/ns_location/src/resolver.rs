use async_trait::async_trait;
use ns_core::{LocationContext, LocationError, Locator};
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::geocode::{ForwardGeocodeResponse, GeocodingConfig, IpLocationResponse, ReverseGeocodeResponse};
use crate::platform::{Coordinates, PermissionState, PlatformGeolocation, PositionOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveMode {
    /// Platform geolocation, enriched by reverse geocoding
    Device,
    /// IP based lookup
    Ip,
    /// Forward geocoding of free text
    Custom(String),
}

pub struct LocationResolver {
    client: Client,
    config: GeocodingConfig,
    platform: Arc<dyn PlatformGeolocation>,
    options: PositionOptions,
    last_fix: Mutex<Option<(Instant, Coordinates)>>,
}

impl LocationResolver {
    pub fn new(config: GeocodingConfig, platform: Arc<dyn PlatformGeolocation>) -> Self {
        Self {
            client: Client::new(),
            config,
            platform,
            options: PositionOptions::default(),
            last_fix: Mutex::new(None),
        }
    }

    pub fn with_position_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn resolve(&self, mode: &ResolveMode) -> Result<LocationContext, LocationError> {
        match mode {
            ResolveMode::Device => self.locate_device().await,
            ResolveMode::Ip => self.lookup_ip().await,
            ResolveMode::Custom(query) => self.forward_geocode(query).await,
        }
    }

    /// Device location, falling back to the IP lookup when the device path is
    /// denied, times out or is unsupported.
    pub async fn resolve_current(&self) -> Result<LocationContext, LocationError> {
        match self.locate_device().await {
            Ok(location) => Ok(location),
            Err(e @ (LocationError::PermissionDenied | LocationError::Timeout | LocationError::Unsupported)) => {
                info!("📍 Device location unavailable ({}), falling back to IP lookup", e);
                self.lookup_ip().await
            }
            Err(e) => Err(e),
        }
    }

    async fn locate_device(&self) -> Result<LocationContext, LocationError> {
        let coords = self.device_position().await?;
        match self.reverse_geocode(coords).await {
            Ok(location) => Ok(location),
            Err(e) => {
                warn!("Reverse geocoding failed, returning coordinates only: {}", e);
                Ok(LocationContext::coordinates(coords.latitude, coords.longitude))
            }
        }
    }

    async fn device_position(&self) -> Result<Coordinates, LocationError> {
        if self.platform.permission_state().await == PermissionState::Denied {
            return Err(LocationError::PermissionDenied);
        }

        if let Some(coords) = self.cached_fix() {
            debug!("Reusing cached device position");
            return Ok(coords);
        }

        let coords = tokio::time::timeout(self.options.timeout, self.platform.current_position(&self.options))
            .await
            .map_err(|_| LocationError::Timeout)??;

        if let Ok(mut last_fix) = self.last_fix.lock() {
            *last_fix = Some((Instant::now(), coords));
        }
        Ok(coords)
    }

    fn cached_fix(&self) -> Option<Coordinates> {
        let last_fix = self.last_fix.lock().ok()?;
        last_fix
            .filter(|(at, _)| at.elapsed() <= self.options.maximum_age)
            .map(|(_, coords)| coords)
    }

    pub async fn reverse_geocode(&self, coords: Coordinates) -> Result<LocationContext, LocationError> {
        let url = Url::parse_with_params(
            &self.config.reverse_url,
            &[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ],
        )
        .map_err(|e| LocationError::Geocoding(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(LocationError::Geocoding(format!(
                "reverse geocoding service returned {}",
                response.status()
            )));
        }
        let body: ReverseGeocodeResponse = response.json().await?;
        Ok(body.into_context(coords.latitude, coords.longitude))
    }

    pub async fn forward_geocode(&self, query: &str) -> Result<LocationContext, LocationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LocationError::NotFound(query.to_string()));
        }
        let key = self
            .config
            .forward_api_key
            .as_deref()
            .ok_or_else(|| LocationError::Geocoding("no geocoding API key configured".to_string()))?;

        let url = Url::parse_with_params(
            &self.config.forward_url,
            &[("q", query), ("key", key), ("limit", "1")],
        )
        .map_err(|e| LocationError::Geocoding(e.to_string()))?;

        debug!("Geocoding {:?}", query);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(LocationError::Geocoding(format!(
                "geocoding service returned {}",
                response.status()
            )));
        }
        let body: ForwardGeocodeResponse = response.json().await?;
        body.results
            .into_iter()
            .next()
            .map(LocationContext::from)
            .ok_or_else(|| LocationError::NotFound(query.to_string()))
    }

    pub async fn lookup_ip(&self) -> Result<LocationContext, LocationError> {
        let response = self.client.get(&self.config.ip_url).send().await?;
        if !response.status().is_success() {
            return Err(LocationError::Geocoding(format!(
                "IP geolocation service returned {}",
                response.status()
            )));
        }
        let body: IpLocationResponse = response.json().await?;
        if body.error {
            return Err(LocationError::Geocoding(
                body.reason.unwrap_or_else(|| "IP geolocation failed".to_string()),
            ));
        }
        Ok(body.into_context())
    }
}

#[async_trait]
impl Locator for LocationResolver {
    async fn locate_current(&self) -> Result<LocationContext, LocationError> {
        self.resolve_current().await
    }

    async fn locate_by_ip(&self) -> Result<LocationContext, LocationError> {
        self.lookup_ip().await
    }

    async fn geocode(&self, query: &str) -> Result<LocationContext, LocationError> {
        self.forward_geocode(query).await
    }
}
