use async_trait::async_trait;
use ns_core::LocationError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Upper bound on how long a position request may take
    pub timeout: Duration,
    /// A previous fix younger than this is reused instead of asking again
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Permission-gated access to the device's position.
#[async_trait]
pub trait PlatformGeolocation: Send + Sync {
    async fn permission_state(&self) -> PermissionState;

    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, LocationError>;
}

/// A platform without any positioning hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

#[async_trait]
impl PlatformGeolocation for UnsupportedPlatform {
    async fn permission_state(&self) -> PermissionState {
        PermissionState::Unsupported
    }

    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Coordinates supplied up front, e.g. from command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(Coordinates { latitude, longitude })
    }
}

#[async_trait]
impl PlatformGeolocation for FixedPosition {
    async fn permission_state(&self) -> PermissionState {
        PermissionState::Granted
    }

    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}
