use chrono::{DateTime, Utc};
use ns_core::{Article, LocationContext, Preferences};
use serde::{Deserialize, Serialize};

use crate::revenue::{AdType, InteractionKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdInteraction {
    pub ad_id: String,
    pub kind: InteractionKind,
    pub ad_type: AdType,
    pub revenue: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdRevenue {
    pub total_earnings: f64,
    pub today_earnings: f64,
    pub interaction_history: Vec<AdInteraction>,
}

/// Everything a client renders. Replaced wholesale on every dispatch.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub location: Option<LocationContext>,
    pub location_loading: bool,
    pub preferences: Preferences,
    pub news: Vec<Article>,
    pub news_loading: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub ad_revenue: AdRevenue,
    pub theme: Theme,
    pub initialized: bool,
    /// Highest news-load sequence number dispatched so far
    pub news_requested: u64,
    /// Sequence number of the load whose outcome is currently shown
    pub news_applied: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let value = serde_json::to_value(AppState::default()).unwrap();
        assert_eq!(value["theme"], "light");
        assert_eq!(value["newsLoading"], false);
        assert_eq!(value["preferences"]["locationPreference"], "global");
        assert!(value["adRevenue"]["interactionHistory"].as_array().unwrap().is_empty());
    }
}
