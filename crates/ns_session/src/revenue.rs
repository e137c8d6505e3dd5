use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdType {
    #[default]
    Display,
    Video,
    Native,
    Banner,
}

impl AdType {
    /// Unrecognized names are billed as display ads.
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "video" => AdType::Video,
            "native" => AdType::Native,
            "banner" => AdType::Banner,
            _ => AdType::Display,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::Display => "display",
            AdType::Video => "video",
            AdType::Native => "native",
            AdType::Banner => "banner",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    View,
    Click,
}

/// Earnings in dollars for one interaction.
pub fn revenue_for(kind: InteractionKind, ad_type: AdType) -> f64 {
    match (kind, ad_type) {
        (InteractionKind::View, AdType::Display) => 0.001,
        (InteractionKind::View, AdType::Video) => 0.005,
        (InteractionKind::View, AdType::Native) => 0.002,
        (InteractionKind::View, AdType::Banner) => 0.0005,
        (InteractionKind::Click, AdType::Display) => 0.05,
        (InteractionKind::Click, AdType::Video) => 0.10,
        (InteractionKind::Click, AdType::Native) => 0.08,
        (InteractionKind::Click, AdType::Banner) => 0.03,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_bills_as_display() {
        let ad_type = AdType::parse_lossy("hologram");
        assert_eq!(ad_type, AdType::Display);
        assert_eq!(revenue_for(InteractionKind::Click, ad_type), 0.05);
        assert_eq!(revenue_for(InteractionKind::View, AdType::parse_lossy("VIDEO")), 0.005);
    }
}
