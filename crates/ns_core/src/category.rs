use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    Business,
    Technology,
    Sports,
    Entertainment,
    Health,
    Science,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Politics,
        Category::Business,
        Category::Technology,
        Category::Sports,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| Error::InvalidRequest(format!("Unknown category: {}", s)))
    }
}

/// Keyword table scanned in order; the first category with a matching
/// keyword wins.
const KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Business, &["business", "economy", "market", "finance", "stock", "company"]),
    (Category::Technology, &["technology", "tech", "ai", "software", "digital", "cyber"]),
    (Category::Health, &["health", "medical", "medicine", "healthcare", "disease", "vaccine"]),
    (Category::Sports, &["sports", "football", "basketball", "soccer", "olympics", "game"]),
    (Category::Entertainment, &["entertainment", "movie", "music", "celebrity", "film", "show"]),
    (Category::Science, &["science", "research", "study", "discovery", "space", "climate"]),
    (Category::Politics, &["politics", "government", "election", "policy", "president", "minister"]),
];

/// Classify an article from its title and description. Keywords are matched as
/// plain substrings of the lowercased text.
pub fn infer_category(title: &str, description: &str) -> Category {
    let text = format!("{} {}", title, description).to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_category_first_match_wins() {
        // "market" (business) is listed before "software" (technology)
        assert_eq!(infer_category("Software market booms", ""), Category::Business);
        assert_eq!(infer_category("New software release", ""), Category::Technology);
    }

    #[test]
    fn test_infer_category_uses_description() {
        assert_eq!(
            infer_category("Big night in town", "The home team won the game"),
            Category::Sports
        );
    }

    #[test]
    fn test_infer_category_defaults_to_general() {
        assert_eq!(infer_category("Quiet afternoon", ""), Category::General);
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(" Health ".parse::<Category>().unwrap(), Category::Health);
        assert!("weather".parse::<Category>().is_err());
    }
}
