use ns_core::{Article, Category, LocationContext, LocationPreference};

use crate::state::{AdInteraction, AppState, User};

/// Partial preferences; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesUpdate {
    pub categories: Option<Vec<Category>>,
    pub location_preference: Option<LocationPreference>,
    pub selected_location: Option<Option<LocationContext>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdRevenueUpdate {
    pub total_earnings: Option<f64>,
    pub today_earnings: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewsOutcome {
    Loaded(Vec<Article>),
    /// User-facing message
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetUser(Option<User>),
    SetLoading(bool),
    SetLocationLoading(bool),
    SetError(Option<String>),
    SetLocation(Option<LocationContext>),
    SetPreferences(PreferencesUpdate),
    NewsRequested { sequence: u64 },
    NewsSettled { sequence: u64, outcome: NewsOutcome },
    SetNews(Vec<Article>),
    RecordAdInteraction(AdInteraction),
    UpdateAdRevenue(AdRevenueUpdate),
    ToggleTheme,
    SetInitialized(bool),
    Logout,
}

/// Compute the next state. Pure: no I/O, no clocks.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::SetUser(user) => {
            next.is_authenticated = user.is_some();
            next.user = user;
        }
        Action::SetLoading(loading) => next.loading = loading,
        Action::SetLocationLoading(loading) => next.location_loading = loading,
        Action::SetError(error) => next.error = error,
        Action::SetLocation(location) => next.location = location,
        Action::SetPreferences(update) => {
            if let Some(categories) = update.categories {
                next.preferences.categories = dedup_categories(categories);
            }
            if let Some(preference) = update.location_preference {
                next.preferences.location_preference = preference;
            }
            if let Some(selected) = update.selected_location {
                next.preferences.selected_location = selected;
            }
        }
        Action::NewsRequested { sequence } => {
            next.news_requested = next.news_requested.max(sequence);
            next.news_loading = true;
            next.error = None;
        }
        Action::NewsSettled { sequence, outcome } => {
            // an older load finishing late must not overwrite a newer one
            if sequence > next.news_applied {
                next.news_applied = sequence;
                match outcome {
                    NewsOutcome::Loaded(articles) => next.news = articles,
                    NewsOutcome::Failed(message) => next.error = Some(message),
                }
            }
            if sequence >= next.news_requested {
                next.news_loading = false;
            }
        }
        Action::SetNews(articles) => next.news = articles,
        Action::RecordAdInteraction(interaction) => {
            next.ad_revenue.total_earnings += interaction.revenue;
            next.ad_revenue.today_earnings += interaction.revenue;
            next.ad_revenue.interaction_history.push(interaction);
        }
        Action::UpdateAdRevenue(update) => {
            if let Some(total) = update.total_earnings {
                next.ad_revenue.total_earnings = total;
            }
            if let Some(today) = update.today_earnings {
                next.ad_revenue.today_earnings = today;
            }
        }
        Action::ToggleTheme => next.theme = state.theme.toggled(),
        Action::SetInitialized(initialized) => next.initialized = initialized,
        Action::Logout => {
            next = AppState {
                theme: state.theme,
                initialized: true,
                news_requested: state.news_requested,
                news_applied: state.news_applied,
                ..AppState::default()
            };
        }
    }
    next
}

fn dedup_categories(categories: Vec<Category>) -> Vec<Category> {
    let mut unique = Vec::with_capacity(categories.len());
    for category in categories {
        if !unique.contains(&category) {
            unique.push(category);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revenue::{AdType, InteractionKind};
    use crate::state::Theme;
    use chrono::Utc;
    use ns_core::{ArticleOrigin, SourceRef};

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: id.to_string(),
            description: "d".to_string(),
            content: String::new(),
            image_url: None,
            published_at: Utc::now(),
            source: SourceRef::default(),
            url: None,
            category: Category::General,
            location: None,
            views: 0,
            likes: 0,
            comments: 0,
            origin: ArticleOrigin::Store,
        }
    }

    fn apply(state: AppState, actions: Vec<Action>) -> AppState {
        actions.into_iter().fold(state, |s, a| reduce(&s, a))
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::default();
        assert!(!state.is_authenticated);
        assert!(state.location.is_none());
        assert_eq!(state.preferences.location_preference, LocationPreference::Global);
        assert!(state.news.is_empty());
        assert!(!state.initialized);
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn test_stale_result_is_ignored() {
        let state = apply(
            AppState::default(),
            vec![
                Action::NewsRequested { sequence: 1 },
                Action::NewsRequested { sequence: 2 },
                Action::NewsSettled {
                    sequence: 2,
                    outcome: NewsOutcome::Loaded(vec![article("new")]),
                },
                Action::NewsSettled {
                    sequence: 1,
                    outcome: NewsOutcome::Loaded(vec![article("old")]),
                },
            ],
        );
        assert_eq!(state.news[0].id, "new");
        assert!(!state.news_loading);
    }

    #[test]
    fn test_loading_stays_until_latest_settles() {
        let state = apply(
            AppState::default(),
            vec![
                Action::NewsRequested { sequence: 1 },
                Action::NewsRequested { sequence: 2 },
                Action::NewsSettled {
                    sequence: 1,
                    outcome: NewsOutcome::Loaded(vec![article("first")]),
                },
            ],
        );
        assert_eq!(state.news[0].id, "first");
        assert!(state.news_loading);

        let state = reduce(
            &state,
            Action::NewsSettled {
                sequence: 2,
                outcome: NewsOutcome::Failed("Failed to load news. Please try again.".to_string()),
            },
        );
        assert!(!state.news_loading);
        assert_eq!(state.news[0].id, "first");
        assert!(state.error.is_some());
    }

    #[test]
    fn test_preferences_merge() {
        let state = apply(
            AppState::default(),
            vec![
                Action::SetPreferences(PreferencesUpdate {
                    categories: Some(vec![Category::Sports, Category::Health, Category::Sports]),
                    ..Default::default()
                }),
                Action::SetPreferences(PreferencesUpdate {
                    location_preference: Some(LocationPreference::Custom),
                    selected_location: Some(Some(LocationContext::coordinates(1.0, 2.0))),
                    ..Default::default()
                }),
            ],
        );
        assert_eq!(state.preferences.categories, vec![Category::Sports, Category::Health]);
        assert_eq!(state.preferences.location_preference, LocationPreference::Custom);
        assert!(state.preferences.selected_location.is_some());
    }

    #[test]
    fn test_logout_keeps_theme_and_initialized() {
        let user = User {
            id: "u1".to_string(),
            email: None,
            display_name: None,
        };
        let state = apply(
            AppState::default(),
            vec![
                Action::SetUser(Some(user)),
                Action::ToggleTheme,
                Action::SetNews(vec![article("a")]),
            ],
        );
        assert!(state.is_authenticated);
        assert_eq!(state.theme, Theme::Dark);

        let state = reduce(&state, Action::Logout);
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.news.is_empty());
        assert_eq!(state.theme, Theme::Dark);
        assert!(state.initialized);
    }

    #[test]
    fn test_ad_interactions_accumulate() {
        let click = AdInteraction {
            ad_id: "ad-1".to_string(),
            kind: InteractionKind::Click,
            ad_type: AdType::Native,
            revenue: 0.08,
            timestamp: Utc::now(),
        };
        let state = apply(
            AppState::default(),
            vec![
                Action::RecordAdInteraction(click.clone()),
                Action::RecordAdInteraction(click),
            ],
        );
        assert_eq!(state.ad_revenue.interaction_history.len(), 2);
        assert!((state.ad_revenue.total_earnings - 0.16).abs() < 1e-9);

        let state = reduce(
            &state,
            Action::UpdateAdRevenue(AdRevenueUpdate {
                today_earnings: Some(0.0),
                ..Default::default()
            }),
        );
        assert_eq!(state.ad_revenue.today_earnings, 0.0);
        assert!((state.ad_revenue.total_earnings - 0.16).abs() < 1e-9);
    }
}
