use chrono::Utc;
use ns_core::{
    AggregationRequest, Category, Error, LocationContext, LocationPreference, Locator, NewsFeed, Result,
    DEFAULT_PAGE_SIZE,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::action::{reduce, Action, NewsOutcome, PreferencesUpdate};
use crate::revenue::{revenue_for, AdType, InteractionKind};
use crate::state::{AdInteraction, AppState, User};

pub const LOAD_NEWS_FAILED: &str = "Failed to load news. Please try again.";
pub const LOCATION_FAILED: &str =
    "Could not access your location. You can still browse global news or manually select a location.";
pub const CUSTOM_LOCATION_FAILED: &str = "Could not find the specified location. Please try again.";
pub const SEARCH_FAILED: &str = "Search failed. Please try again.";

/// Where a news load takes its location from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LocationChoice {
    /// Derived from the location preference
    #[default]
    FromPreferences,
    Global,
    Explicit(LocationContext),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsQuery {
    pub location: LocationChoice,
    pub category: Option<Category>,
    pub trending: bool,
    pub limit: Option<usize>,
}

impl NewsQuery {
    pub fn global() -> Self {
        Self {
            location: LocationChoice::Global,
            ..Default::default()
        }
    }
}

/// Owns the client state and runs the async actions that feed it.
pub struct SessionStore {
    state: RwLock<AppState>,
    feed: Arc<dyn NewsFeed>,
    locator: Arc<dyn Locator>,
    sequence: AtomicU64,
    page_size: usize,
}

impl SessionStore {
    pub fn new(feed: Arc<dyn NewsFeed>, locator: Arc<dyn Locator>) -> Self {
        Self {
            state: RwLock::new(AppState::default()),
            feed,
            locator,
            sequence: AtomicU64::new(0),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size for loads that do not ask for a limit.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        if page_size > 0 {
            self.page_size = page_size;
        }
        self
    }

    pub fn dispatch(&self, action: Action) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = reduce(&state, action);
    }

    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Global feed first; the IP lookup only starts once it has settled and
    /// runs in the background. The returned handle completes with the lookup.
    pub async fn initialize(self: &Arc<Self>) -> JoinHandle<()> {
        info!("🚀 Initializing session");
        self.dispatch(Action::SetLoading(true));
        self.dispatch(Action::SetError(None));

        self.load_news(NewsQuery::global()).await;

        let store = Arc::clone(self);
        let handle = tokio::spawn(async move { store.locate_in_background().await });

        self.dispatch(Action::SetInitialized(true));
        self.dispatch(Action::SetLoading(false));
        handle
    }

    async fn locate_in_background(&self) {
        match self.locator.locate_by_ip().await {
            Ok(location) => {
                info!("📍 Approximate location: {}", location.formatted);
                self.dispatch(Action::SetLocation(Some(location)));
            }
            Err(e) => debug!("IP location unavailable, staying global: {}", e),
        }
    }

    fn effective_location(state: &AppState, choice: &LocationChoice) -> Option<LocationContext> {
        match choice {
            LocationChoice::Explicit(location) => Some(location.clone()),
            LocationChoice::Global => None,
            LocationChoice::FromPreferences => match state.preferences.location_preference {
                LocationPreference::Current => state.location.clone(),
                LocationPreference::Custom => state.preferences.selected_location.clone(),
                LocationPreference::Global => None,
            },
        }
    }

    fn build_request(&self, query: &NewsQuery) -> AggregationRequest {
        let state = self.snapshot();
        AggregationRequest::global(query.limit.unwrap_or(self.page_size))
            .with_location(Self::effective_location(&state, &query.location))
            .with_category(query.category)
            .trending(query.trending)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Load a feed into the session. The returned outcome belongs to this
    /// call even when a newer load has since replaced the session's news.
    pub async fn load_news(&self, query: NewsQuery) -> NewsOutcome {
        let request = self.build_request(&query);
        let sequence = self.next_sequence();
        self.dispatch(Action::NewsRequested { sequence });

        let outcome = match self.feed.get_news(&request).await {
            Ok(articles) => NewsOutcome::Loaded(articles),
            Err(e) => {
                error!("Failed to load news: {}", e);
                NewsOutcome::Failed(LOAD_NEWS_FAILED.to_string())
            }
        };
        self.dispatch(Action::NewsSettled {
            sequence,
            outcome: outcome.clone(),
        });
        outcome
    }

    pub async fn search_news(&self, term: &str) -> NewsOutcome {
        let request = self.build_request(&NewsQuery::default());
        let sequence = self.next_sequence();
        self.dispatch(Action::NewsRequested { sequence });

        let outcome = match self.feed.search_news(term, &request).await {
            Ok(articles) => NewsOutcome::Loaded(articles),
            Err(e) => {
                error!("Search failed: {}", e);
                NewsOutcome::Failed(SEARCH_FAILED.to_string())
            }
        };
        self.dispatch(Action::NewsSettled {
            sequence,
            outcome: outcome.clone(),
        });
        outcome
    }

    pub async fn load_news_by_category(&self, category: Category) -> NewsOutcome {
        self.load_news(NewsQuery {
            category: Some(category),
            ..Default::default()
        })
        .await
    }

    pub async fn load_trending_news(&self) -> NewsOutcome {
        self.load_news(NewsQuery {
            trending: true,
            ..Default::default()
        })
        .await
    }

    pub async fn refresh_news(&self) -> NewsOutcome {
        self.load_news(NewsQuery::default()).await
    }

    /// Ask for the device location. Reloads the feed when the preference is
    /// `Current`; failures become a user-facing error and `None`.
    pub async fn request_location(&self) -> Option<LocationContext> {
        self.dispatch(Action::SetLocationLoading(true));
        self.dispatch(Action::SetError(None));

        let result = match self.locator.locate_current().await {
            Ok(location) => {
                info!("📍 Location resolved: {}", location.formatted);
                self.dispatch(Action::SetLocation(Some(location.clone())));
                if self.snapshot().preferences.location_preference == LocationPreference::Current {
                    self.load_news(NewsQuery::default()).await;
                }
                Some(location)
            }
            Err(e) => {
                warn!("Failed to get location: {}", e);
                self.dispatch(Action::SetError(Some(LOCATION_FAILED.to_string())));
                None
            }
        };

        self.dispatch(Action::SetLocationLoading(false));
        result
    }

    /// Geocode free text, switch to the custom preference and reload.
    pub async fn set_custom_location(&self, text: &str) -> Result<LocationContext> {
        self.dispatch(Action::SetLocationLoading(true));
        self.dispatch(Action::SetError(None));

        let result = match self.locator.geocode(text).await {
            Ok(location) => {
                info!("📍 Custom location set: {}", location.formatted);
                self.dispatch(Action::SetPreferences(PreferencesUpdate {
                    location_preference: Some(LocationPreference::Custom),
                    selected_location: Some(Some(location.clone())),
                    ..Default::default()
                }));
                self.load_news(NewsQuery::default()).await;
                Ok(location)
            }
            Err(e) => {
                warn!("Failed to set custom location '{}': {}", text, e);
                self.dispatch(Action::SetError(Some(CUSTOM_LOCATION_FAILED.to_string())));
                Err(Error::Location(e))
            }
        };

        self.dispatch(Action::SetLocationLoading(false));
        result
    }

    pub async fn update_location_preference(&self, preference: LocationPreference) {
        self.dispatch(Action::SetPreferences(PreferencesUpdate {
            location_preference: Some(preference),
            ..Default::default()
        }));

        let state = self.snapshot();
        match preference {
            LocationPreference::Global => {
                self.load_news(NewsQuery::global()).await;
            }
            LocationPreference::Current if state.location.is_none() => {
                self.request_location().await;
            }
            LocationPreference::Current => {
                self.load_news(NewsQuery::default()).await;
            }
            LocationPreference::Custom if state.preferences.selected_location.is_some() => {
                self.load_news(NewsQuery::default()).await;
            }
            // nothing selected yet; wait for set_custom_location
            LocationPreference::Custom => {}
        }
    }

    pub fn update_categories(&self, categories: Vec<Category>) {
        self.dispatch(Action::SetPreferences(PreferencesUpdate {
            categories: Some(categories),
            ..Default::default()
        }));
    }

    pub fn set_user(&self, user: Option<User>) {
        self.dispatch(Action::SetUser(user));
    }

    pub fn logout(&self) {
        self.dispatch(Action::Logout);
    }

    pub fn toggle_theme(&self) {
        self.dispatch(Action::ToggleTheme);
    }

    pub fn clear_error(&self) {
        self.dispatch(Action::SetError(None));
    }

    pub fn record_ad_view(&self, ad_id: &str, ad_type: AdType) -> AdInteraction {
        self.record_ad(ad_id, InteractionKind::View, ad_type)
    }

    pub fn record_ad_click(&self, ad_id: &str, ad_type: AdType) -> AdInteraction {
        self.record_ad(ad_id, InteractionKind::Click, ad_type)
    }

    fn record_ad(&self, ad_id: &str, kind: InteractionKind, ad_type: AdType) -> AdInteraction {
        let interaction = AdInteraction {
            ad_id: ad_id.to_string(),
            kind,
            ad_type,
            revenue: revenue_for(kind, ad_type),
            timestamp: Utc::now(),
        };
        self.dispatch(Action::RecordAdInteraction(interaction.clone()));
        interaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ns_core::{Article, ArticleOrigin, LocationError, SourceRef};
    use std::sync::Mutex;
    use tokio::sync::Notify;

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

    fn place(city: &str) -> LocationContext {
        LocationContext {
            city: city.to_string(),
            country: "Testland".to_string(),
            country_code: "TL".to_string(),
            formatted: format!("{}, Testland", city),
            ..Default::default()
        }
    }

    /// Feed that records requests into a shared event log. Trending loads
    /// block on `gate` so tests can control settle order.
    #[derive(Default)]
    struct MockFeed {
        events: Arc<Mutex<Vec<String>>>,
        requests: Mutex<Vec<AggregationRequest>>,
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    impl MockFeed {
        fn requests(&self) -> Vec<AggregationRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn last_request(&self) -> AggregationRequest {
            self.requests().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl NewsFeed for MockFeed {
        async fn get_news(&self, request: &AggregationRequest) -> Result<Vec<Article>> {
            self.events.lock().unwrap().push("news".to_string());
            self.requests.lock().unwrap().push(request.clone());
            if request.trending {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
            }
            if self.fail {
                return Err(Error::unavailable("mock", "down"));
            }
            let id = match (&request.location, request.trending) {
                (_, true) => "trending".to_string(),
                (Some(location), _) => location.city.clone(),
                (None, _) => "global".to_string(),
            };
            Ok(vec![article(&id)])
        }

        async fn search_news(&self, term: &str, request: &AggregationRequest) -> Result<Vec<Article>> {
            self.requests.lock().unwrap().push(request.clone().with_search_term(term));
            Ok(vec![article(&format!("search:{}", term))])
        }
    }

    struct MockLocator {
        events: Arc<Mutex<Vec<String>>>,
        current: std::result::Result<LocationContext, LocationError>,
        ip: std::result::Result<LocationContext, LocationError>,
    }

    #[async_trait]
    impl Locator for MockLocator {
        async fn locate_current(&self) -> std::result::Result<LocationContext, LocationError> {
            self.events.lock().unwrap().push("current".to_string());
            self.current.clone()
        }

        async fn locate_by_ip(&self) -> std::result::Result<LocationContext, LocationError> {
            self.events.lock().unwrap().push("ip".to_string());
            self.ip.clone()
        }

        async fn geocode(&self, query: &str) -> std::result::Result<LocationContext, LocationError> {
            self.events.lock().unwrap().push(format!("geocode:{}", query));
            if query == "Atlantis" {
                Err(LocationError::NotFound(query.to_string()))
            } else {
                Ok(place(query))
            }
        }
    }

    fn locator(events: &Arc<Mutex<Vec<String>>>) -> MockLocator {
        MockLocator {
            events: events.clone(),
            current: Ok(place("Lagos")),
            ip: Ok(place("Abuja")),
        }
    }

    fn setup() -> (Arc<SessionStore>, Arc<MockFeed>, Arc<Mutex<Vec<String>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let feed = Arc::new(MockFeed {
            events: events.clone(),
            ..Default::default()
        });
        let store = Arc::new(SessionStore::new(feed.clone(), Arc::new(locator(&events))));
        (store, feed, events)
    }

    #[tokio::test]
    async fn test_startup_loads_global_before_ip_lookup() {
        let (store, feed, events) = setup();
        let handle = store.initialize().await;

        let state = store.snapshot();
        assert!(state.initialized);
        assert!(!state.loading);
        assert_eq!(state.news[0].id, "global");
        assert!(feed.requests()[0].location.is_none());

        handle.await.unwrap();
        assert_eq!(*events.lock().unwrap(), vec!["news".to_string(), "ip".to_string()]);
        assert_eq!(store.snapshot().location.unwrap().city, "Abuja");
        // still global: the preference did not change
        assert_eq!(store.snapshot().preferences.location_preference, LocationPreference::Global);
    }

    #[tokio::test]
    async fn test_ip_failure_is_silent() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let feed = Arc::new(MockFeed {
            events: events.clone(),
            ..Default::default()
        });
        let locator = MockLocator {
            ip: Err(LocationError::Geocoding("offline".to_string())),
            ..locator(&events)
        };
        let store = Arc::new(SessionStore::new(feed, Arc::new(locator)));
        store.initialize().await.await.unwrap();

        let state = store.snapshot();
        assert!(state.location.is_none());
        assert!(state.error.is_none());
        assert!(state.initialized);
    }

    #[tokio::test]
    async fn test_global_preference_ignores_cached_location() {
        let (store, feed, _) = setup();
        store.update_location_preference(LocationPreference::Current).await;
        assert_eq!(store.snapshot().news[0].id, "Lagos");
        assert!(store.snapshot().location.is_some());

        store.update_location_preference(LocationPreference::Global).await;
        assert!(feed.last_request().location.is_none());
        assert_eq!(store.snapshot().news[0].id, "global");
    }

    #[tokio::test]
    async fn test_current_preference_reuses_cached_location() {
        let (store, feed, events) = setup();
        store.dispatch(Action::SetLocation(Some(place("Kano"))));
        store.update_location_preference(LocationPreference::Current).await;

        assert!(!events.lock().unwrap().contains(&"current".to_string()));
        assert_eq!(feed.last_request().location.unwrap().city, "Kano");
    }

    #[tokio::test]
    async fn test_request_location_failure_sets_error() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let feed = Arc::new(MockFeed {
            events: events.clone(),
            ..Default::default()
        });
        let locator = MockLocator {
            current: Err(LocationError::PermissionDenied),
            ..locator(&events)
        };
        let store = SessionStore::new(feed.clone(), Arc::new(locator));

        assert!(store.request_location().await.is_none());
        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some(LOCATION_FAILED));
        assert!(!state.location_loading);
        assert!(feed.requests().is_empty());
    }

    #[tokio::test]
    async fn test_custom_preference_without_selection_does_not_reload() {
        let (store, feed, _) = setup();
        store.update_location_preference(LocationPreference::Custom).await;
        assert!(feed.requests().is_empty());
    }

    #[tokio::test]
    async fn test_set_custom_location() {
        let (store, feed, _) = setup();
        let location = store.set_custom_location("Ibadan").await.unwrap();
        assert_eq!(location.city, "Ibadan");

        let state = store.snapshot();
        assert_eq!(state.preferences.location_preference, LocationPreference::Custom);
        assert_eq!(state.preferences.selected_location, Some(location));
        assert_eq!(feed.last_request().location.unwrap().city, "Ibadan");
        assert_eq!(state.news[0].id, "Ibadan");
    }

    #[tokio::test]
    async fn test_unknown_custom_location_propagates() {
        let (store, feed, _) = setup();
        let err = store.set_custom_location("Atlantis").await.unwrap_err();
        assert!(matches!(err, Error::Location(LocationError::NotFound(_))));

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some(CUSTOM_LOCATION_FAILED));
        assert_eq!(state.preferences.location_preference, LocationPreference::Global);
        assert!(!state.location_loading);
        assert!(feed.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_news() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let store = SessionStore::new(
            Arc::new(MockFeed {
                events: events.clone(),
                fail: true,
                ..Default::default()
            }),
            Arc::new(locator(&events)),
        );
        store.dispatch(Action::SetNews(vec![article("kept")]));
        store.refresh_news().await;

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some(LOAD_NEWS_FAILED));
        assert_eq!(state.news[0].id, "kept");
        assert!(!state.news_loading);
    }

    #[tokio::test]
    async fn test_late_result_does_not_overwrite_newer_one() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let gate = Arc::new(Notify::new());
        let feed = Arc::new(MockFeed {
            events: events.clone(),
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let store = Arc::new(SessionStore::new(feed.clone(), Arc::new(locator(&events))));

        let slow = {
            let store = store.clone();
            tokio::spawn(async move { store.load_trending_news().await })
        };
        while feed.requests().is_empty() {
            tokio::task::yield_now().await;
        }

        store.load_news_by_category(Category::Sports).await;
        assert_eq!(store.snapshot().news[0].id, "global");
        assert!(!store.snapshot().news_loading);

        gate.notify_one();
        let outcome = slow.await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.news[0].id, "global");
        assert!(!state.news_loading);

        // the late caller still gets its own articles back
        match outcome {
            NewsOutcome::Loaded(articles) => assert_eq!(articles[0].id, "trending"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_returns_own_outcome() {
        let (store, _, _) = setup();
        match store.search_news("markets").await {
            NewsOutcome::Loaded(articles) => assert_eq!(articles[0].id, "search:markets"),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let events = Arc::new(Mutex::new(Vec::new()));
        let failing = SessionStore::new(
            Arc::new(MockFeed {
                events: events.clone(),
                fail: true,
                ..Default::default()
            }),
            Arc::new(locator(&events)),
        );
        assert_eq!(
            failing.refresh_news().await,
            NewsOutcome::Failed(LOAD_NEWS_FAILED.to_string())
        );
    }

    #[tokio::test]
    async fn test_configured_page_size_applies_without_limit() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let feed = Arc::new(MockFeed {
            events: events.clone(),
            ..Default::default()
        });
        let store = SessionStore::new(feed.clone(), Arc::new(locator(&events))).with_page_size(7);

        store.refresh_news().await;
        assert_eq!(feed.last_request().page_size, 7);

        store
            .load_news(NewsQuery {
                limit: Some(3),
                ..Default::default()
            })
            .await;
        assert_eq!(feed.last_request().page_size, 3);
        let unset = SessionStore::new(feed, Arc::new(locator(&events))).with_page_size(0);
        assert_eq!(unset.page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_search_uses_preference_location() {
        let (store, feed, _) = setup();
        store.set_custom_location("Enugu").await.unwrap();
        store.search_news("markets").await;

        let seen = feed.last_request();
        assert_eq!(seen.search_term(), Some("markets"));
        assert_eq!(seen.location.unwrap().city, "Enugu");
        assert_eq!(store.snapshot().news[0].id, "search:markets");
    }

    #[tokio::test]
    async fn test_ad_revenue_and_theme() {
        let (store, _, _) = setup();
        let click = store.record_ad_click("ad-1", AdType::Video);
        assert_eq!(click.revenue, 0.10);
        store.record_ad_view("ad-1", AdType::Banner);
        store.toggle_theme();

        let state = store.snapshot();
        assert!((state.ad_revenue.total_earnings - 0.1005).abs() < 1e-9);
        assert_eq!(state.ad_revenue.interaction_history.len(), 2);
        assert_eq!(state.theme, crate::state::Theme::Dark);
    }
}
