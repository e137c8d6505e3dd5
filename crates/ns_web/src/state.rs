use ns_session::SessionStore;
use ns_sources::ArticleService;
use std::sync::Arc;

/// Shared handles for every request handler.
#[derive(Clone)]
pub struct ServerState {
    pub session: Arc<SessionStore>,
    pub articles: Arc<ArticleService>,
}

impl ServerState {
    pub fn new(session: Arc<SessionStore>, articles: Arc<ArticleService>) -> Self {
        Self { session, articles }
    }
}
