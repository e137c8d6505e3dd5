use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::ServerState;

pub fn create_app(state: ServerState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/news", get(handlers::get_news))
        .route("/api/news/search", get(handlers::search_news))
        .route("/api/state", get(handlers::get_state))
        .route("/api/preferences/location", post(handlers::update_location_preference))
        .route("/api/articles/:id", get(handlers::get_article))
        .route("/api/articles/:id/related", get(handlers::get_related_articles))
        .route("/api/articles/:id/like", post(handlers::toggle_like))
        .route(
            "/api/articles/:id/comments",
            get(handlers::get_comments).post(handlers::add_comment),
        )
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: ServerState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌍 Server listening on http://{}", addr);
    axum::serve(listener, app).await
}

pub mod prelude {
    pub use super::{create_app, serve, ServerState};
    pub use ns_core::{Article, Error, Result};
}
