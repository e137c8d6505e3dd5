use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ns_core::{Article, Category, Error, LocationError, LocationPreference};
use ns_session::{LocationChoice, NewsOutcome, NewsQuery};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::state::ServerState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub articles: Vec<Article>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<NewsOutcome> for NewsResponse {
    fn from(outcome: NewsOutcome) -> Self {
        match outcome {
            NewsOutcome::Loaded(articles) => Self {
                count: articles.len(),
                articles,
                error: None,
            },
            NewsOutcome::Failed(message) => Self {
                articles: Vec::new(),
                count: 0,
                error: Some(message),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    pub category: Option<Category>,
    #[serde(default)]
    pub trending: bool,
    pub limit: Option<usize>,
    /// Set to force a location-less load regardless of preference
    #[serde(default)]
    pub global: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPreferenceBody {
    pub preference: LocationPreference,
    /// Free-text place, only used with the custom preference
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeBody {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub user_id: String,
    pub text: String,
}

fn error_response(e: Error) -> Response {
    let status = match &e {
        Error::NotFound(_) | Error::Location(LocationError::NotFound(_)) => StatusCode::NOT_FOUND,
        Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", e);
    }
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

pub async fn get_news(State(state): State<ServerState>, Query(params): Query<NewsParams>) -> impl IntoResponse {
    let query = NewsQuery {
        location: if params.global {
            LocationChoice::Global
        } else {
            LocationChoice::FromPreferences
        },
        category: params.category,
        trending: params.trending,
        limit: params.limit,
    };
    Json(NewsResponse::from(state.session.load_news(query).await))
}

pub async fn search_news(State(state): State<ServerState>, Query(params): Query<SearchParams>) -> impl IntoResponse {
    info!("Searching news for '{}'", params.q);
    Json(NewsResponse::from(state.session.search_news(&params.q).await))
}

pub async fn get_state(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.session.snapshot())
}

pub async fn update_location_preference(
    State(state): State<ServerState>,
    Json(body): Json<LocationPreferenceBody>,
) -> Response {
    match (body.preference, body.location) {
        (LocationPreference::Custom, Some(text)) if !text.trim().is_empty() => {
            if let Err(e) = state.session.set_custom_location(&text).await {
                return error_response(e);
            }
        }
        (preference, _) => state.session.update_location_preference(preference).await,
    }
    Json(state.session.snapshot()).into_response()
}

pub async fn get_article(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    match state.articles.get_article(&id).await {
        Ok(article) => Json(article).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_related_articles(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Response {
    // category lookup goes through storage directly so it does not count a view
    match state.articles.article_category(&id).await {
        Ok(category) => Json(state.articles.related_articles(&id, category, params.limit).await).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn toggle_like(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<LikeBody>,
) -> Response {
    match state.articles.toggle_like(&id, &body.user_id).await {
        Ok(liked) => Json(LikeResponse { liked }).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_comments(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Response {
    match state.articles.get_comments(&id, params.limit).await {
        Ok(comments) => Json(comments).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn add_comment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Response {
    match state.articles.add_comment(&id, &body.user_id, &body.text).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(e) => error_response(e),
    }
}
