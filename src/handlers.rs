use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::catalog::MovieDetails;
use crate::discovery::{DiscoveryError, Filters, ResultPage};
use crate::query::RequestDescriptor;
use crate::server::AppState;

pub const HINTS: &str = "**Hints:**\n\
- Use `top 10`, `best`, `mid` for rating filters.\n\
- Mention language/country like `Tamil`, `India`, `Korean`.\n\
- Include year like `2025`.\n\
- Use `search <movie name>` to look up a title.";

#[derive(Debug, Deserialize)]
pub struct InterpretParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct MoviesParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub year_from: Option<i32>,
    #[serde(default)]
    pub year_to: Option<i32>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub min_imdb_rating: Option<f64>,
}

impl MoviesParams {
    pub fn filters(&self) -> Filters {
        Filters {
            genre: self.genre.clone(),
            language: self.language.clone().filter(|l| !l.trim().is_empty()),
            year_from: self.year_from,
            year_to: self.year_to,
            min_rating: self.min_rating,
            min_imdb_rating: self.min_imdb_rating,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenreList {
    pub genres: Vec<String>,
}

pub enum ApiError {
    BadRequest(&'static str),
    NotFound,
    QueryFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found"),
            ApiError::QueryFailed => (StatusCode::BAD_GATEWAY, "query failed"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(_: DiscoveryError) -> Self {
        ApiError::QueryFailed
    }
}

pub async fn interpret_query(
    State(state): State<AppState>,
    Query(params): Query<InterpretParams>,
) -> Json<RequestDescriptor> {
    Json(state.discovery.interpret(params.q.trim()))
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<MoviesParams>,
) -> Result<Json<ResultPage>, ApiError> {
    if params.q.trim().is_empty() {
        return Err(ApiError::BadRequest("missing query"));
    }

    let page = state
        .discovery
        .run(&params.q, &params.filters(), params.page)
        .await?;

    Ok(Json(page))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<MovieDetails>, ApiError> {
    match state.discovery.catalog().details(id).await {
        Ok(details) => Ok(Json(details)),
        Err(e) if e.is_not_found() => Err(ApiError::NotFound),
        Err(e) => {
            tracing::error!("Failed to fetch movie {}: {}", id, e);
            Err(ApiError::QueryFailed)
        }
    }
}

/// Genre choices for a filter dropdown, "Any" first.
pub async fn list_genres(State(state): State<AppState>) -> Json<GenreList> {
    let mut genres = vec!["Any".to_string()];
    genres.extend(
        state
            .discovery
            .vocabulary()
            .genre_names()
            .into_iter()
            .map(|g| g.to_string()),
    );
    Json(GenreList { genres })
}

pub async fn hints() -> &'static str {
    HINTS
}
