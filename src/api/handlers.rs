use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Extension, Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::Recommendation;

use super::page::PageView;
use super::AppState;

// Request types

/// Body of the recommendation form (`application/x-www-form-urlencoded`)
#[derive(Debug, Deserialize)]
pub struct MovieForm {
    #[serde(default)]
    pub movie: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub movie: Option<String>,
}

fn selected_movie(movie: Option<String>) -> Option<String> {
    movie.filter(|movie| !movie.is_empty())
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Renders the empty form with the full catalog
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(PageView::new(state.catalog().titles()).render())
}

/// Handles a form submission
///
/// Always answers 200: missing selections, unknown titles and internal
/// failures are shown as a message on the page.
pub async fn submit(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    form: Option<Form<MovieForm>>,
) -> Html<String> {
    let page = PageView::new(state.catalog().titles());

    let Some(movie) = selected_movie(form.and_then(|Form(form)| form.movie)) else {
        tracing::info!(request_id = %request_id, "Form submitted without a selection");
        return Html(page.with_error("Please select a movie").render());
    };

    tracing::info!(request_id = %request_id, movie = %movie, "Processing recommendation request");

    let result = state.recommender.recommend(&movie).await;
    Html(outcome_page(page, &movie, &request_id, result).render())
}

/// Puts the outcome of a recommendation request on the page
fn outcome_page<'a>(
    page: PageView<'a>,
    movie: &'a str,
    request_id: &RequestId,
    result: AppResult<Vec<Recommendation>>,
) -> PageView<'a> {
    match result {
        Ok(recommendations) => {
            tracing::info!(
                request_id = %request_id,
                movie = %movie,
                count = recommendations.len(),
                "Recommendations ready"
            );
            page.with_recommendations(movie, recommendations)
        }
        Err(AppError::NotFound(message)) => {
            tracing::info!(request_id = %request_id, movie = %movie, "Movie not in catalog");
            page.with_error(message)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Recommendation failed");
            page.with_error(format!("An error occurred: {}", e.detail()))
        }
    }
}

/// Lists catalog titles in catalog order
pub async fn list_titles(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog().titles().map(str::to_string).collect())
}

/// JSON variant of the recommendation form
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let movie = selected_movie(params.movie)
        .ok_or_else(|| AppError::InvalidInput("Query parameter 'movie' is required".to_string()))?;

    tracing::info!(request_id = %request_id, movie = %movie, "Processing recommendation request");

    let recommendations = state.recommender.recommend(&movie).await?;
    Ok(Json(recommendations))
}
