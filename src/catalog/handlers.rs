use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::SearchParams;
use super::model::DrinkRecord;
use super::repo;
use crate::auth::AuthUser;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/drinks", get(search_drinks))
}

#[instrument(skip(state))]
pub async fn search_drinks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<DrinkRecord>>, (StatusCode, String)> {
    let drinks = repo::search(&state.db, &params.query, params.limit, params.offset)
        .await
        .map_err(internal)?;
    Ok(Json(drinks))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
