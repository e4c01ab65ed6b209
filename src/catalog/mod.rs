mod dto;
pub mod handlers;
pub mod model;
pub mod repo;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::read_routes())
}
