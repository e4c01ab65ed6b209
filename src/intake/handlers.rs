use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{TotalsResponse, WeekResponse};
use crate::auth::AuthUser;
use crate::catalog::model::DrinkRecord;
use crate::state::AppState;
use crate::week;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/intake/totals", get(totals))
        .route("/intake/week", get(week_intake))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/intake/add", post(add_drink))
        .route("/intake/remove", post(remove_drink))
}

#[instrument(skip(state, drink))]
pub async fn add_drink(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(drink): Json<DrinkRecord>,
) -> Json<TotalsResponse> {
    let tracker = state.sessions.tracker_for(user_id);
    tracker.add(drink);
    Json(TotalsResponse::from_snapshot(&tracker.snapshot()))
}

#[instrument(skip(state, drink))]
pub async fn remove_drink(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(drink): Json<DrinkRecord>,
) -> Json<TotalsResponse> {
    let tracker = state.sessions.tracker_for(user_id);
    tracker.remove(&drink);
    Json(TotalsResponse::from_snapshot(&tracker.snapshot()))
}

#[instrument(skip(state))]
pub async fn totals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<TotalsResponse> {
    let tracker = state.sessions.tracker_for(user_id);
    Json(TotalsResponse::from_snapshot(&tracker.snapshot()))
}

/// The only path where a ledger failure surfaces to the caller.
#[instrument(skip(state))]
pub async fn week_intake(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<WeekResponse>, (StatusCode, String)> {
    let week_id = week::current_week_id();
    let drinks = state
        .ledger
        .fetch_week(user_id, &week_id)
        .await
        .map_err(internal)?;
    Ok(Json(WeekResponse { week_id, drinks }))
}

fn internal<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use crate::auth::claims::Claims;
    use crate::ledger::{DrinkKey, LedgerError, LedgerStore, WeekDrink};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use time::OffsetDateTime;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn bearer_for(state: &AppState, user_id: Uuid) -> String {
        let cfg = &state.config.jwt;
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + 300,
            iss: cfg.issuer.clone(),
            aud: cfg.audience.clone(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .expect("sign token");
        format!("Bearer {token}")
    }

    fn lager_json() -> String {
        serde_json::json!({
            "drink_name": "Lager",
            "brand_name": "BrandX",
            "calories": 150.0,
            "carbohydrates": "13g",
            "proteins": "1g",
            "fats": "0g",
            "alcohol_units": 1.7
        })
        .to_string()
    }

    fn post_add(auth: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/intake/add")
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(lager_json()))
            .expect("request")
    }

    fn get(uri: &str, auth: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .body(Body::empty())
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn add_returns_updated_totals() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let auth = bearer_for(&state, Uuid::new_v4());

        let response = app.oneshot(post_add(&auth)).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["drinks"][0]["drink_name"], "Lager");
        assert_eq!(body["drinks"][0]["count"], 1);
        assert_eq!(body["calories"], 150.0);
        assert_eq!(body["carbohydrates"], 13.0);
        assert_eq!(body["alcohol_units"], 1.7);
    }

    #[tokio::test]
    async fn requests_without_token_are_rejected() {
        let app = build_app(AppState::fake());
        let request = Request::builder()
            .uri("/api/v1/intake/totals")
            .body(Body::empty())
            .expect("request");

        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn week_reflects_synced_deltas() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let auth = bearer_for(&state, Uuid::new_v4());

        let response = app
            .clone()
            .oneshot(post_add(&auth))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        // The ledger delta is fire-and-forget; poll until it lands.
        let mut body = Value::Null;
        for _ in 0..100 {
            let response = app
                .clone()
                .oneshot(get("/api/v1/intake/week", &auth))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
            body = json_body(response).await;
            if body["drinks"].as_array().is_some_and(|d| !d.is_empty()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(body["week_id"], week::current_week_id().as_str());
        assert_eq!(body["drinks"][0]["brand_name"], "BrandX");
        assert_eq!(body["drinks"][0]["drink_name"], "Lager");
        assert_eq!(body["drinks"][0]["count"], 1);
        assert_eq!(body["drinks"][0]["units"], 1.7);
    }

    #[tokio::test]
    async fn week_surfaces_ledger_transport_errors() {
        struct FailingLedger;

        #[async_trait]
        impl LedgerStore for FailingLedger {
            async fn apply_delta(
                &self,
                _user_id: Uuid,
                _week_id: &str,
                _key: &DrinkKey,
                _count_delta: i64,
                _units_delta: f64,
            ) -> Result<(), LedgerError> {
                Err(LedgerError::Transport(anyhow::anyhow!("ledger offline")))
            }

            async fn fetch_week(
                &self,
                _user_id: Uuid,
                _week_id: &str,
            ) -> Result<Vec<WeekDrink>, LedgerError> {
                Err(LedgerError::Transport(anyhow::anyhow!("ledger offline")))
            }
        }

        let mut state = AppState::fake();
        state.ledger = Arc::new(FailingLedger);
        let auth = bearer_for(&state, Uuid::new_v4());
        let app = build_app(state);

        let response = app
            .oneshot(get("/api/v1/intake/week", &auth))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
