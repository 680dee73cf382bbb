use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde_json::json;

use crate::auth::flash;
use crate::state::AppState;

use super::pages;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let registry = state.pipeline.registry();
    Json(json!({
        "status": "ok",
        "service": "malaria_screen",
        "inference_available": registry.is_available(),
        "models": registry.names(),
    }))
}

pub async fn home(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flashes) = flash::take(jar);
    (jar, Html(pages::home(&flashes)))
}
