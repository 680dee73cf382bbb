pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod inference;
pub mod state;
pub mod web;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Everything behind this layer needs a signed-in user
    let protected = Router::new()
        .route("/predict", get(web::predict_page).post(web::predict))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_guard,
        ));

    Router::new()
        .route("/", get(web::home))
        .route("/health", get(web::health_check))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .merge(protected)
        .nest_service("/static", ServeDir::new(state.config.static_dir()))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
