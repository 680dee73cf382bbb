use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::SqlitePool;

use crate::auth::signing_key;
use crate::config::Config;
use crate::inference::{InferencePipeline, ModelRegistry};

/// Shared, cheaply clonable handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: SqlitePool,
    pub pipeline: Arc<InferencePipeline>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool, registry: ModelRegistry) -> Self {
        let cookie_key = signing_key(&config.secret_key);
        let pipeline = InferencePipeline::new(Arc::new(registry), config.upload_dir(), "static/uploads");

        Self {
            config: Arc::new(config),
            db,
            pipeline: Arc::new(pipeline),
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
