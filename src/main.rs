use malaria_screen::{
    AppState, build_router, config,
    db,
    inference::{ModelRegistry, onnx},
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "malaria_screen=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        "Starting malaria screening service on port {} from {}",
        config.port,
        config.base_dir.display()
    );
    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set; sessions are signed with the insecure development default");
    }

    std::fs::create_dir_all(config.upload_dir())?;

    // Parse the database URL to extract the file path and ensure parent directory exists
    let db_path = config
        .database_url
        .strip_prefix("sqlite:")
        .unwrap_or(&config.database_url);
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&format!("{}?mode=rwc", config.database_url))
        .await?;

    db::init_db(&db).await?;
    tracing::info!("Database initialized at {}", config.database_url);

    // Load models once; an unavailable runtime leaves the registry empty
    let registry = ModelRegistry::load(&config.models, &config.models_dir(), onnx::load_predictor);
    if !registry.is_available() {
        tracing::warn!("Predictions will be rejected until the inference runtime is available");
    }

    let port = config.port;
    let app = build_router(AppState::new(config, db, registry));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
