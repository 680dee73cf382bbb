use std::env;
use std::path::PathBuf;

pub const DEFAULT_SECRET_KEY: &str = "dev-secret-change-me";
const DEFAULT_MODELS: &str = "MobileNet=CNN_model.onnx@150x150;VGG16=VGG16_model.onnx@125x125";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// One entry of the model manifest: which file backs a user-facing model name
/// and the image geometry that model expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub file: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub base_dir: PathBuf,
    pub secret_key: String,
    pub database_url: String,
    pub models: Vec<ModelSpec>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT value: {}", e))?;

        let base_dir = match env::var("BASE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => env::current_dir()?,
        };

        let secret_key = env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string());

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{}", base_dir.join("users.db").display()));

        let models = parse_models(&env::var("MODELS").unwrap_or_else(|_| DEFAULT_MODELS.to_string()))?;

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_BYTES value: {}", e))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Config {
            port,
            base_dir,
            secret_key,
            database_url,
            models,
            max_upload_bytes,
        })
    }

    /// Configuration rooted at `base_dir` with every other value at its default.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Config {
            port: 5000,
            database_url: format!("sqlite:{}", base_dir.join("users.db").display()),
            base_dir,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            models: parse_models(DEFAULT_MODELS).unwrap_or_default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.base_dir.join("static").join("uploads")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.base_dir.join("static")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.base_dir.join("Models")
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// Parse a `name=file@WIDTHxHEIGHT;...` manifest.
pub fn parse_models(manifest: &str) -> anyhow::Result<Vec<ModelSpec>> {
    let mut models = Vec::new();

    for entry in manifest.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, rest) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid MODELS entry '{}': expected name=file@WxH", entry))?;
        let (file, geometry) = rest
            .rsplit_once('@')
            .ok_or_else(|| anyhow::anyhow!("Invalid MODELS entry '{}': missing @WxH", entry))?;
        let (width, height) = geometry
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow::anyhow!("Invalid MODELS entry '{}': geometry must be WxH", entry))?;

        let width: u32 = width
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid width in MODELS entry '{}': {}", entry, e))?;
        let height: u32 = height
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid height in MODELS entry '{}': {}", entry, e))?;

        if width == 0 || height == 0 {
            anyhow::bail!("Invalid MODELS entry '{}': geometry must be non-zero", entry);
        }

        let name = name.trim();
        let file = file.trim();
        if name.is_empty() || file.is_empty() {
            anyhow::bail!("Invalid MODELS entry '{}': name and file are required", entry);
        }

        models.push(ModelSpec {
            name: name.to_string(),
            file: file.to_string(),
            width,
            height,
        });
    }

    Ok(models)
}
