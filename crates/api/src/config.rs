use std::path::PathBuf;

/// Default inference endpoint: Stable Video Diffusion img2vid on the
/// Hugging Face Inference API.
pub const DEFAULT_API_URL: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-video-diffusion-img2vid-xt";

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `7860`, the Hugging Face Spaces convention).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Inference API bearer token. When absent, jobs run through the
    /// fallback generator instead of the remote API.
    pub hf_token: Option<String>,
    /// Inference endpoint URL.
    pub hf_api_url: String,
    /// Directory holding uploaded character images.
    pub uploads_dir: PathBuf,
    /// Directory holding produced video artifacts.
    pub videos_dir: PathBuf,
    /// Simulated processing latency for the fallback generator, in
    /// seconds. Mirrors real timing characteristics for UI testing.
    pub mock_latency_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `7860`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `HF_TOKEN` / `HUGGING_FACE_TOKEN` | unset (fallback generator) |
    /// | `HF_API_URL`           | SVD img2vid endpoint       |
    /// | `UPLOADS_DIR`          | `uploads`                  |
    /// | `VIDEOS_DIR`           | `videos`                   |
    /// | `MOCK_LATENCY_SECS`    | `10`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "7860".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let hf_token = std::env::var("HF_TOKEN")
            .or_else(|_| std::env::var("HUGGING_FACE_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());

        let hf_api_url = std::env::var("HF_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        let uploads_dir = PathBuf::from(std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into()));
        let videos_dir = PathBuf::from(std::env::var("VIDEOS_DIR").unwrap_or_else(|_| "videos".into()));

        let mock_latency_secs: u64 = std::env::var("MOCK_LATENCY_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("MOCK_LATENCY_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            hf_token,
            hf_api_url,
            uploads_dir,
            videos_dir,
            mock_latency_secs,
        }
    }
}
