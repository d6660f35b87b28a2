use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub docstore_url: String,
    pub docstore_api_key: String,
    pub session_secret: String,
    pub model_cache_dir: String,
    pub chat_upload_dir: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            docstore_url: env::var("DOCSTORE_URL")
                .unwrap_or_else(|_| {
                    warn!("DOCSTORE_URL not set, using empty value");
                    String::new()
                }),
            docstore_api_key: env::var("DOCSTORE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("DOCSTORE_API_KEY not set, using empty value");
                    String::new()
                }),
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SESSION_SECRET not set, using empty value");
                    String::new()
                }),
            model_cache_dir: env::var("MODEL_CACHE_DIR")
                .unwrap_or_else(|_| {
                    warn!("MODEL_CACHE_DIR not set, using default");
                    "./model_cache".to_string()
                }),
            chat_upload_dir: env::var("CHAT_UPLOAD_DIR")
                .unwrap_or_else(|_| {
                    warn!("CHAT_UPLOAD_DIR not set, using default");
                    "./uploads/chat".to_string()
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// True once the document store and session signing key are both set.
    /// Startup proceeds either way; unconfigured stores fail fast per request.
    pub fn is_configured(&self) -> bool {
        self.is_store_configured() && !self.session_secret.is_empty()
    }

    pub fn is_store_configured(&self) -> bool {
        !self.docstore_url.is_empty() && !self.docstore_api_key.is_empty()
    }
}
