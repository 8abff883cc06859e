use std::env;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    pub log_dir: String,
    /// Serve `/metrics` and record request metrics
    pub observability_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "storage/logs".to_string()),
            observability_enabled: crate::env_or("OBSERVABILITY_ENABLED", true),
        }
    }
}
