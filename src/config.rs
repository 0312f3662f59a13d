use std::env;
use std::path::PathBuf;

pub struct Config {
    pub base_url: String,
    pub token_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("TASKSYNC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/v1".to_string()),
            token_file: env::var("TASKSYNC_TOKEN_FILE")
                .unwrap_or_else(|_| ".tasksync_token".to_string())
                .into(),
        }
    }
}
