use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::persist::app_cache_dir;

const DEFAULT_APP_ID: &str = "piste-scout";
const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1000;
const MIN_SAVE_DEBOUNCE_MS: u64 = 100;
const DEFAULT_LOG_FILE: &str = "piste_scout.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_id: String,
    pub user_id: Option<String>,
    pub auth_url: Option<String>,
    pub store_url: Option<String>,
    pub save_debounce: Duration,
    pub export_dir: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            user_id: None,
            auth_url: None,
            store_url: None,
            save_debounce: Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
            export_dir: PathBuf::from("."),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Reads `PISTE_*` variables; call after the dotenv files are loaded.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let save_debounce_ms = env::var("PISTE_SAVE_DEBOUNCE_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SAVE_DEBOUNCE_MS)
            .max(MIN_SAVE_DEBOUNCE_MS);
        Self {
            app_id: opt_env("PISTE_APP_ID").unwrap_or(defaults.app_id),
            user_id: opt_env("PISTE_USER_ID"),
            auth_url: opt_env("PISTE_AUTH_URL"),
            store_url: opt_env("PISTE_STORE_URL"),
            save_debounce: Duration::from_millis(save_debounce_ms),
            export_dir: opt_env("PISTE_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            log_file: opt_env("PISTE_LOG_FILE")
                .map(PathBuf::from)
                .or_else(|| app_cache_dir().map(|dir| dir.join(DEFAULT_LOG_FILE))),
        }
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
