use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub api_url: String,
    pub settings_path: PathBuf,
}

impl FrontendConfig {
    pub fn from_env() -> Self {
        let api_url = env::var("FORMHELPER_API_URL")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let settings_path = env::var("FORMHELPER_SETTINGS")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_settings_path);
        Self {
            api_url,
            settings_path,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

fn default_settings_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("formhelper").join("settings.json")
}
