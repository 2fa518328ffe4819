use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants;
use crate::models::ProviderMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub google: GoogleConfig,

    pub overpass: OverpassConfig,

    pub search: SearchConfig,

    pub cache: CacheConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    /// `*` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Empty disables the Google provider.
    pub api_key: String,

    pub base_url: String,

    pub radius_meters: u32,

    pub language: String,

    pub page_delay_ms: u64,

    pub max_pages: u32,

    /// Budget for one paginated search, page delays included.
    pub paginated_timeout_seconds: u64,

    /// Budget for a single HTTP request.
    pub request_timeout_seconds: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: constants::google::DEFAULT_BASE_URL.to_string(),
            radius_meters: constants::google::SEARCH_RADIUS_METERS,
            language: constants::google::LANGUAGE.to_string(),
            page_delay_ms: constants::intervals::PAGE_TOKEN_DELAY.as_secs() * 1000,
            max_pages: constants::google::MAX_PAGES,
            paginated_timeout_seconds: constants::intervals::PAGINATED_CALL_TIMEOUT.as_secs(),
            request_timeout_seconds: constants::intervals::SIMPLE_CALL_TIMEOUT.as_secs(),
        }
    }
}

impl GoogleConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverpassConfig {
    pub base_url: String,

    pub radius_meters: u32,

    pub request_timeout_seconds: u64,

    /// Server-side `[timeout:N]` of the QL query.
    pub query_timeout_seconds: u32,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: constants::overpass::DEFAULT_BASE_URL.to_string(),
            radius_meters: constants::overpass::SEARCH_RADIUS_METERS,
            request_timeout_seconds: constants::overpass::REQUEST_TIMEOUT_SECONDS,
            query_timeout_seconds: constants::overpass::QUERY_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub provider: ProviderMode,

    pub request_deadline_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: ProviderMode::Google,
            request_deadline_seconds: constants::intervals::SEARCH_DEADLINE.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_hours: u64,

    pub radius_meters: f64,

    pub sweep_interval_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: constants::cache::TTL_HOURS,
            radius_meters: constants::cache::MATCH_RADIUS_METERS,
            sweep_interval_minutes: constants::cache::SWEEP_INTERVAL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and
    /// environment overrides.
    pub fn load() -> Result<Self> {
        // a missing .env is fine
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies `GOOGLE_MAPS_API_KEY`, `API_PROVIDER` and `HTTP_PORT` from
    /// `lookup`. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GOOGLE_MAPS_API_KEY") {
            self.google.api_key = key.trim().to_string();
        }

        if let Some(provider) = get("API_PROVIDER") {
            self.search.provider = provider
                .parse()
                .with_context(|| format!("Invalid API_PROVIDER '{provider}'"))?;
        }

        if let Some(port) = get("HTTP_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid HTTP_PORT '{port}'"))?;
        }

        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("nearby-eats").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".nearby-eats").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.search.provider {
            ProviderMode::Google if !self.google.is_configured() => {
                anyhow::bail!(
                    "Google provider selected but no API key set (google.api_key or GOOGLE_MAPS_API_KEY)"
                );
            }
            ProviderMode::Both if !self.google.is_configured() => {
                warn!("No Google API key configured, searches will use OpenStreetMap only");
            }
            _ => {}
        }

        if self.cache.ttl_hours == 0 {
            anyhow::bail!("cache.ttl_hours must be > 0");
        }

        if self.cache.sweep_interval_minutes == 0 {
            anyhow::bail!("cache.sweep_interval_minutes must be > 0");
        }

        if !(self.cache.radius_meters.is_finite() && self.cache.radius_meters >= 0.0) {
            anyhow::bail!("cache.radius_meters must be a non-negative number");
        }

        if self.google.max_pages == 0 {
            anyhow::bail!("google.max_pages must be > 0");
        }

        Ok(())
    }
}
