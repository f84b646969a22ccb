use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::itinerary::LayoutConfig;
use crate::domain::itinerary::layout::DEFAULT_MAX_COLS;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SECRET_KEY,
    GEMINI_TIMEOUT_SECS,
};

// =============================================================================
// File Config Structs (raw JSON sections, every field optional)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Upstream generation API section
#[derive(Default, Clone, Deserialize)]
pub struct GeminiFileConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub service_account_file: Option<PathBuf>,
    pub use_api_key: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for GeminiFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiFileConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("service_account_file", &self.service_account_file)
            .field("use_api_key", &self.use_api_key)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Roadmap layout section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LayoutFileConfig {
    pub max_cols: Option<usize>,
}

/// Session (flash cookie) section
#[derive(Default, Clone, Deserialize)]
pub struct SessionFileConfig {
    pub secret_key: Option<String>,
}

impl fmt::Debug for SessionFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFileConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub gemini: Option<GeminiFileConfig>,
    pub layout: Option<LayoutFileConfig>,
    pub session: Option<SessionFileConfig>,
    pub dev: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(gemini) = other.gemini {
            let current = self.gemini.get_or_insert_with(GeminiFileConfig::default);
            if gemini.url.is_some() {
                current.url = gemini.url;
            }
            if gemini.api_key.is_some() {
                current.api_key = gemini.api_key;
            }
            if gemini.service_account_file.is_some() {
                current.service_account_file = gemini.service_account_file;
            }
            if gemini.use_api_key.is_some() {
                current.use_api_key = gemini.use_api_key;
            }
            if gemini.timeout_secs.is_some() {
                current.timeout_secs = gemini.timeout_secs;
            }
        }

        if let Some(layout) = other.layout {
            let current = self.layout.get_or_insert_with(LayoutFileConfig::default);
            if layout.max_cols.is_some() {
                current.max_cols = layout.max_cols;
            }
        }

        if let Some(session) = other.session {
            let current = self.session.get_or_insert_with(SessionFileConfig::default);
            if session.secret_key.is_some() {
                current.secret_key = session.secret_key;
            }
        }

        if other.dev.is_some() {
            self.dev = other.dev;
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Upstream generation API configuration
#[derive(Clone)]
pub struct GeminiConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub service_account_file: Option<PathBuf>,
    pub use_api_key: bool,
    pub timeout_secs: u64,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("service_account_file", &self.service_account_file)
            .field("use_api_key", &self.use_api_key)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            service_account_file: None,
            use_api_key: true,
            timeout_secs: GEMINI_TIMEOUT_SECS,
        }
    }
}

/// Flash cookie signing configuration
#[derive(Clone)]
pub struct SessionConfig {
    pub secret_key: String,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub layout: LayoutConfig,
    pub session: SessionConfig,
    pub dev: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.treasuremap/treasuremap.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        Self::load_with_profile(cli, get_profile_config_path())
    }

    fn load_with_profile(cli: &CliConfig, profile_path: Option<PathBuf>) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli.config, dev = cli.dev, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir - skip if not exists
        if let Some(profile_path) = profile_path
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let file_server = file_config.server.unwrap_or_default();
        let file_gemini = file_config.gemini.unwrap_or_default();
        let file_layout = file_config.layout.unwrap_or_default();
        let file_session = file_config.session.unwrap_or_default();

        // 3. Layer configs: defaults -> file config -> CLI/env overrides
        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let gemini = GeminiConfig {
            url: non_blank(cli.gemini_url.clone().or(file_gemini.url)),
            api_key: non_blank(cli.gemini_api_key.clone().or(file_gemini.api_key)),
            service_account_file: cli
                .service_account_file
                .clone()
                .or(file_gemini.service_account_file),
            use_api_key: cli.use_api_key.or(file_gemini.use_api_key).unwrap_or(true),
            timeout_secs: cli
                .gemini_timeout
                .or(file_gemini.timeout_secs)
                .unwrap_or(GEMINI_TIMEOUT_SECS),
        };

        let layout = LayoutConfig {
            max_cols: cli
                .max_cols
                .or(file_layout.max_cols)
                .unwrap_or(DEFAULT_MAX_COLS),
        };

        let session = SessionConfig {
            secret_key: cli
                .secret_key
                .clone()
                .or(file_session.secret_key)
                .unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string()),
        };

        // dev: CLI/env flag takes precedence, then file config, default false
        let dev = cli.dev || file_config.dev.unwrap_or(false);

        let config = Self {
            server: ServerConfig { host, port },
            gemini,
            layout,
            session,
            dev,
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            dev = config.dev,
            max_cols = config.layout.max_cols,
            gemini_configured = config.gemini.url.is_some(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.layout.max_cols == 0 {
            anyhow::bail!("Configuration error: layout.max_cols must be at least 1");
        }

        if self.gemini.timeout_secs == 0 {
            anyhow::bail!("Configuration error: gemini.timeout_secs must be greater than 0");
        }

        if self.session.secret_key.is_empty() {
            anyhow::bail!("Configuration error: session.secret_key must not be empty");
        }

        if self.session.secret_key == DEFAULT_SECRET_KEY && is_all_interfaces(&self.server.host) {
            tracing::warn!(
                "Using the development session secret on a public interface; set TREASUREMAP_SECRET_KEY"
            );
        }

        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Get the profile config path (~/.treasuremap/treasuremap.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
