//! Configuration loading and database path resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP endpoint of the transactional email API
pub const DEFAULT_MAIL_ENDPOINT: &str = "https://api.resend.com/emails";

/// Default OpenAI-compatible chat-completions endpoint used for images
pub const DEFAULT_IMAGE_ENDPOINT: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";

/// Default image model requested from the gateway
pub const DEFAULT_IMAGE_MODEL: &str = "google/gemini-2.5-flash-image-preview";

/// Request header used to fingerprint meditation users
pub const DEFAULT_IDENTITY_HEADER: &str = "x-client-id";

/// Contents of `config.toml`
///
/// Every field is optional; missing values fall back to environment
/// variables and then to compiled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Welcome email settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub endpoint: Option<String>,
    /// Public site URL linked from the welcome email
    pub site_url: Option<String>,
}

/// Blog image generation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub header: Option<String>,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from an explicit path, or from the platform
    /// default location when `path` is `None`.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    info!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Mail API key: environment wins over TOML
    pub fn mail_api_key(&self) -> Option<String> {
        secret_from("LOTUS_MAIL_API_KEY", self.mail.api_key.as_deref())
    }

    /// Image gateway API key: environment wins over TOML
    pub fn image_api_key(&self) -> Option<String> {
        secret_from("LOTUS_IMAGE_API_KEY", self.image.api_key.as_deref())
    }

    pub fn identity_header(&self) -> String {
        self.identity
            .header
            .clone()
            .unwrap_or_else(|| DEFAULT_IDENTITY_HEADER.to_string())
    }
}

fn secret_from(env_var_name: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var_name).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v)).map(str::to_string);

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} set in both environment and TOML. Using environment.",
            env_var_name
        );
    }
    env_value.or(toml_value)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Database path resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_database_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.database_path {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    get_default_data_folder().join("lotus.db")
}

/// Platform location of `config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lotus").join("config.toml"))
}

/// Get OS-dependent default data folder path
fn get_default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/lotus (or /var/lib/lotus for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("lotus"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/lotus"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("lotus"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/lotus"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("lotus"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\lotus"))
    } else {
        PathBuf::from("./lotus_data")
    }
}
