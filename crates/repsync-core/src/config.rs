use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::paths;
use crate::retry::RetryPolicy;

/// Default lookback window in days for the date-window fallback.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 14;

/// Default remote manifest (publish history) path.
pub const DEFAULT_REMOTE_MANIFEST: &str = "/UpdateHistory.txt";

/// Startup configuration error. Fatal: the run never starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required setting `{key}` is not set")]
    Missing { key: &'static str },

    #[error("setting `{key}` is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("cannot read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `[server]`: the FTPS endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Implicit TLS (`ftps://`, usually port 990) instead of explicit AUTH TLS.
    pub implicit_tls: bool,
    /// Accept any server certificate. Off unless explicitly enabled.
    pub allow_untrusted_transport_certificate: bool,
    /// Remote path of the publish history (manifest).
    pub remote_manifest: String,
    pub connect_timeout_secs: u64,
    /// Upper bound for a single request, including the data transfer.
    pub transfer_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 21,
            username: String::new(),
            password: String::new(),
            implicit_tls: false,
            allow_untrusted_transport_certificate: false,
            remote_manifest: DEFAULT_REMOTE_MANIFEST.to_string(),
            connect_timeout_secs: 30,
            transfer_timeout_secs: 3600,
        }
    }
}

/// `[mirror]`: where the local copy lives and how far back to replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Local root; downloaded files land here by basename.
    pub download_dir: PathBuf,
    /// Local manifest copy; defaults to `download_dir/<manifest basename>`.
    pub manifest_path: Option<PathBuf>,
    /// Days replayed by the date-window fallback.
    pub lookback_days: u32,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::new(),
            manifest_path: None,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

/// `[proxy]`: optional HTTP CONNECT proxy in front of the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// e.g. `http://proxy.local:3128`
    pub url: String,
    /// Omit for an anonymous proxy.
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Retry policy parameters (optional `[retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per transfer (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

/// Largest accepted `retry.base_delay_secs`.
const MAX_BASE_DELAY_SECS: f64 = 3600.0;

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        let max_delay = Duration::from_secs(self.max_delay_secs);
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::try_from_secs_f64(self.base_delay_secs.max(0.0))
                .unwrap_or(max_delay),
            max_delay,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Configuration loaded from `~/.config/repsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepsyncConfig {
    /// Log file path; may contain strftime specifiers (`%Y%m%d`) for dated logs.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Echo log lines to stderr as well as the log file.
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// Debug-level logging for repsync's own modules.
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for RepsyncConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_to_console: true,
            verbose: false,
            server: ServerConfig::default(),
            mirror: MirrorConfig::default(),
            proxy: None,
            retry: None,
        }
    }
}

impl RepsyncConfig {
    /// Check required keys and value ranges. An empty string counts as missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("server.host", self.server.host.trim().is_empty()),
            ("server.username", self.server.username.is_empty()),
            ("server.password", self.server.password.is_empty()),
            ("server.remote_manifest", self.server.remote_manifest.trim().is_empty()),
            ("mirror.download_dir", self.mirror.download_dir.as_os_str().is_empty()),
        ];
        if let Some((key, _)) = required.iter().find(|(_, missing)| *missing) {
            return Err(ConfigError::Missing { key: *key });
        }
        if self.mirror.lookback_days == 0 {
            return Err(ConfigError::Invalid {
                key: "mirror.lookback_days",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(proxy) = &self.proxy {
            if proxy.url.trim().is_empty() {
                return Err(ConfigError::Missing { key: "proxy.url" });
            }
        }
        if let Some(retry) = &self.retry {
            if retry.max_attempts == 0 {
                return Err(ConfigError::Invalid {
                    key: "retry.max_attempts",
                    reason: "must be at least 1".to_string(),
                });
            }
            if !(0.0..=MAX_BASE_DELAY_SECS).contains(&retry.base_delay_secs) {
                return Err(ConfigError::Invalid {
                    key: "retry.base_delay_secs",
                    reason: format!("must be between 0 and {}", MAX_BASE_DELAY_SECS),
                });
            }
        }
        if let Some(template) = &self.log_file {
            if !crate::logging::is_valid_log_template(template) {
                return Err(ConfigError::Invalid {
                    key: "log_file",
                    reason: format!("bad date specifier in {:?}", template),
                });
            }
        }
        Ok(())
    }

    /// Local manifest copy: the explicit override, or the remote manifest's
    /// basename under the download directory.
    pub fn manifest_path(&self) -> PathBuf {
        match &self.mirror.manifest_path {
            Some(p) => p.clone(),
            None => paths::default_local_path(&self.mirror.download_dir, &self.server.remote_manifest),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().policy()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("repsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Parse and validate the config file at `path`.
pub fn load_from(path: &Path) -> Result<RepsyncConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: RepsyncConfig = toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load configuration from the default location. If no file exists yet a
/// template is written there; it lacks the server settings, so validation
/// then reports the first missing key.
pub fn load_or_init() -> Result<RepsyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let template = toml::to_string_pretty(&RepsyncConfig::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, template)?;
        eprintln!("created config template at {}", path.display());
    }
    Ok(load_from(&path)?)
}
