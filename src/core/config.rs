//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.erica/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::formatter::{
    DEFAULT_BUBBLE_INTERVAL, DEFAULT_EMAIL_PROMPTS, DEFAULT_FINAL_MARKERS, DEFAULT_RESTART_GRACE,
    ReplyFormatter,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EricaConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub formatter: FormatterConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AgentConfig {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimingConfig {
    pub typing_delay_ms: Option<u64>,
    pub bubble_interval_ms: Option<u64>,
    pub restart_grace_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FormatterConfig {
    pub email_prompts: Option<Vec<String>>,
    pub final_markers: Option<Vec<String>>,
    pub keep_single: Option<Vec<String>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_AGENT_NAME: &str = "Erica";
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(1500);

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server_url: String,
    pub agent_name: String,
    pub typing_delay: Duration,
    pub formatter: ReplyFormatter,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            typing_delay: DEFAULT_TYPING_DELAY,
            formatter: ReplyFormatter::default(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.erica/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".erica").join("config.toml"))
}

/// Load config from `~/.erica/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `EricaConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<EricaConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(EricaConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(EricaConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<EricaConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Erica Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://127.0.0.1:5000"   # Or set ERICA_SERVER_URL, or pass --server

# [agent]
# name = "Erica"                       # Or set ERICA_AGENT_NAME, or pass --agent

# [timing]
# typing_delay_ms = 1500               # Typing indicator shown after each reply arrives
# bubble_interval_ms = 400             # Gap between consecutive bubbles of one reply
# restart_grace_ms = 200               # Extra wait before the restart control appears

# [formatter]
# Each list replaces the built-in one when set.
# email_prompts = ["Please type your email address"]
# final_markers = ["Thank you for contacting us."]
# keep_single = ["Monthly Premium", "Years of Coverage", "https://wa.me/"]
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_server` and `cli_agent` are from CLI flags (None = not specified).
pub fn resolve(
    config: &EricaConfig,
    cli_server: Option<&str>,
    cli_agent: Option<&str>,
) -> ResolvedConfig {
    // Server: CLI → env → config → default
    let server_url = cli_server
        .map(|s| s.to_string())
        .or_else(|| std::env::var("ERICA_SERVER_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    // Agent name: CLI → env → config → default
    let agent_name = cli_agent
        .map(|s| s.to_string())
        .or_else(|| std::env::var("ERICA_AGENT_NAME").ok())
        .or_else(|| config.agent.name.clone())
        .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string());

    let typing_delay = config
        .timing
        .typing_delay_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TYPING_DELAY);

    ResolvedConfig {
        server_url: server_url.trim_end_matches('/').to_string(),
        agent_name,
        typing_delay,
        formatter: resolve_formatter(config),
    }
}

fn resolve_formatter(config: &EricaConfig) -> ReplyFormatter {
    let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let timing = &config.timing;
    let formatter = &config.formatter;

    ReplyFormatter {
        email_prompts: formatter
            .email_prompts
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_EMAIL_PROMPTS)),
        final_markers: formatter
            .final_markers
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_FINAL_MARKERS)),
        keep_single: formatter.keep_single.clone().unwrap_or_default(),
        step: timing
            .bubble_interval_ms
            .map(|ms| {
                if ms == 0 {
                    warn!("bubble_interval_ms = 0 would stack bubbles, using 1");
                }
                Duration::from_millis(ms.max(1))
            })
            .unwrap_or(DEFAULT_BUBBLE_INTERVAL),
        restart_grace: timing
            .restart_grace_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RESTART_GRACE),
    }
}
