//! Configuration loading and validation for ferroact.
//!
//! Loads configuration from `~/.ferroact/config.toml` with environment
//! variable overrides. Validates all settings before a session is opened.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ferroact/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Session arena sizing
    #[serde(default)]
    pub arena: ArenaConfig,

    /// Defaults for agents created without explicit options
    #[serde(default)]
    pub agent: AgentDefaults,

    /// Conversation memory limits
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Session-wide settings
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Capacity of the first block
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// Capacity of blocks appended on growth
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

fn default_initial_capacity() -> usize {
    ferroact_arena::DEFAULT_BLOCK_SIZE
}
fn default_block_size() -> usize {
    ferroact_arena::DEFAULT_BLOCK_SIZE
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            block_size: default_block_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefaults {
    /// Reason-Act iteration bound per run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Transport timeout handed to the LLM collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// System instructions sent ahead of every call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

fn default_max_iterations() -> u32 {
    ferroact_core::DEFAULT_MAX_ITERATIONS
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            timeout_ms: None,
            instructions: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Oldest messages are evicted beyond this many; 0 = unbounded
    #[serde(default)]
    pub max_messages: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Working directory handed to tools; defaults to the process cwd
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Load configuration from the default location, then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `FERROACT_*` overrides read through `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup("FERROACT_MAX_ITERATIONS") {
            self.agent.max_iterations = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "FERROACT_MAX_ITERATIONS must be a positive integer, got '{raw}'"
                ))
            })?;
        }

        if let Some(raw) = lookup("FERROACT_TIMEOUT_MS") {
            let ms = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "FERROACT_TIMEOUT_MS must be an integer, got '{raw}'"
                ))
            })?;
            self.agent.timeout_ms = Some(ms);
        }

        if let Some(dir) = lookup("FERROACT_WORKING_DIR") {
            self.session.working_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ferroact")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.arena.block_size < ferroact_arena::MIN_CAPACITY {
            return Err(ConfigError::ValidationError(format!(
                "arena.block_size must be at least {} bytes",
                ferroact_arena::MIN_CAPACITY
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        Self::default().to_toml()
    }

    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for ferroact_core::Error {
    fn from(err: ConfigError) -> Self {
        ferroact_core::Error::Config {
            message: err.to_string(),
        }
    }
}
