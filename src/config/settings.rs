use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::security::{JUSTIFICATION_KEYWORDS, KNOWN_TOOLS, SAFEGUARD_KEYWORDS};
use crate::sim::{MAX_STAGED_FILE_SIZE, PROTECTED_BRANCHES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Static configuration consumed by the simulation, validator and auditor.
///
/// Defaults mirror the built-in constants; a TOML file can widen or replace
/// the vocabulary and the protected-branch list.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub sim: SimConfig,
    pub validation: ValidationConfig,
    pub audit: AuditConfig,
    pub tools: Vec<ToolSpec>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimConfig {
    pub protected_branches: Vec<String>,
    pub max_staged_file_size: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ValidationConfig {
    pub min_description_len: usize,
    pub max_description_len: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuditConfig {
    pub justification_keywords: Vec<String>,
    pub safeguard_keywords: Vec<String>,
}

/// One entry of the recognized tool vocabulary with its capability flags
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default)]
    pub executes: bool,
    #[serde(default)]
    pub network: bool,
    #[serde(default)]
    pub mutates_files: bool,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;

        Ok(())
    }

    /// Create the default configuration from the built-in constants
    pub fn default_config() -> Self {
        Config {
            sim: SimConfig {
                protected_branches: PROTECTED_BRANCHES.iter().map(|s| s.to_string()).collect(),
                max_staged_file_size: MAX_STAGED_FILE_SIZE,
            },
            validation: ValidationConfig {
                min_description_len: 10,
                max_description_len: 200,
            },
            audit: AuditConfig {
                justification_keywords: JUSTIFICATION_KEYWORDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                safeguard_keywords: SAFEGUARD_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            },
            tools: KNOWN_TOOLS
                .iter()
                .map(|(name, executes, network, mutates_files)| ToolSpec {
                    name: name.to_string(),
                    executes: *executes,
                    network: *network,
                    mutates_files: *mutates_files,
                })
                .collect(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sim.protected_branches.is_empty() {
            return Err(ConfigError::InvalidValue(
                "protected_branches must not be empty".to_string(),
            ));
        }

        if self.sim.protected_branches.iter().any(|b| b.is_empty()) {
            return Err(ConfigError::InvalidValue(
                "protected branch names must not be empty".to_string(),
            ));
        }

        if self.sim.max_staged_file_size == 0 {
            return Err(ConfigError::InvalidValue(
                "max_staged_file_size must be greater than 0".to_string(),
            ));
        }

        if self.validation.min_description_len == 0
            || self.validation.min_description_len >= self.validation.max_description_len
        {
            return Err(ConfigError::InvalidValue(format!(
                "description length bounds [{},{}] are not a valid range",
                self.validation.min_description_len, self.validation.max_description_len
            )));
        }

        if self.tools.is_empty() {
            return Err(ConfigError::InvalidValue(
                "tool vocabulary must not be empty".to_string(),
            ));
        }

        for tool in &self.tools {
            if tool.name.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "tool names must not be empty".to_string(),
                ));
            }
        }

        let mut names: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.tools.len() {
            return Err(ConfigError::InvalidValue(
                "tool vocabulary contains duplicate names".to_string(),
            ));
        }

        Ok(())
    }

    /// Check a branch name against the configured protected set
    pub fn is_protected(&self, branch: &str) -> bool {
        self.sim.protected_branches.iter().any(|b| b == branch)
    }

    /// Look up a tool by name in the configured vocabulary
    pub fn tool(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
