//! Session configuration loading.
//!
//! A session is configured from a small TOML document:
//!
//! ```toml
//! variant = "chess960"
//! seed = 42
//! fifty_move_rule = true
//! threefold_repetition = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::rules::{Chess960, LayoutError, Rules, Variant};

/// Errors that can occur when loading or applying configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The configured Chess960 layout is not a valid start.
    #[error("Invalid Chess960 layout: {0}")]
    InvalidLayout(#[from] LayoutError),
}

/// Which history-based draws a session detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRules {
    /// Draw once the half-move clock reaches 100.
    pub fifty_move_rule: bool,
    /// Draw once a position occurs for the third time.
    pub threefold_repetition: bool,
}

impl Default for DrawRules {
    fn default() -> Self {
        DrawRules {
            fifty_move_rule: true,
            threefold_repetition: true,
        }
    }
}

/// Configuration for one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Rule variant. Defaults to classic.
    #[serde(default)]
    pub variant: Variant,
    /// Seed for the Chess960 layout. A random layout is drawn without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Explicit Chess960 back rank such as "RNBQKBNR". Wins over `seed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Defaults to true.
    #[serde(default = "default_true")]
    pub fifty_move_rule: bool,
    /// Defaults to true.
    #[serde(default = "default_true")]
    pub threefold_repetition: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            variant: Variant::default(),
            seed: None,
            layout: None,
            fifty_move_rule: true,
            threefold_repetition: true,
        }
    }
}

impl SessionConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read,
    /// or [`ConfigError::ParseError`] if it contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Builds the rule set this configuration selects.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLayout`] if a Chess960 layout is given
    /// and breaks the Chess960 constraints.
    pub fn rules(&self) -> Result<Rules, ConfigError> {
        match (&self.variant, &self.layout) {
            (Variant::Chess960, Some(layout)) => Ok(Rules::Chess960(Chess960::from_layout(layout)?)),
            (variant, _) => Ok(variant.rules(self.seed)),
        }
    }

    /// The draw rules this configuration enables.
    pub fn draw_rules(&self) -> DrawRules {
        DrawRules {
            fifty_move_rule: self.fifty_move_rule,
            threefold_repetition: self.threefold_repetition,
        }
    }
}
