//! Configuration management.
//!
//! Every recognized option is an explicit field with a documented default.
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`CRUX_*`)
//!
//! # Example
//!
//! ```toml
//! [compression]
//! byte_floor = 256
//! efficiency_floor = 0.10
//! efficient_strategy = "hybrid"
//! balanced_strategy = { fixed = "bracket" }
//!
//! [dictionary]
//! min_occurrences = 3
//!
//! [protocol.acronyms]
//! API = "application programming interface"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::{BracketMode, CodecName};
use crate::error::{CruxError, Result};
use crate::protocol::ResponseStyle;
use crate::tokenizer::TokenMetric;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pipeline thresholds and per-class strategy
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Dictionary codec thresholds
    #[serde(default)]
    pub dictionary: DictionaryConfig,

    /// Bracket codec variant
    #[serde(default)]
    pub bracket: BracketConfig,

    /// Extra model classification markers
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Response compaction protocol
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Semantic guard
    #[serde(default)]
    pub semantic: SemanticConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CruxError::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| CruxError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Default config file location (`<config_dir>/crux/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("crux").join("config.toml"))
    }

    /// Load the default config file if present, then apply env overrides
    pub fn load() -> Result<Self> {
        let base = match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)?
            },
            _ => Self::default(),
        };

        let config = base.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `CRUX_*` overrides using the given lookup
    ///
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("CRUX_BYTE_FLOOR") {
            match val.parse() {
                Ok(floor) => self.compression.byte_floor = floor,
                Err(_) => tracing::warn!("Ignoring invalid CRUX_BYTE_FLOOR={val}"),
            }
        }
        if let Some(val) = lookup("CRUX_EFFICIENCY_FLOOR") {
            match val.parse() {
                Ok(floor) => self.compression.efficiency_floor = floor,
                Err(_) => tracing::warn!("Ignoring invalid CRUX_EFFICIENCY_FLOOR={val}"),
            }
        }
        if let Some(val) = lookup("CRUX_TOKEN_METRIC") {
            match val.parse() {
                Ok(metric) => self.compression.token_metric = metric,
                Err(e) => tracing::warn!("Ignoring CRUX_TOKEN_METRIC: {e}"),
            }
        }
        if let Some(val) = lookup("CRUX_TRANSFORM_TIMEOUT_MS") {
            match val.parse() {
                Ok(ms) => self.compression.transform_timeout_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid CRUX_TRANSFORM_TIMEOUT_MS={val}"),
            }
        }
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let floor = self.compression.efficiency_floor;
        if !(0.0..1.0).contains(&floor) {
            return Err(CruxError::Config(format!(
                "efficiency_floor must be in [0, 1): {floor}"
            )));
        }
        if self.compression.transform_timeout_ms == 0 {
            return Err(CruxError::Config(
                "transform_timeout_ms must be positive".to_string(),
            ));
        }
        if self.dictionary.min_token_len == 0 {
            return Err(CruxError::Config(
                "dictionary.min_token_len must be positive".to_string(),
            ));
        }
        if self.dictionary.min_occurrences < 2 {
            return Err(CruxError::Config(format!(
                "dictionary.min_occurrences must be at least 2: {}",
                self.dictionary.min_occurrences
            )));
        }
        let shift = self.semantic.density_shift_threshold;
        if !(shift.is_finite() && shift > 0.0) {
            return Err(CruxError::Config(format!(
                "semantic.density_shift_threshold must be positive: {shift}"
            )));
        }
        Ok(())
    }
}

/// How a class picks its codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecStrategy {
    /// Best-of hex / bracket (+ dictionary when code-heavy)
    Hybrid,
    /// Dictionary when code-heavy, else bracket
    Adaptive,
    /// Always the named codec
    Fixed(CodecName),
    /// Never compress
    Off,
}

/// Pipeline thresholds and per-class strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Inputs shorter than this many UTF-8 bytes are not compressed
    pub byte_floor: usize,

    /// Minimum token savings fraction the gate requires
    pub efficiency_floor: f64,

    /// Strategy for efficient-class models
    pub efficient_strategy: CodecStrategy,

    /// Strategy for balanced-class models
    pub balanced_strategy: CodecStrategy,

    /// Token proxy used for all accounting
    pub token_metric: TokenMetric,

    /// Budget for the external transformer
    pub transform_timeout_ms: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            byte_floor: 256,
            efficiency_floor: 0.10,
            efficient_strategy: CodecStrategy::Hybrid,
            balanced_strategy: CodecStrategy::Adaptive,
            token_metric: TokenMetric::Words,
            transform_timeout_ms: 5_000,
        }
    }
}

/// Dictionary codec thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Minimum word length eligible for substitution
    pub min_token_len: usize,

    /// Minimum occurrences before a word gets an index
    pub min_occurrences: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            min_token_len: 4,
            min_occurrences: 3,
        }
    }
}

/// Bracket codec variant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketConfig {
    /// `markers` (reversible run markers) or `normalize`
    pub mode: BracketMode,
}

/// Extra classification markers, appended to the built-in rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Substrings that mark an efficient model
    pub efficient: Vec<String>,

    /// Substrings that mark a balanced model
    pub balanced: Vec<String>,

    /// Substrings that force resistant (checked first)
    pub resistant: Vec<String>,
}

/// Response compaction protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Dictionary version advertised in the header
    pub dict_version: String,

    /// Default response style
    pub response_style: ResponseStyle,

    /// Extra ACRONYM → full term pairs, merged over the built-ins
    pub acronyms: BTreeMap<String, String>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            dict_version: "default".to_string(),
            response_style: ResponseStyle::FirstMention,
            acronyms: BTreeMap::new(),
        }
    }
}

/// Semantic guard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Relative density change above which a pair is flagged
    pub density_shift_threshold: f64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            density_shift_threshold: 0.5,
        }
    }
}
