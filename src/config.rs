//! TOML configuration for tools that open ordered lists.
//!
//! ```toml
//! [order]
//! max_traversal_steps = 10000
//! subject_base = "http://example.org/agg/1"
//! member_base = "http://example.org/objects"
//!
//! [logging]
//! level = "proxy_order=debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{OrderOptions, DEFAULT_MAX_TRAVERSAL_STEPS};

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config value for {key}: {reason}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Parsed configuration; every field falls back to its default.
#[derive(Debug, Default, Clone)]
pub struct OrderConfig {
    path: Option<PathBuf>,
    data: RawConfig,
}

impl OrderConfig {
    /// Loads `path`; a missing file or `None` yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self {
                path: Some(path.to_path_buf()),
                data: RawConfig::default(),
            });
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let data: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        data.validate()?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    /// Parses configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let data: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        data.validate()?;
        Ok(Self { path: None, data })
    }

    /// File the configuration came from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// List options described by the `[order]` section.
    pub fn options(&self) -> OrderOptions {
        let section = &self.data.order;
        let mut options = OrderOptions::new().max_traversal_steps(
            section
                .max_traversal_steps
                .unwrap_or(DEFAULT_MAX_TRAVERSAL_STEPS),
        );
        if let Some(base) = &section.subject_base {
            options = options.subject_base(base.clone());
        }
        if let Some(seed) = section.seed {
            options = options.seed(seed);
        }
        options
    }

    /// Base IRI member identifiers are resolved under.
    pub fn member_base(&self) -> Option<&str> {
        self.data.order.member_base.as_deref()
    }

    /// `EnvFilter` directive for logging.
    pub fn log_level(&self) -> &str {
        self.data
            .logging
            .level
            .as_deref()
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    order: OrderSection,
    #[serde(default)]
    logging: LoggingSection,
}

impl RawConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.order.max_traversal_steps == Some(0) {
            return Err(ConfigError::Invalid {
                key: "order.max_traversal_steps",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct OrderSection {
    max_traversal_steps: Option<usize>,
    subject_base: Option<String>,
    member_base: Option<String>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct LoggingSection {
    level: Option<String>,
}
