//! Settings files
//!
//! Settings are read once from TOML or RON, with the format picked from the
//! file extension, then validated before any object ticks with them.

use serde::de::DeserializeOwned;
use std::path::Path;

pub mod settings;

pub use settings::{DamageSettings, GeneralSettings, SimSettings};

/// Text formats a settings file may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format named by the extension of `path`
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        match Path::new(path).extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_string())),
        }
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }
}

/// Settings that load from a file on disk
pub trait Config: DeserializeOwned {
    /// Parse `text` written in `format`; missing fields keep their defaults
    fn from_text(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        format.parse(text)
    }

    /// Load a `.toml` or `.ron` file. The extension is checked before the
    /// file is opened.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text, format)
    }
}

/// Settings loading errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid for its format
    #[error("Parse error: {0}")]
    Parse(String),

    /// Neither `.toml` nor `.ron`
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A loaded value is out of range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}
