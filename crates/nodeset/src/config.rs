//! Page Configuration

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Page configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document URL
    pub url: String,

    /// Clock step used by `Page::advance` (milliseconds)
    pub frame_interval_ms: f64,

    /// Duration of the `fade_*_default` effects (milliseconds)
    pub default_fade_ms: f64,

    /// Keep whitespace-only text nodes when parsing markup
    pub keep_whitespace_text: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            frame_interval_ms: 16.0,
            default_fade_ms: 400.0,
            keep_whitespace_text: true,
        }
    }
}

impl Config {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }
}
