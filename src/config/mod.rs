// eximscope - GPL-3.0-or-later
// This file is part of eximscope.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// eximscope is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// eximscope is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with eximscope.  If not, see <https://www.gnu.org/licenses/>.

use crate::analysis::connections::DEFAULT_MIN_SENDS;
use crate::analysis::spam::DEFAULT_SPAM_SCORE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to read config file '{path}': {cause}")]
    Read {
        path: PathBuf,
        cause: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {cause}")]
    Parse {
        path: PathBuf,
        cause: serde_json::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write config file '{path}': {cause}")]
    Write {
        path: PathBuf,
        cause: std::io::Error,
    },
}

/// Thresholds used by the analyses and the reports.
///
/// Missing keys in the config file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Hide refused-connection IPs below this count
    pub refusal_threshold: usize,
    /// Hide senders below this count in the spam pattern report
    pub spam_sender_threshold: usize,
    /// Hide IPs below this count in the failure pattern report
    pub ip_threshold: usize,
    /// Minimum deliveries for an IP to appear in the send count analysis
    pub min_sends: usize,
    /// Spam scores strictly above this value are reported
    pub spam_score_threshold: f64,
    /// Number of bars in each chart
    pub chart_top_n: usize,
    /// Width of the longest bar, in characters
    pub chart_width: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            refusal_threshold: 10,
            spam_sender_threshold: 100,
            ip_threshold: 10,
            min_sends: DEFAULT_MIN_SENDS,
            spam_score_threshold: DEFAULT_SPAM_SCORE_THRESHOLD,
            chart_top_n: 10,
            chart_width: 50,
        }
    }
}

impl AnalyzerConfig {
    /// Get the path to the user config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("eximscope").join("config.json"))
    }

    /// Load the user config, returning defaults if it is missing or broken
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::info!("No config directory, using default thresholds");
            return Self::default();
        };
        if !path.exists() {
            tracing::info!("No config found at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    /// Load an explicitly requested config file. Errors are returned to the caller.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|cause| ConfigError::Read {
            path: path.to_path_buf(),
            cause,
        })?;
        let config = serde_json::from_str(&contents).map_err(|cause| ConfigError::Parse {
            path: path.to_path_buf(),
            cause,
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |cause| ConfigError::Write {
            path: path.to_path_buf(),
            cause,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(write_err)?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Save config to the user config location
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }
}
