// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Loader configuration
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config`)
//! 3. Environment variables, optionally from a `.env` file
//!
//! # Example
//!
//! ```toml
//! chunk_size = 65536
//! game_dir = "games/last_resort"
//! log_level = "debug"
//! ```

use super::cdrom::DEFAULT_CHUNK_SIZE;
use super::error::{EmulatorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`LoaderConfig::chunk_size`]
pub const ENV_CHUNK_SIZE: &str = "NEOCDRX_CHUNK_SIZE";

/// Environment variable overriding [`LoaderConfig::game_dir`]
pub const ENV_GAME_DIR: &str = "NEOCDRX_GAME_DIR";

/// Environment variable overriding [`LoaderConfig::log_level`]
pub const ENV_LOG: &str = "NEOCDRX_LOG";

/// Loader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Streaming chunk size in bytes
    pub chunk_size: usize,

    /// Game directory used when none is given on the command line
    pub game_dir: Option<PathBuf>,

    /// Default log filter
    pub log_level: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            game_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&text)
    }

    /// Defaults with environment overrides applied
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::default().with_env()
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup(ENV_CHUNK_SIZE) {
            self.chunk_size = parse_size(&value).ok_or_else(|| {
                EmulatorError::Config(format!("{} is not a size: '{}'", ENV_CHUNK_SIZE, value))
            })?;
        }
        if let Some(value) = lookup(ENV_GAME_DIR) {
            self.game_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_LOG) {
            self.log_level = value;
        }
        self.validate()?;
        Ok(self)
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| EmulatorError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(EmulatorError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load `.env` if present; a missing file is not an error
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!("Failed to load .env file: {}", e);
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal size
fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
