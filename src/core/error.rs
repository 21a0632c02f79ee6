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

/// Loader error types
use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the loader
///
/// Protocol-level outcomes such as a missing auxiliary file or an
/// overflowing transfer are not errors; they are reported through
/// [`LoadOutcome`](crate::core::cdrom::LoadOutcome).
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("IPL.TXT not found under {0}")]
    NoIpl(String),

    #[error("No game mounted")]
    NotMounted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mount error: {0}")]
    Mount(#[from] MountError),

    #[error("ISO9660 error: {0}")]
    Iso(#[from] IsoError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid IPL.TXT line {line}: {reason}")]
    IplParse { line: usize, reason: String },
}

/// Mount-specific error types
#[derive(Error, Debug)]
pub enum MountError {
    #[error("Cannot read directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No IPL.TXT and no .iso image in {0}")]
    NoImage(String),

    #[error("Cannot open image {path}: {source}")]
    ImageOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image {path} is not a valid ISO9660 volume: {source}")]
    InvalidImage {
        path: String,
        #[source]
        source: IsoError,
    },

    #[error("Image {0} has no IPL.TXT in its root")]
    MissingIpl(String),
}

/// ISO9660-specific error types
#[derive(Error, Debug)]
pub enum IsoError {
    #[error("Missing primary volume descriptor (got type 0x{0:02X})")]
    NotPrimaryDescriptor(u8),

    #[error("Missing CD001 signature")]
    BadSignature,

    #[error("Sector {0} is beyond end of image")]
    SectorOutOfRange(u32),

    #[error("Malformed directory record at sector {sector}, offset {offset}")]
    BadRecord { sector: u32, offset: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
