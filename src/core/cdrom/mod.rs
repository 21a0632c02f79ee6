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

//! NeoGeo CD program loader
//!
//! The NeoGeo CD BIOS never reads sectors itself in this emulator. Instead
//! it prepares a *load descriptor* (filename, bank, offset) in work RAM and
//! traps into the loader, which reads the named file from the mounted game
//! and streams it straight into the emulated memory region selected by the
//! file's extension. Data the BIOS already holds in program memory is moved
//! by the *upload* engine, driven by a block of control fields.
//!
//! # File Types
//!
//! | Extension        | Region  | Offset used               | Post-processing       |
//! |------------------|---------|---------------------------|-----------------------|
//! | PRG (A80)        | Program | offset                    | game vectors at IPL   |
//! | FIX              | Fix     | offset / 2                | fix decode per chunk  |
//! | SPR (OBJ)        | Sprite  | (bank & 3) * 1MB + offset | sprite decode / chunk |
//! | Z80              | Z80     | offset / 2                | Z80 reset at offset 0 |
//! | PAT (AAT)        | —       | bank, offset              | Z80 relocation patch  |
//! | PCM (ACM)        | PCM     | bank * 512KB + offset / 2 | —                     |
//!
//! # Upload Zones
//!
//! | Zone | Destination | Address                      | Offset advance |
//! |------|-------------|------------------------------|----------------|
//! | 0    | Program     | offset                       | length         |
//! | 1    | Fix         | offset / 2                   | length * 2     |
//! | 2    | Sprite      | bank * 1MB + offset          | length + wrap  |
//! | 3    | Z80         | offset / 2                   | length * 2     |
//! | 4    | PCM         | bank * 512KB + offset / 2    | length*2 + wrap|
//! | 5    | Z80 patch   | —                            | —              |
//!
//! # Outcomes
//!
//! Nothing in the load protocol is fatal. A missing file or an unknown
//! extension is skipped, and a transfer that would run past the end of its
//! region is accepted but discarded so the BIOS carries on. Each case is a
//! distinct [`LoadOutcome`] so callers can tell them apart.
//!
//! # Example
//!
//! ```no_run
//! use neocdrx::core::cdrom::CdLoader;
//! use neocdrx::core::host::NullHost;
//! use neocdrx::core::memory::Memory;
//!
//! let mut loader = CdLoader::new();
//! let mut memory = Memory::new();
//! let mut host = NullHost;
//!
//! loader.mount("games/last_resort").unwrap();
//! loader.ipl(&mut memory, &mut host).unwrap();
//! ```

mod descriptor;
mod dispatch;
mod filetype;
mod ipl;
mod loaders;
mod patch;
mod progress;
pub mod registers;
#[cfg(test)]
mod tests;
mod upload;

pub use descriptor::{LoadDescriptor, DESCRIPTOR_SIZE, FILENAME_LEN};
pub use dispatch::Dispatch;
pub use filetype::{resolve_filename, split_filename, FileType};
pub use ipl::{parse_ipl_text, stage_load_list, IplEntry, IPL_LIST_CAPACITY};
pub use patch::{apply_patch, PATCH_RECORD_WORDS};
pub use progress::SectorProgress;
pub use upload::{normalize_bank, UploadZone, BANK_SIZE};

use crate::core::codec::{PassthroughCodec, TileCodec};
use crate::core::config::LoaderConfig;
use crate::core::error::{EmulatorError, MountError, Result};
use crate::core::memory::RegionKind;
use crate::core::storage::{MountKind, MountState};
use std::path::Path;

/// Default streaming chunk size (128KB)
pub const DEFAULT_CHUNK_SIZE: usize = 0x20000;

/// Why a request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file could not be opened
    FileNotFound,
    /// The extension maps to no region
    UnrecognizedType,
    /// The upload zone selector is not one of the six known zones
    UnknownZone(u8),
}

/// Result of one load or upload request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Data was transferred
    Loaded {
        /// Bytes actually written (or patch bytes consumed)
        bytes: usize,
    },
    /// Nothing was done and nothing is reported to the BIOS
    Skipped(SkipReason),
    /// The transfer would have run past the region end; nothing was written
    Overflow {
        /// Region the transfer targeted
        region: RegionKind,
        /// Requested start offset within the region
        offset: usize,
        /// Requested length
        length: usize,
        /// Capacity of the region
        capacity: usize,
    },
}

impl LoadOutcome {
    /// Whether the BIOS should treat the request as done
    ///
    /// Overflowing transfers count as handled; skipped ones do not.
    pub fn handled(&self) -> bool {
        !matches!(self, LoadOutcome::Skipped(_))
    }
}

/// Loader context
///
/// Holds everything that persists between BIOS requests: the mounted game,
/// the sector progress counter, the IPL flag and the decode strategy.
/// Emulated memory and the emulator hooks are passed to each operation.
pub struct CdLoader {
    /// Mounted game
    pub(super) mount: MountState,

    /// Sectors left to report on the loading screen
    pub(super) progress: SectorProgress,

    /// FIX/SPR layout conversion
    pub(super) codec: Box<dyn TileCodec>,

    /// Streaming chunk size for PRG/FIX/SPR loads
    pub(super) chunk_size: usize,

    /// Set between the IPL bootstrap and the end of the initial load
    pub(super) ipl_in_progress: bool,

    /// Loading-screen image display state
    pub(super) img_display: bool,
}

impl CdLoader {
    /// Create a loader with the passthrough codec and default chunk size
    pub fn new() -> Self {
        Self::with_codec(Box::new(PassthroughCodec))
    }

    /// Create a loader that decodes tiles with `codec`
    pub fn with_codec(codec: Box<dyn TileCodec>) -> Self {
        Self {
            mount: MountState::new(),
            progress: SectorProgress::new(),
            codec,
            chunk_size: DEFAULT_CHUNK_SIZE,
            ipl_in_progress: false,
            img_display: false,
        }
    }

    /// Create a loader from configuration
    pub fn from_config(config: &LoaderConfig, codec: Box<dyn TileCodec>) -> Result<Self> {
        let mut loader = Self::with_codec(codec);
        loader.set_chunk_size(config.chunk_size)?;
        Ok(loader)
    }

    /// Change the streaming chunk size
    pub fn set_chunk_size(&mut self, chunk_size: usize) -> Result<()> {
        if chunk_size == 0 {
            return Err(EmulatorError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        self.chunk_size = chunk_size;
        Ok(())
    }

    /// Streaming chunk size
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Point all subsequent reads at a game directory
    ///
    /// See [`MountState::mount`].
    pub fn mount(&mut self, path: impl AsRef<Path>) -> std::result::Result<MountKind, MountError> {
        self.mount.mount(path)
    }

    /// Current mount
    pub fn mount_state(&self) -> &MountState {
        &self.mount
    }

    /// Sector progress counter
    pub fn progress(&self) -> &SectorProgress {
        &self.progress
    }

    /// Whether the IPL bootstrap is running
    pub fn ipl_in_progress(&self) -> bool {
        self.ipl_in_progress
    }

    /// Loading-screen image display state
    pub fn img_display(&self) -> bool {
        self.img_display
    }

    /// Record that the renderer is showing a loading-screen image
    pub fn set_img_display(&mut self, shown: bool) {
        self.img_display = shown;
    }
}

impl Default for CdLoader {
    fn default() -> Self {
        Self::new()
    }
}
