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

//! System integration module
//!
//! Ties the loader, emulated memory and the emulator hooks together and
//! drives the BIOS side of a boot: the IPL bootstrap, the walk over the
//! staged load list and the upload sequences the game requests later.
//!
//! # Example
//! ```no_run
//! use neocdrx::core::config::LoaderConfig;
//! use neocdrx::core::system::System;
//!
//! let mut system = System::new(&LoaderConfig::default())?;
//! system.mount("games/last_resort")?;
//! let report = system.boot()?;
//! println!("{} files loaded", report.loaded_files());
//! # Ok::<(), neocdrx::core::error::EmulatorError>(())
//! ```

use super::cdrom::registers::{IPL_LOAD_LIST, IPL_TEXT, LOAD_DESCRIPTOR_PTR};
use super::cdrom::{
    parse_ipl_text, stage_load_list, CdLoader, Dispatch, LoadOutcome, DESCRIPTOR_SIZE,
    IPL_LIST_CAPACITY,
};
use super::codec::{PassthroughCodec, TileCodec};
use super::config::LoaderConfig;
use super::error::Result;
use super::host::{Host, NullHost};
use super::memory::{Memory, MemoryBus, RegionKind};
use super::storage::MountKind;
use std::path::{Path, PathBuf};

/// Trailing EOF bytes staged after IPL.TXT
const IPL_TEXT_PADDING: usize = 2;

/// What a boot loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    /// Length of IPL.TXT in bytes
    pub ipl_length: usize,

    /// One entry per descriptor in the load list, in order
    pub requests: Vec<Dispatch>,
}

impl BootReport {
    /// Number of files that were loaded into memory
    pub fn loaded_files(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| matches!(r.outcome(), Some(LoadOutcome::Loaded { .. })))
            .count()
    }

    /// Total bytes written by all loads
    pub fn loaded_bytes(&self) -> usize {
        self.requests
            .iter()
            .filter_map(|r| match r.outcome() {
                Some(LoadOutcome::Loaded { bytes }) => Some(bytes),
                _ => None,
            })
            .sum()
    }

    /// Requests that were not handled or overflowed their region
    pub fn failures(&self) -> impl Iterator<Item = &Dispatch> {
        self.requests
            .iter()
            .filter(|r| !matches!(r.outcome(), Some(LoadOutcome::Loaded { .. })))
    }
}

/// NeoGeo CD loading system
///
/// Owns the emulated memory, the loader context and the host hooks.
pub struct System {
    /// Emulated memory
    memory: Memory,
    /// Loader context
    loader: CdLoader,
    /// Emulator hooks
    host: Box<dyn Host>,
}

impl System {
    /// Create a headless system: passthrough codec, no-op host
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        Self::with_parts(config, Box::new(PassthroughCodec), Box::new(NullHost))
    }

    /// Create a system with a specific codec and host
    pub fn with_parts(
        config: &LoaderConfig,
        codec: Box<dyn TileCodec>,
        host: Box<dyn Host>,
    ) -> Result<Self> {
        Ok(Self {
            memory: Memory::new(),
            loader: CdLoader::from_config(config, codec)?,
            host,
        })
    }

    /// Mount a game directory
    pub fn mount(&mut self, path: impl AsRef<Path>) -> Result<MountKind> {
        let path = path.as_ref();
        let kind = self.loader.mount(path)?;
        log::info!("Mounted {} ({:?})", path.display(), kind);
        Ok(kind)
    }

    /// Clear memory and loader state, keeping the mounted game
    pub fn reset(&mut self) {
        self.memory.reset();
        self.loader.end_ipl();
        self.loader.set_img_display(false);
    }

    /// Run the initial program load
    ///
    /// Stages IPL.TXT, turns it into the BIOS load list and then answers
    /// one load request per list entry until the list ends.
    pub fn boot(&mut self) -> Result<BootReport> {
        let ipl_length = self.loader.ipl(&mut self.memory, self.host.as_mut())?;

        let start = IPL_TEXT as usize;
        let text = self
            .memory
            .region(RegionKind::Program)
            .get(start..start + ipl_length + IPL_TEXT_PADDING)
            .unwrap_or_default();
        let entries = parse_ipl_text(text)?;
        stage_load_list(&mut self.memory, &entries, IPL_LOAD_LIST)?;
        log::debug!("IPL list: {} entries", entries.len());

        let mut requests = Vec::with_capacity(entries.len());
        let mut slot = IPL_LOAD_LIST;
        // A load may overwrite the list itself; never walk past its end
        for _ in 0..=IPL_LIST_CAPACITY {
            let request = self.load_next(slot)?;
            if request == Dispatch::EndOfList {
                break;
            }
            requests.push(request);
            slot += DESCRIPTOR_SIZE;
        }

        self.loader.end_ipl();

        let report = BootReport {
            ipl_length,
            requests,
        };
        log::info!(
            "Boot complete: {} of {} files, {} bytes",
            report.loaded_files(),
            report.requests.len(),
            report.loaded_bytes()
        );
        Ok(report)
    }

    /// Point the BIOS at the descriptor at `address` and load it
    pub fn load_next(&mut self, address: u32) -> Result<Dispatch> {
        self.memory.write32(LOAD_DESCRIPTOR_PTR, address);
        let request = self.loader.load_files(&mut self.memory, self.host.as_mut())?;

        if let Dispatch::Dispatched {
            filename, outcome, ..
        } = &request
        {
            match outcome {
                LoadOutcome::Loaded { bytes } => log::debug!("{}: {} bytes", filename, bytes),
                LoadOutcome::Skipped(reason) => log::warn!("{}: skipped ({:?})", filename, reason),
                LoadOutcome::Overflow { region, .. } => {
                    log::warn!("{}: does not fit in {}", filename, region)
                }
            }
        }
        Ok(request)
    }

    /// Run one upload sequence over the control blocks `stage` prepares
    ///
    /// `stage` is called before each transfer and returns false once there
    /// is nothing left to send.
    pub fn upload_sequence(
        &mut self,
        mut stage: impl FnMut(&mut Memory) -> bool,
    ) -> Vec<LoadOutcome> {
        self.loader.start_upload(&mut self.memory, self.host.as_mut());

        let mut outcomes = Vec::new();
        while stage(&mut self.memory) {
            outcomes.push(self.loader.upload(&mut self.memory));
        }

        self.loader.end_upload(&mut self.memory, self.host.as_mut());
        outcomes
    }

    /// Write every region to `<dir>/<region>.bin`
    pub fn dump_regions(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        RegionKind::ALL
            .iter()
            .map(|&kind| {
                let path = dir.join(format!("{}.bin", kind.name()));
                std::fs::write(&path, self.memory.region(kind))?;
                log::debug!("Wrote {}", path.display());
                Ok(path)
            })
            .collect()
    }

    /// Emulated memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable emulated memory
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Loader context
    pub fn loader(&self) -> &CdLoader {
        &self.loader
    }

    /// Mutable loader context
    pub fn loader_mut(&mut self) -> &mut CdLoader {
        &mut self.loader
    }
}

#[cfg(test)]
mod tests;
