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

//! Loading screen progress accounting

use super::descriptor::{read_filename, DESCRIPTOR_SIZE};
use super::filetype::resolve_filename;
use super::registers::*;
use super::CdLoader;
use crate::core::host::Host;
use crate::core::memory::{Memory, MemoryBus, PRG_SIZE};
use crate::core::storage::{file_length, ISO_SECTOR_SIZE};

/// Sectors of declared work still to be shown
///
/// Each declaration replaces the previous one; the BIOS drives the
/// countdown through [`CdLoader::progress_show`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectorProgress {
    remaining: u32,
}

impl SectorProgress {
    /// Create an empty counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `bytes` of pending work
    ///
    /// One tick covers four sectors.
    pub fn declare(&mut self, bytes: usize) {
        let sectors = bytes.div_ceil(ISO_SECTOR_SIZE);
        self.remaining = (sectors >> 2).min(u32::MAX as usize) as u32;
    }

    /// Count one tick down, stopping at zero
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    /// Ticks left
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Forget any declared work
    pub fn reset(&mut self) {
        self.remaining = 0;
    }
}

impl CdLoader {
    /// Advance the loading screen by one tick
    ///
    /// Called by the BIOS once per emulated frame while a load is shown.
    pub fn progress_show(&mut self, mem: &mut Memory, host: &mut dyn Host) {
        let remaining = self.progress.tick();
        mem.write16(PROGRESS_REMAINING, remaining as u16);

        let accum = mem
            .read32(PROGRESS_ACCUM)
            .wrapping_add(mem.read32(PROGRESS_STEP) << 4)
            .min(PROGRESS_ACCUM_MAX);
        mem.write32(PROGRESS_ACCUM, accum);

        if mem.read8(LOADING_SCREEN) != 0 {
            host.refresh_display();
        }
    }

    /// Size the progress bar for the IPL load list
    ///
    /// Walks the descriptors at [`IPL_LOAD_LIST`] and totals the sectors of
    /// every file that can be opened. Returns the total.
    pub fn set_sectors(&mut self, mem: &mut Memory) -> u32 {
        let mut total: u32 = 0;
        let mut address = IPL_LOAD_LIST;

        while (address + DESCRIPTOR_SIZE) as usize <= PRG_SIZE {
            let name = read_filename(&*mem, address);
            if name.is_empty() {
                break;
            }
            let (name, _) = resolve_filename(&name);

            if let Ok(mut file) = self.mount.open(&name) {
                if let Ok(len) = file_length(file.as_mut()) {
                    total = total.wrapping_add(len.div_ceil(ISO_SECTOR_SIZE as u64) as u32);
                }
            }
            address += DESCRIPTOR_SIZE;
        }

        log::debug!("Load list totals {} sectors", total);

        mem.write32(PROGRESS_TOTAL, total);
        if total != 0 {
            mem.write32(PROGRESS_STEP, ((0x8000 / total) << 8) | 0x80);
        }
        mem.write32(PROGRESS_ACCUM, 0);
        mem.write8(PROGRESS_COUNTER, 0);
        total
    }
}
