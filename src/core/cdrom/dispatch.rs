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

//! Load request dispatch

use super::descriptor::{mark_image, LoadDescriptor};
use super::filetype::{resolve_filename, FileType};
use super::registers::*;
use super::{CdLoader, LoadOutcome, SkipReason};
use crate::core::error::Result;
use crate::core::host::Host;
use crate::core::memory::{Memory, MemoryBus};

/// What one load request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The descriptor had an empty filename; the list is finished
    EndOfList,
    /// A file was routed to its loader
    Dispatched {
        /// Name as opened, with any alias applied
        filename: String,
        /// Recognized type, `None` when the extension is unknown
        file_type: Option<FileType>,
        /// What the loader did
        outcome: LoadOutcome,
    },
}

impl Dispatch {
    /// Outcome of a dispatched request
    pub fn outcome(&self) -> Option<LoadOutcome> {
        match self {
            Dispatch::EndOfList => None,
            Dispatch::Dispatched { outcome, .. } => Some(*outcome),
        }
    }
}

impl CdLoader {
    /// Handle one "load next file" request from the BIOS
    ///
    /// Reads the descriptor the BIOS points at, resolves its type and
    /// routes it to the matching loader with the type's offset scaling.
    ///
    /// # Arguments
    ///
    /// * `mem` - Emulated memory; the descriptor pointer is read from it
    /// * `host` - Emulator hooks passed on to the loader
    ///
    /// # Returns
    ///
    /// - `Ok(Dispatch::EndOfList)` for a descriptor with an empty filename
    /// - `Ok(Dispatch::Dispatched)` with the resolved name, type and outcome
    /// - `Err` only for I/O failures while reading a file
    pub fn load_files(&mut self, mem: &mut Memory, host: &mut dyn Host) -> Result<Dispatch> {
        mem.write8(LOAD_STATUS, LOAD_STATUS_BUSY);
        let bank_shadow = mem.read8(UPLOAD_BANK_SHADOW);
        mem.write8(UPLOAD_BANK, bank_shadow);

        let address = mem.read32(LOAD_DESCRIPTOR_PTR);
        let descriptor = LoadDescriptor::read(&*mem, address);
        if descriptor.is_end() {
            log::debug!("End of load list at 0x{:06X}", address);
            return Ok(Dispatch::EndOfList);
        }

        self.img_display = false;

        if mem.read8(LOADING_SCREEN) != 0 {
            if address == IPL_LOAD_LIST {
                self.set_sectors(mem);
            }
            host.refresh_display();
        }

        if self.ipl_in_progress {
            mark_image(mem, address);
        }

        let (filename, file_type) = resolve_filename(&descriptor.filename);
        let Some(file_type) = file_type else {
            log::debug!("Skipping {}: unrecognized type", filename);
            return Ok(Dispatch::Dispatched {
                filename,
                file_type: None,
                outcome: LoadOutcome::Skipped(SkipReason::UnrecognizedType),
            });
        };

        let bank = descriptor.bank as u32;
        let offset = descriptor.offset;
        log::debug!(
            "Loading {} as {} (bank {}, offset 0x{:08X})",
            filename,
            file_type,
            bank,
            offset
        );

        let outcome = match file_type {
            FileType::Prg => self.load_prg(mem, host, &filename, offset as usize)?,
            FileType::Fix => self.load_fix(mem, host, &filename, (offset >> 1) as usize)?,
            FileType::Spr => {
                let offset = ((bank & 3) as usize) * 0x100000 + offset as usize;
                self.load_spr(mem, host, &filename, offset)?
            }
            FileType::Z80 => self.load_z80(mem, host, &filename, (offset >> 1) as usize)?,
            FileType::Pat => self.load_pat(mem, &filename, offset, bank)?,
            FileType::Pcm => {
                let offset = (bank as usize) * 0x80000 + (offset >> 1) as usize;
                self.load_pcm(mem, host, &filename, offset)?
            }
        };

        Ok(Dispatch::Dispatched {
            filename,
            file_type: Some(file_type),
            outcome,
        })
    }
}
