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

//! IPL bootstrap and upload bracketing
//!
//! # IPL.TXT
//!
//! One load per line, terminated by an EOF byte (0x1A) or the end of file:
//!
//! ```text
//! NAME.EXT,bank,offset
//! ```
//!
//! `bank` and `offset` are hexadecimal. The BIOS turns each line into a
//! load descriptor in the table at 0x115A06.

use super::descriptor::{LoadDescriptor, DESCRIPTOR_SIZE};
use super::registers::*;
use super::CdLoader;
use crate::core::error::{EmulatorError, Result};
use crate::core::host::Host;
use crate::core::memory::{Memory, MemoryBus, IPL_FIX_PROTECT};
use crate::core::storage::{read_fully, IPL_TXT};

/// End-of-text marker in IPL.TXT
const EOF_MARK: u8 = 0x1A;

/// Largest IPL.TXT the BIOS reads
const IPL_TEXT_MAX: usize = 2048;

/// Largest logo program
const LOGO_MAX: usize = 0x20000;

/// Logo program names by BIOS region
const LOGO_NAMES: [&str; 4] = ["LOGO_J.PRG", "LOGO_U.PRG", "LOGO_E.PRG", "LOGO_"];

/// Descriptors that fit in the IPL table below the fix mirror
pub const IPL_LIST_CAPACITY: usize =
    ((IPL_FIX_MIRROR - IPL_LOAD_LIST) / DESCRIPTOR_SIZE) as usize - 1;

/// One line of IPL.TXT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IplEntry {
    pub filename: String,
    pub bank: u8,
    pub offset: u32,
}

impl IplEntry {
    /// The load descriptor the BIOS would build for this entry
    pub fn descriptor(&self) -> LoadDescriptor {
        LoadDescriptor::new(self.filename.clone(), self.bank, self.offset)
    }
}

/// Parse IPL.TXT contents
///
/// Each line is `FILENAME,BANK,OFFSET` with bank and offset in hex. Blank
/// lines are skipped and parsing stops at the first EOF byte.
///
/// # Errors
///
/// `EmulatorError::IplParse` with the 1-based line of a malformed entry.
///
/// # Example
///
/// ```
/// use neocdrx::core::cdrom::parse_ipl_text;
///
/// let entries = parse_ipl_text(b"PROG.PRG,0,0\r\n\r\nGFX.SPR,1,80000\r\n\x1AJUNK").unwrap();
///
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[1].filename, "GFX.SPR");
/// assert_eq!(entries[1].bank, 1);
/// assert_eq!(entries[1].offset, 0x80000);
/// ```
pub fn parse_ipl_text(text: &[u8]) -> Result<Vec<IplEntry>> {
    let end = text.iter().position(|&b| b == EOF_MARK).unwrap_or(text.len());
    let text = String::from_utf8_lossy(&text[..end]);

    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parse_error = |reason: String| EmulatorError::IplParse {
            line: index + 1,
            reason,
        };

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let &[filename, bank, offset] = fields.as_slice() else {
            return Err(parse_error(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        };
        if filename.is_empty() {
            return Err(parse_error("empty filename".to_string()));
        }

        let bank = u8::from_str_radix(bank, 16)
            .map_err(|e| parse_error(format!("bad bank '{}': {}", bank, e)))?;
        let offset = u32::from_str_radix(offset, 16)
            .map_err(|e| parse_error(format!("bad offset '{}': {}", offset, e)))?;

        entries.push(IplEntry {
            filename: filename.to_string(),
            bank,
            offset,
        });
    }

    Ok(entries)
}

/// Write `entries` as a load list at `address`, followed by an end marker
///
/// # Errors
///
/// `EmulatorError::IplParse` if a list staged at [`IPL_LOAD_LIST`] would run
/// into the fix mirror.
pub fn stage_load_list(bus: &mut impl MemoryBus, entries: &[IplEntry], address: u32) -> Result<()> {
    if address == IPL_LOAD_LIST && entries.len() > IPL_LIST_CAPACITY {
        return Err(EmulatorError::IplParse {
            line: IPL_LIST_CAPACITY + 1,
            reason: format!("more than {} entries", IPL_LIST_CAPACITY),
        });
    }

    let mut slot = address;
    for entry in entries {
        entry.descriptor().write(bus, slot);
        slot = slot.wrapping_add(DESCRIPTOR_SIZE);
    }
    LoadDescriptor::default().write(bus, slot);
    Ok(())
}

impl CdLoader {
    /// Start the initial program load
    ///
    /// Loads the region logo, copies IPL.TXT into work RAM for the BIOS to
    /// parse and halts the 68000 until the BIOS takes over.
    ///
    /// # Returns
    ///
    /// - `Ok(len)` with the length of IPL.TXT
    /// - `Err(EmulatorError::NotMounted)` if no game is mounted
    /// - `Err(EmulatorError::NoIpl)` if the volume has no IPL.TXT
    pub fn ipl(&mut self, mem: &mut Memory, host: &mut dyn Host) -> Result<usize> {
        if !self.mount.is_mounted() {
            return Err(EmulatorError::NotMounted);
        }

        self.load_logo(mem)?;

        let mut file = self.mount.open(IPL_TXT).map_err(|e| {
            log::warn!("Cannot open {}: {}", IPL_TXT, e);
            let source = self
                .mount
                .volume()
                .map(|v| v.describe())
                .unwrap_or_default();
            EmulatorError::NoIpl(source)
        })?;

        // Two spare EOF bytes always follow the text
        let mut text = [EOF_MARK; IPL_TEXT_MAX + 2];
        let length = read_fully(file.as_mut(), &mut text[..IPL_TEXT_MAX])?;
        let staged = &text[..length + 2];
        if !mem.write_program(IPL_TEXT, staged) {
            log::warn!("IPL text does not fit at 0x{:06X}", IPL_TEXT);
        }

        log::info!("IPL: {} bytes of {}", length, IPL_TXT);

        self.progress.reset();
        self.ipl_in_progress = true;
        host.set_cpu_enabled(false);
        Ok(length)
    }

    /// Leave the IPL phase
    pub fn end_ipl(&mut self) {
        log::debug!("IPL finished");
        self.ipl_in_progress = false;
    }

    /// Prepare for an upload sequence
    pub fn start_upload(&mut self, mem: &mut Memory, host: &mut dyn Host) {
        mem.write8(UPLOAD_ACTIVE, 0);
        if mem.read8(LOADING_SCREEN) != 0 {
            self.codec.undecode_fix(&mut mem.fix, 0, IPL_FIX_PROTECT);
        }
        host.set_cpu_enabled(false);
    }

    /// Finish an upload sequence and hand control back to the BIOS
    pub fn end_upload(&mut self, mem: &mut Memory, host: &mut dyn Host) {
        host.refresh_display();

        for (address, width, value) in END_UPLOAD_WRITES {
            match width {
                4 => mem.write32(address, value),
                2 => mem.write16(address, value as u16),
                _ => mem.write8(address, value as u8),
            }
        }

        host.restore_video();
        host.set_cpu_enabled(true);
        self.img_display = false;
    }

    /// Load the region's logo program, if the game ships one
    fn load_logo(&mut self, mem: &mut Memory) -> Result<()> {
        let region = (mem.read8(BIOS_REGION) & 3) as usize;
        let name = LOGO_NAMES[region];

        let mut file = match self.mount.open(name) {
            Ok(file) => file,
            Err(_) => {
                log::debug!("No logo program {}", name);
                return Ok(());
            }
        };

        let start = LOGO_PRG as usize;
        let read = read_fully(file.as_mut(), &mut mem.prg[start..start + LOGO_MAX])?;
        log::debug!("Loaded {} ({} bytes) at 0x{:06X}", name, read, LOGO_PRG);
        Ok(())
    }
}
