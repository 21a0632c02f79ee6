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

//! BIOS upload engine
//!
//! Moves data the BIOS has staged in program memory into another region.
//! Each call is fully described by the control block at 0x10FEDA-0x10FEFF
//! and leaves the advanced offset (and bank) there for the next call, so a
//! large asset can be transferred in pieces.

use super::patch::{apply_patch, PATCH_RECORD_WORDS};
use super::registers::*;
use super::{CdLoader, LoadOutcome, SkipReason};
use crate::core::memory::{Memory, MemoryBus, RegionKind};

/// Offset range covered by one bank
pub const BANK_SIZE: u32 = 0x100000;

/// Upload destination selected by the zone nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadZone {
    Prg,
    Fix,
    Spr,
    Z80,
    Pcm,
    Patch,
}

impl UploadZone {
    /// Decode a zone nibble
    pub fn from_nibble(zone: u8) -> Option<Self> {
        match zone & 0x0F {
            0 => Some(UploadZone::Prg),
            1 => Some(UploadZone::Fix),
            2 => Some(UploadZone::Spr),
            3 => Some(UploadZone::Z80),
            4 => Some(UploadZone::Pcm),
            5 => Some(UploadZone::Patch),
            _ => None,
        }
    }
}

/// Carry whole banks out of an offset that ran past one bank
///
/// Offsets strictly greater than [`BANK_SIZE`] move into the bank field;
/// an offset of exactly one bank is left alone. The offset is compared as
/// a signed value, so offsets with the top bit set never carry.
///
/// ```
/// use neocdrx::core::cdrom::normalize_bank;
///
/// assert_eq!(normalize_bank(0x100000, 0), (0x100000, 0));
/// assert_eq!(normalize_bank(0x100001, 0), (0x1, 1));
/// assert_eq!(normalize_bank(0x300000, 2), (0x100000, 4));
/// ```
pub fn normalize_bank(offset: u32, bank: u32) -> (u32, u32) {
    let signed = offset as i32;
    if signed <= BANK_SIZE as i32 {
        return (offset, bank);
    }
    let carry = (offset - 1) / BANK_SIZE;
    (offset - carry * BANK_SIZE, bank.wrapping_add(carry))
}

impl CdLoader {
    /// Run one upload described by the control block
    ///
    /// The zone, bank, destination, source and length are read from the
    /// BIOS upload registers. The destination (and for SPR/PCM the bank)
    /// is written back advanced past the copied data.
    ///
    /// # Returns
    ///
    /// - `LoadOutcome::Loaded` with the bytes copied, or the patch bytes applied
    /// - `LoadOutcome::Overflow` if the source or destination range is out of
    ///   bounds; nothing is copied but the bookkeeping is still written back
    /// - `LoadOutcome::Skipped` for an unknown zone
    ///
    /// # Example
    ///
    /// ```
    /// use neocdrx::core::cdrom::registers::*;
    /// use neocdrx::core::cdrom::LoadOutcome;
    /// use neocdrx::core::{CdLoader, Memory, MemoryBus, RegionKind};
    ///
    /// let mut loader = CdLoader::new();
    /// let mut mem = Memory::new();
    /// mem.write32(0x100000, 0xDEADBEEF);
    ///
    /// // Z80 zone: the destination counts 68000 addresses, two per byte
    /// mem.write8(UPLOAD_ZONE, 3);
    /// mem.write32(UPLOAD_DEST, 0x20);
    /// mem.write32(UPLOAD_SOURCE, 0x100000);
    /// mem.write32(UPLOAD_LENGTH, 4);
    ///
    /// assert_eq!(loader.upload(&mut mem), LoadOutcome::Loaded { bytes: 4 });
    /// assert_eq!(&mem.region(RegionKind::Z80)[0x10..0x14], &[0xDE, 0xAD, 0xBE, 0xEF]);
    /// assert_eq!(mem.read32(UPLOAD_DEST), 0x28);
    /// ```
    pub fn upload(&mut self, mem: &mut Memory) -> LoadOutcome {
        let zone_nibble = mem.read8(UPLOAD_ZONE) & 0x0F;
        let bank = mem.read8(UPLOAD_BANK) as u32;
        let dest = mem.read32(UPLOAD_DEST);
        let source = mem.read32(UPLOAD_SOURCE) as usize;
        let length = mem.read32(UPLOAD_LENGTH) as usize;

        let Some(zone) = UploadZone::from_nibble(zone_nibble) else {
            log::debug!("Ignoring upload to unknown zone {}", zone_nibble);
            return LoadOutcome::Skipped(SkipReason::UnknownZone(zone_nibble));
        };

        log::debug!(
            "Upload {:?}: src 0x{:06X} dest 0x{:08X} bank {} len 0x{:X}",
            zone,
            source,
            dest,
            bank,
            length
        );

        let outcome = match zone {
            UploadZone::Prg => {
                let outcome = copy_from_prg(mem, RegionKind::Program, source, dest as usize, length);
                mem.write32(UPLOAD_DEST, dest.wrapping_add(length as u32));
                outcome
            }
            UploadZone::Fix => {
                let offset = (dest >> 1) as usize;
                let outcome = copy_from_prg(mem, RegionKind::Fix, source, offset, length);
                if outcome.is_loaded() {
                    let Memory { fix, fix_usage, .. } = &mut *mem;
                    self.codec.decode_fix(fix, fix_usage, offset, length);
                }
                mem.write32(UPLOAD_DEST, dest.wrapping_add((length as u32) << 1));
                outcome
            }
            UploadZone::Spr => {
                let offset = (dest as usize).wrapping_add((bank as usize) << 20);
                let outcome = copy_from_prg(mem, RegionKind::Sprite, source, offset, length);
                if outcome.is_loaded() {
                    self.codec.decode_spr(&mut mem.spr, offset, length);
                }
                let (dest, bank) = normalize_bank(dest.wrapping_add(length as u32), bank);
                write_back(mem, dest, bank);
                outcome
            }
            UploadZone::Z80 => {
                let offset = (dest >> 1) as usize;
                let outcome = copy_from_prg(mem, RegionKind::Z80, source, offset, length);
                mem.write32(UPLOAD_DEST, dest.wrapping_add((length as u32) << 1));
                outcome
            }
            UploadZone::Pcm => {
                let offset = ((dest >> 1) as usize).wrapping_add((bank as usize) << 19);
                let outcome = copy_from_prg(mem, RegionKind::Pcm, source, offset, length);
                let (dest, bank) =
                    normalize_bank(dest.wrapping_add((length as u32) << 1), bank);
                write_back(mem, dest, bank);
                outcome
            }
            UploadZone::Patch => {
                let records = mem.prg.get(source..).unwrap_or_default();
                let applied = apply_patch(&mut mem.z80, records, dest, bank);
                LoadOutcome::Loaded {
                    bytes: applied * PATCH_RECORD_WORDS * 2,
                }
            }
        };

        if let LoadOutcome::Overflow { region, offset, .. } = outcome {
            log::warn!(
                "Upload to {} overflows: offset 0x{:08X} + {} bytes",
                region,
                offset,
                length
            );
        }
        outcome
    }
}

impl LoadOutcome {
    fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Copy `length` bytes of program memory at `source` into `region`
///
/// Both ranges are checked first; nothing is written if either is out of
/// bounds.
fn copy_from_prg(
    mem: &mut Memory,
    region: RegionKind,
    source: usize,
    offset: usize,
    length: usize,
) -> LoadOutcome {
    if !RegionKind::Program.fits(source, length) {
        return LoadOutcome::Overflow {
            region: RegionKind::Program,
            offset: source,
            length,
            capacity: RegionKind::Program.capacity(),
        };
    }
    if !region.fits(offset, length) {
        return LoadOutcome::Overflow {
            region,
            offset,
            length,
            capacity: region.capacity(),
        };
    }

    match region {
        RegionKind::Program => mem.prg.copy_within(source..source + length, offset),
        _ => {
            let Memory {
                prg,
                fix,
                spr,
                z80,
                pcm,
                ..
            } = &mut *mem;
            let dst = match region {
                RegionKind::Fix => fix,
                RegionKind::Sprite => spr,
                RegionKind::Z80 => z80,
                _ => pcm,
            };
            dst[offset..offset + length].copy_from_slice(&prg[source..source + length]);
        }
    }

    LoadOutcome::Loaded { bytes: length }
}

/// Store the advanced offset and bank; the bank is written as 16 bits
fn write_back(mem: &mut Memory, dest: u32, bank: u32) {
    mem.write32(UPLOAD_DEST, dest);
    mem.write16(UPLOAD_BANK, bank as u16);
}
