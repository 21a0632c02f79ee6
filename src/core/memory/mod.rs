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

//! Emulated NeoGeo CD memory regions
//!
//! The loader writes into five fixed-size banks owned by the emulator core,
//! plus two small side tables. Program memory doubles as the 68000's view of
//! work RAM, which is where the BIOS stages load descriptors, upload control
//! fields and upload source data.
//!
//! # Memory Map
//!
//! | Region         | Size     | Content                                |
//! |----------------|----------|----------------------------------------|
//! | Program        | 0x200000 | 68k program code/data, upload staging  |
//! | Fix            | 0x20000  | fix layer tiles (decoded in place)     |
//! | Sprite         | 0x400000 | sprite tiles (decoded in place)        |
//! | Z80            | 0x10000  | sound CPU address space                |
//! | PCM            | 0x100000 | ADPCM samples                          |
//! | Game vectors   | 0x100    | first 256 bytes of PRG captured at IPL |
//!
//! # Bus Access
//!
//! BIOS-visible fields are read and written through [`MemoryBus`], which
//! models the 68000's big-endian view of its address space. [`Memory`]
//! implements it by mapping 0x000000-0x1FFFFF onto program memory; a CPU
//! core with its own bus can implement the trait directly.
//!
//! # Example
//!
//! ```
//! use neocdrx::core::memory::{Memory, MemoryBus};
//!
//! let mut memory = Memory::new();
//! memory.write32(0x10FEF4, 0x12345678);
//! assert_eq!(memory.read16(0x10FEF4), 0x1234);
//! assert_eq!(memory.read8(0x10FEF7), 0x78);
//! ```

mod region;
#[cfg(test)]
mod tests;

pub use region::{
    RegionKind, FIX_SIZE, FIX_USAGE_SIZE, GAME_VECTORS_SIZE, PCM_SIZE, PRG_SIZE, SPR_SIZE,
    Z80_SIZE,
};

/// Bytes of fix memory protected while the IPL loading screen is visible
pub const IPL_FIX_PROTECT: usize = 0x6000;

/// Entries of the fix usage table saved alongside the protected tiles
pub const IPL_FIX_USAGE_PROTECT: usize = 0x300;

/// Typed access to the 68000 address space
///
/// Implementers only need the byte accessors; wider accesses default to
/// big-endian composition, which is how the 68000 sees memory. Accesses
/// need not be aligned: the BIOS writes the upload bank as a 16-bit value
/// at an odd address.
pub trait MemoryBus {
    /// Read a byte
    fn read8(&self, address: u32) -> u8;

    /// Write a byte
    fn write8(&mut self, address: u32, value: u8);

    /// Read a big-endian 16-bit value
    fn read16(&self, address: u32) -> u16 {
        u16::from_be_bytes([self.read8(address), self.read8(address.wrapping_add(1))])
    }

    /// Read a big-endian 32-bit value
    fn read32(&self, address: u32) -> u32 {
        let hi = self.read16(address) as u32;
        let lo = self.read16(address.wrapping_add(2)) as u32;
        (hi << 16) | lo
    }

    /// Write a big-endian 16-bit value
    fn write16(&mut self, address: u32, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.write8(address, hi);
        self.write8(address.wrapping_add(1), lo);
    }

    /// Write a big-endian 32-bit value
    fn write32(&mut self, address: u32, value: u32) {
        self.write16(address, (value >> 16) as u16);
        self.write16(address.wrapping_add(2), value as u16);
    }
}

/// All memory the loader populates
///
/// Buffers are allocated once at their fixed sizes and never resized, so
/// every slice handed out by [`Memory::region`] has the capacity listed in
/// the module table.
pub struct Memory {
    /// Program memory (2MB)
    pub(crate) prg: Vec<u8>,

    /// Fix layer memory (128KB)
    pub(crate) fix: Vec<u8>,

    /// Sprite memory (4MB)
    pub(crate) spr: Vec<u8>,

    /// Z80 address space (64KB)
    pub(crate) z80: Vec<u8>,

    /// ADPCM sample memory (1MB)
    pub(crate) pcm: Vec<u8>,

    /// Copy of the first 256 bytes of program memory taken during IPL
    pub(crate) game_vectors: [u8; GAME_VECTORS_SIZE],

    /// Per-tile usage table maintained by the fix decoder
    pub(crate) fix_usage: Vec<u8>,

    /// Save area for fix tiles and usage entries during IPL protection
    pub(crate) ipl_backup: Vec<u8>,
}

impl Memory {
    /// 68000 address bus width mask (24 bits)
    const ADDRESS_MASK: u32 = 0x00FF_FFFF;

    /// Value returned for reads outside program memory
    const OPEN_BUS: u8 = 0xFF;

    /// Create zero-filled memory
    pub fn new() -> Self {
        Self {
            prg: vec![0u8; PRG_SIZE],
            fix: vec![0u8; FIX_SIZE],
            spr: vec![0u8; SPR_SIZE],
            z80: vec![0u8; Z80_SIZE],
            pcm: vec![0u8; PCM_SIZE],
            game_vectors: [0u8; GAME_VECTORS_SIZE],
            fix_usage: vec![0u8; FIX_USAGE_SIZE],
            ipl_backup: vec![0u8; IPL_FIX_PROTECT + IPL_FIX_USAGE_PROTECT],
        }
    }

    /// Clear every region back to zero
    pub fn reset(&mut self) {
        self.prg.fill(0);
        self.fix.fill(0);
        self.spr.fill(0);
        self.z80.fill(0);
        self.pcm.fill(0);
        self.game_vectors.fill(0);
        self.fix_usage.fill(0);
        self.ipl_backup.fill(0);
    }

    /// Borrow a region
    pub fn region(&self, kind: RegionKind) -> &[u8] {
        match kind {
            RegionKind::Program => &self.prg,
            RegionKind::Fix => &self.fix,
            RegionKind::Sprite => &self.spr,
            RegionKind::Z80 => &self.z80,
            RegionKind::Pcm => &self.pcm,
        }
    }

    /// Mutably borrow a region
    pub fn region_mut(&mut self, kind: RegionKind) -> &mut [u8] {
        match kind {
            RegionKind::Program => &mut self.prg,
            RegionKind::Fix => &mut self.fix,
            RegionKind::Sprite => &mut self.spr,
            RegionKind::Z80 => &mut self.z80,
            RegionKind::Pcm => &mut self.pcm,
        }
    }

    /// Game vector table captured during IPL
    pub fn game_vectors(&self) -> &[u8] {
        &self.game_vectors
    }

    /// Fix tile usage table
    pub fn fix_usage(&self) -> &[u8] {
        &self.fix_usage
    }

    /// Mutable fix tile usage table, for the fix decoder
    pub fn fix_usage_mut(&mut self) -> &mut [u8] {
        &mut self.fix_usage
    }

    /// Copy bytes into program memory
    ///
    /// Returns false without writing if the range does not fit.
    pub fn write_program(&mut self, address: u32, data: &[u8]) -> bool {
        let start = address as usize;
        match start.checked_add(data.len()) {
            Some(end) if end <= PRG_SIZE => {
                self.prg[start..end].copy_from_slice(data);
                true
            }
            _ => false,
        }
    }

    /// Save the protected low fix tiles and usage entries
    pub(crate) fn save_ipl_fix(&mut self) {
        self.ipl_backup[..IPL_FIX_PROTECT].copy_from_slice(&self.fix[..IPL_FIX_PROTECT]);
        self.ipl_backup[IPL_FIX_PROTECT..]
            .copy_from_slice(&self.fix_usage[..IPL_FIX_USAGE_PROTECT]);
    }

    /// Put back what [`Memory::save_ipl_fix`] saved
    pub(crate) fn restore_ipl_fix(&mut self) {
        self.fix[..IPL_FIX_PROTECT].copy_from_slice(&self.ipl_backup[..IPL_FIX_PROTECT]);
        self.fix_usage[..IPL_FIX_USAGE_PROTECT]
            .copy_from_slice(&self.ipl_backup[IPL_FIX_PROTECT..]);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for Memory {
    #[inline(always)]
    fn read8(&self, address: u32) -> u8 {
        let address = (address & Self::ADDRESS_MASK) as usize;
        match self.prg.get(address) {
            Some(&value) => value,
            None => {
                log::trace!("Open bus read at 0x{:06X}", address);
                Self::OPEN_BUS
            }
        }
    }

    #[inline(always)]
    fn write8(&mut self, address: u32, value: u8) {
        let address = (address & Self::ADDRESS_MASK) as usize;
        match self.prg.get_mut(address) {
            Some(slot) => *slot = value,
            None => log::trace!("Ignored write 0x{:02X} at 0x{:06X}", value, address),
        }
    }
}
