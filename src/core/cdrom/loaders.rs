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

//! Per-type region loaders
//!
//! Every loader opens the file on the mounted volume, checks the transfer
//! against the region capacity before touching memory, then streams the
//! file in. Offsets are region-relative; the dispatcher has already applied
//! the per-type scaling.

use super::patch::apply_patch;
use super::registers::{IPL_FIX_MIRROR, LOADING_SCREEN};
use super::{CdLoader, LoadOutcome, SkipReason};
use crate::core::error::Result;
use crate::core::host::Host;
use crate::core::memory::{Memory, MemoryBus, RegionKind, GAME_VECTORS_SIZE, IPL_FIX_PROTECT};
use crate::core::storage::{file_length, read_fully, ReadSeek};
use std::io;

/// Largest patch table read from a PAT file
pub(super) const PATCH_TABLE_MAX: usize = 0x20000;

impl CdLoader {
    /// Load a 68000 program into program memory
    ///
    /// During IPL a load at offset 0 also captures the game's vector table.
    ///
    /// # Arguments
    ///
    /// * `mem` - Emulated memory
    /// * `host` - Emulator hooks, used for overflow reports
    /// * `name` - File to open on the mounted volume
    /// * `offset` - Byte offset into program memory
    ///
    /// # Returns
    ///
    /// - `Ok(LoadOutcome::Loaded)` with the bytes written
    /// - `Ok(LoadOutcome::Skipped)` if the file is missing
    /// - `Ok(LoadOutcome::Overflow)` if the file does not fit; memory is untouched
    /// - `Err(EmulatorError::Io)` if reading the file failed
    ///
    /// # Example
    ///
    /// ```no_run
    /// use neocdrx::core::cdrom::LoadOutcome;
    /// use neocdrx::core::host::NullHost;
    /// use neocdrx::core::{CdLoader, Memory};
    ///
    /// let mut loader = CdLoader::new();
    /// loader.mount("games/aof").unwrap();
    ///
    /// let mut mem = Memory::new();
    /// let outcome = loader.load_prg(&mut mem, &mut NullHost, "PROG.PRG", 0).unwrap();
    /// assert!(matches!(outcome, LoadOutcome::Loaded { .. }));
    /// ```
    pub fn load_prg(
        &mut self,
        mem: &mut Memory,
        host: &mut dyn Host,
        name: &str,
        offset: usize,
    ) -> Result<LoadOutcome> {
        let Some((mut file, length)) = self.open_sized(name)? else {
            return Ok(LoadOutcome::Skipped(SkipReason::FileNotFound));
        };
        if !RegionKind::Program.fits(offset, length) {
            return Ok(self.overflow(host, RegionKind::Program, offset, length));
        }

        let written = stream_into(
            file.as_mut(),
            &mut mem.prg,
            offset,
            self.chunk_size,
            |_, _, _| {},
        )?;

        if offset == 0 && self.ipl_in_progress {
            mem.game_vectors
                .copy_from_slice(&mem.prg[..GAME_VECTORS_SIZE]);
            log::debug!("Captured game vectors from {}", name);
        }

        Ok(self.finish(written))
    }

    /// Load fix tiles into fix memory, decoding each chunk
    ///
    /// While the loading screen is up, the tiles it draws with are kept:
    /// the low fix area is saved before the load and put back after it,
    /// and the incoming tiles are mirrored into program memory for the
    /// BIOS to pick up later.
    ///
    /// # Arguments
    ///
    /// * `mem` - Emulated memory
    /// * `host` - Emulator hooks, used for overflow reports
    /// * `name` - File to open on the mounted volume
    /// * `offset` - Byte offset into fix memory
    ///
    /// # Returns
    ///
    /// The load outcome, as for [`CdLoader::load_prg`].
    pub fn load_fix(
        &mut self,
        mem: &mut Memory,
        host: &mut dyn Host,
        name: &str,
        offset: usize,
    ) -> Result<LoadOutcome> {
        let Some((mut file, length)) = self.open_sized(name)? else {
            return Ok(LoadOutcome::Skipped(SkipReason::FileNotFound));
        };
        if !RegionKind::Fix.fits(offset, length) {
            return Ok(self.overflow(host, RegionKind::Fix, offset, length));
        }

        let protect = mem.read8(LOADING_SCREEN) != 0;
        if protect {
            mem.save_ipl_fix();
        }
        // Only a load that starts at the bottom of fix memory is mirrored
        let mirrored = protect && offset == 0;

        let codec = self.codec.as_mut();
        let Memory {
            prg,
            fix,
            fix_usage,
            ..
        } = &mut *mem;

        let written = stream_into(
            file.as_mut(),
            fix,
            offset,
            self.chunk_size,
            |fix, pos, len| {
                if mirrored {
                    mirror_raw_fix(prg, fix, pos, len);
                }
                codec.decode_fix(fix, fix_usage, pos, len);
            },
        )?;

        if protect {
            mem.restore_ipl_fix();
        }

        Ok(self.finish(written))
    }

    /// Load sprite tiles into sprite memory, decoding each chunk
    ///
    /// # Arguments
    ///
    /// * `offset` - Byte offset into sprite memory, bank already applied
    pub fn load_spr(
        &mut self,
        mem: &mut Memory,
        host: &mut dyn Host,
        name: &str,
        offset: usize,
    ) -> Result<LoadOutcome> {
        let Some((mut file, length)) = self.open_sized(name)? else {
            return Ok(LoadOutcome::Skipped(SkipReason::FileNotFound));
        };
        if !RegionKind::Sprite.fits(offset, length) {
            return Ok(self.overflow(host, RegionKind::Sprite, offset, length));
        }

        let codec = self.codec.as_mut();
        let written = stream_into(
            file.as_mut(),
            &mut mem.spr,
            offset,
            self.chunk_size,
            |spr, pos, len| codec.decode_spr(spr, pos, len),
        )?;

        Ok(self.finish(written))
    }

    /// Load a sound driver into Z80 memory
    ///
    /// A driver loaded at offset 0 restarts the sound CPU.
    ///
    /// # Returns
    ///
    /// The load outcome. [`Host::reset_z80`] is only called for a completed
    /// load at offset 0.
    pub fn load_z80(
        &mut self,
        mem: &mut Memory,
        host: &mut dyn Host,
        name: &str,
        offset: usize,
    ) -> Result<LoadOutcome> {
        let Some((mut file, length)) = self.open_sized(name)? else {
            return Ok(LoadOutcome::Skipped(SkipReason::FileNotFound));
        };
        if !RegionKind::Z80.fits(offset, length) {
            return Ok(self.overflow(host, RegionKind::Z80, offset, length));
        }

        let written = read_fully(file.as_mut(), &mut mem.z80[offset..offset + length])?;

        if offset == 0 {
            host.reset_z80();
        }

        Ok(self.finish(written))
    }

    /// Load ADPCM samples into PCM memory in a single read
    ///
    /// # Arguments
    ///
    /// * `mem` - Emulated memory
    /// * `host` - Emulator hooks, used for overflow reports
    /// * `name` - File to open on the mounted volume
    /// * `offset` - Byte offset into PCM memory, bank already applied
    ///
    /// # Returns
    ///
    /// - `Ok(LoadOutcome::Overflow)` with length 0 if `offset` alone is past
    ///   the region; the file is not opened and nothing is reported
    /// - `Ok(LoadOutcome::Overflow)` if the whole file does not fit
    /// - otherwise the outcome of the read
    pub fn load_pcm(
        &mut self,
        mem: &mut Memory,
        host: &mut dyn Host,
        name: &str,
        offset: usize,
    ) -> Result<LoadOutcome> {
        let capacity = RegionKind::Pcm.capacity();
        // Only the start offset is checked before opening, and silently
        if offset > capacity {
            log::debug!("{} start 0x{:08X} beyond PCM memory", name, offset);
            self.progress.declare(0);
            return Ok(LoadOutcome::Overflow {
                region: RegionKind::Pcm,
                offset,
                length: 0,
                capacity,
            });
        }

        let Some((mut file, length)) = self.open_sized(name)? else {
            return Ok(LoadOutcome::Skipped(SkipReason::FileNotFound));
        };
        if !RegionKind::Pcm.fits(offset, length) {
            return Ok(self.overflow(host, RegionKind::Pcm, offset, length));
        }

        let written = read_fully(file.as_mut(), &mut mem.pcm[offset..offset + length])?;

        Ok(self.finish(written))
    }

    /// Read a relocation table and patch the Z80 driver with it
    ///
    /// # Arguments
    ///
    /// * `offset` - Sample offset the table is relocated for
    /// * `bank` - Sample bank the table is relocated for
    ///
    /// See [`apply_patch`] for the record format.
    pub fn load_pat(
        &mut self,
        mem: &mut Memory,
        name: &str,
        offset: u32,
        bank: u32,
    ) -> Result<LoadOutcome> {
        let Some((mut file, length)) = self.open_sized(name)? else {
            return Ok(LoadOutcome::Skipped(SkipReason::FileNotFound));
        };

        let mut table = vec![0u8; length.min(PATCH_TABLE_MAX)];
        let read = read_fully(file.as_mut(), &mut table)?;
        apply_patch(&mut mem.z80, &table[..read], offset, bank);

        Ok(self.finish(read))
    }

    /// Open `name` and measure it, or `None` if it cannot be opened
    fn open_sized(&self, name: &str) -> Result<Option<(Box<dyn ReadSeek>, usize)>> {
        let mut file = match self.mount.open(name) {
            Ok(file) => file,
            Err(e) => {
                log::debug!("Cannot open {}: {}", name, e);
                return Ok(None);
            }
        };
        let length = file_length(file.as_mut())?;
        let length = usize::try_from(length)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "file too large"))?;
        Ok(Some((file, length)))
    }

    fn overflow(
        &mut self,
        host: &mut dyn Host,
        region: RegionKind,
        offset: usize,
        length: usize,
    ) -> LoadOutcome {
        log::warn!(
            "{} load overflows: offset 0x{:08X} + {} bytes",
            region,
            offset,
            length
        );
        host.report(&format!(
            "{} : {:08x} {}",
            region.name().to_ascii_uppercase(),
            offset,
            length
        ));
        self.progress.declare(0);
        LoadOutcome::Overflow {
            region,
            offset,
            length,
            capacity: region.capacity(),
        }
    }

    fn finish(&mut self, bytes: usize) -> LoadOutcome {
        self.progress.declare(bytes);
        LoadOutcome::Loaded { bytes }
    }
}

/// Copy the undecoded bytes of one fix chunk into the program-memory mirror
///
/// The first chunk copies the whole protected window so the mirror matches
/// a single-read load; later chunks overwrite the part of the window they
/// cover.
fn mirror_raw_fix(prg: &mut [u8], fix: &[u8], pos: usize, len: usize) {
    let mirror = IPL_FIX_MIRROR as usize;
    let (start, end) = if pos == 0 {
        (0, IPL_FIX_PROTECT)
    } else {
        (pos, (pos + len).min(IPL_FIX_PROTECT))
    };
    if start < end {
        prg[mirror + start..mirror + end].copy_from_slice(&fix[start..end]);
    }
}

/// Stream a file into `region` starting at `offset`, one chunk at a time
///
/// `on_chunk(region, position, length)` runs after each non-empty chunk
/// with the absolute position of the bytes just written. Stops at the
/// first short read or when the region is full. Returns the bytes written.
pub(super) fn stream_into<F>(
    file: &mut dyn ReadSeek,
    region: &mut [u8],
    offset: usize,
    chunk_size: usize,
    mut on_chunk: F,
) -> io::Result<usize>
where
    F: FnMut(&mut [u8], usize, usize),
{
    let mut position = offset;
    let mut written = 0;

    loop {
        let want = chunk_size.min(region.len().saturating_sub(position));
        if want == 0 {
            break;
        }

        let read = read_fully(file, &mut region[position..position + want])?;
        if read > 0 {
            on_chunk(region, position, read);
            log::trace!("Chunk of {} bytes at 0x{:06X}", read, position);
        }

        position += read;
        written += read;
        if read < chunk_size {
            break;
        }
    }

    Ok(written)
}
