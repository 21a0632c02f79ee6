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

//! Z80 sound driver relocation
//!
//! Sound drivers refer to their ADPCM samples by absolute address. Once the
//! samples have been placed at `(bank, offset)` the driver's tables are
//! rewritten by a list of five-word records:
//!
//! ```text
//! word 0  Z80 address of the entry
//! word 1  start address     -> written at +0
//! word 2  end address       -> written at +2 (minus one)
//! word 3  loop start        -> written at +5 when both 3 and 4 are set
//! word 4  loop end          -> written at +7 (minus one)
//! ```
//!
//! Words are big-endian and signed. A zero word 0 ends the list.

use crate::core::memory::Z80_SIZE;

/// 16-bit words per relocation record
pub const PATCH_RECORD_WORDS: usize = 5;

/// Rewrite driver tables in `z80` for samples placed at `(bank, offset)`
///
/// A record cut short by the end of `records` is ignored. Every target
/// address wraps within the Z80 space.
///
/// # Arguments
///
/// * `z80` - Z80 memory holding the driver
/// * `records` - Big-endian relocation records, ended by a zero target
/// * `offset` - Sample offset within the bank
/// * `bank` - Sample bank (1 MiB units)
///
/// # Returns
///
/// The number of records applied
///
/// # Example
///
/// ```
/// use neocdrx::core::cdrom::apply_patch;
/// use neocdrx::core::memory::Z80_SIZE;
///
/// let mut z80 = vec![0u8; Z80_SIZE];
/// // target 0x0100, samples 0x0000..0x0200, no loop, then the end marker
/// let records = [
///     0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, //
///     0x00, 0x00,
/// ];
///
/// assert_eq!(apply_patch(&mut z80, &records, 0, 1), 1);
/// assert_eq!(&z80[0x100..0x104], &[0x00, 0x08, 0xFF, 0x08]);
/// ```
pub fn apply_patch(z80: &mut [u8], records: &[u8], offset: u32, bank: u32) -> usize {
    let master = ((bank as i32)
        .wrapping_mul(0x100000)
        .wrapping_add(offset as i32)
        >> 8)
        & 0xFFFF;

    let word = |index: usize| -> Option<i32> {
        records
            .get(index * 2..index * 2 + 2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]) as i32)
    };

    let mut applied = 0;
    let mut base = 0;
    loop {
        let (Some(target), Some(start), Some(end), Some(loop_start), Some(loop_end)) = (
            word(base),
            word(base + 1),
            word(base + 2),
            word(base + 3),
            word(base + 4),
        ) else {
            if word(base).is_some_and(|w| w != 0) {
                log::debug!("Patch table truncated after {} records", applied);
            }
            break;
        };
        if target == 0 {
            break;
        }

        poke16(z80, target, (start + master) >> 1);
        poke16(z80, target + 2, ((end + master) >> 1) - 1);

        if loop_start != 0 && loop_end != 0 {
            poke16(z80, target + 5, (loop_start + master) >> 1);
            poke16(z80, target + 7, ((loop_end + master) >> 1) - 1);
        }

        applied += 1;
        base += PATCH_RECORD_WORDS;
    }

    log::debug!(
        "Applied {} Z80 patch records (bank {}, offset 0x{:X})",
        applied,
        bank,
        offset
    );
    applied
}

/// Little-endian 16-bit store with Z80 address wrap
#[inline]
fn poke16(z80: &mut [u8], address: i32, value: i32) {
    for (i, byte) in [value as u8, (value >> 8) as u8].into_iter().enumerate() {
        let slot = ((address + i as i32) & (Z80_SIZE as i32 - 1)) as usize;
        if let Some(dst) = z80.get_mut(slot) {
            *dst = byte;
        }
    }
}
