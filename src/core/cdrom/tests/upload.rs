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

use super::helpers::{pattern, position_encoded, PositionCodec};
use super::registers::*;
use super::*;
use crate::core::memory::{Memory, MemoryBus, PRG_SIZE};
use proptest::prelude::*;

const SOURCE: u32 = 0x100000;

/// Stage `data` in program memory and fill in the control block
fn stage(mem: &mut Memory, zone: u8, bank: u8, dest: u32, data: &[u8]) {
    assert!(mem.write_program(SOURCE, data));
    mem.write8(UPLOAD_ZONE, zone);
    mem.write8(UPLOAD_BANK, bank);
    mem.write32(UPLOAD_DEST, dest);
    mem.write32(UPLOAD_SOURCE, SOURCE);
    mem.write32(UPLOAD_LENGTH, data.len() as u32);
}

#[test]
fn test_prg_zone_copies_within_program_memory() {
    let data = pattern(0x40, 1);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 0, 0, 0x2000, &data);

    let outcome = loader.upload(&mut mem);

    assert_eq!(outcome, LoadOutcome::Loaded { bytes: 0x40 });
    assert_eq!(&mem.prg[0x2000..0x2040], &data[..]);
    assert_eq!(mem.read32(UPLOAD_DEST), 0x2040);
}

#[test]
fn test_fix_zone_halves_offset_and_decodes() {
    let data = pattern(0x80, 2);
    let mut loader = CdLoader::with_codec(Box::new(PositionCodec));
    let mut mem = Memory::new();
    stage(&mut mem, 1, 0, 0x200, &data);

    loader.upload(&mut mem);

    assert_eq!(&mem.fix[0x100..0x180], &position_encoded(&data, 0x100)[..]);
    assert!(mem.fix[..0x100].iter().all(|&b| b == 0));
    assert_eq!(mem.read32(UPLOAD_DEST), 0x200 + 0x100);
}

#[test]
fn test_spr_zone_uses_bank_and_decodes() {
    let data = pattern(0x100, 3);
    let mut loader = CdLoader::with_codec(Box::new(PositionCodec));
    let mut mem = Memory::new();
    stage(&mut mem, 2, 1, 0x10, &data);

    loader.upload(&mut mem);

    let at = 0x100010;
    assert_eq!(&mem.spr[at..at + 0x100], &position_encoded(&data, at)[..]);
    assert_eq!(mem.read32(UPLOAD_DEST), 0x110);
    assert_eq!(mem.read16(UPLOAD_BANK), 1);
}

#[test]
fn test_spr_zone_carries_into_next_bank() {
    let data = pattern(0x200, 4);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 2, 0, 0xFFF00, &data);

    loader.upload(&mut mem);

    assert_eq!(&mem.spr[0xFFF00..0x100100], &data[..]);
    assert_eq!(mem.read32(UPLOAD_DEST), 0x100);
    assert_eq!(mem.read16(UPLOAD_BANK), 1);
}

#[test]
fn test_spr_zone_exact_bank_end_does_not_carry() {
    let data = pattern(0x100, 5);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 2, 0, 0xFFF00, &data);

    loader.upload(&mut mem);

    assert_eq!(mem.read32(UPLOAD_DEST), 0x100000);
    assert_eq!(mem.read16(UPLOAD_BANK), 0);
}

#[test]
fn test_z80_zone_halves_offset() {
    let data = pattern(0x20, 6);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 3, 0, 0x20, &data);

    loader.upload(&mut mem);

    assert_eq!(&mem.z80[0x10..0x30], &data[..]);
    assert_eq!(mem.read32(UPLOAD_DEST), 0x20 + 0x40);
}

#[test]
fn test_pcm_zone_bank_unit() {
    let data = pattern(0x100, 7);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 4, 1, 0x40, &data);

    loader.upload(&mut mem);

    // (0x40 >> 1) + 1 * 0x80000
    assert_eq!(&mem.pcm[0x80020..0x80120], &data[..]);
    assert_eq!(mem.read32(UPLOAD_DEST), 0x40 + 0x200);
    assert_eq!(mem.read16(UPLOAD_BANK), 1);
}

#[test]
fn test_pcm_zone_carries_into_next_bank() {
    let data = pattern(0x100, 8);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 4, 0, 0xFFF00, &data);

    loader.upload(&mut mem);

    assert_eq!(&mem.pcm[0x7FF80..0x80080], &data[..]);
    // 0xFFF00 + 0x200 runs past one bank
    assert_eq!(mem.read32(UPLOAD_DEST), 0x100);
    assert_eq!(mem.read16(UPLOAD_BANK), 1);
}

#[test]
fn test_patch_zone_leaves_bookkeeping_alone() {
    let table: Vec<u8> = [0x10i16, 0x20, 0x40, 0, 0, 0]
        .iter()
        .flat_map(|w| w.to_be_bytes())
        .collect();
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 5, 0, 0, &table);

    let outcome = loader.upload(&mut mem);

    assert_eq!(outcome, LoadOutcome::Loaded { bytes: 10 });
    assert_eq!(mem.z80[0x10], 0x10);
    assert_eq!(mem.z80[0x12], 0x1F);
    assert_eq!(mem.read32(UPLOAD_DEST), 0);
}

#[test]
fn test_unknown_zone_is_skipped() {
    let data = pattern(0x10, 8);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 6, 0, 0x40, &data);

    let outcome = loader.upload(&mut mem);

    assert_eq!(outcome, LoadOutcome::Skipped(SkipReason::UnknownZone(6)));
    assert_eq!(mem.read32(UPLOAD_DEST), 0x40);
}

#[test]
fn test_zone_high_nibble_ignored() {
    let data = pattern(0x10, 9);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 0x13, 0, 0x20, &data);

    loader.upload(&mut mem);

    assert_eq!(&mem.z80[0x10..0x20], &data[..]);
}

#[test]
fn test_destination_overflow_discards_data() {
    let data = pattern(0x20, 10);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    stage(&mut mem, 2, 3, 0xFFFF0, &data);

    let outcome = loader.upload(&mut mem);

    assert_eq!(
        outcome,
        LoadOutcome::Overflow {
            region: RegionKind::Sprite,
            offset: 0x3FFFF0,
            length: 0x20,
            capacity: 0x400000,
        }
    );
    assert!(mem.spr.iter().all(|&b| b == 0));
    // Bookkeeping still advances
    assert_eq!(mem.read32(UPLOAD_DEST), 0x10);
    assert_eq!(mem.read16(UPLOAD_BANK), 4);
}

#[test]
fn test_source_overflow_discards_data() {
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();
    mem.write8(UPLOAD_ZONE, 3);
    mem.write32(UPLOAD_SOURCE, PRG_SIZE as u32 - 4);
    mem.write32(UPLOAD_LENGTH, 8);

    let outcome = loader.upload(&mut mem);

    assert!(matches!(
        outcome,
        LoadOutcome::Overflow {
            region: RegionKind::Program,
            ..
        }
    ));
    assert!(mem.z80.iter().all(|&b| b == 0));
}

#[test]
fn test_consecutive_uploads_continue() {
    let data = pattern(0x200, 11);
    let mut loader = CdLoader::new();
    let mut mem = Memory::new();

    stage(&mut mem, 2, 0, 0, &data[..0x100]);
    loader.upload(&mut mem);
    // The BIOS only restages the source; the offset carries over
    assert!(mem.write_program(SOURCE, &data[0x100..]));
    loader.upload(&mut mem);

    assert_eq!(&mem.spr[..0x200], &data[..]);
    assert_eq!(mem.read32(UPLOAD_DEST), 0x200);
}

#[test]
fn test_normalize_bank_examples() {
    assert_eq!(normalize_bank(0, 0), (0, 0));
    assert_eq!(normalize_bank(BANK_SIZE, 3), (BANK_SIZE, 3));
    assert_eq!(normalize_bank(BANK_SIZE + 1, 3), (1, 4));
    assert_eq!(normalize_bank(2 * BANK_SIZE, 0), (BANK_SIZE, 1));
    assert_eq!(normalize_bank(2 * BANK_SIZE + 5, 0), (5, 2));
    // Negative as a signed value: never carries
    assert_eq!(normalize_bank(0x8000_0000, 1), (0x8000_0000, 1));
}

/// Bank carry as a repeated subtraction on signed values
fn normalize_by_subtraction(offset: u32, bank: u32) -> (u32, u32) {
    let mut offset = offset as i32;
    let mut bank = bank;
    while offset > BANK_SIZE as i32 {
        bank += 1;
        offset -= BANK_SIZE as i32;
    }
    (offset as u32, bank)
}

proptest! {
    #[test]
    fn prop_normalize_matches_subtraction(offset in 0u32..0x1000_0000, bank in 0u32..0x100) {
        prop_assert_eq!(normalize_bank(offset, bank), normalize_by_subtraction(offset, bank));
    }

    #[test]
    fn prop_normalize_near_bank_boundaries(k in 0u32..16, delta in -2i32..=2, bank in 0u32..4) {
        let offset = (k * BANK_SIZE) as i32 + delta;
        prop_assume!(offset >= 0);
        let offset = offset as u32;
        prop_assert_eq!(normalize_bank(offset, bank), normalize_by_subtraction(offset, bank));
    }
}
