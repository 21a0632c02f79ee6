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

//! Region identification and fixed capacities

use std::fmt;

/// Program memory size (2MB)
pub const PRG_SIZE: usize = 0x200000;

/// Fix memory size (128KB)
pub const FIX_SIZE: usize = 0x20000;

/// Sprite memory size (4MB)
pub const SPR_SIZE: usize = 0x400000;

/// Z80 address space size (64KB)
pub const Z80_SIZE: usize = 0x10000;

/// PCM memory size (1MB)
pub const PCM_SIZE: usize = 0x100000;

/// Game vector table size
pub const GAME_VECTORS_SIZE: usize = 0x100;

/// One usage entry per 32-byte fix tile
pub const FIX_USAGE_SIZE: usize = FIX_SIZE / 32;

/// Memory region identification
///
/// Used to route a transfer to its destination buffer and to look up
/// the bound that transfer is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// 68k program memory
    Program,
    /// Fix layer tiles
    Fix,
    /// Sprite tiles
    Sprite,
    /// Z80 address space
    Z80,
    /// ADPCM samples
    Pcm,
}

impl RegionKind {
    /// Every region, in dump order
    pub const ALL: [RegionKind; 5] = [
        RegionKind::Program,
        RegionKind::Fix,
        RegionKind::Sprite,
        RegionKind::Z80,
        RegionKind::Pcm,
    ];

    /// Size of the region in bytes
    pub const fn capacity(self) -> usize {
        match self {
            RegionKind::Program => PRG_SIZE,
            RegionKind::Fix => FIX_SIZE,
            RegionKind::Sprite => SPR_SIZE,
            RegionKind::Z80 => Z80_SIZE,
            RegionKind::Pcm => PCM_SIZE,
        }
    }

    /// Short lowercase name, used for logs and dump file names
    pub const fn name(self) -> &'static str {
        match self {
            RegionKind::Program => "prg",
            RegionKind::Fix => "fix",
            RegionKind::Sprite => "spr",
            RegionKind::Z80 => "z80",
            RegionKind::Pcm => "pcm",
        }
    }

    /// Whether `length` bytes starting at `offset` fit inside the region
    pub fn fits(self, offset: usize, length: usize) -> bool {
        offset
            .checked_add(length)
            .is_some_and(|end| end <= self.capacity())
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
