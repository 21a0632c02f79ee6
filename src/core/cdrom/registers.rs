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

//! BIOS work RAM addresses used by the loader
//!
//! All addresses are in the 68000 address space and accessed big-endian
//! through [`MemoryBus`](crate::core::memory::MemoryBus).

// Load request

/// Pointer to the current load descriptor (32-bit)
pub const LOAD_DESCRIPTOR_PTR: u32 = 0x10F6A0;

/// Load-in-progress status byte, set to 7 on every request
pub const LOAD_STATUS: u32 = 0x10F6C2;

/// Load status value written at the start of a request
pub const LOAD_STATUS_BUSY: u8 = 7;

/// Default descriptor list the BIOS builds from IPL.TXT
pub const IPL_LOAD_LIST: u32 = 0x115A06;

/// Where the IPL mirrors the protected fix tiles for the loading screen
pub const IPL_FIX_MIRROR: u32 = 0x115E06;

/// Loading screen active flag
pub const LOADING_SCREEN: u32 = 0x10FDDC;

// Upload control block

/// Upload zone selector (low nibble)
pub const UPLOAD_ZONE: u32 = 0x10FEDA;

/// Upload bank, written back as 16 bits
pub const UPLOAD_BANK: u32 = 0x10FEDB;

/// Shadow of the upload bank copied into [`UPLOAD_BANK`] on each load
pub const UPLOAD_BANK_SHADOW: u32 = 0x10FEDE;

/// Upload destination offset (32-bit)
pub const UPLOAD_DEST: u32 = 0x10FEF4;

/// Upload source address in program memory (32-bit)
pub const UPLOAD_SOURCE: u32 = 0x10FEF8;

/// Upload length in bytes (32-bit)
pub const UPLOAD_LENGTH: u32 = 0x10FEFC;

// Progress bar

/// Remaining sector count shown on the loading screen (16-bit)
pub const PROGRESS_REMAINING: u32 = 0x10F688;

/// Progress increment per step (32-bit)
pub const PROGRESS_STEP: u32 = 0x10F68C;

/// Progress accumulator (32-bit)
pub const PROGRESS_ACCUM: u32 = 0x10F690;

/// Total sectors of the load list (32-bit)
pub const PROGRESS_TOTAL: u32 = 0x10F694;

/// Progress animation counter
pub const PROGRESS_COUNTER: u32 = 0x10F793;

/// Accumulator ceiling
pub const PROGRESS_ACCUM_MAX: u32 = 0x800000;

// IPL

/// BIOS region selector (low two bits: Japan, USA, Europe)
pub const BIOS_REGION: u32 = 0x10FD83;

/// Where the IPL.TXT contents are copied
pub const IPL_TEXT: u32 = 0x111204;

/// Where the region logo program is loaded
pub const LOGO_PRG: u32 = 0x120000;

/// Upload-in-progress flag cleared at the start of an upload
pub const UPLOAD_ACTIVE: u32 = 0x10FE88;

/// Fields written when an upload sequence ends, in order
///
/// `(address, width in bytes, value)`
pub const END_UPLOAD_WRITES: [(u32, u8, u32); 12] = [
    (PROGRESS_STEP, 4, 0),
    (0x10F6C3, 1, 0),
    (0x10F6D9, 1, 1),
    (0x10F6DB, 1, 1),
    (0x10F742, 4, 0),
    (0x10F746, 4, 0),
    (0x10FDC2, 1, 1),
    (LOADING_SCREEN, 1, 0),
    (0x10FDDD, 1, 0),
    (0x10FE85, 1, 1),
    (UPLOAD_ACTIVE, 1, 0),
    (0x10FEC4, 1, 1),
];
