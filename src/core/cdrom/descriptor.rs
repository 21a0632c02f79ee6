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

//! Load descriptors
//!
//! ```text
//! +0x00  filename, NUL-terminated (16 bytes)
//! +0x10  bank (byte)
//! +0x12  offset (32-bit)
//! +0x1C  image flag (16-bit)
//! ```

use crate::core::memory::MemoryBus;

/// Size of one descriptor in a load list
pub const DESCRIPTOR_SIZE: u32 = 0x20;

/// Width of the filename field, terminator included
pub const FILENAME_LEN: usize = 16;

const BANK: u32 = 0x10;
const OFFSET: u32 = 0x12;
const IMAGE: u32 = 0x1C;

/// One load request staged by the BIOS
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadDescriptor {
    /// Filename, possibly with a `;version` suffix
    pub filename: String,
    /// Bank number
    pub bank: u8,
    /// Destination offset as the BIOS wrote it
    pub offset: u32,
    /// Loading-screen image flag
    pub image: u16,
}

impl LoadDescriptor {
    /// Create a descriptor with a zero image flag
    pub fn new(filename: impl Into<String>, bank: u8, offset: u32) -> Self {
        Self {
            filename: filename.into(),
            bank,
            offset,
            image: 0,
        }
    }

    /// Read a descriptor at `address`
    pub fn read(bus: &impl MemoryBus, address: u32) -> Self {
        Self {
            filename: read_filename(bus, address),
            bank: bus.read8(address.wrapping_add(BANK)),
            offset: bus.read32(address.wrapping_add(OFFSET)),
            image: bus.read16(address.wrapping_add(IMAGE)),
        }
    }

    /// Write the descriptor at `address`
    ///
    /// Filenames longer than 15 bytes are truncated so the terminator fits.
    pub fn write(&self, bus: &mut impl MemoryBus, address: u32) {
        let name = self.filename.as_bytes();
        let len = name.len().min(FILENAME_LEN - 1);
        for i in 0..FILENAME_LEN {
            let byte = if i < len { name[i] } else { 0 };
            bus.write8(address.wrapping_add(i as u32), byte);
        }
        bus.write16(address.wrapping_add(BANK), (self.bank as u16) << 8);
        bus.write32(address.wrapping_add(OFFSET), self.offset);
        bus.write16(address.wrapping_add(IMAGE), self.image);
    }

    /// Whether this is the end-of-list marker
    pub fn is_end(&self) -> bool {
        self.filename.is_empty()
    }

    /// Filename with any `;version` suffix removed
    pub fn file_name(&self) -> &str {
        self.filename.split(';').next().unwrap_or_default()
    }
}

/// Read the NUL-terminated filename field
pub(super) fn read_filename(bus: &impl MemoryBus, address: u32) -> String {
    let mut name = String::with_capacity(FILENAME_LEN);
    for i in 0..FILENAME_LEN as u32 {
        match bus.read8(address.wrapping_add(i)) {
            0 => break,
            byte => name.push(byte as char),
        }
    }
    name
}

/// Overwrite the image flag of the descriptor at `address`
pub(super) fn mark_image(bus: &mut impl MemoryBus, address: u32) {
    bus.write16(address.wrapping_add(IMAGE), 0xFFFF);
}
