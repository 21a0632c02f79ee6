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

//! Tile decode transforms
//!
//! Fix and sprite data arrive in the BIOS-native layout and must be
//! converted in place to the layout the renderer expects. The transforms
//! themselves belong to the video core; the loader only needs to call them
//! over exactly the bytes it just wrote, at their absolute offset within
//! the region.

/// In-place FIX/SPR layout conversion
///
/// Every method receives the whole region plus the absolute `offset` and
/// `length` of the bytes to convert. Implementations must only touch
/// `region[offset..offset + length]` (and, for fix data, the matching
/// entries of the usage table).
pub trait TileCodec {
    /// Convert freshly written fix tiles to the renderer layout
    fn decode_fix(&mut self, fix: &mut [u8], usage: &mut [u8], offset: usize, length: usize);

    /// Convert fix tiles back to the BIOS layout
    fn undecode_fix(&mut self, fix: &mut [u8], offset: usize, length: usize);

    /// Convert freshly written sprite tiles to the renderer layout
    fn decode_spr(&mut self, spr: &mut [u8], offset: usize, length: usize);
}

/// Codec that leaves data in its on-disc layout
///
/// Used by the command-line loader, which dumps regions rather than
/// rendering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughCodec;

impl TileCodec for PassthroughCodec {
    fn decode_fix(&mut self, _fix: &mut [u8], _usage: &mut [u8], _offset: usize, _length: usize) {}

    fn undecode_fix(&mut self, _fix: &mut [u8], _offset: usize, _length: usize) {}

    fn decode_spr(&mut self, _spr: &mut [u8], _offset: usize, _length: usize) {}
}
