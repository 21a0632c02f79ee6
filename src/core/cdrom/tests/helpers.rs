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

//! Shared fixtures for loader tests

use super::*;
use crate::core::host::Host;
use tempfile::TempDir;

/// Deterministic test data
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed) ^ ((i >> 8) as u8))
        .collect()
}

/// Loose-file game directory; an IPL.TXT is added if none is given
pub fn game_dir(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, data) in files {
        std::fs::write(dir.path().join(name), data).unwrap();
    }
    if !files.iter().any(|(name, _)| *name == "IPL.TXT") {
        std::fs::write(dir.path().join("IPL.TXT"), b"\x1A").unwrap();
    }
    dir
}

/// Loader mounted on a fresh game directory
pub fn mounted(files: &[(&str, &[u8])]) -> (TempDir, CdLoader) {
    let dir = game_dir(files);
    let mut loader = CdLoader::new();
    loader.mount(dir.path()).unwrap();
    (dir, loader)
}

/// Same as [`mounted`] with a custom codec
pub fn mounted_with_codec(
    files: &[(&str, &[u8])],
    codec: Box<dyn TileCodec>,
) -> (TempDir, CdLoader) {
    let dir = game_dir(files);
    let mut loader = CdLoader::with_codec(codec);
    loader.mount(dir.path()).unwrap();
    (dir, loader)
}

/// Host that records every hook call
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub z80_resets: usize,
    pub refreshes: usize,
    pub restores: usize,
    pub cpu_enabled: Option<bool>,
    pub reports: Vec<String>,
}

impl Host for RecordingHost {
    fn reset_z80(&mut self) {
        self.z80_resets += 1;
    }

    fn refresh_display(&mut self) {
        self.refreshes += 1;
    }

    fn set_cpu_enabled(&mut self, enabled: bool) {
        self.cpu_enabled = Some(enabled);
    }

    fn restore_video(&mut self) {
        self.restores += 1;
    }

    fn report(&mut self, message: &str) {
        self.reports.push(message.to_string());
    }
}

/// Codec whose output depends on each byte's absolute position
///
/// Decoding the same data in one call or in many calls gives the same
/// result only if every call is given the right absolute offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionCodec;

fn position_key(i: usize) -> u8 {
    (i as u8).wrapping_mul(31) ^ ((i >> 11) as u8)
}

impl TileCodec for PositionCodec {
    fn decode_fix(&mut self, fix: &mut [u8], usage: &mut [u8], offset: usize, length: usize) {
        for i in offset..offset + length {
            fix[i] ^= position_key(i);
            usage[i / 32] = 1;
        }
    }

    fn undecode_fix(&mut self, fix: &mut [u8], offset: usize, length: usize) {
        for i in offset..offset + length {
            fix[i] ^= position_key(i);
        }
    }

    fn decode_spr(&mut self, spr: &mut [u8], offset: usize, length: usize) {
        for i in offset..offset + length {
            spr[i] ^= position_key(i);
        }
    }
}

/// Apply the position codec transform to a standalone buffer at `offset`
pub fn position_encoded(data: &[u8], offset: usize) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ position_key(offset + i))
        .collect()
}
