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

//! Test fixtures: game directories and ISO9660 images

use std::path::Path;
use tempfile::TempDir;

const SECTOR: usize = 2048;
const ROOT_LBA: u32 = 18;
const FIRST_FILE_LBA: u32 = 19;

/// Deterministic test data
#[allow(dead_code)]
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| ((i * 13) as u8) ^ seed.wrapping_add((i >> 8) as u8))
        .collect()
}

/// Encode a big-endian Z80 patch table, terminated
#[allow(dead_code)]
pub fn patch_table(records: &[[i16; 5]]) -> Vec<u8> {
    records
        .iter()
        .flatten()
        .chain([0i16].iter())
        .flat_map(|w| w.to_be_bytes())
        .collect()
}

/// Write loose game files into a fresh directory
#[allow(dead_code)]
pub fn loose_game(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create game directory");
    write_files(dir.path(), files);
    dir
}

/// Put `files` into an ISO image inside a fresh directory
///
/// `extra` files (audio tracks, cue sheets) are written next to the image.
#[allow(dead_code)]
pub fn image_game(files: &[(&str, &[u8])], extra: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create game directory");
    std::fs::write(dir.path().join("game.iso"), build_iso(files)).expect("Failed to write image");
    write_files(dir.path(), extra);
    dir
}

fn write_files(dir: &Path, files: &[(&str, &[u8])]) {
    for (name, data) in files {
        std::fs::write(dir.join(name), data).expect("Failed to write game file");
    }
}

fn record(id: &[u8], lba: u32, length: u32, flags: u8) -> Vec<u8> {
    let len = (33 + id.len()).next_multiple_of(2);
    let mut r = vec![0u8; len];
    r[0] = len as u8;
    r[2..6].copy_from_slice(&lba.to_le_bytes());
    r[6..10].copy_from_slice(&lba.to_be_bytes());
    r[10..14].copy_from_slice(&length.to_le_bytes());
    r[14..18].copy_from_slice(&length.to_be_bytes());
    r[25] = flags;
    r[28] = 1;
    r[32] = id.len() as u8;
    r[33..33 + id.len()].copy_from_slice(id);
    r
}

/// Build a single-directory ISO9660 image
pub fn build_iso(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut lba = FIRST_FILE_LBA;
    let mut entries = Vec::new();
    let mut extents = Vec::new();
    for (name, data) in files {
        entries.push(record(
            format!("{};1", name).as_bytes(),
            lba,
            data.len() as u32,
            0,
        ));
        extents.push((lba, *data));
        lba += data.len().div_ceil(SECTOR).max(1) as u32;
    }

    let mut image = vec![0u8; lba as usize * SECTOR];

    let pvd = 16 * SECTOR;
    image[pvd] = 0x01;
    image[pvd + 1..pvd + 6].copy_from_slice(b"CD001");
    image[pvd + 6] = 0x01;
    image[pvd + 80..pvd + 84].copy_from_slice(&lba.to_le_bytes());
    let root = record(&[0x00], ROOT_LBA, SECTOR as u32, 0x02);
    image[pvd + 156..pvd + 156 + root.len()].copy_from_slice(&root);

    let term = 17 * SECTOR;
    image[term] = 0xFF;
    image[term + 1..term + 6].copy_from_slice(b"CD001");

    let mut directory = record(&[0x00], ROOT_LBA, SECTOR as u32, 0x02);
    directory.extend(record(&[0x01], ROOT_LBA, SECTOR as u32, 0x02));
    for entry in &entries {
        directory.extend_from_slice(entry);
    }
    assert!(directory.len() <= SECTOR, "test directory too large");
    let at = ROOT_LBA as usize * SECTOR;
    image[at..at + directory.len()].copy_from_slice(&directory);

    for (lba, data) in extents {
        let at = lba as usize * SECTOR;
        image[at..at + data.len()].copy_from_slice(data);
    }

    image
}
