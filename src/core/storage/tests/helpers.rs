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

//! Minimal ISO9660 image builder for tests

use super::ISO_SECTOR_SIZE;

const ROOT_LBA: u32 = 18;
const SUBDIR_LBA: u32 = 19;
const FIRST_FILE_LBA: u32 = 20;

/// Encode one directory record
fn record(id: &[u8], lba: u32, length: u32, flags: u8) -> Vec<u8> {
    let mut len = 33 + id.len();
    if len % 2 == 1 {
        len += 1;
    }
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

/// Lay out file extents after the directory sectors
fn place(files: &[(&str, &[u8])], next_lba: &mut u32) -> Vec<(String, u32, Vec<u8>)> {
    files
        .iter()
        .map(|(name, data)| {
            let lba = *next_lba;
            *next_lba += data.len().div_ceil(ISO_SECTOR_SIZE) as u32;
            (name.to_string(), lba, data.to_vec())
        })
        .collect()
}

fn directory_sector(self_lba: u32, parent_lba: u32, entries: &[Vec<u8>]) -> Vec<u8> {
    let mut sector = Vec::with_capacity(ISO_SECTOR_SIZE);
    sector.extend(record(&[0x00], self_lba, ISO_SECTOR_SIZE as u32, 0x02));
    sector.extend(record(&[0x01], parent_lba, ISO_SECTOR_SIZE as u32, 0x02));
    for entry in entries {
        sector.extend_from_slice(entry);
    }
    assert!(sector.len() <= ISO_SECTOR_SIZE, "test directory too large");
    sector.resize(ISO_SECTOR_SIZE, 0);
    sector
}

/// Build an image with root files and an optional single subdirectory
///
/// Names are stored with a `;1` version suffix, as mastering tools do.
pub fn build_iso(root: &[(&str, &[u8])], subdir: Option<(&str, &[(&str, &[u8])])>) -> Vec<u8> {
    let mut next_lba = FIRST_FILE_LBA;
    let root_files = place(root, &mut next_lba);
    let sub_files = subdir
        .map(|(_, files)| place(files, &mut next_lba))
        .unwrap_or_default();
    let total_sectors = next_lba;

    let mut image = vec![0u8; total_sectors as usize * ISO_SECTOR_SIZE];

    // Primary volume descriptor
    let pvd = 16 * ISO_SECTOR_SIZE;
    image[pvd] = 0x01;
    image[pvd + 1..pvd + 6].copy_from_slice(b"CD001");
    image[pvd + 6] = 0x01;
    let mut volume_id = [b' '; 32];
    volume_id[..8].copy_from_slice(b"TESTDISC");
    image[pvd + 40..pvd + 72].copy_from_slice(&volume_id);
    image[pvd + 80..pvd + 84].copy_from_slice(&total_sectors.to_le_bytes());
    let root_record = record(&[0x00], ROOT_LBA, ISO_SECTOR_SIZE as u32, 0x02);
    image[pvd + 156..pvd + 156 + 34].copy_from_slice(&root_record);

    // Descriptor set terminator
    let term = 17 * ISO_SECTOR_SIZE;
    image[term] = 0xFF;
    image[term + 1..term + 6].copy_from_slice(b"CD001");

    let file_record = |(name, lba, data): &(String, u32, Vec<u8>)| {
        record(format!("{};1", name).as_bytes(), *lba, data.len() as u32, 0)
    };

    let mut root_entries: Vec<Vec<u8>> = root_files.iter().map(file_record).collect();
    if let Some((dir_name, _)) = subdir {
        root_entries.push(record(
            dir_name.as_bytes(),
            SUBDIR_LBA,
            ISO_SECTOR_SIZE as u32,
            0x02,
        ));
        let sub_entries: Vec<Vec<u8>> = sub_files.iter().map(file_record).collect();
        let sector = directory_sector(SUBDIR_LBA, ROOT_LBA, &sub_entries);
        let at = SUBDIR_LBA as usize * ISO_SECTOR_SIZE;
        image[at..at + ISO_SECTOR_SIZE].copy_from_slice(&sector);
    }
    let sector = directory_sector(ROOT_LBA, ROOT_LBA, &root_entries);
    let at = ROOT_LBA as usize * ISO_SECTOR_SIZE;
    image[at..at + ISO_SECTOR_SIZE].copy_from_slice(&sector);

    for (_, lba, data) in root_files.iter().chain(sub_files.iter()) {
        let at = *lba as usize * ISO_SECTOR_SIZE;
        image[at..at + data.len()].copy_from_slice(data);
    }

    image
}
