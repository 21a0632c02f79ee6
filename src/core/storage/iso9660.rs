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

//! ISO9660 image reading
//!
//! NeoGeo CD data tracks are plain Mode 1 ISO9660 volumes. Only what the
//! loader needs is implemented: the primary volume descriptor, directory
//! walking and streaming reads of file extents.
//!
//! # Layout
//!
//! ```text
//! Sector 16:       Primary Volume Descriptor
//!   +0x00          type (0x01)
//!   +0x01..0x06    "CD001"
//!   +0x50          volume space size (LE u32)
//!   +0x9C..0xBE    root directory record (34 bytes)
//!
//! Directory record:
//!   +0x00          record length
//!   +0x02          extent LBA (LE u32)
//!   +0x0A          data length (LE u32)
//!   +0x19          flags (bit 1 = directory)
//!   +0x20          identifier length
//!   +0x21          identifier ("NAME.EXT;1")
//! ```

use super::{ReadSeek, Volume};
use crate::core::error::IsoError;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Logical sector size of a Mode 1 data track
pub const ISO_SECTOR_SIZE: usize = 2048;

/// Sector holding the primary volume descriptor
const PVD_SECTOR: u32 = 16;

/// Offset of the root directory record inside the PVD
const ROOT_RECORD_OFFSET: usize = 156;

/// Minimum length of a directory record (fixed part + 1 identifier byte)
const MIN_RECORD_LEN: usize = 34;

/// Directory flag in a record's flags byte
const FLAG_DIRECTORY: u8 = 0x02;

/// A parsed directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// First sector of the extent
    pub extent_lba: u32,
    /// Size of the extent in bytes
    pub data_length: u32,
    /// Record flags
    pub flags: u8,
    /// Identifier with any `;version` suffix removed
    pub name: String,
}

impl DirectoryRecord {
    /// Whether the record describes a directory
    pub fn is_directory(&self) -> bool {
        self.flags & FLAG_DIRECTORY != 0
    }

    /// Parse a record starting at `data[0]`
    ///
    /// Returns `None` for records too short to hold an identifier.
    pub(super) fn parse(data: &[u8]) -> Option<Self> {
        let record_len = *data.first()? as usize;
        if record_len < MIN_RECORD_LEN || record_len > data.len() {
            return None;
        }

        let extent_lba = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);
        let data_length = u32::from_le_bytes([data[10], data[11], data[12], data[13]]);
        let flags = data[25];
        let id_len = data[32] as usize;
        if 33 + id_len > record_len {
            return None;
        }

        let id = &data[33..33 + id_len];
        let name = match id {
            [0x00] => ".".to_string(),
            [0x01] => "..".to_string(),
            _ => {
                let raw = String::from_utf8_lossy(id);
                let base = raw.split(';').next().unwrap_or_default();
                // Extension-less files are recorded as "NAME."
                base.strip_suffix('.').unwrap_or(base).to_string()
            }
        };

        Some(Self {
            extent_lba,
            data_length,
            flags,
            name,
        })
    }
}

/// An open ISO9660 image
///
/// Owns the single host file handle of the mounted image; every file
/// opened from the image streams through a clone of it.
#[derive(Debug)]
pub struct IsoImage {
    file: File,
    path: PathBuf,
    root: DirectoryRecord,
    volume_id: String,
    volume_sectors: u32,
}

impl IsoImage {
    /// Open an image and validate its primary volume descriptor
    ///
    /// # Arguments
    ///
    /// * `path` - Host path of the `.iso` file
    ///
    /// # Returns
    ///
    /// - `Ok(IsoImage)` holding the open image
    /// - `Err(IsoError)` if the file cannot be read or has no valid PVD
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IsoError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;

        let mut pvd = [0u8; ISO_SECTOR_SIZE];
        read_sector(&file, PVD_SECTOR, &mut pvd)?;

        if pvd[0] != 0x01 {
            return Err(IsoError::NotPrimaryDescriptor(pvd[0]));
        }
        if &pvd[1..6] != b"CD001" {
            return Err(IsoError::BadSignature);
        }

        let volume_id = String::from_utf8_lossy(&pvd[40..72]).trim_end().to_string();
        let volume_sectors = u32::from_le_bytes([pvd[80], pvd[81], pvd[82], pvd[83]]);
        let root = DirectoryRecord::parse(&pvd[ROOT_RECORD_OFFSET..ROOT_RECORD_OFFSET + 34])
            .ok_or(IsoError::BadRecord {
                sector: PVD_SECTOR,
                offset: ROOT_RECORD_OFFSET,
            })?;

        log::info!(
            "Opened ISO9660 image '{}' ({} sectors) from {}",
            volume_id,
            volume_sectors,
            path.display()
        );

        Ok(Self {
            file,
            path,
            root,
            volume_id,
            volume_sectors,
        })
    }

    /// Host path of the image
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Volume identifier from the PVD
    pub fn volume_id(&self) -> &str {
        &self.volume_id
    }

    /// Volume size in sectors as recorded in the PVD
    pub fn volume_sectors(&self) -> u32 {
        self.volume_sectors
    }

    /// List the records of a directory, skipping `.` and `..`
    pub fn read_directory(&self, dir: &DirectoryRecord) -> Result<Vec<DirectoryRecord>, IsoError> {
        let mut entries = Vec::new();
        let sectors = (dir.data_length as usize).div_ceil(ISO_SECTOR_SIZE) as u32;
        let mut sector_data = [0u8; ISO_SECTOR_SIZE];

        for i in 0..sectors {
            let lba = dir.extent_lba + i;
            read_sector(&self.file, lba, &mut sector_data)?;

            let mut pos = 0;
            // Records never span sectors; a zero length pads to the next one
            while pos < ISO_SECTOR_SIZE && sector_data[pos] != 0 {
                let record_len = sector_data[pos] as usize;
                let record = DirectoryRecord::parse(&sector_data[pos..]).ok_or(
                    IsoError::BadRecord {
                        sector: lba,
                        offset: pos,
                    },
                )?;
                if record.name != "." && record.name != ".." {
                    entries.push(record);
                }
                pos += record_len;
            }
        }

        Ok(entries)
    }

    /// Find a file or directory by `/`-separated path, ignoring case
    pub fn lookup(&self, path: &str) -> Result<Option<DirectoryRecord>, IsoError> {
        let mut current = self.root.clone();

        for component in path.split('/').filter(|c| !c.is_empty()) {
            if !current.is_directory() {
                return Ok(None);
            }
            let entries = self.read_directory(&current)?;
            match entries
                .into_iter()
                .find(|e| e.name.eq_ignore_ascii_case(component))
            {
                Some(entry) => current = entry,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }

    /// Open a streaming handle over a file's extent
    pub fn open_record(&self, record: &DirectoryRecord) -> io::Result<IsoFile> {
        Ok(IsoFile {
            file: self.file.try_clone()?,
            start: record.extent_lba as u64 * ISO_SECTOR_SIZE as u64,
            length: record.data_length as u64,
            position: 0,
        })
    }
}

impl Volume for IsoImage {
    fn open(&self, name: &str) -> io::Result<Box<dyn ReadSeek>> {
        let record = self
            .lookup(name)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            .filter(|r| !r.is_directory())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} not in image", name))
            })?;
        Ok(Box::new(self.open_record(&record)?))
    }

    fn describe(&self) -> String {
        format!("iso:{}", self.path.display())
    }
}

/// A file inside an ISO9660 image
///
/// Shares the image's host handle, so every read seeks to its own
/// position first.
#[derive(Debug)]
pub struct IsoFile {
    file: File,
    start: u64,
    length: u64,
    position: u64,
}

impl Read for IsoFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.length {
            return Ok(0);
        }
        let remaining = (self.length - self.position).min(buf.len() as u64) as usize;
        self.file.seek(SeekFrom::Start(self.start + self.position))?;
        let n = self.file.read(&mut buf[..remaining])?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for IsoFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.length.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };
        match target {
            Some(position) => {
                self.position = position;
                Ok(position)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of file",
            )),
        }
    }
}

/// Read one logical sector through a shared handle
fn read_sector(mut file: &File, lba: u32, buf: &mut [u8; ISO_SECTOR_SIZE]) -> Result<(), IsoError> {
    file.seek(SeekFrom::Start(lba as u64 * ISO_SECTOR_SIZE as u64))?;
    file.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            IsoError::SectorOutOfRange(lba)
        } else {
            IsoError::Io(e)
        }
    })
}
