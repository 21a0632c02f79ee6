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

//! Game storage backends
//!
//! A game is either a directory of loose files extracted from a NeoGeo CD
//! (`IPL.TXT`, `*.PRG`, `*.SPR`, ...) or a directory holding a single ISO9660
//! image of the data track plus its audio tracks. Both are exposed to the
//! loader as a [`Volume`]: something that can open a file by its short name.
//!
//! # Example
//!
//! ```no_run
//! use neocdrx::core::storage::MountState;
//!
//! let mut mount = MountState::new();
//! mount.mount("games/last_resort").unwrap();
//! let ipl = mount.volume().unwrap().open("IPL.TXT").unwrap();
//! ```

mod iso9660;
mod mount;
#[cfg(test)]
mod tests;

pub use iso9660::{DirectoryRecord, IsoFile, IsoImage, ISO_SECTOR_SIZE};
pub use mount::{MountKind, MountState, IPL_TXT};

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Readable, seekable file handle
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// A read-only file namespace the loader reads game files from
pub trait Volume {
    /// Open a file by name relative to the volume root
    ///
    /// A missing file is reported as [`io::ErrorKind::NotFound`].
    fn open(&self, name: &str) -> io::Result<Box<dyn ReadSeek>>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Length of an open file, leaving the cursor at the start
///
/// Mirrors the seek-to-end/tell/rewind the loaders use to reject
/// oversized transfers before touching memory.
pub fn file_length(file: &mut dyn ReadSeek) -> io::Result<u64> {
    let length = file.seek(SeekFrom::End(0))?;
    file.seek(SeekFrom::Start(0))?;
    Ok(length)
}

/// Fill `buf` from `reader`, stopping early only at end of file
///
/// Returns the number of bytes read, which is less than `buf.len()` only
/// when the file ended.
pub fn read_fully(reader: &mut dyn ReadSeek, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Loose files in a host directory
#[derive(Debug, Clone)]
pub struct HostDirectory {
    root: PathBuf,
}

impl HostDirectory {
    /// Create a volume rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Volume root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `name` can be opened for reading
    pub fn contains(&self, name: &str) -> bool {
        File::open(self.root.join(name)).is_ok()
    }
}

impl Volume for HostDirectory {
    fn open(&self, name: &str) -> io::Result<Box<dyn ReadSeek>> {
        let file = File::open(self.root.join(name))?;
        Ok(Box::new(file))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
