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

//! Game directory mounting
//!
//! At most one game is mounted at a time. Mounting always tears down the
//! previous mount first, so the image handle of an ISO mount is closed
//! before the next one is opened.

use super::{HostDirectory, IsoImage, ReadSeek, Volume};
use crate::core::error::{IsoError, MountError};
use std::io;
use std::path::{Path, PathBuf};

/// File every NeoGeo CD carries in its root; its presence marks a game
pub const IPL_TXT: &str = "IPL.TXT";

/// What kind of game a successful mount found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// Loose files in the directory itself
    Directory,
    /// An ISO9660 image inside the directory
    Image,
}

/// The mounted volume
#[derive(Debug)]
enum Mounted {
    Directory(HostDirectory),
    Image(IsoImage),
}

/// Current mount, if any
#[derive(Debug, Default)]
pub struct MountState {
    mounted: Option<Mounted>,
    /// Directory the game was mounted from
    source_dir: Option<PathBuf>,
    /// Image filename without its `.iso` suffix
    image_stem: Option<String>,
}

impl MountState {
    /// Create an empty mount state
    pub fn new() -> Self {
        Self::default()
    }

    /// Point all subsequent reads at a game directory
    ///
    /// A directory containing `IPL.TXT` is mounted as loose files. Otherwise
    /// the first `.iso` file (case-insensitive, in name order) is opened and
    /// must contain `IPL.TXT` in its root.
    ///
    /// # Arguments
    ///
    /// * `path` - Host directory holding the game
    ///
    /// # Returns
    ///
    /// - `Ok(MountKind)` on success; any previous mount has been released
    /// - `Err(MountError)` if no game was found; a previous loose-file mount
    ///   is kept only when no image was found at all
    pub fn mount(&mut self, path: impl AsRef<Path>) -> Result<MountKind, MountError> {
        let dir = path.as_ref().to_path_buf();

        let loose = HostDirectory::new(&dir);
        if loose.contains(IPL_TXT) {
            self.unmount();
            log::info!("Mounted loose files from {}", dir.display());
            self.mounted = Some(Mounted::Directory(loose));
            self.source_dir = Some(dir);
            return Ok(MountKind::Directory);
        }

        let image_name = find_image(&dir)?;
        self.unmount();

        let image_path = dir.join(&image_name);
        let image = IsoImage::load(&image_path).map_err(|e| {
            let path = image_path.display().to_string();
            match e {
                IsoError::Io(source) => MountError::ImageOpen { path, source },
                source => MountError::InvalidImage { path, source },
            }
        })?;

        match image.lookup(IPL_TXT) {
            Ok(Some(record)) if !record.is_directory() => {}
            Ok(_) => {
                return Err(MountError::MissingIpl(image_path.display().to_string()));
            }
            Err(source) => {
                return Err(MountError::InvalidImage {
                    path: image_path.display().to_string(),
                    source,
                });
            }
        }

        log::info!(
            "Mounted image '{}' from {}",
            image.volume_id(),
            image_path.display()
        );

        let stem_len = image_name.len() - ".iso".len();
        self.image_stem = Some(image_name[..stem_len].to_string());
        self.mounted = Some(Mounted::Image(image));
        self.source_dir = Some(dir);
        Ok(MountKind::Image)
    }

    /// Release the current mount, closing any image handle
    pub fn unmount(&mut self) {
        if let Some(Mounted::Image(image)) = &self.mounted {
            log::debug!("Unmounting {}", image.path().display());
        }
        self.mounted = None;
        self.source_dir = None;
        self.image_stem = None;
    }

    /// Whether anything is mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Whether the current mount is an ISO image
    pub fn iso_mounted(&self) -> bool {
        matches!(self.mounted, Some(Mounted::Image(_)))
    }

    /// Kind of the current mount
    pub fn kind(&self) -> Option<MountKind> {
        self.mounted.as_ref().map(|m| match m {
            Mounted::Directory(_) => MountKind::Directory,
            Mounted::Image(_) => MountKind::Image,
        })
    }

    /// The mounted volume
    pub fn volume(&self) -> Option<&dyn Volume> {
        self.mounted.as_ref().map(|m| match m {
            Mounted::Directory(dir) => dir as &dyn Volume,
            Mounted::Image(image) => image as &dyn Volume,
        })
    }

    /// Open a file on the mounted volume
    pub fn open(&self, name: &str) -> io::Result<Box<dyn ReadSeek>> {
        match self.volume() {
            Some(volume) => volume.open(name),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "nothing mounted")),
        }
    }

    /// Directory the current game was mounted from
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    /// Audio tracks shipped beside the mounted image
    ///
    /// `.mp3` files whose name starts with the image name, in name order.
    /// Loose-file mounts have no companion tracks.
    pub fn companion_tracks(&self) -> io::Result<Vec<PathBuf>> {
        let (Some(dir), Some(stem)) = (&self.source_dir, &self.image_stem) else {
            return Ok(Vec::new());
        };

        let stem = stem.to_ascii_lowercase();
        let mut tracks: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| {
                let lower = name.to_ascii_lowercase();
                lower.starts_with(&stem) && has_suffix_ignore_case(name, ".mp3")
            })
            .map(|name| dir.join(name))
            .collect();
        tracks.sort();
        Ok(tracks)
    }
}

/// First `.iso` file in `dir`, by name
fn find_image(dir: &Path) -> Result<String, MountError> {
    let entries = std::fs::read_dir(dir).map_err(|source| MountError::Directory {
        path: dir.display().to_string(),
        source,
    })?;

    let mut images: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.len() > 4 && has_suffix_ignore_case(name, ".iso"))
        .collect();
    images.sort();

    images
        .into_iter()
        .next()
        .ok_or_else(|| MountError::NoImage(dir.display().to_string()))
}

fn has_suffix_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}
