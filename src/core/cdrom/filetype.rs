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

//! File type recognition

use std::fmt;

/// Kind of data a file carries, selected by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// 68000 program
    Prg,
    /// Fix layer tiles
    Fix,
    /// Sprite tiles
    Spr,
    /// Z80 sound driver
    Z80,
    /// Z80 relocation patch table
    Pat,
    /// ADPCM samples
    Pcm,
}

impl FileType {
    /// Map an extension to a file type, ignoring case
    ///
    /// The alias extensions `OBJ`, `AAT` and `ACM` are rewritten in `ext`
    /// to `SPR`, `PAT` and `PCM` so that the file is then opened under its
    /// canonical name. `A80` is accepted as a program but left unchanged.
    pub fn recognize(ext: &mut String) -> Option<FileType> {
        let canonical = if ext.eq_ignore_ascii_case("OBJ") {
            Some("SPR")
        } else if ext.eq_ignore_ascii_case("AAT") {
            Some("PAT")
        } else if ext.eq_ignore_ascii_case("ACM") {
            Some("PCM")
        } else {
            None
        };
        if let Some(canonical) = canonical {
            *ext = canonical.to_string();
        }

        let upper = ext.to_ascii_uppercase();
        match upper.as_str() {
            "PRG" | "A80" => Some(FileType::Prg),
            "FIX" => Some(FileType::Fix),
            "SPR" => Some(FileType::Spr),
            "Z80" => Some(FileType::Z80),
            "PAT" => Some(FileType::Pat),
            "PCM" => Some(FileType::Pcm),
            _ => None,
        }
    }

    /// Canonical extension
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Prg => "PRG",
            FileType::Fix => "FIX",
            FileType::Spr => "SPR",
            FileType::Z80 => "Z80",
            FileType::Pat => "PAT",
            FileType::Pcm => "PCM",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Split a descriptor filename into base name and extension
///
/// Any `;version` suffix is dropped first. The extension is everything
/// after the first `.`; a name without one has no extension.
///
/// ```
/// use neocdrx::core::cdrom::split_filename;
///
/// assert_eq!(split_filename("SOUND.Z80;1"), ("SOUND", Some("Z80")));
/// assert_eq!(split_filename("README"), ("README", None));
/// ```
pub fn split_filename(name: &str) -> (&str, Option<&str>) {
    let name = name.split(';').next().unwrap_or_default();
    match name.split_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (name, None),
    }
}

/// Name a descriptor file is opened under, and its type
///
/// Drops the version suffix and applies extension aliasing, so `GFX.OBJ;1`
/// resolves to `GFX.SPR`. Names without a recognized extension keep it and
/// have no type.
///
/// # Arguments
///
/// * `name` - Filename as the BIOS wrote it into the descriptor
///
/// # Returns
///
/// The name to open and the recognized type, if any
///
/// # Example
///
/// ```
/// use neocdrx::core::cdrom::{resolve_filename, FileType};
///
/// assert_eq!(
///     resolve_filename("GFX.OBJ;1"),
///     ("GFX.SPR".to_string(), Some(FileType::Spr))
/// );
/// assert_eq!(resolve_filename("README"), ("README".to_string(), None));
/// ```
pub fn resolve_filename(name: &str) -> (String, Option<FileType>) {
    let (base, ext) = split_filename(name);
    let Some(ext) = ext else {
        return (base.to_string(), None);
    };

    let mut ext = ext.to_string();
    let file_type = FileType::recognize(&mut ext);
    (format!("{}.{}", base, ext), file_type)
}
