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

//! System tests
//!
//! - boot: IPL walk over loose game directories
//! - upload: upload sequences and region dumps

use super::*;
use tempfile::TempDir;


/// Write `files` into a fresh directory
fn game_dir(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, data) in files {
        std::fs::write(dir.path().join(name), data).unwrap();
    }
    dir
}

/// A headless system with `files` mounted
fn mounted_system(files: &[(&str, &[u8])]) -> (TempDir, System) {
    let dir = game_dir(files);
    let mut system = System::new(&LoaderConfig::default()).unwrap();
    system.mount(dir.path()).unwrap();
    (dir, system)
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed))
        .collect()
}
