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

//! Core loader components
//!
//! This module contains everything between a mounted game and emulated
//! memory:
//! - Storage (loose directories and ISO9660 images)
//! - Memory (program, fix, sprite, Z80 and PCM regions)
//! - CD loader (file loads, BIOS uploads, Z80 patches, progress)
//! - System integration

pub mod cdrom;
pub mod codec;
pub mod config;
pub mod error;
pub mod host;
pub mod memory;
pub mod storage;
pub mod system;

// Re-export commonly used types
pub use cdrom::CdLoader;
pub use config::LoaderConfig;
pub use error::{EmulatorError, Result};
pub use memory::{Memory, MemoryBus, RegionKind};
pub use system::System;
