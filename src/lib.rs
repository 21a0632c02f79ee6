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

//! NeoGeo CD program loader library
//!
//! This library implements the CD side of a NeoGeo CD emulator: it mounts a
//! game, answers the BIOS's file load requests, services its upload
//! protocol and applies Z80 driver patches.
//!
//! # Example
//!
//! ```
//! use neocdrx::core::cdrom::CdLoader;
//! use neocdrx::core::memory::{Memory, MemoryBus};
//!
//! let mut loader = CdLoader::new();
//! let mut memory = Memory::new();
//!
//! // Nothing staged: an empty PRG upload
//! let outcome = loader.upload(&mut memory);
//! assert!(outcome.handled());
//! assert_eq!(memory.read32(0x10FEF4), 0);
//! ```

pub mod core;
