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

//! Custom assertions for loaded memory

use neocdrx::core::memory::{Memory, RegionKind};

/// Assert `region[offset..]` starts with `expected`
#[allow(dead_code)]
pub fn assert_region_bytes(memory: &Memory, region: RegionKind, offset: usize, expected: &[u8]) {
    let actual = &memory.region(region)[offset..offset + expected.len()];
    if let Some(at) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        panic!(
            "{} mismatch at 0x{:06X}: expected 0x{:02X}, got 0x{:02X}",
            region,
            offset + at,
            expected[at],
            actual[at]
        );
    }
}

/// Assert every byte of `region[range]` is zero
#[allow(dead_code)]
pub fn assert_region_clear(memory: &Memory, region: RegionKind, range: std::ops::Range<usize>) {
    let start = range.start;
    if let Some(at) = memory.region(region)[range].iter().position(|&b| b != 0) {
        panic!("{} not clear at 0x{:06X}", region, start + at);
    }
}
