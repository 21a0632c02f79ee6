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

//! Hooks into the rest of the emulator
//!
//! The loader runs on the emulation thread and occasionally needs the CPU
//! cores or the renderer to do something: restart the sound CPU after a
//! fresh driver load, redraw the loading screen, pause the 68000 while an
//! upload is staged. All hooks default to no-ops so a headless caller only
//! overrides what it cares about.

/// Emulator-side collaborators of the loader
pub trait Host {
    /// Reset the Z80 so it starts executing a freshly loaded driver
    fn reset_z80(&mut self) {}

    /// Clear the screen, draw the fix layer and present one frame
    fn refresh_display(&mut self) {}

    /// Enable or disable 68000 execution
    fn set_cpu_enabled(&mut self, _enabled: bool) {}

    /// Re-enable every video layer once an upload sequence ends
    fn restore_video(&mut self) {}

    /// Show a diagnostic message
    fn report(&mut self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Host that ignores every hook
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}
