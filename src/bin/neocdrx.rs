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

//! NeoGeo CD loader command-line tool
//!
//! Mounts a game, runs the initial program load exactly as the BIOS would
//! request it and prints what ended up in each memory region. With
//! `--dump` the regions are written out for inspection.

use clap::Parser;
use log::{error, info, warn};
use neocdrx::core::cdrom::{Dispatch, LoadOutcome};
use neocdrx::core::config::{load_dotenv, LoaderConfig};
use neocdrx::core::memory::RegionKind;
use neocdrx::core::system::System;
use std::path::PathBuf;

/// NeoGeo CD program loader
#[derive(Parser)]
#[command(name = "neocdrx")]
#[command(about = "Load a NeoGeo CD game the way the BIOS does", long_about = None)]
struct Args {
    /// Game directory (loose files or a directory holding one .iso)
    game_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Streaming chunk size in bytes, overrides the configuration
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Write every memory region to this directory after loading
    #[arg(short = 'd', long)]
    dump: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    }
    .with_env()?;
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    info!("NEOCDRX v{}", env!("CARGO_PKG_VERSION"));

    let Some(game_dir) = args.game_dir.or_else(|| config.game_dir.clone()) else {
        error!("No game directory given");
        return Err("no game directory given (argument or NEOCDRX_GAME_DIR)".into());
    };

    let mut system = match System::new(&config) {
        Ok(system) => system,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(Box::new(e));
        }
    };

    if let Err(e) = system.mount(&game_dir) {
        error!("Failed to mount {}: {}", game_dir.display(), e);
        return Err(Box::new(e));
    }

    let report = match system.boot() {
        Ok(report) => report,
        Err(e) => {
            error!("IPL failed: {}", e);
            return Err(Box::new(e));
        }
    };

    for request in &report.requests {
        if let Dispatch::Dispatched {
            filename, outcome, ..
        } = request
        {
            match outcome {
                LoadOutcome::Loaded { bytes } => info!("  {:<16} {:>8} bytes", filename, bytes),
                LoadOutcome::Skipped(reason) => warn!("  {:<16} skipped: {:?}", filename, reason),
                LoadOutcome::Overflow {
                    region,
                    offset,
                    length,
                    capacity,
                } => warn!(
                    "  {:<16} overflow: {} 0x{:X} + 0x{:X} > 0x{:X}",
                    filename, region, offset, length, capacity
                ),
            }
        }
    }

    for kind in RegionKind::ALL {
        let used = system
            .memory()
            .region(kind)
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        info!("{:>4}: {:>8} / {} bytes", kind.name(), used, kind.capacity());
    }

    if let Some(dir) = &args.dump {
        match system.dump_regions(dir) {
            Ok(paths) => info!("Dumped {} regions to {}", paths.len(), dir.display()),
            Err(e) => {
                error!("Failed to dump regions: {}", e);
                return Err(Box::new(e));
            }
        }
    }

    Ok(())
}
