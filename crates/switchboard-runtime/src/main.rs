// Copyright 2025 eraflo
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

// Switchboard demo host
// Composes a few game modules and drives them for a handful of frames.

mod demo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use switchboard_core::ManagerConfig;

const FRAMES: u64 = 8;

/// Reads the configuration path from the first argument or `SWITCHBOARD_CONFIG`.
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("SWITCHBOARD_CONFIG").map(PathBuf::from))
}

fn load_config() -> Result<ManagerConfig> {
    match config_path() {
        Some(path) => ManagerConfig::from_file(&path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => {
            log::info!("No configuration given, using defaults.");
            Ok(ManagerConfig::default())
        }
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    log::info!("Manager configuration: {config:?}");

    let game = demo::compose(config, FRAMES);
    let frames = demo::run(&game, FRAMES * 2);
    log::info!("Demo finished after {frames} frame(s).");
    Ok(())
}
