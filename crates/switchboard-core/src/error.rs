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

//! Error types of the dispatch core.

use std::path::PathBuf;

use thiserror::Error;

/// Why an emission could not reach a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmitError {
    /// The emitter has not been registered with a manager yet.
    #[error("emitter is not bound to a manager")]
    Unbound,
    /// The manager is still being composed or has been dropped.
    #[error("manager is not available (still composing or already dropped)")]
    ManagerUnavailable,
    /// The emitter was registered a second time.
    #[error("emitter is already bound to a manager")]
    AlreadyBound,
}

/// Errors raised while loading a [`ManagerConfig`](crate::ManagerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON document is malformed.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The RON document is malformed.
    #[error("invalid RON configuration: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The file extension names no known format.
    #[error("unsupported configuration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
