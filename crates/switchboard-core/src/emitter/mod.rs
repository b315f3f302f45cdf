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

//! Upward emission from a module back to its manager.
//!
//! Two forms exist:
//!
//! - [`Emitter`] keeps a [`ManagerHandle`] and can emit any message type,
//! - [`CallbackEmitter`] is declared with a closed tuple of message types and
//!   resolves one route per type when it is bound, so emitting skips the plan
//!   lookup and an undeclared type does not compile.
//!
//! Both are bound from [`Module::register`](crate::Module::register).

mod callback;
mod direct;

pub use self::callback::{
    CallbackEmitter, Index0, Index1, Index2, Index3, Index4, Index5, Index6, Index7, MessageSet,
    Route, Select,
};
pub use self::direct::Emitter;

use crate::error::EmitError;
use crate::manager::ManagerHandle;

/// An emitter that can be attached to a manager.
pub trait Bind {
    /// Attaches the emitter to the manager behind `handle`.
    ///
    /// Fails with [`EmitError::AlreadyBound`] on a second call.
    fn bind(&self, handle: &ManagerHandle) -> Result<(), EmitError>;
}

/// Binds `emitter`, logging a warning instead of failing.
///
/// Used by the `Module` derive for fields marked `#[emitter]`.
pub fn bind_or_warn(emitter: &impl Bind, handle: &ManagerHandle, module: &str) {
    if let Err(err) = emitter.bind(handle) {
        log::warn!("Module `{module}` could not bind its emitter: {err}");
    }
}
