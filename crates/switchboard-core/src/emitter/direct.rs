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

use std::cell::OnceCell;

use super::Bind;
use crate::error::EmitError;
use crate::manager::ManagerHandle;
use crate::message::Message;

/// Forwards messages of any type to the manager it is bound to.
///
/// Embed one in a module and bind it from
/// [`Module::register`](crate::Module::register). Each module instance owns
/// its emitter, so two slots of the same type are bound independently.
#[derive(Debug, Default)]
pub struct Emitter {
    handle: OnceCell<ManagerHandle>,
}

impl Emitter {
    /// Creates an unbound emitter.
    pub const fn new() -> Self {
        Self {
            handle: OnceCell::new(),
        }
    }

    /// Attaches the emitter to a manager. Only the first call succeeds.
    pub fn bind(&self, handle: &ManagerHandle) -> Result<(), EmitError> {
        self.handle
            .set(handle.clone())
            .map_err(|_| EmitError::AlreadyBound)
    }

    /// Returns `true` once [`bind`](Self::bind) succeeded.
    pub fn is_bound(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Returns the handle the emitter is bound to.
    pub fn handle(&self) -> Option<&ManagerHandle> {
        self.handle.get()
    }

    /// Dispatches `message` through the manager and returns it.
    ///
    /// The nested dispatch completes before this returns.
    pub fn emit<M: Message>(&self, message: M) -> Result<M, EmitError> {
        self.bound()?.process(message)
    }

    /// Dispatches `message` in place through the manager.
    pub fn emit_mut<M: Message>(&self, message: &mut M) -> Result<(), EmitError> {
        self.bound()?.process_mut(message)
    }

    fn bound(&self) -> Result<&ManagerHandle, EmitError> {
        self.handle.get().ok_or(EmitError::Unbound)
    }
}

impl Bind for Emitter {
    fn bind(&self, handle: &ManagerHandle) -> Result<(), EmitError> {
        Emitter::bind(self, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_emitter_reports_error() {
        let emitter = Emitter::new();
        assert!(!emitter.is_bound());
        assert_eq!(emitter.emit(1_u8), Err(EmitError::Unbound));
        assert_eq!(emitter.emit_mut(&mut 1_u8), Err(EmitError::Unbound));
    }
}
