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

use std::fmt;
use std::rc::{Rc, Weak};

use super::shared::Dispatch;
use crate::error::EmitError;
use crate::message::{Message, MessageKind};
use crate::plan::DispatchPlan;

/// A weak, type-erased reference to a manager.
///
/// Modules receive a handle in [`Module::register`](crate::Module::register)
/// and deferred builders receive one during composition. It does not keep the
/// manager alive and does not name the manager's module list, so generic
/// modules can store it.
#[derive(Clone)]
pub struct ManagerHandle {
    inner: Weak<dyn Dispatch>,
}

impl ManagerHandle {
    pub(crate) fn new(inner: Weak<dyn Dispatch>) -> Self {
        Self { inner }
    }

    /// Returns `true` if the manager is composed and still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Dispatches `message` through the manager and returns it.
    pub fn process<M: Message>(&self, mut message: M) -> Result<M, EmitError> {
        self.process_mut(&mut message)?;
        Ok(message)
    }

    /// Dispatches `message` in place through the manager.
    pub fn process_mut<M: Message>(&self, message: &mut M) -> Result<(), EmitError> {
        let manager = self.upgrade()?;
        manager.dispatch(MessageKind::of::<M>(), message);
        Ok(())
    }

    /// Returns `true` if both handles point at the same manager.
    pub fn ptr_eq(&self, other: &ManagerHandle) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the manager together with its plan for `kind`.
    pub(crate) fn resolve(
        &self,
        kind: MessageKind,
    ) -> Result<(Weak<dyn Dispatch>, Rc<DispatchPlan>), EmitError> {
        let manager = self.upgrade()?;
        let plan = manager.plan(kind);
        Ok((Rc::downgrade(&manager), plan))
    }

    fn upgrade(&self) -> Result<Rc<dyn Dispatch>, EmitError> {
        self.inner.upgrade().ok_or(EmitError::ManagerUnavailable)
    }
}

impl fmt::Debug for ManagerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
