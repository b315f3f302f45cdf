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

//! Deferred module construction.
//!
//! Some modules need the manager handle in their constructor, before the
//! manager exists. A [`ModuleBuilder::Deferred`] captures the constructor
//! arguments in a closure that the manager calls once, during composition,
//! with its own handle. The builder is consumed by that call, so the captured
//! arguments are never duplicated.

use std::fmt;

use super::handle::ManagerHandle;
use super::list::ModuleList;
use crate::module::Module;

type DeferredFn<T> = Box<dyn FnOnce(&ManagerHandle) -> T>;

/// How the module of one slot is obtained during composition.
pub enum ModuleBuilder<T> {
    /// An already constructed module.
    Ready(T),
    /// A constructor run once the manager handle exists.
    ///
    /// The handle passed to the closure may be stored, but it only reaches
    /// the manager after composition returns.
    Deferred(DeferredFn<T>),
}

impl<T: Module> ModuleBuilder<T> {
    /// Wraps an already constructed module.
    pub fn ready(module: T) -> Self {
        Self::Ready(module)
    }

    /// Defers construction until the manager handle exists.
    pub fn deferred(build: impl FnOnce(&ManagerHandle) -> T + 'static) -> Self {
        Self::Deferred(Box::new(build))
    }

    /// Returns `true` if the module is built during composition.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Produces the module, consuming the builder.
    pub fn resolve(self, handle: &ManagerHandle) -> T {
        match self {
            Self::Ready(module) => module,
            Self::Deferred(build) => {
                log::debug!(
                    "Building deferred module `{}`",
                    std::any::type_name::<T>()
                );
                build(handle)
            }
        }
    }
}

impl<T> From<T> for ModuleBuilder<T> {
    fn from(module: T) -> Self {
        Self::Ready(module)
    }
}

impl<T> fmt::Debug for ModuleBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => write!(f, "Ready({})", std::any::type_name::<T>()),
            Self::Deferred(_) => write!(f, "Deferred({})", std::any::type_name::<T>()),
        }
    }
}

/// A tuple of [`ModuleBuilder`]s resolving to a [`ModuleList`].
pub trait ModuleBuilders {
    /// The composition the builders resolve to.
    type Modules: ModuleList;

    /// Resolves every builder in slot order.
    fn resolve(self, handle: &ManagerHandle) -> Self::Modules;
}
