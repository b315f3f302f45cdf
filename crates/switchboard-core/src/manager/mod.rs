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

//! # Manager
//!
//! The [`Manager`] owns a fixed tuple of modules and is the single entry point
//! for dispatch. Composition runs in two phases:
//!
//! 1. the modules are stored (deferred builders run here, receiving a handle
//!    that does not reach the manager yet),
//! 2. every module's [`register`](crate::Module::register) hook is called with
//!    a live [`ManagerHandle`], in composition order.
//!
//! Dispatch is synchronous and re-entrant: a module handling one message may
//! emit another, whose dispatch completes before the outer handler resumes.

mod builder;
mod handle;
mod list;
mod shared;

pub use self::builder::{ModuleBuilder, ModuleBuilders};
pub use self::handle::ManagerHandle;
pub use self::list::ModuleList;

pub(crate) use self::shared::Dispatch;

use std::fmt;
use std::rc::{Rc, Weak};

use self::shared::ManagerCore;
use crate::category::Category;
use crate::config::ManagerConfig;
use crate::message::{Message, MessageKind};
use crate::module::{Module, ModuleProfile};
use crate::plan::DispatchPlan;
use crate::seq;

/// Owner of a fixed composition of modules and entry point of dispatch.
///
/// `L` is a tuple of module types. Each position is a distinct slot, even
/// when two positions share a type.
///
/// ```rust
/// use std::any::Any;
/// use switchboard_core::{Capabilities, Handler, Manager, Module};
///
/// struct Doubler;
///
/// impl Handler<i32> for Doubler {
///     fn process(&self, value: &mut i32) {
///         *value *= 2;
///     }
/// }
///
/// impl Module for Doubler {
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::new().with::<i32, Self>()
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let manager = Manager::new((Doubler, Doubler));
/// assert_eq!(manager.process(3), 12);
/// ```
pub struct Manager<L: ModuleList> {
    core: Rc<ManagerCore<L>>,
}

impl<L: ModuleList> Manager<L> {
    /// Composes a manager from already constructed modules.
    pub fn new(modules: L) -> Self {
        Self::with_config(modules, ManagerConfig::default())
    }

    /// Composes a manager from already constructed modules with `config`.
    pub fn with_config(modules: L, config: ManagerConfig) -> Self {
        Self::compose(|_| modules, config)
    }

    /// Composes a manager from one builder per slot.
    pub fn build<B>(builders: B) -> Self
    where
        B: ModuleBuilders<Modules = L>,
    {
        Self::build_with_config(builders, ManagerConfig::default())
    }

    /// Composes a manager from one builder per slot with `config`.
    pub fn build_with_config<B>(builders: B, config: ManagerConfig) -> Self
    where
        B: ModuleBuilders<Modules = L>,
    {
        Self::compose(|handle| builders.resolve(handle), config)
    }

    fn compose(modules: impl FnOnce(&ManagerHandle) -> L, mut config: ManagerConfig) -> Self {
        if let Err(err) = config.validate() {
            log::warn!("{err}; using a maximum emission depth of 1");
            config.max_emission_depth = 1;
        }

        let core = Rc::new_cyclic(|weak: &Weak<ManagerCore<L>>| {
            let erased: Weak<dyn Dispatch> = weak.clone();
            let modules = modules(&ManagerHandle::new(erased));
            ManagerCore::new(modules, config)
        });
        let manager = Self { core };

        let handle = manager.handle();
        for slot in 0..L::LEN {
            if let Some(module) = manager.core.modules.module(slot) {
                log::debug!("Registering module `{}` in slot {slot}", module.name());
                module.register(&handle);
            }
        }

        if manager.core.config.precompute_plans {
            let kinds = seq::dedup_stable(
                manager
                    .core
                    .profiles
                    .iter()
                    .flat_map(|profile| profile.capabilities().kinds().copied()),
            );
            for kind in kinds {
                manager.core.plan(kind);
            }
        }

        log::info!(
            "Composed manager with {} module(s), {} dispatch plan(s) ready",
            L::LEN,
            manager.core.plans.len()
        );
        manager
    }

    /// Dispatches `message` to every capable module and returns it.
    ///
    /// Modules run in the dispatch order of `M`. With no capable module the
    /// message comes back untouched.
    ///
    /// # Panics
    ///
    /// Panics if nested emissions exceed
    /// [`ManagerConfig::max_emission_depth`].
    pub fn process<M: Message>(&self, mut message: M) -> M {
        self.process_mut(&mut message);
        message
    }

    /// Dispatches `message` in place to every capable module.
    ///
    /// # Panics
    ///
    /// Panics if nested emissions exceed
    /// [`ManagerConfig::max_emission_depth`].
    pub fn process_mut<'m, M: Message>(&self, message: &'m mut M) -> &'m mut M {
        self.core.dispatch(MessageKind::of::<M>(), &mut *message);
        message
    }

    /// Returns a handle to this manager.
    pub fn handle(&self) -> ManagerHandle {
        let erased: Rc<dyn Dispatch> = self.core.clone();
        ManagerHandle::new(Rc::downgrade(&erased))
    }

    /// Returns the number of modules.
    pub fn len(&self) -> usize {
        L::LEN
    }

    /// Returns `true` if the composition is empty.
    pub fn is_empty(&self) -> bool {
        L::LEN == 0
    }

    /// Returns the module tuple.
    pub fn modules(&self) -> &L {
        &self.core.modules
    }

    /// Returns the module at `slot`.
    pub fn module(&self, slot: usize) -> Option<&dyn Module> {
        self.core.modules.module(slot)
    }

    /// Returns the module at `slot` if it is a `T`.
    pub fn module_as<T: Module>(&self, slot: usize) -> Option<&T> {
        self.module(slot)
            .and_then(|module| module.as_any().downcast_ref::<T>())
    }

    /// Returns the static profile of every slot, in composition order.
    pub fn profiles(&self) -> &[ModuleProfile] {
        &self.core.profiles
    }

    /// Returns `true` if the module at `slot` processes messages of type `M`.
    pub fn can_process<M: Message>(&self, slot: usize) -> bool {
        self.core
            .profiles
            .get(slot)
            .is_some_and(|profile| profile.can_process(&MessageKind::of::<M>()))
    }

    /// Returns the dispatch plan of `M`, computing it if needed.
    pub fn plan<M: Message>(&self) -> Rc<DispatchPlan> {
        self.core.plan(MessageKind::of::<M>())
    }

    /// Returns the slots that receive an `M`, in dispatch order.
    pub fn dispatch_order<M: Message>(&self) -> Vec<usize> {
        self.plan::<M>().order().slots().collect()
    }

    /// Returns the slots that receive an `M` paired with their group.
    pub fn categories<M: Message>(&self) -> Vec<(usize, Category)> {
        self.plan::<M>().order().categorized().collect()
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &ManagerConfig {
        &self.core.config
    }

    /// Returns the current dispatch nesting; zero outside of `process`.
    pub fn depth(&self) -> usize {
        self.core.depth.get()
    }

    /// Returns the number of message types with a cached plan.
    pub fn cached_plans(&self) -> usize {
        self.core.plans.len()
    }
}

impl<L: ModuleList + Default> Default for Manager<L> {
    fn default() -> Self {
        Self::new(L::default())
    }
}

impl<L: ModuleList> fmt::Debug for Manager<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = self.core.profiles.iter().map(ModuleProfile::name).collect();
        f.debug_struct("Manager")
            .field("modules", &names)
            .field("config", &self.core.config)
            .field("cached_plans", &self.core.plans.len())
            .finish()
    }
}
