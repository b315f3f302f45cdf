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

//! The module contract and the static profile the manager keeps per slot.

use std::any::Any;

use crate::capability::{capabilities_of, Capabilities};
use crate::category::Category;
use crate::manager::ManagerHandle;
use crate::message::MessageKind;
use crate::tag::{Tag, TagSet};

/// An independently defined unit of behaviour owned by a
/// [`Manager`](crate::Manager).
///
/// A module receives messages through its [`Handler`](crate::Handler) impls,
/// one per accepted message type, and lists them in [`capabilities`]. Every
/// other method has a default, so a minimal module reads:
///
/// ```rust
/// use std::any::Any;
/// use std::cell::Cell;
/// use switchboard_core::{Capabilities, Handler, Module};
///
/// #[derive(Default)]
/// struct Counter {
///     seen: Cell<u32>,
/// }
///
/// impl Handler<u32> for Counter {
///     fn process(&self, _message: &mut u32) {
///         self.seen.set(self.seen.get() + 1);
///     }
/// }
///
/// impl Module for Counter {
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::new().with::<u32, Self>()
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
///
/// The derive in `switchboard-macros` writes this impl from attributes.
///
/// [`capabilities`]: Module::capabilities
pub trait Module: Any {
    /// Returns a name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the message types this module processes.
    fn capabilities(&self) -> Capabilities;

    /// Returns the identity tags of this module.
    ///
    /// Defaults to the module's own type tag. Implementations extending the
    /// identity should keep `Tag::of::<Self>()` first.
    fn tags(&self) -> TagSet {
        TagSet::single(Tag::of::<Self>())
    }

    /// Returns the tags presented to the first category, or `None` to present
    /// the identity tags.
    fn first_tags(&self) -> Option<TagSet> {
        None
    }

    /// Returns the tags presented to the last category, or `None` to present
    /// the identity tags.
    fn last_tags(&self) -> Option<TagSet> {
        None
    }

    /// Called once by the manager after every module has been stored, in
    /// composition order.
    ///
    /// Modules embedding an emitter bind it here.
    fn register(&self, _handle: &ManagerHandle) {}

    /// Returns `self` as [`Any`] so invokers can recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// What the manager knows about a module slot, captured once at composition.
#[derive(Debug, Clone)]
pub struct ModuleProfile {
    slot: usize,
    name: &'static str,
    capabilities: Capabilities,
    identity: TagSet,
    first: TagSet,
    last: TagSet,
}

impl ModuleProfile {
    /// Captures the static shape of the module stored at `slot`.
    pub fn of(slot: usize, module: &dyn Module) -> Self {
        let identity = module.tags();
        let first = module.first_tags().unwrap_or_else(|| identity.clone());
        let last = module.last_tags().unwrap_or_else(|| identity.clone());
        Self {
            slot,
            name: module.name(),
            capabilities: capabilities_of(module),
            identity,
            first,
            last,
        }
    }

    /// Returns the composition position of the module.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Returns the module's diagnostic name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the module's capability table.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the tags the module presents to `category`.
    pub fn tags(&self, category: Category) -> &TagSet {
        match category {
            Category::First => &self.first,
            Category::Intermediate => &self.identity,
            Category::Last => &self.last,
        }
    }

    /// Returns `true` if the module processes messages of `kind`.
    pub fn can_process(&self, kind: &MessageKind) -> bool {
        self.capabilities.can_process(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    struct Plain;

    impl Module for Plain {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Decorated;

    impl Module for Decorated {
        fn name(&self) -> &'static str {
            "decorated"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::new()
        }

        fn tags(&self) -> TagSet {
            TagSet::from([Tag::of::<Self>(), Tag::of::<Marker>()])
        }

        fn last_tags(&self) -> Option<TagSet> {
            Some(TagSet::single(Tag::named("late")))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_undeclared_categories_present_identity() {
        let profile = ModuleProfile::of(3, &Plain);

        assert_eq!(profile.slot(), 3);
        assert!(profile.name().ends_with("Plain"));
        for category in [Category::First, Category::Intermediate, Category::Last] {
            assert_eq!(
                profile.tags(category).as_slice(),
                &[Tag::of::<Plain>()],
                "{category:?}"
            );
        }
    }

    #[test]
    fn test_declared_categories_replace_identity() {
        let profile = ModuleProfile::of(0, &Decorated);

        assert_eq!(profile.name(), "decorated");
        assert_eq!(
            profile.tags(Category::First).as_slice(),
            &[Tag::of::<Decorated>(), Tag::of::<Marker>()]
        );
        assert_eq!(
            profile.tags(Category::Last).as_slice(),
            &[Tag::named("late")]
        );
    }
}
