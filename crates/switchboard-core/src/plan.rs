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

//! Flattened, cached dispatch sequences.
//!
//! A [`DispatchPlan`] is the ordering of one message type resolved down to the
//! invoker of every step, so running it is a plain loop of calls. Plans are
//! shared through `Rc` so that a dispatch can keep running its plan while a
//! nested dispatch inserts new plans into the same [`PlanCache`].

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::capability::Invocation;
use crate::category::Category;
use crate::message::MessageKind;
use crate::module::ModuleProfile;
use crate::ordering::DispatchOrder;

/// One call of a dispatch plan.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Composition position of the module.
    pub slot: usize,
    /// Diagnostic name of the module.
    pub module: &'static str,
    /// Group the module was placed in.
    pub category: Category,
    /// How the module is called.
    pub invocation: Invocation,
}

/// The resolved dispatch sequence for one message type.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    kind: MessageKind,
    order: DispatchOrder,
    steps: Vec<Step>,
}

impl DispatchPlan {
    /// Computes the plan of `kind` over the given composition.
    pub fn build(profiles: &[ModuleProfile], kind: MessageKind) -> Self {
        let order = DispatchOrder::compute(profiles, &kind);
        let steps = order
            .categorized()
            .filter_map(|(slot, category)| {
                let profile = profiles.get(slot)?;
                let invocation = profile.capabilities().invocation(&kind)?;
                Some(Step {
                    slot,
                    module: profile.name(),
                    category,
                    invocation,
                })
            })
            .collect();

        Self { kind, order, steps }
    }

    /// Returns the message type this plan dispatches.
    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Returns the grouped dispatch order.
    pub fn order(&self) -> &DispatchOrder {
        &self.order
    }

    /// Returns the calls, in dispatch order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns `true` if no module processes this message type.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Per-manager cache of dispatch plans keyed by message type.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: RefCell<HashMap<TypeId, Rc<DispatchPlan>>>,
}

impl PlanCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the plan of `kind`, building it with `build` on first use.
    ///
    /// The cache is not borrowed while `build` runs nor once this returns.
    pub fn get_or_build(
        &self,
        kind: MessageKind,
        build: impl FnOnce(MessageKind) -> DispatchPlan,
    ) -> Rc<DispatchPlan> {
        if let Some(plan) = self.get(&kind) {
            return plan;
        }
        let plan = Rc::new(build(kind));
        self.plans
            .borrow_mut()
            .entry(kind.id())
            .or_insert(plan)
            .clone()
    }

    /// Returns the cached plan of `kind`, if any.
    pub fn get(&self, kind: &MessageKind) -> Option<Rc<DispatchPlan>> {
        self.plans.borrow().get(&kind.id()).cloned()
    }

    /// Returns the number of cached plans.
    pub fn len(&self) -> usize {
        self.plans.borrow().len()
    }

    /// Returns `true` if nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.plans.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capabilities, Handler};
    use crate::message::Message;
    use crate::module::Module;
    use crate::tag::{Tag, TagSet};
    use std::any::Any;
    use std::cell::Cell;

    struct Shout;

    impl Message for Shout {
        fn last_tags() -> TagSet {
            TagSet::single(Tag::of::<Loud>())
        }
    }

    struct Loud;

    impl Handler<Shout> for Loud {
        fn process(&self, _message: &mut Shout) {}
    }

    impl Module for Loud {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new().with::<Shout, Self>()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct Quiet;

    impl Handler<Shout> for Quiet {
        fn process(&self, _message: &mut Shout) {}
    }

    impl Module for Quiet {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new().with::<Shout, Self>()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn profiles() -> Vec<ModuleProfile> {
        vec![ModuleProfile::of(0, &Loud), ModuleProfile::of(1, &Quiet)]
    }

    #[test]
    fn test_plan_steps_follow_order() {
        let plan = DispatchPlan::build(&profiles(), MessageKind::of::<Shout>());

        let steps: Vec<(usize, Category)> = plan
            .steps()
            .iter()
            .map(|step| (step.slot, step.category))
            .collect();
        assert_eq!(steps, vec![(1, Category::Intermediate), (0, Category::Last)]);
        assert!(plan.steps()[1].module.ends_with("Loud"));
    }

    #[test]
    fn test_cache_builds_each_kind_once() {
        let cache = PlanCache::new();
        let profiles = profiles();
        let builds = Cell::new(0);
        let build = |kind| {
            builds.set(builds.get() + 1);
            DispatchPlan::build(&profiles, kind)
        };

        let a = cache.get_or_build(MessageKind::of::<Shout>(), build);
        let b = cache.get_or_build(MessageKind::of::<Shout>(), build);
        let empty = cache.get_or_build(MessageKind::of::<u8>(), build);

        assert!(Rc::ptr_eq(&a, &b));
        assert!(empty.is_empty());
        assert_eq!(builds.get(), 2);
        assert_eq!(cache.len(), 2);
    }
}
