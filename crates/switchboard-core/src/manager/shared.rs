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

//! The shared state behind a manager and its handles.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use super::list::ModuleList;
use crate::config::ManagerConfig;
use crate::message::MessageKind;
use crate::module::ModuleProfile;
use crate::plan::{DispatchPlan, PlanCache};

/// Erased dispatch entry points, so handles and emitters need not name the
/// module list.
pub(crate) trait Dispatch {
    /// Returns the plan of `kind`, computing and caching it on first use.
    fn plan(&self, kind: MessageKind) -> Rc<DispatchPlan>;

    /// Runs `plan` against `message`, which must be of the plan's type.
    fn run_plan(&self, plan: &DispatchPlan, message: &mut dyn Any);

    fn dispatch(&self, kind: MessageKind, message: &mut dyn Any) {
        let plan = self.plan(kind);
        self.run_plan(&plan, message);
    }
}

pub(crate) struct ManagerCore<L> {
    pub(crate) modules: L,
    pub(crate) profiles: Vec<ModuleProfile>,
    pub(crate) plans: PlanCache,
    pub(crate) depth: Cell<usize>,
    pub(crate) config: ManagerConfig,
}

impl<L: ModuleList> ManagerCore<L> {
    pub(crate) fn new(modules: L, config: ManagerConfig) -> Self {
        let profiles = (0..L::LEN)
            .filter_map(|slot| {
                modules
                    .module(slot)
                    .map(|module| ModuleProfile::of(slot, module))
            })
            .collect();
        Self {
            modules,
            profiles,
            plans: PlanCache::new(),
            depth: Cell::new(0),
            config,
        }
    }
}

impl<L: ModuleList> Dispatch for ManagerCore<L> {
    fn plan(&self, kind: MessageKind) -> Rc<DispatchPlan> {
        self.plans.get_or_build(kind, |kind| {
            let plan = DispatchPlan::build(&self.profiles, kind);
            log::debug!(
                "Dispatch plan for `{}`: first {:?}, intermediate {:?}, last {:?}",
                kind.name(),
                plan.order().first,
                plan.order().intermediate,
                plan.order().last
            );
            plan
        })
    }

    fn run_plan(&self, plan: &DispatchPlan, message: &mut dyn Any) {
        let _guard = DepthGuard::enter(&self.depth, self.config.max_emission_depth, plan.kind());

        for step in plan.steps() {
            let Some(module) = self.modules.module(step.slot) else {
                continue;
            };
            if self.config.trace_dispatch {
                log::trace!(
                    "[depth {}] `{}` -> slot {} `{}` ({})",
                    self.depth.get(),
                    plan.kind().name(),
                    step.slot,
                    step.module,
                    step.category
                );
            }
            step.invocation.call(module.as_any(), *plan.kind(), message);
        }
    }
}

/// Tracks dispatch nesting for the lifetime of one `run_plan` call.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>, limit: usize, kind: &MessageKind) -> Self {
        let next = depth.get() + 1;
        if next > limit {
            log::error!(
                "Emission depth limit of {limit} exceeded while dispatching `{}`. Two message types probably emit each other unconditionally.",
                kind.name()
            );
            panic!(
                "emission depth limit of {limit} exceeded while dispatching `{}`",
                kind.name()
            );
        }
        depth.set(next);
        Self { depth }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
