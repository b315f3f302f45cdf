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

//! # Ordering Engine
//!
//! Turns the profiles of a composition into the dispatch order of one message
//! type. The capable slots are partitioned into three groups:
//!
//! 1. **first**: modules presenting one of the message's first tags, grouped
//!    by their representative tag and ordered by that tag's position in the
//!    message's list,
//! 2. **intermediate**: every other capable module, in composition order,
//! 3. **last**: same as first, against the message's last tags.
//!
//! Inside a tag group modules keep their composition order. The result is a
//! permutation of exactly the capable slots.

use crate::category::{classify, Category, Classification};
use crate::message::MessageKind;
use crate::module::ModuleProfile;
use crate::seq;

/// The dispatch order of one message type, split by group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOrder {
    /// Slots of the first group, in dispatch order.
    pub first: Vec<usize>,
    /// Slots of the intermediate group, in composition order.
    pub intermediate: Vec<usize>,
    /// Slots of the last group, in dispatch order.
    pub last: Vec<usize>,
}

impl DispatchOrder {
    /// Computes the order in which the modules described by `profiles`
    /// receive messages of `kind`.
    ///
    /// `profiles` must be in composition order.
    pub fn compute(profiles: &[ModuleProfile], kind: &MessageKind) -> Self {
        let first_tags = kind.first_tags();
        let last_tags = kind.last_tags();

        let capable: Vec<(usize, Classification)> = profiles
            .iter()
            .filter(|profile| profile.can_process(kind))
            .map(|profile| {
                (
                    profile.slot(),
                    classify(profile, &first_tags, &last_tags),
                )
            })
            .collect();

        let first = ordered_group(&capable, Category::First);
        let last = ordered_group(&capable, Category::Last);

        let tagged: Vec<usize> = first.iter().chain(&last).copied().collect();
        let intermediate = seq::difference(capable.iter().map(|(slot, _)| *slot), &tagged);

        Self {
            first,
            intermediate,
            last,
        }
    }

    /// Returns every slot in dispatch order: first, then intermediate, then
    /// last.
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.first
            .iter()
            .chain(&self.intermediate)
            .chain(&self.last)
            .copied()
    }

    /// Returns the slots in dispatch order, paired with their group.
    pub fn categorized(&self) -> impl Iterator<Item = (usize, Category)> + '_ {
        let first = self.first.iter().map(|slot| (*slot, Category::First));
        let intermediate = self
            .intermediate
            .iter()
            .map(|slot| (*slot, Category::Intermediate));
        let last = self.last.iter().map(|slot| (*slot, Category::Last));
        first.chain(intermediate).chain(last)
    }

    /// Returns the number of capable slots.
    pub fn len(&self) -> usize {
        self.first.len() + self.intermediate.len() + self.last.len()
    }

    /// Returns `true` if no module is capable.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects the members of `category` and orders them by representative,
/// keeping composition order inside each representative group.
fn ordered_group(capable: &[(usize, Classification)], category: Category) -> Vec<usize> {
    let members = capable
        .iter()
        .filter(|(_, classification)| classification.category == category);

    let mut groups = seq::group_stable(members, |(_, classification)| {
        classification.representative
    });
    groups.sort_by_key(|(representative, _)| *representative);

    groups
        .into_iter()
        .flat_map(|(_, members)| members.into_iter().map(|(slot, _)| *slot))
        .collect()
}
