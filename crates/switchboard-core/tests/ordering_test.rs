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

use std::cell::RefCell;
use std::rc::Rc;

use switchboard_core::prelude::*;
use switchboard_core::Category;

// --- Tags shared by several modules ---
struct Alpha;
struct Beta;
struct Shared;

type Calls = Rc<RefCell<Vec<&'static str>>>;

// --- Messages ---
#[derive(Message)]
struct Plain;

#[derive(Message)]
#[message(first(Alpha, Beta))]
struct Ranked;

#[derive(Message)]
#[message(first(Alpha, Alpha, Beta, Alpha))]
struct RankedTwice;

#[derive(Message)]
#[message(first(Shared))]
struct SharedFirst;

#[derive(Message)]
#[message(first(Alpha), last(Alpha))]
struct BothEnds;

#[derive(Message)]
#[message(first("audio"), last(Beta, "late"))]
struct Named;

macro_rules! module {
    ($name:ident $(, $($attr:tt)+)?) => {
        #[derive(Module)]
        #[module(handles(Plain, Ranked, RankedTwice, SharedFirst, BothEnds, Named))]
        $(#[module($($attr)+)])?
        struct $name {
            calls: Calls,
        }

        impl $name {
            fn new(calls: &Calls) -> Self {
                Self {
                    calls: calls.clone(),
                }
            }

            fn record(&self) {
                self.calls.borrow_mut().push(stringify!($name));
            }
        }

        impl Handler<Plain> for $name {
            fn process(&self, _: &mut Plain) {
                self.record();
            }
        }

        impl Handler<Ranked> for $name {
            fn process(&self, _: &mut Ranked) {
                self.record();
            }
        }

        impl Handler<RankedTwice> for $name {
            fn process(&self, _: &mut RankedTwice) {
                self.record();
            }
        }

        impl Handler<SharedFirst> for $name {
            fn process(&self, _: &mut SharedFirst) {
                self.record();
            }
        }

        impl Handler<BothEnds> for $name {
            fn process(&self, _: &mut BothEnds) {
                self.record();
            }
        }

        impl Handler<Named> for $name {
            fn process(&self, _: &mut Named) {
                self.record();
            }
        }
    };
}

module!(Untagged);
module!(Late, tags("late"));
module!(AlphaOne, replace_tags(Alpha, Shared));
module!(BetaOne, tags(Beta));
module!(AlphaTwo, replace_tags(Alpha));
module!(Speaker, first("audio", Shared));
module!(BetaTwo, tags(Beta, Beta, Shared));
// ---

type Composition = (Untagged, BetaOne, AlphaOne, Late, BetaTwo, AlphaTwo, Speaker);

fn compose(calls: &Calls) -> Manager<Composition> {
    Manager::new((
        Untagged::new(calls),
        BetaOne::new(calls),
        AlphaOne::new(calls),
        Late::new(calls),
        BetaTwo::new(calls),
        AlphaTwo::new(calls),
        Speaker::new(calls),
    ))
}

#[test]
fn test_untagged_message_keeps_composition_order() {
    let calls = Calls::default();
    let manager = compose(&calls);

    manager.process(Plain);

    assert_eq!(manager.dispatch_order::<Plain>(), (0..7).collect::<Vec<_>>());
    assert_eq!(
        *calls.borrow(),
        ["Untagged", "BetaOne", "AlphaOne", "Late", "BetaTwo", "AlphaTwo", "Speaker"]
    );
}

#[test]
fn test_first_tags_order_groups_by_tag_then_composition() {
    let calls = Calls::default();
    let manager = compose(&calls);

    manager.process(Ranked);

    // Alpha modules, then Beta modules, then everything else in order.
    assert_eq!(
        *calls.borrow(),
        ["AlphaOne", "AlphaTwo", "BetaOne", "BetaTwo", "Untagged", "Late", "Speaker"]
    );
}

#[test]
fn test_duplicate_tags_do_not_change_order() {
    let calls = Calls::default();
    let manager = compose(&calls);

    assert_eq!(
        manager.dispatch_order::<RankedTwice>(),
        manager.dispatch_order::<Ranked>()
    );
    assert_eq!(RankedTwice::first_tags().len(), 2);
    assert_eq!(manager.profiles()[4].tags(Category::Intermediate).len(), 3);
}

#[test]
fn test_modules_sharing_a_tag_run_first_in_composition_order() {
    let calls = Calls::default();
    let manager = compose(&calls);

    manager.process(SharedFirst);

    // AlphaOne and BetaTwo present Shared through their identity, Speaker
    // through its first-category tags.
    assert_eq!(
        *calls.borrow(),
        ["AlphaOne", "BetaTwo", "Speaker", "Untagged", "BetaOne", "Late", "AlphaTwo"]
    );
}

#[test]
fn test_first_check_wins_over_last_check() {
    let calls = Calls::default();
    let manager = compose(&calls);

    let categories = manager.categories::<BothEnds>();

    assert_eq!(&categories[..2], &[(2, Category::First), (5, Category::First)]);
    assert!(categories
        .iter()
        .all(|(_, category)| *category != Category::Last));
}

#[test]
fn test_named_tags_and_last_group_ordering() {
    let calls = Calls::default();
    let manager = compose(&calls);

    manager.process(Named);

    // Speaker presents "audio" to the first category only. The last group is
    // ordered Beta before "late".
    assert_eq!(
        *calls.borrow(),
        ["Speaker", "Untagged", "AlphaOne", "AlphaTwo", "BetaOne", "BetaTwo", "Late"]
    );
    assert_eq!(
        manager.categories::<Named>().last(),
        Some(&(3, Category::Last))
    );
}

#[test]
fn test_fn_modules_take_part_in_ordering() {
    let calls = Calls::default();
    let (first, second) = (calls.clone(), calls.clone());
    let manager = Manager::new((
        from_fn(move |_: &mut Ranked| first.borrow_mut().push("plain")),
        from_fn(move |_: &mut Ranked| second.borrow_mut().push("beta"))
            .with_tags([Tag::of::<Beta>()]),
    ));

    manager.process(Ranked);

    assert_eq!(*calls.borrow(), ["beta", "plain"]);
}
