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

//! Fixed module compositions and their builders, implemented for tuples.

use super::builder::{ModuleBuilder, ModuleBuilders};
use super::handle::ManagerHandle;
use crate::module::Module;

/// A statically sized, ordered collection of modules.
///
/// Implemented for tuples of up to twelve modules. The tuple position is the
/// module's slot, and two positions of the same type are distinct instances.
pub trait ModuleList: 'static {
    /// Number of modules in the composition.
    const LEN: usize;

    /// Returns the module at `slot`.
    fn module(&self, slot: usize) -> Option<&dyn Module>;
}

impl ModuleList for () {
    const LEN: usize = 0;

    fn module(&self, _slot: usize) -> Option<&dyn Module> {
        None
    }
}

impl ModuleBuilders for () {
    type Modules = ();

    fn resolve(self, _handle: &ManagerHandle) -> Self::Modules {}
}

macro_rules! impl_tuples {
    ($len:expr; $($T:ident : $slot:tt),+) => {
        impl<$($T: Module),+> ModuleList for ($($T,)+) {
            const LEN: usize = $len;

            fn module(&self, slot: usize) -> Option<&dyn Module> {
                match slot {
                    $($slot => Some(&self.$slot),)+
                    _ => None,
                }
            }
        }

        impl<$($T: Module),+> ModuleBuilders for ($(ModuleBuilder<$T>,)+) {
            type Modules = ($($T,)+);

            fn resolve(self, handle: &ManagerHandle) -> Self::Modules {
                ($(self.$slot.resolve(handle),)+)
            }
        }
    };
}

impl_tuples!(1; A: 0);
impl_tuples!(2; A: 0, B: 1);
impl_tuples!(3; A: 0, B: 1, C: 2);
impl_tuples!(4; A: 0, B: 1, C: 2, D: 3);
impl_tuples!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuples!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_tuples!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_tuples!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
impl_tuples!(9; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8);
impl_tuples!(10; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9);
impl_tuples!(11; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10);
impl_tuples!(12; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7, I: 8, J: 9, K: 10, L: 11);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use std::any::Any;

    struct Left;
    struct Right;

    impl Module for Left {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl Module for Right {
        fn name(&self) -> &'static str {
            "right"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::new()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_tuple_slots_follow_positions() {
        let list = (Left, Right, Left);

        assert_eq!(<(Left, Right, Left) as ModuleList>::LEN, 3);
        assert_eq!(list.module(1).map(|module| module.name()), Some("right"));
        assert!(list.module(2).is_some_and(|module| module.as_any().is::<Left>()));
        assert!(list.module(3).is_none());
        assert!(().module(0).is_none());
    }
}
