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

//! Classification of a module relative to one message type.

use std::fmt;

use crate::message::MessageKind;
use crate::module::ModuleProfile;
use crate::tag::TagSet;

/// The priority bucket a capable module falls into for a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Runs before every other capable module.
    First,
    /// Runs in composition order between the first and last groups.
    Intermediate,
    /// Runs after every other capable module.
    Last,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::First => "first",
            Category::Intermediate => "intermediate",
            Category::Last => "last",
        })
    }
}

/// The result of classifying one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The bucket the module belongs to.
    pub category: Category,
    /// For the first and last buckets, the position in the message's tag list
    /// of the earliest tag the module presents. `None` for intermediate.
    pub representative: Option<usize>,
}

impl Classification {
    const INTERMEDIATE: Self = Self {
        category: Category::Intermediate,
        representative: None,
    };
}

/// Classifies `profile` against a message's declared first and last tags.
///
/// The first check runs before the last check, so a module matching both
/// lists is placed in the first group.
pub fn classify(profile: &ModuleProfile, first: &TagSet, last: &TagSet) -> Classification {
    if let Some(position) = first.first_shared_position(profile.tags(Category::First)) {
        return Classification {
            category: Category::First,
            representative: Some(position),
        };
    }
    if let Some(position) = last.first_shared_position(profile.tags(Category::Last)) {
        return Classification {
            category: Category::Last,
            representative: Some(position),
        };
    }
    Classification::INTERMEDIATE
}

/// Classifies `profile` for messages of `kind`.
pub fn classify_for(profile: &ModuleProfile, kind: &MessageKind) -> Classification {
    classify(profile, &kind.first_tags(), &kind.last_tags())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use crate::module::Module;
    use crate::tag::Tag;
    use std::any::Any;

    struct Probe {
        tags: TagSet,
    }

    impl Module for Probe {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new()
        }

        fn tags(&self) -> TagSet {
            self.tags.clone()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn profile(tags: &[Tag]) -> ModuleProfile {
        ModuleProfile::of(
            0,
            &Probe {
                tags: tags.iter().copied().collect(),
            },
        )
    }

    #[test]
    fn test_untagged_module_is_intermediate() {
        let first = TagSet::from([Tag::named("a")]);
        let result = classify(&profile(&[Tag::named("z")]), &first, &TagSet::new());
        assert_eq!(result.category, Category::Intermediate);
        assert_eq!(result.representative, None);
    }

    #[test]
    fn test_first_check_precedes_last_check() {
        let both = TagSet::from([Tag::named("x")]);
        let result = classify(&profile(&[Tag::named("x")]), &both, &both);
        assert_eq!(result.category, Category::First);
    }

    #[test]
    fn test_representative_is_earliest_message_tag() {
        let last = TagSet::from([Tag::named("a"), Tag::named("b"), Tag::named("c")]);
        let result = classify(
            &profile(&[Tag::named("c"), Tag::named("b")]),
            &TagSet::new(),
            &last,
        );
        assert_eq!(
            result,
            Classification {
                category: Category::Last,
                representative: Some(1),
            }
        );
    }
}
