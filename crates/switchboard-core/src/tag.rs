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

//! Identity tags and ordered tag sets.
//!
//! A [`Tag`] carries no data and owns nothing: it exists purely so that a
//! message can name the modules it wants to run first or last. Tags come in
//! two flavours:
//!
//! - **type tags** ([`Tag::of`]), usually the module's own type or a dedicated
//!   marker type shared by several modules,
//! - **named tags** ([`Tag::named`]), a static string identifier.
//!
//! A [`TagSet`] is an ordered set. Building one removes duplicates while
//! keeping the first occurrence of each tag in place, so declaring the same
//! tag twice never changes an ordering.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::seq;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TagId {
    Type(TypeId),
    Name(&'static str),
}

/// An identity value used to match modules against a message's ordering
/// preferences.
///
/// Equality and hashing only look at the identity; the label is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct Tag {
    id: TagId,
    label: &'static str,
}

impl Tag {
    /// Creates the tag identifying type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TagId::Type(TypeId::of::<T>()),
            label: type_name::<T>(),
        }
    }

    /// Creates a tag identified by a static name.
    pub const fn named(name: &'static str) -> Self {
        Self {
            id: TagId::Name(name),
            label: name,
        }
    }

    /// Returns the human readable label of this tag.
    ///
    /// For type tags this is the full type path.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Returns `true` if this tag is the type tag of `T`.
    pub fn is_type<T: ?Sized + 'static>(&self) -> bool {
        self.id == TagId::Type(TypeId::of::<T>())
    }

    /// Returns `true` if this tag was created with [`Tag::named`].
    pub fn is_named(&self) -> bool {
        matches!(self.id, TagId::Name(_))
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            TagId::Type(_) => write!(f, "Tag({})", self.label),
            TagId::Name(name) => write!(f, "Tag({name:?})"),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// An ordered, duplicate-free sequence of [`Tag`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    /// Creates an empty tag set.
    pub const fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Creates a tag set holding a single tag.
    pub fn single(tag: Tag) -> Self {
        Self { tags: vec![tag] }
    }

    /// Creates a tag set from `tags`, dropping repeated tags after their first
    /// occurrence.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            tags: seq::dedup_stable(tags),
        }
    }

    /// Appends `tag` unless it is already present.
    ///
    /// Returns `true` if the tag was added.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Returns `true` if `tag` is part of the set.
    pub fn contains(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Returns `true` if the two sets share at least one tag.
    pub fn intersects(&self, other: &TagSet) -> bool {
        self.tags.iter().any(|tag| other.contains(tag))
    }

    /// Returns the position, in `self`, of the first tag that `presented`
    /// also contains.
    ///
    /// This is how a module's representative tag is chosen: the earliest tag
    /// of the message's list that the module presents.
    pub fn first_shared_position(&self, presented: &TagSet) -> Option<usize> {
        seq::first_position(&self.tags, |tag| presented.contains(tag))
    }

    /// Returns the tag at `index`.
    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.tags.get(index)
    }

    /// Returns the tags as a slice, in declaration order.
    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }

    /// Returns an iterator over the tags, in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    /// Returns the number of tags in the set.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns `true` if the set holds no tag.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Extend<Tag> for TagSet {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        for tag in iter {
            self.insert(tag);
        }
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self::from_tags(iter)
    }
}

impl<const N: usize> From<[Tag; N]> for TagSet {
    fn from(tags: [Tag; N]) -> Self {
        Self::from_tags(tags)
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, tag) in self.tags.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str("]")
    }
}
