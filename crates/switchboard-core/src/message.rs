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

//! Messages and their static descriptors.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::tag::TagSet;

/// A plain data value routed through a [`Manager`](crate::Manager).
///
/// A message has no identity beyond its static type. It may declare two
/// ordered tag lists: modules presenting one of the [`first_tags`] run before
/// every other capable module, modules presenting one of the [`last_tags`] run
/// after them.
///
/// Most messages derive this trait:
///
/// ```rust,ignore
/// #[derive(Message)]
/// #[message(first(Renderer), last(Audit))]
/// struct FrameEnded { index: u64 }
/// ```
///
/// [`first_tags`]: Message::first_tags
/// [`last_tags`]: Message::last_tags
pub trait Message: Any {
    /// Tags whose modules must run before the rest, in priority order.
    fn first_tags() -> TagSet {
        TagSet::new()
    }

    /// Tags whose modules must run after the rest, in priority order.
    fn last_tags() -> TagSet {
        TagSet::new()
    }
}

macro_rules! impl_message {
    ($($ty:ty),* $(,)?) => {
        $(impl Message for $ty {})*
    };
}

impl_message!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

/// The static descriptor of a message type.
///
/// It is what the dispatch engine works with once the concrete message type
/// has been erased: the type identity, a name for diagnostics, and the
/// message's declared tag lists.
#[derive(Clone, Copy)]
pub struct MessageKind {
    id: TypeId,
    name: &'static str,
    first: fn() -> TagSet,
    last: fn() -> TagSet,
}

impl MessageKind {
    /// Returns the descriptor of message type `M`.
    pub fn of<M: Message>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: type_name::<M>(),
            first: M::first_tags,
            last: M::last_tags,
        }
    }

    /// Returns the [`TypeId`] of the message type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type name of the message type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the message's first tags.
    pub fn first_tags(&self) -> TagSet {
        (self.first)()
    }

    /// Returns the message's last tags.
    pub fn last_tags(&self) -> TagSet {
        (self.last)()
    }

    /// Returns `true` if this describes message type `M`.
    pub fn is<M: Message>(&self) -> bool {
        self.id == TypeId::of::<M>()
    }
}

impl PartialEq for MessageKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageKind {}

impl Hash for MessageKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageKind")
            .field("name", &self.name)
            .finish()
    }
}
