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

//! # Capability Detection
//!
//! A module is capable of a message type when it implements [`Handler<M>`]
//! for exactly that type. Since the manager only sees modules through
//! `dyn Module`, each module publishes a [`Capabilities`] table listing the
//! message types it handles. Adding an entry goes through
//! [`Capabilities::with`], whose bounds only hold when the `Handler` impl
//! exists. Each entry also records the module type it was declared for, and
//! [`capabilities_of`] drops entries declared for another type, so a table
//! can never claim a type the module cannot process.
//!
//! Each entry carries a monomorphised [`Invoker`] that downcasts the erased
//! module and message back to their concrete types. There is no coercion
//! between related types: `Handler<u32>` does not make a module capable of
//! `u64`.
//!
//! Generic handlers that accept every message type implement [`AnyHandler`]
//! and register it with [`Capabilities::any`]. They receive an [`Envelope`].

use std::any::{Any, TypeId};
use std::fmt;

use crate::message::{Message, MessageKind};
use crate::module::Module;

/// Processing of one message type by a module.
///
/// Handlers take `&self`: a handler may emit a message whose dispatch
/// re-enters the same module, so mutable state lives behind `Cell`,
/// `RefCell` or atomics.
pub trait Handler<M: Message> {
    /// Processes `message`, which may be mutated in place.
    fn process(&self, message: &mut M);
}

/// A type-erased message handed to an [`AnyHandler`].
pub struct Envelope<'a> {
    kind: MessageKind,
    message: &'a mut dyn Any,
}

impl<'a> Envelope<'a> {
    pub(crate) fn new(kind: MessageKind, message: &'a mut dyn Any) -> Self {
        Self { kind, message }
    }

    /// Returns the descriptor of the wrapped message.
    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Returns `true` if the wrapped message is an `M`.
    pub fn is<M: Message>(&self) -> bool {
        self.kind.is::<M>()
    }

    /// Returns the message as an `M`, if it is one.
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.message.downcast_ref::<M>()
    }

    /// Returns the message as a mutable `M`, if it is one.
    pub fn downcast_mut<M: Message>(&mut self) -> Option<&mut M> {
        self.message.downcast_mut::<M>()
    }
}

impl fmt::Debug for Envelope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope").field("kind", &self.kind).finish()
    }
}

/// A handler that accepts every message type.
pub trait AnyHandler {
    /// Processes any message.
    fn process_any(&self, envelope: &mut Envelope<'_>);
}

/// Calls a module's handler for one message type through erased references.
pub type Invoker = fn(&dyn Any, &mut dyn Any);

/// Calls a module's [`AnyHandler`] through an erased module reference.
pub type AnyInvoker = fn(&dyn Any, &mut Envelope<'_>);

fn invoke_handler<T, M>(module: &dyn Any, message: &mut dyn Any)
where
    T: Handler<M> + 'static,
    M: Message,
{
    match (module.downcast_ref::<T>(), message.downcast_mut::<M>()) {
        (Some(module), Some(message)) => module.process(message),
        _ => log::error!(
            "Handler for `{}` on `{}` was invoked with a mismatched module or message.",
            std::any::type_name::<M>(),
            std::any::type_name::<T>()
        ),
    }
}

fn invoke_any_handler<T>(module: &dyn Any, envelope: &mut Envelope<'_>)
where
    T: AnyHandler + 'static,
{
    match module.downcast_ref::<T>() {
        Some(module) => module.process_any(envelope),
        None => log::error!(
            "Catch-all handler on `{}` was invoked with a mismatched module.",
            std::any::type_name::<T>()
        ),
    }
}

/// One entry of a capability table.
#[derive(Clone, Copy)]
pub struct Capability {
    kind: MessageKind,
    owner: TypeId,
    invocation: Invocation,
}

impl Capability {
    /// Returns the message type this entry handles.
    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Returns the type of the module the invocation downcasts to.
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    /// Returns the erased call into the module.
    pub fn invocation(&self) -> Invocation {
        self.invocation
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability")
            .field(&self.kind.name())
            .field(&self.invocation)
            .finish()
    }
}

/// How a module is called for a given message type.
#[derive(Clone, Copy)]
pub enum Invocation {
    /// Through the module's `Handler<M>` impl.
    Exact(Invoker),
    /// Through the module's [`AnyHandler`] impl.
    Any(AnyInvoker),
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Exact(_) => f.write_str("Exact"),
            Invocation::Any(_) => f.write_str("Any"),
        }
    }
}

impl Invocation {
    /// Calls the module with the erased message.
    pub fn call(&self, module: &dyn Any, kind: MessageKind, message: &mut dyn Any) {
        match *self {
            Invocation::Exact(invoker) => invoker(module, message),
            Invocation::Any(invoker) => {
                let mut envelope = Envelope::new(kind, message);
                invoker(module, &mut envelope);
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Fallback {
    owner: TypeId,
    invoker: AnyInvoker,
}

/// The ordered set of message types a module can process.
#[derive(Clone, Default)]
pub struct Capabilities {
    entries: Vec<Capability>,
    fallback: Option<Fallback>,
}

impl Capabilities {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that module type `T` handles message type `M`.
    ///
    /// Declaring the same message type twice keeps the first entry.
    #[must_use]
    pub fn with<M, T>(self) -> Self
    where
        M: Message,
        T: Handler<M> + 'static,
    {
        self.push(
            MessageKind::of::<M>(),
            TypeId::of::<T>(),
            Invocation::Exact(invoke_handler::<T, M>),
        )
    }

    /// Declares that module type `T` handles messages of `kind` through its
    /// [`AnyHandler`] impl, without accepting every other type.
    #[must_use]
    pub fn routed<T>(self, kind: MessageKind) -> Self
    where
        T: AnyHandler + 'static,
    {
        self.push(
            kind,
            TypeId::of::<T>(),
            Invocation::Any(invoke_any_handler::<T>),
        )
    }

    /// Declares that module type `T` accepts every message type through its
    /// [`AnyHandler`] impl.
    ///
    /// Exact entries still take precedence for the types they name.
    #[must_use]
    pub fn any<T>(mut self) -> Self
    where
        T: AnyHandler + 'static,
    {
        self.fallback = Some(Fallback {
            owner: TypeId::of::<T>(),
            invoker: invoke_any_handler::<T>,
        });
        self
    }

    fn push(mut self, kind: MessageKind, owner: TypeId, invocation: Invocation) -> Self {
        if self.find(kind.id()).is_none() {
            self.entries.push(Capability {
                kind,
                owner,
                invocation,
            });
        }
        self
    }

    /// Keeps only the entries whose invocation downcasts to `owner`.
    ///
    /// An entry declared for another module type could never be called, so it
    /// is dropped with an error instead of making the module look capable.
    #[must_use]
    pub fn retain_owner(mut self, owner: TypeId, module: &str) -> Self {
        self.entries.retain(|entry| {
            let owned = entry.owner == owner;
            if !owned {
                log::error!(
                    "Module `{module}` declares a handler for `{}` implemented by another type; ignoring it.",
                    entry.kind.name()
                );
            }
            owned
        });
        if self.fallback.is_some_and(|fallback| fallback.owner != owner) {
            log::error!(
                "Module `{module}` declares a catch-all handler implemented by another type; ignoring it."
            );
            self.fallback = None;
        }
        self
    }

    /// Returns the exact entry for a message type.
    pub fn find(&self, id: TypeId) -> Option<&Capability> {
        self.entries.iter().find(|entry| entry.kind.id() == id)
    }

    /// Returns `true` if the module can process messages of `kind`.
    pub fn can_process(&self, kind: &MessageKind) -> bool {
        self.fallback.is_some() || self.find(kind.id()).is_some()
    }

    /// Returns how to call the module for `kind`, if it is capable.
    pub fn invocation(&self, kind: &MessageKind) -> Option<Invocation> {
        match self.find(kind.id()) {
            Some(entry) => Some(entry.invocation),
            None => self
                .fallback
                .map(|fallback| Invocation::Any(fallback.invoker)),
        }
    }

    /// Returns `true` if a catch-all handler was declared.
    pub fn accepts_any(&self) -> bool {
        self.fallback.is_some()
    }

    /// Returns the message types named by entries, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = &MessageKind> {
        self.entries.iter().map(|entry| &entry.kind)
    }

    /// Returns the entries.
    pub fn entries(&self) -> &[Capability] {
        &self.entries
    }

    /// Returns the number of entries, the catch-all excluded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entry and no catch-all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.fallback.is_none()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("entries", &self.entries)
            .field("accepts_any", &self.fallback.is_some())
            .finish()
    }
}

/// Returns the capability table of `module`, restricted to entries the module
/// itself implements.
pub fn capabilities_of(module: &dyn Module) -> Capabilities {
    module
        .capabilities()
        .retain_owner(Any::type_id(module.as_any()), module.name())
}

/// Returns `true` if `module` can process messages of type `M`.
pub fn can_process<M: Message>(module: &dyn Module) -> bool {
    capabilities_of(module).can_process(&MessageKind::of::<M>())
}
