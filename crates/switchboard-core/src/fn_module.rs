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

//! Modules built from closures.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use crate::capability::{AnyHandler, Capabilities, Envelope, Handler};
use crate::message::{Message, MessageKind};
use crate::module::Module;
use crate::seq;
use crate::tag::{Tag, TagSet};

/// A module handling one message type with a closure.
///
/// Useful for adapters and tests. Every closure has its own type, so each
/// `FnModule` has a distinct identity tag. [`and`](FnModule::and) chains
/// further closures into one [`FnChain`] module.
///
/// ```rust
/// use switchboard_core::{from_fn, Manager};
///
/// let manager = Manager::new((
///     from_fn(|value: &mut i32| *value += 1),
///     from_fn(|value: &mut i32| *value *= 10).named("scale"),
/// ));
/// assert_eq!(manager.process(1), 20);
/// ```
pub struct FnModule<M, F> {
    handler: F,
    name: Option<&'static str>,
    extra_tags: TagSet,
    _message: PhantomData<fn(&mut M)>,
}

/// Creates a [`FnModule`] from `handler`.
pub fn from_fn<M, F>(handler: F) -> FnModule<M, F>
where
    M: Message,
    F: Fn(&mut M) + 'static,
{
    FnModule::new(handler)
}

impl<M, F> FnModule<M, F>
where
    M: Message,
    F: Fn(&mut M) + 'static,
{
    /// Wraps `handler`.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            name: None,
            extra_tags: TagSet::new(),
            _message: PhantomData,
        }
    }

    /// Sets the diagnostic name.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Adds `tags` to the module's identity.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.extra_tags.extend(tags);
        self
    }

    /// Chains `handler` after this closure.
    ///
    /// The name and extra tags move to the returned chain.
    pub fn and<N, G>(mut self, handler: G) -> FnChain<Self, FnModule<N, G>>
    where
        N: Message,
        G: Fn(&mut N) + 'static,
    {
        let name = self.name.take();
        let extra_tags = std::mem::take(&mut self.extra_tags);
        FnChain::new(self, FnModule::new(handler), name, extra_tags)
    }
}

impl<M, F> Handler<M> for FnModule<M, F>
where
    M: Message,
    F: Fn(&mut M),
{
    fn process(&self, message: &mut M) {
        (self.handler)(message);
    }
}

impl<M, F> Module for FnModule<M, F>
where
    M: Message,
    F: Fn(&mut M) + 'static,
{
    fn name(&self) -> &'static str {
        self.name.unwrap_or_else(std::any::type_name::<Self>)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new().with::<M, Self>()
    }

    fn tags(&self) -> TagSet {
        let mut tags = TagSet::single(Tag::of::<Self>());
        tags.extend(self.extra_tags.iter().copied());
        tags
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<M, F> fmt::Debug for FnModule<M, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModule")
            .field("message", &std::any::type_name::<M>())
            .field("name", &self.name)
            .field("tags", &self.extra_tags)
            .finish()
    }
}

/// A piece of a closure chain.
pub trait FnLink: 'static {
    /// Appends the message types the link accepts, in call order.
    fn kinds(&self, kinds: &mut Vec<MessageKind>);

    /// Calls every closure of the link that accepts the wrapped message.
    fn call(&self, envelope: &mut Envelope<'_>);
}

impl<M, F> FnLink for FnModule<M, F>
where
    M: Message,
    F: Fn(&mut M) + 'static,
{
    fn kinds(&self, kinds: &mut Vec<MessageKind>) {
        kinds.push(MessageKind::of::<M>());
    }

    fn call(&self, envelope: &mut Envelope<'_>) {
        if let Some(message) = envelope.downcast_mut::<M>() {
            (self.handler)(message);
        }
    }
}

/// Several closures combined into one module.
///
/// The chain handles every message type one of its closures accepts. For each
/// message it calls the accepting closures in the order they were chained,
/// and no other.
///
/// ```rust
/// use switchboard_core::{from_fn, Manager};
///
/// let manager = Manager::new((from_fn(|value: &mut i32| *value += 1)
///     .and(|text: &mut String| text.push('?'))
///     .and(|value: &mut i32| *value *= 10),));
///
/// assert_eq!(manager.process(1), 20);
/// assert_eq!(manager.process(String::from("ok")), "ok?");
/// ```
pub struct FnChain<A, B> {
    head: A,
    tail: B,
    name: Option<&'static str>,
    extra_tags: TagSet,
}

impl<A: FnLink, B: FnLink> FnChain<A, B> {
    fn new(head: A, tail: B, name: Option<&'static str>, extra_tags: TagSet) -> Self {
        Self {
            head,
            tail,
            name,
            extra_tags,
        }
    }

    /// Chains `handler` after every closure already in the chain.
    pub fn and<N, G>(mut self, handler: G) -> FnChain<Self, FnModule<N, G>>
    where
        N: Message,
        G: Fn(&mut N) + 'static,
    {
        let name = self.name.take();
        let extra_tags = std::mem::take(&mut self.extra_tags);
        FnChain::new(self, FnModule::new(handler), name, extra_tags)
    }

    /// Sets the diagnostic name.
    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Adds `tags` to the module's identity.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.extra_tags.extend(tags);
        self
    }

    /// Returns the distinct message types the chain handles.
    pub fn message_kinds(&self) -> Vec<MessageKind> {
        let mut kinds = Vec::new();
        self.kinds(&mut kinds);
        seq::dedup_stable(kinds)
    }
}

impl<A: FnLink, B: FnLink> FnLink for FnChain<A, B> {
    fn kinds(&self, kinds: &mut Vec<MessageKind>) {
        self.head.kinds(kinds);
        self.tail.kinds(kinds);
    }

    fn call(&self, envelope: &mut Envelope<'_>) {
        self.head.call(envelope);
        self.tail.call(envelope);
    }
}

impl<A: FnLink, B: FnLink> AnyHandler for FnChain<A, B> {
    fn process_any(&self, envelope: &mut Envelope<'_>) {
        self.call(envelope);
    }
}

impl<A: FnLink, B: FnLink> Module for FnChain<A, B> {
    fn name(&self) -> &'static str {
        self.name.unwrap_or_else(std::any::type_name::<Self>)
    }

    fn capabilities(&self) -> Capabilities {
        self.message_kinds()
            .into_iter()
            .fold(Capabilities::new(), |table, kind| table.routed::<Self>(kind))
    }

    fn tags(&self) -> TagSet {
        let mut tags = TagSet::single(Tag::of::<Self>());
        tags.extend(self.extra_tags.iter().copied());
        tags
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<A: FnLink, B: FnLink> fmt::Debug for FnChain<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&'static str> = self
            .message_kinds()
            .iter()
            .map(MessageKind::name)
            .collect();
        f.debug_struct("FnChain")
            .field("messages", &messages)
            .field("name", &self.name)
            .field("tags", &self.extra_tags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::can_process;

    struct Audit;

    #[test]
    fn test_fn_module_handles_only_its_message() {
        let module = from_fn(|text: &mut String| text.push('.'));
        assert!(can_process::<String>(&module));
        assert!(!can_process::<i32>(&module));

        let mut text = String::from("done");
        module.process(&mut text);
        assert_eq!(text, "done.");
    }

    #[test]
    fn test_fn_module_tags_extend_identity() {
        let module = from_fn(|_: &mut u8| {})
            .named("tap")
            .with_tags([Tag::of::<Audit>(), Tag::of::<Audit>()]);

        assert_eq!(module.name(), "tap");
        let tags = module.tags();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get(1), Some(&Tag::of::<Audit>()));
    }

    #[test]
    fn test_chain_handles_the_union_of_its_closures() {
        let chain = from_fn(|value: &mut i32| *value += 1)
            .and(|text: &mut String| text.push('!'))
            .and(|value: &mut i32| *value *= 3);

        assert_eq!(
            chain.message_kinds(),
            vec![MessageKind::of::<i32>(), MessageKind::of::<String>()]
        );
        assert!(can_process::<i32>(&chain));
        assert!(can_process::<String>(&chain));
        assert!(!can_process::<u8>(&chain));
    }

    #[test]
    fn test_chain_calls_accepting_closures_in_order() {
        let chain = from_fn(|value: &mut i32| *value += 1)
            .and(|text: &mut String| text.push('!'))
            .and(|value: &mut i32| *value *= 3);

        let kind = MessageKind::of::<i32>();
        let mut value = 1;
        chain
            .capabilities()
            .invocation(&kind)
            .expect("chain handles i32")
            .call(chain.as_any(), kind, &mut value);
        assert_eq!(value, 6);

        let kind = MessageKind::of::<String>();
        let mut text = String::from("go");
        chain
            .capabilities()
            .invocation(&kind)
            .expect("chain handles String")
            .call(chain.as_any(), kind, &mut text);
        assert_eq!(text, "go!");
    }

    #[test]
    fn test_chain_keeps_name_and_tags() {
        let chain = from_fn(|_: &mut u8| {})
            .named("pair")
            .with_tags([Tag::of::<Audit>()])
            .and(|_: &mut u16| {});

        assert_eq!(chain.name(), "pair");
        assert!(chain.tags().contains(&Tag::of::<Audit>()));
        assert_eq!(chain.tags().len(), 2);
    }
}
