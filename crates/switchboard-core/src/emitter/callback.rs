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

//! # Callback-table emitter
//!
//! A [`CallbackEmitter<S>`] is declared with a tuple `S` of message types. It
//! holds one [`Route`] per type; binding resolves every route to the manager
//! and that type's dispatch plan, so emitting runs the stored plan directly.
//!
//! [`CallbackEmitter::emit`] is bounded by [`Select<M, I>`], which `S` only
//! implements when `M` is one of its elements. `I` is a position marker the
//! compiler infers. Listing the same type twice leaves two candidate
//! positions, and emitting that type fails to compile as ambiguous.
//!
//! ```rust,ignore
//! struct Spawner {
//!     out: CallbackEmitter<(Spawned, Despawned)>,
//! }
//!
//! spawner.out.emit(Spawned { id })?;   // ok
//! spawner.out.emit(Tick)?;             // error: `Select<Tick, _>` not satisfied
//! ```

use std::cell::OnceCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use super::Bind;
use crate::error::EmitError;
use crate::manager::{Dispatch, ManagerHandle};
use crate::message::{Message, MessageKind};
use crate::plan::DispatchPlan;

struct RouteBinding {
    manager: Weak<dyn Dispatch>,
    plan: Rc<DispatchPlan>,
}

/// The resolved path of one declared message type.
pub struct Route<M> {
    binding: OnceCell<RouteBinding>,
    _message: PhantomData<fn(M)>,
}

impl<M: Message> Route<M> {
    fn bind(&self, handle: &ManagerHandle) -> Result<(), EmitError> {
        let (manager, plan) = handle.resolve(MessageKind::of::<M>())?;
        self.binding
            .set(RouteBinding { manager, plan })
            .map_err(|_| EmitError::AlreadyBound)
    }

    fn emit_mut(&self, message: &mut M) -> Result<(), EmitError> {
        let binding = self.binding.get().ok_or(EmitError::Unbound)?;
        let manager = binding
            .manager
            .upgrade()
            .ok_or(EmitError::ManagerUnavailable)?;
        manager.run_plan(&binding.plan, message);
        Ok(())
    }

    /// Returns `true` once the route has been resolved.
    pub fn is_bound(&self) -> bool {
        self.binding.get().is_some()
    }

    /// Returns the resolved plan.
    pub fn plan(&self) -> Option<&DispatchPlan> {
        self.binding.get().map(|binding| binding.plan.as_ref())
    }
}

impl<M> Default for Route<M> {
    fn default() -> Self {
        Self {
            binding: OnceCell::new(),
            _message: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Route<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("message", &std::any::type_name::<M>())
            .field("bound", &self.binding.get().is_some())
            .finish()
    }
}

/// A closed tuple of message types a [`CallbackEmitter`] may emit.
pub trait MessageSet: 'static {
    /// One [`Route`] per element.
    type Routes: Default;

    /// Resolves every route against the manager behind `handle`.
    fn bind_routes(routes: &Self::Routes, handle: &ManagerHandle) -> Result<(), EmitError>;

    /// Returns `true` if every route is resolved.
    fn routes_bound(routes: &Self::Routes) -> bool;

    /// Returns the declared message types, in declaration order.
    fn kinds() -> Vec<MessageKind>;
}

/// Selects the route of message type `M` at position `I` of a [`MessageSet`].
pub trait Select<M, I>: MessageSet {
    /// Returns the route of `M`.
    fn route(routes: &Self::Routes) -> &Route<M>;
}

macro_rules! index_markers {
    ($($name:ident),+) => {
        $(
            /// Position marker for [`Select`].
            #[derive(Debug)]
            pub enum $name {}
        )+
    };
}

index_markers!(Index0, Index1, Index2, Index3, Index4, Index5, Index6, Index7);

macro_rules! impl_message_set {
    ($(($M:ident, $idx:tt, $I:ident)),+) => {
        impl<$($M: Message),+> MessageSet for ($($M,)+) {
            type Routes = ($(Route<$M>,)+);

            fn bind_routes(routes: &Self::Routes, handle: &ManagerHandle) -> Result<(), EmitError> {
                $(routes.$idx.bind(handle)?;)+
                Ok(())
            }

            fn routes_bound(routes: &Self::Routes) -> bool {
                true $(&& routes.$idx.is_bound())+
            }

            fn kinds() -> Vec<MessageKind> {
                vec![$(MessageKind::of::<$M>()),+]
            }
        }

        impl_message_set!(@select [$($M),+] $(($M, $idx, $I))+);
    };
    (@select $all:tt $(($M:ident, $idx:tt, $I:ident))+) => {
        $(impl_message_set!(@one $all $M, $idx, $I);)+
    };
    (@one [$($all:ident),+] $M:ident, $idx:tt, $I:ident) => {
        impl<$($all: Message),+> Select<$M, $I> for ($($all,)+) {
            fn route(routes: &Self::Routes) -> &Route<$M> {
                &routes.$idx
            }
        }
    };
}

impl_message_set!((A, 0, Index0));
impl_message_set!((A, 0, Index0), (B, 1, Index1));
impl_message_set!((A, 0, Index0), (B, 1, Index1), (C, 2, Index2));
impl_message_set!((A, 0, Index0), (B, 1, Index1), (C, 2, Index2), (D, 3, Index3));
impl_message_set!(
    (A, 0, Index0),
    (B, 1, Index1),
    (C, 2, Index2),
    (D, 3, Index3),
    (E, 4, Index4)
);
impl_message_set!(
    (A, 0, Index0),
    (B, 1, Index1),
    (C, 2, Index2),
    (D, 3, Index3),
    (E, 4, Index4),
    (F, 5, Index5)
);
impl_message_set!(
    (A, 0, Index0),
    (B, 1, Index1),
    (C, 2, Index2),
    (D, 3, Index3),
    (E, 4, Index4),
    (F, 5, Index5),
    (G, 6, Index6)
);
impl_message_set!(
    (A, 0, Index0),
    (B, 1, Index1),
    (C, 2, Index2),
    (D, 3, Index3),
    (E, 4, Index4),
    (F, 5, Index5),
    (G, 6, Index6),
    (H, 7, Index7)
);

/// Emits a closed set of message types through routes resolved at
/// registration.
///
/// Each type should appear once in `S`. A repeated type is not merged into
/// one route: both positions stay in the tuple and selecting that type is
/// ambiguous, so the mistake surfaces at the emit call.
///
/// ```rust,compile_fail
/// use switchboard_core::CallbackEmitter;
///
/// let out = CallbackEmitter::<(u8, u8)>::new();
/// let _ = out.emit(1_u8); // error: cannot infer the route position
/// ```
pub struct CallbackEmitter<S: MessageSet> {
    routes: S::Routes,
}

impl<S: MessageSet> CallbackEmitter<S> {
    /// Creates an emitter with unresolved routes.
    pub fn new() -> Self {
        Self {
            routes: S::Routes::default(),
        }
    }

    /// Resolves every route against the manager behind `handle`.
    pub fn bind(&self, handle: &ManagerHandle) -> Result<(), EmitError> {
        S::bind_routes(&self.routes, handle)
    }

    /// Returns `true` once every route is resolved.
    pub fn is_bound(&self) -> bool {
        S::routes_bound(&self.routes)
    }

    /// Returns the message types this emitter may emit.
    pub fn kinds(&self) -> Vec<MessageKind> {
        S::kinds()
    }

    /// Returns the route of `M`.
    pub fn route<M, I>(&self) -> &Route<M>
    where
        S: Select<M, I>,
    {
        S::route(&self.routes)
    }

    /// Dispatches `message` along its resolved route and returns it.
    pub fn emit<M, I>(&self, mut message: M) -> Result<M, EmitError>
    where
        M: Message,
        S: Select<M, I>,
    {
        self.emit_mut::<M, I>(&mut message)?;
        Ok(message)
    }

    /// Dispatches `message` in place along its resolved route.
    pub fn emit_mut<M, I>(&self, message: &mut M) -> Result<(), EmitError>
    where
        M: Message,
        S: Select<M, I>,
    {
        S::route(&self.routes).emit_mut(message)
    }
}

impl<S: MessageSet> Default for CallbackEmitter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MessageSet> Bind for CallbackEmitter<S> {
    fn bind(&self, handle: &ManagerHandle) -> Result<(), EmitError> {
        CallbackEmitter::bind(self, handle)
    }
}

impl<S: MessageSet> fmt::Debug for CallbackEmitter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&'static str> = S::kinds().iter().map(MessageKind::name).collect();
        f.debug_struct("CallbackEmitter")
            .field("messages", &names)
            .field("bound", &self.is_bound())
            .finish()
    }
}
