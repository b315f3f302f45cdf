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

//! # Switchboard Core
//!
//! Static module composition and synchronous message routing.
//!
//! A [`Manager`] owns a fixed tuple of [`Module`]s. Every message handed to
//! [`Manager::process`] reaches the modules that implement
//! [`Handler`] for its type, in an order computed once per message type from
//! the tags the message declares. Modules may emit new messages back to the
//! manager while handling one.

#![warn(missing_docs)]

extern crate self as switchboard_core;

pub mod capability;
pub mod category;
pub mod config;
pub mod emitter;
pub mod error;
pub mod fn_module;
pub mod manager;
pub mod message;
pub mod module;
pub mod ordering;
pub mod plan;
pub mod seq;
pub mod tag;

pub use capability::{capabilities_of, AnyHandler, Capabilities, Envelope, Handler, Invocation};
pub use category::Category;
pub use config::ManagerConfig;
pub use emitter::{bind_or_warn, Bind, CallbackEmitter, Emitter};
pub use error::{ConfigError, EmitError};
pub use fn_module::{from_fn, FnChain, FnLink, FnModule};
pub use manager::{Manager, ManagerHandle, ModuleBuilder, ModuleBuilders, ModuleList};
pub use message::{Message, MessageKind};
pub use module::{Module, ModuleProfile};
pub use ordering::DispatchOrder;
pub use plan::DispatchPlan;
pub use tag::{Tag, TagSet};

pub use switchboard_macros::{Message, Module};

/// Everything needed to declare modules and messages.
pub mod prelude {
    pub use crate::{
        from_fn, AnyHandler, CallbackEmitter, Capabilities, Emitter, Envelope, Handler, Manager,
        ManagerConfig, ManagerHandle, Message, Module, ModuleBuilder, Tag, TagSet,
    };
}
