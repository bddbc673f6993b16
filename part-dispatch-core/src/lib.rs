//! Core traits and types for part-dispatch
//!
//! This crate lets a component author declare a named component with a setup
//! function and named parts, then register it with a directive-based reactive
//! host. One directive per component handles both the root element and every
//! part element inside it.
//!
//! # Core Concepts
//!
//! - **Component**: a name, a `setup` function building the reactive Api, and
//!   part handlers ([`ComponentConfig`], [`define_component`])
//! - **Part**: a sub-element bound as `x-<component>:<part>` that receives the
//!   root's Api ([`PartHandler`], [`PartContext`])
//! - **Scope**: a part that introduces its own reactive object, exposed to
//!   descendants as `$<name>` ([`define_scope`])
//! - **Identity**: process-wide id counters and chained `generateId`
//!   generators ([`IdRegistry`], [`IdGenerator`])
//! - **Host**: the surface the reactive framework provides ([`Host`])
//!
//! # Basic Example
//!
//! ```ignore
//! use part_dispatch_core::prelude::*;
//! use serde_json::json;
//!
//! struct Counter {
//!     count: i64,
//! }
//!
//! let counter = define_component(
//!     ComponentConfig::new("counter", |props, _ctx| {
//!         Ok(Counter { count: props["start"].as_i64().unwrap_or(0) })
//!     })
//!     .part("increment", |api, _el, _ctx| {
//!         let api = api.clone();
//!         Ok(Some(Bindings::new().with(
//!             "x-on:click",
//!             Binding::listener(move |_| api.update(|c| c.count += 1)),
//!         )))
//!     }),
//! )?;
//!
//! counter.register(host);
//! ```
//!
//! On the page:
//!
//! ```text
//! <div x-counter="{ start: 5 }">
//!   <button x-counter:increment>+</button>
//! </div>
//! ```

pub mod bindings;
pub mod component;
pub mod config;
pub mod directive;
pub mod error;
pub mod host;
pub mod identity;
pub mod normalize;
pub mod part;
pub mod scope;
pub mod testing;

pub use bindings::{Binding, Bindings};
pub use component::{define_component, ComponentConfig, ComponentDefinition, Plugin};
pub use config::{ConfigOverrides, DispatchConfig};
pub use directive::{
    Cleanup, Continuation, Directive, DirectiveHandler, DirectiveSpec, DirectiveUtilities,
    Evaluator,
};
pub use error::{BoxError, Error, Result};
pub use host::{
    Data, DataStack, ElementId, Host, MagicResolver, Reactive, RootSelector, DEFAULT_PREFIX,
};
pub use identity::{generate_id, unique_id, IdGenerator, IdRegistry, DEFAULT_ID_PREFIX};
pub use normalize::normalize;
pub use part::{Api, PartContext, PartHandler, PartKey, PartResult, SetupContext};
pub use scope::{define_scope, ScopeFrame, ScopeOptions};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::bindings::{Binding, Bindings};
    pub use crate::component::{define_component, ComponentConfig, ComponentDefinition, Plugin};
    pub use crate::config::{ConfigOverrides, DispatchConfig};
    pub use crate::error::{Error, Result};
    pub use crate::host::{DataStack, ElementId, Host, Reactive};
    pub use crate::identity::{generate_id, IdGenerator, IdRegistry};
    pub use crate::part::{Api, PartContext, PartHandler, PartKey, PartResult, SetupContext};
    pub use crate::scope::{define_scope, ScopeOptions};
}
