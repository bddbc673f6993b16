//! part-dispatch: Components with named parts for directive-based reactive hosts
//!
//! Declare a component once: a setup function that builds its reactive Api,
//! and handlers for the parts inside it. A single directive then serves the
//! root element (`x-tabs`) and every part (`x-tabs:button`), handing each part
//! the Api of the root it lives under.
//!
//! # Example
//! ```ignore
//! use part_dispatch::prelude::*;
//!
//! #[derive(PartKey, Clone, Copy, PartialEq, Eq, Hash, Debug)]
//! enum TabsPart {
//!     Button,
//!     Panel,
//! }
//!
//! struct Tabs {
//!     active: String,
//! }
//!
//! let tabs = define_component(
//!     ComponentConfig::new("tabs", |props, _ctx| {
//!         Ok(Tabs { active: props["defaultTab"].as_str().unwrap_or("tab1").to_string() })
//!     })
//!     .closed::<TabsPart>()
//!     .part(TabsPart::Button.name(), |api, _el, ctx| { /* ... */ Ok(None) })
//!     .part(TabsPart::Panel.name(), |api, _el, ctx| { /* ... */ Ok(None) }),
//! )?;
//!
//! tabs.register(host);
//! ```

// Re-export everything from core
pub use part_dispatch_core::*;

// Re-export derive macros
pub use part_dispatch_macros::PartKey;

/// Prelude for convenient imports.
pub mod prelude {
    // Traits
    pub use part_dispatch_core::{Host, PartKey, Plugin};

    // Components and parts
    pub use part_dispatch_core::{
        define_component, define_scope, Api, ComponentConfig, ComponentDefinition, PartContext,
        PartHandler, PartResult, ScopeOptions, SetupContext,
    };

    // Bindings and host data
    pub use part_dispatch_core::{Binding, Bindings, DataStack, ElementId, Reactive};

    // Identity
    pub use part_dispatch_core::{generate_id, normalize, unique_id, IdGenerator, IdRegistry};

    // Configuration and errors
    pub use part_dispatch_core::{ConfigOverrides, DispatchConfig, Error, Result};

    // Derive macros
    pub use part_dispatch_macros::PartKey;
}
