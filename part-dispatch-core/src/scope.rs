//! Scope factory: parts that introduce a nested reactive namespace
//!
//! A scope part builds its own reactive object and exposes it to the
//! element's descendants as `$<name>` through the host's data directive,
//! without touching the component's Api.
//!
//! # Example
//!
//! ```ignore
//! let item = define_scope(ScopeOptions::new("item", |api: &Api<Accordion>, _el, ctx| {
//!     let id = ctx.value.as_str().unwrap_or_default().to_string();
//!     Ok(Item { open: api.borrow().is_open(&id), id })
//! }));
//!
//! let accordion = ComponentConfig::new("accordion", setup).part_handler("item", item);
//! ```

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::bindings::{Binding, Bindings};
use crate::error::Result;
use crate::host::{make_reactive, Data, ElementId, Reactive};
use crate::identity::IdRegistry;
use crate::part::{Api, PartContext, PartHandler};

type ScopeSetup<A, S> = Rc<dyn Fn(&Api<A>, ElementId, &PartContext) -> Result<S>>;
type ScopeBindings<A, S> = Rc<dyn Fn(&Api<A>, &Reactive<S>) -> Result<Option<Bindings>>>;

/// Data frame exposing a scope object as `$<name>`.
pub struct ScopeFrame {
    name: String,
    scope: Data,
}

impl ScopeFrame {
    /// Expose `scope` under `name`.
    pub fn new(name: impl Into<String>, scope: Data) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }

    /// Scope name without the `$`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Magic key the scope is reachable under (`$item`).
    pub fn key(&self) -> String {
        format!("${}", self.name)
    }

    /// Type-erased scope object.
    pub fn data(&self) -> &Data {
        &self.scope
    }

    /// Typed scope object.
    pub fn get<S: 'static>(&self) -> Option<Reactive<S>> {
        Reactive::from_data(Rc::clone(&self.scope))
    }

    /// Read a frame back out of host data.
    pub fn from_data(data: &Data) -> Option<&ScopeFrame> {
        data.downcast_ref::<ScopeFrame>()
    }
}

impl fmt::Debug for ScopeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeFrame")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Options for [`define_scope`].
pub struct ScopeOptions<A, S> {
    name: String,
    setup: ScopeSetup<A, S>,
    bindings: Option<ScopeBindings<A, S>>,
    registry: Arc<IdRegistry>,
}

impl<A: 'static, S: 'static> ScopeOptions<A, S> {
    /// Scope named `name` whose object is built by `setup`.
    ///
    /// `setup` receives the incoming part context with `generate_id`
    /// replaced by the scope's own generator.
    pub fn new(
        name: impl Into<String>,
        setup: impl Fn(&Api<A>, ElementId, &PartContext) -> Result<S> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            setup: Rc::new(setup),
            bindings: None,
            registry: IdRegistry::global(),
        }
    }

    /// Extra bindings derived from the Api and the new scope object.
    ///
    /// Errors abort the part invocation like errors from `setup`.
    pub fn bindings(
        mut self,
        bindings: impl Fn(&Api<A>, &Reactive<S>) -> Result<Option<Bindings>> + 'static,
    ) -> Self {
        self.bindings = Some(Rc::new(bindings));
        self
    }

    /// Draw scope namespaces from `registry` instead of the process-wide one.
    pub fn with_id_registry(mut self, registry: Arc<IdRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

/// Build a part handler that introduces the scope described by `options`.
///
/// Every invocation creates an independent scope object and id namespace.
pub fn define_scope<A: 'static, S: 'static>(options: ScopeOptions<A, S>) -> PartHandler<A> {
    let ScopeOptions {
        name,
        setup,
        bindings,
        registry,
    } = options;

    PartHandler::new(move |api, el, ctx| {
        let generate_id = ctx.generate_id.child(&registry, &name);
        let scoped = ctx.with_generator(generate_id);

        let scope = make_reactive(&*ctx.host, setup(api, el, &scoped)?, &name)?;
        let frame: Data = Rc::new(ScopeFrame::new(name.clone(), scope.to_data()));

        let mut result =
            Bindings::new().with(ctx.data_attribute(), Binding::data(move || Rc::clone(&frame)));
        if let Some(bindings) = &bindings {
            if let Some(extra) = bindings(api, &scope)? {
                result.merge(extra);
            }
        }

        tracing::debug!(scope = %name, element = el.0, "scope created");
        Ok(Some(result))
    })
}
