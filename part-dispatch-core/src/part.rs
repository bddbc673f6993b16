//! Part handler contract and invocation contexts

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::bindings::Bindings;
use crate::config::DispatchConfig;
use crate::directive::Cleanup;
use crate::error::Result;
use crate::host::{DataStack, ElementId, Host, Reactive};
use crate::identity::IdGenerator;

/// Reactive state object returned by a component's setup function.
pub type Api<A> = Reactive<A>;

/// What a part handler returns: extra bindings for its element, or nothing.
pub type PartResult = Result<Option<Bindings>>;

/// Closed set of part keys for a component.
///
/// Implement this for an enum of part roles, or use `#[derive(PartKey)]` from
/// `part-dispatch-macros` which names each variant in camelCase.
///
/// # Example
/// ```ignore
/// #[derive(PartKey, Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum TabsPart {
///     Button,
///     Panel,
/// }
///
/// assert_eq!(TabsPart::Button.name(), "button");
/// assert_eq!(TabsPart::from_name("panel"), Some(TabsPart::Panel));
/// ```
pub trait PartKey: Copy + Eq + 'static {
    /// Normalized part name.
    fn name(&self) -> &'static str;

    /// Look a part up by its normalized name.
    fn from_name(name: &str) -> Option<Self>;

    /// Every part in the set.
    fn all() -> &'static [Self];
}

/// Context passed once to a component's setup function.
#[derive(Clone)]
pub struct SetupContext {
    /// Host the component is registered with.
    pub host: Rc<dyn Host>,
    /// Instance id generator.
    pub generate_id: IdGenerator,
}

impl SetupContext {
    /// Id for `label` within this instance.
    pub fn id(&self, label: &str) -> String {
        self.generate_id.generate(label)
    }
}

impl fmt::Debug for SetupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupContext").finish_non_exhaustive()
    }
}

/// Context passed to every part handler invocation.
#[derive(Clone)]
pub struct PartContext {
    /// Evaluated directive expression (`Null` for blank expressions and the root part).
    pub value: Value,
    /// Directive modifiers, in order.
    pub modifiers: Vec<String>,
    /// Host the component is registered with.
    pub host: Rc<dyn Host>,
    /// Teardown registration for the element.
    pub cleanup: Cleanup,
    /// Id generator of the enclosing instance or scope.
    pub generate_id: IdGenerator,
    /// Names the dispatcher emits.
    pub config: Rc<DispatchConfig>,
}

impl PartContext {
    /// Context with a `Null` value, no modifiers, and a no-op cleanup.
    pub fn new(host: Rc<dyn Host>, generate_id: IdGenerator) -> Self {
        Self {
            value: Value::Null,
            modifiers: Vec::new(),
            host,
            cleanup: Cleanup::noop(),
            generate_id,
            config: Rc::new(DispatchConfig::default()),
        }
    }

    /// Set the value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the modifiers.
    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the cleanup registration.
    pub fn with_cleanup(mut self, cleanup: Cleanup) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Same context with a different id generator.
    pub fn with_generator(&self, generate_id: IdGenerator) -> Self {
        Self {
            generate_id,
            ..self.clone()
        }
    }

    /// Id for `label` within the enclosing instance or scope.
    pub fn id(&self, label: &str) -> String {
        self.generate_id.generate(label)
    }

    /// Whether `modifier` was given.
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    /// Data visible from `el`.
    pub fn data(&self, el: ElementId) -> DataStack {
        self.host.data(el)
    }

    /// Scope `$name` visible from `el`.
    pub fn scope<S: 'static>(&self, el: ElementId, name: &str) -> Option<Reactive<S>> {
        self.host.data(el).scope(name)
    }

    /// Prefixed attribute name of the host's data directive.
    pub fn data_attribute(&self) -> String {
        self.host.prefixed(&self.config.data_directive)
    }
}

impl fmt::Debug for PartContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartContext")
            .field("value", &self.value)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

/// Handler for one part of a component.
///
/// Receives the component's Api, the part element, and the invocation
/// context. Bindings it wants applied are returned, never applied directly.
pub struct PartHandler<A>(Rc<dyn Fn(&Api<A>, ElementId, &PartContext) -> PartResult>);

impl<A> PartHandler<A> {
    /// Wrap a handler function.
    pub fn new(handler: impl Fn(&Api<A>, ElementId, &PartContext) -> PartResult + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Invoke the handler.
    pub fn call(&self, api: &Api<A>, el: ElementId, ctx: &PartContext) -> PartResult {
        (self.0)(api, el, ctx)
    }
}

impl<A> Clone for PartHandler<A> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<A> fmt::Debug for PartHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PartHandler(..)")
    }
}
