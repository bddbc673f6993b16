//! Test utilities for part-dispatch components
//!
//! - [`TestHost`]: an in-memory [`Host`] with an element tree, expression
//!   evaluation, and recorded registrations and bindings
//! - Assertion macros for checking what ended up bound on an element
//!
//! # Example
//!
//! ```ignore
//! use part_dispatch::testing::TestHost;
//!
//! let host = TestHost::new();
//! host.plugin(&tabs);
//!
//! let root = host.element();
//! host.run_directive(root, "x-tabs", "{ \"defaultTab\": \"home\" }")?;
//!
//! let button = host.child(root);
//! host.run_directive(button, "x-tabs:button", "'home'")?;
//! assert_bound!(host, button, "data-part", "button");
//! ```
//!
//! Expressions are evaluated as JSON literals, single-quoted strings, or
//! entries registered with [`TestHost::define_expression`]. Hosts created with
//! [`TestHost::deferred`] queue every evaluation until [`TestHost::flush`].

#[doc(hidden)]
pub use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tokio::sync::mpsc;

use crate::bindings::{Binding, Bindings};
use crate::component::Plugin;
use crate::directive::{Cleanup, Continuation, Directive, DirectiveSpec, DirectiveUtilities, Evaluator};
use crate::error::{Error, Result};
use crate::host::{Data, DataStack, ElementId, Host, MagicResolver, RootSelector, DEFAULT_PREFIX};

type Job = Box<dyn FnOnce() -> Result<()>>;

#[derive(Default)]
struct State {
    next_element: u64,
    parents: HashMap<ElementId, ElementId>,
    bindings: HashMap<ElementId, Bindings>,
    cleanups: HashMap<ElementId, Vec<Box<dyn FnOnce()>>>,
    magics: Vec<(String, MagicResolver)>,
    selectors: Vec<RootSelector>,
    directives: Vec<DirectiveSpec>,
    expressions: HashMap<String, Value>,
    errors: Vec<Error>,
    reactive_calls: usize,
}

/// In-memory host for driving components in tests.
///
/// Elements are plain ids arranged in a tree. Bindings are recorded per
/// element; `Binding::Data` entries become the element's data frames, which
/// is how [`Host::data`] finds Apis and scopes on ancestors.
pub struct TestHost {
    prefix: String,
    deferred: bool,
    state: RefCell<State>,
    pending: Cell<usize>,
    tx: mpsc::UnboundedSender<Job>,
    rx: RefCell<mpsc::UnboundedReceiver<Job>>,
}

impl TestHost {
    /// Host that runs every evaluation immediately.
    pub fn new() -> Rc<Self> {
        Self::build(DEFAULT_PREFIX, false)
    }

    /// Host that queues evaluations until [`flush`](Self::flush).
    pub fn deferred() -> Rc<Self> {
        Self::build(DEFAULT_PREFIX, true)
    }

    /// Host with a custom attribute prefix.
    pub fn with_prefix(prefix: &str) -> Rc<Self> {
        Self::build(prefix, false)
    }

    fn build(prefix: &str, deferred: bool) -> Rc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Rc::new(Self {
            prefix: prefix.to_string(),
            deferred,
            state: RefCell::new(State::default()),
            pending: Cell::new(0),
            tx,
            rx: RefCell::new(rx),
        })
    }

    /// Install a plugin.
    pub fn plugin(self: &Rc<Self>, plugin: &dyn Plugin) {
        plugin.install(Rc::clone(self) as Rc<dyn Host>);
    }

    /// Create a detached element.
    pub fn element(&self) -> ElementId {
        let mut state = self.state.borrow_mut();
        state.next_element += 1;
        ElementId(state.next_element)
    }

    /// Create an element under `parent`.
    pub fn child(&self, parent: ElementId) -> ElementId {
        let el = self.element();
        self.state.borrow_mut().parents.insert(el, parent);
        el
    }

    /// Parent of `el`, if attached.
    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.state.borrow().parents.get(&el).copied()
    }

    /// Remove `el` and its descendants, running their cleanups.
    pub fn remove(&self, el: ElementId) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            let mut doomed = vec![el];
            let mut i = 0;
            while i < doomed.len() {
                let current = doomed[i];
                doomed.extend(
                    state
                        .parents
                        .iter()
                        .filter(|(_, parent)| **parent == current)
                        .map(|(child, _)| *child),
                );
                i += 1;
            }

            let mut callbacks = Vec::new();
            for el in doomed {
                state.parents.remove(&el);
                state.bindings.remove(&el);
                callbacks.extend(state.cleanups.remove(&el).unwrap_or_default());
            }
            callbacks
        };

        for callback in callbacks {
            callback();
        }
    }

    /// Give `expression` a fixed value.
    pub fn define_expression(&self, expression: &str, value: impl Into<Value>) {
        self.state
            .borrow_mut()
            .expressions
            .insert(expression.trim().to_string(), value.into());
    }

    /// Evaluate an attribute expression.
    pub fn evaluate(&self, expression: &str) -> Result<Value> {
        let expression = expression.trim();
        if let Some(value) = self.state.borrow().expressions.get(expression) {
            return Ok(value.clone());
        }
        if let Some(quoted) = expression
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
        {
            return Ok(Value::String(quoted.to_string()));
        }
        serde_json::from_str(expression)
            .map_err(|e| Error::handler(format!("cannot evaluate `{}`: {}", expression, e)))
    }

    /// Process one attribute occurrence on `el`.
    ///
    /// Attributes without the host prefix or naming an unregistered directive
    /// are ignored. In immediate mode, errors from the directive handler and
    /// its continuation are returned; in deferred mode continuation errors are
    /// collected by [`flush`](Self::flush).
    pub fn run_directive(self: &Rc<Self>, el: ElementId, attribute: &str, expression: &str) -> Result<()> {
        let Some((name, directive)) = Directive::parse(&self.prefix, attribute, expression) else {
            return Ok(());
        };
        let Some(spec) = self
            .state
            .borrow()
            .directives
            .iter()
            .find(|spec| spec.name == name)
            .cloned()
        else {
            tracing::trace!(attribute, "no directive registered");
            return Ok(());
        };

        let utilities = DirectiveUtilities::new(self.evaluator_factory(), self.cleanup_for(el));
        (spec.handler)(el, &directive, &utilities)
    }

    fn evaluator_factory(self: &Rc<Self>) -> impl Fn(&str) -> Evaluator + 'static {
        let weak = Rc::downgrade(self);
        move |expression: &str| -> Evaluator {
            let weak = weak.clone();
            let expression = expression.to_string();
            Box::new(move |continuation: Continuation| -> Result<()> {
                let host = weak.upgrade().ok_or(Error::HostDropped)?;
                let evaluator = weak.clone();
                let job: Job = Box::new(move || -> Result<()> {
                    let host = evaluator.upgrade().ok_or(Error::HostDropped)?;
                    let value = host.evaluate(&expression)?;
                    continuation(value)
                });

                if host.deferred {
                    host.enqueue(job);
                    Ok(())
                } else {
                    job()
                }
            })
        }
    }

    fn cleanup_for(self: &Rc<Self>, el: ElementId) -> Cleanup {
        let weak = Rc::downgrade(self);
        Cleanup::new(move |callback| {
            if let Some(host) = weak.upgrade() {
                host.state
                    .borrow_mut()
                    .cleanups
                    .entry(el)
                    .or_default()
                    .push(callback);
            }
        })
    }

    fn enqueue(&self, job: Job) {
        if self.tx.send(job).is_ok() {
            self.pending.set(self.pending.get() + 1);
        }
    }

    /// Number of queued evaluations.
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Run queued evaluations, including ones queued while flushing.
    ///
    /// Returns how many ran. Errors are collected; see [`take_errors`](Self::take_errors).
    pub fn flush(&self) -> usize {
        let mut ran = 0;
        loop {
            let job = match self.rx.borrow_mut().try_recv() {
                Ok(job) => job,
                Err(_) => break,
            };
            self.pending.set(self.pending.get().saturating_sub(1));
            ran += 1;

            if let Err(e) = job() {
                tracing::debug!(error = %e, "deferred evaluation failed");
                self.state.borrow_mut().errors.push(e);
            }
        }
        ran
    }

    /// Errors collected from deferred evaluations.
    pub fn take_errors(&self) -> Vec<Error> {
        std::mem::take(&mut self.state.borrow_mut().errors)
    }

    /// Everything bound on `el`, merged in binding order.
    pub fn bindings(&self, el: ElementId) -> Bindings {
        self.state
            .borrow()
            .bindings
            .get(&el)
            .cloned()
            .unwrap_or_default()
    }

    /// Current value of a static or computed binding on `el`.
    pub fn evaluate_binding(&self, el: ElementId, key: &str) -> Option<Value> {
        self.bindings(el).get(key).and_then(Binding::evaluate)
    }

    /// Fire the listener bound under `key` on `el`.
    pub fn fire(&self, el: ElementId, key: &str, event: &Value) -> bool {
        self.bindings(el)
            .get(key)
            .is_some_and(|binding| binding.fire(event))
    }

    /// Resolve the magic property `name` from `el`.
    pub fn resolve_magic(&self, name: &str, el: ElementId) -> Option<Data> {
        let resolver = self
            .state
            .borrow()
            .magics
            .iter()
            .find(|(magic, _)| magic == name)
            .map(|(_, resolver)| Rc::clone(resolver))?;
        resolver(el)
    }

    /// Registered magic property names.
    pub fn magics(&self) -> Vec<String> {
        self.state
            .borrow()
            .magics
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Registered root selectors, evaluated.
    pub fn root_selectors(&self) -> Vec<String> {
        let selectors = self.state.borrow().selectors.clone();
        selectors.iter().map(|selector| selector()).collect()
    }

    /// Registered directives.
    pub fn directives(&self) -> Vec<DirectiveSpec> {
        self.state.borrow().directives.clone()
    }

    /// How many values were passed through [`Host::reactive`].
    pub fn reactive_calls(&self) -> usize {
        self.state.borrow().reactive_calls
    }

    fn ancestry(&self, el: ElementId) -> Vec<ElementId> {
        let state = self.state.borrow();
        let mut chain = vec![el];
        let mut current = el;
        while let Some(parent) = state.parents.get(&current) {
            chain.push(*parent);
            current = *parent;
        }
        chain.reverse();
        chain
    }
}

impl Host for TestHost {
    fn prefixed(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn magic(&self, name: &str, resolver: MagicResolver) {
        self.state
            .borrow_mut()
            .magics
            .push((name.to_string(), resolver));
    }

    fn add_root_selector(&self, selector: RootSelector) {
        self.state.borrow_mut().selectors.push(selector);
    }

    fn directive(&self, spec: DirectiveSpec) {
        tracing::trace!(directive = %spec.name, "directive registered");
        self.state.borrow_mut().directives.push(spec);
    }

    fn reactive(&self, data: Data) -> Data {
        self.state.borrow_mut().reactive_calls += 1;
        data
    }

    fn bind(&self, el: ElementId, bindings: Bindings) {
        self.state
            .borrow_mut()
            .bindings
            .entry(el)
            .or_default()
            .merge(bindings);
    }

    fn data(&self, el: ElementId) -> DataStack {
        let chain = self.ancestry(el);
        let state = self.state.borrow();
        let providers: Vec<Binding> = chain
            .iter()
            .filter_map(|el| state.bindings.get(el))
            .flat_map(|bindings| bindings.iter())
            .filter(|(_, binding)| matches!(binding, Binding::Data(_)))
            .map(|(_, binding)| binding.clone())
            .collect();
        drop(state);

        DataStack::from_frames(providers.iter().filter_map(Binding::provide).collect())
    }
}

/// Assert that `key` is bound on an element, optionally with a given value.
///
/// # Example
///
/// ```ignore
/// use part_dispatch::assert_bound;
///
/// assert_bound!(host, button, "x-on:click");
/// assert_bound!(host, button, "data-part", "button");
/// assert_bound!(host, panel, "x-show", json!(true));
/// ```
#[macro_export]
macro_rules! assert_bound {
    ($host:expr, $el:expr, $key:expr) => {{
        let bindings = $host.bindings($el);
        assert!(
            bindings.contains_key($key),
            "Expected `{}` to be bound on {:?}, but got: {:?}",
            $key,
            $el,
            bindings.keys().collect::<Vec<_>>()
        );
    }};
    ($host:expr, $el:expr, $key:expr, $value:expr) => {{
        let bindings = $host.bindings($el);
        match bindings.get($key) {
            Some(binding) => assert_eq!(
                binding.evaluate(),
                Some($crate::testing::Value::from($value)),
                "Unexpected value bound to `{}` on {:?}",
                $key,
                $el
            ),
            None => panic!(
                "Expected `{}` to be bound on {:?}, but got: {:?}",
                $key,
                $el,
                bindings.keys().collect::<Vec<_>>()
            ),
        }
    }};
}

/// Assert that `key` is NOT bound on an element.
///
/// # Example
///
/// ```ignore
/// use part_dispatch::assert_not_bound;
///
/// assert_not_bound!(host, el, "data-part");
/// ```
#[macro_export]
macro_rules! assert_not_bound {
    ($host:expr, $el:expr, $key:expr) => {{
        let bindings = $host.bindings($el);
        assert!(
            !bindings.contains_key($key),
            "Expected `{}` NOT to be bound on {:?}, but it was",
            $key,
            $el
        );
    }};
}
