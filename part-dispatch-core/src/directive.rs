//! Directive registration and invocation types

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::host::ElementId;

/// One directive occurrence on an element.
///
/// For the attribute `x-tabs:button.once="'home'"` the host registers a
/// directive named `tabs` and invokes it with `value = "button"`,
/// `modifiers = ["once"]`, and `expression = "'home'"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    /// Text after `:` in the attribute name; empty for the bare form.
    pub value: String,
    /// Attribute value; evaluated by the host.
    pub expression: String,
    /// Dot-separated modifiers, in order.
    pub modifiers: Vec<String>,
}

impl Directive {
    /// Bare directive with an expression.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Self::default()
        }
    }

    /// Set the directive value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
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

    /// Parse an attribute like `x-tabs:button.once` into its directive name and occurrence.
    ///
    /// Returns `None` if the attribute doesn't carry `prefix` or names no directive.
    ///
    /// ```
    /// use part_dispatch_core::Directive;
    ///
    /// let (name, directive) = Directive::parse("x-", "x-tabs:button.once", "'home'").unwrap();
    /// assert_eq!(name, "tabs");
    /// assert_eq!(directive.value, "button");
    /// assert_eq!(directive.modifiers, ["once"]);
    /// assert_eq!(directive.expression, "'home'");
    /// ```
    pub fn parse(prefix: &str, attribute: &str, expression: &str) -> Option<(String, Directive)> {
        let rest = attribute.trim().strip_prefix(prefix)?;

        let mut segments = rest.split('.');
        let head = segments.next()?;
        let modifiers: Vec<String> = segments
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        let (name, value) = match head.split_once(':') {
            Some((name, value)) => (name, value),
            None => (head, ""),
        };

        if name.is_empty() {
            return None;
        }

        Some((
            name.to_string(),
            Directive::new(expression)
                .with_value(value)
                .with_modifiers(modifiers),
        ))
    }
}

/// Callback run with the evaluated expression.
pub type Continuation = Box<dyn FnOnce(Value) -> Result<()>>;

/// One-shot deferred evaluation of an expression.
///
/// The host may run the continuation immediately or later. Errors from a
/// continuation the host runs later are reported by the host.
pub type Evaluator = Box<dyn FnOnce(Continuation) -> Result<()>>;

/// Directive handler registered with the host.
pub type DirectiveHandler = Rc<dyn Fn(ElementId, &Directive, &DirectiveUtilities) -> Result<()>>;

/// Teardown registration for the element currently being processed.
#[derive(Clone)]
pub struct Cleanup(Rc<dyn Fn(Box<dyn FnOnce()>)>);

impl Cleanup {
    /// Wrap the host's cleanup registration.
    pub fn new(register: impl Fn(Box<dyn FnOnce()>) + 'static) -> Self {
        Self(Rc::new(register))
    }

    /// Cleanup that drops every callback.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Run `callback` when the host tears the element down.
    pub fn register(&self, callback: impl FnOnce() + 'static) {
        (self.0)(Box::new(callback))
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cleanup(..)")
    }
}

/// Utilities the host passes with every directive invocation.
#[derive(Clone)]
pub struct DirectiveUtilities {
    evaluate_later: Rc<dyn Fn(&str) -> Evaluator>,
    cleanup: Cleanup,
}

impl DirectiveUtilities {
    /// Bundle the host's evaluator factory and cleanup registration.
    pub fn new(evaluate_later: impl Fn(&str) -> Evaluator + 'static, cleanup: Cleanup) -> Self {
        Self {
            evaluate_later: Rc::new(evaluate_later),
            cleanup,
        }
    }

    /// Prepare a deferred evaluation of `expression`.
    pub fn evaluate_later(&self, expression: &str) -> Evaluator {
        (self.evaluate_later)(expression)
    }

    /// Cleanup registration for the element.
    pub fn cleanup(&self) -> &Cleanup {
        &self.cleanup
    }
}

impl fmt::Debug for DirectiveUtilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveUtilities").finish_non_exhaustive()
    }
}

/// Directive registration: name, handler, and ordering.
#[derive(Clone)]
pub struct DirectiveSpec {
    /// Directive name without prefix.
    pub name: String,
    /// Handler invoked for every occurrence.
    pub handler: DirectiveHandler,
    /// Directive this one must run before.
    pub before: Option<String>,
}

impl DirectiveSpec {
    /// Create a registration with no ordering constraint.
    pub fn new(
        name: impl Into<String>,
        handler: impl Fn(ElementId, &Directive, &DirectiveUtilities) -> Result<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            handler: Rc::new(handler),
            before: None,
        }
    }

    /// Run before another directive.
    pub fn before(mut self, other: impl Into<String>) -> Self {
        self.before = Some(other.into());
        self
    }
}

impl fmt::Debug for DirectiveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveSpec")
            .field("name", &self.name)
            .field("before", &self.before)
            .finish_non_exhaustive()
    }
}
