//! Attribute binding maps returned by part handlers and applied by the host

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::host::Data;

/// A single attribute binding.
#[derive(Clone)]
pub enum Binding {
    /// Static attribute value (`data-part`, `x-transition`, ...).
    Value(Value),
    /// Reactive getter re-evaluated by the host (`x-show`, `x-bind:class`, ...).
    Computed(Rc<dyn Fn() -> Value>),
    /// Event listener (`x-on:click`, ...).
    Listener(Rc<dyn Fn(&Value)>),
    /// Data provider (`x-data`).
    Data(Rc<dyn Fn() -> Data>),
}

impl Binding {
    /// Static binding.
    pub fn value(value: impl Into<Value>) -> Self {
        Binding::Value(value.into())
    }

    /// Reactive getter binding.
    pub fn computed(getter: impl Fn() -> Value + 'static) -> Self {
        Binding::Computed(Rc::new(getter))
    }

    /// Event listener binding.
    pub fn listener(handler: impl Fn(&Value) + 'static) -> Self {
        Binding::Listener(Rc::new(handler))
    }

    /// Data provider binding.
    pub fn data(provider: impl Fn() -> Data + 'static) -> Self {
        Binding::Data(Rc::new(provider))
    }

    /// Current value of a static or computed binding.
    pub fn evaluate(&self) -> Option<Value> {
        match self {
            Binding::Value(value) => Some(value.clone()),
            Binding::Computed(getter) => Some(getter()),
            Binding::Listener(_) | Binding::Data(_) => None,
        }
    }

    /// Invoke a listener binding; returns `false` for other kinds.
    pub fn fire(&self, event: &Value) -> bool {
        match self {
            Binding::Listener(handler) => {
                handler(event);
                true
            }
            _ => false,
        }
    }

    /// Run a data provider binding.
    pub fn provide(&self) -> Option<Data> {
        match self {
            Binding::Data(provider) => Some(provider()),
            _ => None,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Binding::Computed(_) => f.write_str("Computed(..)"),
            Binding::Listener(_) => f.write_str("Listener(..)"),
            Binding::Data(_) => f.write_str("Data(..)"),
        }
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Value(value)
    }
}

impl From<&str> for Binding {
    fn from(value: &str) -> Self {
        Binding::Value(Value::from(value))
    }
}

impl From<String> for Binding {
    fn from(value: String) -> Self {
        Binding::Value(Value::from(value))
    }
}

impl From<bool> for Binding {
    fn from(value: bool) -> Self {
        Binding::Value(Value::from(value))
    }
}

/// Insertion-ordered attribute → binding map.
///
/// Inserting a key that already exists replaces its binding in place, so a
/// later map merged over an earlier one wins without reordering.
///
/// # Example
///
/// ```
/// use part_dispatch_core::{Binding, Bindings};
///
/// let mut bindings = Bindings::new()
///     .with("data-part", "item")
///     .with("x-bind:class", "active");
/// bindings.merge(Bindings::new().with("data-part", "override"));
///
/// assert_eq!(bindings.keys().collect::<Vec<_>>(), ["data-part", "x-bind:class"]);
/// assert_eq!(
///     bindings.get("data-part").and_then(Binding::evaluate),
///     Some("override".into())
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    entries: Vec<(String, Binding)>,
}

impl Bindings {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, binding: impl Into<Binding>) -> Self {
        self.insert(key, binding);
        self
    }

    /// Insert a binding, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, binding: impl Into<Binding>) -> Option<Binding> {
        let key = key.into();
        let binding = binding.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, binding)),
            None => {
                self.entries.push((key, binding));
                None
            }
        }
    }

    /// Merge `other` over `self`; keys in `other` win.
    pub fn merge(&mut self, other: Bindings) {
        for (key, binding) in other.entries {
            self.insert(key, binding);
        }
    }

    /// Look up a binding by attribute name.
    pub fn get(&self, key: &str) -> Option<&Binding> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, b)| b)
    }

    /// Whether `key` is bound.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a binding.
    pub fn remove(&mut self, key: &str) -> Option<Binding> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(k, b)| (k.as_str(), b))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Bindings {
    type Item = (String, Binding);
    type IntoIter = std::vec::IntoIter<(String, Binding)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Binding)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, Binding)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        bindings.extend(iter);
        bindings
    }
}

impl<K: Into<String>> Extend<(K, Binding)> for Bindings {
    fn extend<I: IntoIterator<Item = (K, Binding)>>(&mut self, iter: I) {
        for (key, binding) in iter {
            self.insert(key, binding);
        }
    }
}
