//! Interface consumed from the host reactive framework
//!
//! The host owns the element tree, evaluates attribute expressions, applies
//! bindings, and tracks per-element reactive data. This crate only decides
//! when handlers run and which bindings they produce; everything here is the
//! surface a host must provide for that.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::bindings::Bindings;
use crate::directive::DirectiveSpec;
use crate::error::{Error, Result};
use crate::scope::ScopeFrame;

/// Attribute prefix used by [`Host::prefixed`] unless the host overrides it.
pub const DEFAULT_PREFIX: &str = "x-";

/// Opaque handle for an element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Type-erased reactive data bound to an element.
pub type Data = Rc<dyn Any>;

/// Resolver behind a magic property (`$tabs`, ...).
pub type MagicResolver = Rc<dyn Fn(ElementId) -> Option<Data>>;

/// Produces a CSS selector marking elements that start a new component tree.
pub type RootSelector = Rc<dyn Fn() -> String>;

/// Shared reactive handle for component APIs and scope objects.
pub struct Reactive<T>(Rc<RefCell<T>>);

impl<T: 'static> Reactive<T> {
    /// Wrap a value.
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Recover a handle from host data; `None` if the data holds another type.
    pub fn from_data(data: Data) -> Option<Self> {
        data.downcast::<RefCell<T>>().ok().map(Self)
    }

    /// Type-erased view of the same allocation.
    pub fn to_data(&self) -> Data {
        self.0.clone()
    }

    /// Immutably borrow the value.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the value.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Run `f` against a mutable borrow.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Whether two handles point to the same value.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reactive").field(&self.0.borrow()).finish()
    }
}

/// Reactive data visible from an element, outermost frame first.
///
/// Mirrors the host's merged data scope: lookups walk from the innermost
/// frame outwards.
#[derive(Clone, Default)]
pub struct DataStack {
    frames: Vec<Data>,
}

impl DataStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack from frames ordered outermost first.
    pub fn from_frames(frames: Vec<Data>) -> Self {
        Self { frames }
    }

    /// Push an inner frame.
    pub fn push(&mut self, data: Data) {
        self.frames.push(data);
    }

    /// Frames, outermost first.
    pub fn frames(&self) -> &[Data] {
        &self.frames
    }

    /// Whether no data is visible.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Innermost frame holding a `T`.
    pub fn closest<T: 'static>(&self) -> Option<Reactive<T>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| Reactive::from_data(Rc::clone(frame)))
    }

    /// Innermost scope exposed as `$name` holding an `S`.
    pub fn scope<S: 'static>(&self, name: &str) -> Option<Reactive<S>> {
        self.frames.iter().rev().find_map(|frame| {
            let exposure = frame.downcast_ref::<ScopeFrame>()?;
            if exposure.name() == name {
                exposure.get::<S>()
            } else {
                None
            }
        })
    }
}

impl fmt::Debug for DataStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStack")
            .field("frames", &self.frames.len())
            .finish()
    }
}

/// Host reactive framework.
///
/// Implementations use interior mutability; the dispatcher only ever holds a
/// shared (weak) reference.
pub trait Host {
    /// Apply the host's attribute prefix (`"tabs"` → `"x-tabs"`).
    fn prefixed(&self, name: &str) -> String {
        format!("{}{}", DEFAULT_PREFIX, name)
    }

    /// Register a magic property.
    fn magic(&self, name: &str, resolver: MagicResolver);

    /// Register a component root selector.
    fn add_root_selector(&self, selector: RootSelector);

    /// Register a directive.
    fn directive(&self, spec: DirectiveSpec);

    /// Make `data` reactive; must return the same allocation.
    fn reactive(&self, data: Data) -> Data;

    /// Apply bindings to an element.
    fn bind(&self, el: ElementId, bindings: Bindings);

    /// Reactive data visible from an element.
    fn data(&self, el: ElementId) -> DataStack;
}

/// Hand `value` to the host's reactive wrapper and recover the typed handle.
pub(crate) fn make_reactive<T: 'static>(
    host: &dyn Host,
    value: T,
    label: &str,
) -> Result<Reactive<T>> {
    Reactive::from_data(host.reactive(Reactive::new(value).to_data()))
        .ok_or_else(|| Error::ReactiveMismatch(label.to_string()))
}
