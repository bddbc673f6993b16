//! Process-wide identity counters and chained id generators
//!
//! [`IdRegistry`] hands out `"<prefix>-<n>"` ids with one monotonically
//! increasing counter per prefix. Counters are never reset; the process-wide
//! registry is shared by every host so ids never collide across documents.
//!
//! [`IdGenerator`] is the `generateId` value handed to setup functions and part
//! handlers. It draws its namespace once, at construction, and reuses it for
//! every label, so asking the same generator for the same label twice yields
//! the same id.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

/// Prefix used by [`unique_id`].
pub const DEFAULT_ID_PREFIX: &str = "id";

static GLOBAL_REGISTRY: LazyLock<Arc<IdRegistry>> = LazyLock::new(|| Arc::new(IdRegistry::new()));

/// Per-prefix monotonically increasing id counters.
///
/// # Example
///
/// ```
/// use part_dispatch_core::IdRegistry;
///
/// let registry = IdRegistry::new();
/// assert_eq!(registry.next_id("tabs"), "tabs-1");
/// assert_eq!(registry.next_id("tabs"), "tabs-2");
/// assert_eq!(registry.next_id("item"), "item-1");
/// ```
#[derive(Debug, Default)]
pub struct IdRegistry {
    counters: Mutex<HashMap<String, u64>>,
}

impl IdRegistry {
    /// Create an isolated registry with no issued ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<IdRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Issue the next id for `prefix`.
    pub fn next_id(&self, prefix: &str) -> String {
        // The lock is released before formatting; nested generators may call back in.
        let n = {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            let counter = counters.entry(prefix.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };
        format!("{}-{}", prefix, n)
    }

    /// Last counter value issued for `prefix` (0 if none).
    pub fn issued(&self, prefix: &str) -> u64 {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(prefix)
            .copied()
            .unwrap_or(0)
    }
}

/// Issue the next process-wide id for `prefix`.
pub fn generate_id(prefix: &str) -> String {
    GLOBAL_REGISTRY.next_id(prefix)
}

/// Issue the next process-wide id under [`DEFAULT_ID_PREFIX`].
pub fn unique_id() -> String {
    generate_id(DEFAULT_ID_PREFIX)
}

/// Chained `generateId` function bound to one component instance or scope.
#[derive(Clone)]
pub struct IdGenerator {
    generate: Rc<dyn Fn(&str) -> String>,
}

impl IdGenerator {
    /// Generator for a component instance: `label` becomes `"<instance_id>:<label>"`.
    pub fn instance(instance_id: impl Into<String>) -> Self {
        let instance_id: String = instance_id.into();
        Self::from_fn(move |label| format!("{}:{}", instance_id, label))
    }

    /// Wrap an arbitrary generator function.
    pub fn from_fn(generate: impl Fn(&str) -> String + 'static) -> Self {
        Self {
            generate: Rc::new(generate),
        }
    }

    /// Derive a nested generator.
    ///
    /// Draws one id for `namespace` from `registry` now; every later label is
    /// forwarded to this generator as `"<namespace-id>:<label>"`.
    pub fn child(&self, registry: &IdRegistry, namespace: &str) -> Self {
        let prefix = registry.next_id(namespace);
        let parent = self.clone();
        Self::from_fn(move |label| parent.generate(&format!("{}:{}", prefix, label)))
    }

    /// Produce the id for `label`.
    pub fn generate(&self, label: &str) -> String {
        (self.generate)(label)
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
