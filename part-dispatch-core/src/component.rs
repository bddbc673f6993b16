//! Component definition and the directive dispatcher
//!
//! [`define_component`] validates a [`ComponentConfig`] and returns a
//! [`ComponentDefinition`]. Registering the definition with a host installs:
//!
//! - a magic property named after the camelCase component name, resolving to
//!   the closest Api mounted by the same registration;
//! - a root selector matching `[x-<name>]`;
//! - the component directive, ordered before the host's `bind` directive.
//!
//! Every registration gets its own dispatcher. The dispatcher tells root
//! and part occurrences apart by the directive value: the bare form
//! (`x-tabs`) mounts an instance, the suffixed form (`x-tabs:button`) runs the
//! handler registered under the camelCase part name.

use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::bindings::{Binding, Bindings};
use crate::config::DispatchConfig;
use crate::directive::{Cleanup, Continuation, Directive, DirectiveSpec, DirectiveUtilities};
use crate::error::{Error, Result};
use crate::host::{make_reactive, Data, DataStack, ElementId, Host};
use crate::identity::{IdGenerator, IdRegistry};
use crate::normalize::normalize;
use crate::part::{Api, PartContext, PartHandler, PartKey, PartResult, SetupContext};

type SetupFn<A> = Rc<dyn Fn(&Value, &SetupContext) -> Result<A>>;

/// Something that installs itself into a host.
pub trait Plugin {
    /// Register with `host`.
    fn install(&self, host: Rc<dyn Host>);
}

/// Declaration of a component: name, setup function, and part handlers.
///
/// # Example
///
/// ```
/// use part_dispatch_core::{define_component, Binding, Bindings, ComponentConfig};
///
/// struct Tabs {
///     active: String,
/// }
///
/// let tabs = define_component(
///     ComponentConfig::new("tabs", |props, _ctx| {
///         let active = props["defaultTab"].as_str().unwrap_or("tab1").to_string();
///         Ok(Tabs { active })
///     })
///     .part("panel", |api, _el, ctx| {
///         let api = api.clone();
///         let tab = ctx.value.clone();
///         Ok(Some(Bindings::new().with(
///             "x-show",
///             Binding::computed(move || (api.borrow().active == tab).into()),
///         )))
///     }),
/// )
/// .unwrap();
///
/// assert_eq!(tabs.magic_name(), "tabs");
/// assert!(tabs.has_part("panel"));
/// ```
pub struct ComponentConfig<A> {
    name: String,
    setup: SetupFn<A>,
    parts: Vec<(String, PartHandler<A>)>,
    closed: Option<Vec<&'static str>>,
    config: DispatchConfig,
    registry: Arc<IdRegistry>,
}

impl<A: 'static> ComponentConfig<A> {
    /// Component named `name` whose Api is built by `setup` from the root props.
    pub fn new(
        name: impl Into<String>,
        setup: impl Fn(&Value, &SetupContext) -> Result<A> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            setup: Rc::new(setup),
            parts: Vec::new(),
            closed: None,
            config: DispatchConfig::default(),
            registry: IdRegistry::global(),
        }
    }

    /// Declare a part handler; `key` is normalized when the component is defined.
    pub fn part(
        self,
        key: impl Into<String>,
        handler: impl Fn(&Api<A>, ElementId, &PartContext) -> PartResult + 'static,
    ) -> Self {
        self.part_handler(key, PartHandler::new(handler))
    }

    /// Declare a prebuilt handler, such as one returned by `define_scope`.
    pub fn part_handler(mut self, key: impl Into<String>, handler: PartHandler<A>) -> Self {
        self.parts.push((key.into(), handler));
        self
    }

    /// Require the declared parts to be exactly the members of `K`.
    ///
    /// The root part stays optional and may be declared alongside.
    pub fn closed<K: PartKey>(mut self) -> Self {
        self.closed = Some(K::all().iter().map(PartKey::name).collect());
        self
    }

    /// Override the emitted attribute and directive names.
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Draw instance ids from `registry` instead of the process-wide one.
    pub fn with_id_registry(mut self, registry: Arc<IdRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

impl<A> fmt::Debug for ComponentConfig<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentConfig")
            .field("name", &self.name)
            .field("parts", &self.parts.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::InvalidName(name.to_string()));
    }

    Ok(name.to_string())
}

/// Validate `config` and produce a registrable definition.
///
/// Rejects empty or malformed names, part keys that normalize to nothing,
/// duplicate part keys, and, for closed part sets, parts outside the set or
/// members of the set without a handler.
pub fn define_component<A: 'static>(
    config: ComponentConfig<A>,
) -> Result<ComponentDefinition<A>> {
    let ComponentConfig {
        name,
        setup,
        parts: declared,
        closed,
        config,
        registry,
    } = config;

    let name = validate_name(&name)?;
    let root_key = normalize(&config.root_part);

    let mut parts = HashMap::with_capacity(declared.len());
    for (raw, handler) in declared {
        let key = normalize(&raw);
        if key.is_empty() {
            return Err(Error::EmptyPartKey { component: name });
        }
        if parts.contains_key(&key) {
            return Err(Error::DuplicatePart {
                component: name,
                part: key,
            });
        }
        parts.insert(key, handler);
    }

    if let Some(members) = closed {
        let members: Vec<String> = members.into_iter().map(normalize).collect();

        if let Some(extra) = parts
            .keys()
            .find(|key| **key != root_key && !members.contains(*key))
        {
            return Err(Error::UndeclaredPart {
                component: name,
                part: extra.clone(),
            });
        }
        if let Some(missing) = members.into_iter().find(|m| !parts.contains_key(m)) {
            return Err(Error::MissingPart {
                component: name,
                part: missing,
            });
        }
    }

    let magic_name = normalize(&name);
    tracing::debug!(component = %name, parts = parts.len(), "component defined");

    Ok(ComponentDefinition {
        inner: Rc::new(Definition {
            name,
            magic_name,
            root_key,
            setup,
            parts,
            config: Rc::new(config),
            registry,
        }),
    })
}

struct Definition<A> {
    name: String,
    magic_name: String,
    root_key: String,
    setup: SetupFn<A>,
    parts: HashMap<String, PartHandler<A>>,
    config: Rc<DispatchConfig>,
    registry: Arc<IdRegistry>,
}

/// A validated component, ready to register with any number of hosts.
pub struct ComponentDefinition<A> {
    inner: Rc<Definition<A>>,
}

impl<A: 'static> ComponentDefinition<A> {
    /// Component name as used for the directive.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// camelCase name of the magic property.
    pub fn magic_name(&self) -> &str {
        &self.inner.magic_name
    }

    /// Whether a handler is declared for the part `name` (normalized first).
    pub fn has_part(&self, name: &str) -> bool {
        self.inner.parts.contains_key(&normalize(name))
    }

    /// Register the magic property, root selector, and directive with `host`.
    ///
    /// Each call creates an independent dispatcher with its own instance table.
    pub fn register(&self, host: Rc<dyn Host>) {
        let def = &self.inner;
        let dispatcher = Rc::new(Dispatcher {
            def: Rc::clone(def),
            host: Rc::downgrade(&host),
            instances: RefCell::new(InstanceTable::default()),
        });

        let resolver = Rc::downgrade(&dispatcher);
        host.magic(
            &def.magic_name,
            Rc::new(move |el: ElementId| -> Option<Data> {
                let dispatcher = resolver.upgrade()?;
                let host = dispatcher.host.upgrade()?;
                let (api, _) = dispatcher.owner(&host.data(el))?;
                Some(api.to_data())
            }),
        );

        let selector = format!("[{}]", host.prefixed(&def.name));
        host.add_root_selector(Rc::new(move || selector.clone()));

        host.directive(
            DirectiveSpec::new(def.name.clone(), move |el, directive, utilities| {
                dispatcher.handle(el, directive, utilities)
            })
            .before(def.config.run_before.clone()),
        );

        tracing::debug!(
            component = %def.name,
            magic = %def.magic_name,
            before = %def.config.run_before,
            "component registered"
        );
    }
}

impl<A: 'static> Plugin for ComponentDefinition<A> {
    fn install(&self, host: Rc<dyn Host>) {
        self.register(host);
    }
}

impl<A> Clone for ComponentDefinition<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for ComponentDefinition<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<_> = self.inner.parts.keys().collect();
        parts.sort();
        f.debug_struct("ComponentDefinition")
            .field("name", &self.inner.name)
            .field("parts", &parts)
            .finish()
    }
}

struct Instance<A> {
    api: Api<A>,
    generate_id: IdGenerator,
}

/// Mounted instances of one registration, keyed by root element.
struct InstanceTable<A> {
    entries: HashMap<ElementId, Instance<A>>,
}

impl<A> Default for InstanceTable<A> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<A: 'static> InstanceTable<A> {
    fn contains(&self, root: ElementId) -> bool {
        self.entries.contains_key(&root)
    }

    fn insert(&mut self, root: ElementId, api: Api<A>, generate_id: IdGenerator) {
        self.entries.insert(root, Instance { api, generate_id });
    }

    fn remove(&mut self, root: ElementId) -> bool {
        self.entries.remove(&root).is_some()
    }

    /// Innermost Api in `stack` mounted through this table, with its generator.
    ///
    /// Frames of the same type put there by other registrations are skipped.
    fn owner(&self, stack: &DataStack) -> Option<(Api<A>, IdGenerator)> {
        stack.frames().iter().rev().find_map(|frame| {
            let api = Api::<A>::from_data(Rc::clone(frame))?;
            self.entries
                .values()
                .find(|instance| Api::ptr_eq(&instance.api, &api))
                .map(|instance| (api, instance.generate_id.clone()))
        })
    }
}

/// Routes directive occurrences of one registered component.
struct Dispatcher<A> {
    def: Rc<Definition<A>>,
    host: Weak<dyn Host>,
    instances: RefCell<InstanceTable<A>>,
}

/// `null`, `false`, `0`, and `""` mount with empty props.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Run `continuation` with the evaluated expression, or with `null` right away
/// when the expression is blank.
fn evaluate(
    utilities: &DirectiveUtilities,
    expression: &str,
    continuation: Continuation,
) -> Result<()> {
    if expression.trim().is_empty() {
        continuation(Value::Null)
    } else {
        utilities.evaluate_later(expression)(continuation)
    }
}

impl<A: 'static> Dispatcher<A> {
    fn handle(
        self: &Rc<Self>,
        el: ElementId,
        directive: &Directive,
        utilities: &DirectiveUtilities,
    ) -> Result<()> {
        if directive.value.is_empty() {
            self.mount_root(el, directive, utilities)
        } else {
            self.dispatch_part(el, directive, utilities)
        }
    }

    fn host(&self) -> Result<Rc<dyn Host>> {
        self.host.upgrade().ok_or(Error::HostDropped)
    }

    fn owner(&self, stack: &DataStack) -> Option<(Api<A>, IdGenerator)> {
        self.instances.borrow().owner(stack)
    }

    fn mount_root(
        self: &Rc<Self>,
        el: ElementId,
        directive: &Directive,
        utilities: &DirectiveUtilities,
    ) -> Result<()> {
        let this = Rc::clone(self);
        let modifiers = directive.modifiers.clone();
        let cleanup = utilities.cleanup().clone();

        evaluate(
            utilities,
            &directive.expression,
            Box::new(move |value| this.construct(el, value, modifiers, cleanup)),
        )
    }

    fn construct(
        self: &Rc<Self>,
        el: ElementId,
        value: Value,
        modifiers: Vec<String>,
        cleanup: Cleanup,
    ) -> Result<()> {
        let def = &self.def;
        if self.instances.borrow().contains(el) {
            tracing::trace!(component = %def.name, element = el.0, "root already mounted");
            return Ok(());
        }

        let host = self.host()?;
        let props = if is_falsy(&value) {
            Value::Object(Map::new())
        } else {
            value
        };

        let instance_id = def.registry.next_id(&def.name);
        let generate_id = IdGenerator::instance(instance_id.clone());
        let setup_ctx = SetupContext {
            host: Rc::clone(&host),
            generate_id: generate_id.clone(),
        };
        let api = make_reactive(&*host, (def.setup)(&props, &setup_ctx)?, &def.name)?;

        self.instances
            .borrow_mut()
            .insert(el, api.clone(), generate_id.clone());
        let table = Rc::downgrade(self);
        cleanup.register(move || {
            if let Some(dispatcher) = table.upgrade() {
                if dispatcher.instances.borrow_mut().remove(el) {
                    tracing::debug!(component = %dispatcher.def.name, element = el.0, "instance removed");
                }
            }
        });

        tracing::debug!(component = %def.name, instance = %instance_id, element = el.0, "instance mounted");

        let scope_name = def.name.clone();
        let data = api.to_data();
        host.bind(
            el,
            Bindings::new()
                .with(
                    host.prefixed(&def.config.id_directive),
                    Binding::computed(move || json!([scope_name])),
                )
                .with(
                    host.prefixed(&def.config.data_directive),
                    Binding::data(move || Data::clone(&data)),
                ),
        );

        if let Some(handler) = def.parts.get(&def.root_key) {
            let ctx = PartContext {
                value: Value::Null,
                modifiers,
                host: Rc::clone(&host),
                cleanup,
                generate_id,
                config: Rc::clone(&def.config),
            };
            if let Some(bindings) = handler.call(&api, el, &ctx)? {
                host.bind(el, bindings);
            }
        }

        Ok(())
    }

    fn dispatch_part(
        self: &Rc<Self>,
        el: ElementId,
        directive: &Directive,
        utilities: &DirectiveUtilities,
    ) -> Result<()> {
        let key = normalize(&directive.value);
        let Some(handler) = self.def.parts.get(&key).cloned() else {
            tracing::trace!(component = %self.def.name, part = %directive.value, "no handler for part");
            return Ok(());
        };

        let this = Rc::clone(self);
        let part = directive.value.clone();
        let modifiers = directive.modifiers.clone();
        let cleanup = utilities.cleanup().clone();

        evaluate(
            utilities,
            &directive.expression,
            Box::new(move |value| -> Result<()> {
                let ctx = this.part_context(el, &part, value, modifiers, cleanup)?;
                this.run_part(el, part, &handler, ctx)
            }),
        )
    }

    fn part_context(
        &self,
        el: ElementId,
        part: &str,
        value: Value,
        modifiers: Vec<String>,
        cleanup: Cleanup,
    ) -> Result<(Api<A>, PartContext)> {
        let host = self.host()?;
        let missing = || {
            tracing::warn!(
                component = %self.def.name,
                part = %part,
                element = el.0,
                "part evaluated before its root"
            );
            Error::MissingApi {
                component: self.def.name.clone(),
                part: part.to_string(),
            }
        };

        let (api, generate_id) = self.owner(&host.data(el)).ok_or_else(missing)?;

        let ctx = PartContext {
            value,
            modifiers,
            host,
            cleanup,
            generate_id,
            config: Rc::clone(&self.def.config),
        };
        Ok((api, ctx))
    }

    fn run_part(
        &self,
        el: ElementId,
        part: String,
        handler: &PartHandler<A>,
        (api, ctx): (Api<A>, PartContext),
    ) -> Result<()> {
        tracing::debug!(component = %self.def.name, part = %part, element = el.0, "dispatching part");

        let mut bindings = Bindings::new().with(self.def.config.part_attribute.clone(), part);
        if let Some(extra) = handler.call(&api, el, &ctx)? {
            bindings.merge(extra);
        }
        ctx.host.bind(el, bindings);
        Ok(())
    }
}
