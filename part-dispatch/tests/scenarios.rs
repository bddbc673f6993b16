//! End-to-end component scenarios: tabs with plain parts, accordion with scopes

use part_dispatch::prelude::*;
use part_dispatch::testing::TestHost;
use part_dispatch::assert_bound;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

// Tabs

#[derive(PartKey, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum TabsPart {
    Button,
    Panel,
}

struct Tabs {
    active: String,
    history: Vec<String>,
}

impl Tabs {
    fn set_tab(&mut self, tab: &str) {
        self.active = tab.to_string();
        self.history.push(tab.to_string());
        if self.history.len() > 10 {
            self.history.remove(0);
        }
    }

    fn is_active(&self, tab: &str) -> bool {
        self.active == tab
    }
}

type Seen = Rc<RefCell<Vec<(TabsPart, Value, Api<Tabs>)>>>;

fn tabs(seen: &Seen) -> ComponentDefinition<Tabs> {
    let (buttons, panels) = (Rc::clone(seen), Rc::clone(seen));

    define_component(
        ComponentConfig::new("tabs", |props, _ctx| {
            Ok(Tabs {
                active: props["defaultTab"].as_str().unwrap_or("tab1").to_string(),
                history: Vec::new(),
            })
        })
        .closed::<TabsPart>()
        .part(TabsPart::Button.name(), move |api, _el, ctx| {
            buttons
                .borrow_mut()
                .push((TabsPart::Button, ctx.value.clone(), api.clone()));

            let tab = ctx.value.as_str().unwrap_or_default().to_string();
            let (click, class) = (api.clone(), api.clone());
            let selected = tab.clone();
            Ok(Some(
                Bindings::new()
                    .with(
                        "x-on:click",
                        Binding::listener(move |_| click.update(|t| t.set_tab(&tab))),
                    )
                    .with(
                        "x-bind:class",
                        Binding::computed(move || {
                            json!({ "active": class.borrow().is_active(&selected) })
                        }),
                    ),
            ))
        })
        .part(TabsPart::Panel.name(), move |api, _el, ctx| {
            panels
                .borrow_mut()
                .push((TabsPart::Panel, ctx.value.clone(), api.clone()));

            let api = api.clone();
            let tab = ctx.value.as_str().unwrap_or_default().to_string();
            Ok(Some(Bindings::new().with(
                "x-show",
                Binding::computed(move || json!(api.borrow().is_active(&tab))),
            )))
        }),
    )
    .unwrap()
}

#[test]
fn test_tabs_parts_share_root_api() {
    let seen = Seen::default();
    let host = TestHost::new();
    host.plugin(&tabs(&seen));

    let root = host.element();
    host.run_directive(root, "x-tabs", "").unwrap();
    let button = host.child(root);
    host.run_directive(button, "x-tabs:button", "'home'").unwrap();
    let panel = host.child(root);
    host.run_directive(panel, "x-tabs:panel", "'home'").unwrap();

    let api = host.data(root).closest::<Tabs>().unwrap();
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, TabsPart::Button);
    assert_eq!(seen[1].0, TabsPart::Panel);
    for (_, value, part_api) in seen.iter() {
        assert_eq!(*value, json!("home"));
        assert!(Reactive::ptr_eq(part_api, &api));
    }

    assert_bound!(host, button, "data-part", "button");
    assert_bound!(host, panel, "data-part", "panel");
}

#[test]
fn test_tabs_switching() {
    let host = TestHost::new();
    host.plugin(&tabs(&Seen::default()));

    let root = host.element();
    host.run_directive(root, "x-tabs", r#"{ "defaultTab": "home" }"#)
        .unwrap();

    let mut elements = Vec::new();
    for tab in ["home", "settings"] {
        let button = host.child(root);
        host.run_directive(button, "x-tabs:button", &format!("'{}'", tab))
            .unwrap();
        let panel = host.child(root);
        host.run_directive(panel, "x-tabs:panel", &format!("'{}'", tab))
            .unwrap();
        elements.push((button, panel));
    }
    let (home_button, home_panel) = elements[0];
    let (settings_button, settings_panel) = elements[1];

    assert_bound!(host, home_panel, "x-show", true);
    assert_bound!(host, settings_panel, "x-show", false);
    assert_bound!(host, home_button, "x-bind:class", json!({ "active": true }));

    assert!(host.fire(settings_button, "x-on:click", &Value::Null));

    assert_bound!(host, home_panel, "x-show", false);
    assert_bound!(host, settings_panel, "x-show", true);
    assert_bound!(host, settings_button, "x-bind:class", json!({ "active": true }));

    let api = host.data(root).closest::<Tabs>().unwrap();
    assert_eq!(api.borrow().history, ["settings"]);
}

#[test]
fn test_tabs_closed_part_set() {
    let err = define_component(
        ComponentConfig::new("tabs", |_, _| Ok(()))
            .closed::<TabsPart>()
            .part("button", |_, _, _| Ok(None)),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingPart { ref part, .. } if part == "panel"));
}

// Accordion

struct Accordion {
    open: Vec<String>,
}

impl Accordion {
    fn toggle(&mut self, id: &str) {
        match self.open.iter().position(|open| open == id) {
            Some(index) => {
                self.open.remove(index);
            }
            None => self.open.push(id.to_string()),
        }
    }

    fn is_open(&self, id: &str) -> bool {
        self.open.iter().any(|open| open == id)
    }
}

struct Item {
    id: String,
    header_id: String,
}

fn item_of(ctx: &PartContext, el: ElementId) -> Result<Reactive<Item>> {
    ctx.scope::<Item>(el, "item")
        .ok_or_else(|| Error::handler("accordion part outside an item"))
}

fn accordion(registry: Arc<IdRegistry>) -> ComponentDefinition<Accordion> {
    let item = define_scope(
        ScopeOptions::new("item", |_api: &Api<Accordion>, _el, ctx: &PartContext| {
            Ok(Item {
                id: ctx.value.as_str().unwrap_or_default().to_string(),
                header_id: ctx.id("header"),
            })
        })
        .bindings(|_api, item| {
            let id = item.borrow().id.clone();
            Ok(Some(Bindings::new().with("x-bind:data-item", id)))
        })
        .with_id_registry(Arc::clone(&registry)),
    );

    define_component(
        ComponentConfig::new("accordion", |_props, _ctx| Ok(Accordion { open: Vec::new() }))
            .with_id_registry(registry)
            .part_handler("item", item)
            .part("header", |api, el, ctx| {
                let item = item_of(ctx, el)?;
                let (id, header_id) = {
                    let item = item.borrow();
                    (item.id.clone(), item.header_id.clone())
                };
                let (click, class) = (api.clone(), api.clone());
                let open_id = id.clone();
                Ok(Some(
                    Bindings::new()
                        .with("x-bind:id", header_id)
                        .with(
                            "x-on:click",
                            Binding::listener(move |_| click.update(|a| a.toggle(&id))),
                        )
                        .with(
                            "x-bind:class",
                            Binding::computed(move || {
                                json!({ "accordion-header": true, "open": class.borrow().is_open(&open_id) })
                            }),
                        ),
                ))
            })
            .part("content", |api, el, ctx| {
                let id = item_of(ctx, el)?.borrow().id.clone();
                let api = api.clone();
                Ok(Some(
                    Bindings::new()
                        .with("x-show", Binding::computed(move || json!(api.borrow().is_open(&id))))
                        .with("x-transition", true),
                ))
            }),
    )
    .unwrap()
}

struct Rendered {
    root: ElementId,
    items: Vec<(ElementId, ElementId, ElementId)>,
}

fn render_accordion(host: &Rc<TestHost>, ids: &[&str]) -> Rendered {
    let root = host.element();
    host.run_directive(root, "x-accordion", "").unwrap();

    let items = ids
        .iter()
        .map(|id| {
            let item = host.child(root);
            host.run_directive(item, "x-accordion:item", &format!("'{}'", id))
                .unwrap();
            let header = host.child(item);
            host.run_directive(header, "x-accordion:header", "").unwrap();
            let content = host.child(item);
            host.run_directive(content, "x-accordion:content", "").unwrap();
            (item, header, content)
        })
        .collect();

    Rendered { root, items }
}

#[test]
fn test_accordion_items_toggle_independently() {
    let host = TestHost::new();
    host.plugin(&accordion(Arc::new(IdRegistry::new())));
    let rendered = render_accordion(&host, &["a", "b"]);
    let (_, header_a, content_a) = rendered.items[0];
    let (_, _, content_b) = rendered.items[1];

    assert_bound!(host, content_a, "x-show", false);
    assert_bound!(host, content_a, "x-transition", true);

    assert!(host.fire(header_a, "x-on:click", &Value::Null));
    assert_bound!(host, content_a, "x-show", true);
    assert_bound!(host, content_b, "x-show", false);
    assert_bound!(
        host,
        header_a,
        "x-bind:class",
        json!({ "accordion-header": true, "open": true })
    );

    let api = host.data(rendered.root).closest::<Accordion>().unwrap();
    assert_eq!(api.borrow().open, ["a"]);

    host.fire(header_a, "x-on:click", &Value::Null);
    assert_bound!(host, content_a, "x-show", false);
}

#[test]
fn test_accordion_scopes_are_distinct() {
    let host = TestHost::new();
    host.plugin(&accordion(Arc::new(IdRegistry::new())));
    let rendered = render_accordion(&host, &["a", "b"]);
    let (item_a, header_a, _) = rendered.items[0];
    let (item_b, header_b, _) = rendered.items[1];

    let a = host.data(header_a).scope::<Item>("item").unwrap();
    let b = host.data(header_b).scope::<Item>("item").unwrap();
    assert!(!Reactive::ptr_eq(&a, &b));
    assert_eq!(a.borrow().id, "a");
    assert_eq!(b.borrow().id, "b");

    // The scope is visible from the item element itself, and the component
    // Api stays reachable through it.
    assert!(host.data(item_a).scope::<Item>("item").is_some());
    assert!(host.data(item_b).closest::<Accordion>().is_some());

    assert_bound!(host, item_a, "data-part", "item");
    assert_bound!(host, item_a, "x-bind:data-item", "a");
}

#[test]
fn test_accordion_ids_chain_through_scopes() {
    let host = TestHost::new();
    host.plugin(&accordion(Arc::new(IdRegistry::new())));
    let rendered = render_accordion(&host, &["a", "b"]);
    let (_, header_a, _) = rendered.items[0];
    let (_, header_b, _) = rendered.items[1];

    assert_bound!(host, header_a, "x-bind:id", "accordion-1:item-1:header");
    assert_bound!(host, header_b, "x-bind:id", "accordion-1:item-2:header");
}

#[test]
fn test_accordion_part_outside_item() {
    let host = TestHost::new();
    host.plugin(&accordion(Arc::new(IdRegistry::new())));
    let rendered = render_accordion(&host, &[]);

    let stray = host.child(rendered.root);
    let err = host
        .run_directive(stray, "x-accordion:header", "")
        .unwrap_err();
    assert_eq!(err.to_string(), "accordion part outside an item");
}
