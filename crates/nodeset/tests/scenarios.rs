//! End-to-end scenarios over a parsed page

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use nodeset::{
    AnimatedProperty, Collection, Config, Content, Error, Event, Listener, Page, PlayState, Plugin,
    PluginInfo, ExtensionRegistry, Value, animate_over_time,
};
use serde_json::json;

const LIST: &str = "<ul><li>A</li><li id=\"x\">B</li><li>C</li></ul>";

fn page(html: &str) -> Page {
    Page::from_html(html, Config::default()).unwrap()
}

fn texts(page: &Page, c: &Collection) -> Vec<String> {
    let doc = page.document();
    c.iter().map(|node| doc.tree().text_content(node)).collect()
}

#[test]
fn test_siblings_of_x() {
    let page = page(LIST);
    let mut x = page.wrap("#x").unwrap();
    let original = x.first().unwrap();

    x.siblings();

    assert_eq!(x.len(), 2);
    assert_eq!(texts(&page, &x), vec!["A", "C"]);
    assert!(x.iter().all(|node| node != original));
}

#[test]
fn test_find_eq_html() {
    let page = page(LIST);
    let html = page.wrap("ul").unwrap().find("li").unwrap().eq(1).get_html();
    assert_eq!(html.as_deref(), Some("B"));
}

#[test]
fn test_tween_progress_sequence() {
    let progress = Rc::new(RefCell::new(Vec::new()));
    let completions = Rc::new(RefCell::new(Vec::new()));
    let now = Rc::new(Cell::new(0.0));

    let p = Rc::clone(&progress);
    let c = Rc::clone(&completions);
    let clock = Rc::clone(&now);
    let mut tween = animate_over_time(
        1000.0,
        move |value| p.borrow_mut().push(value),
        Some(Box::new(move || c.borrow_mut().push(clock.get()))),
    );

    for stamp in [0.0, 250.0, 500.0, 1000.0, 1200.0] {
        now.set(stamp);
        tween.frame(stamp);
    }

    assert_eq!(*progress.borrow(), vec![0.0, 0.25, 0.5, 1.0, 1.0]);
    assert_eq!(*completions.borrow(), vec![1000.0]);
}

#[test]
fn test_tween_through_page_frames() {
    let page = Page::new(Config::default());
    let node = page.create_element("div");
    let progress = Rc::new(RefCell::new(Vec::new()));
    let p = Rc::clone(&progress);

    let handle = page.animate(
        node,
        AnimatedProperty::Named("width".into()),
        animate_over_time(1000.0, move |value| p.borrow_mut().push(value), None),
    );
    assert_eq!(handle.state(), PlayState::Idle);

    for stamp in [0.0, 250.0, 500.0, 1000.0, 1200.0] {
        page.run_frame(stamp);
    }

    assert_eq!(*progress.borrow(), vec![0.0, 0.25, 0.5, 1.0]);
    assert_eq!(handle.state(), PlayState::Completed);
    assert_eq!(page.pending_frames(), 0);
}

#[test]
fn test_fade_out_ends_hidden() {
    let page = page("<div id=\"panel\">content</div>");
    let mut panel = page.wrap("#panel").unwrap();
    panel.fade_out(200.0, None);

    page.run_frame(0.0);
    page.run_frame(200.0);

    assert_eq!(panel.get_css("display").as_deref(), Some("none"));
    assert_eq!(panel.get_css("opacity").as_deref(), Some("0"));
}

#[test]
fn test_trigger_contract() {
    let page = page("<p id=\"a\">a</p><p id=\"b\">b</p>");
    let mut p = page.wrap("p").unwrap();
    let received = Rc::new(RefCell::new(Vec::new()));
    let r = Rc::clone(&received);
    p.on("ping", Some(&Listener::new(move |event: &mut Event| {
        r.borrow_mut().push((
            event.event_type().to_string(),
            event.current_target,
            event.detail["x"].clone(),
            event.bubbles() && event.cancelable(),
        ));
    })));

    assert!(matches!(p.trigger(json!(42), None, false), Err(Error::InvalidEvent(_))));
    assert!(received.borrow().is_empty());

    p.trigger("ping", Some(json!({ "x": 1 })), false).unwrap();

    let received = received.borrow();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0],
        ("ping".to_string(), page.get_element_by_id("a"), json!(1), true)
    );
}

#[test]
fn test_superseded_tween_stops() {
    let page = page("<div>x</div>");
    let node = page.wrap("div").unwrap().first().unwrap();
    let first_calls = Rc::new(Cell::new(0));
    let first_done = Rc::new(Cell::new(false));

    let calls = Rc::clone(&first_calls);
    let done = Rc::clone(&first_done);
    let first = page.animate(
        node,
        AnimatedProperty::Opacity,
        animate_over_time(
            100.0,
            move |_| calls.set(calls.get() + 1),
            Some(Box::new(move || done.set(true))),
        ),
    );
    page.run_frame(0.0);
    page.run_frame(50.0);

    let second = page.animate(node, AnimatedProperty::Opacity, animate_over_time(100.0, |_| {}, None));
    page.advance(500.0);

    assert_eq!(first.state(), PlayState::Cancelled);
    assert_eq!(second.state(), PlayState::Completed);
    assert_eq!(first_calls.get(), 2);
    assert!(!first_done.get());
}

#[test]
fn test_other_property_is_independent() {
    let page = Page::new(Config::default());
    let node = page.create_element("div");
    let a = page.animate(node, AnimatedProperty::Opacity, animate_over_time(10.0, |_| {}, None));
    let b = page.animate(node, AnimatedProperty::Named("height".into()), animate_over_time(10.0, |_| {}, None));
    page.advance(100.0);
    assert_eq!(a.state(), PlayState::Completed);
    assert_eq!(b.state(), PlayState::Completed);
}

#[test]
fn test_off_requires_same_listener() {
    let page = page("<button>go</button>");
    let mut button = page.wrap("button").unwrap();
    let hits = Rc::new(Cell::new(0));

    let h = Rc::clone(&hits);
    let original = Listener::new(move |_: &mut Event| h.set(h.get() + 1));
    let h = Rc::clone(&hits);
    let lookalike = Listener::new(move |_: &mut Event| h.set(h.get() + 1));

    button.on_click(&original);
    button.off("click", Some(&lookalike)).simulate_click();
    assert_eq!(hits.get(), 1);

    button.off("click", Some(&original)).simulate_click();
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_append_node_fans_out_clones() {
    let page = page("<div class=\"slot\"></div><div class=\"slot\"></div><aside><p id=\"src\">s</p></aside>");
    let src = page.get_element_by_id("src").unwrap();
    let parent = page.document().tree().parent(src);

    page.wrap(".slot").unwrap().append(Content::Node(src)).unwrap();

    assert_eq!(page.document().tree().parent(src), parent);
    let slots = page.wrap(".slot").unwrap();
    for slot in slots.iter() {
        let inner = page.wrap(slot).unwrap().get_html();
        assert_eq!(inner.as_deref(), Some("<p id=\"src\">s</p>"));
    }
    assert_eq!(page.wrap("aside > p").unwrap().first(), Some(src));
}

#[test]
fn test_registry_resolution() {
    let page = page(LIST);
    let mut items = page.wrap("li").unwrap();

    let err = items.call("carousel", &[]).unwrap_err();
    assert!(matches!(err, Error::UnknownMethod(ref name) if name == "carousel"));

    assert!(page.register_method("label", |_, _| Ok(Value::from("first"))).is_none());
    assert!(page.register_method("label", |_, _| Ok(Value::from("second"))).is_some());
    assert_eq!(items.call("label", &[]).unwrap(), json!("second"));
}

#[test]
fn test_extension_operates_on_collection() {
    let page = page(LIST);
    page.register_method("highlight", |c, args| {
        let class = args.first().and_then(Value::as_str).unwrap_or("active");
        c.add_class(class);
        Ok(Value::from(c.len()))
    });

    let mut x = page.wrap("#x").unwrap();
    assert_eq!(x.call("highlight", &[json!("on")]).unwrap(), json!(1));
    assert!(page.wrap("li.on").unwrap().first() == page.get_element_by_id("x"));
}

#[test]
fn test_extension_may_register_and_call_methods() {
    let page = page(LIST);
    page.register_method("bootstrap", |c, _| {
        c.page().register_method("count", |c, _| Ok(Value::from(c.len())));
        c.call("count", &[])
    });

    let mut items = page.wrap("li").unwrap();
    assert_eq!(items.call("bootstrap", &[]).unwrap(), json!(3));
    assert!(page.has_method("count"));
}

#[test]
fn test_plugin_install() {
    struct Accordion;

    impl Plugin for Accordion {
        fn info(&self) -> PluginInfo {
            PluginInfo { name: "accordion", version: "0.1.0" }
        }

        fn register(&self, registry: &mut ExtensionRegistry) {
            registry.register_fn("accordion", |c, _| {
                c.find("li")?.hide();
                Ok(Value::Null)
            });
        }
    }

    let page = page(LIST);
    page.install(&Accordion);
    page.wrap("ul").unwrap().call("accordion", &[]).unwrap();
    assert_eq!(page.wrap("#x").unwrap().computed_display().as_deref(), Some("none"));
}

#[test]
fn test_markup_detached_until_appended() {
    let page = page("<ul id=\"list\"></ul>");
    let mut fresh = page.wrap("<li class=\"new\">x</li>").unwrap();
    let node = fresh.first().unwrap();

    assert!(!page.document().tree().is_connected(node));
    assert!(page.wrap("li.new").unwrap().is_empty());

    let mut list = page.wrap("#list").unwrap();
    list.append(Content::Node(node)).unwrap();
    assert!(!page.document().tree().is_connected(node));

    fresh.add_class("moved");
    let list_node = list.first().unwrap();
    page.document_mut().tree_mut().append_child(list_node, node).unwrap();
    assert!(page.document().tree().is_connected(node));
    assert_eq!(page.wrap("li.new").unwrap().len(), 2);
    assert_eq!(page.wrap("li.moved").unwrap().len(), 1);
}

#[test]
fn test_stale_members_tolerated() {
    let page = page(LIST);
    let mut items = page.wrap("li").unwrap();
    page.wrap("ul").unwrap().remove();

    items.add_class("gone").set_css("color", "red").fade_out(10.0, None);
    page.advance(50.0);
    assert_eq!(items.len(), 3);
    assert!(items.has_class("gone"));
    assert!(page.wrap("li").unwrap().is_empty());
}
