//! Event binding and synthetic dispatch

use nodeset_dom::{Event, Listener, NodeId};
use serde_json::Value;

use crate::{Collection, Error, Result};

/// What `trigger` accepts as the event
#[derive(Debug, Clone)]
pub enum EventSpec {
    /// Build a custom event with this name
    Name(String),
    /// Dispatch this event object
    Event(Event),
    /// Anything else; rejected by `trigger`
    Invalid(String),
}

impl From<&str> for EventSpec {
    fn from(name: &str) -> Self {
        EventSpec::Name(name.to_string())
    }
}

impl From<String> for EventSpec {
    fn from(name: String) -> Self {
        EventSpec::Name(name)
    }
}

impl From<Event> for EventSpec {
    fn from(event: Event) -> Self {
        EventSpec::Event(event)
    }
}

impl From<Value> for EventSpec {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => EventSpec::Name(name),
            other => EventSpec::Invalid(describe(&other)),
        }
    }
}

fn describe(value: &Value) -> String {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("{kind} ({value})")
}

impl Collection {
    /// Attach `listener` for `event_type` on every member. Does nothing if
    /// the name is empty or no listener is given.
    pub fn on(&mut self, event_type: &str, listener: Option<&Listener>) -> &mut Self {
        let Some(listener) = listener.filter(|_| !event_type.is_empty()) else {
            return self;
        };
        for node in self.members() {
            self.page().add_listener(node, event_type, listener);
        }
        self
    }

    /// Detach `listener` from every member. Only the same `Listener` (or a
    /// clone of it) is removed.
    pub fn off(&mut self, event_type: &str, listener: Option<&Listener>) -> &mut Self {
        let Some(listener) = listener.filter(|_| !event_type.is_empty()) else {
            return self;
        };
        for node in self.members() {
            self.page().remove_listener(node, event_type, listener);
        }
        self
    }

    pub fn on_click(&mut self, listener: &Listener) -> &mut Self {
        self.on("click", Some(listener))
    }

    /// Fire a bubbling, cancelable `click` at every member in order
    pub fn simulate_click(&mut self) -> &mut Self {
        self.dispatch_interaction("click")
    }

    pub fn on_change(&mut self, listener: Option<&Listener>) -> &mut Self {
        self.on("change", listener)
    }

    /// Fire a bubbling `change` at every member in order
    pub fn simulate_change(&mut self) -> &mut Self {
        self.dispatch_interaction("change")
    }

    fn dispatch_interaction(&mut self, event_type: &str) -> &mut Self {
        for node in self.members() {
            let mut event = Event::interaction(event_type);
            self.page().dispatch(node, &mut event);
        }
        self
    }

    /// Dispatch a custom event carrying `detail`.
    ///
    /// Goes to the first member only unless `dispatch_to_all` is set. A
    /// ready-made `Event` keeps its own detail when `detail` is `None`.
    pub fn trigger(
        &mut self,
        event: impl Into<EventSpec>,
        detail: Option<Value>,
        dispatch_to_all: bool,
    ) -> Result<&mut Self> {
        let mut event = match event.into() {
            EventSpec::Name(name) if !name.is_empty() => Event::custom(name, detail.unwrap_or(Value::Null)),
            EventSpec::Name(_) => return Err(Error::InvalidEvent("an empty event name".to_string())),
            EventSpec::Event(mut event) => {
                if let Some(detail) = detail {
                    event.detail = detail;
                }
                event
            }
            EventSpec::Invalid(what) => return Err(Error::InvalidEvent(what)),
        };

        let targets: Vec<NodeId> = if dispatch_to_all {
            self.members()
        } else {
            self.first().into_iter().collect()
        };
        for target in targets {
            event.reset_dispatch_state();
            self.page().dispatch(target, &mut event);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Page};
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn counter() -> (Listener, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        (Listener::new(move |_: &mut Event| h.set(h.get() + 1)), hits)
    }

    #[test]
    fn test_on_off_same_listener() {
        let page = Page::from_html("<button>b</button>", Config::default()).unwrap();
        let mut button = page.wrap("button").unwrap();
        let (listener, hits) = counter();

        button.on("click", Some(&listener)).simulate_click();
        assert_eq!(hits.get(), 1);

        button.off("click", Some(&listener.clone())).simulate_click();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_off_with_lookalike_closure_keeps_listener() {
        let page = Page::from_html("<button>b</button>", Config::default()).unwrap();
        let mut button = page.wrap("button").unwrap();
        let hits = Rc::new(Cell::new(0));
        let make = |hits: &Rc<Cell<u32>>| {
            let h = Rc::clone(hits);
            Listener::new(move |_: &mut Event| h.set(h.get() + 1))
        };

        button.on_click(&make(&hits));
        button.off("click", Some(&make(&hits))).simulate_click();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_soft_no_ops() {
        let page = Page::from_html("<p></p>", Config::default()).unwrap();
        let mut p = page.wrap("p").unwrap();
        let (listener, _) = counter();
        p.on("", Some(&listener)).on("click", None).off("click", None).on_change(None);
        assert_eq!(page.listener_count(p.first().unwrap()), 0);
    }

    #[test]
    fn test_simulate_change_bubbles() {
        let page = Page::from_html("<form><input id=\"i\"></form>", Config::default()).unwrap();
        let (listener, hits) = counter();
        page.wrap("form").unwrap().on_change(Some(&listener));
        page.wrap("#i").unwrap().simulate_change();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_trigger_first_member_only() {
        let page = Page::from_html("<p>a</p><p>b</p>", Config::default()).unwrap();
        let mut p = page.wrap("p").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        p.on("ping", Some(&Listener::new(move |e: &mut Event| {
            s.borrow_mut().push((e.target, e.detail["x"].clone()));
        })));

        p.trigger("ping", Some(json!({ "x": 1 })), false).unwrap();
        assert_eq!(*seen.borrow(), vec![(p.get(0), json!(1))]);

        p.trigger("ping", None, true).unwrap();
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_trigger_rejects_non_events() {
        let page = Page::from_html("<p></p>", Config::default()).unwrap();
        let mut p = page.wrap("p").unwrap();
        assert!(matches!(p.trigger(json!(42), None, false), Err(Error::InvalidEvent(_))));
        assert!(matches!(p.trigger(json!({}), None, false), Err(Error::InvalidEvent(_))));
        assert!(matches!(p.trigger("", None, false), Err(Error::InvalidEvent(_))));
        assert!(p.trigger(json!("ping"), None, false).is_ok());
    }

    #[test]
    fn test_trigger_reuses_event_object() {
        let page = Page::from_html("<p></p>", Config::default()).unwrap();
        let mut p = page.wrap("p").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        p.on("save", Some(&Listener::new(move |e: &mut Event| {
            s.borrow_mut().push(e.detail.clone());
        })));

        let event = Event::custom("save", json!("kept"));
        p.trigger(event.clone(), None, false).unwrap();
        p.trigger(event, Some(json!("replaced")), false).unwrap();
        assert_eq!(*seen.borrow(), vec![json!("kept"), json!("replaced")]);
    }
}
