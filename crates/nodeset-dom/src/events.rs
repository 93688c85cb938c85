//! DOM Events
//!
//! Event objects, listener handles and the per-node listener registry.
//! Dispatch itself lives with the owner of the tree, since listeners may
//! re-enter it while an event is in flight.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::{DomTree, NodeId};

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    /// Payload carried by custom events
    pub detail: Value,
    bubbles: bool,
    cancelable: bool,
    /// Node the event was dispatched to
    pub target: Option<NodeId>,
    /// Node whose listeners are currently running
    pub current_target: Option<NodeId>,
    /// Host timestamp in milliseconds
    pub timestamp: f64,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl Event {
    /// Plain event: does not bubble, not cancelable
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            detail: Value::Null,
            bubbles: false,
            cancelable: false,
            target: None,
            current_target: None,
            timestamp: 0.0,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Bubbling, cancelable custom event carrying `detail`
    pub fn custom(event_type: impl Into<String>, detail: Value) -> Self {
        Self {
            detail,
            bubbles: true,
            cancelable: true,
            ..Self::new(event_type)
        }
    }

    /// Bubbling, cancelable event as produced by user interaction
    pub fn interaction(event_type: impl Into<String>) -> Self {
        Self::custom(event_type, Value::Null)
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation and skip the remaining listeners on this node
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }

    /// Clear per-dispatch state so the event object can be dispatched again
    pub fn reset_dispatch_state(&mut self) {
        self.target = None;
        self.current_target = None;
        self.default_prevented = false;
        self.propagation_stopped = false;
        self.immediate_propagation_stopped = false;
    }
}

/// Event listener handle
///
/// Two handles are the same listener only if they were cloned from one
/// another; identical closures created separately are distinct.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&mut Event)>);

impl Listener {
    pub fn new(callback: impl Fn(&mut Event) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invoke the callback
    pub fn call(&self, event: &mut Event) {
        (self.0)(event)
    }

    /// Identity comparison
    pub fn same(&self, other: &Listener) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Listeners by target node, in registration order
#[derive(Debug, Default)]
pub struct EventRegistry {
    listeners: HashMap<NodeId, Vec<(String, Listener)>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; the same (type, listener) pair is only registered once
    pub fn add(&mut self, node: NodeId, event_type: &str, listener: &Listener) -> bool {
        let entries = self.listeners.entry(node).or_default();
        if entries.iter().any(|(t, l)| t == event_type && l.same(listener)) {
            return false;
        }
        entries.push((event_type.to_string(), listener.clone()));
        true
    }

    /// Remove a listener previously added with the same handle
    pub fn remove(&mut self, node: NodeId, event_type: &str, listener: &Listener) -> bool {
        let Some(entries) = self.listeners.get_mut(&node) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(t, l)| !(t == event_type && l.same(listener)));
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.listeners.remove(&node);
        }
        removed
    }

    /// Snapshot of the listeners for `event_type` on `node`
    pub fn listeners_for(&self, node: NodeId, event_type: &str) -> Vec<Listener> {
        self.listeners
            .get(&node)
            .map(|entries| {
                entries.iter()
                    .filter(|(t, _)| t == event_type)
                    .map(|(_, l)| l.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `listener` is still registered for `event_type` on `node`
    pub fn contains(&self, node: NodeId, event_type: &str, listener: &Listener) -> bool {
        self.listeners
            .get(&node)
            .is_some_and(|entries| entries.iter().any(|(t, l)| t == event_type && l.same(listener)))
    }

    /// Total number of registered listeners on `node`
    pub fn count(&self, node: NodeId) -> usize {
        self.listeners.get(&node).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Target followed by its ancestors, as walked by a bubbling event
pub fn propagation_path(tree: &DomTree, target: NodeId) -> Vec<NodeId> {
    tree.ancestors_and_self(target).collect()
}
