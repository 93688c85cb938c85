//! Page - owner of the document and every piece of shared runtime state
//!
//! A `Page` is a cheap, cloneable handle. Collections keep one so that
//! operators can reach the tree, listeners, extensions and scheduler.
//! No interior borrow is held while user code (listeners, extensions,
//! frame callbacks) runs, so that code may freely call back into the page.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use nodeset_dom::events::propagation_path;
use nodeset_dom::{Document, DomTree, Event, EventRegistry, Listener, NodeId, SelectorList};
use nodeset_html::HtmlParser;
use serde_json::Value;

use crate::registry::{Extension, ExtensionRegistry, Plugin};
use crate::tween::{self, AnimatedProperty, AnimationHandle, FrameId, PlayState, Tween, TweenStep};
use crate::{Collection, Config, Result, WrapInput};

struct PageInner {
    config: Config,
    document: RefCell<Document>,
    listeners: RefCell<EventRegistry>,
    extensions: RefCell<ExtensionRegistry>,
    frames: RefCell<tween::FrameScheduler>,
    animations: RefCell<HashMap<(NodeId, AnimatedProperty), AnimationHandle>>,
    clock: Cell<f64>,
}

/// A loaded page
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageInner>,
}

/// Non-owning page handle held by long-lived callbacks
#[derive(Clone)]
pub struct WeakPage {
    inner: Weak<PageInner>,
}

impl WeakPage {
    pub fn upgrade(&self) -> Option<Page> {
        self.inner.upgrade().map(|inner| Page { inner })
    }
}

impl Page {
    /// Create a page holding an empty html/head/body document
    pub fn new(config: Config) -> Self {
        let document = Document::new(&config.url);
        Self::with_document(document, config)
    }

    /// Parse `html` into a new page
    pub fn from_html(html: &str, config: Config) -> Result<Self> {
        let document = HtmlParser::new()
            .keep_whitespace_text(config.keep_whitespace_text)
            .parse_with_url(html, &config.url)?;
        Ok(Self::with_document(document, config))
    }

    fn with_document(document: Document, config: Config) -> Self {
        tracing::debug!("Creating page for {}", config.url);
        Self {
            inner: Rc::new(PageInner {
                config,
                document: RefCell::new(document),
                listeners: RefCell::new(EventRegistry::new()),
                extensions: RefCell::new(ExtensionRegistry::new()),
                frames: RefCell::new(tween::FrameScheduler::new()),
                animations: RefCell::new(HashMap::new()),
                clock: Cell::new(0.0),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn downgrade(&self) -> WeakPage {
        WeakPage { inner: Rc::downgrade(&self.inner) }
    }

    /// Whether two handles refer to the same page
    pub fn same(&self, other: &Page) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the document. Release it before calling collection operators.
    pub fn document(&self) -> Ref<'_, Document> {
        self.inner.document.borrow()
    }

    /// Mutably borrow the document. Release it before calling collection operators.
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.inner.document.borrow_mut()
    }

    pub(crate) fn with_tree<R>(&self, f: impl FnOnce(&DomTree) -> R) -> R {
        f(self.inner.document.borrow().tree())
    }

    pub(crate) fn with_tree_mut<R>(&self, f: impl FnOnce(&mut DomTree) -> R) -> R {
        f(self.inner.document.borrow_mut().tree_mut())
    }

    pub(crate) fn parser(&self) -> HtmlParser {
        HtmlParser::new().keep_whitespace_text(self.inner.config.keep_whitespace_text)
    }

    pub fn body(&self) -> Option<NodeId> {
        self.document().body()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document().get_element_by_id(id)
    }

    /// Create a detached element
    pub fn create_element(&self, tag_name: &str) -> NodeId {
        self.with_tree_mut(|tree| tree.create_element(tag_name))
    }

    // ------------------------------------------------------------------
    // Collection factory
    // ------------------------------------------------------------------

    /// Build a collection from a selector, markup, a node or nothing
    pub fn wrap<'a>(&self, input: impl Into<WrapInput<'a>>) -> Result<Collection> {
        let nodes = match input.into() {
            WrapInput::Empty => Vec::new(),
            WrapInput::Node(node) => vec![node],
            WrapInput::Selector(selector) => {
                let list = SelectorList::parse(selector)?;
                let found = self.with_tree(|tree| list.query_all(tree, tree.root()));
                tracing::trace!("Selector `{}` matched {} elements", selector, found.len());
                found
            }
            WrapInput::Markup(markup) => {
                let parser = self.parser();
                self.with_tree_mut(|tree| -> Result<Vec<NodeId>> {
                    let imported = parser.parse_fragment_into(markup, tree)?;
                    Ok(imported.into_iter().filter(|&id| tree.is_element(id)).collect())
                })?
            }
        };
        Ok(Collection::from_nodes(self.clone(), nodes))
    }

    /// The empty collection
    pub fn empty(&self) -> Collection {
        Collection::from_nodes(self.clone(), Vec::new())
    }

    // ------------------------------------------------------------------
    // Extensions
    // ------------------------------------------------------------------

    /// Make `method` callable as `name` on every collection of this page.
    /// Returns the method it replaced, if any.
    pub fn register_method<F>(&self, name: &str, method: F) -> Option<Rc<dyn Extension>>
    where
        F: Fn(&mut Collection, &[Value]) -> Result<Value> + 'static,
    {
        self.register_extension(name, method)
    }

    pub fn register_extension(&self, name: &str, extension: impl Extension + 'static) -> Option<Rc<dyn Extension>> {
        self.inner.extensions.borrow_mut().register(name, extension)
    }

    /// Let `plugin` register its methods
    pub fn install(&self, plugin: &dyn Plugin) {
        let info = plugin.info();
        let mut staged = ExtensionRegistry::new();
        plugin.register(&mut staged);
        tracing::debug!(
            "Installing plugin {} {} ({} methods)",
            info.name,
            info.version,
            staged.len()
        );
        self.inner.extensions.borrow_mut().merge(staged);
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.inner.extensions.borrow().contains(name)
    }

    pub(crate) fn method(&self, name: &str) -> Option<Rc<dyn Extension>> {
        self.inner.extensions.borrow().get(name)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub(crate) fn add_listener(&self, node: NodeId, event_type: &str, listener: &Listener) -> bool {
        self.inner.listeners.borrow_mut().add(node, event_type, listener)
    }

    pub(crate) fn remove_listener(&self, node: NodeId, event_type: &str, listener: &Listener) -> bool {
        self.inner.listeners.borrow_mut().remove(node, event_type, listener)
    }

    /// Number of listeners attached to `node`
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.inner.listeners.borrow().count(node)
    }

    /// Dispatch `event` at `target`, bubbling through its ancestors if the
    /// event bubbles. Returns `false` if a listener prevented the default.
    pub fn dispatch(&self, target: NodeId, event: &mut Event) -> bool {
        let path = self.with_tree(|tree| propagation_path(tree, target));
        event.target = Some(target);
        event.timestamp = self.now();

        for node in path {
            if node != target && !event.bubbles() {
                break;
            }
            event.current_target = Some(node);
            let listeners = self.inner.listeners.borrow().listeners_for(node, event.event_type());
            for listener in listeners {
                listener.call(event);
                if event.is_immediate_propagation_stopped() {
                    break;
                }
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        event.current_target = None;
        !event.is_default_prevented()
    }

    // ------------------------------------------------------------------
    // Animation frames
    // ------------------------------------------------------------------

    /// Current page clock (milliseconds)
    pub fn now(&self) -> f64 {
        self.inner.clock.get()
    }

    pub fn request_animation_frame(&self, callback: impl FnMut(f64) -> TweenStep + 'static) -> FrameId {
        self.inner.frames.borrow_mut().request(callback)
    }

    /// Cancel a frame callback. An animation driven by it reports `Cancelled`.
    pub fn cancel_animation_frame(&self, id: FrameId) -> bool {
        if let Some(handle) = self.release_animation(id) {
            handle.mark_cancelled();
        }
        self.inner.frames.borrow_mut().cancel(id)
    }

    pub fn pending_frames(&self) -> usize {
        self.inner.frames.borrow().pending()
    }

    /// Run every callback queued before this call with timestamp `now`.
    /// Returns the number of callbacks run.
    pub fn run_frame(&self, now: f64) -> usize {
        if now > self.inner.clock.get() {
            self.inner.clock.set(now);
        }
        let batch = self.inner.frames.borrow_mut().take_batch();
        let mut ran = 0;
        for (id, mut callback) in batch {
            if !self.inner.frames.borrow().is_live(id) {
                continue;
            }
            let step = callback(now);
            ran += 1;
            self.inner.frames.borrow_mut().finish(id, callback, step);
            if step == TweenStep::Finished {
                self.release_animation(id);
            }
        }
        tracing::trace!("Frame at {}ms ran {} callbacks", now, ran);
        ran
    }

    /// Step the page clock forward by `ms`, one frame per
    /// `frame_interval_ms`. Returns the number of frames run.
    pub fn advance(&self, ms: f64) -> usize {
        let end = self.now() + ms.max(0.0);
        let step = self.inner.config.frame_interval_ms;
        if step <= 0.0 {
            self.run_frame(end);
            return 1;
        }
        let mut frames = 0;
        while self.now() < end {
            let next = (self.now() + step).min(end);
            self.run_frame(next);
            frames += 1;
        }
        frames
    }

    /// Run frames until nothing is queued, up to `max_frames`
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let step = self.inner.config.frame_interval_ms.max(1.0);
        let mut frames = 0;
        while frames < max_frames && self.pending_frames() > 0 {
            self.run_frame(self.now() + step);
            frames += 1;
        }
        frames
    }

    /// Schedule `tween` as the animation of `property` on `node`. A tween
    /// still in flight for the same pair is cancelled.
    pub fn animate(&self, node: NodeId, property: AnimatedProperty, tween: Tween) -> AnimationHandle {
        let state = Rc::new(Cell::new(PlayState::Idle));
        let frame = self.request_animation_frame(tween::drive(tween, Rc::clone(&state)));
        let handle = AnimationHandle::new(state, frame);

        let previous = self
            .inner
            .animations
            .borrow_mut()
            .insert((node, property.clone()), handle.clone());
        if let Some(previous) = previous.filter(AnimationHandle::is_active) {
            tracing::debug!("Cancelling {:?} animation on {}", property, node);
            previous.mark_cancelled();
            self.cancel_animation_frame(previous.frame_id());
        }
        handle
    }

    /// Animation in flight for `property` on `node`
    pub fn animation(&self, node: NodeId, property: &AnimatedProperty) -> Option<AnimationHandle> {
        self.inner
            .animations
            .borrow()
            .get(&(node, property.clone()))
            .cloned()
    }

    /// Forget the animation driven by frame `id`
    fn release_animation(&self, id: FrameId) -> Option<AnimationHandle> {
        let mut animations = self.inner.animations.borrow_mut();
        let key = animations
            .iter()
            .find(|(_, handle)| handle.frame_id() == id)
            .map(|(key, _)| key.clone())?;
        animations.remove(&key)
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.inner.config.url)
            .field("methods", &self.inner.extensions.borrow().len())
            .field("pending_frames", &self.pending_frames())
            .finish()
    }
}

impl fmt::Debug for WeakPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakPage")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
