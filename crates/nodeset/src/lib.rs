//! nodeset
//!
//! Chainable collections over an HTML document: traversal and mutation
//! operators, event binding, a per-page method registry for plugins, and
//! frame-driven tweens for fades.
//!
//! # Example
//! ```rust
//! use nodeset::{Config, Page};
//!
//! let page = Page::from_html(
//!     "<ul><li>A</li><li id=\"x\">B</li><li>C</li></ul>",
//!     Config::default(),
//! )
//! .unwrap();
//!
//! let mut items = page.wrap("ul").unwrap();
//! let html = items.find("li").unwrap().eq(1).get_html();
//! assert_eq!(html.as_deref(), Some("B"));
//! ```

mod collection;
mod config;
mod effects;
mod error;
mod events;
mod manipulate;
mod page;
mod registry;
mod traverse;
pub mod logging;
pub mod tween;

pub use collection::{Collection, WrapInput};
pub use config::Config;
pub use effects::Callback;
pub use error::{Error, Result};
pub use events::EventSpec;
pub use manipulate::Content;
pub use page::{Page, WeakPage};
pub use registry::{Extension, ExtensionRegistry, Plugin, PluginInfo};
pub use tween::{AnimatedProperty, AnimationHandle, FrameId, PlayState, Tween, TweenStep, animate_over_time};

pub use nodeset_dom::{Event, Listener, NodeId};
pub use serde_json::Value;

// Re-export sub-crates for advanced usage
pub use nodeset_dom as dom;
pub use nodeset_html as html;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
