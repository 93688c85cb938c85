//! Extension registry
//!
//! Collaborator modules add named methods that every [`Collection`] of a
//! page can call. Methods are resolved by name at call time, so a module
//! never needs to touch the collection type itself.
//!
//! # Example
//! ```rust
//! use nodeset::{Collection, Page, Value};
//!
//! let page = Page::from_html("<p>a</p><p>b</p>", Default::default()).unwrap();
//! page.register_method("count", |c: &mut Collection, _args: &[Value]| {
//!     Ok(Value::from(c.len()))
//! });
//!
//! let mut paragraphs = page.wrap("p").unwrap();
//! assert_eq!(paragraphs.call("count", &[]).unwrap(), Value::from(2));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::{Collection, Result};

/// A method callable on any collection
pub trait Extension {
    fn call(&self, collection: &mut Collection, args: &[Value]) -> Result<Value>;
}

impl<F> Extension for F
where
    F: Fn(&mut Collection, &[Value]) -> Result<Value>,
{
    fn call(&self, collection: &mut Collection, args: &[Value]) -> Result<Value> {
        self(collection, args)
    }
}

/// Plugin metadata returned by `Plugin::info()`
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Human-readable plugin name
    pub name: &'static str,
    /// Plugin version (semver)
    pub version: &'static str,
}

/// A module that registers a group of methods at load time
pub trait Plugin {
    fn info(&self) -> PluginInfo;

    /// Add this plugin's methods to `registry`
    fn register(&self, registry: &mut ExtensionRegistry);
}

/// Name to method table; the last registration for a name wins
#[derive(Default, Clone)]
pub struct ExtensionRegistry {
    methods: HashMap<String, Rc<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extension` under `name`, returning the one it replaced
    pub fn register(&mut self, name: &str, extension: impl Extension + 'static) -> Option<Rc<dyn Extension>> {
        self.register_rc(name, Rc::new(extension))
    }

    /// Register a closure; argument types are inferred
    pub fn register_fn<F>(&mut self, name: &str, method: F) -> Option<Rc<dyn Extension>>
    where
        F: Fn(&mut Collection, &[Value]) -> Result<Value> + 'static,
    {
        self.register(name, method)
    }

    pub fn register_rc(&mut self, name: &str, extension: Rc<dyn Extension>) -> Option<Rc<dyn Extension>> {
        let replaced = self.methods.insert(name.to_string(), extension);
        if replaced.is_some() {
            tracing::debug!("Method `{}` replaced by a later registration", name);
        } else {
            tracing::debug!("Method `{}` registered", name);
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Extension>> {
        self.methods.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Rc<dyn Extension>> {
        self.methods.remove(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Move every entry of `other` into this registry
    pub fn merge(&mut self, other: ExtensionRegistry) {
        for (name, extension) in other.methods {
            self.register_rc(&name, extension);
        }
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("methods", &self.names())
            .finish()
    }
}
