//! Runtime errors

use nodeset_dom::{DomError, SelectorError};
use nodeset_html::HtmlError;

/// Result alias used throughout the runtime
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Selector failed to parse; surfaced unchanged from the selector engine
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    /// `trigger` was given something that is neither an event name nor an Event
    #[error("cannot trigger {0}: expected an event name or an Event")]
    InvalidEvent(String),

    #[error("no method registered as `{0}`")]
    UnknownMethod(String),

    /// Raised by extension code for its own failures
    #[error("extension failed: {0}")]
    Extension(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
