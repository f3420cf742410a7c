//! Configuration error types
//!
//! Every failure in this crate is a configuration mistake made by the caller
//! (too deep a hierarchy, an unsupported subscription, a malformed spec bag).
//! They surface synchronously at the call site and are never retried.

use thiserror::Error;

/// Errors raised while declaring error types or subscribing to their events
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineageError {
    /// `extend` would produce a type at or beyond the maximum depth
    #[error("{name}: inheritance limit reached (depth {depth}, max {max})")]
    InheritanceLimit {
        name: String,
        depth: usize,
        max: usize,
    },

    /// The event exists but cannot be subscribed to after construction
    #[error("unsupported event '{event}'")]
    UnsupportedEvent { event: String },

    /// The event name is not a lifecycle event at all
    #[error("unknown event '{event}'")]
    UnknownEvent { event: String },

    /// A declarative spec bag could not be read
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    /// A configuration document could not be read
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LineageError {
    /// Create an inheritance limit error
    pub fn inheritance_limit(name: impl Into<String>, depth: usize, max: usize) -> Self {
        Self::InheritanceLimit {
            name: name.into(),
            depth,
            max,
        }
    }

    /// Create an unsupported event error
    pub fn unsupported_event(event: impl Into<String>) -> Self {
        Self::UnsupportedEvent {
            event: event.into(),
        }
    }

    /// Create an unknown event error
    pub fn unknown_event(event: impl Into<String>) -> Self {
        Self::UnknownEvent {
            event: event.into(),
        }
    }
}

/// Result type for lineage operations
pub type Result<T> = std::result::Result<T, LineageError>;
