//! # Lineage
//!
//! Declarative, extensible error type families.
//!
//! Each [`ErrorType`] is defined by a spec (field defaults and `{{name}}`
//! message templates) and lifecycle hooks fired on construction and on every
//! value pushed onto an instance. Children inherit and override their
//! parent's spec; hooks accumulate down the chain. Instances carry an ordered
//! list of auxiliary values and produce a plain, JSON-safe transport
//! snapshot.
//!
//! ## Quick Start
//!
//! ```rust
//! use lineage::prelude::*;
//!
//! let http = ErrorType::root()
//!     .extend(ErrorSpec::new().name("HttpError").field("statusCode", 502))
//!     .unwrap();
//!
//! let err = http.create(args!["upstream failed", ForeignError::new("Error", "bad gateway")]);
//! assert_eq!(err.message(), "upstream failed");
//! assert!(err.has_values());
//!
//! let json = err.transport();
//! assert_eq!(json["name"], "HttpError");
//! assert_eq!(json["statusCode"], 502);
//!
//! // Deferred lifecycle work (value replay to `push` listeners).
//! lineage::schedule::run_pending();
//! ```
//!
//! ## Threading
//!
//! Types are immutable and `Send + Sync`. Instances are single-threaded
//! handles; their deferred work runs on the owning thread's queue when it
//! calls [`schedule::run_pending`].

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod args;
pub mod config;
pub mod convert;
pub mod error;
pub mod error_type;
pub mod foreign;
pub mod hooks;
pub mod instance;
pub mod macros;
pub mod schedule;
pub mod spec;
pub mod template;
pub mod transport;
pub mod value;

// === Public API Exports ===

pub use config::LineageConfig;
pub use convert::FromArg;
pub use error::{LineageError, Result};
pub use error_type::ErrorType;
pub use foreign::ForeignError;
pub use hooks::{ConstructedHook, HookEvent, HookTable, PushHook};
pub use instance::{ErrorInstance, PushListener};
pub use spec::{ErrorSpec, SpecEntry, SpecTable};
pub use transport::{StackPolicy, transport, transport_with};
pub use value::{Object, Value, ValueKind};

/// Convenient prelude
pub mod prelude {
    pub use super::{
        ErrorInstance, ErrorSpec, ErrorType, ForeignError, FromArg, HookEvent, LineageConfig,
        LineageError, Result, StackPolicy, Value,
    };
    pub use crate::args;
}
