//! Errors that belong to no family
//!
//! A [`ForeignError`] is the error-shaped value a family instance wraps when
//! the cause came from somewhere else: an I/O failure, a parser error, or an
//! ad-hoc error built by hand with extra fields such as `statusCode`.

use std::sync::Arc;

use indexmap::IndexMap;

/// A wrapped, immutable, cheaply clonable non-family error
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignError {
    inner: Arc<ForeignInner>,
}

#[derive(Debug, Clone, PartialEq)]
struct ForeignInner {
    name: String,
    message: String,
    fields: IndexMap<String, serde_json::Value>,
    cause: Option<ForeignError>,
    stack: Option<String>,
    serialize_stack: bool,
}

impl ForeignError {
    /// Create a foreign error with a name and message
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ForeignInner {
                name: name.into(),
                message: message.into(),
                fields: IndexMap::new(),
                cause: None,
                stack: None,
                serialize_stack: false,
            }),
        }
    }

    /// Wrap a standard error, following its `source()` chain
    ///
    /// The name is the short type name of `E`; sources only expose
    /// `dyn Error`, so they are named `Error`.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let mut foreign = Self::new(short_type_name::<E>(), err.to_string());
        if let Some(source) = err.source() {
            foreign = foreign.with_cause(Self::from_dyn(source));
        }
        foreign
    }

    fn from_dyn(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut foreign = Self::new("Error", err.to_string());
        if let Some(source) = err.source() {
            foreign = foreign.with_cause(Self::from_dyn(source));
        }
        foreign
    }

    /// Attach a literal field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Arc::make_mut(&mut self.inner)
            .fields
            .insert(key.into(), value.into());
        self
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_cause(mut self, cause: ForeignError) -> Self {
        Arc::make_mut(&mut self.inner).cause = Some(cause);
        self
    }

    /// Attach a stack trace string
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).stack = Some(stack.into());
        self
    }

    /// Whether transport includes this error's stack
    #[must_use]
    pub fn with_serialize_stack(mut self, serialize: bool) -> Self {
        Arc::make_mut(&mut self.inner).serialize_stack = serialize;
        self
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.inner.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.inner.fields.iter()
    }

    pub fn cause(&self) -> Option<&ForeignError> {
        self.inner.cause.as_ref()
    }

    pub fn stack(&self) -> Option<&str> {
        self.inner.stack.as_deref()
    }

    pub fn serialize_stack(&self) -> bool {
        self.inner.serialize_stack
    }
}

impl core::fmt::Display for ForeignError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.inner.name, self.inner.message)
    }
}

impl<E> From<E> for ForeignError
where
    E: std::error::Error + 'static,
{
    fn from(err: E) -> Self {
        Self::from_error(&err)
    }
}

/// Last path segment of a type name, generics stripped
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("config unreadable")]
    struct ConfigUnreadable {
        #[source]
        source: io::Error,
    }

    #[test]
    fn test_from_io_error() {
        let err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let foreign = ForeignError::from_error(&err);
        assert_eq!(foreign.name(), "Error");
        assert_eq!(foreign.message(), "file not found");
        assert!(foreign.cause().is_none());
    }

    #[test]
    fn test_source_chain_becomes_cause() {
        let err = ConfigUnreadable {
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let foreign = ForeignError::from(err);
        assert_eq!(foreign.name(), "ConfigUnreadable");
        assert_eq!(foreign.message(), "config unreadable");
        assert_eq!(foreign.cause().map(ForeignError::message), Some("denied"));
    }

    #[test]
    fn test_builder_does_not_touch_clones() {
        let base = ForeignError::new("Error", "boom");
        let tagged = base.clone().with_field("statusCode", 404);
        assert!(base.field("statusCode").is_none());
        assert_eq!(tagged.field("statusCode"), Some(&serde_json::json!(404)));
        assert_eq!(tagged.to_string(), "Error: boom");
    }
}
