//! Spec bags and the merger that folds them over a parent type
//!
//! An [`ErrorSpec`] is what a caller hands to `extend`: literal fields,
//! message templates and lifecycle hook declarations, in declaration order.
//! [`merge`] folds it over the parent's tables to produce the child's.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::error::{LineageError, Result};
use crate::hooks::{ConstructedHook, HookEvent, HookTable, PushHook};
use crate::instance::ErrorInstance;
use crate::value::Value;

/// Resolved field defaults of an error type, in declaration order
pub type SpecTable = IndexMap<String, serde_json::Value>;

/// Well-known spec keys
pub mod keys {
    pub const NAME: &str = "name";
    pub const MESSAGE: &str = "message";
    pub const SERIALIZE_STACK: &str = "serializeStack";
    pub const OMIT_STACK: &str = "omitStack";
    pub const ASYNC_CONSTRUCT: &str = "asyncConstruct";
    pub const VALUES: &str = "values";
    pub const STACK: &str = "stack";
}

/// Structural fields are not listed among an instance's own fields
pub fn is_structural(key: &str) -> bool {
    key == keys::SERIALIZE_STACK || key == keys::OMIT_STACK
}

/// One declaration in a spec bag
#[derive(Clone)]
pub enum SpecEntry {
    /// Literal default (possibly a template string)
    Field(String, serde_json::Value),
    /// Append a `constructed` hook
    OnConstructed(ConstructedHook),
    /// Append a `push` hook
    OnPush(PushHook),
    /// Drop every inherited hook for the event
    Clear(HookEvent),
}

impl SpecEntry {
    fn from_pair(key: String, value: serde_json::Value) -> Self {
        match HookEvent::from_spec_key(&key) {
            Some(event) if value.is_null() => Self::Clear(event),
            _ => Self::Field(key, value),
        }
    }
}

impl fmt::Debug for SpecEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(key, value) => f.debug_tuple("Field").field(key).field(value).finish(),
            Self::OnConstructed(_) => f.write_str("OnConstructed(..)"),
            Self::OnPush(_) => f.write_str("OnPush(..)"),
            Self::Clear(event) => f.debug_tuple("Clear").field(event).finish(),
        }
    }
}

/// Declared overrides for a child error type
///
/// # Example
///
/// ```rust
/// use lineage::{ErrorSpec, ErrorType};
///
/// let http = ErrorType::root()
///     .extend(
///         ErrorSpec::new()
///             .name("HttpError")
///             .message("{{name}}: upstream failed")
///             .field("statusCode", 502),
///     )
///     .unwrap();
/// assert_eq!(http.name(), "HttpError");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorSpec {
    entries: Vec<SpecEntry>,
}

impl ErrorSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or override) a literal field
    ///
    /// `null` under a lifecycle key (`onConstructed`, `onPush`) clears the
    /// inherited hooks for that event instead.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.entries.push(SpecEntry::from_pair(key.into(), value.into()));
        self
    }

    /// Display name of the type
    #[must_use]
    pub fn name(self, name: impl Into<String>) -> Self {
        self.field(keys::NAME, name.into())
    }

    /// Message template, e.g. `"{{name}} failed"`
    #[must_use]
    pub fn message(self, template: impl Into<String>) -> Self {
        self.field(keys::MESSAGE, template.into())
    }

    /// Include stacks when transporting instances
    #[must_use]
    pub fn serialize_stack(self, serialize: bool) -> Self {
        self.field(keys::SERIALIZE_STACK, serialize)
    }

    /// Skip stack capture for instances
    #[must_use]
    pub fn omit_stack(self, omit: bool) -> Self {
        self.field(keys::OMIT_STACK, omit)
    }

    /// Defer `constructed` hooks to the next deferred turn
    #[must_use]
    pub fn async_construct(self, deferred: bool) -> Self {
        self.field(keys::ASYNC_CONSTRUCT, deferred)
    }

    /// Append a `constructed` hook
    #[must_use]
    pub fn on_constructed<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ErrorInstance) + Send + Sync + 'static,
    {
        self.entries.push(SpecEntry::OnConstructed(Arc::new(hook)));
        self
    }

    /// Append a `push` hook
    #[must_use]
    pub fn on_push<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ErrorInstance, &Value) + Send + Sync + 'static,
    {
        self.entries.push(SpecEntry::OnPush(Arc::new(hook)));
        self
    }

    /// Discard every inherited hook for `event`
    #[must_use]
    pub fn clear_hooks(mut self, event: HookEvent) -> Self {
        self.entries.push(SpecEntry::Clear(event));
        self
    }

    pub fn entries(&self) -> &[SpecEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a spec bag from a JSON object
    ///
    /// `onConstructed`/`onPush` set to `null` clear the event's hooks. Any
    /// other value under those keys is an ordinary field, since JSON cannot
    /// carry a hook.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(LineageError::InvalidSpec(format!(
                "expected an object, got {}",
                Value::from(other).kind()
            ))),
        }
    }

    /// Parse a spec bag from JSON text
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| LineageError::InvalidSpec(e.to_string()))
    }

    fn from_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let entries = map
            .into_iter()
            .map(|(key, value)| SpecEntry::from_pair(key, value))
            .collect();
        Self { entries }
    }
}

impl<'de> Deserialize<'de> for ErrorSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_map(map))
    }
}

/// Fold a child's declarations over its parent's tables
///
/// The parent's tables are never mutated; the child receives copies with
/// its fields overriding and its hooks appended after the inherited ones.
pub fn merge(parent_spec: &SpecTable, parent_hooks: &HookTable, child: &ErrorSpec) -> (SpecTable, HookTable) {
    let mut spec = parent_spec.clone();
    let mut hooks = parent_hooks.clone();

    for entry in &child.entries {
        match entry {
            SpecEntry::Field(key, value) => {
                spec.insert(key.clone(), value.clone());
            }
            SpecEntry::OnConstructed(hook) => hooks.append_constructed(Arc::clone(hook)),
            SpecEntry::OnPush(hook) => hooks.append_push(Arc::clone(hook)),
            SpecEntry::Clear(event) => hooks.clear(*event),
        }
    }

    (spec, hooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parent() -> (SpecTable, HookTable) {
        let mut spec = SpecTable::new();
        spec.insert(keys::NAME.into(), json!("Base"));
        spec.insert(keys::MESSAGE.into(), json!("{{name}} aggregated error"));
        spec.insert(keys::SERIALIZE_STACK.into(), json!(false));

        let mut hooks = HookTable::default();
        hooks.append_push(Arc::new(|_: &ErrorInstance, _: &Value| {}));
        (spec, hooks)
    }

    #[test]
    fn test_fields_inherit_and_override_in_place() {
        let (spec, hooks) = parent();
        let child = ErrorSpec::new().name("Child").field("statusCode", 404);
        let (merged, _) = merge(&spec, &hooks, &child);

        assert_eq!(
            merged.keys().collect::<Vec<_>>(),
            ["name", "message", "serializeStack", "statusCode"]
        );
        assert_eq!(merged["name"], json!("Child"));
        assert_eq!(merged["message"], json!("{{name}} aggregated error"));
        assert_eq!(spec["name"], json!("Base"));
    }

    #[test]
    fn test_hooks_append_after_inherited() {
        let (spec, hooks) = parent();
        let child = ErrorSpec::new()
            .on_push(|_, _| {})
            .on_constructed(|_| {});
        let (_, merged) = merge(&spec, &hooks, &child);

        assert_eq!(merged.len(HookEvent::Push), 2);
        assert_eq!(merged.len(HookEvent::Constructed), 1);
        assert!(Arc::ptr_eq(&merged.push()[0], &hooks.push()[0]));
        assert_eq!(hooks.len(HookEvent::Push), 1);
    }

    #[test]
    fn test_clear_then_append() {
        let (spec, hooks) = parent();
        let child = ErrorSpec::new().clear_hooks(HookEvent::Push).on_push(|_, _| {});
        let (_, merged) = merge(&spec, &hooks, &child);

        assert_eq!(merged.len(HookEvent::Push), 1);
        assert!(!Arc::ptr_eq(&merged.push()[0], &hooks.push()[0]));
    }

    #[test]
    fn test_json_bag_reserved_keys() {
        let bag = ErrorSpec::from_json(json!({
            "name": "Quiet",
            "onPush": null,
            "onConstructed": 5,
        }))
        .unwrap();
        let (spec, hooks) = parent();
        let (merged_spec, merged_hooks) = merge(&spec, &hooks, &bag);

        assert_eq!(merged_hooks.len(HookEvent::Push), 0);
        assert_eq!(merged_spec["onConstructed"], json!(5));
        assert_eq!(merged_spec["name"], json!("Quiet"));
        assert!(!merged_spec.contains_key("onPush"));
    }

    #[test]
    fn test_builder_null_hook_key_matches_json_bag() {
        let (spec, hooks) = parent();
        let built = ErrorSpec::new()
            .field("onPush", serde_json::Value::Null)
            .field("onConstructed", "kept");
        let (merged_spec, merged_hooks) = merge(&spec, &hooks, &built);

        assert!(matches!(built.entries()[0], SpecEntry::Clear(HookEvent::Push)));
        assert_eq!(merged_hooks.len(HookEvent::Push), 0);
        assert!(!merged_spec.contains_key("onPush"));
        assert_eq!(merged_spec["onConstructed"], json!("kept"));
    }

    #[test]
    fn test_json_bag_must_be_object() {
        let err = ErrorSpec::from_json(json!(["name"])).unwrap_err();
        assert_eq!(err, LineageError::InvalidSpec("expected an object, got list".into()));

        let parsed = ErrorSpec::from_json_str(r#"{"name": "FromText", "omitStack": true}"#).unwrap();
        assert_eq!(parsed.entries().len(), 2);
        assert!(ErrorSpec::from_json_str("{").is_err());
    }
}
