//! Transport: plain, JSON-safe snapshots
//!
//! Converts any [`Value`] (instances, foreign errors and nested data) into a
//! `serde_json::Value`. The output is plain data, so running it through
//! transport again, or through a JSON encode/decode, yields the same value.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as Json};

use crate::foreign::ForeignError;
use crate::instance::ErrorInstance;
use crate::spec::keys;
use crate::value::Value;

/// Which error-shaped values get their `stack` included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackPolicy {
    /// Each error follows its own `serializeStack` flag
    #[default]
    Own,
    /// Every captured stack is included
    Always,
    /// No stack is ever included
    Never,
}

impl StackPolicy {
    const fn includes(self, own_flag: bool) -> bool {
        match self {
            Self::Own => own_flag,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Transport a value, each error following its own stack flag
pub fn transport(value: &Value) -> Json {
    transport_with(value, StackPolicy::Own)
}

/// Transport a value under an explicit stack policy
pub fn transport_with(value: &Value, policy: StackPolicy) -> Json {
    Transport {
        policy,
        path: Vec::new(),
    }
    .value(value)
}

struct Transport {
    policy: StackPolicy,
    /// Instances currently being serialized, outermost first
    path: Vec<usize>,
}

impl Transport {
    fn value(&mut self, value: &Value) -> Json {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => Json::Number(n.clone()),
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(|item| self.value(item)).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.value(item)))
                    .collect(),
            ),
            Value::Error(instance) => self.instance(instance),
            Value::Foreign(err) => self.foreign(err),
        }
    }

    fn instance(&mut self, instance: &ErrorInstance) -> Json {
        let mut out = Map::new();
        out.insert(keys::NAME.to_owned(), Json::String(instance.error_type().name()));

        let id = instance.addr();
        if self.path.contains(&id) {
            // Back-reference: name and message only.
            if let Some(name) = instance.field(keys::NAME) {
                out.insert(keys::NAME.to_owned(), self.value(name));
            }
            out.insert(keys::MESSAGE.to_owned(), Json::String(instance.message()));
            return Json::Object(out);
        }

        self.path.push(id);
        // `stack` is only ever emitted by the stack policy below.
        for (key, field) in instance.all_fields().filter(|(key, _)| *key != keys::STACK) {
            let field = self.value(field);
            out.insert(key.clone(), field);
        }
        let values = instance.with_values(|values| values.iter().map(|v| self.value(v)).collect());
        out.insert(keys::VALUES.to_owned(), Json::Array(values));
        if self.policy.includes(instance.serialize_stack())
            && let Some(stack) = instance.stack()
        {
            out.insert(keys::STACK.to_owned(), Json::String(stack));
        }
        self.path.pop();

        Json::Object(out)
    }

    fn foreign(&mut self, err: &ForeignError) -> Json {
        let mut out = Map::new();
        out.insert(keys::NAME.to_owned(), Json::String(err.name().to_owned()));
        out.insert(keys::MESSAGE.to_owned(), Json::String(err.message().to_owned()));
        for (key, field) in err.fields().filter(|(key, _)| *key != keys::STACK) {
            out.insert(key.clone(), field.clone());
        }
        if let Some(cause) = err.cause() {
            out.insert("cause".to_owned(), self.foreign(cause));
        }
        if self.policy.includes(err.serialize_stack())
            && let Some(stack) = err.stack()
        {
            out.insert(keys::STACK.to_owned(), Json::String(stack.to_owned()));
        }
        Json::Object(out)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        transport(self).serialize(serializer)
    }
}

impl Serialize for ErrorInstance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.transport().serialize(serializer)
    }
}

impl Serialize for ForeignError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        transport(&Value::Foreign(self.clone())).serialize(serializer)
    }
}
