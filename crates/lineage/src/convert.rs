//! Conversion factory: `ErrorType::from`
//!
//! Re-expresses an existing family instance (or a bare message) as an
//! instance of another type in the same family, carrying its values over.

use crate::error_type::ErrorType;
use crate::instance::ErrorInstance;
use crate::value::Value;

/// One argument to [`ErrorType::from`]
#[derive(Debug, Clone, Default)]
pub enum FromArg {
    #[default]
    None,
    Message(String),
    Instance(ErrorInstance),
}

impl From<&str> for FromArg {
    fn from(v: &str) -> Self {
        Self::Message(v.to_owned())
    }
}

impl From<String> for FromArg {
    fn from(v: String) -> Self {
        Self::Message(v)
    }
}

impl From<ErrorInstance> for FromArg {
    fn from(v: ErrorInstance) -> Self {
        Self::Instance(v)
    }
}

impl From<&ErrorInstance> for FromArg {
    fn from(v: &ErrorInstance) -> Self {
        Self::Instance(v.clone())
    }
}

impl<T: Into<FromArg>> From<Option<T>> for FromArg {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::None, Into::into)
    }
}

impl ErrorType {
    /// Build an instance of this type from a message, a family instance, or both
    ///
    /// Arguments may come in either order. The first family instance wins,
    /// as does the first message; instances from other families are ignored.
    /// With an instance, its values carry over, and the message is the given
    /// one, else the instance's own.
    pub fn from(&self, first: impl Into<FromArg>, second: impl Into<FromArg>) -> ErrorInstance {
        let mut source: Option<ErrorInstance> = None;
        let mut message: Option<String> = None;

        for arg in [first.into(), second.into()] {
            match arg {
                FromArg::Instance(instance) if source.is_none() && self.is_family(&instance) => {
                    source = Some(instance);
                }
                FromArg::Message(text) if message.as_deref().is_none_or(str::is_empty) => {
                    message = Some(text);
                }
                _ => {}
            }
        }

        let message = message.filter(|text| !text.is_empty());
        let Some(source) = source else {
            return self.create(message.map(Value::String));
        };

        let values = Value::List(source.values());
        let message = message.or_else(|| Some(source.message()).filter(|text| !text.is_empty()));
        match message {
            Some(text) => self.create([Value::String(text), values]),
            None => self.create([values]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineageConfig;
    use crate::schedule;
    use crate::spec::ErrorSpec;
    use crate::args;
    use pretty_assertions::assert_eq;

    struct Family {
        root: ErrorType,
        flag: ErrorType,
    }

    fn family() -> Family {
        let root = ErrorType::root_with(&LineageConfig::default());
        let flag = root.extend(ErrorSpec::new().name("FlagError")).unwrap();
        Family { root, flag }
    }

    #[test]
    fn test_from_message_only() {
        let Family { flag, .. } = family();
        let err = flag.from("just a message", FromArg::None);
        assert_eq!(err.message(), "just a message");
        assert!(!err.has_values());

        let default = flag.from(FromArg::None, FromArg::None);
        assert_eq!(default.message(), "FlagError aggregated error");
        schedule::run_pending();
    }

    #[test]
    fn test_from_instance_and_message_in_either_order() {
        let Family { root, flag } = family();
        let source = root.create(args!["original", 1, 2]);

        for err in [flag.from(&source, "override"), flag.from("override", &source)] {
            assert_eq!(err.name(), "FlagError");
            assert_eq!(err.message(), "override");
            assert_eq!(err.values(), args![1, 2]);
            assert!(!err.same_instance(&source));
        }
        schedule::run_pending();
    }

    #[test]
    fn test_from_instance_keeps_its_message() {
        let Family { root, flag } = family();
        let source = root.create(args!["original", "v"]);
        let err = flag.from(&source, FromArg::None);
        assert_eq!(err.message(), "original");
        assert_eq!(err.values(), args!["v"]);
        schedule::run_pending();
    }

    #[test]
    fn test_from_instance_with_empty_message_uses_template() {
        let Family { root, flag } = family();
        let blank = root
            .extend(ErrorSpec::new().message(""))
            .unwrap()
            .create(args![7]);
        let err = flag.from(FromArg::None, blank);
        assert_eq!(err.message(), "FlagError aggregated error");
        assert_eq!(err.values(), args![7]);
        schedule::run_pending();
    }

    #[test]
    fn test_first_instance_wins() {
        let Family { root, flag } = family();
        let first = root.create(args!["first", 1]);
        let second = root.create(args!["second", 2]);
        let err = flag.from(&first, &second);
        assert_eq!(err.message(), "first");
        assert_eq!(err.values(), args![1]);
        schedule::run_pending();
    }

    #[test]
    fn test_other_family_is_ignored() {
        let Family { flag, .. } = family();
        let stranger = ErrorType::root_with(&LineageConfig::default().with_root_name("Other"))
            .create(args!["stranger", 9]);
        let err = flag.from(&stranger, Some("mine"));
        assert_eq!(err.message(), "mine");
        assert!(!err.has_values());
        schedule::run_pending();
    }
}
