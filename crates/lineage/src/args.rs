//! Construction argument parsing
//!
//! Splits an argument list into an optional leading message and the ordered
//! auxiliary values. Lists flatten in place, to any depth.

use crate::value::Value;

/// Result of [`parse`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    /// First truthy string argument, or empty
    pub message: String,
    /// Every other truthy argument, in encounter order
    pub values: Vec<Value>,
}

/// Parse a materialized argument list
///
/// - falsy arguments are skipped
/// - the first truthy string becomes the message, later strings are values
/// - lists are spliced in place and parsed by the same rules
/// - anything else is appended to `values`
pub fn parse<I>(args: I) -> ParsedArgs
where
    I: IntoIterator<Item = Value>,
{
    let mut parsed = ParsedArgs::default();
    collect(args, &mut parsed);
    parsed
}

fn collect<I>(args: I, parsed: &mut ParsedArgs)
where
    I: IntoIterator<Item = Value>,
{
    for arg in args {
        if !arg.is_truthy() {
            continue;
        }
        match arg {
            Value::String(s) if parsed.message.is_empty() => parsed.message = s,
            Value::List(items) => collect(items, parsed),
            other => parsed.values.push(other),
        }
    }
}
