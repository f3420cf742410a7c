//! `{{placeholder}}` rendering for spec fields
//!
//! Templates are rendered against the raw spec table of the type being
//! instantiated. Only string parameters substitute; anything else (missing,
//! numeric, boolean) renders as the empty string.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::spec::SpecTable;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder pattern is valid"));

/// Render a spec value; non-string values pass through unchanged
pub fn render(template: &serde_json::Value, params: &SpecTable) -> serde_json::Value {
    match template {
        serde_json::Value::String(s) => serde_json::Value::String(render_str(s, params)),
        other => other.clone(),
    }
}

/// Substitute every placeholder in `template`
pub fn render_str(template: &str, params: &SpecTable) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            params
                .get(&caps[1])
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_owned()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn params() -> SpecTable {
        let mut table = SpecTable::new();
        table.insert("name".into(), json!("HttpError"));
        table.insert("code".into(), json!(503));
        table.insert("flag".into(), json!(true));
        table
    }

    #[rstest]
    #[case("{{name}} aggregated error", "HttpError aggregated error")]
    #[case("{{name}}/{{name}}", "HttpError/HttpError")]
    #[case("status {{code}}", "status ")]
    #[case("{{flag}}{{missing}}!", "!")]
    #[case("no placeholders", "no placeholders")]
    #[case("{{ name }}", "{{ name }}")]
    fn test_render_str(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(render_str(template, &params()), expected);
    }

    #[test]
    fn test_non_string_is_identity() {
        let params = params();
        assert_eq!(render(&json!(42), &params), json!(42));
        assert_eq!(render(&json!({"a": "{{name}}"}), &params), json!({"a": "{{name}}"}));
        assert_eq!(render(&json!(null), &params), json!(null));
    }
}
