//! The explicit validation contract for snippet payloads.
//!
//! Every field is checked independently and all violations are reported
//! together, keyed by field name. Client-supplied `owner` and `id`
//! values are ignored outright; unknown fields are skipped.
//!
//! Updates are partial-merge: a field absent from the payload keeps the
//! stored value, and the merged record is what gets validated.

use serde_json::{Map, Value};

use crate::error::FieldErrors;
use crate::highlight::{self, DEFAULT_LANGUAGE, DEFAULT_STYLE};
use crate::model::Snippet;

pub const MAX_TITLE_LEN: usize = 100;

/// A validated set of snippet field values, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetInput {
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: String,
    pub style: String,
}

pub fn validate_create(body: &Map<String, Value>) -> Result<SnippetInput, FieldErrors> {
    validate(body, None)
}

pub fn validate_update(
    body: &Map<String, Value>,
    current: &Snippet,
) -> Result<SnippetInput, FieldErrors> {
    validate(body, Some(current))
}

fn validate(
    body: &Map<String, Value>,
    current: Option<&Snippet>,
) -> Result<SnippetInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = match string_field(body, "title", &mut errors) {
        Some(title) => {
            if title.chars().count() > MAX_TITLE_LEN {
                fail(
                    &mut errors,
                    "title",
                    &format!(
                        "ensure this field has no more than {} characters.",
                        MAX_TITLE_LEN
                    ),
                );
            }
            title
        }
        None => current.map(|s| s.title.clone()).unwrap_or_default(),
    };

    let code = match string_field(body, "code", &mut errors) {
        Some(code) => code,
        None => match current {
            Some(snippet) => snippet.code.clone(),
            None => {
                if !errors.contains_key("code") {
                    fail(&mut errors, "code", "this field is required.");
                }
                String::new()
            }
        },
    };

    let linenos = match body.get("linenos") {
        None | Some(Value::Null) => current.map(|s| s.linenos).unwrap_or(false),
        Some(value) => match coerce_bool(value) {
            Some(linenos) => linenos,
            None => {
                fail(&mut errors, "linenos", "must be a valid boolean.");
                false
            }
        },
    };

    let language = match string_field(body, "language", &mut errors) {
        Some(language) => {
            if !highlight::is_language(&language) {
                fail(
                    &mut errors,
                    "language",
                    &format!("\"{}\" is not a valid choice.", language),
                );
            }
            language
        }
        None => current
            .map(|s| s.language.clone())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
    };

    let style = match string_field(body, "style", &mut errors) {
        Some(style) => {
            if !highlight::is_style(&style) {
                fail(
                    &mut errors,
                    "style",
                    &format!("\"{}\" is not a valid choice.", style),
                );
            }
            style
        }
        None => current
            .map(|s| s.style.clone())
            .unwrap_or_else(|| DEFAULT_STYLE.to_string()),
    };

    if errors.is_empty() {
        Ok(SnippetInput {
            title,
            code,
            linenos,
            language,
            style,
        })
    } else {
        Err(errors)
    }
}

fn fail(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Returns the field as a string if present, recording a type error and
/// returning None for non-string values. Null counts as absent.
fn string_field(body: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            fail(errors, field, "not a valid string.");
            None
        }
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn stored() -> Snippet {
        Snippet {
            id: 7,
            title: "stored title".to_string(),
            code: "x = 1".to_string(),
            linenos: true,
            language: "rust".to_string(),
            style: "mocha".to_string(),
            owner_id: 1,
            owner: "amy".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let input = validate_create(&body(json!({ "code": "x = 1" }))).unwrap();
        assert_eq!(input.title, "");
        assert_eq!(input.code, "x = 1");
        assert!(!input.linenos);
        assert_eq!(input.language, "python");
        assert_eq!(input.style, "friendly");
    }

    #[test]
    fn test_create_requires_code() {
        let errors = validate_create(&body(json!({ "title": "no code" }))).unwrap_err();
        assert_eq!(errors["code"], vec!["this field is required."]);
    }

    #[test]
    fn test_empty_code_is_permitted() {
        let input = validate_create(&body(json!({ "code": "" }))).unwrap();
        assert_eq!(input.code, "");
    }

    #[test]
    fn test_title_length_bound() {
        let long = "x".repeat(101);
        let errors = validate_create(&body(json!({ "code": "c", "title": long }))).unwrap_err();
        assert!(errors["title"][0].contains("no more than 100"));

        let exactly = "x".repeat(100);
        assert!(validate_create(&body(json!({ "code": "c", "title": exactly }))).is_ok());
    }

    #[test]
    fn test_bad_language_and_style_reported_together() {
        let errors = validate_create(&body(json!({
            "code": "c",
            "language": "klingon",
            "style": "neon"
        })))
        .unwrap_err();
        assert!(errors["language"][0].contains("klingon"));
        assert!(errors["style"][0].contains("neon"));
    }

    #[test]
    fn test_linenos_coercion() {
        for (raw, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("true"), true),
            (json!("False"), false),
        ] {
            let input = validate_create(&body(json!({ "code": "c", "linenos": raw }))).unwrap();
            assert_eq!(input.linenos, expected);
        }

        let errors =
            validate_create(&body(json!({ "code": "c", "linenos": "maybe" }))).unwrap_err();
        assert_eq!(errors["linenos"], vec!["must be a valid boolean."]);
    }

    #[test]
    fn test_client_supplied_owner_is_ignored() {
        let input =
            validate_create(&body(json!({ "code": "c", "owner": "mallory", "id": 999 }))).unwrap();
        assert_eq!(input.code, "c");
    }

    #[test]
    fn test_update_merges_with_stored_values() {
        let input = validate_update(&body(json!({ "title": "new title" })), &stored()).unwrap();
        assert_eq!(input.title, "new title");
        assert_eq!(input.code, "x = 1");
        assert!(input.linenos);
        assert_eq!(input.language, "rust");
        assert_eq!(input.style, "mocha");
    }

    #[test]
    fn test_update_still_validates_supplied_fields() {
        let errors = validate_update(&body(json!({ "language": "cobol" })), &stored()).unwrap_err();
        assert!(errors["language"][0].contains("cobol"));
    }

    #[test]
    fn test_non_string_title_is_a_type_error() {
        let errors = validate_create(&body(json!({ "code": "c", "title": 5 }))).unwrap_err();
        assert_eq!(errors["title"], vec!["not a valid string."]);
    }
}
