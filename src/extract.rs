//! Recovers a JSON object from a model completion that may wrap it in prose.

use serde_json::{Map, Value};

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ExtractionError {
    #[error("Nu am putut extrage JSON din răspunsul AI.")]
    NoJsonObject,
    #[error("Nu am putut genera quiz-ul. Răspuns invalid de la AI.")]
    InvalidJson(String),
}

// ── Public types ─────────────────────────────────────────────────────────────

/// What to do when no JSON object can be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Degrade to the raw completion text. Never fails.
    Lenient,
    /// Report an [`ExtractionError`].
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Object(Map<String, Value>),
    RawText(String),
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Single-pass extraction. `raw` is the completion text, already joined and
/// trimmed.
pub fn extract_json_or_fallback(
    raw: &str,
    mode: ExtractMode,
) -> Result<Extracted, ExtractionError> {
    match locate_json_object(raw) {
        Ok(object) => Ok(Extracted::Object(object)),
        Err(err) => match mode {
            ExtractMode::Lenient => {
                tracing::debug!(error = %err, "no JSON object in completion, using raw text");
                Ok(Extracted::RawText(raw.to_string()))
            }
            ExtractMode::Strict => {
                let reason = match &err {
                    ExtractionError::NoJsonObject => "no brace-delimited span",
                    ExtractionError::InvalidJson(reason) => reason.as_str(),
                };
                tracing::warn!(%reason, completion = %raw, "no JSON object in completion");
                Err(err)
            }
        },
    }
}

// ── Scanner ──────────────────────────────────────────────────────────────────

/// Slices from the first `{` to the last `}` and parses that as an object.
///
/// Purely positional: braces inside string literals or in surrounding prose
/// are not accounted for, so stray braces outside the payload make the slice
/// unparsable.
pub fn locate_json_object(raw: &str) -> Result<Map<String, Value>, ExtractionError> {
    let (start, end) = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(ExtractionError::NoJsonObject),
    };

    // Both braces are ASCII, so the byte slice sits on char boundaries.
    let candidate = &raw[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(ExtractionError::InvalidJson(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ExtractionError::InvalidJson(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Field helpers ────────────────────────────────────────────────────────────

/// Reads a string field, `None` when absent or not a string.
pub fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPED: &str = "Sure, here is the result:\n{\"a\": \"alpha\", \"b\": 2}\nLet me know if you need more.";

    fn object(extracted: Extracted) -> Map<String, Value> {
        match extracted {
            Extracted::Object(o) => o,
            Extracted::RawText(t) => panic!("expected object, got raw text {t:?}"),
        }
    }

    #[test]
    fn both_modes_recover_object_wrapped_in_prose() {
        for mode in [ExtractMode::Lenient, ExtractMode::Strict] {
            let o = object(extract_json_or_fallback(WRAPPED, mode).unwrap());
            assert_eq!(o["a"], "alpha");
            assert_eq!(o["b"], 2);
        }
    }

    #[test]
    fn no_braces_lenient_returns_raw_text_verbatim() {
        let raw = "Textul din imagine este: Salut lume";
        assert_eq!(
            extract_json_or_fallback(raw, ExtractMode::Lenient).unwrap(),
            Extracted::RawText(raw.to_string())
        );
    }

    #[test]
    fn no_braces_strict_fails() {
        assert_eq!(
            extract_json_or_fallback("just prose", ExtractMode::Strict),
            Err(ExtractionError::NoJsonObject)
        );
    }

    #[test]
    fn truncated_object_behaves_like_no_json() {
        let raw = "{\"a\": \"alpha\", \"b\": [1, 2}";
        assert_eq!(
            extract_json_or_fallback(raw, ExtractMode::Lenient).unwrap(),
            Extracted::RawText(raw.to_string())
        );
        assert!(matches!(
            extract_json_or_fallback(raw, ExtractMode::Strict),
            Err(ExtractionError::InvalidJson(_))
        ));
    }

    #[test]
    fn closing_brace_before_opening_is_not_a_match() {
        assert_eq!(locate_json_object("} backwards {"), Err(ExtractionError::NoJsonObject));
    }

    #[test]
    fn stray_brace_in_prose_breaks_the_slice() {
        // Known limitation of the positional scan.
        let raw = "Use {placeholders} like this: {\"a\": 1}";
        assert!(matches!(locate_json_object(raw), Err(ExtractionError::InvalidJson(_))));
    }

    #[test]
    fn braces_inside_strings_are_fine_when_outermost_pair_is_the_object() {
        let o = locate_json_object("x {\"a\": \"{nested}\"} y").unwrap();
        assert_eq!(str_field(&o, "a"), Some("{nested}"));
    }

    #[test]
    fn non_ascii_prose_around_object() {
        let o = locate_json_object("Iată rezultatul: {\"a\": \"ăîșț\"} mulțumesc").unwrap();
        assert_eq!(str_field(&o, "a"), Some("ăîșț"));
    }

    #[test]
    fn str_field_ignores_non_strings() {
        let o = locate_json_object("{\"a\": 1, \"b\": \"x\"}").unwrap();
        assert_eq!(str_field(&o, "a"), None);
        assert_eq!(str_field(&o, "b"), Some("x"));
        assert_eq!(str_field(&o, "missing"), None);
    }
}
