//! Extraction of the classification result from the classifier's standard output.
//!
//! The classifier prints progress and warnings around its JSON result, so the greedy span from the
//! first `{` to the last `}` is tried first, then the whole trimmed output. Any JSON object is
//! accepted: known keys holding strings fill the typed fields, everything else is kept as-is in
//! [`ClassificationResult::extra`].

use once_cell::sync::OnceCell;
use regex_lite::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use super::ClassificationResult;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("output is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("output is valid JSON but not an object")]
    NotAnObject,
}

fn json_object_span() -> &'static Regex {
    static JSON_OBJECT_RE: OnceCell<Regex> = OnceCell::new();
    JSON_OBJECT_RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid json object regex"))
}

/// Move `key` out of `object` if it holds a string. Other values stay where they are.
fn take_string(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        Some(Value::String(_)) => match object.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Parse classifier stdout into a [`ClassificationResult`].
pub fn parse_output(stdout: &str) -> Result<ClassificationResult, ParseError> {
    let embedded = json_object_span()
        .find(stdout)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok());

    let value = match embedded {
        Some(value) => value,
        None => serde_json::from_str::<Value>(stdout.trim()).map_err(ParseError::InvalidJson)?,
    };

    let Value::Object(mut object) = value else {
        return Err(ParseError::NotAnObject);
    };

    let caption_source = match take_string(&mut object, "caption_source") {
        Some(source) => Some(source),
        None => take_string(&mut object, "captionSource"),
    };

    Ok(ClassificationResult {
        location: take_string(&mut object, "location"),
        dynasty: take_string(&mut object, "dynasty"),
        style: take_string(&mut object, "style"),
        era: take_string(&mut object, "era"),
        caption: take_string(&mut object, "caption"),
        caption_source,
        extra: object,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_object_ignores_surrounding_text() {
        let stdout = r#"noise {"location":"Beluru","dynasty":"Hoysala","style":"x","era":"y","caption":"z"} trailing"#;

        let result = parse_output(stdout).unwrap();

        assert_eq!(result.location.as_deref(), Some("Beluru"));
        assert_eq!(result.dynasty.as_deref(), Some("Hoysala"));
        assert_eq!(result.style.as_deref(), Some("x"));
        assert_eq!(result.era.as_deref(), Some("y"));
        assert_eq!(result.caption.as_deref(), Some("z"));
        assert_eq!(result.caption_source, None);
        assert!(result.extra.is_empty());
    }

    #[test]
    fn test_multiline_output_with_log_lines() {
        let stdout = "Loading model from ai-model/trained_model\nPredicted class: 3\n{\n  \"location\": \"Halebidu\",\n  \"dynasty\": \"Hoysala\",\n  \"style\": \"Hoysala architecture\",\n  \"era\": \"12th century CE\",\n  \"caption\": \"Hoysaleswara temple\",\n  \"caption_source\": \"BLIP\"\n}\n";

        let result = parse_output(stdout).unwrap();

        assert_eq!(result.location.as_deref(), Some("Halebidu"));
        assert_eq!(result.caption_source.as_deref(), Some("BLIP"));
    }

    #[test]
    fn test_extra_fields_are_preserved() {
        let stdout = r#"{"location":"Hampi","dynasty":"Vijayanagara","style":"Dravidian","era":"14th century CE","caption":"c","confidence":0.93}"#;

        let result = parse_output(stdout).unwrap();

        assert_eq!(result.extra.get("confidence"), Some(&json!(0.93)));
        let round_tripped = serde_json::to_value(&result).unwrap();
        assert_eq!(round_tripped["confidence"], json!(0.93));
    }

    #[test]
    fn test_camel_case_caption_source_accepted() {
        let result = parse_output(r#"{"captionSource":"Predefined"}"#).unwrap();
        assert_eq!(result.caption_source.as_deref(), Some("Predefined"));
    }

    #[test]
    fn test_plain_error_text_fails() {
        let err = parse_output("ERROR: model failed").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_empty_output_fails() {
        assert!(matches!(parse_output("").unwrap_err(), ParseError::InvalidJson(_)));
        assert!(matches!(parse_output("   \n").unwrap_err(), ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_non_object_json_fails() {
        assert!(matches!(parse_output("[1, 2, 3]").unwrap_err(), ParseError::NotAnObject));
        assert!(matches!(parse_output("\"Beluru\"").unwrap_err(), ParseError::NotAnObject));
        assert!(matches!(parse_output("null").unwrap_err(), ParseError::NotAnObject));
    }

    #[test]
    fn test_broken_embedded_object_falls_back_to_whole_output() {
        // The greedy brace span is not valid JSON, and neither is the whole output
        let err = parse_output("{ not json } and {\"location\": \"Belur\"").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn test_non_string_fields_are_kept_verbatim() {
        let stdout = r#"{"location":"Hampi","dynasty":"Vijayanagara","style":"Dravidian","era":1509,"caption":"c"}"#;

        let result = parse_output(stdout).unwrap();

        assert_eq!(result.location.as_deref(), Some("Hampi"));
        assert_eq!(result.era, None);
        assert_eq!(result.extra.get("era"), Some(&json!(1509)));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"location":"Hampi","dynasty":"Vijayanagara","style":"Dravidian","era":1509,"caption":"c"})
        );
    }

    #[test]
    fn test_result_serializes_to_embedded_object() {
        let embedded = json!({"location":"Beluru","dynasty":"Hoysala","style":"x","era":"y","caption":"z"});
        let stdout = format!("noise {embedded} trailing");

        let result = parse_output(&stdout).unwrap();

        assert_eq!(serde_json::to_value(&result).unwrap(), embedded);
    }
}
