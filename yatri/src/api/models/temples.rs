use crate::classifier::{ClassificationOutcome, ClassificationResult};
use serde::{Deserialize, Serialize};

/// Keys owned by the response envelope; classifier output may not override them
const RESERVED_KEYS: [&str; 3] = ["outcome", "error", "details"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Classified,
    Fallback,
}

/// Flat classification fields plus the outcome tag and, for fallbacks, diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempleInfoResponse {
    #[serde(flatten)]
    pub result: ClassificationResult,
    pub outcome: OutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<ClassificationOutcome> for TempleInfoResponse {
    fn from(outcome: ClassificationOutcome) -> Self {
        let (mut result, outcome, error, details) = match outcome {
            ClassificationOutcome::Classified(result) => (result, OutcomeKind::Classified, None, None),
            ClassificationOutcome::Fallback { result, reason } => {
                (result, OutcomeKind::Fallback, Some(reason.message()), reason.details())
            }
        };
        for key in RESERVED_KEYS {
            result.extra.remove(key);
        }

        Self {
            result,
            outcome,
            error,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::parse_output;
    use serde_json::json;

    #[test]
    fn test_classified_response_is_flat() {
        let result = parse_output(r#"{"location":"Hampi","dynasty":"Vijayanagara","style":"Dravidian","era":"14th century CE","caption":"Stone chariot","confidence":0.8,"error":"spoofed"}"#).unwrap();

        let body = serde_json::to_value(TempleInfoResponse::from(ClassificationOutcome::Classified(result))).unwrap();

        assert_eq!(
            body,
            json!({
                "location": "Hampi",
                "dynasty": "Vijayanagara",
                "style": "Dravidian",
                "era": "14th century CE",
                "caption": "Stone chariot",
                "confidence": 0.8,
                "outcome": "classified"
            })
        );
    }
}
