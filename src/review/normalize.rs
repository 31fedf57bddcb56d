//! Normalization of raw review payloads.
//!
//! The backend stores a submission's review either as a structured JSON
//! document or, for submissions that predate structured reviews, as a plain
//! markdown string. Some structured reviews were also stored as a JSON *string*.
//! [`normalize`] folds all of these into a [`ReviewPayload`] once, so rendering
//! code matches on two cases instead of probing types.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::types::AiReview;

/// A review as the client understands it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ReviewPayload {
    /// A structured review document.
    Structured(Box<AiReview>),
    /// Opaque legacy text, rendered as markdown.
    Legacy(String),
}

impl Default for ReviewPayload {
    fn default() -> Self {
        Self::Legacy(String::new())
    }
}

impl From<Value> for ReviewPayload {
    fn from(value: Value) -> Self {
        normalize(value)
    }
}

impl ReviewPayload {
    pub fn as_structured(&self) -> Option<&AiReview> {
        match self {
            Self::Structured(review) => Some(review),
            Self::Legacy(_) => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// True for a legacy payload with no text at all (no review generated yet).
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Legacy(text) if text.trim().is_empty())
    }
}

/// Normalize a raw review payload.
///
/// Rules, first match wins:
/// 1. A JSON object is a structured review. Fields that are missing, null or
///    of the wrong type take their empty defaults.
/// 2. A string that parses as JSON with a string-typed `verdict` is structured.
/// 3. Anything else is legacy text. Parse failures are not errors.
///
/// ```
/// use coderev::review::{normalize, ReviewPayload};
/// use serde_json::json;
///
/// let legacy = normalize(json!("**Looks fine** overall"));
/// assert_eq!(legacy, ReviewPayload::Legacy("**Looks fine** overall".into()));
///
/// let structured = normalize(json!({ "verdict": "Good", "overallScore": "8" }));
/// assert_eq!(structured.as_structured().unwrap().overall_score, 8.0);
/// ```
pub fn normalize(raw: Value) -> ReviewPayload {
    match raw {
        Value::Object(_) => structured(raw),
        Value::String(text) => normalize_str(text),
        Value::Null => ReviewPayload::Legacy(String::new()),
        other => ReviewPayload::Legacy(other.to_string()),
    }
}

/// Normalize a review that arrived as a string.
pub fn normalize_str(text: String) -> ReviewPayload {
    match serde_json::from_str::<Value>(&text) {
        Ok(parsed) if parsed.get("verdict").is_some_and(Value::is_string) => structured(parsed),
        Ok(_) => ReviewPayload::Legacy(text),
        Err(e) => {
            debug!(error = %e, "review string is not JSON, treating as legacy markdown");
            ReviewPayload::Legacy(text)
        }
    }
}

fn structured(object: Value) -> ReviewPayload {
    // Every AiReview field decodes leniently, so an object cannot fail here.
    let review = serde_json::from_value::<AiReview>(object).unwrap_or_else(|e| {
        debug!(error = %e, "review object did not decode, using an empty review");
        AiReview::default()
    });
    ReviewPayload::Structured(Box::new(review))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_review() -> Value {
        json!({
            "verdict": "Good",
            "overallScore": 8,
            "summary": "Solid",
            "categories": [{ "name": "Style", "score": 9, "issues": [] }],
            "refactoredCode": "x = 1",
            "testingSuggestions": []
        })
    }

    #[test]
    fn test_structured_object_is_returned_unchanged() {
        let raw = full_review();
        let expected: AiReview = serde_json::from_value(raw.clone()).unwrap();
        match normalize(raw) {
            ReviewPayload::Structured(review) => assert_eq!(*review, expected),
            other => panic!("Expected Structured, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_string_is_legacy() {
        let raw = json!("{ not json at all");
        assert_eq!(
            normalize(raw),
            ReviewPayload::Legacy("{ not json at all".into())
        );
    }

    #[test]
    fn test_json_string_without_verdict_is_legacy() {
        let text = r#"{"summary":"no verdict here","overallScore":5}"#;
        assert_eq!(
            normalize(Value::String(text.into())),
            ReviewPayload::Legacy(text.into())
        );
    }

    #[test]
    fn test_json_string_with_non_string_verdict_is_legacy() {
        let text = r#"{"verdict": 7}"#;
        assert_eq!(
            normalize_str(text.into()),
            ReviewPayload::Legacy(text.into())
        );
    }

    #[test]
    fn test_json_string_with_verdict_is_structured() {
        let text = full_review().to_string();
        let payload = normalize(Value::String(text));
        let review = payload.as_structured().expect("structured");
        assert_eq!(review.verdict, "Good");
        assert_eq!(review.categories[0].name, "Style");
    }

    #[test]
    fn test_json_array_string_is_legacy() {
        assert!(!normalize_str("[1,2,3]".into()).is_structured());
    }

    #[test]
    fn test_null_is_empty_legacy() {
        let payload = normalize(Value::Null);
        assert!(payload.is_empty());
        assert!(!payload.is_structured());
    }

    #[test]
    fn test_markdown_string_is_legacy() {
        let text = "## Review\n\n- Use `const`\n- Add tests";
        assert_eq!(
            normalize(json!(text)),
            ReviewPayload::Legacy(text.to_string())
        );
    }

    #[test]
    fn test_object_with_wrong_field_types_stays_structured() {
        let raw = json!({ "verdict": "Good", "categories": "oops" });
        let payload = normalize(raw);
        let review = payload.as_structured().expect("structured");
        assert_eq!(review.verdict, "Good");
        assert!(review.categories.is_empty());
    }

    #[test]
    fn test_object_with_null_categories_stays_structured() {
        let raw = json!({
            "verdict": "Good",
            "overallScore": 8,
            "summary": "ok",
            "categories": null
        });
        let payload = normalize(raw);
        let review = payload.as_structured().expect("structured");
        assert_eq!(review.overall_score, 8.0);
        assert_eq!(review.summary, "ok");
        assert!(review.categories.is_empty());
    }

    #[test]
    fn test_object_with_string_score_stays_structured() {
        let payload = normalize(json!({ "verdict": "Good", "overallScore": "8" }));
        assert_eq!(payload.as_structured().expect("structured").overall_score, 8.0);
    }

    #[test]
    fn test_object_without_verdict_is_structured() {
        let payload = normalize(json!({ "summary": "no verdict" }));
        let review = payload.as_structured().expect("structured");
        assert!(review.verdict.is_empty());
        assert_eq!(review.summary, "no verdict");
    }

    #[test]
    fn test_json_string_with_null_score_is_structured() {
        let payload = normalize_str(r#"{"verdict":"Good","overallScore":null}"#.into());
        let review = payload.as_structured().expect("structured");
        assert_eq!(review.verdict, "Good");
        assert_eq!(review.overall_score, 0.0);
    }

    #[test]
    fn test_deserializes_as_field() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(rename = "aiResponse", default)]
            ai_response: ReviewPayload,
        }

        let h: Holder = serde_json::from_value(json!({ "aiResponse": "plain" })).unwrap();
        assert_eq!(h.ai_response, ReviewPayload::Legacy("plain".into()));

        let h: Holder =
            serde_json::from_value(json!({ "aiResponse": { "verdict": "Bad" } })).unwrap();
        assert!(h.ai_response.is_structured());

        let h: Holder = serde_json::from_value(json!({})).unwrap();
        assert!(h.ai_response.is_empty());
    }
}
