//! AI review data model.
//!
//! These types mirror the structured review document produced by the backend's
//! review service. Wire names are camelCase.
//!
//! ## Types
//!
//! - [`IssueSeverity`]: Severity classification for individual issues
//! - [`TestPriority`]: Priority of a suggested test
//! - [`ReviewIssue`]: A single identified problem with a suggestion
//! - [`ReviewCategory`]: A scored review dimension with its issues
//! - [`TestSuggestion`]: A test the reviewer recommends adding
//! - [`AiReview`]: The complete structured review
//!
//! Every field is optional on the wire. Missing, null or mistyped values fall
//! back to empty strings, empty collections or zero, so any JSON object
//! decodes as a review and rendering never has to guess.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A string, or empty for anything else.
fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// A non-null string, or `None`.
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// A number or numeric string; zero for anything else.
fn score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

/// An array of `T`, dropping entries that do not decode. Non-arrays are empty.
fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Severity level for an issue.
///
/// Severities are ordered from most to least critical. Unknown strings
/// deserialize as [`IssueSeverity::Info`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum IssueSeverity {
    /// Must be fixed; usually a correctness or security problem.
    Critical,
    /// Should be addressed.
    Warning,
    /// Informational observation.
    #[default]
    Info,
}

impl From<String> for IssueSeverity {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "critical" => Self::Critical,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }
}

impl From<Value> for IssueSeverity {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => s.into(),
            _ => Self::default(),
        }
    }
}

impl IssueSeverity {
    /// Check if this severity is critical.
    ///
    /// # Examples
    ///
    /// ```
    /// use coderev::review::IssueSeverity;
    ///
    /// assert!(IssueSeverity::Critical.is_critical());
    /// assert!(!IssueSeverity::Warning.is_critical());
    /// ```
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }

    /// Get the emoji indicator for this severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Critical => "🔴",
            Self::Warning => "🟡",
            Self::Info => "🔵",
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        write!(f, "{}", s)
    }
}

/// Priority of a suggested test. Unknown strings deserialize as `Low`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum TestPriority {
    High,
    Medium,
    #[default]
    Low,
}

impl From<String> for TestPriority {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl From<Value> for TestPriority {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => s.into(),
            _ => Self::default(),
        }
    }
}

impl fmt::Display for TestPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        write!(f, "{}", s)
    }
}

/// A single issue found by the reviewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewIssue {
    pub severity: IssueSeverity,
    #[serde(deserialize_with = "text")]
    pub title: String,
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Suggested fix; empty when the reviewer offered none.
    #[serde(deserialize_with = "text")]
    pub suggestion: String,
    /// Code illustrating the fix; empty when absent.
    #[serde(deserialize_with = "text")]
    pub code_snippet: String,
}

/// A scored review dimension (e.g. "Security", "Readability").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewCategory {
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Score on a 0-10 scale.
    #[serde(deserialize_with = "score")]
    pub score: f64,
    #[serde(deserialize_with = "list")]
    pub issues: Vec<ReviewIssue>,
}

impl ReviewCategory {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// "1 issue" / "3 issues".
    pub fn issue_label(&self) -> String {
        let n = self.issues.len();
        format!("{} issue{}", n, if n == 1 { "" } else { "s" })
    }
}

/// A test the reviewer recommends writing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestSuggestion {
    #[serde(deserialize_with = "text")]
    pub test_name: String,
    #[serde(deserialize_with = "text")]
    pub description: String,
    pub priority: TestPriority,
}

/// A structured AI review.
///
/// ```
/// use coderev::review::AiReview;
///
/// let review: AiReview = serde_json::from_value(serde_json::json!({
///     "verdict": "Good",
///     "overallScore": 8.5,
///     "summary": "Clean code",
/// }))
/// .unwrap();
/// assert_eq!(review.overall_score, 8.5);
/// assert!(review.categories.is_empty());
/// assert!(review.refactored().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiReview {
    #[serde(default, deserialize_with = "text")]
    pub verdict: String,
    #[serde(default, deserialize_with = "score")]
    pub overall_score: f64,
    #[serde(default, deserialize_with = "text")]
    pub summary: String,
    #[serde(default, deserialize_with = "list")]
    pub categories: Vec<ReviewCategory>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub refactored_code: Option<String>,
    #[serde(default, deserialize_with = "list")]
    pub testing_suggestions: Vec<TestSuggestion>,
}

impl AiReview {
    /// The refactored code block, if the reviewer produced a non-blank one.
    pub fn refactored(&self) -> Option<&str> {
        self.refactored_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
    }

    /// Total number of issues across all categories.
    pub fn issue_count(&self) -> usize {
        self.categories.iter().map(|c| c.issues.len()).sum()
    }

    /// Number of issues with the given severity across all categories.
    pub fn count_by_severity(&self, severity: IssueSeverity) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.issues.iter())
            .filter(|i| i.severity == severity)
            .count()
    }
}
