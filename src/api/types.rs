//! Wire types for the Code Rev REST API.
//!
//! Every response is wrapped in an [`Envelope`]. Field names follow the
//! backend's JSON (camelCase, Mongo-style `_id`).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::review::ReviewPayload;

/// Standard response envelope: `{ message, data, success, totalPages? }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    /// Present on login responses only.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl<T> Envelope<T> {
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Accepts a string, a number, or null, yielding a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
        Null,
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Null => String::new(),
    })
}

/// Accepts either a tag list or a single (possibly comma-separated) string.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        One(String),
        Null,
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::List(tags) => tags,
        Raw::One(s) => split_tags(&s),
        Raw::Null => Vec::new(),
    })
}

/// A document reference the backend may leave unpopulated as a bare `_id`.
trait FromId {
    fn from_id(id: String) -> Self;
}

/// Accepts a populated object, a bare id string, or null.
fn id_or_record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromId,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => Some(T::from_id(id)),
        Value::Null => None,
        other => match serde_json::from_value(other) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "ignoring undecodable reference");
                None
            }
        },
    })
}

/// Accepts a list of populated objects or bare ids, skipping entries that
/// decode as neither. Null is an empty list.
fn id_or_record_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromId,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(T::from_id(id)),
            other => serde_json::from_value(other)
                .inspect_err(|e| debug!(error = %e, "skipping undecodable list entry"))
                .ok(),
        })
        .collect())
}

/// Split a comma-separated tag string into trimmed, non-empty tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// The signed-in user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl UserProfile {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Name for display, falling back to email, then a placeholder.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("(unnamed)")
    }
}

/// Author or reviewer reference embedded in submissions and comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub profile_picture: String,
}

impl FromId for Author {
    fn from_id(id: String) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }
}

/// A like on a submission: a bare user id, or an object naming the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LikeRef {
    UserId(String),
    Record {
        #[serde(rename = "userId", default)]
        user_id: Option<String>,
        #[serde(rename = "_id", default)]
        id: Option<String>,
    },
}

impl LikeRef {
    /// The liking user's id.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::UserId(id) => Some(id),
            Self::Record { user_id, id } => user_id.as_deref().or(id.as_deref()),
        }
    }
}

/// Whether `user_id` appears among `likes`.
pub fn liked_by(likes: &[LikeRef], user_id: &str) -> bool {
    likes.iter().any(|l| l.user_id() == Some(user_id))
}

/// A peer comment with a 1-5 rating.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "reviewerId", deserialize_with = "id_or_record")]
    pub reviewer: Option<Author>,
    pub comment: String,
    #[serde(deserialize_with = "string_or_number")]
    pub rating: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Populated on "my comments" listings.
    #[serde(rename = "submissionId", deserialize_with = "id_or_record")]
    pub submission: Option<SubmissionRef>,
}

impl FromId for Comment {
    fn from_id(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Minimal reference to the submission a comment belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

impl FromId for SubmissionRef {
    fn from_id(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// A code submission as returned by the fetch and list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeSubmission {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: String,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    pub status: String,
    #[serde(alias = "visivility")]
    pub visibility: String,
    pub likes: Vec<LikeRef>,
    /// Populated comments on detail views; bare ids on listings.
    #[serde(deserialize_with = "id_or_record_list")]
    pub reviews: Vec<Comment>,
    #[serde(rename = "authorId", deserialize_with = "id_or_record")]
    pub author: Option<Author>,
    pub created_at: Option<DateTime<Utc>>,
    pub ai_response: ReviewPayload,
}

impl CodeSubmission {
    /// True when `viewer_id` wrote this submission.
    pub fn is_authored_by(&self, viewer_id: Option<&str>) -> bool {
        match (self.author.as_ref().and_then(|a| a.id.as_deref()), viewer_id) {
            (Some(author), Some(viewer)) => author == viewer,
            _ => false,
        }
    }

    pub fn liked_by(&self, user_id: Option<&str>) -> bool {
        user_id.is_some_and(|id| liked_by(&self.likes, id))
    }

    /// Average peer rating, if any comment carries a numeric rating.
    pub fn average_rating(&self) -> Option<f64> {
        let ratings: Vec<f64> = self
            .reviews
            .iter()
            .filter_map(|r| r.rating.trim().parse::<f64>().ok())
            .collect();
        if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        }
    }
}

/// Moderation status chosen at submission time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Body of `code/create` and `code/update/{slug}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewSubmission {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub status: SubmissionStatus,
    pub language: String,
    pub visibility: Visibility,
    pub code: String,
}

impl NewSubmission {
    /// Pre-fill an edit draft from an existing submission.
    pub fn from_submission(s: &CodeSubmission) -> Self {
        Self {
            title: s.title.clone(),
            description: s.description.clone(),
            tags: s.tags.clone(),
            status: match s.status.as_str() {
                "approved" => SubmissionStatus::Approved,
                "rejected" => SubmissionStatus::Rejected,
                _ => SubmissionStatus::Pending,
            },
            language: s.language.clone(),
            visibility: if s.visibility == "private" {
                Visibility::Private
            } else {
                Visibility::Public
            },
            code: s.code.clone(),
        }
    }

    /// Names of required fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.language.trim().is_empty() {
            missing.push("language");
        }
        if self.code.trim().is_empty() {
            missing.push("code");
        }
        missing
    }
}

/// Body of the comment endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentDraft {
    pub comment: String,
    /// Sent as a string, as the backend stores it.
    pub rating: String,
}

impl CommentDraft {
    /// Build a draft, rejecting ratings outside 1-5 and blank comments.
    pub fn new(comment: impl Into<String>, rating: u8) -> Result<Self, String> {
        let comment = comment.into();
        if comment.trim().is_empty() {
            return Err("Comment cannot be empty".to_string());
        }
        if !(1..=5).contains(&rating) {
            return Err(format!("Rating must be between 1 and 5, got {}", rating));
        }
        Ok(Self {
            comment,
            rating: rating.to_string(),
        })
    }
}

/// Reason for contacting the team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackPurpose {
    BugReport,
    FeatureRequest,
    #[default]
    GeneralFeedback,
    Other,
}

impl FeedbackPurpose {
    pub const ALL: [FeedbackPurpose; 4] = [
        Self::BugReport,
        Self::FeatureRequest,
        Self::GeneralFeedback,
        Self::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::BugReport => "Report a Bug",
            Self::FeatureRequest => "Request a Feature",
            Self::GeneralFeedback => "General Feedback",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackDraft {
    pub purpose: FeedbackPurpose,
    pub message: String,
}

/// Body of `user/update`; unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of `auth/google`: the ID token issued by Google sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Default)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Client-side filter applied to a listing page.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub language: Option<String>,
    pub tag: Option<String>,
}

impl ListFilter {
    /// Exact language match; tag match against the lowercased tag.
    pub fn matches(&self, code: &CodeSubmission) -> bool {
        let language_ok = self
            .language
            .as_deref()
            .is_none_or(|lang| lang.is_empty() || code.language == lang);
        let tag_ok = self.tag.as_deref().is_none_or(|tag| {
            tag.is_empty() || code.tags.iter().any(|t| *t == tag.to_lowercase())
        });
        language_ok && tag_ok
    }

    pub fn apply<'a>(&self, codes: &'a [CodeSubmission]) -> Vec<&'a CodeSubmission> {
        codes.iter().filter(|c| self.matches(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_with_pagination() {
        let env: Envelope<Vec<CodeSubmission>> = serde_json::from_value(json!({
            "message": "ok",
            "success": true,
            "totalPages": 3,
            "data": [{ "_id": "1", "slug": "hello", "title": "Hello" }]
        }))
        .unwrap();
        assert_eq!(env.total_pages, Some(3));
        assert_eq!(env.data.unwrap()[0].slug, "hello");
    }

    #[test]
    fn test_envelope_without_data() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_value(json!({ "message": "Deleted" })).unwrap();
        assert_eq!(env.message(), Some("Deleted"));
        assert!(env.data.is_none());
    }

    #[test]
    fn test_submission_full_shape() {
        let s: CodeSubmission = serde_json::from_value(json!({
            "_id": "c1",
            "slug": "quick-sort",
            "title": "Quick sort",
            "language": "Python",
            "tags": ["sorting"],
            "likes": ["u1", { "userId": "u2" }],
            "reviews": [
                { "_id": "r1", "comment": "Nice", "rating": "4",
                  "reviewerId": { "_id": "u3", "name": "Sam" } },
                { "_id": "r2", "comment": "Meh", "rating": 2 }
            ],
            "authorId": { "_id": "u1", "name": "Ada", "email": "ada@example.com" },
            "createdAt": "2025-03-05T10:00:00.000Z",
            "aiResponse": "Legacy text"
        }))
        .unwrap();
        assert_eq!(s.likes.len(), 2);
        assert!(s.liked_by(Some("u2")));
        assert!(!s.liked_by(Some("u9")));
        assert!(!s.liked_by(None));
        assert!(s.is_authored_by(Some("u1")));
        assert!(!s.is_authored_by(Some("u2")));
        assert!(!s.is_authored_by(None));
        assert_eq!(s.reviews[1].rating, "2");
        assert_eq!(s.average_rating(), Some(3.0));
        assert!(s.created_at.is_some());
        assert!(!s.ai_response.is_structured());
    }

    #[test]
    fn test_submission_tags_from_string_and_misspelled_visibility() {
        let s: CodeSubmission = serde_json::from_value(json!({
            "tags": "bugfix, sorting",
            "visivility": "private"
        }))
        .unwrap();
        assert_eq!(s.tags, vec!["bugfix", "sorting"]);
        assert_eq!(s.visibility, "private");
    }

    #[test]
    fn test_comment_with_null_reviewer() {
        let c: Comment = serde_json::from_value(json!({
            "_id": "r1", "comment": "hi", "rating": null, "reviewerId": null
        }))
        .unwrap();
        assert!(c.reviewer.is_none());
        assert_eq!(c.rating, "");
    }

    #[test]
    fn test_listing_with_unpopulated_references() {
        let env: Envelope<Vec<CodeSubmission>> = serde_json::from_value(json!({
            "totalPages": 1,
            "data": [{
                "_id": "c1",
                "slug": "quick-sort",
                "title": "Quick sort",
                "authorId": "u1",
                "reviews": ["r1", { "_id": "r2", "rating": 5 }, 42],
                "likes": []
            }]
        }))
        .unwrap();
        let s = &env.data.unwrap()[0];
        assert!(s.is_authored_by(Some("u1")));
        assert_eq!(s.author.as_ref().unwrap().name, "");
        let ids: Vec<&str> = s.reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(s.average_rating(), Some(5.0));
    }

    #[test]
    fn test_comment_with_bare_submission_and_reviewer_ids() {
        let c: Comment = serde_json::from_value(json!({
            "_id": "r1", "comment": "hi", "rating": "3",
            "reviewerId": "u2", "submissionId": "c1"
        }))
        .unwrap();
        assert_eq!(c.reviewer.unwrap().id.as_deref(), Some("u2"));
        let submission = c.submission.unwrap();
        assert_eq!(submission.id, "c1");
        assert!(submission.title.is_empty());
    }

    #[test]
    fn test_null_reviews_are_empty() {
        let s: CodeSubmission =
            serde_json::from_value(json!({ "_id": "c1", "reviews": null, "authorId": null }))
                .unwrap();
        assert!(s.reviews.is_empty());
        assert!(s.author.is_none());
    }

    #[test]
    fn test_user_profile_roundtrip_uses_mongo_id() {
        let user: UserProfile = serde_json::from_value(json!({
            "_id": "u1", "name": "Ada", "profilePicture": "p.png"
        }))
        .unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["_id"], "u1");
        assert_eq!(back["profilePicture"], "p.png");
        assert!(back.get("gender").is_none());
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(UserProfile::named("Ada").display_name(), "Ada");
        let by_email = UserProfile {
            email: Some("a@x.io".into()),
            ..Default::default()
        };
        assert_eq!(by_email.display_name(), "a@x.io");
        assert_eq!(UserProfile::default().display_name(), "(unnamed)");
    }

    #[test]
    fn test_comment_draft_validation() {
        assert!(CommentDraft::new("Great", 5).is_ok());
        assert_eq!(CommentDraft::new("Great", 3).unwrap().rating, "3");
        assert!(CommentDraft::new("Great", 0).is_err());
        assert!(CommentDraft::new("Great", 6).is_err());
        assert!(CommentDraft::new("   ", 3).is_err());
    }

    #[test]
    fn test_submission_draft_serializes_lowercase_enums() {
        let draft = NewSubmission {
            title: "t".into(),
            language: "Rust".into(),
            code: "fn main() {}".into(),
            visibility: Visibility::Private,
            status: SubmissionStatus::Pending,
            ..Default::default()
        };
        let v = serde_json::to_value(&draft).unwrap();
        assert_eq!(v["visibility"], "private");
        assert_eq!(v["status"], "pending");
        assert!(draft.missing_fields().is_empty());
    }

    #[test]
    fn test_submission_draft_reports_missing_fields() {
        let draft = NewSubmission::default();
        assert_eq!(draft.missing_fields(), vec!["title", "language", "code"]);
    }

    #[test]
    fn test_draft_prefill_from_submission() {
        let s: CodeSubmission = serde_json::from_value(json!({
            "title": "T", "code": "x", "language": "Go",
            "status": "approved", "visibility": "private", "tags": ["algorithm"]
        }))
        .unwrap();
        let d = NewSubmission::from_submission(&s);
        assert_eq!(d.status, SubmissionStatus::Approved);
        assert_eq!(d.visibility, Visibility::Private);
        assert_eq!(d.tags, vec!["algorithm"]);
    }

    #[test]
    fn test_profile_changes_only_sends_set_fields() {
        let changes = ProfileUpdate {
            about: Some("Rustacean".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&changes).unwrap();
        assert_eq!(v, json!({ "about": "Rustacean" }));
        assert!(!changes.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_feedback_purpose_wire_names() {
        let draft = FeedbackDraft {
            purpose: FeedbackPurpose::BugReport,
            message: "Crash on submit".into(),
        };
        let v = serde_json::to_value(&draft).unwrap();
        assert_eq!(v["purpose"], "bug_report");
        assert_eq!(FeedbackPurpose::FeatureRequest.label(), "Request a Feature");
    }

    #[test]
    fn test_list_filter() {
        let codes: Vec<CodeSubmission> = serde_json::from_value(json!([
            { "title": "a", "language": "Python", "tags": ["sorting"] },
            { "title": "b", "language": "Go", "tags": ["bugfix"] },
            { "title": "c", "language": "Python", "tags": ["bugfix"] }
        ]))
        .unwrap();

        let all = ListFilter::default().apply(&codes);
        assert_eq!(all.len(), 3);

        let python = ListFilter {
            language: Some("Python".into()),
            tag: None,
        };
        assert_eq!(python.apply(&codes).len(), 2);

        let python_bugfix = ListFilter {
            language: Some("Python".into()),
            tag: Some("BugFix".into()),
        };
        let hits = python_bugfix.apply(&codes);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "c");
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::<u8> {
            items: vec![],
            page: 1,
            total_pages: 2,
        };
        assert!(page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(" a, ,b ,"), vec!["a", "b"]);
    }
}
