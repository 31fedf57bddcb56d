//! REST API access: wire types, endpoint paths and the HTTP client.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{ApiClient, ApiClientConfig, Environment, Registration, Session};
pub use endpoints::PAGE_LIMIT;
pub use types::{
    CodeSubmission, Comment, CommentDraft, Envelope, FeedbackDraft, FeedbackPurpose, ListFilter,
    NewSubmission, Page, ProfileUpdate, UserProfile,
};
