//! AI review model, normalization, classification and rendering.
//!
//! - [`types`]: the structured review document
//! - [`normalize`]: raw payload → [`ReviewPayload`]
//! - [`tiers`]: verdict and score tiers
//! - [`render`]: terminal rendering
//! - [`regenerate`]: author-only regeneration trigger

pub mod normalize;
pub mod regenerate;
pub mod render;
pub mod tiers;
pub mod types;

pub use normalize::{ReviewPayload, normalize, normalize_str};
pub use regenerate::{RegenerateOutcome, RegenerationTrigger, ReviewRegenerator};
pub use render::{RenderOptions, render_review};
pub use tiers::{ScoreTier, VerdictTier};
pub use types::{AiReview, IssueSeverity, ReviewCategory, ReviewIssue, TestPriority, TestSuggestion};
