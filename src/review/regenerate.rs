//! Author-only review regeneration.
//!
//! Regeneration is trigger-and-refetch: the trigger asks the backend to
//! rebuild the review and reports the outcome, and the caller refetches the
//! whole submission. The trigger never builds a review locally.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::errors::ApiError;

const REGENERATED: &str = "Review regenerated successfully!";
const REGENERATE_FAILED: &str = "Failed to regenerate review";

/// Backend capable of regenerating a submission's review.
#[async_trait]
pub trait ReviewRegenerator: Send + Sync {
    /// Request regeneration for `slug`; returns the server's message, if any.
    async fn regenerate(&self, slug: &str) -> Result<Option<String>, ApiError>;
}

/// Result of pulling the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegenerateOutcome {
    /// The backend rebuilt the review; refetch the submission.
    Regenerated { message: String },
    /// The backend rejected the request.
    Failed { message: String },
    /// A regeneration was already in flight; nothing was sent.
    Ignored,
}

impl RegenerateOutcome {
    pub fn needs_refetch(&self) -> bool {
        matches!(self, Self::Regenerated { .. })
    }
}

/// At-most-one-in-flight regeneration trigger.
///
/// Invocations while a request is outstanding are dropped, not queued.
#[derive(Debug, Default)]
pub struct RegenerationTrigger {
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the request settles, however it settles.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RegenerationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a regeneration request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Label for the trigger in its current state.
    pub fn label(&self) -> &'static str {
        if self.is_busy() {
            "Regenerating..."
        } else {
            "Re-Generate Review"
        }
    }

    /// Fire the trigger for `slug`.
    pub async fn fire<R>(&self, backend: &R, slug: &str) -> RegenerateOutcome
    where
        R: ReviewRegenerator + ?Sized,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(slug, "regeneration already in flight, ignoring");
            return RegenerateOutcome::Ignored;
        }
        let _guard = InFlight(&self.in_flight);

        match backend.regenerate(slug).await {
            Ok(message) => {
                info!(slug, "review regenerated");
                RegenerateOutcome::Regenerated {
                    message: message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| REGENERATED.to_string()),
                }
            }
            Err(e) => {
                warn!(slug, error = %e, "review regeneration failed");
                let message = match &e {
                    ApiError::Server { message, .. } if !message.trim().is_empty() => {
                        message.clone()
                    }
                    _ => REGENERATE_FAILED.to_string(),
                };
                RegenerateOutcome::Failed { message }
            }
        }
    }
}
