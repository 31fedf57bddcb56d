//! Presentation tiers for verdicts and scores.
//!
//! Both classifications are pure and used only to pick colours and icons.

use console::Style;
use std::fmt;

/// Visual tier of a free-text verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictTier {
    Positive,
    Negative,
    Neutral,
}

/// Ordered verdict rules. The first rule with a matching keyword wins, so
/// "Good but has failures" is positive.
const VERDICT_RULES: &[(VerdictTier, &[&str])] = &[
    (VerdictTier::Positive, &["excellent", "great", "good"]),
    (VerdictTier::Negative, &["poor", "fail", "bad"]),
];

impl VerdictTier {
    /// Classify a verdict by case-insensitive keyword match.
    ///
    /// # Examples
    ///
    /// ```
    /// use coderev::review::VerdictTier;
    ///
    /// assert_eq!(VerdictTier::classify("Excellent work"), VerdictTier::Positive);
    /// assert_eq!(VerdictTier::classify("Poor quality"), VerdictTier::Negative);
    /// assert_eq!(VerdictTier::classify("Average"), VerdictTier::Neutral);
    /// ```
    pub fn classify(verdict: &str) -> Self {
        let v = verdict.to_lowercase();
        VERDICT_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| v.contains(k)))
            .map(|(tier, _)| *tier)
            .unwrap_or(Self::Neutral)
    }

    pub fn style(&self) -> Style {
        match self {
            Self::Positive => Style::new().green(),
            Self::Negative => Style::new().red(),
            Self::Neutral => Style::new().yellow(),
        }
    }

    pub fn dot(&self) -> &'static str {
        match self {
            Self::Positive => "🟢",
            Self::Negative => "🔴",
            Self::Neutral => "🟠",
        }
    }
}

impl fmt::Display for VerdictTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        };
        write!(f, "{}", s)
    }
}

/// Visual tier of a 0-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreTier {
    Low,
    Medium,
    High,
}

impl ScoreTier {
    /// `>= 8` is high, `>= 6` is medium, everything else (including NaN) is low.
    ///
    /// # Examples
    ///
    /// ```
    /// use coderev::review::ScoreTier;
    ///
    /// assert_eq!(ScoreTier::of(8.0), ScoreTier::High);
    /// assert_eq!(ScoreTier::of(7.9), ScoreTier::Medium);
    /// assert_eq!(ScoreTier::of(5.9), ScoreTier::Low);
    /// ```
    pub fn of(score: f64) -> Self {
        if score >= 8.0 {
            Self::High
        } else if score >= 6.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Self::High => Style::new().green(),
            Self::Medium => Style::new().yellow(),
            Self::Low => Style::new().red(),
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_positive_keywords() {
        for v in ["Excellent work", "GREAT", "good enough", "Goodness"] {
            assert_eq!(VerdictTier::classify(v), VerdictTier::Positive, "{v}");
        }
    }

    #[test]
    fn test_verdict_negative_keywords() {
        for v in ["Poor quality", "FAILS review", "bad practice"] {
            assert_eq!(VerdictTier::classify(v), VerdictTier::Negative, "{v}");
        }
    }

    #[test]
    fn test_verdict_neutral_fallback() {
        assert_eq!(VerdictTier::classify("Average"), VerdictTier::Neutral);
        assert_eq!(VerdictTier::classify("Needs work"), VerdictTier::Neutral);
        assert_eq!(VerdictTier::classify(""), VerdictTier::Neutral);
    }

    #[test]
    fn test_verdict_positive_checked_before_negative() {
        assert_eq!(
            VerdictTier::classify("Good but has failures"),
            VerdictTier::Positive
        );
        assert_eq!(VerdictTier::classify("bad, not great"), VerdictTier::Positive);
    }

    #[test]
    fn test_score_tier_boundaries() {
        assert_eq!(ScoreTier::of(8.0), ScoreTier::High);
        assert_eq!(ScoreTier::of(7.9), ScoreTier::Medium);
        assert_eq!(ScoreTier::of(6.0), ScoreTier::Medium);
        assert_eq!(ScoreTier::of(5.9), ScoreTier::Low);
    }

    #[test]
    fn test_score_tier_outside_range() {
        assert_eq!(ScoreTier::of(42.0), ScoreTier::High);
        assert_eq!(ScoreTier::of(-3.0), ScoreTier::Low);
        assert_eq!(ScoreTier::of(f64::NAN), ScoreTier::Low);
        assert_eq!(ScoreTier::of(f64::INFINITY), ScoreTier::High);
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(VerdictTier::Neutral.to_string(), "neutral");
        assert_eq!(ScoreTier::Medium.to_string(), "medium");
    }
}
