//! Terminal rendering of AI reviews.
//!
//! Rendering is a pure function from a [`ReviewPayload`] to a string so
//! commands can print it and tests can inspect it. Category panels are
//! collapsed by default, showing only the score bar and issue count; the
//! `expand_categories` option opens them.

use console::style;

use super::normalize::ReviewPayload;
use super::tiers::{ScoreTier, VerdictTier};
use super::types::{AiReview, IssueSeverity, ReviewCategory, ReviewIssue, TestPriority};
use crate::ui::icons::{CODE, FLASK, SHIELD, SPARKLE};
use crate::ui::{render_code_block, render_markdown, wrap_indented};

const BAR_WIDTH: usize = 20;

/// Options controlling how much of a review is shown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Column width for wrapped prose.
    pub width: usize,
    /// Show each category's issues instead of just the count.
    pub expand_categories: bool,
    /// Show the refactored code panel.
    pub show_refactored: bool,
    /// Language of the reviewed submission, used for code panels.
    pub language: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 80,
            expand_categories: false,
            show_refactored: false,
            language: String::new(),
        }
    }
}

/// A horizontal gauge for a 0-10 score, e.g. `██████████░░░░░░░░░░`.
pub fn score_bar(score: f64, width: usize) -> String {
    let clamped = if score.is_nan() { 0.0 } else { score.clamp(0.0, 10.0) };
    let filled = ((clamped / 10.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format a score without a trailing `.0` for whole numbers.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{:.1}", score)
    }
}

fn severity_badge(severity: IssueSeverity) -> String {
    let label = format!(" {} ", severity);
    let styled = match severity {
        IssueSeverity::Critical => style(label).red().reverse(),
        IssueSeverity::Warning => style(label).yellow().reverse(),
        IssueSeverity::Info => style(label).blue().reverse(),
    };
    format!("{} {}", severity.emoji(), styled)
}

fn priority_badge(priority: TestPriority) -> String {
    let label = format!("[{}]", priority);
    match priority {
        TestPriority::High => style(label).red().to_string(),
        TestPriority::Medium => style(label).yellow().to_string(),
        TestPriority::Low => style(label).blue().to_string(),
    }
}

fn section_header(out: &mut String, icon: impl std::fmt::Display, title: &str) {
    out.push('\n');
    out.push_str(&format!("{}{}\n", icon, style(title).bold()));
}

fn render_issue(out: &mut String, issue: &ReviewIssue, opts: &RenderOptions) {
    out.push_str(&format!(
        "    {} {}\n",
        severity_badge(issue.severity),
        style(&issue.title).bold()
    ));
    if !issue.description.trim().is_empty() {
        out.push_str(&wrap_indented(&issue.description, opts.width, "      "));
        out.push('\n');
    }
    if !issue.suggestion.trim().is_empty() {
        out.push_str(&format!("      {}\n", style("SUGGESTION").dim()));
        out.push_str(&wrap_indented(&issue.suggestion, opts.width, "      "));
        out.push('\n');
    }
    if !issue.code_snippet.trim().is_empty() {
        for line in render_code_block(&issue.code_snippet, &opts.language).lines() {
            out.push_str(&format!("      {}\n", line));
        }
    }
}

fn render_category(out: &mut String, category: &ReviewCategory, opts: &RenderOptions) {
    let tier = ScoreTier::of(category.score);
    let marker = match (category.has_issues(), opts.expand_categories) {
        (false, _) => " ",
        (true, true) => "▾",
        (true, false) => "▸",
    };
    let count = if category.has_issues() {
        style(category.issue_label()).dim().to_string()
    } else {
        String::new()
    };
    out.push_str(&format!(
        "  {} {:<24} {} {}  {}\n",
        marker,
        category.name,
        tier.style()
            .apply_to(format!("{:>4}/10", format_score(category.score))),
        tier.style().apply_to(score_bar(category.score, BAR_WIDTH)),
        count
    ));
    if opts.expand_categories {
        for issue in &category.issues {
            render_issue(out, issue, opts);
        }
    }
}

fn render_structured(review: &AiReview, opts: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}{}\n", SPARKLE, style("AI Code Review").magenta().bold()));

    let score_tier = ScoreTier::of(review.overall_score);
    out.push('\n');
    out.push_str(&format!(
        "  {} {}\n",
        score_tier
            .style()
            .bold()
            .apply_to(format!("{}/10", format_score(review.overall_score))),
        score_tier
            .style()
            .apply_to(score_bar(review.overall_score, BAR_WIDTH * 2))
    ));

    if !review.verdict.trim().is_empty() {
        let verdict_tier = VerdictTier::classify(&review.verdict);
        out.push_str(&format!(
            "  {} {}\n",
            verdict_tier.dot(),
            verdict_tier.style().bold().apply_to(&review.verdict)
        ));
    }

    if !review.summary.trim().is_empty() {
        out.push('\n');
        out.push_str(&wrap_indented(&review.summary, opts.width, "  "));
        out.push('\n');
    }

    if !review.categories.is_empty() {
        section_header(&mut out, SHIELD, "Category Breakdown");
        for category in &review.categories {
            render_category(&mut out, category, opts);
        }
        let critical = review.count_by_severity(IssueSeverity::Critical);
        let warnings = review.count_by_severity(IssueSeverity::Warning);
        let info = review.count_by_severity(IssueSeverity::Info);
        if review.issue_count() > 0 {
            out.push_str(&format!(
                "  {} critical · {} warning · {} info",
                style(critical).red(),
                style(warnings).yellow(),
                style(info).blue()
            ));
            if !opts.expand_categories {
                out.push_str(&format!("  {}", style("(--expand to show issues)").dim()));
            }
            out.push('\n');
        }
    }

    if let Some(code) = review.refactored() {
        section_header(&mut out, CODE, "Refactored Code");
        if opts.show_refactored {
            out.push_str(&render_code_block(code, &opts.language));
        } else {
            out.push_str(&format!(
                "  {}\n",
                style("Available (--refactored to show)").dim()
            ));
        }
    }

    if !review.testing_suggestions.is_empty() {
        section_header(&mut out, FLASK, "Testing Suggestions");
        for test in &review.testing_suggestions {
            out.push_str(&format!(
                "  {} {}\n",
                priority_badge(test.priority),
                style(&test.test_name).bold()
            ));
            if !test.description.trim().is_empty() {
                out.push_str(&wrap_indented(&test.description, opts.width, "      "));
                out.push('\n');
            }
        }
    }

    out
}

/// Render a review payload.
pub fn render_review(payload: &ReviewPayload, opts: &RenderOptions) -> String {
    match payload {
        ReviewPayload::Structured(review) => render_structured(review, opts),
        ReviewPayload::Legacy(text) if text.trim().is_empty() => format!(
            "{}{}\n  {}\n",
            SPARKLE,
            style("AI Review").magenta(),
            style("No AI review has been generated yet.").dim()
        ),
        ReviewPayload::Legacy(text) => format!(
            "{}{}\n\n{}",
            SPARKLE,
            style("AI Review").magenta(),
            render_markdown(text, opts.width)
        ),
    }
}
