pub mod code;
pub mod icons;
pub mod markdown;
pub mod notice;
pub mod progress;

pub use code::{Language, render_code_block};
pub use markdown::render_markdown;
pub use progress::RequestSpinner;

/// Widest text column used for prose, regardless of terminal size.
const MAX_WIDTH: usize = 100;
/// Width used when the terminal size cannot be determined.
const FALLBACK_WIDTH: usize = 80;

/// Column width for wrapped prose.
pub fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(FALLBACK_WIDTH)
        .min(MAX_WIDTH)
}

/// Format a timestamp the way listings show it, e.g. `Mar 5, 2025`.
pub fn format_date(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// Wrap `text` to `width` columns with every line indented by `indent`.
pub fn wrap_indented(text: &str, width: usize, indent: &str) -> String {
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let at = chrono::DateTime::parse_from_rfc3339("2025-03-05T10:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(format_date(&at), "Mar 5, 2025");
    }

    #[test]
    fn test_wrap_indented_indents_every_line() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let out = wrap_indented(text, 24, "    ");
        assert!(out.lines().count() > 1);
        assert!(out.lines().all(|l| l.starts_with("    ")));
    }

    #[test]
    fn test_term_width_is_capped() {
        assert!(term_width() <= MAX_WIDTH);
    }
}
