//! Read-only code viewer.
//!
//! Maps a submission's free-text language name onto a known [`Language`] and
//! renders code with a line-number gutter and light highlighting of comments
//! and string literals.

use console::style;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Languages the viewer knows how to highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Html,
    Css,
    Cpp,
    Php,
    Sql,
    Markdown,
    Xml,
    Json,
    Rust,
    Go,
}

/// Language names offered when submitting code.
pub const SUBMIT_LANGUAGES: &[&str] = &[
    "JavaScript",
    "Python",
    "Java",
    "HTML",
    "CSS",
    "React.js",
    "C",
    "C++",
    "PHP",
    "SQL",
    "Markdown",
    "XML",
    "JSON",
    "Rust",
    "Go",
];

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#).expect("valid regex"));

impl Language {
    /// Resolve a language name as stored on a submission.
    ///
    /// Matching is case-insensitive and accepts the aliases the submit form
    /// has historically produced ("Javascript", "React.js", "C Language").
    pub fn from_name(name: &str) -> Option<Self> {
        let lang = match name.trim().to_lowercase().as_str() {
            "javascript" | "js" | "react.js" | "react" | "jsx" | "typescript" | "ts" => {
                Self::JavaScript
            }
            "python" | "py" => Self::Python,
            "java" => Self::Java,
            "html" => Self::Html,
            "css" => Self::Css,
            "c" | "c++" | "cpp" | "c language" => Self::Cpp,
            "php" => Self::Php,
            "sql" => Self::Sql,
            "markdown" | "md" => Self::Markdown,
            "xml" => Self::Xml,
            "json" => Self::Json,
            "rust" | "rs" => Self::Rust,
            "go" | "golang" => Self::Go,
            _ => return None,
        };
        Some(lang)
    }

    /// Tag used on fenced code blocks.
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Java => "java",
            Self::Html => "html",
            Self::Css => "css",
            Self::Cpp => "cpp",
            Self::Php => "php",
            Self::Sql => "sql",
            Self::Markdown => "markdown",
            Self::Xml => "xml",
            Self::Json => "json",
            Self::Rust => "rust",
            Self::Go => "go",
        }
    }

    /// Line-comment marker, if the language has one.
    pub fn line_comment(&self) -> Option<&'static str> {
        match self {
            Self::JavaScript | Self::Java | Self::Cpp | Self::Php | Self::Rust | Self::Go => {
                Some("//")
            }
            Self::Css => Some("/*"),
            Self::Python => Some("#"),
            Self::Sql => Some("--"),
            Self::Html | Self::Xml | Self::Markdown => Some("<!--"),
            Self::Json => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fence_tag())
    }
}

/// Apply comment and string highlighting to a single line.
fn highlight_line(line: &str, language: Option<Language>) -> String {
    let Some(lang) = language else {
        return line.to_string();
    };
    if let Some(marker) = lang.line_comment() {
        if line.trim_start().starts_with(marker) {
            return style(line).dim().italic().to_string();
        }
    }
    STRING_LITERAL
        .replace_all(line, |caps: &regex::Captures<'_>| {
            style(&caps[0]).green().to_string()
        })
        .into_owned()
}

/// Render `code` with a header and line-number gutter.
///
/// `language` is the submission's language name; unknown names render
/// without highlighting.
pub fn render_code_block(code: &str, language: &str) -> String {
    let lang = Language::from_name(language);
    let lines: Vec<&str> = code.lines().collect();
    let gutter = lines.len().max(1).to_string().len();

    let mut out = String::new();
    let label = lang.map(|l| l.to_string()).unwrap_or_else(|| {
        if language.trim().is_empty() {
            "text".to_string()
        } else {
            language.trim().to_lowercase()
        }
    });
    out.push_str(&format!(
        "{}\n",
        style(format!("┌─ {} ", label)).dim()
    ));
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!(
            "{} {}\n",
            style(format!("{:>width$} │", i + 1, width = gutter)).dim(),
            highlight_line(line, lang)
        ));
    }
    out.push_str(&format!("{}\n", style("└─").dim()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).to_string()
    }

    #[test]
    fn test_from_name_matches_editor_languages() {
        assert_eq!(Language::from_name("JavaScript"), Some(Language::JavaScript));
        assert_eq!(Language::from_name("Python"), Some(Language::Python));
        assert_eq!(Language::from_name("C"), Some(Language::Cpp));
        assert_eq!(Language::from_name("C++"), Some(Language::Cpp));
        assert_eq!(Language::from_name("Go"), Some(Language::Go));
    }

    #[test]
    fn test_from_name_accepts_form_aliases() {
        assert_eq!(Language::from_name("Javascript"), Some(Language::JavaScript));
        assert_eq!(Language::from_name("React.js"), Some(Language::JavaScript));
        assert_eq!(Language::from_name("C Language"), Some(Language::Cpp));
    }

    #[test]
    fn test_unknown_language_is_none() {
        assert_eq!(Language::from_name("Brainfuck"), None);
        assert_eq!(Language::from_name(""), None);
    }

    #[test]
    fn test_every_submit_language_resolves() {
        for name in SUBMIT_LANGUAGES {
            assert!(Language::from_name(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_render_code_block_numbers_lines() {
        let out = plain(&render_code_block("let a = 1;\nlet b = 2;", "JavaScript"));
        assert!(out.contains("javascript"));
        assert!(out.contains("1 │ let a = 1;"));
        assert!(out.contains("2 │ let b = 2;"));
    }

    #[test]
    fn test_render_code_block_pads_gutter() {
        let code = (1..=10).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let out = plain(&render_code_block(&code, "Python"));
        assert!(out.contains(" 1 │ 1"));
        assert!(out.contains("10 │ 10"));
    }

    #[test]
    fn test_render_unknown_language_keeps_label() {
        let out = plain(&render_code_block("x", "Haskell"));
        assert!(out.contains("haskell"));
        assert!(out.contains("1 │ x"));
    }

    #[test]
    fn test_highlight_preserves_text() {
        let line = r#"print("hi") # greet"#;
        assert_eq!(plain(&highlight_line(line, Some(Language::Python))), line);
        let comment = "// note";
        assert_eq!(plain(&highlight_line(comment, Some(Language::Rust))), comment);
    }
}
