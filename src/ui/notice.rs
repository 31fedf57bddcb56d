//! One-line user notices, the terminal stand-in for toast messages.
//!
//! Notices go to stderr so command output on stdout stays pipeable.

use console::style;

use super::icons::{CHECK, CROSS, INFO, LOCK};
use crate::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
    Auth,
}

/// Format a notice line without printing it.
pub fn format_notice(kind: NoticeKind, message: &str) -> String {
    match kind {
        NoticeKind::Success => format!("{}{}", CHECK, style(message).green()),
        NoticeKind::Error => format!("{}{}", CROSS, style(message).red()),
        NoticeKind::Info => format!("{}{}", INFO, style(message).cyan()),
        NoticeKind::Auth => format!("{}{}", LOCK, style(message).yellow()),
    }
}

pub fn success(message: &str) {
    eprintln!("{}", format_notice(NoticeKind::Success, message));
}

pub fn error(message: &str) {
    eprintln!("{}", format_notice(NoticeKind::Error, message));
}

pub fn info(message: &str) {
    eprintln!("{}", format_notice(NoticeKind::Info, message));
}

pub fn auth(message: &str) {
    eprintln!("{}", format_notice(NoticeKind::Auth, message));
}

/// Report a failed request using the server's message when it sent one.
pub fn api_error(err: &ApiError) {
    error(&err.user_message());
}

/// Success message from the server, or `fallback` when it sent none.
pub fn server_message(message: Option<&str>, fallback: &str) -> String {
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
