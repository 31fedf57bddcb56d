//! Shared UI icons and emojis.
//!
//! Each icon carries a plain-ASCII fallback for terminals without emoji
//! support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR] ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i] ");
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "[AUTH] ");

// Review sections
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "* ");
pub static SHIELD: Emoji<'_, '_> = Emoji("🛡️  ", "# ");
pub static FLASK: Emoji<'_, '_> = Emoji("🧪 ", "T ");
pub static CODE: Emoji<'_, '_> = Emoji("🧩 ", "<> ");
pub static REFRESH: Emoji<'_, '_> = Emoji("🔄 ", "~ ");

// Submission metadata
pub static THUMBS_UP: Emoji<'_, '_> = Emoji("👍 ", "+");
pub static COMMENT: Emoji<'_, '_> = Emoji("💬 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");
pub static USER: Emoji<'_, '_> = Emoji("👤 ", "@");
pub static STAR: Emoji<'_, '_> = Emoji("⭐", "*");
