//! Reply formatting (Telegram HTML parse mode).

use crate::domain::ResolvedLink;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Success reply: the link in fixed-width so it can be copied as-is.
pub fn format_direct_link(link: &ResolvedLink) -> String {
    format!(
        "🔗 <b>Direct link:</b> <code>{}</code>\n📄 <code>{}</code>",
        escape_html(&link.url),
        escape_html(&link.filename)
    )
}
