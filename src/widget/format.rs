//! Message text formatting.
//!
//! Bot replies go through [`format_bot_reply`] before they enter the
//! transcript, and through [`bot_markup`] when rendered. Bot text is trusted
//! backend output; user text is only ever rendered with [`user_markup`],
//! which escapes everything.

/// Marker that switches on the invoice layout rules.
pub const INVOICE_MARKER: &str = "Order Invoice";

/// Hyphen rule emitted by the backend for invoice separators.
const HYPHEN_RULE: &str = "-----------------------------";

/// Box-drawing horizontal line (U+2500).
const BOX_LINE: char = '\u{2500}';

/// Width of the box-drawing rule that replaces [`HYPHEN_RULE`].
const BOX_RULE_WIDTH: usize = 35;

/// Apply the invoice rule to a backend reply.
///
/// Replies without [`INVOICE_MARKER`] are returned unchanged.
#[must_use]
pub fn format_bot_reply(text: &str) -> String {
    if !text.contains(INVOICE_MARKER) {
        return text.to_string();
    }

    let rule: String = std::iter::repeat_n(BOX_LINE, BOX_RULE_WIDTH).collect();
    let ruled = text.replace(HYPHEN_RULE, &rule);
    collapse_spaces(&ruled).trim().to_string()
}

/// Collapse runs of two or more ASCII spaces into one.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(ch);
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}

/// Escape text for literal inclusion in HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Markup for a bot message: newlines become `<br>`, other markup passes
/// through as the backend sent it.
#[must_use]
pub fn bot_markup(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// Markup for a user message: always literal text.
#[must_use]
pub fn user_markup(text: &str) -> String {
    escape_html(text)
}
