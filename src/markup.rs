//! Markup and string helpers
//!
//! The host client renders colors and styles through a section-sign escape
//! (`§` followed by a code character). Authors write the friendlier `&x`
//! form; [`format`] rewrites it into the native escape. Everything else in
//! this module exists because the escape character is multi-byte in UTF-8,
//! so all slicing in the crate has to happen on character boundaries.

/// The host's native color escape character.
pub const COLOR_CHAR: char = '§';

/// The author-friendly markup marker rewritten by [`format`].
pub const MARKUP_CHAR: char = '&';

/// Bold style escape, used as the title placeholder when a handler
/// declines to provide a title (the host rejects empty display names).
pub const BOLD: &str = "§l";

/// Reset escape, the initial carried color of a scrolling line.
pub const RESET: &str = "§r";

/// Code characters that may follow the markup marker.
const MARKUP_CODES: &str = "0123456789AaBbCcDdEeFfKkLlMmNnOoRrXx";

/// Rewrite `&x` markup into the host's native `§x` escapes.
///
/// Only recognized code characters are rewritten (the code is lowercased
/// in the process); any other `&`, including a trailing one, passes
/// through unchanged.
#[must_use]
pub fn format(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == MARKUP_CHAR {
            if let Some(&code) = chars.peek() {
                if MARKUP_CODES.contains(code) {
                    out.push(COLOR_CHAR);
                    out.push(code.to_ascii_lowercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Look up a color/style code character as the host would.
///
/// Codes are lowercase-only, matching the host's escape table.
#[must_use]
pub fn color_code(c: char) -> Option<char> {
    if c.is_ascii_digit() || ('a'..='f').contains(&c) || ('k'..='o').contains(&c) || c == 'r' {
        Some(c)
    } else {
        None
    }
}

/// Number of characters in `text` (not bytes).
#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The first `max` characters of `text`, or all of it if shorter.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Everything after the first `n` characters of `text`.
#[must_use]
pub fn skip_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}
