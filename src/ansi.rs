//! ANSI CSI rendering and stripping.
//!
//! Pure functions only, no global state, no I/O. Works against the
//! 256-color codes carried on [`crate::level::LevelStyle`].

use crate::level::{Intensity, LevelStyle};

const ESC: &str = "\u{1b}[";
const RESET: &str = "\u{1b}[0m";

/// Wraps `text` in the CSI sequences implied by `style`, terminated with a
/// reset. Order: intensity, style flags, foreground, background, then text,
/// then one trailing reset, rather than a separate reset per attribute.
pub fn paint(text: &str, style: &LevelStyle) -> String {
    let mut out = String::with_capacity(text.len() + 24);
    match style.intensity {
        Intensity::Bold => out.push_str(&format!("{ESC}1m")),
        Intensity::Dim => out.push_str(&format!("{ESC}2m")),
        Intensity::Normal => {}
    }
    if style.flags.underline {
        out.push_str(&format!("{ESC}4m"));
    }
    if style.flags.italic {
        out.push_str(&format!("{ESC}3m"));
    }
    if style.flags.strike {
        out.push_str(&format!("{ESC}9m"));
    }
    out.push_str(&format!("{ESC}38;5;{}m", style.foreground));
    if let Some(bg) = style.background {
        out.push_str(&format!("{ESC}48;5;{bg}m"));
    }
    out.push_str(text);
    out.push_str(RESET);
    out
}

/// Strips every CSI sequence of the form `ESC [ ... <final-byte>` from `s`.
/// The final byte of a CSI sequence is any ASCII character in `0x40..=0x7e`;
/// this is a conservative matcher, not a full terminal-capability parser.
pub fn strip(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'[') {
            let mut j = i + 2;
            while j < bytes.len() && !(0x40..=0x7e).contains(&bytes[j]) {
                j += 1;
            }
            // advance past the final byte too, if present
            i = if j < bytes.len() { j + 1 } else { j };
        } else {
            // bytes are ASCII-or-continuation; push_str needs a char boundary,
            // so operate a char at a time via the original str for non-ESC runs.
            let ch_len = s[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            out.push_str(&s[i..i + ch_len]);
            i += ch_len;
        }
    }
    out
}

/// Escapes raw ESC bytes as `\x1b` for safe logging of output that already
/// contains ANSI, without removing surrounding text.
pub fn escape(s: &str) -> String {
    s.replace('\u{1b}', "\\x1b")
}
