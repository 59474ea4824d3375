use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Display width of a string in terminal columns (CJK and emoji count as 2).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate `s` to at most `max_width` terminal columns, appending "..." when
/// anything was cut. Returns the input borrowed when it already fits.
///
/// Widths of 3 columns or fewer leave no room for the ellipsis, so the string
/// is simply cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width > ELLIPSIS.len() {
        max_width - ELLIPSIS.len()
    } else {
        max_width
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width > ELLIPSIS.len() {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    } else {
        Cow::Owned(s[..end].to_string())
    }
}

/// Strip terminal control characters and ANSI escape sequences from text
/// that came from the backend (titles, snippets, summaries) before it is
/// drawn. Tab, newline and carriage return are kept.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let needs_strip = s
        .bytes()
        .any(|b| b == 0x1b || b == 0x7f || (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')));
    if !needs_strip {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                // CSI: ESC [ params... final byte in 0x40..=0x7e
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: ESC ] ... terminated by BEL or ESC \
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\x7f' => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Trim user input; `None` when nothing but whitespace was entered.
///
/// Used by every "empty input is a no-op" rule (search, add feed).
pub fn non_blank(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fits_is_borrowed() {
        assert!(matches!(truncate_to_width("Short", 10), Cow::Borrowed("Short")));
    }

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_cjk_truncation() {
        // 4 chars × 2 columns = 8; budget 4 columns for text + "..."
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
    }

    #[test]
    fn test_narrow_widths_skip_ellipsis() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 2), "Te");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
    }

    #[test]
    fn test_strip_ansi_color_codes() {
        assert_eq!(strip_control_chars("\x1b[31mred\x1b[0m text"), "red text");
    }

    #[test]
    fn test_strip_osc_title_sequence() {
        assert_eq!(strip_control_chars("a\x1b]0;pwned\x07b"), "ab");
        assert_eq!(strip_control_chars("a\x1b]0;pwned\x1b\\b"), "ab");
    }

    #[test]
    fn test_strip_keeps_whitespace_controls() {
        assert_eq!(strip_control_chars("a\tb\nc\r\n"), "a\tb\nc\r\n");
        assert_eq!(strip_control_chars("bell\x07del\x7f"), "belldel");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  rust  "), Some("rust"));
        assert_eq!(non_blank(""), None);
        assert_eq!(non_blank(" \t\n "), None);
    }

    proptest! {
        #[test]
        fn prop_whitespace_only_is_blank(s in "[ \t\r\n]{0,32}") {
            prop_assert_eq!(non_blank(&s), None);
        }

        #[test]
        fn prop_non_blank_is_trimmed(s in "\\PC{0,64}") {
            if let Some(t) = non_blank(&s) {
                prop_assert_eq!(t, t.trim());
                prop_assert!(!t.is_empty());
            }
        }
    }
}
