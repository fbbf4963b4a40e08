//! Log helpers for player input and narration.
//!
//! Player lines and narration can hold newlines, tabs and stray control bytes
//! (pasted text, art files). These helpers keep every log record on one line.

use std::fmt::Write;

/// Longest preview written for a single value.
pub const MAX_PREVIEW_CHARS: usize = 200;

/// Escape `text` for a single-line log record and cap it at
/// [`MAX_PREVIEW_CHARS`] characters, marking a cut with `…`.
pub fn escape_log(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_PREVIEW_CHARS) + 4);
    for (index, ch) in text.chars().enumerate() {
        if index == MAX_PREVIEW_CHARS {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:04x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// One-line summary of a narration batch: line count and the escaped first
/// non-empty line.
pub fn summarize_lines(lines: &[String]) -> String {
    match lines.iter().find(|line| !line.trim().is_empty()) {
        Some(first) => format!("{} line(s), first: \"{}\"", lines.len(), escape_log(first)),
        None => format!("{} line(s)", lines.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_whitespace_and_control_chars() {
        assert_eq!(escape_log("geh\nnord\t\\"), "geh\\nnord\\t\\\\");
        assert_eq!(escape_log("a\u{7}b"), "a\\u{0007}b");
        assert_eq!(escape_log("Tür öffnen"), "Tür öffnen");
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "x".repeat(MAX_PREVIEW_CHARS + 10);
        let escaped = escape_log(&long);
        assert_eq!(escaped.chars().count(), MAX_PREVIEW_CHARS + 1);
        assert!(escaped.ends_with('…'));
    }

    #[test]
    fn summary_skips_blank_lines() {
        let lines = vec![String::new(), "Hof".to_string(), "Kalt.".to_string()];
        assert_eq!(summarize_lines(&lines), "3 line(s), first: \"Hof\"");
        assert_eq!(summarize_lines(&[]), "0 line(s)");
    }
}
