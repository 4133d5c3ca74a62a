//! Display shaping for right-to-left text.
//!
//! `shape` turns logical-order text into the visual glyph order a naive
//! left-to-right renderer needs: Arabic letters are swapped for their
//! contextual presentation forms and every line is reordered with the
//! Unicode Bidirectional Algorithm. Apply it at render time only; stored
//! and scored text stays in logical order.

mod arabic;

use std::borrow::Cow;
use thiserror::Error;
use unicode_bidi::BidiInfo;

pub use arabic::reshape;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShapeError {
    #[error("replacement character at byte {offset}; input was not decoded cleanly")]
    Replacement { offset: usize },
}

/// Base direction of a piece of text, from its first strong character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

/// Arabic (including presentation forms) and Hebrew code points.
#[must_use]
pub fn is_rtl_char(c: char) -> bool {
    matches!(
        c,
        '\u{0590}'..='\u{05FF}'
            | '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB1D}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}'
    )
}

#[must_use]
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

/// Direction a presentation layer should align `text` in.
#[must_use]
pub fn direction(text: &str) -> TextDirection {
    let info = BidiInfo::new(text, None);
    match info.paragraphs.first() {
        Some(para) if para.level.is_rtl() => TextDirection::RightToLeft,
        _ => TextDirection::LeftToRight,
    }
}

/// Shape `text` for display, or explain why it cannot be shaped.
///
/// # Errors
///
/// Returns `ShapeError::Replacement` when the text carries U+FFFD, the mark
/// of an upstream decoding failure.
pub fn try_shape(text: &str) -> Result<Cow<'_, str>, ShapeError> {
    if let Some(offset) = text.find('\u{FFFD}') {
        return Err(ShapeError::Replacement { offset });
    }
    if !contains_rtl(text) {
        return Ok(Cow::Borrowed(text));
    }

    let reshaped = reshape(text);
    let lines: Vec<String> = reshaped.split('\n').map(reorder_line).collect();
    Ok(Cow::Owned(lines.join("\n")))
}

/// Shape `text` for display.
///
/// Never fails: input that cannot be shaped is returned as-is so rendering
/// is never blocked.
#[must_use]
pub fn shape(text: &str) -> Cow<'_, str> {
    try_shape(text).unwrap_or(Cow::Borrowed(text))
}

fn reorder_line(line: &str) -> String {
    let (body, cr) = match line.strip_suffix('\r') {
        Some(body) => (body, "\r"),
        None => (line, ""),
    };
    if body.is_empty() {
        return line.to_owned();
    }

    let info = BidiInfo::new(body, None);
    let mut out = String::with_capacity(line.len());
    for para in &info.paragraphs {
        out.push_str(&info.reorder_line(para, para.range.clone()));
    }
    out.push_str(cr);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_text_is_borrowed_untouched() {
        let text = "What is the capital of France?";
        assert!(matches!(shape(text), Cow::Borrowed(t) if t == text));
    }

    #[test]
    fn arabic_word_is_joined_and_reversed() {
        // مرحبا: meem(initial) reh(final) hah(initial) beh(medial) alef(final), then reversed.
        let shaped = shape("مرحبا");
        assert_eq!(shaped, "\u{FE8E}\u{FE92}\u{FEA3}\u{FEAE}\u{FEE3}");
    }

    #[test]
    fn mixed_line_keeps_latin_order() {
        let shaped = shape("Hi لا");
        assert_eq!(shaped, "Hi \u{FEFB}");
    }

    #[test]
    fn lines_are_reordered_independently() {
        let shaped = shape("بب\nbb");
        assert_eq!(shaped, "\u{FE90}\u{FE91}\nbb");
    }

    #[test]
    fn replacement_character_falls_back_to_original() {
        let text = "بب\u{FFFD}";
        assert!(matches!(
            try_shape(text),
            Err(ShapeError::Replacement { offset: 4 })
        ));
        assert_eq!(shape(text), text);
    }

    #[test]
    fn lossy_decoded_input_is_not_shaped() {
        let bytes = [0xD8, 0xA8, 0xFF];
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(shape(&text), "ب\u{FFFD}");
    }

    #[test]
    fn detects_direction_and_rtl_content() {
        assert_eq!(direction("أكبر جزء في الدماغ؟"), TextDirection::RightToLeft);
        assert_eq!(direction("Largest part?"), TextDirection::LeftToRight);
        assert!(contains_rtl("Topic: تشريح"));
        assert!(!contains_rtl("Topic: anatomy"));
    }
}
