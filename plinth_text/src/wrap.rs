// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy word wrapping.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{TextMeasurer, TextStyle};

/// The result of wrapping text to a maximum width.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrappedText {
    /// Wrapped lines, top to bottom.
    pub lines: Vec<String>,
    /// Width of the widest line.
    pub width: f64,
    /// Height of a single line, including line spacing.
    pub line_height: f64,
}

impl WrappedText {
    /// Total height of all lines.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.line_height * self.lines.len() as f64
    }

    /// Returns `true` if no line was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Wraps `text` so that each line fits within `max_width` where possible.
///
/// Explicit `\n` breaks always start a new line. Words are never split: a
/// word wider than `max_width` sits on a line of its own and makes the
/// result wider than requested, which callers can detect through
/// [`WrappedText::width`]. A non-finite `max_width` disables wrapping.
pub fn wrap_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> WrappedText {
    let line_height = measurer.measure("", style).line_height() * style.line_spacing;
    let mut out = WrappedText {
        lines: Vec::new(),
        width: 0.0,
        line_height,
    };
    if text.is_empty() {
        return out;
    }

    let space = measurer.measure(" ", style).advance_width;
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0.0_f64;
        for word in paragraph.split_whitespace() {
            let word_width = measurer.measure(word, style).advance_width;
            if line.is_empty() {
                line.push_str(word);
                line_width = word_width;
            } else if line_width + space + word_width <= max_width {
                line.push(' ');
                line.push_str(word);
                line_width += space + word_width;
            } else {
                out.width = out.width.max(line_width);
                out.lines.push(core::mem::take(&mut line));
                line.push_str(word);
                line_width = word_width;
            }
        }
        out.width = out.width.max(line_width);
        out.lines.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::HeuristicTextMeasurer;

    // 10px font: 6px per glyph, 10px per line.
    fn style() -> TextStyle {
        TextStyle::new(10.0)
    }

    #[test]
    fn unbounded_width_keeps_one_line() {
        let w = wrap_text(&HeuristicTextMeasurer, "aa bb cc", &style(), f64::INFINITY);
        assert_eq!(w.lines, vec!["aa bb cc"]);
        assert!((w.width - 48.0).abs() < 1e-9, "width {}", w.width);
        assert!((w.height() - 10.0).abs() < 1e-9, "height {}", w.height());
    }

    #[test]
    fn narrow_width_breaks_between_words() {
        // "aa bb" is 30px wide, so a 30px limit fits two words per line.
        let w = wrap_text(&HeuristicTextMeasurer, "aa bb cc dd e", &style(), 30.0);
        assert_eq!(w.lines, vec!["aa bb", "cc dd", "e"]);
        assert!((w.width - 30.0).abs() < 1e-9, "width {}", w.width);
        assert!((w.height() - 30.0).abs() < 1e-9, "height {}", w.height());
    }

    #[test]
    fn long_words_overflow_on_their_own_line() {
        let w = wrap_text(&HeuristicTextMeasurer, "a loooooong b", &style(), 20.0);
        assert_eq!(w.lines, vec!["a", "loooooong", "b"]);
        assert!(w.width > 20.0, "overflowing word widens the block");
    }

    #[test]
    fn explicit_breaks_and_empty_text() {
        let w = wrap_text(&HeuristicTextMeasurer, "top\n\nbottom", &style(), 1000.0);
        assert_eq!(w.lines, vec!["top", "", "bottom"]);

        let empty = wrap_text(&HeuristicTextMeasurer, "", &style(), 1000.0);
        assert!(empty.is_empty(), "no lines for empty text");
        assert!(empty.height().abs() < 1e-9, "empty text has no height");
    }

    #[test]
    fn line_spacing_scales_height() {
        let spaced = style().with_line_spacing(1.5);
        let w = wrap_text(&HeuristicTextMeasurer, "a\nb", &spaced, 100.0);
        assert!((w.height() - 30.0).abs() < 1e-9, "height {}", w.height());
    }
}
