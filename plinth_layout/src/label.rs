// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A word-wrapped text label.

use alloc::string::String;
use alloc::sync::Arc;

use kurbo::{Point, Size};
use peniko::Brush;
use plinth_text::{TextMeasurer, TextStyle, WrappedText, wrap_text};

use crate::space::SpaceRequest;
use crate::widget::{RenderContext, Widget};

/// Text that wraps to the width it is offered.
///
/// A label is fixed on both axes: it takes only the space its wrapped text
/// needs. Its requested height therefore depends on the offered width, which
/// is what a [`Table`](crate::ComponentTree::create_table) iterates on.
#[derive(Clone)]
pub struct Label {
    text: String,
    style: TextStyle,
    padding: f64,
    fill: Brush,
    measurer: Arc<dyn TextMeasurer>,
    wrapped: WrappedText,
}

impl core::fmt::Debug for Label {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Label")
            .field("text", &self.text)
            .field("style", &self.style)
            .field("padding", &self.padding)
            .field("lines", &self.wrapped.lines)
            .finish_non_exhaustive()
    }
}

impl Label {
    /// Creates a label measured with `measurer`.
    pub fn new(text: impl Into<String>, measurer: Arc<dyn TextMeasurer>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            padding: 0.0,
            fill: Brush::default(),
            measurer,
            wrapped: WrappedText::default(),
        }
    }

    /// Sets the text style.
    #[must_use]
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the space kept clear on every side of the text.
    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    /// Sets the text fill.
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = fill.into();
        self
    }

    /// The text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text. Call through
    /// [`ComponentTree::update_widget`](crate::ComponentTree::update_widget)
    /// so the change gets laid out.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Lines from the last layout.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.wrapped.lines
    }

    fn wrap(&self, width: f64) -> WrappedText {
        let inner = (width - 2.0 * self.padding).max(0.0);
        wrap_text(&*self.measurer, &self.text, &self.style, inner)
    }
}

impl Widget for Label {
    fn requested_space(&self, available_width: f64, _available_height: f64) -> SpaceRequest {
        let wrapped = self.wrap(available_width);
        SpaceRequest::new(
            wrapped.width + 2.0 * self.padding,
            wrapped.height() + 2.0 * self.padding,
        )
    }

    fn fixed_width(&self) -> bool {
        true
    }

    fn fixed_height(&self) -> bool {
        true
    }

    fn on_resize(&mut self, size: Size) {
        self.wrapped = self.wrap(size.width);
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let line_height = self.wrapped.line_height;
        for (i, line) in self.wrapped.lines.iter().enumerate() {
            let origin = Point::new(self.padding, self.padding + i as f64 * line_height);
            ctx.draw_text(origin, line, &self.style, self.fill.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use plinth_text::HeuristicTextMeasurer;

    use super::*;

    fn label(text: &str) -> Label {
        Label::new(text, Arc::new(HeuristicTextMeasurer))
            .with_style(TextStyle::new(10.0))
    }

    #[test]
    fn narrower_offers_request_more_height() {
        // 6px per glyph, 10px lines.
        let label = label("alpha beta gamma delta");
        assert_eq!(label.requested_space(120.0, 100.0), SpaceRequest::new(96.0, 20.0));
        assert_eq!(label.requested_space(60.0, 100.0), SpaceRequest::new(60.0, 30.0));
    }

    #[test]
    fn padding_surrounds_the_text() {
        let label = label("ab").with_padding(2.0);
        assert_eq!(label.requested_space(100.0, 100.0), SpaceRequest::new(16.0, 14.0));
    }

    #[test]
    fn resize_rewraps() {
        let mut label = label("aa bb");
        label.on_resize(Size::new(12.0, 20.0));
        assert_eq!(label.lines(), vec!["aa", "bb"]);
        label.on_resize(Size::new(30.0, 10.0));
        assert_eq!(label.lines(), vec!["aa bb"]);
    }
}
