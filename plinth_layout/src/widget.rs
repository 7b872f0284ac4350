// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The leaf component contract.

use core::any::Any;
use core::fmt::Debug;

use kurbo::{Affine, Point, Rect, Size};
use peniko::Brush;
use plinth_text::TextStyle;

use crate::id::ComponentId;
use crate::space::SpaceRequest;
use crate::surface::Surface;

/// Content of a leaf component.
///
/// The tree owns placement (origin, alignment, the fixed flags it can
/// override). A widget only answers how much space it needs and draws itself
/// into the rectangle it was given.
pub trait Widget: Any + Debug {
    /// Minimum space needed when offered `available_width` by
    /// `available_height`. May depend on the offer (wrapped text grows taller
    /// as it gets narrower).
    fn requested_space(&self, available_width: f64, available_height: f64) -> SpaceRequest {
        let _ = (available_width, available_height);
        SpaceRequest::ZERO
    }

    /// Whether the widget keeps its requested width instead of stretching.
    fn fixed_width(&self) -> bool {
        false
    }

    /// Whether the widget keeps its requested height instead of stretching.
    fn fixed_height(&self) -> bool {
        false
    }

    /// Runs once, the first time the component is anchored.
    fn setup(&mut self) {}

    /// Called after each layout with the component's new size.
    fn on_resize(&mut self, size: Size) {
        let _ = size;
    }

    /// Draws the widget.
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let _ = ctx;
    }
}

/// A widget with no content: requests nothing and draws nothing.
///
/// Useful as a spacer, and as the content of components whose only visible
/// output is decoration boxes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blank;

impl Widget for Blank {}

/// Drawing context handed to [`Widget::render`].
///
/// Coordinates are local to the component: `(0, 0)` is its top-left corner.
#[derive(Debug)]
pub struct RenderContext<'a> {
    id: ComponentId,
    bounds: Rect,
    surface: &'a mut dyn Surface,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(id: ComponentId, bounds: Rect, surface: &'a mut dyn Surface) -> Self {
        Self {
            id,
            bounds,
            surface,
        }
    }

    /// The component being drawn.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The component's bounds in root coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The component's size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.bounds.size()
    }

    /// Transform from local to root coordinates.
    #[must_use]
    pub fn transform(&self) -> Affine {
        Affine::translate(self.bounds.origin().to_vec2())
    }

    /// Fills a rectangle given in local coordinates.
    pub fn fill_rect(&mut self, rect: Rect, brush: impl Into<Brush>) {
        let rect = rect + self.bounds.origin().to_vec2();
        self.surface.fill_rect(rect, &brush.into());
    }

    /// Draws one line of text with its top-left corner at local `origin`.
    pub fn draw_text(
        &mut self,
        origin: Point,
        text: &str,
        style: &TextStyle,
        brush: impl Into<Brush>,
    ) {
        let origin = origin + self.bounds.origin().to_vec2();
        self.surface.draw_text(origin, text, style, &brush.into());
    }

    /// The raw surface, in root coordinates.
    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }
}
