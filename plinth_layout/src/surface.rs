// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing surfaces that root components are anchored to.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::Debug;

use kurbo::{Point, Rect, Size};
use peniko::Brush;
use plinth_text::TextStyle;

/// A host drawing target.
///
/// Coordinates passed to a surface are in root space: the top-left corner of
/// the root component is `(0, 0)`.
pub trait Surface: Debug {
    /// Current size of the surface; used as the offer when laying out the
    /// root component without an explicit offer.
    fn size(&self) -> Size;

    /// Fills a rectangle.
    fn fill_rect(&mut self, rect: Rect, brush: &Brush);

    /// Draws one line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle, brush: &Brush);

    /// Draws a named decoration box covering a component's bounds.
    fn draw_box(&mut self, class: &str, rect: Rect) {
        let _ = (class, rect);
    }
}

/// A draw call captured by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// A filled rectangle.
    FillRect {
        /// Rectangle in root coordinates.
        rect: Rect,
        /// Fill paint.
        brush: Brush,
    },
    /// A line of text.
    Text {
        /// Top-left corner of the line box in root coordinates.
        origin: Point,
        /// The text.
        text: String,
        /// Font size the text was drawn at.
        font_size: f64,
        /// Fill paint.
        brush: Brush,
    },
    /// A decoration box.
    Box {
        /// Class name given to `add_box`.
        class: String,
        /// Rectangle in root coordinates.
        rect: Rect,
    },
}

#[derive(Debug, Default)]
struct Recording {
    size: Size,
    commands: Vec<DrawCommand>,
}

/// A surface that records draw calls instead of rasterizing them.
///
/// The recording is shared with every [`DrawLog`] obtained from
/// [`RecordingSurface::log`], so callers can inspect it after handing the
/// surface to the tree.
#[derive(Debug)]
pub struct RecordingSurface {
    recording: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    /// Creates a surface of the given size.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            recording: Rc::new(RefCell::new(Recording {
                size,
                commands: Vec::new(),
            })),
        }
    }

    /// Returns a handle onto the recorded commands.
    #[must_use]
    pub fn log(&self) -> DrawLog {
        DrawLog {
            recording: Rc::clone(&self.recording),
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.recording.borrow().size
    }

    fn fill_rect(&mut self, rect: Rect, brush: &Brush) {
        self.recording.borrow_mut().commands.push(DrawCommand::FillRect {
            rect,
            brush: brush.clone(),
        });
    }

    fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle, brush: &Brush) {
        self.recording.borrow_mut().commands.push(DrawCommand::Text {
            origin,
            text: text.to_string(),
            font_size: style.font_size,
            brush: brush.clone(),
        });
    }

    fn draw_box(&mut self, class: &str, rect: Rect) {
        self.recording.borrow_mut().commands.push(DrawCommand::Box {
            class: class.to_string(),
            rect,
        });
    }
}

/// Shared view of a [`RecordingSurface`]'s commands.
#[derive(Clone, Debug)]
pub struct DrawLog {
    recording: Rc<RefCell<Recording>>,
}

impl DrawLog {
    /// A copy of every command recorded so far.
    #[must_use]
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.recording.borrow().commands.clone()
    }

    /// Removes and returns the recorded commands.
    pub fn take(&self) -> Vec<DrawCommand> {
        core::mem::take(&mut self.recording.borrow_mut().commands)
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recording.borrow().commands.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recording.borrow().commands.is_empty()
    }

    /// Resizes the underlying surface, as a host window resize would.
    pub fn resize(&self, size: Size) {
        self.recording.borrow_mut().size = size;
    }
}
