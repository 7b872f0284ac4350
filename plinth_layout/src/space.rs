// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Space requests and offers exchanged during layout.

use core::fmt;

use kurbo::{Point, Size};

/// The smallest footprint a component accepts without clipping.
///
/// Both fields are non-negative; [`SpaceRequest::new`] clamps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpaceRequest {
    /// Minimum acceptable width.
    pub min_width: f64,
    /// Minimum acceptable height.
    pub min_height: f64,
}

impl SpaceRequest {
    /// A request for no space at all.
    pub const ZERO: Self = Self {
        min_width: 0.0,
        min_height: 0.0,
    };

    /// Creates a request, clamping negative (or NaN) values to zero.
    #[must_use]
    pub fn new(min_width: f64, min_height: f64) -> Self {
        Self {
            min_width: min_width.max(0.0),
            min_height: min_height.max(0.0),
        }
    }

    /// Component-wise maximum of two requests.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            min_width: self.min_width.max(other.min_width),
            min_height: self.min_height.max(other.min_height),
        }
    }

    /// A request for exactly `size`.
    #[must_use]
    pub fn from_size(size: Size) -> Self {
        Self::new(size.width, size.height)
    }

    /// The request as a size.
    #[must_use]
    pub fn size(self) -> Size {
        Size::new(self.min_width, self.min_height)
    }
}

impl From<Size> for SpaceRequest {
    fn from(size: Size) -> Self {
        Self::from_size(size)
    }
}

/// Space offered to a component by its parent (or by the root surface).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOffer {
    /// Origin of the offered rectangle, in the parent's coordinates.
    pub origin: Point,
    /// Offered width.
    pub width: f64,
    /// Offered height.
    pub height: f64,
}

impl LayoutOffer {
    /// Creates an offer.
    #[must_use]
    pub fn new(origin: impl Into<Point>, width: f64, height: f64) -> Self {
        Self {
            origin: origin.into(),
            width,
            height,
        }
    }

    /// An offer of `size` at the origin.
    #[must_use]
    pub fn from_size(size: Size) -> Self {
        Self::new(Point::ZERO, size.width, size.height)
    }
}

/// A layout axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Widths, columns, x.
    Horizontal,
    /// Heights, rows, y.
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Horizontal => "width",
            Self::Vertical => "height",
        })
    }
}
