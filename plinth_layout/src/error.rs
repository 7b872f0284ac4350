// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use crate::space::Axis;

/// Errors returned by component tree operations.
///
/// Usage errors (`NotAnchored`, `MissingOffer`, `Destroyed`, ...) mean the
/// caller asked for something the tree cannot do in its current state.
/// `InsufficientSpace` is a capacity error raised during layout: the caller
/// has to offer more space or reduce content.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// Layout was requested for a component that was never anchored.
    #[error("anchor() must be called before compute_layout()")]
    NotAnchored,
    /// A non-root component was laid out without an explicit offer.
    #[error("cannot accept null arguments on a non-root node; pass an explicit offer")]
    MissingOffer,
    /// An alignment string did not name a supported alignment.
    #[error("unsupported alignment: {0:?}")]
    UnsupportedAlignment(String),
    /// An easing string did not name a supported easing mode.
    #[error("unsupported easing mode: {0:?}")]
    UnsupportedEasing(String),
    /// A decoration box was added before the component was anchored.
    #[error("adding boxes before anchoring is disallowed")]
    BoxBeforeAnchor,
    /// The component handle refers to a destroyed component.
    #[error("can't reuse destroy()-ed components")]
    Destroyed,
    /// A size property of a container was set directly.
    #[error("{property} cannot be directly set on a container; it is derived from its children")]
    DerivedSize {
        /// The property that was set.
        property: &'static str,
    },
    /// The offered space is smaller than the sum of the minimum sizes.
    #[error("insufficient space: {axis} requires {required} but only {available} is available")]
    InsufficientSpace {
        /// The axis that does not fit.
        axis: Axis,
        /// Total space needed on that axis.
        required: f64,
        /// Space offered on that axis.
        available: f64,
    },
    /// A row or column weight was negative or not finite.
    #[error("weight must be a non-negative finite value, got {value}")]
    InvalidWeight {
        /// The rejected value.
        value: f64,
    },
    /// A row or column padding was negative or not finite.
    #[error("padding must be a non-negative finite value, got {value}")]
    InvalidPadding {
        /// The rejected value.
        value: f64,
    },
    /// A table cell already holds a different component.
    #[error("cell ({row}, {col}) is occupied")]
    CellOccupied {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
    /// A row or column index lies past the largest table extent.
    #[error("{what} index {index} is out of range; tables hold at most {limit}")]
    IndexOutOfRange {
        /// `"row"` or `"column"`.
        what: &'static str,
        /// The rejected index.
        index: usize,
        /// [`MAX_TABLE_EXTENT`](crate::MAX_TABLE_EXTENT).
        limit: usize,
    },
    /// A container operation was applied to the wrong kind of component.
    #[error("component is not a {expected}")]
    NotAContainer {
        /// The kind of container the operation needs.
        expected: &'static str,
    },
    /// A component was added inside its own subtree.
    #[error("a component cannot be added to its own subtree")]
    WouldCycle,
}
