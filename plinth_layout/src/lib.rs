// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component layout and render scheduling for charts.
//!
//! A chart is a tree of components held in a [`ComponentTree`] arena:
//! - **Leaves** wrap a [`Widget`] (a plot, an axis, a [`Label`]) and report how
//!   much space they need through [`Widget::requested_space`].
//! - **Groups** overlay their children in the same rectangle.
//! - **Tables** split their rectangle into weighted rows and columns with a
//!   small fixed-point solver, because a cell's minimum height may depend on
//!   the width it is given (wrapped text).
//!
//! Nothing is drawn when a property changes. Components register with a
//! [`RenderController`] instead, and [`ComponentTree::flush`] lays out every
//! affected root once and then renders every affected component once:
//!
//! ```text
//!   scale update / setter ──► RenderController queues ──► host frame callback
//!                                                              │
//!                         ┌────────────────────────────────────┘
//!                         ▼
//!   ComponentTree::flush ──► compute_layout(root) ──► render each component
//! ```
//!
//! Animated draws are planned separately: a [`Drawer`] runs a list of
//! [`DrawStep`]s (conventionally `RESET` then `MAIN`) through their
//! [`Animator`]s and produces a [`DrawPlan`] the host samples over time.
//!
//! # Crate features
//!
//! - `std` (disabled by default): enables `std` support in dependencies and
//!   uses `std` float math.
//! - `libm` (enabled by default): float math for `no_std` builds.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod alignment;
mod animator;
mod callbacks;
mod container;
mod controller;
mod draw;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod id;
mod label;
mod layout;
mod render;
mod scale;
mod space;
mod surface;
mod table;
mod transition;
mod tree;
mod widget;

pub use alignment::{XAlignment, YAlignment};
pub use animator::{Animator, EasingAnimator, EasingMode, NullAnimator};
pub use callbacks::{CallbackKey, CallbackSet};
pub use controller::{FrameRequester, RenderController, RenderPolicy};
pub use draw::{DrawPlan, DrawStep, Drawer, MAIN, PlotAnimators, RESET};
pub use error::LayoutError;
pub use id::ComponentId;
pub use label::Label;
pub use render::FlushReport;
pub use scale::{Domain, QuantitativeScale, ScaleResponse};
pub use space::{Axis, LayoutOffer, SpaceRequest};
pub use surface::{DrawCommand, DrawLog, RecordingSurface, Surface};
pub use table::{MAX_TABLE_EXTENT, SolverConfig, TableAllocation};
pub use transition::{AttrToProjector, Element, Projector, Selection, Transition, Tween};
pub use tree::ComponentTree;
pub use widget::{Blank, RenderContext, Widget};
