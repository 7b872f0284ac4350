// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component identity.

use core::fmt;

/// A handle to a component in a [`ComponentTree`](crate::ComponentTree).
///
/// Holds a slot index and a generation counter. Destroying a component bumps
/// the generation of its slot, so handles kept after `destroy` are rejected
/// with [`LayoutError::Destroyed`](crate::LayoutError::Destroyed) even once
/// the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ComponentId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({}@gen{})", self.idx, self.generation)
    }
}
