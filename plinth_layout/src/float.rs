// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float helpers for `no_std` builds.
//!
//! `f64::powf` and the trigonometric methods live in `std`, not `core`. Easing
//! curves are the only users; they import this trait when `std` is off.

/// Float math helpers for `f64` in `no_std` mode.
pub(crate) trait FloatExt {
    fn powf(self, n: Self) -> Self;
    fn cos(self) -> Self;
}

#[cfg(feature = "libm")]
impl FloatExt for f64 {
    fn powf(self, n: Self) -> Self {
        libm::pow(self, n)
    }

    fn cos(self) -> Self {
        libm::cos(self)
    }
}

#[cfg(not(feature = "libm"))]
compile_error!("plinth_layout requires either the `std` or `libm` feature");
