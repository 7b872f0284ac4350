// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animators turn target attribute values into timed transitions.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::f64::consts::PI;
use core::fmt;
use core::str::FromStr;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::LayoutError;
use crate::transition::{AttrToProjector, Selection, Transition, Tween};

/// Times the change of a selection's attributes.
pub trait Animator: fmt::Debug {
    /// Builds a transition from the selection's current attribute values to
    /// the values produced by `attrs`. Elements missing an attribute start
    /// at their target.
    fn animate(&self, selection: &Selection, attrs: &AttrToProjector) -> Transition;

    /// Total milliseconds a transition over `element_count` elements takes.
    fn total_time(&self, element_count: usize) -> f64;
}

/// Applies every attribute at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullAnimator;

impl Animator for NullAnimator {
    fn animate(&self, selection: &Selection, attrs: &AttrToProjector) -> Transition {
        Transition::new(tweens(selection, attrs, |_| 0.0, 0.0, EasingMode::Linear))
    }

    fn total_time(&self, _element_count: usize) -> f64 {
        0.0
    }
}

fn tweens(
    selection: &Selection,
    attrs: &AttrToProjector,
    delay_of: impl Fn(usize) -> f64,
    duration: f64,
    easing: EasingMode,
) -> Vec<Tween> {
    let mut out = Vec::with_capacity(selection.len() * attrs.len());
    for (index, element) in selection.elements().iter().enumerate() {
        for (attr, projector) in attrs.iter() {
            let to = (**projector)(index);
            out.push(Tween {
                element: index,
                attr: attr.to_string(),
                from: element.get(attr).unwrap_or(to),
                to,
                delay: delay_of(index),
                duration,
                easing,
            });
        }
    }
    out
}

/// Easing curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EasingMode {
    /// Constant speed.
    Linear,
    /// Quadratic, accelerating.
    QuadIn,
    /// Quadratic, decelerating.
    QuadOut,
    /// Quadratic, accelerating then decelerating.
    QuadInOut,
    /// Cubic, accelerating then decelerating.
    CubicInOut,
    /// Exponential, decelerating.
    #[default]
    ExpOut,
    /// Sinusoidal, accelerating then decelerating.
    SinInOut,
}

impl EasingMode {
    /// Maps progress in `[0, 1]` to eased progress. Input is clamped.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => t * (2.0 - t),
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
            Self::ExpOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
            Self::SinInOut => (1.0 - (PI * t).cos()) / 2.0,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::QuadIn => "quad-in",
            Self::QuadOut => "quad-out",
            Self::QuadInOut => "quad-in-out",
            Self::CubicInOut => "cubic-in-out",
            Self::ExpOut => "exp-out",
            Self::SinInOut => "sin-in-out",
        }
    }
}

impl fmt::Display for EasingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EasingMode {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [EasingMode; 7] = [
            EasingMode::Linear,
            EasingMode::QuadIn,
            EasingMode::QuadOut,
            EasingMode::QuadInOut,
            EasingMode::CubicInOut,
            EasingMode::ExpOut,
            EasingMode::SinInOut,
        ];
        ALL.into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| LayoutError::UnsupportedEasing(s.to_string()))
    }
}

/// Staggered eased transitions with a total-time budget.
///
/// Element `i` starts at `start_delay + i * step_delay` and runs for
/// `step_duration`. When `max_total_duration` is finite, the step duration is
/// clamped to it, the start delay to what is left, and the step delay is
/// shortened so the last element still finishes within the budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EasingAnimator {
    start_delay: f64,
    step_duration: f64,
    step_delay: f64,
    max_total_duration: f64,
    easing_mode: EasingMode,
}

impl Default for EasingAnimator {
    fn default() -> Self {
        Self {
            start_delay: 0.0,
            step_duration: 300.0,
            step_delay: 15.0,
            max_total_duration: f64::INFINITY,
            easing_mode: EasingMode::default(),
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

impl EasingAnimator {
    /// Creates an animator with default timings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds before the first element starts.
    #[must_use]
    pub fn with_start_delay(mut self, ms: f64) -> Self {
        self.start_delay = non_negative(ms);
        self
    }

    /// Milliseconds each element animates for.
    #[must_use]
    pub fn with_step_duration(mut self, ms: f64) -> Self {
        self.step_duration = non_negative(ms);
        self
    }

    /// Milliseconds between the starts of consecutive elements.
    #[must_use]
    pub fn with_step_delay(mut self, ms: f64) -> Self {
        self.step_delay = non_negative(ms);
        self
    }

    /// Upper bound on the total time of a transition.
    #[must_use]
    pub fn with_max_total_duration(mut self, ms: f64) -> Self {
        self.max_total_duration = non_negative(ms);
        self
    }

    /// Easing curve.
    #[must_use]
    pub fn with_easing_mode(mut self, mode: EasingMode) -> Self {
        self.easing_mode = mode;
        self
    }

    /// Configured start delay.
    #[must_use]
    pub fn start_delay(&self) -> f64 {
        self.start_delay
    }

    /// Configured per-element duration.
    #[must_use]
    pub fn step_duration(&self) -> f64 {
        self.step_duration
    }

    /// Configured per-element stagger.
    #[must_use]
    pub fn step_delay(&self) -> f64 {
        self.step_delay
    }

    /// Configured total-time budget.
    #[must_use]
    pub fn max_total_duration(&self) -> f64 {
        self.max_total_duration
    }

    /// Configured easing curve.
    #[must_use]
    pub fn easing_mode(&self) -> EasingMode {
        self.easing_mode
    }

    /// Effective `(start_delay, step_delay, step_duration)` for
    /// `element_count` elements after applying the budget.
    #[must_use]
    pub fn timing(&self, element_count: usize) -> (f64, f64, f64) {
        let budget = self.max_total_duration;
        let duration = self.step_duration.min(budget);
        let start = self.start_delay.min(budget - duration);
        let interval = (budget - start - duration).max(0.0);
        let steps = element_count.saturating_sub(1).max(1) as f64;
        let step_delay = self.step_delay.min(interval / steps);
        (start, step_delay, duration)
    }
}

impl Animator for EasingAnimator {
    fn animate(&self, selection: &Selection, attrs: &AttrToProjector) -> Transition {
        let (start, step_delay, duration) = self.timing(selection.len());
        let latest_start = self.max_total_duration - duration;
        Transition::new(tweens(
            selection,
            attrs,
            |index| (start + step_delay * index as f64).min(latest_start),
            duration,
            self.easing_mode,
        ))
    }

    fn total_time(&self, element_count: usize) -> f64 {
        let (start, step_delay, duration) = self.timing(element_count);
        // The stagger is derived by division, so rounding can overshoot.
        (start + step_delay * element_count.saturating_sub(1) as f64 + duration)
            .min(self.max_total_duration)
    }
}
