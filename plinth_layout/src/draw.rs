// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-step animated draws.
//!
//! A plot draws in steps. When animated, the `RESET` step first moves
//! elements to a baseline (bars at zero height, points at the axis) and the
//! `MAIN` step then animates them to their projected values. Each step
//! starts when the previous one's total time has elapsed.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::animator::{Animator, EasingAnimator, NullAnimator};
use crate::transition::{AttrToProjector, Selection, Transition};

/// Key of the step that moves elements to their baseline.
pub const RESET: &str = "reset";

/// Key of the step that moves elements to their projected values.
pub const MAIN: &str = "main";

/// Target attributes plus the animator that times the change.
#[derive(Clone, Debug)]
pub struct DrawStep {
    /// Target values per attribute.
    pub attr_to_projector: AttrToProjector,
    /// Timing of the change.
    pub animator: Rc<dyn Animator>,
}

impl DrawStep {
    /// Creates a step.
    #[must_use]
    pub fn new(attr_to_projector: AttrToProjector, animator: impl Animator + 'static) -> Self {
        Self {
            attr_to_projector,
            animator: Rc::new(animator),
        }
    }
}

/// The timeline produced by [`Drawer::draw`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawPlan {
    steps: Vec<(f64, Transition)>,
    total_time: f64,
}

impl DrawPlan {
    /// Start offset of each step, in milliseconds.
    #[must_use]
    pub fn offsets(&self) -> Vec<f64> {
        self.steps.iter().map(|(offset, _)| *offset).collect()
    }

    /// Transitions of each step, in order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.steps.iter().map(|(_, transition)| transition)
    }

    /// Sum of the steps' total times.
    #[must_use]
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Writes the state at `t` milliseconds into `selection`.
    ///
    /// `selection` should hold the state the plan was built from.
    pub fn sample(&self, selection: &mut Selection, t: f64) {
        for (offset, transition) in &self.steps {
            if t < *offset {
                break;
            }
            transition.sample(selection, t - offset);
        }
    }

    /// Writes the final state into `selection`.
    pub fn finish(&self, selection: &mut Selection) {
        self.sample(selection, f64::INFINITY);
    }
}

/// Runs draw steps over a selection.
#[derive(Clone, Copy, Debug, Default)]
pub struct Drawer;

impl Drawer {
    /// Builds the timeline for `steps` applied to `selection`.
    ///
    /// Each step animates from the state the previous step ends in and is
    /// offset by the previous steps' total time for `selection.len()`
    /// elements.
    #[must_use]
    pub fn draw(&self, selection: &Selection, steps: &[DrawStep]) -> DrawPlan {
        let count = selection.len();
        let mut working = selection.clone();
        let mut plan = DrawPlan::default();
        let mut offset = 0.0;
        for step in steps {
            let transition = step.animator.animate(&working, &step.attr_to_projector);
            transition.finish(&mut working);
            plan.steps.push((offset, transition));
            offset += step.animator.total_time(count);
        }
        plan.total_time = offset;
        plan
    }

    /// Total time `steps` take for `element_count` elements.
    #[must_use]
    pub fn total_draw_time(&self, element_count: usize, steps: &[DrawStep]) -> f64 {
        steps
            .iter()
            .map(|step| step.animator.total_time(element_count))
            .sum()
    }
}

/// Per-plot animator configuration.
///
/// Unset keys fall back to [`NullAnimator`] for `RESET` (and any unknown
/// key) and to a default [`EasingAnimator`] for `MAIN`.
#[derive(Clone, Debug, Default)]
pub struct PlotAnimators {
    animated: bool,
    animators: BTreeMap<String, Rc<dyn Animator>>,
}

impl PlotAnimators {
    /// Unanimated, with default animators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables animation.
    #[must_use]
    pub fn with_animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    /// Overrides the animator for `key`.
    #[must_use]
    pub fn with_animator(mut self, key: &str, animator: impl Animator + 'static) -> Self {
        self.set_animator(key, animator);
        self
    }

    /// Whether draws are animated.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Enables or disables animation.
    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
    }

    /// Overrides the animator for `key`.
    pub fn set_animator(&mut self, key: &str, animator: impl Animator + 'static) {
        self.animators.insert(key.to_string(), Rc::new(animator));
    }

    /// The animator for `key`.
    #[must_use]
    pub fn animator(&self, key: &str) -> Rc<dyn Animator> {
        if let Some(animator) = self.animators.get(key) {
            return Rc::clone(animator);
        }
        if key == MAIN {
            Rc::new(EasingAnimator::default())
        } else {
            Rc::new(NullAnimator)
        }
    }

    /// Draw steps for one draw: `[RESET, MAIN]` when animated, otherwise a
    /// single instant `MAIN` step.
    #[must_use]
    pub fn draw_steps(&self, reset: AttrToProjector, main: AttrToProjector) -> Vec<DrawStep> {
        if self.animated {
            vec![
                DrawStep {
                    attr_to_projector: reset,
                    animator: self.animator(RESET),
                },
                DrawStep {
                    attr_to_projector: main,
                    animator: self.animator(MAIN),
                },
            ]
        } else {
            vec![DrawStep::new(main, NullAnimator)]
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::animator::EasingMode;

    fn linear(duration: f64) -> EasingAnimator {
        EasingAnimator::new()
            .with_step_duration(duration)
            .with_step_delay(0.0)
            .with_easing_mode(EasingMode::Linear)
    }

    #[test]
    fn steps_are_offset_by_previous_total_time() {
        let steps = [
            DrawStep::new(AttrToProjector::new().with("h", |_| 0.0), linear(100.0)),
            DrawStep::new(AttrToProjector::new().with("h", |i| 10.0 * (i + 1) as f64), linear(200.0)),
        ];
        let selection = Selection::with_len(2);

        let plan = Drawer.draw(&selection, &steps);

        assert_eq!(plan.offsets(), vec![0.0, 100.0]);
        assert_eq!(plan.total_time(), 300.0);
        assert_eq!(Drawer.total_draw_time(2, &steps), 300.0);
    }

    #[test]
    fn later_steps_start_from_earlier_end_state() {
        let mut selection = Selection::with_len(1);
        selection.get_mut(0).unwrap().set("h", 50.0);
        let steps = [
            DrawStep::new(AttrToProjector::new().with("h", |_| 0.0), linear(100.0)),
            DrawStep::new(AttrToProjector::new().with("h", |_| 20.0), linear(100.0)),
        ];

        let plan = Drawer.draw(&selection, &steps);
        let second = plan.transitions().nth(1).unwrap();
        assert_eq!(second.tweens()[0].from, 0.0);

        let mut state = selection.clone();
        plan.sample(&mut state, 50.0);
        assert_eq!(state.attr(0, "h"), Some(25.0));
        plan.sample(&mut state, 150.0);
        assert_eq!(state.attr(0, "h"), Some(10.0));
        plan.finish(&mut state);
        assert_eq!(state.attr(0, "h"), Some(20.0));
    }

    #[test]
    fn plot_animators_defaults() {
        let animators = PlotAnimators::new();
        assert_eq!(animators.animator(RESET).total_time(10), 0.0);
        assert_eq!(
            animators.animator(MAIN).total_time(1),
            EasingAnimator::default().total_time(1)
        );

        let steps = animators.draw_steps(AttrToProjector::new(), AttrToProjector::new());
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].animator.total_time(5), 0.0);
    }

    #[test]
    fn animated_plots_reset_then_draw() {
        let animators = PlotAnimators::new()
            .with_animated(true)
            .with_animator(MAIN, linear(120.0));
        let steps = animators.draw_steps(
            AttrToProjector::new().with("h", |_| 0.0),
            AttrToProjector::new().with("h", |_| 5.0),
        );

        assert_eq!(steps.len(), 2);
        let plan = Drawer.draw(&Selection::with_len(3), &steps);
        assert_eq!(plan.offsets(), vec![0.0, 0.0]);
        assert_eq!(plan.total_time(), 120.0);
    }
}
