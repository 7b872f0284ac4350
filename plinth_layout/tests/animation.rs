// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animator timing and multi-step draws.

use plinth_layout::{
    Animator, AttrToProjector, DrawStep, Drawer, EasingAnimator, EasingMode, MAIN, NullAnimator,
    PlotAnimators, RESET, Selection,
};
use rstest::rstest;

#[rstest]
#[case(EasingAnimator::new())]
#[case(EasingAnimator::new().with_start_delay(100.0).with_step_delay(40.0))]
#[case(EasingAnimator::new().with_step_duration(900.0).with_step_delay(5.0))]
fn budgeted_transitions_finish_in_time(#[case] easing: EasingAnimator) {
    let easing = easing.with_max_total_duration(600.0);
    for n in 1..50 {
        let total = easing.total_time(n);
        assert!(total <= 600.0 + 1e-9, "{n} elements take {total}ms");

        let transition = easing.animate(
            &Selection::with_len(n),
            &AttrToProjector::new().with("y", |i| i as f64),
        );
        assert!(transition.end_time() <= total + 1e-9);
    }
}

#[test]
fn unbudgeted_time_grows_with_the_selection() {
    let easing = EasingAnimator::new()
        .with_start_delay(10.0)
        .with_step_duration(100.0)
        .with_step_delay(20.0);
    assert_eq!(easing.total_time(1), 110.0);
    assert_eq!(easing.total_time(4), 170.0);
    assert_eq!(easing.total_time(0), 110.0);
}

#[test]
fn bars_grow_from_the_baseline() {
    let mut bars = Selection::with_len(3);
    for (i, height) in [5.0, 8.0, 2.0].into_iter().enumerate() {
        bars.get_mut(i).unwrap().set("height", height);
    }
    let animators = PlotAnimators::new().with_animated(true).with_animator(
        MAIN,
        EasingAnimator::new()
            .with_step_duration(100.0)
            .with_step_delay(50.0)
            .with_easing_mode(EasingMode::Linear),
    );
    let steps = animators.draw_steps(
        AttrToProjector::new().with("height", |_| 0.0),
        AttrToProjector::new().with("height", |i| 10.0 * (i + 1) as f64),
    );

    let plan = Drawer.draw(&bars, &steps);
    assert_eq!(plan.offsets(), vec![0.0, 0.0], "reset is instant");
    assert_eq!(plan.total_time(), 200.0);

    let mut state = bars.clone();
    plan.sample(&mut state, 50.0);
    assert_eq!(state.attr(0, "height"), Some(5.0));
    assert_eq!(state.attr(1, "height"), Some(0.0), "second bar waits its turn");
    plan.finish(&mut state);
    assert_eq!(state.attr(2, "height"), Some(30.0));
}

#[test]
fn steps_run_back_to_back() {
    let slow = EasingAnimator::new()
        .with_step_duration(250.0)
        .with_step_delay(0.0);
    let steps = vec![
        DrawStep::new(AttrToProjector::new().with("x", |_| 1.0), slow),
        DrawStep::new(AttrToProjector::new().with("x", |_| 2.0), NullAnimator),
        DrawStep::new(AttrToProjector::new().with("x", |_| 3.0), slow),
    ];

    let plan = Drawer.draw(&Selection::with_len(2), &steps);

    assert_eq!(plan.offsets(), vec![0.0, 250.0, 250.0]);
    assert_eq!(plan.total_time(), Drawer.total_draw_time(2, &steps));
    assert_eq!(plan.transitions().count(), 3);
}

#[test]
fn unset_keys_fall_back_to_instant_animators() {
    let animators = PlotAnimators::new();
    assert!(!animators.is_animated());
    assert_eq!(animators.animator(RESET).total_time(20), 0.0);
    assert_eq!(animators.animator("hover").total_time(20), 0.0);
    assert!(animators.animator(MAIN).total_time(20) > 0.0);
}
