// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render batching through the controller.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use kurbo::{Point, Rect, Size};
use peniko::Brush;
use peniko::color::palette::css;
use plinth_layout::{
    ComponentTree, Domain, DrawCommand, FrameRequester, Label, LayoutError,
    QuantitativeScale, RecordingSurface, RenderContext, RenderController, RenderPolicy,
    ScaleResponse, Widget, XAlignment,
};
use plinth_text::{HeuristicTextMeasurer, TextStyle};

#[derive(Debug, Default)]
struct Frames(Rc<RefCell<Vec<RenderPolicy>>>);

impl FrameRequester for Frames {
    fn request_frame(&mut self, policy: RenderPolicy) {
        self.0.borrow_mut().push(policy);
    }
}

/// Fills its bounds and counts how often it was drawn.
#[derive(Debug, Default)]
struct Swatch {
    draws: Rc<RefCell<u32>>,
}

impl Widget for Swatch {
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        *self.draws.borrow_mut() += 1;
        let size = ctx.size();
        ctx.fill_rect(
            Rect::from_origin_size(Point::ZERO, size),
            Brush::Solid(css::STEEL_BLUE),
        );
    }
}

/// Asks to be drawn again from inside its own render.
#[derive(Debug)]
struct Restless {
    controller: RenderController,
    remaining: u32,
}

impl Widget for Restless {
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.controller.register_to_render(ctx.id());
        }
    }
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(Size::new(300.0, 200.0))
}

#[test]
fn many_changes_flush_as_one_layout_and_one_render_each() {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let controller = RenderController::new(RenderPolicy::AnimationFrame)
        .with_frame_requester(Frames(Rc::clone(&frames)));
    let mut tree = ComponentTree::with_controller(controller);
    let draws = Rc::new(RefCell::new(0));
    let a = tree.insert(Swatch {
        draws: Rc::clone(&draws),
    });
    let b = tree.create_component();
    let table = tree.create_table([[Some(a), Some(b)]]).unwrap();
    tree.anchor(table, surface()).unwrap();

    tree.set_column_weight(table, 0, Some(2.0)).unwrap();
    tree.set_x_alignment(a, XAlignment::Center).unwrap();
    tree.render(a).unwrap();
    tree.render(b).unwrap();
    tree.redraw(table).unwrap();
    assert_eq!(frames.borrow().len(), 1, "one frame per batch");
    assert_eq!(*draws.borrow(), 0, "nothing drawn before the flush");

    let report = tree.flush();

    assert_eq!(report.laid_out, vec![table]);
    assert_eq!(report.rendered, vec![table, a, b], "parents before children");
    assert_eq!(*draws.borrow(), 1);
    assert_eq!(tree.controller().flush_count(), 1);
    assert!(tree.flush().is_empty());
}

#[test]
fn immediate_policy_flushes_before_returning() {
    let mut tree = ComponentTree::with_controller(RenderController::new(RenderPolicy::Immediate));
    let draws = Rc::new(RefCell::new(0));
    let swatch = tree.insert(Swatch {
        draws: Rc::clone(&draws),
    });
    tree.anchor(swatch, surface()).unwrap();

    tree.redraw(swatch).unwrap();
    assert_eq!(*draws.borrow(), 1);
    assert!(!tree.controller().has_pending());
    assert_eq!(tree.size(swatch).unwrap(), Some(Size::new(300.0, 200.0)));
}

#[test]
fn registrations_made_while_rendering_wait_for_the_next_flush() {
    let mut tree = ComponentTree::new();
    let restless = tree.insert(Restless {
        controller: tree.controller().clone(),
        remaining: 1,
    });
    tree.anchor(restless, surface()).unwrap();
    tree.redraw(restless).unwrap();

    let first = tree.flush();
    assert_eq!(first.rendered, vec![restless]);
    assert!(tree.controller().has_pending());
    assert!(tree.controller().is_frame_requested());

    let second = tree.flush();
    assert!(second.laid_out.is_empty());
    assert_eq!(second.rendered, vec![restless]);
    assert!(!tree.controller().has_pending());
}

#[test]
fn a_failing_root_does_not_block_other_roots() {
    let mut tree = ComponentTree::new();
    let wide = tree.create_component();
    tree.set_col_minimum(wide, 500.0).unwrap();
    let cramped = tree.create_table([[Some(wide)]]).unwrap();
    let draws = Rc::new(RefCell::new(0));
    let healthy = tree.insert(Swatch {
        draws: Rc::clone(&draws),
    });
    tree.anchor(cramped, surface()).unwrap();
    tree.anchor(healthy, surface()).unwrap();
    tree.redraw(cramped).unwrap();
    tree.redraw(healthy).unwrap();

    let report = tree.flush();

    assert_eq!(report.laid_out, vec![healthy]);
    assert_eq!(report.rendered, vec![healthy]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, cramped);
    assert!(matches!(
        report.failures[0].1,
        LayoutError::InsufficientSpace { .. }
    ));
    assert_eq!(*draws.borrow(), 1);
}

#[test]
fn scale_updates_queue_work_without_flushing() {
    let mut tree = ComponentTree::new();
    let plot = tree.create_component();
    let axis = tree.create_component();
    let table = tree.create_table([[Some(axis), Some(plot)]]).unwrap();
    tree.anchor(table, surface()).unwrap();
    tree.flush();

    let mut scale = QuantitativeScale::new();
    tree.invalidate_on_update(plot, &mut scale, ScaleResponse::Render);
    let key = tree.invalidate_on_update(axis, &mut scale, ScaleResponse::Relayout);
    scale.set_domain(Domain::new(0.0, 50.0));
    assert!(tree.controller().has_pending());

    let report = tree.flush();
    assert_eq!(report.laid_out, vec![table]);
    assert!(report.rendered.contains(&plot));
    assert!(report.rendered.contains(&axis));

    assert!(scale.off_update(key));
    scale.auto_domain(&[Domain::new(0.0, 10.0)]);
    let report = tree.flush();
    assert!(report.laid_out.is_empty());
    assert_eq!(report.rendered, vec![plot]);
}

#[test]
fn destroyed_components_drop_their_scale_subscriptions() {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let controller = RenderController::new(RenderPolicy::AnimationFrame)
        .with_frame_requester(Frames(Rc::clone(&frames)));
    let mut tree = ComponentTree::with_controller(controller);
    let plot = tree.create_component();
    let axis = tree.create_component();
    let table = tree.create_table([[Some(axis), Some(plot)]]).unwrap();
    tree.anchor(table, surface()).unwrap();
    tree.flush();
    frames.borrow_mut().clear();

    let mut scale = QuantitativeScale::new();
    tree.invalidate_on_update(plot, &mut scale, ScaleResponse::Render);
    tree.invalidate_on_update(axis, &mut scale, ScaleResponse::Relayout);
    assert_eq!(scale.subscriber_count(), 2);

    tree.destroy(table).unwrap();
    tree.flush();
    frames.borrow_mut().clear();
    scale.set_domain(Domain::new(0.0, 50.0));

    assert_eq!(scale.subscriber_count(), 0);
    assert!(!tree.controller().has_pending());
    assert!(frames.borrow().is_empty(), "no frame for dead components");
}

#[test]
fn render_to_draws_boxes_and_content_in_root_coordinates() {
    let mut tree = ComponentTree::new();
    let title = tree.insert(
        Label::new("Sales", Arc::new(HeuristicTextMeasurer)).with_style(TextStyle::new(10.0)),
    );
    tree.set_x_alignment(title, XAlignment::Center).unwrap();
    let plot = tree.insert(Swatch::default());
    let table = tree.create_table([[Some(title)], [Some(plot)]]).unwrap();
    let canvas = surface();
    let log = canvas.log();

    let report = tree.render_to(table, canvas).unwrap();
    assert_eq!(report.laid_out, vec![table]);

    tree.add_box(plot, "plot-background").unwrap();
    tree.flush();

    let commands = log.commands();
    assert!(commands.contains(&DrawCommand::Text {
        origin: Point::new(135.0, 0.0),
        text: "Sales".to_string(),
        font_size: 10.0,
        brush: Brush::default(),
    }));
    let plot_rect = Rect::new(0.0, 10.0, 300.0, 200.0);
    assert!(commands.contains(&DrawCommand::FillRect {
        rect: plot_rect,
        brush: Brush::Solid(css::STEEL_BLUE),
    }));
    assert!(commands.contains(&DrawCommand::Box {
        class: "plot-background".to_string(),
        rect: plot_rect,
    }));
}

#[test]
fn boxes_need_an_anchor_and_destroyed_handles_are_rejected() {
    let mut tree = ComponentTree::new();
    let c = tree.create_component();
    assert_eq!(tree.add_box(c, "frame"), Err(LayoutError::BoxBeforeAnchor));

    tree.destroy(c).unwrap();
    assert_eq!(tree.render(c), Err(LayoutError::Destroyed));
    assert_eq!(
        tree.anchor(c, surface()).unwrap_err().to_string(),
        "can't reuse destroy()-ed components"
    );
    assert_eq!(tree.root(c), Err(LayoutError::Destroyed));
}
