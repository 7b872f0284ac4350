// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lays out a bar chart skeleton with `plinth_layout`, drives a scale update
//! and an animated draw, and writes every frame as SVG.

mod svg;

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use std::sync::Arc;

use kurbo::{Point, Rect, Size};
use peniko::Brush;
use peniko::color::palette::css;
use plinth_layout::{
    AttrToProjector, ComponentId, ComponentTree, Domain, DrawLog, Drawer, EasingAnimator,
    EasingMode, FlushReport, FrameRequester, Label, MAIN, PlotAnimators, QuantitativeScale,
    RecordingSurface, RenderContext, RenderController, RenderPolicy, ScaleResponse, Selection,
    SpaceRequest, Widget, XAlignment,
};
use plinth_text::{HeuristicTextMeasurer, TextMeasurer, TextStyle};

const CANVAS: Size = Size::new(480.0, 320.0);
const FRAME_STEP_MS: f64 = 100.0;

type SharedScale = Rc<RefCell<QuantitativeScale>>;

/// Remembers that the tree asked for a frame; the loop in `main` plays host.
#[derive(Debug, Default)]
struct HostFrames {
    requested: Rc<RefCell<u32>>,
}

impl FrameRequester for HostFrames {
    fn request_frame(&mut self, policy: RenderPolicy) {
        *self.requested.borrow_mut() += 1;
        println!("  host: frame requested ({policy:?})");
    }
}

/// Vertical value axis: tick labels right-aligned against the plot.
struct ValueAxis {
    scale: SharedScale,
    style: TextStyle,
    measurer: Arc<dyn TextMeasurer>,
}

impl std::fmt::Debug for ValueAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueAxis")
            .field("domain", &self.scale.borrow().domain())
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl ValueAxis {
    const TICKS: usize = 5;
    const TICK_LENGTH: f64 = 4.0;
    const GAP: f64 = 3.0;

    fn ticks(&self) -> Vec<(f64, String)> {
        let domain = self.scale.borrow().domain();
        (0..Self::TICKS)
            .map(|i| {
                let t = i as f64 / (Self::TICKS - 1) as f64;
                let value = domain.min + t * domain.span();
                (t, format!("{value:.0}"))
            })
            .collect()
    }

    fn label_width(&self) -> f64 {
        self.ticks()
            .iter()
            .map(|(_, text)| self.measurer.measure(text, &self.style).advance_width)
            .fold(0.0, f64::max)
    }
}

impl Widget for ValueAxis {
    fn requested_space(&self, _available_width: f64, _available_height: f64) -> SpaceRequest {
        SpaceRequest::new(self.label_width() + Self::GAP + Self::TICK_LENGTH, 0.0)
    }

    fn fixed_width(&self) -> bool {
        true
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let size = ctx.size();
        let line_height = self.style.font_size;
        for (t, text) in self.ticks() {
            let y = size.height * (1.0 - t);
            let width = self.measurer.measure(&text, &self.style).advance_width;
            ctx.fill_rect(
                Rect::new(size.width - Self::TICK_LENGTH, y - 0.5, size.width, y + 0.5),
                Brush::Solid(css::BLACK),
            );
            let x = size.width - Self::TICK_LENGTH - Self::GAP - width;
            let top = (y - line_height / 2.0).clamp(0.0, (size.height - line_height).max(0.0));
            ctx.draw_text(
                Point::new(x, top),
                &text,
                &self.style,
                Brush::Solid(css::BLACK),
            );
        }
    }
}

/// Bars whose heights come from the `height` attribute of a selection.
#[derive(Debug)]
struct Bars {
    scale: SharedScale,
    state: Selection,
}

impl Widget for Bars {
    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let size = ctx.size();
        let count = self.state.len();
        if count == 0 {
            return;
        }
        let domain = self.scale.borrow().domain();
        let band = size.width / count as f64;
        for (i, element) in self.state.elements().iter().enumerate() {
            let value = element.get("height").unwrap_or(domain.min);
            let t = if domain.span() == 0.0 {
                0.0
            } else {
                ((value - domain.min) / domain.span()).clamp(0.0, 1.0)
            };
            let top = size.height * (1.0 - t);
            let x0 = i as f64 * band + band * 0.1;
            ctx.fill_rect(
                Rect::new(x0, top, x0 + band * 0.8, size.height),
                Brush::Solid(css::STEEL_BLUE),
            );
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Chart {
    table: ComponentId,
    plot: ComponentId,
}

fn build_chart(
    tree: &mut ComponentTree,
    scale: &SharedScale,
    measurer: &Arc<dyn TextMeasurer>,
    values: &[f64],
) -> Result<Chart, Box<dyn Error>> {
    let title = tree.insert(
        Label::new("Quarterly widget sales by region", Arc::clone(measurer))
            .with_style(TextStyle::new(14.0))
            .with_padding(4.0),
    );
    tree.set_x_alignment(title, XAlignment::Center)?;

    let axis = tree.insert(ValueAxis {
        scale: Rc::clone(scale),
        style: TextStyle::new(10.0),
        measurer: Arc::clone(measurer),
    });
    let plot = tree.insert(Bars {
        scale: Rc::clone(scale),
        state: Selection::with_len(values.len()),
    });
    let baseline = tree.create_component();
    tree.set_row_minimum(baseline, 12.0)?;
    tree.set_fixed_height(baseline, true)?;

    let table = tree.create_table([
        [None, Some(title)],
        [Some(axis), Some(plot)],
        [None, Some(baseline)],
    ])?;
    tree.set_column_padding(table, 6.0)?;
    tree.set_row_padding(table, 4.0)?;

    let mut scale = scale.borrow_mut();
    tree.invalidate_on_update(plot, &mut *scale, ScaleResponse::Render);
    tree.invalidate_on_update(axis, &mut *scale, ScaleResponse::Relayout);
    Ok(Chart { table, plot })
}

/// Flushes while the host has a frame pending, the way a frame callback would.
fn run_frames(tree: &mut ComponentTree) -> FlushReport {
    let mut total = FlushReport::default();
    while tree.controller().is_frame_requested() {
        let report = tree.flush();
        for (root, err) in &report.failures {
            eprintln!("  layout of {root:?} failed: {err}");
        }
        total.laid_out.extend(report.laid_out);
        total.rendered.extend(report.rendered);
        total.failures.extend(report.failures);
    }
    total
}

fn snapshot(
    tree: &mut ComponentTree,
    chart: &Chart,
    log: &DrawLog,
    name: &str,
) -> Result<(), Box<dyn Error>> {
    drop(log.take());
    tree.render_immediately(chart.table)?;
    let frame = svg::SvgFrame::new(CANVAS, log.take());
    let path = format!("plinth_demo_{name}.svg");
    std::fs::write(&path, frame.to_svg_string())?;
    println!("  wrote {path}");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let values = [12.0, 48.0, 30.0, 95.0, 64.0, 7.0];
    let measurer: Arc<dyn TextMeasurer> = Arc::new(HeuristicTextMeasurer);
    let scale: SharedScale = Rc::new(RefCell::new(QuantitativeScale::new()));
    scale.borrow_mut().add_padding_exception(0.0);

    let frames = Rc::new(RefCell::new(0));
    let controller = RenderController::new(RenderPolicy::AnimationFrame).with_frame_requester(
        HostFrames {
            requested: Rc::clone(&frames),
        },
    );
    let mut tree = ComponentTree::with_controller(controller);
    let chart = build_chart(&mut tree, &scale, &measurer, &values)?;

    println!("first layout");
    let surface = RecordingSurface::new(CANVAS);
    let log = surface.log();
    let report = tree.render_to(chart.table, surface)?;
    println!(
        "  laid out {} root(s), drew {} component(s)",
        report.laid_out.len(),
        report.rendered.len()
    );
    snapshot(&mut tree, &chart, &log, "00_empty")?;

    println!("scale update");
    let extent = values.iter().fold(Domain::new(0.0, 0.0), |acc, &v| {
        Domain::new(acc.min.min(v), acc.max.max(v))
    });
    scale.borrow_mut().auto_domain(&[extent]);
    let report = run_frames(&mut tree);
    println!(
        "  domain {:?}: laid out {} root(s), drew {} component(s)",
        scale.borrow().domain(),
        report.laid_out.len(),
        report.rendered.len()
    );
    snapshot(&mut tree, &chart, &log, "01_scaled")?;

    println!("animated draw");
    let animators = PlotAnimators::new().with_animated(true).with_animator(
        MAIN,
        EasingAnimator::new()
            .with_step_duration(400.0)
            .with_step_delay(60.0)
            .with_max_total_duration(700.0)
            .with_easing_mode(EasingMode::CubicInOut),
    );
    let targets = values.to_vec();
    let steps = animators.draw_steps(
        AttrToProjector::new().with("height", |_| 0.0),
        AttrToProjector::new().with("height", move |i| targets[i]),
    );
    let start = tree
        .widget::<Bars>(chart.plot)
        .map(|bars| bars.state.clone())
        .unwrap_or_default();
    let plan = Drawer.draw(&start, &steps);
    println!("  {} step(s), {}ms", plan.offsets().len(), plan.total_time());

    let mut frame = 0;
    let mut t = 0.0;
    loop {
        let mut state = start.clone();
        plan.sample(&mut state, t);
        if let Some(bars) = tree.widget_mut::<Bars>(chart.plot) {
            bars.state = state;
        }
        tree.render(chart.plot)?;
        run_frames(&mut tree);
        frame += 1;
        if t >= plan.total_time() {
            break;
        }
        t = (t + FRAME_STEP_MS).min(plan.total_time());
    }
    println!("  played {frame} frame(s)");
    snapshot(&mut tree, &chart, &log, "02_final")?;

    println!("host was asked for {} frame(s)", frames.borrow());
    Ok(())
}
