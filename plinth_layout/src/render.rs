// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scheduling and drawing.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::controller::RenderPolicy;
use crate::error::LayoutError;
use crate::id::ComponentId;
use crate::surface::Surface;
use crate::tree::{ComponentTree, NodeKind};
use crate::widget::RenderContext;

/// What a [`ComponentTree::flush`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlushReport {
    /// Roots that were laid out, in order.
    pub laid_out: Vec<ComponentId>,
    /// Components that were drawn, in order.
    pub rendered: Vec<ComponentId>,
    /// Roots whose layout failed; their subtrees were not drawn.
    pub failures: Vec<(ComponentId, LayoutError)>,
}

impl FlushReport {
    /// Returns `true` if the flush had nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.laid_out.is_empty() && self.rendered.is_empty() && self.failures.is_empty()
    }
}

impl ComponentTree {
    /// Schedules `id` to be drawn on the next flush.
    ///
    /// A no-op until the component is anchored and set up.
    pub fn render(&mut self, id: ComponentId) -> Result<(), LayoutError> {
        let node = self.node(id)?;
        if node.anchored && node.setup {
            self.controller.register_to_render(id);
            self.flush_if_immediate();
        }
        Ok(())
    }

    /// Schedules the root of `id` for layout and drawing on the next flush.
    ///
    /// Layout-affecting setters call this.
    pub fn redraw(&mut self, id: ComponentId) -> Result<(), LayoutError> {
        self.node(id)?;
        self.request_redraw(id);
        self.flush_if_immediate();
        Ok(())
    }

    pub(crate) fn request_redraw(&self, id: ComponentId) {
        let root = self.root_of(id);
        if let Some(node) = self.node_at(root)
            && node.anchored
            && node.setup
        {
            self.controller.register_to_compute_layout_and_render(root);
        }
    }

    pub(crate) fn flush_if_immediate(&mut self) {
        if self.controller.policy() == RenderPolicy::Immediate
            && !self.controller.is_flushing()
            && self.controller.has_pending()
        {
            self.flush();
        }
    }

    /// Draws `id` and its subtree right away, without layout.
    ///
    /// Components that were never laid out, or whose root has no surface,
    /// are skipped.
    pub fn render_immediately(&mut self, id: ComponentId) -> Result<(), LayoutError> {
        self.node(id)?;
        for at in self.subtree(id) {
            self.draw_node(at);
        }
        Ok(())
    }

    /// Draws one component (not its children) onto its root's surface.
    fn draw_node(&mut self, id: ComponentId) -> bool {
        let root = self.root_of(id);
        let Some(bounds) = self.root_bounds(id) else {
            return false;
        };
        let Some(mut surface) = self.node_at_mut(root).and_then(|n| n.surface.take()) else {
            return false;
        };
        if let Some(node) = self.node_at_mut(id) {
            for class in &node.boxes {
                surface.draw_box(class, bounds);
            }
            if let NodeKind::Leaf(widget) = &mut node.kind {
                let mut ctx = RenderContext::new(id, bounds, &mut *surface);
                widget.render(&mut ctx);
            }
        }
        if let Some(node) = self.node_at_mut(root) {
            node.surface = Some(surface);
        }
        true
    }

    /// Runs every pending layout and render.
    ///
    /// Roots in the layout queue are laid out first, each once. A root whose
    /// layout fails is logged and reported, and nothing under it is drawn;
    /// other roots proceed. Then every queued component and its subtree is
    /// drawn once. Anything registered while this runs waits for the next
    /// flush.
    pub fn flush(&mut self) -> FlushReport {
        let mut report = FlushReport::default();
        let Some(batch) = self.controller.begin_flush() else {
            return report;
        };

        let mut roots: Vec<ComponentId> = Vec::new();
        for id in batch.layout {
            if !self.contains(id) {
                continue;
            }
            let root = self.root_of(id);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }

        for root in roots {
            if !self.node_at(root).is_some_and(|n| n.anchored) {
                continue;
            }
            match self.compute_layout(root, None) {
                Ok(()) => report.laid_out.push(root),
                Err(err) => {
                    log::warn!("layout of {root:?} failed: {err}");
                    report.failures.push((root, err));
                }
            }
        }

        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for id in batch.render {
            let Some(node) = self.node_at(id) else {
                continue;
            };
            if !(node.anchored && node.setup) {
                continue;
            }
            let root = self.root_of(id);
            if report.failures.iter().any(|(failed, _)| *failed == root) {
                continue;
            }
            for at in self.subtree(id) {
                if seen.insert(at) {
                    order.push(at);
                }
            }
        }
        for id in order {
            if self.draw_node(id) {
                report.rendered.push(id);
            }
        }

        self.controller.end_flush();
        log::debug!(
            "flush: {} laid out, {} rendered, {} failed",
            report.laid_out.len(),
            report.rendered.len(),
            report.failures.len()
        );
        report
    }

    /// Anchors `id` to `surface`, lays it out, and draws it right away.
    ///
    /// Returns the layout error of this root, if any. Other pending work is
    /// flushed along with it.
    pub fn render_to(
        &mut self,
        id: ComponentId,
        surface: impl Surface + 'static,
    ) -> Result<FlushReport, LayoutError> {
        self.detach(id)?;
        self.anchor(id, surface)?;
        self.controller.register_to_compute_layout_and_render(id);
        let report = self.flush();
        if let Some((_, err)) = report.failures.iter().find(|(root, _)| *root == id) {
            return Err(err.clone());
        }
        Ok(report)
    }
}
