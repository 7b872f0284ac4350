// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measure and arrange.
//!
//! - **Measure**: [`ComponentTree::requested_space`] asks a component how much
//!   room it needs for a given offer. It is pure: nothing is stored.
//! - **Arrange**: [`ComponentTree::compute_layout`] assigns an origin and size
//!   and recurses into children.

use alloc::vec::Vec;

use kurbo::{Point, Size};

use crate::error::LayoutError;
use crate::id::ComponentId;
use crate::space::{Axis, LayoutOffer, SpaceRequest};
use crate::table::{Table, TableAllocation};
use crate::tree::{ComponentTree, NodeKind};

impl ComponentTree {
    /// Minimum space `id` needs when offered `available_width` by
    /// `available_height`.
    pub fn requested_space(
        &self,
        id: ComponentId,
        available_width: f64,
        available_height: f64,
    ) -> Result<SpaceRequest, LayoutError> {
        self.node(id)?;
        Ok(self.space_request(id, available_width, available_height))
    }

    pub(crate) fn space_request(&self, id: ComponentId, width: f64, height: f64) -> SpaceRequest {
        let Some(node) = self.node_at(id) else {
            return SpaceRequest::ZERO;
        };
        match &node.kind {
            NodeKind::Leaf(widget) => widget
                .requested_space(width, height)
                .max(SpaceRequest::new(node.col_minimum, node.row_minimum)),
            NodeKind::Group(children) => children.iter().fold(SpaceRequest::ZERO, |acc, &child| {
                acc.max(self.space_request(child, width, height))
            }),
            NodeKind::Table(table) => self.solve_table(table, width, height).requested_space(),
        }
    }

    /// Whether `id` keeps its requested width instead of stretching.
    ///
    /// Containers are fixed on an axis when all of their children are.
    pub fn fixed_width(&self, id: ComponentId) -> Result<bool, LayoutError> {
        self.node(id)?;
        Ok(self.is_fixed(id, Axis::Horizontal))
    }

    /// Whether `id` keeps its requested height instead of stretching.
    pub fn fixed_height(&self, id: ComponentId) -> Result<bool, LayoutError> {
        self.node(id)?;
        Ok(self.is_fixed(id, Axis::Vertical))
    }

    pub(crate) fn is_fixed(&self, id: ComponentId, axis: Axis) -> bool {
        let Some(node) = self.node_at(id) else {
            return true;
        };
        match &node.kind {
            NodeKind::Leaf(widget) => match axis {
                Axis::Horizontal => node.fixed_width || widget.fixed_width(),
                Axis::Vertical => node.fixed_height || widget.fixed_height(),
            },
            NodeKind::Group(children) => children.iter().all(|&c| self.is_fixed(c, axis)),
            NodeKind::Table(table) => table.cells().all(|(_, _, c)| self.is_fixed(c, axis)),
        }
    }

    pub(crate) fn solve_table(&self, table: &Table, width: f64, height: f64) -> TableAllocation {
        table.allocate(
            width,
            height,
            &|child, w, h| self.space_request(child, w, h),
            &|child, axis| self.is_fixed(child, axis),
        )
    }

    /// Runs the solver of table `id` for an offer of `width` by `height`
    /// without laying anything out.
    pub fn table_allocation(
        &self,
        id: ComponentId,
        width: f64,
        height: f64,
    ) -> Result<TableAllocation, LayoutError> {
        match &self.node(id)?.kind {
            NodeKind::Table(table) => Ok(self.solve_table(table, width, height)),
            _ => Err(LayoutError::NotAContainer { expected: "table" }),
        }
    }

    /// Lays out `id` and its subtree.
    ///
    /// With `None`, an anchored root is offered its surface's size at
    /// `(0, 0)`. A non-root needs an explicit offer. The component must be
    /// anchored either way.
    ///
    /// Calling this twice with the same offer yields the same layout.
    pub fn compute_layout(
        &mut self,
        id: ComponentId,
        offer: Option<LayoutOffer>,
    ) -> Result<(), LayoutError> {
        let node = self.node(id)?;
        if !node.anchored {
            return Err(LayoutError::NotAnchored);
        }
        let offer = match offer {
            Some(offer) => offer,
            None => match &node.surface {
                Some(surface) => LayoutOffer::from_size(surface.size()),
                None => return Err(LayoutError::MissingOffer),
            },
        };
        self.layout_node(id, offer)
    }

    fn size_from_offer(&self, id: ComponentId, width: f64, height: f64) -> Size {
        let fixed_width = self.is_fixed(id, Axis::Horizontal);
        let fixed_height = self.is_fixed(id, Axis::Vertical);
        if !fixed_width && !fixed_height {
            return Size::new(width, height);
        }
        let request = self.space_request(id, width, height);
        Size::new(
            if fixed_width { width.min(request.min_width) } else { width },
            if fixed_height { height.min(request.min_height) } else { height },
        )
    }

    fn layout_node(&mut self, id: ComponentId, offer: LayoutOffer) -> Result<(), LayoutError> {
        let size = self.size_from_offer(id, offer.width, offer.height);
        let node = self.node_mut(id)?;
        node.origin = Point::new(
            offer.origin.x + (offer.width - size.width) * node.x_alignment.proportion(),
            offer.origin.y + (offer.height - size.height) * node.y_alignment.proportion(),
        );
        node.size = Some(size);
        match &mut node.kind {
            NodeKind::Leaf(widget) => {
                widget.on_resize(size);
                Ok(())
            }
            NodeKind::Group(children) => {
                let children = children.clone();
                for child in children {
                    self.layout_node(child, LayoutOffer::from_size(size))?;
                }
                Ok(())
            }
            NodeKind::Table(_) => self.layout_table(id, size),
        }
    }

    fn layout_table(&mut self, id: ComponentId, size: Size) -> Result<(), LayoutError> {
        let Some(NodeKind::Table(table)) = self.node_at(id).map(|n| &n.kind) else {
            return Ok(());
        };
        let allocation = self.solve_table(table, size.width, size.height);
        allocation.ensure_fits(size.width, size.height, table.config.tolerance)?;
        let cells: Vec<_> = table.cells().collect();

        let xs = allocation.column_offsets();
        let ys = allocation.row_offsets();
        for (row, col, child) in cells {
            let offer = LayoutOffer::new(
                (xs[col], ys[row]),
                allocation.column_widths[col],
                allocation.row_heights[row],
            );
            self.layout_node(child, offer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::surface::RecordingSurface;

    fn anchored_leaf(tree: &mut ComponentTree, width: f64, height: f64) -> ComponentId {
        let c = tree.create_component();
        tree.anchor(c, RecordingSurface::new(Size::new(width, height)))
            .unwrap();
        c
    }

    #[test]
    fn root_takes_surface_size() {
        let mut tree = ComponentTree::new();
        let c = anchored_leaf(&mut tree, 300.0, 200.0);
        tree.compute_layout(c, None).unwrap();
        assert_eq!(tree.size(c).unwrap(), Some(Size::new(300.0, 200.0)));
        assert_eq!(tree.origin(c).unwrap(), Point::ZERO);
    }

    #[test]
    fn unanchored_layout_fails() {
        let mut tree = ComponentTree::new();
        let c = tree.create_component();
        assert_eq!(tree.compute_layout(c, None), Err(LayoutError::NotAnchored));
        assert_eq!(tree.size(c).unwrap(), None);
    }

    #[test]
    fn anchored_child_needs_an_explicit_offer() {
        let mut tree = ComponentTree::new();
        let child = tree.create_component();
        let group = tree.create_group([child]).unwrap();
        tree.anchor(group, RecordingSurface::new(Size::new(50.0, 50.0)))
            .unwrap();

        assert_eq!(tree.compute_layout(child, None), Err(LayoutError::MissingOffer));
        tree.compute_layout(child, Some(LayoutOffer::new((5.0, 5.0), 10.0, 10.0)))
            .unwrap();
        assert_eq!(tree.origin(child).unwrap(), Point::new(5.0, 5.0));
    }

    #[test]
    fn fixed_axes_shrink_to_request() {
        let mut tree = ComponentTree::new();
        let c = anchored_leaf(&mut tree, 300.0, 200.0);
        tree.set_col_minimum(c, 80.0).unwrap();
        tree.set_row_minimum(c, 500.0).unwrap();
        tree.set_fixed_width(c, true).unwrap();
        tree.set_fixed_height(c, true).unwrap();

        tree.compute_layout(c, None).unwrap();

        // Fixed but larger than the offer: clamped to the offer.
        assert_eq!(tree.size(c).unwrap(), Some(Size::new(80.0, 200.0)));
    }

    #[test]
    fn leaf_request_includes_minimums() {
        let mut tree = ComponentTree::new();
        let c = tree.create_component();
        tree.set_col_minimum(c, 12.0).unwrap();
        assert_eq!(
            tree.requested_space(c, 100.0, 100.0).unwrap(),
            SpaceRequest::new(12.0, 0.0)
        );
    }
}
