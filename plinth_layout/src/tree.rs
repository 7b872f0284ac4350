// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The component arena: creation, lifecycle, and per-component properties.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::cell::Cell;
use core::fmt;

use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::alignment::{XAlignment, YAlignment};
use crate::callbacks::{CallbackKey, CallbackSet};
use crate::controller::RenderController;
use crate::error::LayoutError;
use crate::id::ComponentId;
use crate::surface::Surface;
use crate::table::Table;
use crate::widget::{Blank, Widget};

/// Children of a group, in insertion order.
pub(crate) type GroupChildren = SmallVec<[ComponentId; 4]>;

#[derive(Debug)]
pub(crate) enum NodeKind {
    Leaf(Box<dyn Widget>),
    Group(GroupChildren),
    Table(Table),
}

impl NodeKind {
    pub(crate) fn is_container(&self) -> bool {
        !matches!(self, Self::Leaf(_))
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<ComponentId>,
    pub(crate) origin: Point,
    pub(crate) size: Option<Size>,
    pub(crate) x_alignment: XAlignment,
    pub(crate) y_alignment: YAlignment,
    pub(crate) fixed_width: bool,
    pub(crate) fixed_height: bool,
    pub(crate) row_minimum: f64,
    pub(crate) col_minimum: f64,
    pub(crate) anchored: bool,
    pub(crate) setup: bool,
    pub(crate) boxes: Vec<String>,
    /// Set on anchored roots only.
    pub(crate) surface: Option<Box<dyn Surface>>,
    pub(crate) on_anchor: CallbackSet<ComponentId>,
    pub(crate) on_detach: CallbackSet<ComponentId>,
    /// Cleared when the component is destroyed; scale subscriptions watch it.
    pub(crate) alive: Rc<Cell<bool>>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            origin: Point::ZERO,
            size: None,
            x_alignment: XAlignment::default(),
            y_alignment: YAlignment::default(),
            fixed_width: false,
            fixed_height: false,
            row_minimum: 0.0,
            col_minimum: 0.0,
            anchored: false,
            setup: false,
            boxes: Vec::new(),
            surface: None,
            on_anchor: CallbackSet::new(),
            on_detach: CallbackSet::new(),
            alive: Rc::new(Cell::new(true)),
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Owner of every component of one or more charts.
///
/// Components are addressed by [`ComponentId`]. Leaves wrap a [`Widget`];
/// groups and tables are created with [`create_group`](Self::create_group)
/// and [`create_table`](Self::create_table). A component becomes renderable
/// once it, or its root, is anchored to a [`Surface`].
pub struct ComponentTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    pub(crate) controller: RenderController,
}

impl fmt::Debug for ComponentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTree")
            .field("live", &(self.slots.len() - self.free_list.len()))
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl Default for ComponentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentTree {
    /// Creates an empty tree with a default (animation-frame) controller.
    #[must_use]
    pub fn new() -> Self {
        Self::with_controller(RenderController::default())
    }

    /// Creates an empty tree driven by `controller`.
    #[must_use]
    pub fn with_controller(controller: RenderController) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            controller,
        }
    }

    /// The controller this tree registers with.
    #[must_use]
    pub fn controller(&self) -> &RenderController {
        &self.controller
    }

    fn alloc(&mut self, kind: NodeKind) -> ComponentId {
        let node = Node::new(kind);
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(node);
            return ComponentId::new(idx, slot.generation);
        }
        let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        ComponentId::new(idx, 0)
    }

    fn free(&mut self, id: ComponentId) {
        if let Some(slot) = self.slots.get_mut(id.idx as usize)
            && slot.generation == id.generation
            && let Some(node) = slot.node.take()
        {
            node.alive.set(false);
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(id.idx);
        }
    }

    pub(crate) fn node_at(&self, id: ComponentId) -> Option<&Node> {
        self.slots
            .get(id.idx as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn node_at_mut(&mut self, id: ComponentId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.idx as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn node(&self, id: ComponentId) -> Result<&Node, LayoutError> {
        self.node_at(id).ok_or(LayoutError::Destroyed)
    }

    pub(crate) fn node_mut(&mut self, id: ComponentId) -> Result<&mut Node, LayoutError> {
        self.node_at_mut(id).ok_or(LayoutError::Destroyed)
    }

    /// Returns `true` if `id` refers to a live component.
    #[must_use]
    pub fn contains(&self, id: ComponentId) -> bool {
        self.node_at(id).is_some()
    }

    /// Number of live components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Returns `true` if the tree holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a blank leaf component.
    pub fn create_component(&mut self) -> ComponentId {
        self.insert(Blank)
    }

    /// Creates a leaf component wrapping `widget`.
    pub fn insert(&mut self, widget: impl Widget) -> ComponentId {
        self.insert_boxed(Box::new(widget))
    }

    /// Creates a leaf component wrapping an already boxed widget.
    pub fn insert_boxed(&mut self, widget: Box<dyn Widget>) -> ComponentId {
        self.alloc(NodeKind::Leaf(widget))
    }

    pub(crate) fn create_container(&mut self, kind: NodeKind) -> ComponentId {
        self.alloc(kind)
    }

    /// The widget of leaf `id`, if it is a `T`.
    #[must_use]
    pub fn widget<T: Widget>(&self, id: ComponentId) -> Option<&T> {
        match &self.node_at(id)?.kind {
            NodeKind::Leaf(widget) => (&**widget as &dyn Any).downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Mutable access to the widget of leaf `id`, if it is a `T`.
    ///
    /// Does not schedule anything; see [`update_widget`](Self::update_widget).
    pub fn widget_mut<T: Widget>(&mut self, id: ComponentId) -> Option<&mut T> {
        match &mut self.node_at_mut(id)?.kind {
            NodeKind::Leaf(widget) => (&mut **widget as &mut dyn Any).downcast_mut::<T>(),
            _ => None,
        }
    }

    /// Runs `f` on the widget of leaf `id` and schedules a relayout.
    ///
    /// Returns `Ok(None)` if the leaf does not hold a `T`.
    pub fn update_widget<T: Widget, R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<Option<R>, LayoutError> {
        self.node(id)?;
        let Some(widget) = self.widget_mut::<T>(id) else {
            return Ok(None);
        };
        let out = f(widget);
        self.redraw(id)?;
        Ok(Some(out))
    }

    // --- hierarchy ---

    /// The parent container of `id`, if any.
    pub fn parent(&self, id: ComponentId) -> Result<Option<ComponentId>, LayoutError> {
        Ok(self.node(id)?.parent)
    }

    /// Returns `true` if `id` has no parent.
    pub fn is_root(&self, id: ComponentId) -> Result<bool, LayoutError> {
        Ok(self.node(id)?.parent.is_none())
    }

    /// The topmost ancestor of `id` (itself if it is a root).
    pub fn root(&self, id: ComponentId) -> Result<ComponentId, LayoutError> {
        self.node(id)?;
        Ok(self.root_of(id))
    }

    pub(crate) fn root_of(&self, id: ComponentId) -> ComponentId {
        let mut at = id;
        while let Some(parent) = self.node_at(at).and_then(|n| n.parent) {
            at = parent;
        }
        at
    }

    /// Direct children: insertion order for groups, row-major for tables,
    /// nothing for leaves.
    pub(crate) fn children_of(&self, id: ComponentId) -> Vec<ComponentId> {
        match self.node_at(id).map(|n| &n.kind) {
            Some(NodeKind::Group(children)) => children.to_vec(),
            Some(NodeKind::Table(table)) => table.cells().map(|(_, _, c)| c).collect(),
            _ => Vec::new(),
        }
    }

    /// `id` and all of its descendants, parents before children.
    pub(crate) fn subtree(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![id];
        while let Some(at) = stack.pop() {
            out.push(at);
            let children = self.children_of(at);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    pub(crate) fn is_ancestor_of(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        let mut at = Some(id);
        while let Some(current) = at {
            if current == ancestor {
                return true;
            }
            at = self.node_at(current).and_then(|n| n.parent);
        }
        false
    }

    // --- lifecycle ---

    /// Returns `true` if `id` is attached to a surface, directly or through
    /// its root.
    pub fn is_anchored(&self, id: ComponentId) -> Result<bool, LayoutError> {
        Ok(self.node(id)?.anchored)
    }

    /// Returns `true` once the component has been set up by its first anchor.
    pub fn is_setup(&self, id: ComponentId) -> Result<bool, LayoutError> {
        Ok(self.node(id)?.setup)
    }

    /// Anchors `id` as a root drawing onto `surface`.
    ///
    /// A component that currently has a parent is detached from it first.
    /// Setup runs once per component, on its first anchor; anchor callbacks
    /// run on every anchor.
    pub fn anchor(
        &mut self,
        id: ComponentId,
        surface: impl Surface + 'static,
    ) -> Result<(), LayoutError> {
        self.anchor_boxed(id, Box::new(surface))
    }

    /// Like [`anchor`](Self::anchor) for an already boxed surface.
    pub fn anchor_boxed(
        &mut self,
        id: ComponentId,
        surface: Box<dyn Surface>,
    ) -> Result<(), LayoutError> {
        if self.node(id)?.parent.is_some() {
            self.detach(id)?;
        }
        self.node_mut(id)?.surface = Some(surface);
        self.anchor_subtree(id);
        log::trace!("anchored {id:?}");
        Ok(())
    }

    pub(crate) fn anchor_subtree(&mut self, id: ComponentId) {
        for at in self.subtree(id) {
            let Some(node) = self.node_at_mut(at) else {
                continue;
            };
            node.anchored = true;
            if !node.setup {
                if let NodeKind::Leaf(widget) = &mut node.kind {
                    widget.setup();
                }
                node.setup = true;
            }
            node.on_anchor.call_callbacks(&at);
        }
    }

    fn unanchor_subtree(&mut self, id: ComponentId) {
        for at in self.subtree(id) {
            if let Some(node) = self.node_at_mut(at) {
                node.anchored = false;
                node.surface = None;
            }
        }
    }

    /// Removes `id` from its parent (or from its surface, for a root).
    ///
    /// The component stays alive and can be added or anchored again. Detach
    /// callbacks run if it was anchored.
    pub fn detach(&mut self, id: ComponentId) -> Result<(), LayoutError> {
        let node = self.node(id)?;
        let parent = node.parent;
        let was_anchored = node.anchored;
        if let Some(parent) = parent {
            self.unlink(parent, id);
            self.node_mut(id)?.parent = None;
            self.request_redraw(parent);
        }
        self.unanchor_subtree(id);
        if was_anchored {
            self.node_mut(id)?.on_detach.call_callbacks(&id);
        }
        self.flush_if_immediate();
        Ok(())
    }

    /// Removes `child` from `parent`'s children without touching the child.
    pub(crate) fn unlink(&mut self, parent: ComponentId, child: ComponentId) {
        match self.node_at_mut(parent).map(|n| &mut n.kind) {
            Some(NodeKind::Group(children)) => children.retain(|c| *c != child),
            Some(NodeKind::Table(table)) => {
                table.clear(child);
            }
            _ => {}
        }
    }

    /// Destroys `id` and, for containers, its whole subtree.
    ///
    /// Destroyed handles are rejected by every later call with
    /// [`LayoutError::Destroyed`].
    pub fn destroy(&mut self, id: ComponentId) -> Result<(), LayoutError> {
        self.node(id)?;
        for child in self.children_of(id) {
            self.destroy(child)?;
        }
        self.detach(id)?;
        self.free(id);
        log::trace!("destroyed {id:?}");
        Ok(())
    }

    /// Registers a callback run each time `id` is anchored.
    pub fn on_anchor(
        &mut self,
        id: ComponentId,
        callback: impl FnMut(&ComponentId) + 'static,
    ) -> Result<CallbackKey, LayoutError> {
        Ok(self.node_mut(id)?.on_anchor.add(callback))
    }

    /// Removes an anchor callback.
    pub fn off_anchor(&mut self, id: ComponentId, key: CallbackKey) -> Result<bool, LayoutError> {
        Ok(self.node_mut(id)?.on_anchor.remove(key))
    }

    /// Registers a callback run each time `id` is detached while anchored.
    pub fn on_detach(
        &mut self,
        id: ComponentId,
        callback: impl FnMut(&ComponentId) + 'static,
    ) -> Result<CallbackKey, LayoutError> {
        Ok(self.node_mut(id)?.on_detach.add(callback))
    }

    /// Removes a detach callback.
    pub fn off_detach(&mut self, id: ComponentId, key: CallbackKey) -> Result<bool, LayoutError> {
        Ok(self.node_mut(id)?.on_detach.remove(key))
    }

    // --- decoration boxes ---

    /// Adds a named decoration box that covers the component.
    pub fn add_box(&mut self, id: ComponentId, class: &str) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        if !node.anchored {
            return Err(LayoutError::BoxBeforeAnchor);
        }
        node.boxes.push(class.to_string());
        self.render(id)
    }

    /// Class names of the component's decoration boxes.
    pub fn boxes(&self, id: ComponentId) -> Result<&[String], LayoutError> {
        Ok(&self.node(id)?.boxes)
    }

    // --- placement properties ---

    /// Horizontal alignment within the offered space.
    pub fn x_alignment(&self, id: ComponentId) -> Result<XAlignment, LayoutError> {
        Ok(self.node(id)?.x_alignment)
    }

    /// Sets the horizontal alignment and schedules a relayout.
    pub fn set_x_alignment(
        &mut self,
        id: ComponentId,
        alignment: XAlignment,
    ) -> Result<(), LayoutError> {
        self.node_mut(id)?.x_alignment = alignment;
        self.redraw(id)
    }

    /// Vertical alignment within the offered space.
    pub fn y_alignment(&self, id: ComponentId) -> Result<YAlignment, LayoutError> {
        Ok(self.node(id)?.y_alignment)
    }

    /// Sets the vertical alignment and schedules a relayout.
    pub fn set_y_alignment(
        &mut self,
        id: ComponentId,
        alignment: YAlignment,
    ) -> Result<(), LayoutError> {
        self.node_mut(id)?.y_alignment = alignment;
        self.redraw(id)
    }

    /// Makes a leaf keep its requested width instead of stretching.
    pub fn set_fixed_width(&mut self, id: ComponentId, fixed: bool) -> Result<(), LayoutError> {
        let node = self.leaf_node_mut(id, "fixed_width")?;
        node.fixed_width = fixed;
        self.redraw(id)
    }

    /// Makes a leaf keep its requested height instead of stretching.
    pub fn set_fixed_height(&mut self, id: ComponentId, fixed: bool) -> Result<(), LayoutError> {
        let node = self.leaf_node_mut(id, "fixed_height")?;
        node.fixed_height = fixed;
        self.redraw(id)
    }

    /// Configured minimum height of a leaf.
    pub fn row_minimum(&self, id: ComponentId) -> Result<f64, LayoutError> {
        Ok(self.node(id)?.row_minimum)
    }

    /// Sets the minimum height a leaf requests. Fails on containers, whose
    /// minimum is derived from their children.
    pub fn set_row_minimum(&mut self, id: ComponentId, minimum: f64) -> Result<(), LayoutError> {
        let node = self.leaf_node_mut(id, "row_minimum")?;
        node.row_minimum = minimum.max(0.0);
        self.redraw(id)
    }

    /// Configured minimum width of a leaf.
    pub fn col_minimum(&self, id: ComponentId) -> Result<f64, LayoutError> {
        Ok(self.node(id)?.col_minimum)
    }

    /// Sets the minimum width a leaf requests. Fails on containers.
    pub fn set_col_minimum(&mut self, id: ComponentId, minimum: f64) -> Result<(), LayoutError> {
        let node = self.leaf_node_mut(id, "col_minimum")?;
        node.col_minimum = minimum.max(0.0);
        self.redraw(id)
    }

    fn leaf_node_mut(
        &mut self,
        id: ComponentId,
        property: &'static str,
    ) -> Result<&mut Node, LayoutError> {
        let node = self.node_mut(id)?;
        if node.kind.is_container() {
            return Err(LayoutError::DerivedSize { property });
        }
        Ok(node)
    }

    // --- layout results ---

    /// Origin relative to the parent, as of the last layout.
    pub fn origin(&self, id: ComponentId) -> Result<Point, LayoutError> {
        Ok(self.node(id)?.origin)
    }

    /// Size from the last layout; `None` before the first one.
    pub fn size(&self, id: ComponentId) -> Result<Option<Size>, LayoutError> {
        Ok(self.node(id)?.size)
    }

    /// Bounds relative to the parent; `None` before the first layout.
    pub fn bounds(&self, id: ComponentId) -> Result<Option<Rect>, LayoutError> {
        let node = self.node(id)?;
        Ok(node.size.map(|size| Rect::from_origin_size(node.origin, size)))
    }

    /// Origin in root-surface coordinates.
    pub fn origin_to_root(&self, id: ComponentId) -> Result<Point, LayoutError> {
        let mut node = self.node(id)?;
        let mut origin = node.origin;
        while let Some(parent) = node.parent.and_then(|p| self.node_at(p)) {
            origin += parent.origin.to_vec2();
            node = parent;
        }
        Ok(origin)
    }

    pub(crate) fn root_bounds(&self, id: ComponentId) -> Option<Rect> {
        let size = self.node_at(id)?.size?;
        let origin = self.origin_to_root(id).ok()?;
        Some(Rect::from_origin_size(origin, size))
    }
}
