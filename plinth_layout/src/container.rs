// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Groups and tables: the two container kinds.

use alloc::vec::Vec;

use crate::error::LayoutError;
use crate::id::ComponentId;
use crate::table::{MAX_TABLE_EXTENT, SolverConfig, Table};
use crate::tree::{ComponentTree, GroupChildren, NodeKind};

fn check_weight(weight: f64) -> Result<f64, LayoutError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(LayoutError::InvalidWeight { value: weight })
    }
}

fn check_index(what: &'static str, index: usize) -> Result<usize, LayoutError> {
    if index < MAX_TABLE_EXTENT {
        Ok(index)
    } else {
        Err(LayoutError::IndexOutOfRange {
            what,
            index,
            limit: MAX_TABLE_EXTENT,
        })
    }
}

fn check_padding(padding: f64) -> Result<f64, LayoutError> {
    if padding.is_finite() && padding >= 0.0 {
        Ok(padding)
    } else {
        Err(LayoutError::InvalidPadding { value: padding })
    }
}

impl ComponentTree {
    /// Creates a group overlaying `children` in order.
    pub fn create_group(
        &mut self,
        children: impl IntoIterator<Item = ComponentId>,
    ) -> Result<ComponentId, LayoutError> {
        let children: Vec<_> = children.into_iter().collect();
        for &child in &children {
            self.node(child)?;
        }
        let group = self.create_container(NodeKind::Group(GroupChildren::new()));
        for child in children {
            self.add_to_group(group, child)?;
        }
        Ok(group)
    }

    /// Creates a table from rows of optional cells.
    ///
    /// The grid takes the shape of the input, padded to the longest row.
    pub fn create_table<R>(
        &mut self,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<ComponentId, LayoutError>
    where
        R: IntoIterator<Item = Option<ComponentId>>,
    {
        let rows: Vec<Vec<Option<ComponentId>>> =
            rows.into_iter().map(|r| r.into_iter().collect()).collect();
        if let Some(last) = rows.len().checked_sub(1) {
            check_index("row", last)?;
        }
        if let Some(last) = rows.iter().map(Vec::len).max().and_then(|n| n.checked_sub(1)) {
            check_index("column", last)?;
        }
        for child in rows.iter().flatten().flatten() {
            self.node(*child)?;
        }
        let mut table = Table::default();
        table.pad_to(rows.len(), rows.iter().map(Vec::len).max().unwrap_or(0));
        let id = self.create_container(NodeKind::Table(table));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                if let Some(child) = cell {
                    self.add_to_table(id, child, r, c)?;
                }
            }
        }
        Ok(id)
    }

    fn table(&self, id: ComponentId) -> Result<&Table, LayoutError> {
        match &self.node(id)?.kind {
            NodeKind::Table(table) => Ok(table),
            _ => Err(LayoutError::NotAContainer { expected: "table" }),
        }
    }

    fn table_mut(&mut self, id: ComponentId) -> Result<&mut Table, LayoutError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Table(table) => Ok(table),
            _ => Err(LayoutError::NotAContainer { expected: "table" }),
        }
    }

    /// Detaches `child` from wherever it is and makes it a child of
    /// `container`, anchoring it if the container is anchored.
    fn adopt(
        &mut self,
        container: ComponentId,
        child: ComponentId,
        place: impl FnOnce(&mut NodeKind),
    ) -> Result<(), LayoutError> {
        self.detach(child)?;
        let node = self.node_mut(container)?;
        place(&mut node.kind);
        let anchored = node.anchored;
        self.node_mut(child)?.parent = Some(container);
        if anchored {
            self.anchor_subtree(child);
        }
        Ok(())
    }

    /// Appends `child` to a group. Already a member: no-op.
    pub fn add_to_group(
        &mut self,
        group: ComponentId,
        child: ComponentId,
    ) -> Result<(), LayoutError> {
        let NodeKind::Group(children) = &self.node(group)?.kind else {
            return Err(LayoutError::NotAContainer { expected: "group" });
        };
        if children.contains(&child) {
            return Ok(());
        }
        self.node(child)?;
        if self.is_ancestor_of(child, group) {
            return Err(LayoutError::WouldCycle);
        }
        self.adopt(group, child, |kind| {
            if let NodeKind::Group(children) = kind {
                children.push(child);
            }
        })?;
        self.redraw(group)
    }

    /// Puts `child` in cell (`row`, `col`), growing the grid as needed.
    ///
    /// A child already in this table is moved. A cell holding a different
    /// component is an error, as is an index of [`MAX_TABLE_EXTENT`] or more.
    pub fn add_to_table(
        &mut self,
        table: ComponentId,
        child: ComponentId,
        row: usize,
        col: usize,
    ) -> Result<(), LayoutError> {
        let row = check_index("row", row)?;
        let col = check_index("column", col)?;
        let grid = self.table(table)?;
        match grid.cell(row, col) {
            Some(existing) if existing == child => return Ok(()),
            Some(_) => return Err(LayoutError::CellOccupied { row, col }),
            None => {}
        }
        let moving = grid.position_of(child).is_some();
        self.node(child)?;
        if self.is_ancestor_of(child, table) {
            return Err(LayoutError::WouldCycle);
        }
        let place = |kind: &mut NodeKind| {
            if let NodeKind::Table(grid) = kind {
                grid.clear(child);
                grid.pad_to(row + 1, col + 1);
                grid.rows[row][col] = Some(child);
            }
        };
        if moving {
            place(&mut self.node_mut(table)?.kind);
        } else {
            self.adopt(table, child, place)?;
        }
        self.redraw(table)
    }

    /// The component in cell (`row`, `col`); `None` when empty or out of range.
    pub fn component_at(
        &self,
        table: ComponentId,
        row: usize,
        col: usize,
    ) -> Result<Option<ComponentId>, LayoutError> {
        Ok(self.table(table)?.cell(row, col))
    }

    /// Number of rows and columns of a table.
    pub fn table_shape(&self, table: ComponentId) -> Result<(usize, usize), LayoutError> {
        let grid = self.table(table)?;
        Ok((grid.n_rows(), grid.n_cols))
    }

    /// Returns `true` if `child` is a direct child of `container`.
    pub fn has(&self, container: ComponentId, child: ComponentId) -> Result<bool, LayoutError> {
        match &self.node(container)?.kind {
            NodeKind::Group(children) => Ok(children.contains(&child)),
            NodeKind::Table(table) => Ok(table.position_of(child).is_some()),
            NodeKind::Leaf(_) => Err(LayoutError::NotAContainer {
                expected: "container",
            }),
        }
    }

    /// Direct children of a container (groups in insertion order, tables
    /// row-major).
    pub fn children(&self, container: ComponentId) -> Result<Vec<ComponentId>, LayoutError> {
        if !self.node(container)?.kind.is_container() {
            return Err(LayoutError::NotAContainer {
                expected: "container",
            });
        }
        Ok(self.children_of(container))
    }

    /// Calls `f` for each direct child. Iterates over a snapshot.
    pub fn for_each_child(
        &self,
        container: ComponentId,
        f: impl FnMut(ComponentId),
    ) -> Result<(), LayoutError> {
        self.children(container)?.into_iter().for_each(f);
        Ok(())
    }

    /// Removes `child` from `container`, leaving it detached but alive.
    /// Not a child: no-op.
    pub fn remove(
        &mut self,
        container: ComponentId,
        child: ComponentId,
    ) -> Result<(), LayoutError> {
        if self.has(container, child)? {
            self.detach(child)?;
        }
        Ok(())
    }

    /// Explicit weight of a table row, if one was set.
    pub fn row_weight(&self, table: ComponentId, row: usize) -> Result<Option<f64>, LayoutError> {
        Ok(self.table(table)?.row_weights.get(row).copied().flatten())
    }

    /// Sets the weight of a table row; `None` restores the default (0 when
    /// every cell in the row is fixed, 1 otherwise).
    pub fn set_row_weight(
        &mut self,
        table: ComponentId,
        row: usize,
        weight: Option<f64>,
    ) -> Result<(), LayoutError> {
        let weight = weight.map(check_weight).transpose()?;
        let row = check_index("row", row)?;
        let grid = self.table_mut(table)?;
        if grid.row_weights.len() <= row {
            grid.row_weights.resize(row + 1, None);
        }
        grid.row_weights[row] = weight;
        self.redraw(table)
    }

    /// Explicit weight of a table column, if one was set.
    pub fn column_weight(
        &self,
        table: ComponentId,
        col: usize,
    ) -> Result<Option<f64>, LayoutError> {
        Ok(self.table(table)?.column_weights.get(col).copied().flatten())
    }

    /// Sets the weight of a table column; `None` restores the default.
    pub fn set_column_weight(
        &mut self,
        table: ComponentId,
        col: usize,
        weight: Option<f64>,
    ) -> Result<(), LayoutError> {
        let weight = weight.map(check_weight).transpose()?;
        let col = check_index("column", col)?;
        let grid = self.table_mut(table)?;
        if grid.column_weights.len() <= col {
            grid.column_weights.resize(col + 1, None);
        }
        grid.column_weights[col] = weight;
        self.redraw(table)
    }

    /// Gap between adjacent rows of a table.
    pub fn row_padding(&self, table: ComponentId) -> Result<f64, LayoutError> {
        Ok(self.table(table)?.row_padding)
    }

    /// Sets the gap between adjacent rows.
    pub fn set_row_padding(&mut self, table: ComponentId, padding: f64) -> Result<(), LayoutError> {
        let padding = check_padding(padding)?;
        self.table_mut(table)?.row_padding = padding;
        self.redraw(table)
    }

    /// Gap between adjacent columns of a table.
    pub fn column_padding(&self, table: ComponentId) -> Result<f64, LayoutError> {
        Ok(self.table(table)?.column_padding)
    }

    /// Sets the gap between adjacent columns.
    pub fn set_column_padding(
        &mut self,
        table: ComponentId,
        padding: f64,
    ) -> Result<(), LayoutError> {
        let padding = check_padding(padding)?;
        self.table_mut(table)?.column_padding = padding;
        self.redraw(table)
    }

    /// Solver settings of a table.
    pub fn solver_config(&self, table: ComponentId) -> Result<SolverConfig, LayoutError> {
        Ok(self.table(table)?.config)
    }

    /// Replaces the solver settings of a table.
    pub fn set_solver_config(
        &mut self,
        table: ComponentId,
        config: SolverConfig,
    ) -> Result<(), LayoutError> {
        self.table_mut(table)?.config = config;
        self.redraw(table)
    }
}
