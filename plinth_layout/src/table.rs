// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Weighted grid allocation.
//!
//! Each row and column receives a *guaranteed* share (the largest minimum any
//! of its cells requests) plus a *proportional* share of whatever is left,
//! split by weight. Requests can depend on the offer (text wraps when it gets
//! narrower), so the guarantees are found by iterating:
//!
//! 1. Seed the offers from proportional space alone, counting zero weights as
//!    a half weight so fixed rows and columns have something to measure
//!    against.
//! 2. Offer every cell its column width and row height. The guarantees become
//!    the largest requests; rows and columns with a cell asking for more than
//!    it was offered are flagged.
//! 3. Split the free space again, nudging flagged rows and columns.
//! 4. Stop once the free space on both axes is exhausted or has stopped
//!    changing, or after [`SolverConfig::max_iterations`].
//!
//! Guarantees only grow between iterations, so an unchanged free space means
//! no further progress is possible.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::LayoutError;
use crate::id::ComponentId;
use crate::space::{Axis, SpaceRequest};

/// Weight given to zero-weight rows and columns when seeding the first offer.
const HEURISTIC_WEIGHT: f64 = 0.5;

/// Extra weight for rows and columns whose cells asked for more than offered.
const WANTS_NUDGE: f64 = 0.1;

/// Largest number of rows or columns a table can have.
pub const MAX_TABLE_EXTENT: usize = 4096;

/// Tuning knobs for the table solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Upper bound on refinement passes before the last values are accepted.
    pub max_iterations: usize,
    /// Changes in free space at or below this are treated as no change, and
    /// overruns up to this are not reported as insufficient space.
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    /// Sets the iteration cap (at least one pass always runs).
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Result of running the solver for one offered size.
#[derive(Clone, Debug, PartialEq)]
pub struct TableAllocation {
    /// Final width of each column (guarantee plus proportional share).
    pub column_widths: Vec<f64>,
    /// Final height of each row.
    pub row_heights: Vec<f64>,
    /// Guaranteed width of each column.
    pub guaranteed_widths: Vec<f64>,
    /// Guaranteed height of each row.
    pub guaranteed_heights: Vec<f64>,
    /// Gap between adjacent columns.
    pub column_padding: f64,
    /// Gap between adjacent rows.
    pub row_padding: f64,
    /// Number of refinement passes that ran.
    pub iterations: usize,
    /// Whether the passes stopped because nothing could improve.
    pub converged: bool,
}

impl TableAllocation {
    /// Total width the table needs: guarantees plus padding.
    #[must_use]
    pub fn required_width(&self) -> f64 {
        self.guaranteed_widths.iter().sum::<f64>()
            + self.column_padding * gaps(self.guaranteed_widths.len())
    }

    /// Total height the table needs: guarantees plus padding.
    #[must_use]
    pub fn required_height(&self) -> f64 {
        self.guaranteed_heights.iter().sum::<f64>()
            + self.row_padding * gaps(self.guaranteed_heights.len())
    }

    /// What the table as a whole requests.
    #[must_use]
    pub fn requested_space(&self) -> SpaceRequest {
        SpaceRequest::new(self.required_width(), self.required_height())
    }

    /// Left edge of each column, relative to the table.
    #[must_use]
    pub fn column_offsets(&self) -> Vec<f64> {
        offsets(&self.column_widths, self.column_padding)
    }

    /// Top edge of each row, relative to the table.
    #[must_use]
    pub fn row_offsets(&self) -> Vec<f64> {
        offsets(&self.row_heights, self.row_padding)
    }

    pub(crate) fn ensure_fits(
        &self,
        width: f64,
        height: f64,
        tolerance: f64,
    ) -> Result<(), LayoutError> {
        let required = self.required_width();
        if required > width + tolerance {
            return Err(LayoutError::InsufficientSpace {
                axis: Axis::Horizontal,
                required,
                available: width,
            });
        }
        let required = self.required_height();
        if required > height + tolerance {
            return Err(LayoutError::InsufficientSpace {
                axis: Axis::Vertical,
                required,
                available: height,
            });
        }
        Ok(())
    }
}

/// Grid state of a table component.
#[derive(Clone, Debug, Default)]
pub(crate) struct Table {
    pub(crate) rows: Vec<Vec<Option<ComponentId>>>,
    pub(crate) n_cols: usize,
    /// Explicit weights; may be longer than the grid.
    pub(crate) row_weights: Vec<Option<f64>>,
    pub(crate) column_weights: Vec<Option<f64>>,
    pub(crate) row_padding: f64,
    pub(crate) column_padding: f64,
    pub(crate) config: SolverConfig,
}

struct Guarantees {
    widths: Vec<f64>,
    heights: Vec<f64>,
    wants_width: Vec<bool>,
    wants_height: Vec<bool>,
}

impl Table {
    pub(crate) fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Grows the grid so it has at least `n_rows` by `n_cols` cells.
    pub(crate) fn pad_to(&mut self, n_rows: usize, n_cols: usize) {
        let n_cols = n_cols.max(self.n_cols);
        for row in &mut self.rows {
            row.resize(n_cols, None);
        }
        while self.rows.len() < n_rows {
            self.rows.push(vec![None; n_cols]);
        }
        self.n_cols = n_cols;
    }

    pub(crate) fn cell(&self, row: usize, col: usize) -> Option<ComponentId> {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub(crate) fn position_of(&self, id: ComponentId) -> Option<(usize, usize)> {
        self.cells()
            .find(|&(_, _, cell)| cell == id)
            .map(|(row, col, _)| (row, col))
    }

    pub(crate) fn clear(&mut self, id: ComponentId) -> bool {
        match self.position_of(id) {
            Some((row, col)) => {
                self.rows[row][col] = None;
                true
            }
            None => false,
        }
    }

    /// Occupied cells in row-major order.
    pub(crate) fn cells(&self) -> impl Iterator<Item = (usize, usize, ComponentId)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.map(|id| (r, c, id)))
        })
    }

    /// Weights actually used on `axis`: the explicit weight if set, otherwise
    /// 0 when every cell in the row/column is fixed (empty cells count as
    /// fixed) and 1 when any is not.
    fn effective_weights(&self, axis: Axis, fixed: &dyn Fn(ComponentId, Axis) -> bool) -> Vec<f64> {
        let (count, explicit) = match axis {
            Axis::Horizontal => (self.n_cols, &self.column_weights),
            Axis::Vertical => (self.n_rows(), &self.row_weights),
        };
        (0..count)
            .map(|i| {
                if let Some(Some(weight)) = explicit.get(i) {
                    return *weight;
                }
                let all_fixed = match axis {
                    Axis::Horizontal => self
                        .rows
                        .iter()
                        .all(|row| row[i].is_none_or(|id| fixed(id, axis))),
                    Axis::Vertical => self.rows[i].iter().all(|cell| cell.is_none_or(|id| fixed(id, axis))),
                };
                if all_fixed { 0.0 } else { 1.0 }
            })
            .collect()
    }

    fn determine_guarantees(
        &self,
        offered_widths: &[f64],
        offered_heights: &[f64],
        request: &dyn Fn(ComponentId, f64, f64) -> SpaceRequest,
    ) -> Guarantees {
        let mut g = Guarantees {
            widths: vec![0.0; self.n_cols],
            heights: vec![0.0; self.n_rows()],
            wants_width: vec![false; self.n_cols],
            wants_height: vec![false; self.n_rows()],
        };
        let tolerance = self.config.tolerance;
        for (r, c, id) in self.cells() {
            let req = request(id, offered_widths[c], offered_heights[r]);
            g.widths[c] = g.widths[c].max(req.min_width);
            g.heights[r] = g.heights[r].max(req.min_height);
            g.wants_width[c] |= req.min_width > offered_widths[c] + tolerance;
            g.wants_height[r] |= req.min_height > offered_heights[r] + tolerance;
        }
        g
    }

    /// Runs the solver for an offer of `available_width` by
    /// `available_height`.
    ///
    /// `request` answers a cell's space request for a given offer and `fixed`
    /// its fixity on an axis; both are supplied by the tree.
    pub(crate) fn allocate(
        &self,
        available_width: f64,
        available_height: f64,
        request: &dyn Fn(ComponentId, f64, f64) -> SpaceRequest,
        fixed: &dyn Fn(ComponentId, Axis) -> bool,
    ) -> TableAllocation {
        let config = self.config;
        let free_width_total = available_width - self.column_padding * gaps(self.n_cols);
        let free_height_total = available_height - self.row_padding * gaps(self.n_rows());

        let column_weights = self.effective_weights(Axis::Horizontal, fixed);
        let row_weights = self.effective_weights(Axis::Vertical, fixed);

        let mut column_share = proportional(&heuristic(&column_weights), free_width_total);
        let mut row_share = proportional(&heuristic(&row_weights), free_height_total);

        let mut guarantees = Guarantees {
            widths: vec![0.0; self.n_cols],
            heights: vec![0.0; self.n_rows()],
            wants_width: vec![false; self.n_cols],
            wants_height: vec![false; self.n_rows()],
        };
        let mut last_free_width: Option<f64> = None;
        let mut last_free_height: Option<f64> = None;
        let mut iterations = 0;
        let mut converged = false;

        loop {
            let offered_widths = add(&guarantees.widths, &column_share);
            let offered_heights = add(&guarantees.heights, &row_share);
            guarantees = self.determine_guarantees(&offered_widths, &offered_heights, request);

            let free_width = free_width_total - guarantees.widths.iter().sum::<f64>();
            let free_height = free_height_total - guarantees.heights.iter().sum::<f64>();

            column_share = proportional(
                &nudged(&column_weights, &guarantees.wants_width),
                free_width,
            );
            row_share = proportional(&nudged(&row_weights, &guarantees.wants_height), free_height);
            iterations += 1;

            let can_improve_width = free_width > 0.0
                && last_free_width.is_none_or(|last| differs(free_width, last, config.tolerance));
            let can_improve_height = free_height > 0.0
                && last_free_height.is_none_or(|last| differs(free_height, last, config.tolerance));
            last_free_width = Some(free_width);
            last_free_height = Some(free_height);

            if !can_improve_width && !can_improve_height {
                converged = true;
                break;
            }
            if iterations >= config.max_iterations.max(1) {
                break;
            }
        }

        if !converged {
            log::warn!(
                "table layout did not converge after {iterations} iterations; using last allocation"
            );
        }

        // Final split uses the real weights, without the nudges.
        let free_width = free_width_total - guarantees.widths.iter().sum::<f64>();
        let free_height = free_height_total - guarantees.heights.iter().sum::<f64>();
        let column_share = proportional(&column_weights, free_width);
        let row_share = proportional(&row_weights, free_height);

        TableAllocation {
            column_widths: add(&guarantees.widths, &column_share),
            row_heights: add(&guarantees.heights, &row_share),
            guaranteed_widths: guarantees.widths,
            guaranteed_heights: guarantees.heights,
            column_padding: self.column_padding,
            row_padding: self.row_padding,
            iterations,
            converged,
        }
    }
}

fn gaps(count: usize) -> f64 {
    count.saturating_sub(1) as f64
}

fn differs(a: f64, b: f64, tolerance: f64) -> bool {
    a - b > tolerance || b - a > tolerance
}

fn heuristic(weights: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .map(|&w| if w == 0.0 { HEURISTIC_WEIGHT } else { w })
        .collect()
}

fn nudged(weights: &[f64], wants: &[bool]) -> Vec<f64> {
    weights
        .iter()
        .zip(wants)
        .map(|(&w, &wants)| if wants { w + WANTS_NUDGE } else { w })
        .collect()
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(a, b)| a + b).collect()
}

/// Splits `space` by weight. Zero weights get nothing, even from an
/// unbounded `space`.
fn proportional(weights: &[f64], space: f64) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return vec![0.0; weights.len()];
    }
    weights
        .iter()
        .map(|&w| if w == 0.0 { 0.0 } else { space * w / total })
        .collect()
}

fn offsets(extents: &[f64], padding: f64) -> Vec<f64> {
    let mut at = 0.0;
    extents
        .iter()
        .map(|extent| {
            let start = at;
            at += extent + padding;
            start
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn id(idx: u32) -> ComponentId {
        ComponentId::new(idx, 0)
    }

    fn grid(rows: &[&[Option<u32>]]) -> Table {
        let mut table = Table::default();
        let n_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        table.pad_to(rows.len(), n_cols);
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                table.rows[r][c] = cell.map(id);
            }
        }
        table
    }

    fn never_fixed(_: ComponentId, _: Axis) -> bool {
        false
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn splits_free_space_by_weight() {
        let mut table = grid(&[&[Some(0), Some(1)]]);
        table.column_weights = vec![Some(1.0), Some(3.0)];

        let alloc = table.allocate(400.0, 100.0, &|_, _, _| SpaceRequest::ZERO, &never_fixed);

        assert!(close(alloc.column_widths[0], 100.0));
        assert!(close(alloc.column_widths[1], 300.0));
        assert!(close(alloc.row_heights[0], 100.0));
        assert!(alloc.converged);
    }

    #[test]
    fn guarantees_come_before_proportional_share() {
        let table = grid(&[&[Some(0), Some(1)]]);
        let request = |cell: ComponentId, _: f64, _: f64| {
            if cell == id(0) {
                SpaceRequest::new(150.0, 10.0)
            } else {
                SpaceRequest::ZERO
            }
        };

        let alloc = table.allocate(300.0, 50.0, &request, &never_fixed);

        // 150 guaranteed to column 0, the other 150 split evenly.
        assert!(close(alloc.column_widths[0], 225.0));
        assert!(close(alloc.column_widths[1], 75.0));
        assert!(close(alloc.column_widths.iter().sum::<f64>(), 300.0));
    }

    #[test]
    fn all_fixed_columns_get_zero_weight() {
        let table = grid(&[&[Some(0), Some(1)]]);
        let request = |cell: ComponentId, _: f64, _: f64| {
            if cell == id(0) {
                SpaceRequest::new(40.0, 0.0)
            } else {
                SpaceRequest::ZERO
            }
        };
        let fixed = |cell: ComponentId, _: Axis| cell == id(0);

        let alloc = table.allocate(200.0, 100.0, &request, &fixed);

        assert!(close(alloc.column_widths[0], 40.0));
        assert!(close(alloc.column_widths[1], 160.0));
    }

    #[test]
    fn padding_is_excluded_from_shares_and_included_in_request() {
        let mut table = grid(&[&[Some(0), Some(1), Some(2)]]);
        table.column_padding = 10.0;
        let request = |_: ComponentId, _: f64, _: f64| SpaceRequest::new(20.0, 5.0);

        let alloc = table.allocate(200.0, 50.0, &request, &never_fixed);

        assert!(close(alloc.column_widths.iter().sum::<f64>(), 180.0));
        assert_eq!(alloc.column_offsets()[1], alloc.column_widths[0] + 10.0);
        assert!(close(alloc.required_width(), 80.0));
        assert!(close(alloc.required_height(), 5.0));
    }

    #[test]
    fn width_dependent_requests_settle() {
        // A cell whose height grows as it narrows, like wrapped text.
        let table = grid(&[&[Some(0)], &[Some(1)]]);
        let request = |cell: ComponentId, width: f64, _: f64| {
            if cell == id(0) {
                SpaceRequest::new(0.0, (1200.0 / width.max(1.0)).ceil())
            } else {
                SpaceRequest::ZERO
            }
        };

        let alloc = table.allocate(100.0, 300.0, &request, &never_fixed);

        assert!(alloc.guaranteed_heights[0] >= 12.0);
        assert!(close(alloc.row_heights.iter().sum::<f64>(), 300.0));
    }

    #[test]
    fn overrun_is_reported_on_the_offending_axis() {
        let table = grid(&[&[Some(0)]]);
        let request = |_: ComponentId, _: f64, _: f64| SpaceRequest::new(300.0, 10.0);

        let alloc = table.allocate(200.0, 200.0, &request, &never_fixed);

        assert_eq!(
            alloc.ensure_fits(200.0, 200.0, 1e-6),
            Err(LayoutError::InsufficientSpace {
                axis: Axis::Horizontal,
                required: 300.0,
                available: 200.0,
            })
        );
    }

    #[test]
    fn iteration_cap_is_respected() {
        let mut table = grid(&[&[Some(0)]]);
        table.config = SolverConfig::default().with_max_iterations(1);
        // Ever-growing request: never settles on its own.
        let request = |_: ComponentId, width: f64, _: f64| SpaceRequest::new(width * 0.5 + 1.0, 0.0);

        let alloc = table.allocate(1000.0, 10.0, &request, &never_fixed);

        assert_eq!(alloc.iterations, 1);
        assert!(!alloc.converged);
    }

    #[test]
    fn empty_cells_and_moves() {
        let mut table = grid(&[&[Some(0), None], &[None, Some(1)]]);
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(5, 5), None);
        assert_eq!(table.position_of(id(1)), Some((1, 1)));

        assert!(table.clear(id(1)));
        assert!(!table.clear(id(1)));
        assert_eq!(table.cells().count(), 1);
    }
}
