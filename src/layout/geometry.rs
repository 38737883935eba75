use std::collections::HashMap;

use crate::foundation::core::{Rect, SurfaceSize};
use crate::layout::grid::GridAssignments;

/// Live item geometry, queried fresh every frame.
///
/// Implementors typically wrap the UI layer's id → element registry. A missing id means the
/// element is not mounted right now; shapes that need it are skipped for that frame.
pub trait GeometryLookup {
    /// Bounding box of the item row, in surface coordinates.
    fn item_rect(&self, id: &str) -> Option<Rect>;

    /// Bounding box of the item's checkbox, where the liquid fill is drawn.
    fn fill_rect(&self, _id: &str) -> Option<Rect> {
        None
    }
}

impl GeometryLookup for HashMap<String, Rect> {
    fn item_rect(&self, id: &str) -> Option<Rect> {
        self.get(id).copied()
    }
}

/// Cell metrics for [`GridGeometry`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridMetrics {
    /// Horizontal pitch of one column.
    pub column_width: f64,
    /// Vertical pitch of one row.
    pub row_height: f64,
    /// Width of an item box inside its column.
    pub item_width: f64,
    /// Height of an item box inside its row.
    pub item_height: f64,
    /// Outer padding around the whole grid.
    pub padding: f64,
    /// Edge length of the checkbox square at the left of each item.
    pub checkbox: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            column_width: 220.0,
            row_height: 40.0,
            item_width: 160.0,
            item_height: 28.0,
            padding: 16.0,
            checkbox: 16.0,
        }
    }
}

/// Synthetic geometry that places item boxes straight from grid cells.
///
/// Used for headless rendering where no real UI layer exists.
#[derive(Clone, Debug)]
pub struct GridGeometry {
    grid: GridAssignments,
    metrics: GridMetrics,
}

impl GridGeometry {
    /// Wrap a grid assignment.
    pub fn new(grid: GridAssignments, metrics: GridMetrics) -> Self {
        Self { grid, metrics }
    }

    /// The wrapped metrics.
    pub fn metrics(&self) -> GridMetrics {
        self.metrics
    }

    /// Logical size that contains every placed item plus padding.
    pub fn content_size(&self) -> SurfaceSize {
        let m = &self.metrics;
        let (cols, rows) = self.grid.values().fold((0u32, 0u32), |(c, r), p| {
            (c.max(p.grid_column), r.max(p.grid_row))
        });
        SurfaceSize::new(
            m.padding * 2.0 + f64::from(cols) * m.column_width,
            m.padding * 2.0 + f64::from(rows) * m.row_height,
        )
    }
}

impl GeometryLookup for GridGeometry {
    fn item_rect(&self, id: &str) -> Option<Rect> {
        let p = self.grid.get(id)?;
        let m = &self.metrics;
        let x0 = m.padding + f64::from(p.grid_column - 1) * m.column_width;
        let y0 = m.padding
            + f64::from(p.grid_row - 1) * m.row_height
            + (m.row_height - m.item_height) / 2.0;
        Some(Rect::new(x0, y0, x0 + m.item_width, y0 + m.item_height))
    }

    fn fill_rect(&self, id: &str) -> Option<Rect> {
        let r = self.item_rect(id)?;
        let m = &self.metrics;
        let inset = ((r.height() - m.checkbox) / 2.0).max(0.0);
        let x0 = r.x0 + inset;
        let y0 = r.y0 + inset;
        Some(Rect::new(x0, y0, x0 + m.checkbox, y0 + m.checkbox))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
