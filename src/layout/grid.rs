use std::collections::HashMap;

use crate::layout::columns::{ColumnEntry, Columns};
use crate::model::tree::ExpandedSet;

/// 1-based grid cell of a visible node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridPosition {
    /// Row, `>= 1`.
    pub grid_row: u32,
    /// Column, `== depth + 1`.
    pub grid_column: u32,
}

/// Grid cell per visible node id.
pub type GridAssignments = HashMap<String, GridPosition>;

struct Assigner<'c, 'a> {
    children: HashMap<&'a str, Vec<&'c ColumnEntry<'a>>>,
    expanded: &'c ExpandedSet,
    out: GridAssignments,
}

impl<'c, 'a> Assigner<'c, 'a> {
    /// Place `entry` at `row` and return the number of rows its visible subtree consumes.
    fn assign(&mut self, entry: &ColumnEntry<'a>, row: u32) -> u32 {
        self.out.insert(
            entry.id().to_owned(),
            GridPosition {
                grid_row: row,
                grid_column: entry.depth as u32 + 1,
            },
        );

        if !self.expanded.contains(entry.id()) {
            return 1;
        }
        let Some(kids) = self.children.get(entry.id()).cloned() else {
            return 1;
        };

        let mut used = 0;
        for kid in kids {
            used += self.assign(kid, row + used);
        }
        used.max(1)
    }
}

/// Assign every visible entry a grid cell.
///
/// Pre-order: a parent shares the row of its first visible child ("flat top"), siblings stack
/// without overlap, and one spacer row follows every root whose subtree spans more than one
/// row.
#[tracing::instrument(skip_all, fields(columns = columns.len()))]
pub fn compute_grid_assignments(columns: &Columns<'_>, expanded: &ExpandedSet) -> GridAssignments {
    let mut children: HashMap<&str, Vec<&ColumnEntry<'_>>> = HashMap::new();
    for col in columns.iter().skip(1) {
        for e in col {
            if let Some(p) = e.parent_id {
                children.entry(p).or_default().push(e);
            }
        }
    }

    let mut a = Assigner {
        children,
        expanded,
        out: GridAssignments::new(),
    };

    let mut row = 1;
    if let Some(roots) = columns.first() {
        for root in roots {
            let used = a.assign(root, row);
            row += used;
            if used > 1 {
                row += 1;
            }
        }
    }
    tracing::trace!(cells = a.out.len(), rows = row - 1, "grid assigned");
    a.out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
