use crate::model::tree::{ExpandedSet, TodoItem, sort_by_order};

/// Number of columns the outliner materializes. Deeper nodes never get a column.
pub const MAX_COLUMNS: usize = 4;

/// One visible node placed in a column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnEntry<'a> {
    /// The projected item.
    pub item: &'a TodoItem,
    /// Parent id; `None` in column 0.
    pub parent_id: Option<&'a str>,
    /// Column index, `0..MAX_COLUMNS`.
    pub depth: usize,
}

impl<'a> ColumnEntry<'a> {
    /// Shorthand for `self.item.id`.
    pub fn id(&self) -> &'a str {
        self.item.id.as_str()
    }
}

/// Visible entries grouped by column. `columns[0]` holds the roots.
pub type Columns<'a> = Vec<Vec<ColumnEntry<'a>>>;

/// Project the tree into at most [`MAX_COLUMNS`] columns.
///
/// Column `c + 1` is the concatenation, in column-`c` order, of the order-sorted children of
/// every expanded entry in column `c`. Projection stops at the first empty column.
pub fn compute_columns<'a>(roots: &'a [TodoItem], expanded: &ExpandedSet) -> Columns<'a> {
    let mut columns: Columns<'a> = Vec::with_capacity(MAX_COLUMNS);
    if roots.is_empty() {
        return columns;
    }
    columns.push(
        sort_by_order(roots)
            .into_iter()
            .map(|item| ColumnEntry {
                item,
                parent_id: None,
                depth: 0,
            })
            .collect(),
    );

    let mut c = 0;
    while c + 1 < MAX_COLUMNS {
        let next: Vec<ColumnEntry<'a>> = columns[c]
            .iter()
            .filter(|e| expanded.contains(e.id()))
            .flat_map(|e| {
                let parent = e.id();
                e.item
                    .sorted_children()
                    .into_iter()
                    .map(move |item| ColumnEntry {
                        item,
                        parent_id: Some(parent),
                        depth: c + 1,
                    })
            })
            .collect();
        if next.is_empty() {
            break;
        }
        columns.push(next);
        c += 1;
    }
    columns
}

#[cfg(test)]
#[path = "../../tests/unit/layout/columns.rs"]
mod tests;
