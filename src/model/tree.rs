use std::collections::{HashMap, HashSet};

use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::hash::{Fingerprint, StableHasher};

/// Ids of nodes currently expanded. Owned by the UI layer; read-only to the core.
pub type ExpandedSet = HashSet<String>;

/// One node of the outliner tree.
///
/// The owned tree never stores a back-pointer to its parent; parent lookups go through
/// [`TreeIndex`] or through the transient column projection.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TodoItem {
    /// Unique id.
    pub id: String,
    /// Display text.
    #[serde(default)]
    pub text: String,
    /// Completion state.
    #[serde(default)]
    pub checked: bool,
    /// Sort key among siblings (unique per sibling group, not necessarily contiguous).
    #[serde(default)]
    pub order: f64,
    /// Child items in arbitrary storage order.
    #[serde(default)]
    pub children: Vec<TodoItem>,
}

impl TodoItem {
    /// Create an unchecked leaf.
    pub fn new(id: impl Into<String>, order: f64) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            checked: false,
            order,
            children: Vec::new(),
        }
    }

    /// Builder: replace the children.
    pub fn with_children(mut self, children: Vec<TodoItem>) -> Self {
        self.children = children;
        self
    }

    /// Builder: set the checked flag.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Builder: set the display text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Children sorted by `order`.
    pub fn sorted_children(&self) -> Vec<&TodoItem> {
        sort_by_order(&self.children)
    }

    /// Fraction of direct children that are checked, or `None` for a leaf.
    ///
    /// Collaborators use this to supply the fill level of a parent checkbox.
    pub fn checked_fraction(&self) -> Option<f64> {
        if self.children.is_empty() {
            return None;
        }
        let done = self.children.iter().filter(|c| c.checked).count();
        Some(done as f64 / self.children.len() as f64)
    }
}

/// Sort a sibling group by `order`. Ties keep their storage order.
pub fn sort_by_order(items: &[TodoItem]) -> Vec<&TodoItem> {
    let mut out: Vec<&TodoItem> = items.iter().collect();
    out.sort_by(|a, b| a.order.total_cmp(&b.order));
    out
}

/// Find a node anywhere in the tree.
pub fn find_item<'a>(roots: &'a [TodoItem], id: &str) -> Option<&'a TodoItem> {
    let mut stack: Vec<&TodoItem> = roots.iter().collect();
    while let Some(item) = stack.pop() {
        if item.id == id {
            return Some(item);
        }
        stack.extend(item.children.iter());
    }
    None
}

/// Side-index from node id to parent id, rebuilt on structural events.
#[derive(Clone, Debug, Default)]
pub struct TreeIndex {
    parents: HashMap<String, Option<String>>,
}

impl TreeIndex {
    /// Walk the tree from its roots and record every node's parent.
    pub fn build(roots: &[TodoItem]) -> Self {
        let mut parents = HashMap::new();
        let mut stack: Vec<(&TodoItem, Option<&str>)> = roots.iter().map(|r| (r, None)).collect();
        while let Some((item, parent)) = stack.pop() {
            parents.insert(item.id.clone(), parent.map(str::to_owned));
            for c in &item.children {
                stack.push((c, Some(item.id.as_str())));
            }
        }
        Self { parents }
    }

    /// Parent of `id`; `None` for roots and unknown ids.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).and_then(|p| p.as_deref())
    }

    /// Whether `id` is a node of the indexed tree.
    pub fn contains(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Return `true` when the indexed tree is empty.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Fingerprint of everything that defines layout structure: the order-sorted pre-order walk
/// `(depth, id)` and the sorted expanded ids.
///
/// Text and checked edits do not change it; reordering, reparenting, insertion, removal and
/// expansion changes do.
pub fn structure_fingerprint(roots: &[TodoItem], expanded: &ExpandedSet) -> Fingerprint {
    let mut h = StableHasher::new();
    let mut stack: Vec<(&TodoItem, u32)> = sort_by_order(roots)
        .into_iter()
        .rev()
        .map(|r| (r, 0))
        .collect();
    let mut count = 0u64;
    while let Some((item, depth)) = stack.pop() {
        h.write_u32(depth);
        h.write_str(&item.id);
        count += 1;
        for c in item.sorted_children().into_iter().rev() {
            stack.push((c, depth + 1));
        }
    }
    h.write_u64(count);

    let mut ids: Vec<&str> = expanded.iter().map(String::as_str).collect();
    ids.sort_unstable();
    h.write_usize(ids.len());
    for id in ids {
        h.write_str(id);
    }
    h.finish()
}

/// Serialized outliner document: the item tree plus the expanded ids.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutlineDoc {
    /// Root items.
    pub items: Vec<TodoItem>,
    /// Expanded node ids.
    #[serde(default)]
    pub expanded: Vec<String>,
}

impl OutlineDoc {
    /// Parse and validate a JSON document.
    pub fn from_json(s: &str) -> TrellisResult<Self> {
        let doc: Self = serde_json::from_str(s)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Reject duplicate ids and non-finite sort keys.
    pub fn validate(&self) -> TrellisResult<()> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&TodoItem> = self.items.iter().collect();
        while let Some(item) = stack.pop() {
            if !seen.insert(item.id.as_str()) {
                return Err(TrellisError::validation(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
            if !item.order.is_finite() {
                return Err(TrellisError::validation(format!(
                    "item '{}' has a non-finite order",
                    item.id
                )));
            }
            stack.extend(item.children.iter());
        }
        Ok(())
    }

    /// The expanded ids as a set.
    pub fn expanded_set(&self) -> ExpandedSet {
        self.expanded.iter().cloned().collect()
    }

    /// Every node that has children, i.e. the set that expands the whole tree.
    pub fn all_parents(&self) -> ExpandedSet {
        let mut out = ExpandedSet::new();
        let mut stack: Vec<&TodoItem> = self.items.iter().collect();
        while let Some(item) = stack.pop() {
            if !item.children.is_empty() {
                out.insert(item.id.clone());
            }
            stack.extend(item.children.iter());
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/tree.rs"]
mod tests;
