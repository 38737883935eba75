use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::foundation::hash::{Fingerprint, StableHasher};
use crate::layout::columns::Columns;
use crate::model::tree::ExpandedSet;

/// Structural identity of one connector shape.
///
/// The `Display` form is the human-readable key; the fingerprint is what gets diffed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKey {
    /// Divider between two sibling groups with different parents inside one column.
    Separator {
        /// Column of the two entries (`>= 1`).
        column: usize,
        /// Parent of the group above.
        prev_parent: String,
        /// Parent of the group below.
        next_parent: String,
    },
    /// Fan-out from one expanded parent to its visible children.
    Bracket {
        /// Parent id.
        parent_id: String,
        /// Column of the parent.
        column: usize,
        /// Index of the parent inside its column.
        parent_index: usize,
        /// Bracket groups sharing this column pair. Trunk spacing depends on it, so any group
        /// appearing or disappearing re-keys every bracket in the pair.
        group_count: usize,
        /// `(child id, index in the next column)` in column order.
        children: Vec<(String, usize)>,
    },
}

impl ShapeKey {
    /// Stable 128-bit fingerprint of the key.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut h = StableHasher::new();
        match self {
            Self::Separator {
                column,
                prev_parent,
                next_parent,
            } => {
                h.write_u8(0);
                h.write_usize(*column);
                h.write_str(prev_parent);
                h.write_str(next_parent);
            }
            Self::Bracket {
                parent_id,
                column,
                parent_index,
                group_count,
                children,
            } => {
                h.write_u8(1);
                h.write_str(parent_id);
                h.write_usize(*column);
                h.write_usize(*parent_index);
                h.write_usize(*group_count);
                h.write_usize(children.len());
                for (id, idx) in children {
                    h.write_str(id);
                    h.write_usize(*idx);
                }
            }
        }
        h.finish()
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Separator {
                column,
                prev_parent,
                next_parent,
            } => write!(f, "{column}:{prev_parent}-{next_parent}"),
            Self::Bracket {
                parent_id,
                column,
                parent_index,
                group_count,
                children,
            } => {
                write!(f, "{parent_id}@{column}:{parent_index}#{group_count}->")?;
                for (i, (id, idx)) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{id}@{idx}")?;
                }
                Ok(())
            }
        }
    }
}

/// Whether a shape existed in the previous structural generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stability {
    /// Present before and after: draw immediately at full opacity.
    Stable,
    /// Newly appeared: animate in.
    Staggered,
}

/// A bracket frozen for one structural generation.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedBracket {
    /// Structural key.
    pub key: ShapeKey,
    /// Fingerprint of `key`.
    pub fingerprint: Fingerprint,
    /// Parent id.
    pub parent_id: String,
    /// Column of the parent.
    pub column: usize,
    /// Position of this group among the groups of its column pair.
    pub group_index: usize,
    /// Number of groups in the column pair.
    pub group_count: usize,
    /// Visible children in column order.
    pub children: Vec<String>,
    /// Classification against the previous generation.
    pub stability: Stability,
}

/// A separator frozen for one structural generation.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedSeparator {
    /// Structural key.
    pub key: ShapeKey,
    /// Fingerprint of `key`.
    pub fingerprint: Fingerprint,
    /// Column of the two entries.
    pub column: usize,
    /// Last entry of the group above.
    pub above_id: String,
    /// First entry of the group below.
    pub below_id: String,
    /// Classification against the previous generation.
    pub stability: Stability,
}

/// Every connector shape of one structural generation, classified.
///
/// Frozen between structural events so redraws for scroll or glow never reclassify a shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuralPlan {
    /// Monotonic generation counter, starting at 1 for the first observation.
    pub generation: u64,
    /// Bracket groups in column-pair order.
    pub brackets: Vec<PlannedBracket>,
    /// Separators in column order.
    pub separators: Vec<PlannedSeparator>,
}

impl StructuralPlan {
    /// Fingerprints of every stable shape.
    pub fn stable_keys(&self) -> HashSet<Fingerprint> {
        self.brackets
            .iter()
            .filter(|b| b.stability == Stability::Stable)
            .map(|b| b.fingerprint)
            .chain(
                self.separators
                    .iter()
                    .filter(|s| s.stability == Stability::Stable)
                    .map(|s| s.fingerprint),
            )
            .collect()
    }

    /// Number of shapes that animate in.
    pub fn staggered_count(&self) -> usize {
        self.brackets
            .iter()
            .filter(|b| b.stability == Stability::Staggered)
            .count()
            + self
                .separators
                .iter()
                .filter(|s| s.stability == Stability::Staggered)
                .count()
    }

    /// The bracket whose children include `child_id`.
    pub fn bracket_for_child(&self, child_id: &str) -> Option<&PlannedBracket> {
        self.brackets
            .iter()
            .find(|b| b.children.iter().any(|c| c == child_id))
    }
}

/// Diffs connector key sets across structural events.
#[derive(Debug, Default)]
pub struct StabilityTracker {
    previous: HashSet<Fingerprint>,
    generation: u64,
}

impl StabilityTracker {
    /// Create a tracker with an empty history; everything in the first plan staggers in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the last produced plan (0 before the first observation).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forget the previous key set so the next plan animates in from scratch.
    pub fn reset(&mut self) {
        self.previous.clear();
    }

    /// Recompute the key sets for a structural event and classify against the previous event.
    #[tracing::instrument(skip_all, fields(generation = self.generation + 1))]
    pub fn observe(&mut self, columns: &Columns<'_>, expanded: &ExpandedSet) -> StructuralPlan {
        let mut plan = StructuralPlan {
            generation: self.generation + 1,
            ..StructuralPlan::default()
        };

        for (c, col) in columns.iter().enumerate().skip(1) {
            for w in col.windows(2) {
                let (prev, next) = (&w[0], &w[1]);
                if prev.parent_id == next.parent_id {
                    continue;
                }
                let key = ShapeKey::Separator {
                    column: c,
                    prev_parent: prev.parent_id.unwrap_or_default().to_owned(),
                    next_parent: next.parent_id.unwrap_or_default().to_owned(),
                };
                plan.separators.push(PlannedSeparator {
                    fingerprint: key.fingerprint(),
                    key,
                    column: c,
                    above_id: prev.id().to_owned(),
                    below_id: next.id().to_owned(),
                    stability: Stability::Staggered,
                });
            }
        }

        for c in 0..columns.len().saturating_sub(1) {
            let mut kids: HashMap<&str, Vec<(String, usize)>> = HashMap::new();
            for (idx, e) in columns[c + 1].iter().enumerate() {
                if let Some(p) = e.parent_id {
                    kids.entry(p).or_default().push((e.id().to_owned(), idx));
                }
            }

            let parents: Vec<(usize, &str)> = columns[c]
                .iter()
                .enumerate()
                .filter(|(_, e)| expanded.contains(e.id()) && kids.contains_key(e.id()))
                .map(|(i, e)| (i, e.id()))
                .collect();
            let group_count = parents.len();

            for (group_index, (parent_index, parent_id)) in parents.into_iter().enumerate() {
                let children = kids.remove(parent_id).unwrap_or_default();
                let child_ids = children.iter().map(|(id, _)| id.clone()).collect();
                let key = ShapeKey::Bracket {
                    parent_id: parent_id.to_owned(),
                    column: c,
                    parent_index,
                    group_count,
                    children,
                };
                plan.brackets.push(PlannedBracket {
                    fingerprint: key.fingerprint(),
                    key,
                    parent_id: parent_id.to_owned(),
                    column: c,
                    group_index,
                    group_count,
                    children: child_ids,
                    stability: Stability::Staggered,
                });
            }
        }

        let current: HashSet<Fingerprint> = plan
            .brackets
            .iter()
            .map(|b| b.fingerprint)
            .chain(plan.separators.iter().map(|s| s.fingerprint))
            .collect();

        for b in &mut plan.brackets {
            if self.previous.contains(&b.fingerprint) {
                b.stability = Stability::Stable;
            }
        }
        for s in &mut plan.separators {
            if self.previous.contains(&s.fingerprint) {
                s.stability = Stability::Stable;
            }
        }

        self.previous = current;
        self.generation = plan.generation;
        tracing::debug!(
            generation = plan.generation,
            brackets = plan.brackets.len(),
            separators = plan.separators.len(),
            staggered = plan.staggered_count(),
            "structural plan"
        );
        plan
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stability/tracker.rs"]
mod tests;
