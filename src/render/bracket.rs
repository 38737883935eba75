use std::collections::HashMap;

use smallvec::SmallVec;

use crate::animation::path::GlowPath;
use crate::foundation::core::{BezPath, Point, Rect};
use crate::layout::geometry::GeometryLookup;
use crate::stability::tracker::PlannedBracket;

/// Anchor of one child stub: the child's left edge at its vertical center.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildAnchor {
    /// Child id.
    pub id: String,
    /// Left edge.
    pub x: f64,
    /// Vertical center.
    pub y: f64,
}

/// Geometry of one parent's connector fan-out for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct BracketGroup {
    /// Parent id.
    pub parent_id: String,
    /// Parent's right edge.
    pub parent_right: f64,
    /// Parent's vertical center.
    pub parent_y: f64,
    /// Shared vertical collector line.
    pub trunk_x: f64,
    /// Children with mounted geometry, in column order.
    pub children: SmallVec<[ChildAnchor; 4]>,
}

impl BracketGroup {
    /// Angular connector path.
    ///
    /// One child draws a direct line when level with the parent, otherwise an L through the
    /// trunk. Several children share one trunk spanning every anchor's height, with a stub per
    /// child.
    pub fn shape(&self) -> BezPath {
        let mut p = BezPath::new();
        let parent = Point::new(self.parent_right, self.parent_y);
        match self.children.as_slice() {
            [] => {}
            [only] => {
                p.move_to(parent);
                if (only.y - self.parent_y).abs() < 0.5 {
                    p.line_to((only.x, only.y));
                } else {
                    p.line_to((self.trunk_x, self.parent_y));
                    p.line_to((self.trunk_x, only.y));
                    p.line_to((only.x, only.y));
                }
            }
            many => {
                p.move_to(parent);
                p.line_to((self.trunk_x, self.parent_y));

                let (lo, hi) = many.iter().fold((self.parent_y, self.parent_y), |(lo, hi), c| {
                    (lo.min(c.y), hi.max(c.y))
                });
                p.move_to((self.trunk_x, lo));
                p.line_to((self.trunk_x, hi));

                for c in many {
                    p.move_to((self.trunk_x, c.y));
                    p.line_to((c.x, c.y));
                }
            }
        }
        p
    }

    /// Box spanned by the shape: parent right edge to the farthest child, top to bottom anchor.
    pub fn bounds(&self) -> Rect {
        let mut r = Rect::new(self.parent_right, self.parent_y, self.parent_right, self.parent_y);
        for c in &self.children {
            r = r.union_pt(Point::new(c.x, c.y));
            r = r.union_pt(Point::new(self.trunk_x, c.y));
        }
        r
    }

    /// Child → parent glow path for every child.
    pub fn glow_paths(&self) -> impl Iterator<Item = GlowPath> + '_ {
        let parent = Point::new(self.parent_right, self.parent_y);
        self.children
            .iter()
            .map(move |c| GlowPath::new(c.id.clone(), Point::new(c.x, c.y), self.trunk_x, parent))
    }

    /// Glow path for one child.
    pub fn glow_path_for(&self, child_id: &str) -> Option<GlowPath> {
        self.glow_paths().find(|g| g.child_id == child_id)
    }
}

/// Horizontal gap of one column pair: widest parent edge to narrowest child edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairSpan {
    /// Largest parent right edge in the pair.
    pub max_parent_right: f64,
    /// Smallest child left edge in the pair.
    pub min_child_left: f64,
}

impl PairSpan {
    /// Trunk x of group `index` out of `count`: the gap is cut into `count + 1` equal segments.
    pub fn trunk_x(&self, index: usize, count: usize) -> f64 {
        let gap = self.min_child_left - self.max_parent_right;
        self.max_parent_right + gap * (index as f64 + 1.0) / (count as f64 + 1.0)
    }
}

/// Resolve every planned bracket against live geometry.
///
/// Returns `(plan index, group)` pairs. A bracket whose parent is unmounted, or whose children
/// are all unmounted, is skipped for this frame. Trunk spacing uses the planned group index and
/// count so that positions match the structural key.
pub fn resolve_brackets(
    planned: &[PlannedBracket],
    geometry: &dyn GeometryLookup,
) -> Vec<(usize, BracketGroup)> {
    struct Partial {
        index: usize,
        parent: Rect,
        children: SmallVec<[(String, Rect); 4]>,
    }

    let mut partials: Vec<Partial> = Vec::with_capacity(planned.len());
    let mut spans: HashMap<usize, PairSpan> = HashMap::new();

    for (index, b) in planned.iter().enumerate() {
        let Some(parent) = geometry.item_rect(&b.parent_id) else {
            continue;
        };
        let children: SmallVec<[(String, Rect); 4]> = b
            .children
            .iter()
            .filter_map(|id| geometry.item_rect(id).map(|r| (id.clone(), r)))
            .collect();
        if children.is_empty() {
            continue;
        }

        let min_left = children
            .iter()
            .map(|(_, r)| r.x0)
            .fold(f64::INFINITY, f64::min);
        let span = spans.entry(b.column).or_insert(PairSpan {
            max_parent_right: f64::NEG_INFINITY,
            min_child_left: f64::INFINITY,
        });
        span.max_parent_right = span.max_parent_right.max(parent.x1);
        span.min_child_left = span.min_child_left.min(min_left);

        partials.push(Partial {
            index,
            parent,
            children,
        });
    }

    partials
        .into_iter()
        .map(|p| {
            let b = &planned[p.index];
            let trunk_x = spans[&b.column].trunk_x(b.group_index, b.group_count);
            let group = BracketGroup {
                parent_id: b.parent_id.clone(),
                parent_right: p.parent.x1,
                parent_y: p.parent.center().y,
                trunk_x,
                children: p
                    .children
                    .into_iter()
                    .map(|(id, r)| ChildAnchor {
                        id,
                        x: r.x0,
                        y: r.center().y,
                    })
                    .collect(),
            };
            (p.index, group)
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/bracket.rs"]
mod tests;
