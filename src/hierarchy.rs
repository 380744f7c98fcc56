//! Hierarchy Aggregator: category → sub-category → title composition trees.
//!
//! Nodes merge by label at the category and sub-category levels; leaves are
//! one per record and never merge, so duplicate titles stay distinct through
//! their row-suffixed ids. Children keep insertion order from the input.

use serde::Serialize;
use tracing::debug;

use crate::color::{
    CategoricalColors, Color, ContinuousScale, Palette, ScaleStops, assign_categorical,
};
use crate::constants::hierarchy::{PATH_SEPARATOR, ROW_SUFFIX};
use crate::data::BookRecord;
use crate::types::NodeId;

/// One node of a composition tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HierarchyNode {
    /// Label path joined by `/`; leaves end with `#<row>`.
    pub id: NodeId,
    pub label: String,
    /// 1 for categories, 2 for sub-categories or direct leaves, 3 for nested leaves.
    pub depth: usize,
    /// Sum of descendant leaf weights (the leaf's own weight for leaves).
    pub weight: f64,
    /// Leaf: its weight value. Parent: weight-weighted mean over its leaves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_value: Option<f64>,
    /// `None` below the depth limit or when nothing drives the colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Source row for leaves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    fn branch(id: NodeId, label: &str, depth: usize) -> Self {
        Self {
            id,
            label: label.to_string(),
            depth,
            weight: 0.0,
            color_value: None,
            color: None,
            row: None,
            children: Vec::new(),
        }
    }

    /// True for per-record nodes.
    pub fn is_leaf(&self) -> bool {
        self.row.is_some()
    }

    /// Direct child with `label`, if any.
    pub fn child(&self, label: &str) -> Option<&HierarchyNode> {
        self.children.iter().find(|child| child.label == label)
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a HierarchyNode>) {
        if self.is_leaf() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    fn find(&self, id: &str) -> Option<&HierarchyNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Returns `(weight, weighted colour-value sum)` and fills parent aggregates.
    fn settle(&mut self) -> (f64, f64) {
        if self.is_leaf() {
            let weighted = self.color_value.map_or(0.0, |value| value * self.weight);
            return (self.weight, weighted);
        }
        let (weight, weighted) = self
            .children
            .iter_mut()
            .map(HierarchyNode::settle)
            .fold((0.0, 0.0), |acc, part| (acc.0 + part.0, acc.1 + part.1));
        self.weight = weight;
        self.color_value = (weight > 0.0).then(|| weighted / weight);
        (weight, weighted)
    }

    fn paint(&mut self, depth_limit: usize, color_for: &dyn Fn(&HierarchyNode) -> Option<Color>) {
        self.color = if self.depth <= depth_limit {
            color_for(self)
        } else {
            None
        };
        for child in &mut self.children {
            child.paint(depth_limit, color_for);
        }
    }

    fn truncate(&mut self, depth_limit: usize) {
        if self.depth >= depth_limit {
            self.children.clear();
            return;
        }
        for child in &mut self.children {
            child.truncate(depth_limit);
        }
    }
}

/// Composition tree: top-level categories plus the depth limit used to colour it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HierarchyTree {
    pub roots: Vec<HierarchyNode>,
    pub depth_limit: usize,
}

impl HierarchyTree {
    /// Top-level category node by label.
    pub fn category(&self, label: &str) -> Option<&HierarchyNode> {
        self.roots.iter().find(|root| root.label == label)
    }

    /// Node by id anywhere in the tree.
    pub fn find(&self, id: &str) -> Option<&HierarchyNode> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// All leaves in depth-first insertion order.
    pub fn leaves(&self) -> Vec<&HierarchyNode> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.collect_leaves(&mut out);
        }
        out
    }

    /// Sum of category weights.
    pub fn total_weight(&self) -> f64 {
        self.roots.iter().map(|root| root.weight).sum()
    }

    /// Copy of the tree with nodes below the depth limit removed.
    ///
    /// Weights are unchanged, so hidden leaves still count toward their parents.
    pub fn visible(&self) -> HierarchyTree {
        let mut tree = self.clone();
        for root in &mut tree.roots {
            root.truncate(self.depth_limit);
        }
        tree
    }
}

/// Build an uncoloured composition tree over records accepted by `predicate`.
///
/// `weight` supplies each leaf's weight; `None` contributes 0 but the leaf is
/// still inserted. Categories with no accepted record never appear.
pub fn build_composition<W, P>(
    records: &[BookRecord],
    weight: W,
    predicate: P,
    depth_limit: usize,
) -> HierarchyTree
where
    W: Fn(&BookRecord) -> Option<f64>,
    P: Fn(&BookRecord) -> bool,
{
    let mut roots: Vec<HierarchyNode> = Vec::new();
    for record in records.iter().filter(|record| predicate(record)) {
        let category = branch_index(&mut roots, &record.category, || {
            HierarchyNode::branch(record.category.clone(), &record.category, 1)
        });
        let category = &mut roots[category];
        let parent = match record.sub_category.as_deref() {
            Some(sub_category) => {
                let id = format!("{}{PATH_SEPARATOR}{sub_category}", category.id);
                let index = branch_index(&mut category.children, sub_category, || {
                    HierarchyNode::branch(id, sub_category, 2)
                });
                &mut category.children[index]
            }
            None => category,
        };
        let value = weight(record);
        let leaf = HierarchyNode {
            id: format!(
                "{}{PATH_SEPARATOR}{}{ROW_SUFFIX}{}",
                parent.id, record.title, record.row
            ),
            label: record.title.clone(),
            depth: parent.depth + 1,
            weight: value.unwrap_or(0.0),
            color_value: value,
            color: None,
            row: Some(record.row),
            children: Vec::new(),
        };
        parent.children.push(leaf);
    }
    for root in &mut roots {
        root.settle();
    }
    HierarchyTree { roots, depth_limit }
}

fn branch_index(
    nodes: &mut Vec<HierarchyNode>,
    label: &str,
    create: impl FnOnce() -> HierarchyNode,
) -> usize {
    match nodes
        .iter()
        .position(|node| !node.is_leaf() && node.label == label)
    {
        Some(index) => index,
        None => {
            nodes.push(create());
            nodes.len() - 1
        }
    }
}

/// A coloured composition tree plus the legend that produced its colours.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompositionView {
    pub tree: HierarchyTree,
    /// Per-category colours (overview only).
    #[serde(skip_serializing_if = "CategoricalColors::is_empty")]
    pub category_colors: CategoricalColors,
    /// Evaluation scale (evaluation view only; absent without evaluations).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ContinuousScale>,
}

/// Overall composition: every record, coloured by top-level category.
pub fn overview_composition(
    records: &[BookRecord],
    palette: &Palette,
    depth_limit: usize,
) -> CompositionView {
    let mut tree = build_composition(records, |record| record.evaluation, |_| true, depth_limit);
    let category_colors =
        assign_categorical(tree.roots.iter().map(|root| root.label.as_str()), palette);
    for root in &mut tree.roots {
        let color = category_colors.get(&root.label).copied();
        root.paint(depth_limit, &|_: &HierarchyNode| color);
    }
    debug!(
        categories = tree.roots.len(),
        leaves = tree.leaves().len(),
        depth_limit,
        "overview composition built"
    );
    CompositionView {
        tree,
        category_colors,
        scale: None,
    }
}

/// Evaluation composition: only records whose status equals `completed_status`,
/// coloured on a continuous scale over the leaf evaluations in this view.
pub fn evaluation_composition(
    records: &[BookRecord],
    completed_status: &str,
    stops: ScaleStops,
    depth_limit: usize,
) -> CompositionView {
    let mut tree = build_composition(
        records,
        |record| record.evaluation,
        |record| record.status == completed_status,
        depth_limit,
    );
    let scale = ContinuousScale::over_values(
        tree.leaves().iter().filter_map(|leaf| leaf.color_value),
        stops,
    );
    if let Some(scale) = scale {
        for root in &mut tree.roots {
            root.paint(depth_limit, &|node: &HierarchyNode| {
                node.color_value.map(|value| scale.color_at(value))
            });
        }
    }
    debug!(
        categories = tree.roots.len(),
        leaves = tree.leaves().len(),
        depth_limit,
        "evaluation composition built"
    );
    CompositionView {
        tree,
        category_colors: CategoricalColors::new(),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaletteConfig;

    fn book(
        row: usize,
        title: &str,
        category: &str,
        sub: &str,
        status: &str,
        eval: Option<f64>,
    ) -> BookRecord {
        let mut record = BookRecord::new(row, title, category, status).with_sub_category(sub);
        record.evaluation = eval;
        record
    }

    fn shelf() -> Vec<BookRecord> {
        vec![
            book(0, "Dune", "Fiction", "Sci-Fi", "Read", Some(3.0)),
            book(1, "SPQR", "History", "", "Read", Some(7.0)),
            book(2, "Hyperion", "Fiction", "Sci-Fi", "Read", Some(5.0)),
            book(3, "Middlemarch", "Classics", "English", "Reading", Some(9.0)),
            book(4, "Untitled", "Poetry", "", "To-Read", None),
        ]
    }

    #[test]
    fn category_weight_is_sum_of_leaf_weights() {
        let tree = build_composition(&shelf(), |r| r.evaluation, |_| true, 3);
        let fiction = tree.category("Fiction").unwrap();
        assert_eq!(fiction.weight, 8.0);
        assert_eq!(fiction.child("Sci-Fi").unwrap().weight, 8.0);
        let mean = (3.0 * 3.0 + 5.0 * 5.0) / 8.0;
        assert!((fiction.color_value.unwrap() - mean).abs() < 1e-9);
        assert_eq!(tree.total_weight(), 24.0);
    }

    #[test]
    fn absent_weight_keeps_structural_leaf() {
        let tree = build_composition(&shelf(), |r| r.evaluation, |_| true, 3);
        let poetry = tree.category("Poetry").unwrap();
        assert_eq!(poetry.weight, 0.0);
        assert_eq!(poetry.color_value, None);
        assert_eq!(poetry.children.len(), 1);
        assert!(poetry.children[0].is_leaf());
    }

    #[test]
    fn empty_sub_category_yields_direct_leaf() {
        let tree = build_composition(&shelf(), |r| r.evaluation, |_| true, 3);
        let history = tree.category("History").unwrap();
        assert_eq!(history.children.len(), 1);
        let leaf = &history.children[0];
        assert_eq!(leaf.label, "SPQR");
        assert_eq!(leaf.depth, 2);
        assert_eq!(leaf.id, "History/SPQR#1");
    }

    #[test]
    fn evaluation_view_only_contains_completed_records() {
        let view = evaluation_composition(&shelf(), "Read", PaletteConfig::default().continuous, 3);
        assert!(view.tree.category("Classics").is_none());
        assert!(view.tree.category("Poetry").is_none());
        let leaves = view.tree.leaves();
        assert!(leaves.iter().all(|leaf| leaf.label != "Middlemarch"));
        let categories: Vec<&str> = view.tree.roots.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(categories, vec!["Fiction", "History"]);
    }

    #[test]
    fn evaluation_scale_spans_view_extremes() {
        let stops = PaletteConfig::default().continuous;
        let view = evaluation_composition(&shelf(), "Read", stops, 3);
        let scale = view.scale.unwrap();
        assert_eq!((scale.min, scale.max), (3.0, 7.0));
        assert_eq!(
            view.tree.find("Fiction/Sci-Fi/Dune#0").unwrap().color,
            Some(stops.low)
        );
        assert_eq!(
            view.tree.find("History/SPQR#1").unwrap().color,
            Some(stops.high)
        );
    }

    #[test]
    fn duplicate_titles_stay_distinct_leaves() {
        let records = vec![
            book(0, "Dune", "Fiction", "Sci-Fi", "Read", Some(6.0)),
            book(7, "Dune", "Fiction", "Sci-Fi", "Read", Some(8.0)),
        ];
        let tree = build_composition(&records, |r| r.evaluation, |_| true, 3);
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 2);
        assert_ne!(leaves[0].id, leaves[1].id);
        assert_eq!(tree.category("Fiction").unwrap().weight, 14.0);
    }

    #[test]
    fn overview_colours_by_category_down_to_depth_limit() {
        let palette = PaletteConfig::default().categorical;
        let view = overview_composition(&shelf(), &palette, 2);
        let categories: Vec<&str> = view.category_colors.keys().map(String::as_str).collect();
        assert_eq!(categories, vec!["Fiction", "History", "Classics", "Poetry"]);

        let fiction = view.tree.category("Fiction").unwrap();
        assert_eq!(fiction.color, Some(palette.color_at(0)));
        let sci_fi = fiction.child("Sci-Fi").unwrap();
        assert_eq!(sci_fi.color, Some(palette.color_at(0)));
        assert_eq!(sci_fi.children[0].color, None);

        let visible = view.tree.visible();
        let fiction = visible.category("Fiction").unwrap();
        assert!(fiction.child("Sci-Fi").unwrap().children.is_empty());
        assert_eq!(fiction.weight, 8.0);
        assert_eq!(visible.category("History").unwrap().children.len(), 1);
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        let view = evaluation_composition(&[], "Read", PaletteConfig::default().continuous, 3);
        assert!(view.tree.roots.is_empty());
        assert!(view.scale.is_none());
    }
}
