//! Data for the linked views, computed from the tree, the measurements
//! and the current [`Selection`].
//!
//! Nothing here draws: the outputs are what a renderer needs to colour
//! the tree leaves, draw the density chart and size the scatterplot points.

use std::collections::HashMap;

use serde::Serialize;

use crate::selection::{SampleId, Selection};
use crate::titers::TiterTable;
use crate::tree::{leaf_order, TreeNode};

/// Radius of a scatterplot point
pub const POINT_RADIUS: f64 = 3.;
/// Radius of the selected scatterplot point
pub const SELECTED_RADIUS: f64 = 10.;

/// Value shown on a leaf of the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafValue {
    /// Name of the leaf
    pub strain: Option<String>,
    /// Measurement of the active sample against the strain, if any
    pub value: Option<f64>,
}

/// Point of the density chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrainValue {
    /// Strain name
    pub strain: String,
    /// Measurement of the active sample, `0` when missing
    pub value: f64,
}

/// Strain ordering of a tree, used to align measurements on its leaves
#[derive(Debug, Clone)]
pub struct LinkedView {
    strain_order: Vec<String>,
    strain_index: HashMap<String, usize>,
    leaves: Vec<Option<String>>,
}

impl LinkedView {
    /// Computes the strain order of `tree`
    pub fn new(tree: &TreeNode) -> Self {
        let strain_order = leaf_order(tree);
        let mut strain_index = HashMap::with_capacity(strain_order.len());
        for (i, strain) in strain_order.iter().enumerate() {
            strain_index.entry(strain.clone()).or_insert(i);
        }

        Self {
            strain_order,
            strain_index,
            leaves: tree.leaves().map(|leaf| leaf.name.clone()).collect(),
        }
    }

    /// Strains in the order of the tree
    pub fn strain_order(&self) -> &[String] {
        &self.strain_order
    }

    /// Position of `strain` in [`LinkedView::strain_order`]
    pub fn strain_index(&self, strain: &str) -> Option<usize> {
        self.strain_index.get(strain).copied()
    }

    /// Values of the active sample for every leaf of the tree, from left to right.
    /// Without an active sample all values are missing.
    pub fn leaf_values(&self, titers: &TiterTable, selection: &Selection) -> Vec<LeafValue> {
        let active = selection.active();
        self.leaves
            .iter()
            .map(|strain| LeafValue {
                strain: strain.clone(),
                value: match (active, strain) {
                    (Some(SampleId(id)), Some(strain)) => titers.value(id, strain),
                    _ => None,
                },
            })
            .collect()
    }

    /// Density chart of the active sample: one point per strain in tree
    /// order, missing measurements count as `0`. Empty without an active sample.
    /// ```
    /// use neutscape::{parse, selection::{Selection, SelectionEvent}, view::LinkedView};
    /// use neutscape::titers::{Assay, TiterTable};
    ///
    /// let tree = parse("((A,B),C);").unwrap();
    /// let titers = TiterTable::from_csv(
    ///     "participant_id,strain,log_hi_titer\nP1,C,2\nP1,A,4\n",
    ///     &Assay::HiTiter,
    /// ).unwrap();
    /// let view = LinkedView::new(&tree);
    ///
    /// let mut selection = Selection::new();
    /// assert!(view.density(&titers, &selection).is_empty());
    ///
    /// selection.apply(SelectionEvent::Hover("P1".into()));
    /// let values: Vec<_> = view.density(&titers, &selection)
    ///     .into_iter()
    ///     .map(|point| point.value)
    ///     .collect();
    /// assert_eq!(values, vec![4., 0., 2.]);
    /// ```
    pub fn density(&self, titers: &TiterTable, selection: &Selection) -> Vec<StrainValue> {
        let Some(SampleId(id)) = selection.active() else {
            return vec![];
        };

        self.strain_order
            .iter()
            .map(|strain| StrainValue {
                strain: strain.clone(),
                value: titers.value(id, strain).unwrap_or(0.),
            })
            .collect()
    }
}

/// Radius of the scatterplot point of sample `id`
pub fn point_radius(selection: &Selection, id: &SampleId) -> f64 {
    if selection.is_selected(id) {
        SELECTED_RADIUS
    } else {
        POINT_RADIUS
    }
}

/// Position of `value` in `extent`, clamped to `[0, 1]`, for sequential colour scales.
/// A degenerate extent maps everything to `0.5`.
pub fn scale_fraction(value: f64, (min, max): (f64, f64)) -> f64 {
    if max <= min {
        return 0.5;
    }
    ((value - min) / (max - min)).clamp(0., 1.)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionEvent;
    use crate::titers::{Assay, TiterRecord};

    fn titers() -> TiterTable {
        let records = [("P1", "A", 1.), ("P1", "D", 5.), ("P2", "B", 2.)]
            .into_iter()
            .map(|(participant, strain, value)| TiterRecord {
                participant_id: participant.into(),
                strain: strain.into(),
                value,
            })
            .collect();
        TiterTable::new(Assay::HiTiter, records)
    }

    #[test]
    fn strain_order_and_index() {
        let tree = TreeNode::from_newick("(A,(B,C)D);").unwrap();
        let view = LinkedView::new(&tree);

        assert_eq!(view.strain_order(), ["A", "B", "C", "D"]);
        assert_eq!(view.strain_index("C"), Some(2));
        assert_eq!(view.strain_index("E"), None);
    }

    #[test]
    fn leaf_values_follow_active_sample() {
        let tree = TreeNode::from_newick("(A,(B,C)D,);").unwrap();
        let view = LinkedView::new(&tree);
        let titers = titers();
        let mut selection = Selection::new();

        let values = view.leaf_values(&titers, &selection);
        assert_eq!(values.len(), 4);
        assert!(values.iter().all(|leaf| leaf.value.is_none()));
        assert_eq!(values[3].strain, None);

        selection.apply(SelectionEvent::Hover("P1".into()));
        let values: Vec<_> = view
            .leaf_values(&titers, &selection)
            .into_iter()
            .map(|leaf| leaf.value)
            .collect();
        assert_eq!(values, vec![Some(1.), None, None, None]);

        selection.apply(SelectionEvent::Click("P2".into()));
        let values: Vec<_> = view
            .leaf_values(&titers, &selection)
            .into_iter()
            .map(|leaf| leaf.value)
            .collect();
        assert_eq!(values, vec![None, Some(2.), None, None]);
    }

    #[test]
    fn density_includes_internal_names() {
        let tree = TreeNode::from_newick("(A,(B,C)D);").unwrap();
        let view = LinkedView::new(&tree);
        let mut selection = Selection::new();
        selection.apply(SelectionEvent::Click("P1".into()));

        let density = view.density(&titers(), &selection);
        assert_eq!(
            density,
            vec![
                StrainValue { strain: "A".into(), value: 1. },
                StrainValue { strain: "B".into(), value: 0. },
                StrainValue { strain: "C".into(), value: 0. },
                StrainValue { strain: "D".into(), value: 5. },
            ]
        );
    }

    #[test]
    fn radii_and_scale() {
        let mut selection = Selection::new();
        selection.apply(SelectionEvent::Click("P1".into()));
        assert_eq!(point_radius(&selection, &"P1".into()), SELECTED_RADIUS);
        assert_eq!(point_radius(&selection, &"P2".into()), POINT_RADIUS);

        assert_eq!(scale_fraction(5., (0., 10.)), 0.5);
        assert_eq!(scale_fraction(-1., (0., 10.)), 0.);
        assert_eq!(scale_fraction(12., (0., 10.)), 1.);
        assert_eq!(scale_fraction(3., (3., 3.)), 0.5);
    }
}
