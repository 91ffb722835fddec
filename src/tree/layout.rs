//! Place the nodes of a tree on a dendrogram.
//!
//! Coordinates follow the cluster layout convention: `x` runs along the
//! breadth of the tree (leaves are spread over it) and `y` along its depth
//! (the root is at `0` and every leaf at the full depth extent).
use serde::Serialize;

use super::TreeNode;

#[derive(Serialize, Debug, Clone, PartialEq)]
/// Represents an elbow link between a node and one of its children
pub struct Branch {
    /// Breadth coordinate of the parent
    pub source_x: f64,
    /// Depth coordinate of the parent
    pub source_y: f64,
    /// Breadth coordinate of the child
    pub target_x: f64,
    /// Depth coordinate of the child
    pub target_y: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
/// Represents a node in a visualization as a point and a label
pub struct PlacedNode {
    /// Breadth coordinate of the node
    pub x: f64,
    /// Depth coordinate of the node
    pub y: f64,
    /// Label of the node
    pub label: Option<String>,
    /// Whether the node is a leaf
    pub leaf: bool,
}

/// Represents the whole layout of a visualized tree
#[derive(Default, Serialize, Debug, Clone)]
pub struct Layout {
    /// Branches of the tree
    pub branches: Vec<Branch>,
    /// Nodes of the tree, in postorder
    pub nodes: Vec<PlacedNode>,
}

impl Branch {
    /// Rescale a branch by applying a multiplicative
    /// factor to it's start and end coordinates
    pub fn rescale(&mut self, factor: f64) {
        self.source_x *= factor;
        self.source_y *= factor;
        self.target_x *= factor;
        self.target_y *= factor;
    }
}

impl PlacedNode {
    /// Rescale a node position by applying a multiplicative factor
    pub fn rescale(&mut self, factor: f64) {
        self.x *= factor;
        self.y *= factor;
    }
}

impl Layout {
    /// Rescale a Layout by applying a multiplicative factor
    pub fn rescale(&mut self, factor: f64) {
        self.branches.iter_mut().for_each(|b| b.rescale(factor));
        self.nodes.iter_mut().for_each(|n| n.rescale(factor));
    }

    /// Leaves of the layout, sorted along the breadth axis
    pub fn leaves(&self) -> Vec<&PlacedNode> {
        let mut leaves: Vec<_> = self.nodes.iter().filter(|node| node.leaf).collect();
        leaves.sort_by(|a, b| a.x.total_cmp(&b.x));
        leaves
    }
}

/// Intermediate placement: breadth in leaf units and height in edges
struct Placement {
    x: f64,
    height: usize,
    children: Vec<usize>,
}

/// Returns the dendrogram layout of a tree fitted in a `width` (breadth)
/// by `height` (depth) box.
///
/// Leaves are evenly spaced in leaf order with half a gap on each side,
/// internal nodes are centred over their children and placed by their
/// topological height so that all leaves line up at depth `height`.
/// ```
/// use neutscape::tree::{layout::cluster_layout, TreeNode};
///
/// let tree = TreeNode::from_newick("((A,B),C);").unwrap();
/// let layout = cluster_layout(&tree, 300., 200.);
///
/// let leaves: Vec<_> = layout.leaves()
///     .iter()
///     .map(|leaf| (leaf.label.clone().unwrap(), leaf.x, leaf.y))
///     .collect();
///
/// assert_eq!(leaves, vec![
///     ("A".to_string(), 50., 200.),
///     ("B".to_string(), 150., 200.),
///     ("C".to_string(), 250., 200.),
/// ]);
/// assert_eq!(layout.branches.len(), 4);
/// ```
pub fn cluster_layout(root: &TreeNode, width: f64, height: f64) -> Layout {
    let mut placements: Vec<Placement> = Vec::with_capacity(root.size());
    let mut labels = Vec::with_capacity(placements.capacity());
    let mut pending: Vec<usize> = vec![];
    let mut n_leaves = 0;

    for node in root.postorder() {
        let placement = if node.is_leaf() {
            n_leaves += 1;
            Placement {
                x: (n_leaves - 1) as f64,
                height: 0,
                children: vec![],
            }
        } else {
            let children = pending.split_off(pending.len() - node.children.len());
            let x = children.iter().map(|&c| placements[c].x).sum::<f64>() / children.len() as f64;
            let height = 1 + children
                .iter()
                .map(|&c| placements[c].height)
                .max()
                .unwrap_or_default();
            Placement {
                x,
                height,
                children,
            }
        };

        pending.push(placements.len());
        placements.push(placement);
        labels.push(node.name.clone());
    }

    let root_y = placements.last().map_or(0, |p| p.height) as f64;
    let kx = width / n_leaves as f64;
    let ky = height / root_y.max(1.);

    let coords: Vec<_> = placements
        .iter()
        .map(|p| ((p.x + 0.5) * kx, (root_y - p.height as f64) * ky))
        .collect();

    let mut layout = Layout::default();
    for ((placement, label), &(x, y)) in placements.iter().zip(labels).zip(coords.iter()) {
        for &child in placement.children.iter() {
            let (target_x, target_y) = coords[child];
            layout.branches.push(Branch {
                source_x: x,
                source_y: y,
                target_x,
                target_y,
            });
        }
        layout.nodes.push(PlacedNode {
            x,
            y,
            label,
            leaf: placement.children.is_empty(),
        });
    }

    layout
}
