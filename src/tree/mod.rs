//! Build and traverse phylogenetic trees.
//!
//! This module defines the [`TreeNode`] struct, an owned hierarchy where each
//! parent holds its children, along with:
//!  - [`newick`]: reading (and writing) trees in the Newick format.
//!  - [`layout`]: placing the nodes of a tree on a dendrogram.
//!  - [`leaf_order`]: the ordering used to align companion datasets on the tree.
//!

/// A module to place tree nodes on a dendrogram
pub mod layout;
pub mod newick;
mod node;

pub use self::newick::{parse, LengthPolicy, NewickParseError, NewickParser};
pub use self::node::{leaf_order, Postorder, Preorder, TreeNode, MAX_PRINT_DEPTH};

/// A type that represents branch lengths between a [`TreeNode`]
/// and its parent.
pub type EdgeLength = f64;
