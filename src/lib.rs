#![warn(missing_docs)]
//! Explore how antigenic measurements relate to viral strain relationships.
//!
//! The crate reads a phylogenetic tree of strains in the Newick format and
//! derives from it the ordering used to align per-sample measurements
//! (titers or IC50) on the tree leaves. Around this core it provides:
//!  - a dendrogram [layout](tree::layout) of the tree,
//!  - readers for the [measurement](titers) and [embedding](samples) tables,
//!  - an explicit [selection](selection) state and the [linked views](view)
//!    computed from it.
//!
//! ```
//! use neutscape::{leaf_order, parse};
//!
//! let tree = parse("((A:0.1,B:0.2):0.3,C:0.4);").unwrap();
//! assert_eq!(leaf_order(&tree), vec!["A", "B", "C"]);
//! ```

pub mod samples;
pub mod selection;
pub mod table;
pub mod titers;
pub mod tree;
pub mod view;

pub use tree::{leaf_order, parse, NewickParseError, TreeNode};
