use std::fmt::{Debug, Display};
use std::io;

use ptree::{item::StringItem, print_tree, write_tree, TreeBuilder};

use super::EdgeLength;

/// Deepest tree that can be printed, the renderer recurses once per level
pub const MAX_PRINT_DEPTH: usize = 512;

/// A node of a phylogenetic tree.
///
/// A node owns its children: dropping the root drops the whole tree.
#[derive(Default)]
pub struct TreeNode {
    /// Name of the node, usually only set on leaves
    pub name: Option<String>,
    /// Length of the branch between the node and its parent
    pub branch_length: Option<EdgeLength>,
    /// Child nodes, in the order they appear in the source text
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates a new unnamed node
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new named node
    pub fn new_named(name: &str) -> Self {
        Self {
            name: Some(String::from(name)),
            branch_length: None,
            children: Vec::new(),
        }
    }

    /// Sets the length of the branch to the parent of this node
    pub fn with_length(mut self, length: EdgeLength) -> Self {
        self.branch_length = Some(length);
        self
    }

    /// Sets the node name
    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Appends a child to the node and returns a reference to it
    /// ```
    /// use neutscape::tree::TreeNode;
    ///
    /// let mut root = TreeNode::new();
    /// root.add_child(TreeNode::new_named("A").with_length(0.1));
    /// root.add_child(TreeNode::new_named("B"));
    ///
    /// assert_eq!(root.children.len(), 2);
    /// assert_eq!(root.children[0].branch_length, Some(0.1));
    /// ```
    pub fn add_child(&mut self, child: TreeNode) -> &mut TreeNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Check if the node is a leaf
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if the node is an internal node
    pub fn is_internal(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in the subtree rooted at this node (itself included)
    pub fn size(&self) -> usize {
        self.preorder().count()
    }

    /// Number of leaves in the subtree rooted at this node
    pub fn n_leaves(&self) -> usize {
        self.leaves().count()
    }

    /// Number of edges on the longest path from this node to one of its leaves
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }

        max_depth
    }

    /// Iterates over the leaves of the subtree, from left to right
    pub fn leaves(&self) -> impl Iterator<Item = &TreeNode> {
        self.preorder().filter(|node| node.is_leaf())
    }

    /// Iterates over the nodes of the subtree in
    /// [preorder](https://en.wikipedia.org/wiki/Tree_traversal#Pre-order,_NLR)
    /// ```
    /// use neutscape::tree::TreeNode;
    ///
    /// let tree = TreeNode::from_newick("((A,(C,E)D)B,((H)I)G)F;").unwrap();
    /// let preorder: Vec<_> = tree.preorder()
    ///     .filter_map(|node| node.name.as_deref())
    ///     .collect();
    ///
    /// assert_eq!(preorder, vec!["F", "B", "A", "D", "C", "E", "G", "I", "H"])
    /// ```
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }

    /// Iterates over the nodes of the subtree in
    /// [postorder](https://en.wikipedia.org/wiki/Tree_traversal#Post-order,_LRN)
    /// ```
    /// use neutscape::tree::TreeNode;
    ///
    /// let tree = TreeNode::from_newick("((A,(C,E)D)B,((H)I)G)F;").unwrap();
    /// let postorder: Vec<_> = tree.postorder()
    ///     .filter_map(|node| node.name.as_deref())
    ///     .collect();
    ///
    /// assert_eq!(postorder, vec!["A", "C", "E", "D", "B", "H", "I", "G", "F"])
    /// ```
    pub fn postorder(&self) -> Postorder<'_> {
        Postorder {
            stack: vec![(self, 0)],
        }
    }

    /// Names of the subtree in leaf order, see [`leaf_order`]
    pub fn leaf_order(&self) -> Vec<String> {
        leaf_order(self)
    }

    fn format_label(&self) -> String {
        let name = self.name.clone().unwrap_or_default();
        match self.branch_length {
            Some(length) => format!("{name}:{length}"),
            None => name,
        }
    }

    /// Writes the subtree as a newick formatted string
    /// # Example
    /// ```
    /// use neutscape::tree::TreeNode;
    ///
    /// let newick = "(A:0.1,B:0.2,(C:0.3,D:0.4)E:0.5)F;";
    /// let tree = TreeNode::from_newick(newick).unwrap();
    ///
    /// assert_eq!(tree.to_newick(), newick);
    /// ```
    pub fn to_newick(&self) -> String {
        let mut repr = String::new();
        let mut stack = vec![(self, 0)];

        while let Some((node, next_child)) = stack.pop() {
            if let Some(child) = node.children.get(next_child) {
                repr.push(if next_child == 0 { '(' } else { ',' });
                stack.push((node, next_child + 1));
                stack.push((child, 0));
            } else {
                if node.is_internal() {
                    repr.push(')');
                }
                repr += &node.format_label();
            }
        }

        repr.push(';');
        repr
    }

    /// Fills a printable tree builder with the subtree
    fn to_printable(&self) -> io::Result<StringItem> {
        let depth = self.depth();
        if depth > MAX_PRINT_DEPTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Tree is {depth} levels deep, cannot print more than {MAX_PRINT_DEPTH}"),
            ));
        }

        let mut builder = TreeBuilder::new(format!("{self}"));
        let mut stack = vec![(self, 0)];
        while let Some((node, next_child)) = stack.pop() {
            match node.children.get(next_child) {
                Some(child) => {
                    stack.push((node, next_child + 1));
                    if child.is_leaf() {
                        builder.add_empty_child(format!("{child}"));
                    } else {
                        builder.begin_child(format!("{child}"));
                        stack.push((child, 0));
                    }
                }
                // The root is the builder itself and is never closed
                None if !stack.is_empty() => {
                    builder.end_child();
                }
                None => {}
            }
        }

        Ok(builder.build())
    }

    /// Print the tree to the console. Fails on trees deeper than [`MAX_PRINT_DEPTH`].
    pub fn print(&self) -> io::Result<()> {
        print_tree(&self.to_printable()?)
    }

    /// Write the tree hierarchy to `f`, see [`TreeNode::print`]
    pub fn write_to<W: io::Write>(&self, f: W) -> io::Result<()> {
        write_tree(&self.to_printable()?, f)
    }
}

/// Returns the names carried by the tree, ordered so that they match
/// the left to right order of the leaves in a drawing of the tree.
///
/// Children are visited in their stored order and a node's name is emitted
/// once all of its children have been visited, so named internal nodes
/// appear right after their subtree. Unnamed nodes contribute nothing.
/// ```
/// use neutscape::tree::{leaf_order, TreeNode};
///
/// let tree = TreeNode::from_newick("(A,(B,C)D);").unwrap();
/// assert_eq!(leaf_order(&tree), vec!["A", "B", "C", "D"]);
/// ```
pub fn leaf_order(root: &TreeNode) -> Vec<String> {
    root.postorder()
        .filter_map(|node| node.name.clone())
        .collect()
}

/// Iterator over a subtree in preorder, see [`TreeNode::preorder`]
pub struct Preorder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Iterator over a subtree in postorder, see [`TreeNode::postorder`]
pub struct Postorder<'a> {
    // Each entry holds a node and the index of its next unvisited child
    stack: Vec<(&'a TreeNode, usize)>,
}

impl<'a> Iterator for Postorder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, next_child) = self.stack.last_mut()?;
            let node: &'a TreeNode = *node;
            match node.children.get(*next_child) {
                Some(child) => {
                    *next_child += 1;
                    self.stack.push((child, 0));
                }
                None => {
                    self.stack.pop();
                    return Some(node);
                }
            }
        }
    }
}

impl Clone for TreeNode {
    // Same explicit stack as `Drop`, a derived clone would
    // recurse once per level.
    fn clone(&self) -> Self {
        let mut stack = vec![(self, 0, self.shallow_clone())];
        let mut cloned = None;

        while let Some((node, next_child, copy)) = stack.pop() {
            if let Some(child) = node.children.get(next_child) {
                stack.push((node, next_child + 1, copy));
                stack.push((child, 0, child.shallow_clone()));
            } else if let Some((_, _, parent)) = stack.last_mut() {
                parent.children.push(copy);
            } else {
                cloned = Some(copy);
            }
        }

        cloned.unwrap_or_default()
    }
}

impl TreeNode {
    fn shallow_clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            branch_length: self.branch_length,
            children: Vec::with_capacity(self.children.len()),
        }
    }
}

impl Drop for TreeNode {
    // Unlinks descendants one at a time so deep trees don't
    // exhaust the call stack when dropped.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

fn same_length(l1: Option<EdgeLength>, l2: Option<EdgeLength>) -> bool {
    match (l1, l2) {
        (None, None) => true,
        (Some(l1), Some(l2)) if l1.is_nan() && l2.is_nan() => true,
        (Some(l1), Some(l2)) => (l1 - l2).abs() < f64::EPSILON,
        _ => false,
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.preorder();
        let mut right = other.preorder();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(l), Some(r)) => {
                    if l.name != r.name
                        || l.children.len() != r.children.len()
                        || !same_length(l.branch_length, r.branch_length)
                    {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }
}

impl Display for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.branch_length {
            Some(l) => write!(f, "({l:.3}) {:?}", self.name),
            None => write!(f, "{:?}", self.name),
        }
    }
}

impl Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:?}) {:?} Children[{}] Leaves[{}]",
            self.branch_length,
            self.name,
            self.children.len(),
            self.n_leaves(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generates example tree from the tree traversal wikipedia page
    /// https://en.wikipedia.org/wiki/Tree_traversal#Depth-first_search
    /// The difference is that I is the left child of G.
    fn build_simple_tree() -> TreeNode {
        let mut root = TreeNode::new_named("F");

        let b = root.add_child(TreeNode::new_named("B"));
        b.add_child(TreeNode::new_named("A"));
        let d = b.add_child(TreeNode::new_named("D"));
        d.add_child(TreeNode::new_named("C"));
        d.add_child(TreeNode::new_named("E"));

        let g = root.add_child(TreeNode::new_named("G"));
        let i = g.add_child(TreeNode::new_named("I"));
        i.add_child(TreeNode::new_named("H"));

        root
    }

    fn names<'a>(nodes: impl Iterator<Item = &'a TreeNode>) -> Vec<&'a str> {
        nodes.filter_map(|node| node.name.as_deref()).collect()
    }

    #[test]
    fn test_traversals() {
        let tree = build_simple_tree();
        assert_eq!(
            names(tree.preorder()),
            vec!["F", "B", "A", "D", "C", "E", "G", "I", "H"]
        );
        assert_eq!(
            names(tree.postorder()),
            vec!["A", "C", "E", "D", "B", "H", "I", "G", "F"]
        );
        assert_eq!(names(tree.leaves()), vec!["A", "C", "E", "H"]);
    }

    #[test]
    fn test_tips() {
        let tree = build_simple_tree();
        assert!(tree.is_internal());
        assert_eq!(tree.size(), 9);
        assert_eq!(tree.n_leaves(), 4);
        assert_eq!(tree.depth(), 3);
        assert!(TreeNode::new().is_leaf());
        assert_eq!(TreeNode::new().depth(), 0);
    }

    #[test]
    fn leaf_order_emits_internal_names_after_subtree() {
        let tree = build_simple_tree();
        assert_eq!(
            leaf_order(&tree),
            vec!["A", "C", "E", "D", "B", "H", "I", "G", "F"]
        );
    }

    #[test]
    fn leaf_order_skips_unnamed_nodes() {
        let mut root = TreeNode::new();
        let inner = root.add_child(TreeNode::new());
        inner.add_child(TreeNode::new_named("A"));
        inner.add_child(TreeNode::new());
        root.add_child(TreeNode::new_named("C"));

        assert_eq!(leaf_order(&root), vec!["A", "C"]);
        assert_eq!(root.leaf_order(), leaf_order(&root));
        assert!(leaf_order(&TreeNode::new()).is_empty());
    }

    #[test]
    fn to_newick() {
        let mut root = TreeNode::new();
        root.add_child(TreeNode::new_named("A").with_length(0.1));
        let inner = root.add_child(TreeNode::new().with_length(0.5));
        inner.add_child(TreeNode::new_named("B"));
        inner.add_child(TreeNode::new_named("C").with_length(1e-3));

        assert_eq!(root.to_newick(), "(A:0.1,(B,C:0.001):0.5);");
        assert_eq!(TreeNode::new_named("A").to_newick(), "A;");
        assert_eq!(TreeNode::new().to_newick(), ";");
    }

    #[test]
    fn equality() {
        let tree = build_simple_tree();
        assert_eq!(tree, tree.clone());

        let mut other = build_simple_tree();
        other.children[1].set_name("X".into());
        assert_ne!(tree, other);

        let nan = TreeNode::new_named("A").with_length(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(nan, TreeNode::new_named("A").with_length(0.0));
    }

    #[test]
    fn clone_keeps_structure() {
        let tree = build_simple_tree().with_length(0.5);
        let copy = tree.clone();
        assert_eq!(copy, tree);
        assert_eq!(copy.to_newick(), tree.to_newick());
        assert_eq!(copy.to_newick(), "((A,(C,E)D)B,((H)I)G)F:0.5;");
    }

    #[test]
    fn write_hierarchy() {
        let mut output = Vec::new();
        build_simple_tree().write_to(&mut output).unwrap();
        let printed = String::from_utf8(output).unwrap();
        let lines: Vec<_> = printed.lines().collect();

        assert_eq!(lines.len(), 9);
        for (line, name) in lines.iter().zip(["F", "B", "A", "D", "C", "E", "G", "I", "H"]) {
            assert!(line.ends_with(&format!("Some(\"{name}\")")));
        }

        let mut chain = TreeNode::new_named("leaf");
        for _ in 0..MAX_PRINT_DEPTH {
            let mut parent = TreeNode::new();
            parent.children.push(chain);
            chain = parent;
        }
        assert!(chain.write_to(io::sink()).is_ok());
        let mut parent = TreeNode::new();
        parent.children.push(chain);
        assert!(parent.write_to(io::sink()).is_err());
    }

    #[test]
    fn deep_trees_do_not_overflow() {
        let depth = 200_000;
        let mut root = TreeNode::new_named("leaf");
        for _ in 0..depth {
            let mut parent = TreeNode::new();
            parent.children.push(root);
            root = parent;
        }

        assert_eq!(root.depth(), depth);
        assert_eq!(root.size(), depth + 1);
        assert_eq!(leaf_order(&root), vec!["leaf"]);

        let copy = root.clone();
        assert_eq!(copy.depth(), depth);
        assert_eq!(copy, root);

        let err = root.write_to(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        drop(root);
        drop(copy);
    }
}
