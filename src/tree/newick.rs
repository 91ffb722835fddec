//! Read phylogenetic trees from Newick strings.
//!
//! A Newick string is split into the delimiters `(`, `)`, `,`, `:` and `;`
//! and the free text found between them. Whitespace around delimiters is
//! discarded and runs of delimiters do not produce empty names. Free text
//! is a node name when it follows `(`, `)`, `,` or starts the input, and a
//! branch length when it follows `:`.
//!
//! The tree is built in a single pass with an explicit stack of ancestors,
//! so nesting depth is only bounded by memory.

use std::{fs, num::ParseFloatError, path::Path};

use log::{debug, trace, warn};
use thiserror::Error;

use super::{EdgeLength, TreeNode};

const NEWICK_DELIMITERS: &[char] = &['(', ')', ',', ':', ';'];

/// Errors that can occur when parsing newick strings.
#[derive(Error, Debug)]
pub enum NewickParseError {
    /// A subtree is closed but no subtree is open
    #[error("Closing bracket at offset {offset} has no matching opening bracket.")]
    UnbalancedClose {
        /// Byte offset of the closing bracket
        offset: usize,
    },
    /// The newick string ends with unclosed subtrees
    #[error("Missing {open} closing bracket(s).")]
    UnclosedBracket {
        /// Number of subtrees left open
        open: usize,
    },
    /// We are trying to add a sibling but have no parent node.
    #[error("Sibling separator at offset {offset} is outside of any subtree.")]
    NoSubtreeParent {
        /// Byte offset of the separator
        offset: usize,
    },
    /// A node that already has children opens a second set of children
    #[error("Node at offset {offset} already has a set of children.")]
    DuplicateBranchSet {
        /// Byte offset of the opening bracket
        offset: usize,
    },
    /// A branch length is not a number *(only raised with [`LengthPolicy::Strict`])*
    #[error("Could not parse branch length {text:?} at offset {offset}.")]
    InvalidLength {
        /// Byte offset of the branch length
        offset: usize,
        /// The offending text
        text: String,
        /// Reason the text is not a number
        source: ParseFloatError,
    },
    /// There was a [`std::io::Error`] when reading a newick file
    #[error("Problem reading file")]
    IoError(#[from] std::io::Error),
}

/// What to do with a branch length that is not a valid number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthPolicy {
    /// Store `NaN` as the branch length and keep parsing
    #[default]
    Lenient,
    /// Fail the whole parse
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Open,
    Close,
    Comma,
    Colon,
    Semicolon,
    Text(&'a str),
}

/// Splits a newick string into tokens with their byte offsets.
/// Free text is trimmed and whitespace-only text is skipped.
struct Tokens<'a> {
    newick: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(newick: &'a str) -> Self {
        Self { newick, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (usize, Token<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.newick[self.pos..];
            let start = self.pos;

            let text = match rest.find(NEWICK_DELIMITERS) {
                Some(0) => {
                    self.pos += 1;
                    let token = match rest.as_bytes()[0] {
                        b'(' => Token::Open,
                        b')' => Token::Close,
                        b',' => Token::Comma,
                        b':' => Token::Colon,
                        _ => Token::Semicolon,
                    };
                    return Some((start, token));
                }
                Some(end) => &rest[..end],
                None if rest.is_empty() => return None,
                None => rest,
            };
            self.pos += text.len();

            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            let offset = start + (text.len() - text.trim_start().len());
            return Some((offset, Token::Text(trimmed)));
        }
    }
}

/// Parser (configuration) for Newick strings.
///
/// # Example
/// ```
/// use neutscape::tree::{LengthPolicy, NewickParser};
///
/// let lenient = NewickParser::new();
/// let tree = lenient.parse("(A:0.1,B:xyz);").unwrap();
/// assert!(tree.children[1].branch_length.unwrap().is_nan());
///
/// let strict = NewickParser::new().with_length_policy(LengthPolicy::Strict);
/// assert!(strict.parse("(A:0.1,B:xyz);").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewickParser {
    length_policy: LengthPolicy,
}

impl NewickParser {
    /// Creates a parser with the [`LengthPolicy::Lenient`] branch length policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how malformed branch lengths are handled
    pub fn with_length_policy(mut self, length_policy: LengthPolicy) -> Self {
        self.length_policy = length_policy;
        self
    }

    fn parse_length(&self, text: &str, offset: usize) -> Result<EdgeLength, NewickParseError> {
        match text.parse() {
            Ok(length) => Ok(length),
            Err(source) => match self.length_policy {
                LengthPolicy::Lenient => {
                    warn!("Branch length {text:?} at offset {offset} is not a number, using NaN");
                    Ok(EdgeLength::NAN)
                }
                LengthPolicy::Strict => Err(NewickParseError::InvalidLength {
                    offset,
                    text: text.to_string(),
                    source,
                }),
            },
        }
    }

    /// Read a newick formatted string and build a [`TreeNode`] hierarchy from it.
    /// # Example
    /// ```
    /// use neutscape::tree::NewickParser;
    ///
    /// let tree = NewickParser::new().parse("((A,B),C);").unwrap();
    ///
    /// assert_eq!(tree.children.len(), 2);
    /// assert_eq!(tree.children[0].name, None);
    /// assert_eq!(tree.leaf_order(), vec!["A", "B", "C"]);
    /// ```
    pub fn parse(&self, newick: &str) -> Result<TreeNode, NewickParseError> {
        let mut current = TreeNode::new();
        let mut ancestors: Vec<TreeNode> = Vec::new();
        let mut previous = None;

        for (offset, token) in Tokens::new(newick) {
            match token {
                Token::Open => {
                    if current.is_internal() {
                        return Err(NewickParseError::DuplicateBranchSet { offset });
                    }
                    ancestors.push(std::mem::take(&mut current));
                }
                Token::Comma => {
                    let parent = ancestors
                        .last_mut()
                        .ok_or(NewickParseError::NoSubtreeParent { offset })?;
                    parent.children.push(std::mem::take(&mut current));
                }
                Token::Close => {
                    let mut parent = ancestors
                        .pop()
                        .ok_or(NewickParseError::UnbalancedClose { offset })?;
                    parent.children.push(std::mem::take(&mut current));
                    current = parent;
                }
                Token::Colon | Token::Semicolon => {}
                Token::Text(text) => match previous {
                    None | Some(Token::Open | Token::Close | Token::Comma) => {
                        current.set_name(text.to_string())
                    }
                    Some(Token::Colon) => {
                        current.branch_length = Some(self.parse_length(text, offset)?)
                    }
                    _ => trace!("Ignoring {text:?} at offset {offset}"),
                },
            }
            previous = Some(token);
        }

        if !ancestors.is_empty() {
            return Err(NewickParseError::UnclosedBracket {
                open: ancestors.len(),
            });
        }

        debug!(
            "Parsed tree with {} nodes and {} leaves",
            current.size(),
            current.n_leaves()
        );

        Ok(current)
    }
}

/// Read a newick formatted string with the default [`NewickParser`].
/// # Example
/// ```
/// let tree = neutscape::parse("(A:0.1,B:0.2);").unwrap();
///
/// assert_eq!(tree.children[0].name.as_deref(), Some("A"));
/// assert_eq!(tree.children[1].branch_length, Some(0.2));
/// ```
pub fn parse(newick: &str) -> Result<TreeNode, NewickParseError> {
    NewickParser::new().parse(newick)
}

/// Methods to read [`TreeNode`] hierarchies from [`String`] objects or files.
impl TreeNode {
    /// Read a newick formatted string, see [`parse`]
    pub fn from_newick(newick: &str) -> Result<Self, NewickParseError> {
        parse(newick)
    }

    /// Creates a tree from a newick file
    pub fn from_file(path: &Path) -> Result<Self, NewickParseError> {
        let newick_string = fs::read_to_string(path)?;
        Self::from_newick(&newick_string)
    }
}
