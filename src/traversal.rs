use std::collections::VecDeque;
use std::fmt;

use crate::node::{Char, Node};

/// Which of its two depth-first visits a node is receiving.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Visit {
    /// The node has just been discovered.
    Preorder,
    /// Everything below the node has been visited.
    Postorder,
}

/// A node as seen by a traversal callback, with its position in the walk.
pub struct SearchNode<'a, V> {
    pub node: &'a Node<V>,
    /// Distance from the node the traversal started at.
    pub depth: usize,
    /// Critical index of the parent branch, `None` for the starting node.
    pub parent_index: Option<usize>,
    /// Character of the parent slot holding this node.
    pub edge: Option<Char>,
    pub order: Visit,
}

impl<V> Clone for SearchNode<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for SearchNode<'_, V> {}

impl<V: fmt::Debug> fmt::Debug for SearchNode<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchNode")
            .field("node", self.node)
            .field("depth", &self.depth)
            .field("parent_index", &self.parent_index)
            .field("edge", &self.edge)
            .field("order", &self.order)
            .finish()
    }
}

impl<'a, V> SearchNode<'a, V> {
    fn root(node: &'a Node<V>) -> Self {
        SearchNode {
            node,
            depth: 0,
            parent_index: None,
            edge: None,
            order: Visit::Preorder,
        }
    }

    /// Records for this node's children in ascending character order.
    fn children(self) -> impl Iterator<Item = SearchNode<'a, V>> + 'a {
        let depth = self.depth + 1;
        self.node.as_branch().into_iter().flat_map(move |branch| {
            branch
                .chars()
                .zip(branch.children())
                .map(move |(char, child)| SearchNode {
                    node: child,
                    depth,
                    parent_index: Some(branch.index()),
                    edge: Some(char),
                    order: Visit::Preorder,
                })
        })
    }
}

/// Walks the subtree rooted at `node` depth-first.
///
/// The callback sees every node twice: once when it is discovered
/// ([`Visit::Preorder`]) and once after all of its descendants have been
/// visited ([`Visit::Postorder`]). Children are pushed in ascending character
/// order, so siblings are discovered from the highest character down. The
/// first error returned by the callback stops the walk and is returned.
///
/// # Examples
///
/// ```
/// use qptrie::{Trie, Visit, depth_first};
///
/// let mut trie = Trie::new();
/// trie.set("a", 1);
/// trie.set("b", 2);
///
/// let mut leaves = 0;
/// depth_first(trie.root(), |visit| {
///     if visit.order == Visit::Preorder && visit.node.is_leaf() {
///         leaves += 1;
///     }
///     Ok::<_, ()>(())
/// })
/// .unwrap();
/// assert_eq!(leaves, 2);
/// ```
pub fn depth_first<'a, V, E, F>(node: &'a Node<V>, mut callback: F) -> Result<(), E>
where
    F: FnMut(SearchNode<'a, V>) -> Result<(), E>,
{
    let mut stack = vec![SearchNode::root(node)];
    while let Some(mut visit) = stack.pop() {
        callback(visit)?;
        if visit.order == Visit::Preorder {
            visit.order = Visit::Postorder;
            stack.push(visit);
            stack.extend(visit.children());
        }
    }
    Ok(())
}

/// Walks the subtree rooted at `node` breadth-first, visiting each node once
/// in non-decreasing depth order. The first error returned by the callback
/// stops the walk and is returned.
pub fn breadth_first<'a, V, E, F>(node: &'a Node<V>, mut callback: F) -> Result<(), E>
where
    F: FnMut(SearchNode<'a, V>) -> Result<(), E>,
{
    let mut queue = VecDeque::from([SearchNode::root(node)]);
    while let Some(visit) = queue.pop_front() {
        callback(visit)?;
        queue.extend(visit.children());
    }
    Ok(())
}
