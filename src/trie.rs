use std::fmt;
use std::mem;
use std::ops::Index;

use crate::as_bytes::AsBytes;
use crate::error::InvariantError;
use crate::iter::{Iter, IterMut, Keys, Values, ValuesMut};
use crate::node::{Branch, Char, Node, critical_index};
use crate::traversal::{Visit, depth_first};

/// A map from byte strings to values, stored as a sparse qp-trie.
///
/// Branches decide on a single key position (their critical index) and hold
/// only the children that are present, located through a 257-bit presence
/// bitmap. Leaves hold the complete key, so the tree only needs a branch
/// wherever two keys actually diverge.
///
/// # Examples
///
/// ```
/// use qptrie::Trie;
///
/// let mut trie = Trie::new();
///
/// assert!(!trie.set("apple", 1));
/// assert!(!trie.set("apricot", 2));
/// assert!(!trie.set("app", 3));
///
/// // Setting an existing key updates it in place
/// assert!(trie.set("apple", 10));
/// assert_eq!(trie.get("apple"), Some(&10));
///
/// assert!(trie.delete("app"));
/// assert!(!trie.delete("app"));
/// assert_eq!(trie.get("app"), None);
///
/// // Entries come back in key order
/// let keys: Vec<&[u8]> = trie.keys().collect();
/// assert_eq!(keys, vec![&b"apple"[..], &b"apricot"[..]]);
/// ```
#[derive(Clone)]
pub struct Trie<V> {
    pub(crate) root: Node<V>,
    pub(crate) len: usize,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for Trie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map_debug = f.debug_map();

        for (key, value) in self.iter() {
            map_debug.entry(&String::from_utf8_lossy(key), value);
        }

        map_debug.finish()
    }
}

impl<V: PartialEq> PartialEq for Trie<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<V: Eq> Eq for Trie<V> {}

impl<V, Q: ?Sized> Index<&Q> for Trie<V>
where
    Q: AsBytes,
{
    type Output = V;

    fn index(&self, key: &Q) -> &Self::Output {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: AsBytes, V> Extend<(K, V)> for Trie<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: AsBytes, V> FromIterator<(K, V)> for Trie<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = Trie::new();
        trie.extend(iter);
        trie
    }
}

impl<K: AsBytes, V, const N: usize> From<[(K, V); N]> for Trie<V> {
    fn from(array: [(K, V); N]) -> Self {
        array.into_iter().collect()
    }
}

fn expect_branch<V>(node: &mut Node<V>) -> &mut Branch<V> {
    match node {
        Node::Branch(branch) => branch,
        _ => panic!("descent ended outside a branch"),
    }
}

impl<V> Trie<V> {
    /// Creates an empty trie. The root is a branch on the first key byte.
    pub fn new() -> Self {
        Trie {
            root: Node::Branch(Branch::new(0)),
            len: 0,
        }
    }

    /// Returns the number of entries in the trie.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        *self = Trie::new();
    }

    /// The root node, always a branch. This is the starting point for
    /// [`depth_first`] and [`breadth_first`](crate::breadth_first).
    pub fn root(&self) -> &Node<V> {
        &self.root
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use qptrie::Trie;
    /// let mut trie = Trie::new();
    /// trie.set("", 0);
    /// trie.set(vec![0u8, 1], 1);
    /// assert_eq!(trie.get(""), Some(&0));
    /// assert_eq!(trie.get([0u8, 1]), Some(&1));
    /// assert_eq!(trie.get([0u8]), None);
    /// ```
    pub fn get<K: AsBytes>(&self, key: K) -> Option<&V> {
        let key = key.as_bytes();
        match self.root.descend(&key) {
            Some((_, _, Some(Node::Leaf(leaf)))) if leaf.key() == &key[..] => Some(leaf.value()),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use qptrie::Trie;
    /// let mut trie = Trie::new();
    /// trie.set("a", 1);
    /// if let Some(value) = trie.get_mut("a") {
    ///     *value += 1;
    /// }
    /// assert_eq!(trie["a"], 2);
    /// ```
    pub fn get_mut<K: AsBytes>(&mut self, key: K) -> Option<&mut V> {
        let key = key.as_bytes();
        let (node, char, _) = self.root.descend_mut(&key);
        match expect_branch(node).lookup_mut(char) {
            Some(Node::Leaf(leaf)) if leaf.key() == &key[..] => Some(leaf.value_mut()),
            _ => None,
        }
    }

    pub fn contains_key<K: AsBytes>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value` under `key`, returning `true` if the key was already
    /// present and its value has been replaced.
    pub fn set<K: AsBytes>(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_some()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// # use qptrie::Trie;
    /// let mut trie = Trie::new();
    /// assert_eq!(trie.insert("fos", 1), None);
    /// assert_eq!(trie.insert("f", 2), None);
    /// assert_eq!(trie.insert("fos", 3), Some(1));
    /// assert_eq!(trie.len(), 2);
    /// ```
    pub fn insert<K: AsBytes>(&mut self, key: K, value: V) -> Option<V> {
        let key = key.as_bytes();

        let (node, char, _) = self.root.descend_mut(&key);
        let branch = expect_branch(node);
        let (split_at, displaced_char) = match branch.lookup_mut(char) {
            Some(Node::Leaf(leaf)) if leaf.key() == &key[..] => {
                return Some(mem::replace(leaf.value_mut(), value));
            }
            Some(occupied) => {
                let nearest = occupied
                    .nearest_leaf()
                    .expect("every branch below the root leads to a leaf");
                let index = critical_index(&key, nearest.key());
                (index, Char::at(nearest.key(), index))
            }
            None => {
                // The branches above only looked at their own indices, so the
                // key may still part from this branch's leaves before its index.
                let diverged = branch
                    .nearest_leaf()
                    .map(|nearest| {
                        let index = critical_index(&key, nearest.key());
                        (index, Char::at(nearest.key(), index))
                    })
                    .filter(|&(index, _)| index < branch.index());
                match diverged {
                    Some(split) => split,
                    None => {
                        branch.add(char, Node::leaf(key.into_owned(), value));
                        self.len += 1;
                        return None;
                    }
                }
            }
        };

        // The keys diverge at a position no branch on the path decides on yet.
        // That position may lie above where the first descent stopped, so go
        // again from the root, this time only as deep as the divergence.
        let new_char = Char::at(&key, split_at);
        log::trace!("split at index {split_at}: {new_char} beside {displaced_char}");

        let (node, char, _) = self.root.descend_mut(&key[..split_at]);
        let Some(slot) = expect_branch(node).lookup_mut(char) else {
            panic!("no child at {char} on the way to critical index {split_at}");
        };
        let displaced = mem::take(slot);
        let mut twig = Branch::new(split_at);
        twig.add(displaced_char, displaced);
        twig.add(new_char, Node::leaf(key.into_owned(), value));
        *slot = Node::Branch(twig);
        self.len += 1;
        None
    }

    /// Removes `key`, returning `true` if it was present.
    pub fn delete<K: AsBytes>(&mut self, key: K) -> bool {
        self.remove(key).is_some()
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// A branch other than the root that is left with a single child is
    /// replaced by that child.
    ///
    /// # Examples
    ///
    /// ```
    /// # use qptrie::Trie;
    /// let mut trie = Trie::new();
    /// trie.set("hello", 1);
    /// trie.set("help", 2);
    /// assert_eq!(trie.remove("hello"), Some(1));
    /// assert_eq!(trie.remove("hello"), None);
    /// assert_eq!(trie.get("help"), Some(&2));
    /// ```
    pub fn remove<K: AsBytes>(&mut self, key: K) -> Option<V> {
        let key = key.as_bytes();

        let (node, char, depth) = self.root.descend_mut(&key);
        let branch = expect_branch(node);
        if !matches!(branch.lookup(char), Some(Node::Leaf(leaf)) if leaf.key() == &key[..]) {
            return None;
        }
        let removed = branch.remove(char);
        if depth > 0 && branch.len() == 1 {
            log::trace!("contracting branch at index {}", branch.index());
            if let Some(only) = branch.take_children().pop() {
                *node = only;
            }
        }
        self.len -= 1;

        let Node::Leaf(leaf) = removed else {
            unreachable!("removed slot held a matching leaf");
        };
        Some(leaf.into_parts().1)
    }

    /// Returns an iterator over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            stack: vec![&self.root],
            remaining: self.len,
        }
    }

    /// Returns an iterator over the entries in ascending key order, with
    /// mutable references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            stack: vec![&mut self.root],
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Walks the whole tree and verifies its structural invariants:
    ///
    /// - the root is a branch;
    /// - every branch has as many presence bits as children, none empty;
    /// - every branch but the root has at least two children;
    /// - critical indices strictly increase going down;
    /// - every leaf sits in the slot its key selects at each branch above it;
    /// - all leaves below a branch agree on the bytes before its index;
    /// - the number of leaves matches [`len`](Trie::len).
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let result = self.walk_invariants();
        if let Err(err) = &result {
            log::debug!("trie invariant violated: {err}");
        }
        result
    }

    fn walk_invariants(&self) -> Result<(), InvariantError> {
        if !self.root.is_branch() {
            return Err(InvariantError::RootNotBranch);
        }

        // (critical index, slot character) of every branch above the node
        let mut path: Vec<(usize, Char)> = Vec::new();
        // (critical index, first leaf key seen below) of every open branch
        let mut prefixes: Vec<(usize, Option<&[u8]>)> = Vec::new();
        let mut leaves = 0;
        depth_first(&self.root, |visit| {
            if visit.order == Visit::Postorder {
                if visit.edge.is_some() {
                    path.pop();
                }
                if visit.node.is_branch() {
                    prefixes.pop();
                }
                return Ok(());
            }
            if let (Some(parent_index), Some(edge)) = (visit.parent_index, visit.edge) {
                path.push((parent_index, edge));
            }

            match visit.node {
                Node::Empty => Err(InvariantError::EmptyChild {
                    parent_index: visit.parent_index.unwrap_or_default(),
                }),
                Node::Branch(branch) => {
                    if branch.bitmap_len() != branch.len() {
                        return Err(InvariantError::BitmapMismatch {
                            index: branch.index(),
                            bits: branch.bitmap_len(),
                            children: branch.len(),
                        });
                    }
                    if visit.depth > 0 && branch.len() < 2 {
                        return Err(InvariantError::UnderfullBranch {
                            index: branch.index(),
                            children: branch.len(),
                        });
                    }
                    if let Some(parent) = visit.parent_index {
                        if branch.index() <= parent {
                            return Err(InvariantError::IndexNotIncreasing {
                                parent,
                                child: branch.index(),
                            });
                        }
                    }
                    prefixes.push((branch.index(), None));
                    Ok(())
                }
                Node::Leaf(leaf) => {
                    leaves += 1;
                    for &(index, found) in &path {
                        let expected = Char::at(leaf.key(), index);
                        if expected != found {
                            return Err(InvariantError::MisplacedLeaf {
                                key: leaf.key().to_vec(),
                                index,
                                expected,
                                found,
                            });
                        }
                    }
                    for (index, first) in &mut prefixes {
                        match *first {
                            None => *first = Some(leaf.key()),
                            Some(other) if critical_index(leaf.key(), other) < *index => {
                                return Err(InvariantError::DivergentLeaf {
                                    key: leaf.key().to_vec(),
                                    index: *index,
                                    other: other.to_vec(),
                                });
                            }
                            Some(_) => {}
                        }
                    }
                    Ok(())
                }
            }
        })?;

        if leaves != self.len {
            return Err(InvariantError::LengthMismatch {
                recorded: self.len,
                counted: leaves,
            });
        }
        Ok(())
    }
}
