use std::iter::FusedIterator;

use crate::node::Node;
use crate::Trie;

/// An iterator over the key-value pairs of a `Trie`, in ascending key order.
///
/// This struct is created by the [`iter`] method on [`Trie`].
///
/// [`iter`]: Trie::iter
pub struct Iter<'a, V> {
    pub(crate) stack: Vec<&'a Node<V>>,
    pub(crate) remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf(leaf) => {
                    self.remaining -= 1;
                    return Some((leaf.key(), leaf.value()));
                }
                // Reversed so that the lowest character is popped first.
                Node::Branch(branch) => self.stack.extend(branch.children().iter().rev()),
                Node::Empty => {}
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the entries of a `Trie`, in ascending key order.
///
/// This struct is created by the [`iter_mut`] method on [`Trie`].
///
/// [`iter_mut`]: Trie::iter_mut
pub struct IterMut<'a, V> {
    pub(crate) stack: Vec<&'a mut Node<V>>,
    pub(crate) remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a [u8], &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf(leaf) => {
                    self.remaining -= 1;
                    return Some(leaf.parts_mut());
                }
                Node::Branch(branch) => self.stack.extend(branch.children_mut().iter_mut().rev()),
                Node::Empty => {}
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// An iterator over the keys of a `Trie`.
///
/// This struct is created by the [`keys`] method on [`Trie`].
///
/// [`keys`]: Trie::keys
pub struct Keys<'a, V> {
    pub(crate) inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}

/// An iterator over the values of a `Trie`.
///
/// This struct is created by the [`values`] method on [`Trie`].
///
/// [`values`]: Trie::values
pub struct Values<'a, V> {
    pub(crate) inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

/// A mutable iterator over the values of a `Trie`.
///
/// This struct is created by the [`values_mut`] method on [`Trie`].
///
/// [`values_mut`]: Trie::values_mut
pub struct ValuesMut<'a, V> {
    pub(crate) inner: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}

/// An owning iterator over the key-value pairs of a `Trie`.
///
/// This struct is created by the `into_iter` method on [`Trie`].
pub struct IntoIter<V> {
    pub(crate) stack: Vec<Node<V>>,
    pub(crate) remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (Vec<u8>, V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf(leaf) => {
                    self.remaining -= 1;
                    return Some(leaf.into_parts());
                }
                Node::Branch(mut branch) => {
                    self.stack.extend(branch.take_children().into_iter().rev())
                }
                Node::Empty => {}
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

impl<V> IntoIterator for Trie<V> {
    type Item = (Vec<u8>, V);
    type IntoIter = IntoIter<V>;

    /// Creates a consuming iterator over the entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use qptrie::Trie;
    /// let mut trie = Trie::new();
    /// trie.set("b", 2);
    /// trie.set("a", 1);
    ///
    /// let entries: Vec<_> = trie.into_iter().collect();
    /// assert_eq!(entries, vec![(b"a".to_vec(), 1), (b"b".to_vec(), 2)]);
    /// ```
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.len,
            stack: vec![self.root],
        }
    }
}

impl<'a, V> IntoIterator for &'a Trie<V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut Trie<V> {
    type Item = (&'a [u8], &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
