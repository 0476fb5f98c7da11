use std::fmt;

/// Number of possible branches below a node: one per byte plus the terminal.
pub const BRANCHING_FACTOR: usize = 257;

const BITMAP_WORDS: usize = BRANCHING_FACTOR.div_ceil(64);

/// A key byte shifted up by one so that `0` is free to mark the end of a key.
///
/// Keys that are a strict prefix of another key (including the empty key)
/// take the terminal slot at the branch that separates them, which sorts
/// before every real byte.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Char(u16);

impl Char {
    /// The character seen past the end of a key.
    pub const TERMINAL: Char = Char(0);

    pub const fn from_byte(byte: u8) -> Self {
        Char(byte as u16 + 1)
    }

    /// The character of `key` at `index`, or [`Char::TERMINAL`] when the
    /// index is at or past the end of the key.
    #[inline]
    pub fn at(key: &[u8], index: usize) -> Self {
        match key.get(index) {
            Some(&byte) => Char::from_byte(byte),
            None => Char::TERMINAL,
        }
    }

    pub const fn is_terminal(self) -> bool {
        self.0 == 0
    }

    /// The byte this character stands for, `None` for the terminal.
    pub const fn to_byte(self) -> Option<u8> {
        if self.is_terminal() {
            None
        } else {
            Some((self.0 - 1) as u8)
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Char {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_byte() {
            None => f.write_str("<end>"),
            Some(byte) if byte.is_ascii_graphic() => write!(f, "'{}'", byte as char),
            Some(byte) => write!(f, "0x{byte:02x}"),
        }
    }
}

// Bit manipulation over the 257-bit presence set
fn set_bit(a: &mut [u64; BITMAP_WORDS], c: Char) {
    let k = c.0 as usize;
    a[k / 64] |= 1u64 << (k % 64);
}

fn clear_bit(a: &mut [u64; BITMAP_WORDS], c: Char) {
    let k = c.0 as usize;
    a[k / 64] &= !(1u64 << (k % 64));
}

fn test_bit(a: &[u64; BITMAP_WORDS], c: Char) -> bool {
    let k = c.0 as usize;
    (a[k / 64] >> (k % 64)) & 0x01 != 0
}

/// Number of set bits strictly below `c`.
fn popcount(a: &[u64; BITMAP_WORDS], c: Char) -> usize {
    let k = c.0 as usize;
    let full: u32 = a.iter().take(k / 64).map(|w| w.count_ones()).sum();
    let partial = a[k / 64] & ((1u64 << (k % 64)) - 1);
    (full + partial.count_ones()) as usize
}

/// A node of the trie.
///
/// `Empty` only appears transiently while nodes are being moved around;
/// a branch never stores an empty child.
pub enum Node<V> {
    Empty,
    Branch(Branch<V>),
    Leaf(Leaf<V>),
}

/// An internal node deciding on the key character at `index`.
pub struct Branch<V> {
    index: usize,
    bitmap: [u64; BITMAP_WORDS],
    children: Vec<Node<V>>,
}

/// A key-value pair. The key is stored whole since the branches above only
/// record the positions at which keys diverge.
pub struct Leaf<V> {
    key: Vec<u8>,
    value: V,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Node::Empty
    }
}

impl<V: Clone> Clone for Node<V> {
    fn clone(&self) -> Self {
        match self {
            Node::Empty => Node::Empty,
            Node::Branch(branch) => Node::Branch(branch.clone()),
            Node::Leaf(leaf) => Node::Leaf(leaf.clone()),
        }
    }
}

impl<V: Clone> Clone for Branch<V> {
    fn clone(&self) -> Self {
        Branch {
            index: self.index,
            bitmap: self.bitmap,
            children: self.children.clone(),
        }
    }
}

impl<V: Clone> Clone for Leaf<V> {
    fn clone(&self) -> Self {
        Leaf {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty => f.write_str("Empty"),
            Node::Branch(branch) => write!(
                f,
                "Branch<@ {} => [{}]>",
                branch.index,
                branch.children.len()
            ),
            Node::Leaf(leaf) => {
                write!(f, "Leaf<")?;
                for byte in &leaf.key {
                    write!(f, "{byte:02X}")?;
                }
                write!(f, " -> {:?}>", leaf.value)
            }
        }
    }
}

impl<V> Node<V> {
    pub(crate) fn leaf(key: Vec<u8>, value: V) -> Self {
        Node::Leaf(Leaf { key, value })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Branch(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_branch(&self) -> Option<&Branch<V>> {
        match self {
            Node::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf<V>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Children in ascending character order; empty for anything but a branch.
    pub fn children(&self) -> &[Node<V>] {
        match self {
            Node::Branch(branch) => &branch.children,
            _ => &[],
        }
    }

    /// The critical index of a branch.
    pub fn index(&self) -> Option<usize> {
        self.as_branch().map(Branch::index)
    }

    pub fn key(&self) -> Option<&[u8]> {
        self.as_leaf().map(Leaf::key)
    }

    pub fn value(&self) -> Option<&V> {
        self.as_leaf().map(Leaf::value)
    }

    /// Follows first children down to a leaf. Every leaf below a node agrees
    /// on the characters decided above it, so any one of them will do when
    /// looking for where a new key diverges.
    pub(crate) fn nearest_leaf(&self) -> Option<&Leaf<V>> {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(leaf) => return Some(leaf),
                Node::Branch(branch) => node = branch.children.first()?,
                Node::Empty => return None,
            }
        }
    }

    /// Walks from this branch towards `key`, returning the deepest branch
    /// reached, the character of `key` at its index and the occupant of that
    /// slot. Descent stops at a leaf, an empty slot, or a branch whose index
    /// lies beyond the end of the key.
    ///
    /// Returns `None` when called on anything but a branch.
    pub fn descend(&self, key: &[u8]) -> Option<(&Branch<V>, Char, Option<&Node<V>>)> {
        let mut branch = self.as_branch()?;
        loop {
            let char = Char::at(key, branch.index);
            match branch.lookup(char) {
                Some(Node::Branch(child)) if child.index <= key.len() => branch = child,
                child => return Some((branch, char, child)),
            }
        }
    }

    /// Mutable counterpart of [`Node::descend`], returning the node holding
    /// the deepest branch so that callers can replace it wholesale, the
    /// character at that branch and its depth below `self`.
    pub(crate) fn descend_mut(&mut self, key: &[u8]) -> (&mut Node<V>, Char, usize) {
        let mut node = self;
        let mut depth = 0;
        loop {
            let Node::Branch(branch) = &*node else {
                panic!("descent must start from a branch");
            };
            let char = Char::at(key, branch.index);
            let deeper = matches!(
                branch.lookup(char),
                Some(Node::Branch(child)) if child.index <= key.len()
            );
            if !deeper {
                return (node, char, depth);
            }
            node = match node {
                Node::Branch(branch) => branch.child_mut(char),
                _ => unreachable!(),
            };
            depth += 1;
        }
    }
}

impl<V> Branch<V> {
    pub fn new(index: usize) -> Self {
        Branch {
            index,
            bitmap: [0; BITMAP_WORDS],
            children: Vec::new(),
        }
    }

    /// The byte position this branch decides on.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn children(&self) -> &[Node<V>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains(&self, char: Char) -> bool {
        test_bit(&self.bitmap, char)
    }

    pub fn lookup(&self, char: Char) -> Option<&Node<V>> {
        if self.contains(char) {
            Some(&self.children[self.child_index(char)])
        } else {
            None
        }
    }

    pub(crate) fn lookup_mut(&mut self, char: Char) -> Option<&mut Node<V>> {
        if self.contains(char) {
            let pos = self.child_index(char);
            Some(&mut self.children[pos])
        } else {
            None
        }
    }

    fn child_mut(&mut self, char: Char) -> &mut Node<V> {
        let index = self.index;
        match self.lookup_mut(char) {
            Some(child) => child,
            None => panic!("no child for {char} at index {index}"),
        }
    }

    /// The leftmost leaf below this branch.
    pub(crate) fn nearest_leaf(&self) -> Option<&Leaf<V>> {
        self.children.first()?.nearest_leaf()
    }

    /// Inserts `node` in the slot for `char`, keeping children in character
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if `node` is empty or the slot is already taken.
    pub(crate) fn add(&mut self, char: Char, node: Node<V>) {
        assert!(!node.is_empty(), "tried to add an empty node");
        assert!(
            !self.contains(char),
            "slot {char} at index {} is already occupied",
            self.index
        );
        let pos = self.child_index(char);
        self.children.insert(pos, node);
        set_bit(&mut self.bitmap, char);
    }

    /// Takes the child in the slot for `char` out of the branch.
    ///
    /// # Panics
    ///
    /// Panics if there is no such child.
    pub(crate) fn remove(&mut self, char: Char) -> Node<V> {
        assert!(
            self.contains(char),
            "no child for {char} at index {} to remove",
            self.index
        );
        let pos = self.child_index(char);
        clear_bit(&mut self.bitmap, char);
        self.children.remove(pos)
    }

    /// Position in `children` of the slot for `char`, whether or not it is
    /// occupied.
    pub(crate) fn child_index(&self, char: Char) -> usize {
        popcount(&self.bitmap, char)
    }

    /// The characters of the occupied slots in ascending order.
    pub fn chars(&self) -> impl Iterator<Item = Char> + '_ {
        (0..BRANCHING_FACTOR as u16)
            .map(Char)
            .filter(|&char| self.contains(char))
    }

    /// Count of bits in the presence set.
    pub(crate) fn bitmap_len(&self) -> usize {
        self.bitmap.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Node<V>] {
        &mut self.children
    }

    pub(crate) fn take_children(&mut self) -> Vec<Node<V>> {
        self.bitmap = [0; BITMAP_WORDS];
        std::mem::take(&mut self.children)
    }
}

impl<V> Leaf<V> {
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub(crate) fn parts_mut(&mut self) -> (&[u8], &mut V) {
        (&self.key, &mut self.value)
    }

    pub(crate) fn into_parts(self) -> (Vec<u8>, V) {
        (self.key, self.value)
    }
}

/// Length of the common prefix of `a` and `b`: the first position at which
/// they differ, or the length of the shorter one if it is a prefix of the
/// other.
pub(crate) fn critical_index(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
