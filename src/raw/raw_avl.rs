use core::borrow::Borrow;
use core::cmp::Ordering::{Equal, Greater, Less};
use core::iter::FusedIterator;
use core::mem;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{AvlNode, Side};

/// An AVL tree of height `h` holds at least `fib(h + 2) - 1` nodes, so 64
/// levels cover every tree an arena of `u32` handles can hold. The value must
/// be an array length `smallvec::Array` is implemented for.
const MAX_DEPTH: usize = 64;

/// The AVL engine shared by every tree in the crate.
///
/// Ordering comes entirely from `K: Ord`; callers that need a different
/// order (rank-descending, case-folded) express it through the key type.
/// Equal keys are never stored twice: inserting a key that is already present
/// leaves the existing entry untouched.
pub(crate) struct RawAvlTree<K, V> {
    /// Arena storing all tree nodes. Its live count doubles as the tree length.
    nodes: Arena<AvlNode<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

/// One step of a root-to-node descent: the node visited and the child link
/// the descent continued through.
#[derive(Clone, Copy, Debug)]
struct PathElement {
    node: Handle,
    side: Side,
}

type Path = SmallVec<[PathElement; MAX_DEPTH]>;

impl<K, V> RawAvlTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates an empty tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of entries in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree contains no entries.
    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the height of the tree; an empty tree has height 0.
    pub(crate) fn height(&self) -> usize {
        usize::from(self.height_of(self.root))
    }

    /// Clears all entries from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns an in-order iterator over the entries.
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root, self.len())
    }

    /// Returns the smallest entry.
    pub(crate) fn first(&self) -> Option<(&K, &V)> {
        self.extreme(Side::Left)
    }

    /// Returns the largest entry.
    pub(crate) fn last(&self) -> Option<(&K, &V)> {
        self.extreme(Side::Right)
    }

    fn extreme(&self, side: Side) -> Option<(&K, &V)> {
        let mut current = self.root?;
        while let Some(next) = self.nodes.get(current).child(side) {
            current = next;
        }
        let node = self.nodes.get(current);
        Some((&node.key, &node.value))
    }

    /// Consumes the tree, returning its entries in order.
    pub(crate) fn into_vec(mut self) -> Vec<(K, V)> {
        let order: Vec<Handle> = {
            let mut stack: SmallVec<[Handle; MAX_DEPTH]> = SmallVec::new();
            let mut order = Vec::with_capacity(self.len());
            let mut current = self.root;
            loop {
                while let Some(handle) = current {
                    stack.push(handle);
                    current = self.nodes.get(handle).left;
                }
                let Some(handle) = stack.pop() else { break };
                order.push(handle);
                current = self.nodes.get(handle).right;
            }
            order
        };

        let entries = order
            .into_iter()
            .map(|handle| {
                let node = self.nodes.remove(handle);
                (node.key, node.value)
            })
            .collect();
        self.root = None;
        entries
    }

    /// Visits entries in order, descending into a node's left subtree only
    /// when `descend_left` accepts that node's key. Right subtrees are always
    /// visited.
    pub(crate) fn for_each_pruned<P, F>(&self, mut descend_left: P, mut visit: F)
    where
        P: FnMut(&K) -> bool,
        F: FnMut(&K, &V),
    {
        self.walk_pruned(self.root, &mut descend_left, &mut visit);
    }

    fn walk_pruned<P, F>(&self, link: Option<Handle>, descend_left: &mut P, visit: &mut F)
    where
        P: FnMut(&K) -> bool,
        F: FnMut(&K, &V),
    {
        let Some(handle) = link else { return };
        let node = self.nodes.get(handle);
        if descend_left(&node.key) {
            self.walk_pruned(node.left, descend_left, visit);
        }
        visit(&node.key, &node.value);
        self.walk_pruned(node.right, descend_left, visit);
    }

    #[inline]
    fn height_of(&self, link: Option<Handle>) -> u8 {
        link.map_or(0, |handle| self.nodes.get(handle).height)
    }

    /// Height of the left subtree minus height of the right subtree.
    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height_of(node.left)) - i16::from(self.height_of(node.right))
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes.get_mut(handle).height = height;
    }

    /// Lifts the right child of `x` above it. Returns the new subtree root.
    fn rotate_left(&mut self, x: Handle) -> Handle {
        let y = self.nodes.get(x).right.expect("`rotate_left()` - node has no right child");
        let inner = self.nodes.get(y).left;
        self.nodes.get_mut(x).right = inner;
        self.nodes.get_mut(y).left = Some(x);
        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Lifts the left child of `y` above it. Returns the new subtree root.
    fn rotate_right(&mut self, y: Handle) -> Handle {
        let x = self.nodes.get(y).left.expect("`rotate_right()` - node has no left child");
        let inner = self.nodes.get(x).right;
        self.nodes.get_mut(y).left = inner;
        self.nodes.get_mut(x).right = Some(y);
        self.update_height(y);
        self.update_height(x);
        x
    }

    /// Restores the AVL invariant at `handle`, whose subtrees are already
    /// balanced. Returns the root of the (possibly rotated) subtree.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        self.update_height(handle);
        let balance = self.balance_factor(handle);

        if balance > 1 {
            let left = self.nodes.get(handle).left.expect("left-heavy node has a left child");
            // Left-right case: straighten the zig-zag first.
            if self.balance_factor(left) < 0 {
                let left = self.rotate_left(left);
                self.nodes.get_mut(handle).left = Some(left);
            }
            return self.rotate_right(handle);
        }

        if balance < -1 {
            let right = self.nodes.get(handle).right.expect("right-heavy node has a right child");
            // Right-left case.
            if self.balance_factor(right) > 0 {
                let right = self.rotate_right(right);
                self.nodes.get_mut(handle).right = Some(right);
            }
            return self.rotate_left(handle);
        }

        handle
    }

    /// Hangs `child` below the last step of a path, or makes it the root.
    fn attach(&mut self, parent: Option<PathElement>, child: Option<Handle>) {
        match parent {
            Some(step) => self.nodes.get_mut(step.node).set_child(step.side, child),
            None => self.root = child,
        }
    }

    /// Walks back up a mutation path, rebalancing every ancestor and
    /// re-linking rotated subtrees into their parents.
    fn retrace(&mut self, path: &mut Path) {
        while let Some(step) = path.pop() {
            let subtree = self.rebalance(step.node);
            self.attach(path.last().copied(), Some(subtree));
        }
    }
}

impl<K: Ord, V> RawAvlTree<K, V> {
    /// Finds the node holding a key equal to `key`.
    fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key.borrow()) {
                Less => node.left,
                Greater => node.right,
                Equal => return Some(handle),
            };
        }
        None
    }

    /// Returns the entry whose key equals `key`.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.nodes.get(self.search(key)?);
        Some((&node.key, &node.value))
    }

    /// Returns the value stored under `key`.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns true if an entry with this key exists.
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Inserts an entry. Returns false, leaving the tree untouched, if an
    /// equal key is already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> bool {
        let mut path: Path = SmallVec::new();
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let side = match key.cmp(&node.key) {
                Less => Side::Left,
                Greater => Side::Right,
                Equal => return false,
            };
            path.push(PathElement { node: handle, side });
            current = node.child(side);
        }

        let leaf = self.nodes.insert(AvlNode::leaf(key, value));
        self.attach(path.last().copied(), Some(leaf));
        self.retrace(&mut path);
        true
    }

    /// Removes the entry whose key equals `key` and returns it.
    ///
    /// A node with two children takes over its in-order successor's entry,
    /// and the successor's node (which has no left child) is unlinked instead.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path: Path = SmallVec::new();
        let mut current = self.root;

        let target = loop {
            let handle = current?;
            let node = self.nodes.get(handle);
            let side = match key.cmp(node.key.borrow()) {
                Less => Side::Left,
                Greater => Side::Right,
                Equal => break handle,
            };
            path.push(PathElement { node: handle, side });
            current = node.child(side);
        };

        let (left, right) = {
            let node = self.nodes.get(target);
            (node.left, node.right)
        };

        let removed = if let (Some(_), Some(right)) = (left, right) {
            path.push(PathElement {
                node: target,
                side: Side::Right,
            });
            let mut successor = right;
            while let Some(next) = self.nodes.get(successor).left {
                path.push(PathElement {
                    node: successor,
                    side: Side::Left,
                });
                successor = next;
            }

            let successor = self.nodes.remove(successor);
            self.attach(path.last().copied(), successor.right);

            let target = self.nodes.get_mut(target);
            let key = mem::replace(&mut target.key, successor.key);
            let value = mem::replace(&mut target.value, successor.value);
            (key, value)
        } else {
            let node = self.nodes.remove(target);
            self.attach(path.last().copied(), left.or(right));
            (node.key, node.value)
        };

        self.retrace(&mut path);
        if self.root.is_none() {
            // Drop the free list along with the last node.
            self.nodes.clear();
        }
        Some(removed)
    }
}

impl<K, V> Default for RawAvlTree<K, V> {
    fn default() -> Self {
        RawAvlTree::new()
    }
}

impl<K: Clone, V: Clone> Clone for RawAvlTree<K, V> {
    fn clone(&self) -> Self {
        // Re-inserting in order into a fresh arena would rebalance needlessly;
        // copy the shape node by node instead.
        fn copy<K: Clone, V: Clone>(
            source: &Arena<AvlNode<K, V>>,
            target: &mut Arena<AvlNode<K, V>>,
            link: Option<Handle>,
        ) -> Option<Handle> {
            let node = source.get(link?);
            let left = copy(source, target, node.left);
            let right = copy(source, target, node.right);
            Some(target.insert(AvlNode {
                key: node.key.clone(),
                value: node.value.clone(),
                left,
                right,
                height: node.height,
            }))
        }

        let mut nodes = Arena::with_capacity(self.len());
        let root = copy(&self.nodes, &mut nodes, self.root);
        Self { nodes, root }
    }
}

/// In-order iterator over a [`RawAvlTree`].
pub(crate) struct Iter<'a, K, V> {
    nodes: &'a Arena<AvlNode<K, V>>,
    /// Ancestors whose entry has not been yielded yet.
    stack: SmallVec<[Handle; MAX_DEPTH]>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(nodes: &'a Arena<AvlNode<K, V>>, root: Option<Handle>, len: usize) -> Self {
        let mut iter = Self {
            nodes,
            stack: SmallVec::new(),
            remaining: len,
        };
        iter.descend_left(root);
        iter
    }

    fn descend_left(&mut self, mut link: Option<Handle>) {
        while let Some(handle) = link {
            self.stack.push(handle);
            link = self.nodes.get(handle).left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.stack.pop()?;
        let nodes = self.nodes;
        let node = nodes.get(handle);
        self.descend_left(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
