//! An ordered collection of unique values backed by a self-balancing
//! binary search tree.

use core::borrow::Borrow;
use core::fmt;

use alloc::string::String;

use crate::error::DuplicateKeyError;
use crate::raw::RawOrderedTree;

/// An ordered set of unique values based on an AVL tree.
///
/// Values are kept in sorted order as determined by the [`Ord`] trait, and
/// every value is stored at most once: inserting a value that compares equal
/// to a stored one is rejected with [`DuplicateKeyError`] and leaves the tree
/// unmodified. Insertion, lookup, and removal all take logarithmic time in
/// the number of stored values.
///
/// It is a logic error for a value to be modified in such a way that its
/// ordering relative to any other value, as determined by the [`Ord`] trait,
/// changes while it is in the tree. This is normally only possible through
/// [`Cell`], [`RefCell`], global state, I/O, or unsafe code. The behavior
/// resulting from such a logic error is not specified, but will be
/// encapsulated to the `OrderedTree` that observed the logic error and not
/// result in undefined behavior. This could include panics, incorrect
/// results, aborts, memory leaks, and non-termination.
///
/// [`Cell`]: core::cell::Cell
/// [`RefCell`]: core::cell::RefCell
///
/// # Examples
///
/// ```
/// use ordered_tree::OrderedTree;
///
/// // Type inference lets us omit an explicit type signature (which
/// // would be `OrderedTree<&str>` in this example).
/// let mut books = OrderedTree::new();
///
/// // Add some books.
/// books.insert("A Dance With Dragons").unwrap();
/// books.insert("To Kill a Mockingbird").unwrap();
/// books.insert("The Odyssey").unwrap();
/// books.insert("The Great Gatsby").unwrap();
///
/// // Check for a specific one.
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.",
///              books.len());
/// }
///
/// // Remove a book.
/// books.remove("The Odyssey");
///
/// // Snapshot everything in order.
/// let mut shelf = [""; 4];
/// let count = books.collect_ascending(&mut shelf);
/// assert_eq!(&shelf[..count], &["A Dance With Dragons", "The Great Gatsby", "To Kill a Mockingbird"]);
/// ```
///
/// An `OrderedTree` with a known list of values can be initialized from an
/// iterator (equal values after the first are skipped):
///
/// ```
/// use ordered_tree::OrderedTree;
///
/// let tree: OrderedTree<i32> = [1, 2, 3].into_iter().collect();
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Clone)]
pub struct OrderedTree<T> {
    raw: RawOrderedTree<T>,
}

impl<T> OrderedTree<T> {
    /// Makes a new, empty `OrderedTree`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1).unwrap();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawOrderedTree::new(),
        }
    }

    /// Returns the number of values in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1).unwrap();
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// Constant; the count is maintained, not recomputed.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert!(tree.is_empty());
    /// tree.insert(1).unwrap();
    /// assert!(!tree.is_empty());
    /// ```
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the tree: the number of nodes on the longest
    /// root-to-leaf path. The empty tree has height 0 and a single value
    /// has height 1.
    ///
    /// The balancing scheme keeps this within roughly `1.44 * log2(n + 2)`
    /// of the node count `n`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.height(), 0);
    /// for value in 0..7 {
    ///     tree.insert(value).unwrap();
    /// }
    /// assert_eq!(tree.height(), 3);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n); heights are recomputed on demand rather than cached.
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Clears the tree, removing all values.
    ///
    /// Clearing an already empty tree is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1).unwrap();
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

impl<T: Ord> OrderedTree<T> {
    /// Adds a value to the tree.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeyError`] if the tree already stores a value
    /// comparing equal to `value`; the tree is left unmodified.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert!(tree.insert(2).is_ok());
    /// assert!(tree.insert(2).is_err());
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) comparisons; rebalancing recomputes subtree heights along
    /// the descent path.
    pub fn insert(&mut self, value: T) -> Result<(), DuplicateKeyError> {
        self.raw.insert(value)
    }

    /// Returns a reference to the stored value comparing equal to `key`,
    /// if any.
    ///
    /// The key may be any borrowed form of the stored type, but the ordering
    /// on the borrowed form *must* match the ordering on the stored type.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<i32> = [1, 2, 3].into_iter().collect();
    /// assert_eq!(tree.get(&2), Some(&2));
    /// assert_eq!(tree.get(&4), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n).
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns `true` if the tree stores a value comparing equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<i32> = [1, 2, 3].into_iter().collect();
    /// assert!(tree.contains(&1));
    /// assert!(!tree.contains(&4));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n).
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key).is_some()
    }

    /// Removes the value comparing equal to `key` from the tree and returns
    /// it, or `None` if no such value is stored.
    ///
    /// # Panics
    ///
    /// Panics if the tree is empty. Removal from an empty tree is a caller
    /// contract violation rather than a not-found outcome; check
    /// [`is_empty`](Self::is_empty) first if emptiness is a reachable state.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree: OrderedTree<i32> = [1, 2, 3].into_iter().collect();
    /// assert_eq!(tree.remove(&2), Some(2));
    /// assert_eq!(tree.remove(&2), None);
    /// assert_eq!(tree.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) comparisons; rebalancing recomputes subtree heights along
    /// the descent path.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }
}

impl<T: Clone> OrderedTree<T> {
    /// Writes every stored value into `out` in ascending order and returns
    /// the number of values written. Buffer slots past the written count are
    /// left untouched, as is the whole buffer when the tree is empty.
    ///
    /// # Panics
    ///
    /// Panics if `out` has fewer than [`len`](Self::len) slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<i32> = [2, 3, 1].into_iter().collect();
    /// let mut out = [0; 8];
    /// let count = tree.collect_ascending(&mut out);
    /// assert_eq!(&out[..count], &[1, 2, 3]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n); a single in-order walk with an explicit stack.
    pub fn collect_ascending(&self, out: &mut [T]) -> usize {
        self.raw.collect_ascending(out)
    }

    /// Writes every stored value into `out` in descending order and returns
    /// the number of values written; otherwise identical to
    /// [`collect_ascending`](Self::collect_ascending).
    ///
    /// # Panics
    ///
    /// Panics if `out` has fewer than [`len`](Self::len) slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<i32> = [2, 3, 1].into_iter().collect();
    /// let mut out = [0; 8];
    /// let count = tree.collect_descending(&mut out);
    /// assert_eq!(&out[..count], &[3, 2, 1]);
    /// ```
    pub fn collect_descending(&self, out: &mut [T]) -> usize {
        self.raw.collect_descending(out)
    }
}

impl<T: fmt::Debug> OrderedTree<T> {
    /// Renders the tree's full structure as nested
    /// `{value: <V>, left: <L>, right: <R>}` records, where an absent child
    /// (or the empty tree) renders as `NIL`.
    ///
    /// This is a diagnostic form; [`collect_ascending`] is the way to read
    /// the values back out. The same text is produced by the [`Debug`] impl.
    ///
    /// [`collect_ascending`]: Self::collect_ascending
    /// [`Debug`]: core::fmt::Debug
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree: OrderedTree<i32> = [2, 1, 3].into_iter().collect();
    /// assert_eq!(
    ///     tree.to_debug_string(),
    ///     "{value: 2, left: {value: 1, left: NIL, right: NIL}, \
    ///      right: {value: 3, left: NIL, right: NIL}}"
    /// );
    /// ```
    #[must_use]
    pub fn to_debug_string(&self) -> String {
        alloc::format!("{self:?}")
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt_tree(f)
    }
}

impl<T> Default for OrderedTree<T> {
    /// Makes an empty `OrderedTree`.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for OrderedTree<T> {
    /// Builds a tree from an iterator, skipping values that compare equal
    /// to one already inserted.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for OrderedTree<T> {
    /// Inserts values from an iterator, skipping values that compare equal
    /// to one already stored.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            let _ = self.insert(value);
        }
    }
}
