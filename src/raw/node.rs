use super::handle::Handle;

/// One stored value plus its structural links.
///
/// `left` and `right` are the owning direction; `parent` is a non-owning
/// back-reference used only to relink during rotation and removal. The
/// arena owns the storage either way, so a stale `parent` can never cause
/// a double free - but the tree keeps it consistent with the owning
/// direction at every operation boundary regardless.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) parent: Option<Handle>,
}

impl<T> Node<T> {
    /// Creates a detached node with the given parent back-reference.
    pub(crate) const fn new(value: T, parent: Option<Handle>) -> Self {
        Self {
            value,
            left: None,
            right: None,
            parent,
        }
    }

    /// Returns true iff both children are absent.
    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
