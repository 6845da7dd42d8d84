use core::fmt;

/// The error returned by [`OrderedTree::insert`](crate::OrderedTree::insert)
/// when the inserted value compares equal to an entry already in the tree.
///
/// Duplicates are rejected, not merged: the tree is left unmodified, so
/// callers running idempotent-insert workflows can treat this as an
/// expected, recoverable outcome.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DuplicateKeyError;

impl fmt::Display for DuplicateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value compares equal to an entry already in the tree")
    }
}

impl core::error::Error for DuplicateKeyError {}
