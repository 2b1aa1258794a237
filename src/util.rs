//! Miscellaneous utilities.

use std::any::{self, TypeId};
use std::cmp;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A [`TypeId`] that also carries the type name for debugging.
///
/// Equality, hashing and ordering only consider the [`TypeId`].
#[derive(Clone, Copy)]
pub struct DbgTypeId {
    /// The underlying [`TypeId`].
    pub id:   TypeId,
    /// The [`any::type_name`] of the type.
    pub name: &'static str,
}

impl DbgTypeId {
    /// Creates a [`DbgTypeId`] of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: any::type_name::<T>() }
    }
}

impl fmt::Debug for DbgTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name) }
}

impl fmt::Display for DbgTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name) }
}

impl PartialEq for DbgTypeId {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for DbgTypeId {}

impl PartialOrd for DbgTypeId {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { Some(self.cmp(other)) }
}

impl Ord for DbgTypeId {
    fn cmp(&self, other: &Self) -> cmp::Ordering { self.id.cmp(&other.id) }
}

impl Hash for DbgTypeId {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state) }
}

/// Splits `len` items into at most `chunks` contiguous ranges of near-equal size.
///
/// Returns the length of each chunk (the last chunk may be shorter).
/// Always returns at least 1 so that it can be passed to `chunks_mut`.
pub(crate) fn chunk_len(len: usize, chunks: usize) -> usize {
    let chunks = chunks.max(1);
    ((len + chunks - 1) / chunks).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dbg_type_id_eq_ignores_name() {
        let a = DbgTypeId::of::<u32>();
        let b = DbgTypeId { id: TypeId::of::<u32>(), name: "renamed" };
        assert_eq!(a, b);
        assert_ne!(a, DbgTypeId::of::<i32>());
        assert_eq!(a.to_string(), "u32");
    }

    #[test]
    fn test_chunk_len() {
        assert_eq!(chunk_len(0, 4), 1);
        assert_eq!(chunk_len(10, 0), 10);
        assert_eq!(chunk_len(10, 3), 4);
        assert_eq!(chunk_len(12, 4), 3);
        assert_eq!(chunk_len(3, 8), 1);
    }
}
