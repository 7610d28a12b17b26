//! Eager draining of paged streams.

use futures_core::Stream;
use futures_util::TryStreamExt;
use futures_util::stream::TryCollect;
use std::collections::HashSet;
use std::hash::Hash;

/// Materialization helpers for any stream of `Result` items.
///
/// Draining issues every page fetch the sequence still needs and stops at the
/// first error.
pub trait PagedStreamExt<T, E>: Stream<Item = Result<T, E>> + Sized {
    /// Drain the stream into a deduplicated, unordered set.
    fn concat_to_set(self) -> TryCollect<Self, HashSet<T>>
    where
        T: Eq + Hash,
    {
        self.try_collect()
    }

    /// Drain the stream into a vector, keeping fetch order and duplicates.
    fn concat_to_vec(self) -> TryCollect<Self, Vec<T>> {
        self.try_collect()
    }
}

impl<S, T, E> PagedStreamExt<T, E> for S where S: Stream<Item = Result<T, E>> {}
