//! Intra-system parallelism.
//!
//! A system can split a packed array into contiguous chunks
//! and process them on the worker pool that runs the system itself.
//! The number of chunks equals the worker count (at least 1),
//! and every call joins all chunks before returning.

use std::ops::Range;

use rayon::prelude::*;

use crate::util::chunk_len;

/// Splits work into chunks across the worker pool.
#[derive(Clone, Copy)]
pub struct Subdivider<'t> {
    pool:   Option<&'t rayon::ThreadPool>,
    chunks: usize,
}

impl<'t> Subdivider<'t> {
    pub(crate) fn new(pool: Option<&'t rayon::ThreadPool>, concurrency: usize) -> Self {
        Self { pool, chunks: concurrency.max(1) }
    }

    /// The number of chunks each call splits into.
    pub fn chunks(&self) -> usize { self.chunks }

    /// Calls `f` with each chunk of `slice` and the index of its first element.
    pub fn for_each_chunk_mut<T: Send>(
        &self,
        slice: &mut [T],
        f: impl Fn(usize, &mut [T]) + Send + Sync,
    ) {
        let len = chunk_len(slice.len(), self.chunks);
        match self.pool {
            Some(pool) => pool.install(|| {
                slice.par_chunks_mut(len).enumerate().for_each(|(i, chunk)| f(i * len, chunk))
            }),
            None => slice.chunks_mut(len).enumerate().for_each(|(i, chunk)| f(i * len, chunk)),
        }
    }

    /// Calls `f` with each chunk of `slice` and the index of its first element.
    pub fn for_each_chunk<T: Sync>(&self, slice: &[T], f: impl Fn(usize, &[T]) + Send + Sync) {
        let len = chunk_len(slice.len(), self.chunks);
        match self.pool {
            Some(pool) => pool.install(|| {
                slice.par_chunks(len).enumerate().for_each(|(i, chunk)| f(i * len, chunk))
            }),
            None => slice.chunks(len).enumerate().for_each(|(i, chunk)| f(i * len, chunk)),
        }
    }

    /// Calls `f` with each chunk of the index range `0..len`.
    pub fn for_each_range(&self, len: usize, f: impl Fn(Range<usize>) + Send + Sync) {
        let step = chunk_len(len, self.chunks);
        let ranges = (0..len).step_by(step).map(|start| start..(start + step).min(len));
        match self.pool {
            Some(pool) => {
                let ranges: Vec<_> = ranges.collect();
                pool.install(|| ranges.into_par_iter().for_each(&f))
            }
            None => ranges.for_each(f),
        }
    }

    /// Maps each chunk of `slice` with `f` and collects the results in chunk order.
    pub fn map_chunks<T: Sync, R: Send>(
        &self,
        slice: &[T],
        f: impl Fn(usize, &[T]) -> R + Send + Sync,
    ) -> Vec<R> {
        let len = chunk_len(slice.len(), self.chunks);
        match self.pool {
            Some(pool) => pool.install(|| {
                slice.par_chunks(len).enumerate().map(|(i, chunk)| f(i * len, chunk)).collect()
            }),
            None => slice.chunks(len).enumerate().map(|(i, chunk)| f(i * len, chunk)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn pool(n: usize) -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(n).build().expect("Failed to create thread pool")
    }

    #[test]
    fn test_chunk_mut_increment() {
        for concurrency in 0..5 {
            let pool = (concurrency > 0).then(|| pool(concurrency));
            let subdivider = Subdivider::new(pool.as_ref(), concurrency);

            let mut values = vec![0, 1, 2, 3];
            subdivider.for_each_chunk_mut(&mut values, |_, chunk| {
                for value in chunk {
                    *value += 1;
                }
            });
            assert_eq!(values, vec![1, 2, 3, 4], "concurrency = {concurrency}");
        }
    }

    #[test]
    fn test_chunk_offsets() {
        let pool = pool(3);
        let subdivider = Subdivider::new(Some(&pool), 3);
        let mut values = vec![0usize; 10];
        subdivider.for_each_chunk_mut(&mut values, |offset, chunk| {
            for (i, value) in chunk.iter_mut().enumerate() {
                *value = offset + i;
            }
        });
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_chunk_count() {
        let pool = pool(4);
        let subdivider = Subdivider::new(Some(&pool), 4);
        let calls = AtomicUsize::new(0);
        subdivider.for_each_chunk(&[0u8; 100], |_, chunk| {
            assert_eq!(chunk.len(), 25);
            calls.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.into_inner(), 4);
    }

    #[test]
    fn test_ranges_cover() {
        let subdivider = Subdivider::new(None, 3);
        let covered = AtomicUsize::new(0);
        subdivider.for_each_range(7, |range| {
            covered.fetch_add(range.len(), Ordering::SeqCst);
        });
        assert_eq!(covered.into_inner(), 7);
    }

    #[test]
    fn test_map_chunks_ordered() {
        let pool = pool(2);
        let subdivider = Subdivider::new(Some(&pool), 2);
        let sums = subdivider.map_chunks(&[1, 2, 3, 4, 5], |_, chunk| chunk.iter().sum::<i32>());
        assert_eq!(sums, vec![6, 9]);
    }

    #[test]
    fn test_empty_slice() {
        let subdivider = Subdivider::new(None, 4);
        let mut empty: Vec<i32> = Vec::new();
        subdivider.for_each_chunk_mut(&mut empty, |_, _| panic!("no chunk expected"));
    }
}
