//! Contiguous index partitioning shared by the generator and the reducer.

use std::ops::Range;

/// Splits `0..total_items` into `num_chunks` contiguous ranges whose sizes
/// differ by at most one. The first `total_items % num_chunks` ranges get the
/// extra item. Empty ranges are never produced, so fewer than `num_chunks`
/// ranges come out when `total_items < num_chunks`.
pub struct ChunkSplitter {
    total_items: usize,
    current_position: usize,
    current_chunk_index: usize,
    base_chunk_size: usize,
    extra_items: usize,
}

impl ChunkSplitter {
    /// Creates a splitter for `total_items` items over `num_chunks` workers.
    /// A `num_chunks` of zero is treated as one.
    pub fn new(total_items: usize, num_chunks: usize) -> Self {
        let num_chunks = num_chunks.max(1);
        ChunkSplitter {
            total_items,
            current_position: 0,
            current_chunk_index: 0,
            base_chunk_size: total_items / num_chunks,
            extra_items: total_items % num_chunks,
        }
    }
}

impl Iterator for ChunkSplitter {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.current_position;
        if start == self.total_items {
            return None;
        }

        let end = start
            + self.base_chunk_size
            + (self.current_chunk_index < self.extra_items) as usize;

        self.current_chunk_index += 1;
        self.current_position = end;

        Some(start..end)
    }
}

/// Collects the ranges of a [`ChunkSplitter`].
pub fn partition_ranges(total_items: usize, num_chunks: usize) -> Vec<Range<usize>> {
    ChunkSplitter::new(total_items, num_chunks).collect()
}
