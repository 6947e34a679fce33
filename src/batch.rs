use std::num::NonZeroUsize;

/// Most track URIs the remote accepts in one add-to-playlist call.
pub const PLAYLIST_ADD_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(100).unwrap();
/// Most track ids the remote accepts in one save-to-library call.
pub const LIBRARY_SAVE_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(50).unwrap();

/// Lazy iterator over consecutive groups of at most `size` items.
///
/// Single pass: items are pulled from the source as groups are requested.
#[derive(Debug)]
pub struct Chunks<I> {
    inner: I,
    size: NonZeroUsize,
}

impl<I: Iterator> Iterator for Chunks<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let group: Vec<_> = self.inner.by_ref().take(self.size.get()).collect();
        if group.is_empty() { None } else { Some(group) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (low, high) = self.inner.size_hint();
        let size = self.size.get();
        (low.div_ceil(size), high.map(|high| high.div_ceil(size)))
    }
}

/// Splits `items` into ordered groups of at most `size` elements.
pub fn chunk<T>(items: impl IntoIterator<Item = T>, size: NonZeroUsize) -> Chunks<impl Iterator<Item = T>> {
    Chunks {
        inner: items.into_iter(),
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunks: Vec<Vec<u32>> = chunk(Vec::new(), size(50)).collect();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_sizes_and_order() {
        let items: Vec<usize> = (0..120).collect();
        let chunks: Vec<_> = chunk(items.clone(), LIBRARY_SAVE_BATCH_SIZE).collect();

        let lengths: Vec<_> = chunks.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![50, 50, 20]);
        assert_eq!(chunks.concat(), items);
    }

    #[test]
    fn test_chunk_properties_hold_for_many_lengths() {
        for len in 0..=250 {
            for n in [1, 3, 50, 100, 101] {
                let items: Vec<usize> = (0..len).collect();
                let chunks: Vec<_> = chunk(items.clone(), size(n)).collect();

                assert_eq!(chunks.len(), len.div_ceil(n), "len={len} n={n}");
                assert_eq!(chunks.concat(), items, "len={len} n={n}");
                if let Some((_last, full)) = chunks.split_last() {
                    assert!(full.iter().all(|c| c.len() == n), "len={len} n={n}");
                }
            }
        }
    }

    #[test]
    fn test_chunks_are_lazy() {
        let mut pulled = 0;
        let source = (0..1000).inspect(|_| pulled += 1);
        let first = chunk(source, PLAYLIST_ADD_BATCH_SIZE).next().unwrap();

        assert_eq!(first.len(), 100);
        assert_eq!(pulled, 100);
    }

    #[test]
    fn test_size_hint() {
        let chunks = chunk(0..250, PLAYLIST_ADD_BATCH_SIZE);
        assert_eq!(chunks.size_hint(), (3, Some(3)));
    }
}
