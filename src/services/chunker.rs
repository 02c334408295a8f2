//! Fixed-size windowing for token sequences and output batches.

use crate::error::ChunkError;
use crate::models::TokenWindow;

/// Iterator adapter yielding groups of up to `size` items.
///
/// `Batched::new("ABCDEFG".chars(), 3)` yields `ABC`, `DEF`, `G`.
#[derive(Debug, Clone)]
pub struct Batched<I> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Batched<I> {
    fn new(inner: I, size: usize) -> Self {
        Self { inner, size }
    }
}

impl<I: Iterator> Iterator for Batched<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<_> = self.inner.by_ref().take(self.size).collect();
        if batch.is_empty() { None } else { Some(batch) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.inner.size_hint();
        (
            lower.div_ceil(self.size),
            upper.map(|u| u.div_ceil(self.size)),
        )
    }
}

/// Group items into consecutive vectors of `size`; the last may be shorter.
pub fn group<T, I>(items: I, size: usize) -> Result<Batched<I::IntoIter>, ChunkError>
where
    I: IntoIterator<Item = T>,
{
    if size < 1 {
        return Err(ChunkError::InvalidSize(size));
    }
    Ok(Batched::new(items.into_iter(), size))
}

/// Split a token sequence into windows of at most `max_window` tokens.
///
/// Windows are produced lazily and borrow nothing from the caller once
/// yielded.
pub fn chunk_tokens(
    tokens: &[u32],
    max_window: usize,
) -> Result<impl Iterator<Item = TokenWindow> + '_, ChunkError> {
    if max_window < 1 {
        return Err(ChunkError::InvalidSize(max_window));
    }
    Ok(tokens.chunks(max_window).map(<[u32]>::to_vec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_letters() {
        let groups: Vec<String> = group("ABCDEFG".chars(), 3)
            .unwrap()
            .map(|g| g.into_iter().collect())
            .collect();
        assert_eq!(groups, vec!["ABC", "DEF", "G"]);
    }

    #[test]
    fn test_group_rejects_zero() {
        assert!(matches!(
            group(vec![1, 2, 3], 0),
            Err(ChunkError::InvalidSize(0))
        ));
    }

    #[test]
    fn test_group_empty_input() {
        assert_eq!(group(Vec::<u8>::new(), 4).unwrap().count(), 0);
    }

    #[test]
    fn test_chunk_rejects_zero() {
        assert!(chunk_tokens(&[1, 2, 3], 0).is_err());
    }

    #[test]
    fn test_chunk_concatenation_reproduces_input() {
        let tokens: Vec<u32> = (0..1000).collect();
        for n in [1, 2, 3, 7, 64, 999, 1000, 1001, 5000] {
            let windows: Vec<_> = chunk_tokens(&tokens, n).unwrap().collect();
            let rejoined: Vec<u32> = windows.iter().flatten().copied().collect();
            assert_eq!(rejoined, tokens, "window size {n}");

            let (last, rest) = windows.split_last().unwrap();
            assert!(rest.iter().all(|w| w.len() == n), "window size {n}");
            assert!(!last.is_empty() && last.len() <= n, "window size {n}");
        }
    }

    #[test]
    fn test_chunk_window_count() {
        let tokens: Vec<u32> = vec![0; 8191 * 2 + 5];
        let windows: Vec<_> = chunk_tokens(&tokens, 8191).unwrap().collect();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2].len(), 5);
    }

    #[test]
    fn test_chunk_empty_tokens() {
        assert_eq!(chunk_tokens(&[], 8191).unwrap().count(), 0);
    }

    #[test]
    fn test_size_hint() {
        let batched = group(0..10, 3).unwrap();
        assert_eq!(batched.size_hint(), (4, Some(4)));
    }
}
