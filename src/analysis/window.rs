// Window module - contiguous partitions of a sample buffer
//
// Two partition policies are used by the feature layouts:
// - split_into: balanced split that covers every sample
// - windows_of: equal windows of floor(len / count); the remainder is dropped

use std::iter::FusedIterator;

use super::signal::root_mean_square;
use crate::error::AnalysisError;

/// Half-open sample range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start..self.end]
    }
}

/// Split into exactly `n` contiguous chunks whose sizes differ by at most one
///
/// The first `len % n` chunks get the extra sample. Chunks may be empty when
/// `n` exceeds the length.
pub fn split_into<T>(items: &[T], n: usize) -> Result<Vec<&[T]>, AnalysisError> {
    if n == 0 {
        return Err(AnalysisError::InvalidArgument {
            name: "section_count",
            value: n,
        });
    }

    let base = items.len() / n;
    let extra = items.len() % n;
    let mut chunks = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let size = base + usize::from(i < extra);
        chunks.push(&items[start..start + size]);
        start += size;
    }

    Ok(chunks)
}

/// Lazily apply `f` to `count` equal windows of `floor(len / count)` items
///
/// Single pass: once exhausted the iterator stays exhausted.
pub fn windows_of<'a, T, R, F>(
    items: &'a [T],
    count: usize,
    f: F,
) -> Result<WindowsOf<'a, T, F>, AnalysisError>
where
    F: FnMut(&'a [T]) -> R,
{
    if count == 0 {
        return Err(AnalysisError::InvalidArgument {
            name: "window_count",
            value: count,
        });
    }

    Ok(WindowsOf {
        items,
        window_size: items.len() / count,
        count,
        next: 0,
        f,
    })
}

/// Iterator returned by [`windows_of`]
pub struct WindowsOf<'a, T, F> {
    items: &'a [T],
    window_size: usize,
    count: usize,
    next: usize,
    f: F,
}

impl<'a, T, R, F> Iterator for WindowsOf<'a, T, F>
where
    F: FnMut(&'a [T]) -> R,
{
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if self.next >= self.count {
            return None;
        }

        let start = self.next * self.window_size;
        let end = (start + self.window_size).min(self.items.len());
        self.next += 1;
        Some((self.f)(&self.items[start..end]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a, T, R, F> ExactSizeIterator for WindowsOf<'a, T, F> where F: FnMut(&'a [T]) -> R {}

impl<'a, T, R, F> FusedIterator for WindowsOf<'a, T, F> where F: FnMut(&'a [T]) -> R {}

/// Fixed-size window centered on `center`, clamped to `[0, len)`
///
/// A window clipped by the end of the buffer is shifted back rather than
/// shrunk; it only ends up shorter than `size` when `len < size`.
pub fn window_around(len: usize, center: usize, size: usize) -> Window {
    let mut start = center.saturating_sub(size / 2).min(len);
    let end = (start + size).min(len);
    if end - start < size {
        start = end.saturating_sub(size);
    }
    Window { start, end }
}

/// RMS loudness of the window of `size` samples around `position`
pub fn loudness_at(samples: &[f32], position: usize, size: usize) -> Result<f32, AnalysisError> {
    let window = window_around(samples.len(), position, size);
    root_mean_square(window.apply(samples))
}

/// RMS loudness of each of `count` equal windows
pub fn loudness_vector(
    samples: &[f32],
    count: usize,
) -> Result<impl Iterator<Item = Result<f32, AnalysisError>> + '_, AnalysisError> {
    windows_of(samples, count, root_mean_square)
}
