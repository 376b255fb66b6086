//! Splitting an ordered result sequence into fixed-size pages.

/// Returns consecutive pages of at most `page_size` items; the last page may
/// be shorter. A zero page size yields no pages.
pub fn paginate<T>(items: &[T], page_size: usize) -> Vec<&[T]> {
    if page_size == 0 {
        return Vec::new();
    }
    items.chunks(page_size).collect()
}
