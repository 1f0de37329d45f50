/// Number of pages needed for `total` items, zero when there are none.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Apply pagination to a list of items.
/// Returns (page_items, page_index); an out-of-range page is clamped to the
/// last one.
pub fn apply_pagination<T>(items: Vec<T>, page: usize, page_size: usize) -> (Vec<T>, usize) {
    let pages = total_pages(items.len(), page_size);
    let page = page.min(pages.saturating_sub(1));

    let paginated = items
        .into_iter()
        .skip(page * page_size)
        .take(page_size)
        .collect();

    (paginated, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_pages() {
        let items: Vec<u32> = (0..30).collect();
        let (page, idx) = apply_pagination(items.clone(), 1, 12);
        assert_eq!(idx, 1);
        assert_eq!(page, (12..24).collect::<Vec<_>>());

        let (page, idx) = apply_pagination(items, 9, 12);
        assert_eq!(idx, 2);
        assert_eq!(page, (24..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty() {
        let (page, idx) = apply_pagination(Vec::<u32>::new(), 3, 12);
        assert!(page.is_empty());
        assert_eq!(idx, 0);
    }
}
