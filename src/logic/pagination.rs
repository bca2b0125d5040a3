use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Sanitized page request. Out-of-range input never errors: a page below 1
/// becomes 1 and a limit outside `1..=100` becomes the default of 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if (1..=MAX_LIMIT as i64).contains(&l) => l as u32,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Lenient query-string parsing; anything non-numeric is treated as absent.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(parse(page), parse(limit))
    }
}

/// A slice of a larger result set with navigation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Cut one page out of the full, already ordered result set.
pub fn paginate<T>(all: Vec<T>, request: PageRequest) -> Page<T> {
    let total = all.len();
    let limit = request.limit as usize;
    let total_pages = total.div_ceil(limit);

    let start = (request.page as usize - 1).saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);

    let items = all.into_iter().skip(start).take(end - start).collect();

    Page {
        items,
        current_page: request.page,
        per_page: request.limit,
        total,
        total_pages,
        has_next: (request.page as usize) < total_pages,
        has_prev: request.page > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<u32> {
        (0..25).collect()
    }

    #[test]
    fn test_first_page() {
        let page = paginate(records(), PageRequest::new(Some(1), Some(10)));
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_prev);
        assert!(page.has_next);
    }

    #[test]
    fn test_last_partial_page() {
        let page = paginate(records(), PageRequest::new(Some(3), Some(10)));
        assert_eq!(page.items, (20..25).collect::<Vec<_>>());
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = paginate(records(), PageRequest::new(Some(9), Some(10)));
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 9);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_out_of_range_input_clamps_to_defaults() {
        assert_eq!(PageRequest::new(Some(0), None).page, 1);
        assert_eq!(PageRequest::new(Some(-4), None).page, 1);
        assert_eq!(PageRequest::new(None, Some(500)).limit, 10);
        assert_eq!(PageRequest::new(None, Some(0)).limit, 10);
        assert_eq!(PageRequest::new(None, Some(100)).limit, 100);
    }

    #[test]
    fn test_from_query_ignores_garbage() {
        assert_eq!(PageRequest::from_query(Some("abc"), Some("1e3")), PageRequest::default());
        assert_eq!(
            PageRequest::from_query(Some(" 2 "), Some("25")),
            PageRequest { page: 2, limit: 25 }
        );
    }

    #[test]
    fn test_empty_set() {
        let page = paginate(Vec::<u32>::new(), PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = paginate(records(), PageRequest::new(Some(i64::MAX), Some(100)));
        assert!(page.items.is_empty());
    }
}
