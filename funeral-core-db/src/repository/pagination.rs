/// Offset window into an ordered version history.
///
/// ```
/// use funeral_core_db::repository::pagination::PageRequest;
///
/// let third = PageRequest::for_page(20, 3);
/// assert_eq!(third.offset, 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

pub const DEFAULT_PAGE_SIZE: usize = 20;

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// `page_number` is 1-based; 0 is read as the first page.
    pub fn for_page(page_size: usize, page_number: usize) -> Self {
        Self::new(page_size, page_number.saturating_sub(1) * page_size)
    }

    /// Cuts one page out of a fully loaded, already ordered list.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let window = items.into_iter().skip(self.offset).take(self.limit).collect();
        Page::new(window, total, self.limit, self.offset)
    }

    /// Limit and offset as SQL bind values.
    pub fn as_sql(&self) -> (i64, i64) {
        (
            i64::try_from(self.limit).unwrap_or(i64::MAX),
            i64::try_from(self.offset).unwrap_or(i64::MAX),
        )
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole history, not of this page
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }

    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            1
        } else {
            self.total.div_ceil(self.limit)
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
