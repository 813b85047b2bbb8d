pub const PAGE_SIZE: usize = 10;

pub fn total_pages(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// 1-indexed page cursor over a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl Paginator {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.page < total_pages(total)
    }

    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn next(&mut self, total: usize) -> bool {
        if !self.has_next(total) {
            return false;
        }
        self.page += 1;
        true
    }

    /// Jumps to `page` when it lies inside `[1, total_pages]`; otherwise
    /// leaves the cursor where it is.
    pub fn go_to(&mut self, page: usize, total: usize) -> bool {
        if page < 1 || page > total_pages(total) {
            return false;
        }
        self.page = page;
        true
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1) * PAGE_SIZE;
        if start >= items.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(items.len());
        &items[start..end]
    }
}
