// crates/cep-core/src/model/page.rs
use crate::error::{CepError, Result};
use serde::{Deserialize, Serialize};

/// A validated 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    /// `page >= 1`, `1 <= page_size <= max_page_size`.
    pub fn new(page: usize, page_size: usize, max_page_size: usize) -> Result<Self> {
        if page == 0 {
            return Err(CepError::Format("page must be >= 1".into()));
        }
        if page_size == 0 || page_size > max_page_size {
            return Err(CepError::Format(format!(
                "page size must be between 1 and {max_page_size}, got {page_size}"
            )));
        }
        Ok(PageRequest { page, page_size })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Slices an already filtered and ordered result set.
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(self.skip())
            .take(self.page_size)
            .collect();
        Page {
            items,
            total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// One page of a filtered result set. `total` counts the whole set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
