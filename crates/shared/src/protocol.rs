use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of raw records as handed back by a gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    pub items: Vec<Value>,
    pub total_pages: u32,
}

/// One page of decoded entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }
}

pub fn total_pages_for(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Offset/limit pair for a 1-based page number.
pub fn page_window(page: u32, page_size: u32) -> (u64, u32) {
    let page = page.max(1);
    let offset = u64::from(page - 1) * u64::from(page_size);
    (offset, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages_for(0, 10), 0);
        assert_eq!(total_pages_for(10, 10), 1);
        assert_eq!(total_pages_for(11, 10), 2);
        assert_eq!(total_pages_for(5, 0), 0);
    }

    #[test]
    fn page_window_treats_zero_as_first_page() {
        assert_eq!(page_window(0, 10), (0, 10));
        assert_eq!(page_window(1, 10), (0, 10));
        assert_eq!(page_window(3, 25), (50, 25));
    }
}
