//! Block-number windows for paginated ledger reads.

use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` range of block numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockWindow {
    pub start: u64,
    pub end: u64,
    /// Newest first.
    pub reverse: bool,
}

impl BlockWindow {
    pub fn block_count(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Block numbers in read order.
    pub fn numbers(&self) -> Box<dyn Iterator<Item = u64>> {
        if self.reverse {
            Box::new((self.start..=self.end).rev())
        } else {
            Box::new(self.start..=self.end)
        }
    }
}

/// Window for a page of `limit` blocks after skipping `offset`, counted
/// from genesis or, when `reverse`, from the newest block.
///
/// `None` when the page is empty: `limit == 0` or `offset >= height`.
pub fn block_window(height: u64, limit: u64, offset: u64, reverse: bool) -> Option<BlockWindow> {
    if limit == 0 || offset >= height {
        return None;
    }
    let (start, end) = if reverse {
        let end = height - 1 - offset;
        (end.saturating_sub(limit - 1), end)
    } else {
        let end = offset.saturating_add(limit - 1).min(height - 1);
        (offset, end)
    };
    Some(BlockWindow {
        start,
        end,
        reverse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reverse_first_page_of_31() {
        let w = block_window(31, 10, 0, true).unwrap();
        assert_eq!((w.start, w.end), (21, 30));
        assert_eq!(w.numbers().collect::<Vec<_>>(), (21..=30).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_reverse_clamps_at_genesis() {
        let w = block_window(31, 10, 25, true).unwrap();
        assert_eq!((w.start, w.end), (0, 5));
        assert_eq!(w.block_count(), 6);
    }

    #[test]
    fn test_forward_pages() {
        let w = block_window(31, 10, 0, false).unwrap();
        assert_eq!((w.start, w.end), (0, 9));
        let w = block_window(31, 10, 30, false).unwrap();
        assert_eq!((w.start, w.end), (30, 30));
    }

    #[test]
    fn test_empty_pages() {
        assert_eq!(block_window(31, 0, 0, true), None);
        assert_eq!(block_window(31, 10, 31, true), None);
        assert_eq!(block_window(0, 10, 0, false), None);
    }

    proptest! {
        #[test]
        fn prop_window_within_chain(
            height in 0u64..200,
            limit in 0u64..50,
            offset in 0u64..250,
            reverse: bool,
        ) {
            match block_window(height, limit, offset, reverse) {
                None => prop_assert!(limit == 0 || offset >= height),
                Some(w) => {
                    prop_assert!(w.start <= w.end);
                    prop_assert!(w.end < height);
                    prop_assert!(w.block_count() <= limit);
                    let numbers: Vec<u64> = w.numbers().collect();
                    prop_assert_eq!(numbers.len() as u64, w.block_count());
                }
            }
        }
    }
}
