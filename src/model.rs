//! The paginated image list: append-only descriptors plus the id counter
//! that generated URLs embed.

use crate::constants::{BATCH_SIZE, IMAGE_BASE_URL};

/// One image in the feed. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    pub url: String,
}

/// Half-open range `[start, start + count)` of rows appended by one batch.
/// Handed to the view so only the new rows get refreshed/highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedRange {
    pub start: usize,
    pub count: usize,
}

impl InsertedRange {
    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position < self.start + self.count
    }
}

/// Ordered, append-only sequence of descriptors. Existing entries are never
/// removed, reordered, or rewritten; the id counter strictly increases and
/// ids are never reused.
pub struct ImageList {
    items: Vec<ImageDescriptor>,
    next_id: u64,
}

impl ImageList {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ImageDescriptor> {
        self.items.get(position)
    }

    /// Append one batch of freshly generated descriptors and return the
    /// inserted range. Pure in-memory growth, no failure cases, no cap.
    pub fn generate_batch(&mut self, batch_size: usize) -> InsertedRange {
        let start = self.items.len();
        for _ in 0..batch_size {
            self.items.push(ImageDescriptor {
                url: format!("{}/id/{}/600/300", IMAGE_BASE_URL, self.next_id),
            });
            self.next_id += 1;
        }
        InsertedRange {
            start,
            count: batch_size,
        }
    }

    /// Convenience for the default batch size.
    pub fn load_more(&mut self) -> InsertedRange {
        self.generate_batch(BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_appends_exactly_batch_size() {
        let mut list = ImageList::new();
        let range = list.generate_batch(BATCH_SIZE);
        assert_eq!(list.len(), 20);
        assert_eq!(range, InsertedRange { start: 0, count: 20 });
    }

    #[test]
    fn urls_embed_strictly_increasing_ids() {
        let mut list = ImageList::new();
        list.generate_batch(BATCH_SIZE);
        list.generate_batch(BATCH_SIZE);
        for (i, expected_id) in (0..list.len()).zip(0u64..) {
            assert_eq!(
                list.get(i).unwrap().url,
                format!("https://picsum.photos/id/{}/600/300", expected_id)
            );
        }
    }

    #[test]
    fn second_batch_range_covers_twenty_to_forty() {
        let mut list = ImageList::new();
        list.load_more();
        let second = list.load_more();
        assert_eq!(list.len(), 40);
        assert_eq!(second, InsertedRange { start: 20, count: 20 });
        assert!(second.contains(20));
        assert!(second.contains(39));
        assert!(!second.contains(19));
        assert!(!second.contains(40));
    }

    #[test]
    fn existing_entries_unchanged_by_append() {
        let mut list = ImageList::new();
        list.generate_batch(3);
        let before: Vec<String> = (0..3).map(|i| list.get(i).unwrap().url.clone()).collect();
        list.generate_batch(3);
        let after: Vec<String> = (0..3).map(|i| list.get(i).unwrap().url.clone()).collect();
        assert_eq!(before, after);
    }
}
