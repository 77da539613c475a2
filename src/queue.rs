//! FIFO buffer of posts awaiting delivery.

use std::collections::VecDeque;

use crate::rules::PostRecord;

#[derive(Debug, Default)]
pub struct PostQueue {
    inner: VecDeque<PostRecord>,
}

impl PostQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append in the given order; the whole batch lands contiguously.
    pub fn extend<I: IntoIterator<Item = PostRecord>>(&mut self, posts: I) -> usize {
        let before = self.inner.len();
        self.inner.extend(posts);
        self.inner.len() - before
    }

    /// Remove the oldest post.
    pub fn pop_oldest(&mut self) -> Option<PostRecord> {
        self.inner.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostRecord> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(n: u32) -> PostRecord {
        PostRecord {
            preview_url: format!("https://p/{n}"),
            full_url: format!("https://f/{n}"),
            caption: format!("P{n}"),
            origin_url: format!("https://o/{n}"),
        }
    }

    #[test]
    fn pops_in_insertion_order() {
        let mut q = PostQueue::new();
        assert_eq!(q.extend([post(1)]), 1);
        assert_eq!(q.extend([post(2), post(3)]), 2);
        assert_eq!(q.len(), 3);

        assert_eq!(q.pop_oldest().unwrap().caption, "P1");
        assert_eq!(q.pop_oldest().unwrap().caption, "P2");
        assert_eq!(q.pop_oldest().unwrap().caption, "P3");
        assert!(q.pop_oldest().is_none());
        assert!(q.is_empty());
    }
}
