//! Shared append-only posting buffer.

use std::sync::{Arc, Mutex, PoisonError};

use crate::source::Posting;

/// Cloneable handle to a buffer the poll worker appends new postings to.
///
/// The listener only ever appends. The owner drains the buffer on its own
/// schedule; clones share the same underlying buffer.
#[derive(Debug, Clone, Default)]
pub struct PostingSink {
    inner: Arc<Mutex<Vec<Posting>>>,
}

impl PostingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends postings in order.
    pub fn append(&self, postings: &[Posting]) {
        if postings.is_empty() {
            return;
        }
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(postings);
    }

    /// Removes and returns every buffered posting.
    #[must_use]
    pub fn drain(&self) -> Vec<Posting> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the number of buffered postings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_drain_preserves_order() {
        let sink = PostingSink::new();
        sink.append(&[Posting::new("1"), Posting::new("2")]);
        sink.append(&[Posting::new("3")]);

        let drained: Vec<String> = sink.drain().into_iter().map(|p| p.id).collect();

        assert_eq!(drained, vec!["1", "2", "3"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn clones_share_the_buffer() {
        let owner = PostingSink::new();
        let worker = owner.clone();

        worker.append(&[Posting::new("1")]);

        assert_eq!(owner.len(), 1);
    }
}
