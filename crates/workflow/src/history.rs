//! Bounded undo snapshots

use stamp_core::Placement;
use std::collections::VecDeque;

/// Stack of placement list snapshots, oldest dropped first
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Vec<Placement>>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit,
        }
    }

    pub fn push(&mut self, snapshot: Vec<Placement>) {
        if self.limit == 0 {
            return;
        }
        if self.snapshots.len() == self.limit {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<Vec<Placement>> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Apply `f` to every recorded placement on a page, keeping snapshots
    /// in step with a re-rendered page
    pub fn for_each_on_page<F>(&mut self, page_number: u32, f: F)
    where
        F: FnMut(&mut Placement),
    {
        self.snapshots
            .iter_mut()
            .flatten()
            .filter(|p| p.page_number == page_number)
            .for_each(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stamp_core::{Rect, StampItem, StampKind};

    fn snapshot(count: usize) -> Vec<Placement> {
        let stamp = StampItem {
            kind: StampKind::Seal,
            id: 1,
            display_name: "seal".to_string(),
            image_ref: String::new(),
            native_size: None,
        };
        (0..count)
            .map(|_| Placement::new(stamp.clone(), 1, Rect::new(0.0, 0.0, 80.0, 80.0)))
            .collect()
    }

    #[test]
    fn test_drops_oldest_past_limit() {
        let mut history = History::new(2);
        history.push(snapshot(1));
        history.push(snapshot(2));
        history.push(snapshot(3));

        assert_eq!(history.len(), 2);
        assert_eq!(history.pop().map(|s| s.len()), Some(3));
        assert_eq!(history.pop().map(|s| s.len()), Some(2));
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_for_each_on_page_touches_every_snapshot() {
        let mut history = History::new(5);
        history.push(snapshot(1));
        history.push(snapshot(2));

        history.for_each_on_page(1, |p| p.x += 10.0);
        history.for_each_on_page(2, |p| p.x += 100.0);

        assert!(history.pop().unwrap().iter().all(|p| p.x == 10.0));
        assert!(history.pop().unwrap().iter().all(|p| p.x == 10.0));
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = History::new(0);
        history.push(snapshot(1));
        assert!(history.is_empty());
    }
}
