//! Fixed-capacity, append-only event log.
//!
//! The tamper, protocol, and UART logs grow with every caller request.
//! [`BoundedLog`] keeps the newest `capacity` entries and silently evicts
//! the oldest once full.
//!
//! Protocol and UART logs hold request/reply pairs. Those are built with
//! [`BoundedLog::for_exchanges`] and written with
//! [`BoundedLog::push_exchange`], which keeps the log starting on a
//! request.

use std::collections::VecDeque;

/// Append-only ring buffer ordered oldest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Create an empty log retaining at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one so the newest entry is always
    /// observable.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Create an empty log of request/reply pairs.
    ///
    /// The capacity is rounded up to an even number, minimum two.
    pub fn for_exchanges(capacity: usize) -> Self {
        let even = capacity
            .max(2)
            .checked_next_multiple_of(2)
            .unwrap_or(usize::MAX & !1);
        Self::new(even)
    }

    /// Append an entry, evicting the oldest one when full.
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Append a request and its reply, evicting the oldest whole pair
    /// when full.
    pub fn push_exchange(&mut self, request: T, reply: T) {
        while !self.entries.is_empty() && self.entries.len().saturating_add(2) > self.capacity {
            self.entries.pop_front();
            self.entries.pop_front();
        }
        self.entries.push_back(request);
        self.entries.push_back(reply);
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries mutably, oldest-first.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> + ExactSizeIterator {
        self.entries.iter_mut()
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Copy the retained entries out, oldest-first.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_below_capacity_keeps_everything() {
        let mut log = BoundedLog::new(3);
        assert!(log.push(1).is_none());
        assert!(log.push(2).is_none());
        assert_eq!(log.to_vec(), vec![1, 2]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn push_at_capacity_evicts_oldest() {
        let mut log = BoundedLog::new(2);
        log.push("a");
        log.push("b");
        assert_eq!(log.push("c"), Some("a"));
        assert_eq!(log.to_vec(), vec!["b", "c"]);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut log = BoundedLog::new(0);
        log.push(1);
        log.push(2);
        assert_eq!(log.to_vec(), vec![2]);
    }

    #[test]
    fn odd_exchange_capacity_never_splits_a_pair() {
        let mut log = BoundedLog::for_exchanges(3);
        log.push_exchange("tx A", "rx A");
        log.push_exchange("tx B", "rx B");
        assert_eq!(log.to_vec(), vec!["tx A", "rx A", "tx B", "rx B"]);

        log.push_exchange("tx C", "rx C");
        assert_eq!(log.to_vec(), vec!["tx B", "rx B", "tx C", "rx C"]);
    }

    #[test]
    fn tiny_exchange_log_keeps_the_latest_pair() {
        for capacity in [0, 1, 2] {
            let mut log = BoundedLog::for_exchanges(capacity);
            log.push_exchange(1, 2);
            log.push_exchange(3, 4);
            assert_eq!(log.to_vec(), vec![3, 4]);
        }
    }

    #[test]
    fn exchange_into_odd_plain_log_drops_whole_leading_entries() {
        let mut log = BoundedLog::new(3);
        log.push_exchange('a', 'A');
        log.push_exchange('b', 'B');
        assert_eq!(log.to_vec(), vec!['b', 'B']);
    }
}
