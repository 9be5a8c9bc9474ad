//! Bounded min-heap keeping the K highest-valued records.
//!
//! The heap root is always the weakest candidate, so deciding whether a new
//! record gets in is a single comparison against it.
//!
//! Ties: candidates are ordered by `(value, arrival)`. A record equal to the
//! current minimum is rejected, and when a minimum is evicted the earliest
//! arrival among equal values leaves first. The outcome is deterministic for
//! a given input.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::num::NonZeroUsize;

use crate::record::Record;

/// Upper bound on the up-front allocation; larger K grows on demand
const MAX_PREALLOCATED: usize = 4096;

#[derive(Debug)]
struct Candidate {
    value: i64,
    arrival: u64,
    id: String,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then(self.arrival.cmp(&other.arrival))
    }
}

impl From<Candidate> for Record {
    fn from(candidate: Candidate) -> Self {
        Record::new(candidate.id, candidate.value)
    }
}

/// What happened to a record offered to the selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    /// Set was not full yet
    Admitted,
    /// Set was full; the returned record was evicted to make room
    Replaced(Record),
    /// Value did not beat the current minimum
    Rejected,
}

/// Candidate set with capacity K
#[derive(Debug)]
pub struct TopKSelector {
    heap: BinaryHeap<Reverse<Candidate>>,
    capacity: NonZeroUsize,
    arrivals: u64,
}

impl TopKSelector {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.get().min(MAX_PREALLOCATED)),
            capacity,
            arrivals: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity.get()
    }

    /// Smallest value currently held
    pub fn min_value(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse(c)| c.value)
    }

    /// Value a new record must strictly exceed to get in; `None` while not full
    pub fn threshold(&self) -> Option<i64> {
        if self.is_full() {
            self.min_value()
        } else {
            None
        }
    }

    pub fn offer(&mut self, record: Record) -> Offer {
        if !self.is_full() {
            self.push(record);
            return Offer::Admitted;
        }

        match self.heap.peek_mut() {
            Some(mut root) if record.value > root.0.value => {
                let arrival = self.arrivals;
                self.arrivals += 1;
                let evicted = std::mem::replace(
                    &mut root.0,
                    Candidate {
                        value: record.value,
                        arrival,
                        id: record.id,
                    },
                );
                // PeekMut restores the heap order when `root` drops
                Offer::Replaced(evicted.into())
            }
            _ => Offer::Rejected,
        }
    }

    fn push(&mut self, record: Record) {
        let arrival = self.arrivals;
        self.arrivals += 1;
        self.heap.push(Reverse(Candidate {
            value: record.value,
            arrival,
            id: record.id,
        }));
    }

    /// Surviving records in no particular order
    pub fn into_records(self) -> Vec<Record> {
        self.heap
            .into_vec()
            .into_iter()
            .map(|Reverse(c)| c.into())
            .collect()
    }

    /// Surviving records, highest value first; equal values in arrival order
    pub fn into_sorted_records(self) -> Vec<Record> {
        let mut sorted = self.heap.into_vec();
        sorted.sort_by(|Reverse(a), Reverse(b)| {
            b.value.cmp(&a.value).then(a.arrival.cmp(&b.arrival))
        });
        sorted.into_iter().map(|Reverse(c)| c.into()).collect()
    }
}
