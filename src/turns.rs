//! Initiative ordering for a combat round

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::grid::Unit;

struct TurnEntry {
    speed: u32,
    order: Reverse<u64>,
    unit: Unit,
}

impl TurnEntry {
    fn key(&self) -> (u32, Reverse<u64>) {
        (self.speed, self.order)
    }
}

impl PartialEq for TurnEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TurnEntry {}

impl Ord for TurnEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for TurnEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-priority queue of units by speed. Equal speeds act in insertion order.
#[derive(Default)]
pub struct TurnScheduler {
    queue: BinaryHeap<TurnEntry>,
    inserted: u64,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: Unit) {
        let order = Reverse(self.inserted);
        self.inserted += 1;
        self.queue.push(TurnEntry {
            speed: unit.speed,
            order,
            unit,
        });
    }

    /// Remove and return the fastest unit, or `None` once the round is exhausted.
    pub fn next_turn(&mut self) -> Option<Unit> {
        self.queue.pop().map(|entry| entry.unit)
    }

    pub fn peek_speed(&self) -> Option<u32> {
        self.queue.peek().map(|entry| entry.speed)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
