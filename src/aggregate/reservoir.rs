//! Bounded, mergeable point retention.
//!
//! Every offered point carries an exponential random key `-ln(u) / w` and the
//! reservoir keeps the `cap` points with the smallest keys. This is weighted
//! sampling without replacement: a point with twice the response weight is
//! twice as likely to be drawn first. The retained set is a function of the
//! union of offered keys only, so merging shards in any order or grouping
//! yields the same reservoir.

use crate::types::WeightedPoint;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Retention key for a point of `weight` from 64 uniform random bits.
/// Smaller keys are retained first; heavier points draw smaller keys.
pub fn weighted_key(bits: u64, weight: f64) -> f64 {
    // uniform in (0, 1], so the log is finite
    let u = ((bits >> 11) + 1) as f64 * (1.0 / (1u64 << 53) as f64);
    -u.ln() / weight
}

#[derive(Clone, Debug)]
struct Keyed {
    key: f64,
    point: WeightedPoint,
}

impl PartialEq for Keyed {
    fn eq(&self, other: &Self) -> bool {
        self.key.total_cmp(&other.key) == Ordering::Equal
    }
}

impl Eq for Keyed {}

impl PartialOrd for Keyed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyed {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.total_cmp(&other.key)
    }
}

/// Bottom-k reservoir keyed by random priorities.
#[derive(Clone, Debug)]
pub struct PointReservoir {
    cap: usize,
    offered: u64,
    // max-heap on key: the top is the first entry to evict
    heap: BinaryHeap<Keyed>,
}

impl PointReservoir {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            offered: 0,
            heap: BinaryHeap::with_capacity(cap.min(1024)),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Points ever offered, retained or not.
    pub fn offered(&self) -> u64 {
        self.offered
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// True once more points were offered than could be retained.
    pub fn is_saturated(&self) -> bool {
        self.offered > self.heap.len() as u64
    }

    pub fn offer(&mut self, key: f64, point: WeightedPoint) {
        self.offered += 1;
        self.insert(Keyed { key, point });
    }

    fn insert(&mut self, entry: Keyed) {
        if self.cap == 0 {
            return;
        }
        if self.heap.len() < self.cap {
            self.heap.push(entry);
            return;
        }
        if let Some(top) = self.heap.peek() {
            if entry.key < top.key {
                self.heap.pop();
                self.heap.push(entry);
            }
        }
    }

    pub fn merge(&mut self, other: PointReservoir) {
        self.offered += other.offered;
        for entry in other.heap.into_vec() {
            self.insert(entry);
        }
    }

    /// Retained points ordered by key, which makes the order independent of
    /// insertion and merge order.
    pub fn points(&self) -> Vec<WeightedPoint> {
        let mut entries: Vec<&Keyed> = self.heap.iter().collect();
        entries.sort_by(|a, b| a.key.total_cmp(&b.key));
        entries.into_iter().map(|e| e.point).collect()
    }
}
