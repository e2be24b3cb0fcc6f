use crate::matrix::Cost;
use std::cmp::Ordering;

/// Priority of a frontier entry. Entries are ordered by `cost` first; `sequence` is assigned in
/// strictly increasing order on insertion and breaks ties, so that two keys never compare equal
/// and payloads never need to be compared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontierKey {
    pub cost: Cost,
    pub sequence: u64,
}

impl Eq for FrontierKey {}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// A binary min-heap of payloads keyed by [`FrontierKey`]
pub struct Frontier<T> {
    heap: Vec<(FrontierKey, T)>,
    next_sequence: u64,
}

impl<T> Default for Frontier<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

enum ChildType {
    First,
    Second,
}

impl<T> Frontier<T> {
    /// Creates a new Frontier, allocating **capacity** entries up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of entries pushed so far
    pub fn number_of_pushes(&self) -> u64 {
        self.next_sequence
    }

    /// Inserts **element** with priority **cost** and returns the key assigned to it
    pub fn push(&mut self, cost: Cost, element: T) -> FrontierKey {
        debug_assert!(!cost.is_nan());
        let key = FrontierKey {
            cost,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        self.heap.push((key, element));
        self.up(self.heap.len() - 1);
        key
    }

    /// Removes and returns the element with the smallest key
    pub fn pop_min(&mut self) -> Option<(FrontierKey, T)> {
        if self.heap.is_empty() {
            return None;
        }

        let result = self.heap.swap_remove(0);
        if self.heap.len() > 1 {
            self.down(0);
        }
        Some(result)
    }

    /// Returns the element with the smallest key
    pub fn peek_min(&self) -> Option<(FrontierKey, &T)> {
        self.heap.first().map(|(key, element)| (*key, element))
    }

    fn up(&mut self, mut idx: usize) {
        while let Some(parent) = self.parent(idx) {
            if self.heap[idx].0 < self.heap[parent].0 {
                self.heap.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn down(&mut self, mut idx: usize) {
        while let Some(mut smallest) = self.child(idx, ChildType::First) {
            if let Some(second) = self.child(idx, ChildType::Second) {
                if self.heap[second].0 < self.heap[smallest].0 {
                    smallest = second;
                }
            }

            if self.heap[smallest].0 < self.heap[idx].0 {
                self.heap.swap(idx, smallest);
                idx = smallest;
            } else {
                break;
            }
        }
    }

    fn parent(&self, idx: usize) -> Option<usize> {
        if idx == 0 {
            None
        } else {
            Some((idx - 1) / 2)
        }
    }

    fn child(&self, idx: usize, child_type: ChildType) -> Option<usize> {
        let off = match child_type {
            ChildType::First => 1,
            ChildType::Second => 2,
        };
        let idx = idx * 2 + off;
        if idx >= self.heap.len() {
            None
        } else {
            Some(idx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn pop_min() {
        let mut frontier = Frontier::default();

        frontier.push(10.0, 'a');
        frontier.push(1.0, 'b');
        frontier.push(15.0, 'c');

        assert_eq!(frontier.peek_min().map(|(_, &x)| x), Some('b'));
        assert_eq!(frontier.pop_min().map(|(k, x)| (k.cost, x)), Some((1.0, 'b')));
        assert_eq!(frontier.pop_min().map(|(k, x)| (k.cost, x)), Some((10.0, 'a')));
        assert_eq!(frontier.pop_min().map(|(k, x)| (k.cost, x)), Some((15.0, 'c')));
        assert!(frontier.pop_min().is_none());
        assert!(frontier.is_empty());
    }

    #[test]
    fn equal_costs_pop_in_insertion_order() {
        let mut frontier = Frontier::default();
        for x in 0..10 {
            frontier.push(if x % 2 == 0 { 1.0 } else { 0.5 }, x);
        }

        let order: Vec<_> = std::iter::from_fn(|| frontier.pop_min().map(|(_, x)| x)).collect();
        assert_eq!(order, vec![1, 3, 5, 7, 9, 0, 2, 4, 6, 8]);
        assert_eq!(frontier.number_of_pushes(), 10);
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut frontier = Frontier::default();
        let a = frontier.push(3.0, ());
        let b = frontier.push(3.0, ());
        assert!(a < b);
        assert_eq!(b.sequence, a.sequence + 1);
    }

    #[test]
    fn random_order() {
        let mut gen = Pcg64Mcg::seed_from_u64(99);
        let mut frontier = Frontier::with_capacity(100);
        let mut expected = Vec::new();

        for i in 0..500 {
            let cost = gen.gen_range(0..20) as Cost;
            frontier.push(cost, i);
            expected.push((cost, i));

            // interleave pops
            if gen.gen_bool(0.3) {
                expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                let (key, x) = frontier.pop_min().unwrap();
                let (cost, i) = expected.remove(0);
                assert_eq!((key.cost, x), (cost, i));
            }
        }

        expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (cost, i) in expected {
            let (key, x) = frontier.pop_min().unwrap();
            assert_eq!((key.cost, x), (cost, i));
        }
        assert_eq!(frontier.len(), 0);
    }
}
