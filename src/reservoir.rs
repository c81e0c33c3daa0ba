use rand::Rng;

/// Outcome of offering one item to a reservoir.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission<T> {
    /// The reservoir was still filling; the item took the next slot.
    Appended,
    /// The item overwrote an occupied slot.
    Replaced {
        /// Index of the overwritten slot.
        slot: usize,
        /// Previous occupant of the slot.
        evicted: T,
    },
    /// The item was not kept.
    Skipped,
}

/// Fixed-capacity uniform sample over a stream of unknown length (Algorithm R).
///
/// After `seen` offers every offered item is retained with probability
/// `min(1, quota / seen)`. Memory is `O(quota)` no matter how long the stream.
#[derive(Clone, Debug)]
pub struct Reservoir<T> {
    quota: usize,
    seen: u64,
    slots: Vec<T>,
}

impl<T> Reservoir<T> {
    /// Empty reservoir holding at most `quota` items.
    pub fn new(quota: usize) -> Self {
        Self {
            quota,
            seen: 0,
            slots: Vec::with_capacity(quota),
        }
    }

    /// Maximum number of retained items.
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Items offered so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Items currently retained.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True until the first item is retained.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots still open, i.e. how far the bucket under-fills its quota.
    pub fn vacancies(&self) -> usize {
        self.quota - self.slots.len()
    }

    /// Retained items in slot order.
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    /// Retained items in slot order.
    pub fn into_slots(self) -> Vec<T> {
        self.slots
    }

    /// Offer the next stream item.
    pub fn offer<R: Rng>(&mut self, item: T, rng: &mut R) -> Admission<T> {
        self.seen += 1;
        if self.slots.len() < self.quota {
            self.slots.push(item);
            return Admission::Appended;
        }
        if self.quota == 0 {
            return Admission::Skipped;
        }
        let draw = rng.random_range(0..self.seen);
        if draw < self.quota as u64 {
            let slot = draw as usize;
            let evicted = std::mem::replace(&mut self.slots[slot], item);
            Admission::Replaced { slot, evicted }
        } else {
            Admission::Skipped
        }
    }
}
