//! First-fit identifier allocation
//!
//! Identifiers are slot indices: the lowest free index is always handed out
//! next, so freed ids are reused instead of growing without bound.

/// Index of the first empty slot, or `slots.len()` when every slot is taken
pub fn next_id<T>(slots: &[Option<T>]) -> usize {
    slots
        .iter()
        .position(Option::is_none)
        .unwrap_or(slots.len())
}

/// Sparse table whose keys are first-fit allocated slot indices
#[derive(Debug, Clone)]
pub struct SlotTable<T> {
    slots: Vec<Option<T>>,
}

impl<T> SlotTable<T> {
    pub fn new() -> Self {
        SlotTable { slots: Vec::new() }
    }

    /// The id the next `insert` will use
    pub fn next_id(&self) -> usize {
        next_id(&self.slots)
    }

    /// Store a value in the lowest free slot and return its id
    pub fn insert(&mut self, value: T) -> usize {
        let id = self.next_id();
        if id == self.slots.len() {
            self.slots.push(Some(value));
        } else {
            self.slots[id] = Some(value);
        }
        id
    }

    pub fn get(&self, id: usize) -> Option<&T> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut T> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.get(id).is_some()
    }

    /// Free a slot, returning what it held
    pub fn remove(&mut self, id: usize) -> Option<T> {
        self.slots.get_mut(id).and_then(Option::take)
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Ids of occupied slots, ascending
    pub fn ids(&self) -> Vec<usize> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|value| (id, value)))
    }

    /// Empty every slot, yielding the occupied ones
    pub fn drain(&mut self) -> Vec<(usize, T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(id, slot)| slot.take().map(|value| (id, value)))
            .collect()
    }
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
