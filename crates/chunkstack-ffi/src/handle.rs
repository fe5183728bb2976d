//! Generation-checked handle table for stacks owned across the C boundary.
//!
//! A handle packs a slot index (upper 32 bits) and the slot's generation
//! (lower 32 bits). Removing a value bumps the slot's generation, so a
//! destroyed handle can never resolve again: lookups return `None` and a
//! second destroy is a harmless no-op.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    fn pack(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }

    fn unpack(raw: u64) -> Self {
        Self {
            slot: (raw >> 32) as u32,
            generation: raw as u32,
        }
    }
}

enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
    /// Generation space exhausted; the slot is never handed out again.
    Retired,
}

/// Maps opaque `u64` handles to owned values.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// Empty table, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Take ownership of `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        if let Some(slot) = self.vacant.pop() {
            let entry = &mut self.entries[slot as usize];
            if let Entry::Vacant { generation } = *entry {
                *entry = Entry::Occupied { generation, value };
                return Handle { slot, generation }.pack();
            }
            debug_assert!(false, "vacant list pointed at a live slot");
        }
        let slot = self.entries.len() as u32;
        self.entries.push(Entry::Occupied {
            generation: 0,
            value,
        });
        Handle {
            slot,
            generation: 0,
        }
        .pack()
    }

    /// Shared access to the value behind `raw`, if it is still live.
    pub fn get(&self, raw: u64) -> Option<&T> {
        let handle = Handle::unpack(raw);
        match self.entries.get(handle.slot as usize)? {
            Entry::Occupied { generation, value } if *generation == handle.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Exclusive access to the value behind `raw`, if it is still live.
    pub fn get_mut(&mut self, raw: u64) -> Option<&mut T> {
        let handle = Handle::unpack(raw);
        match self.entries.get_mut(handle.slot as usize)? {
            Entry::Occupied { generation, value } if *generation == handle.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Remove and return the value behind `raw`.
    ///
    /// Returns `None` for stale or unknown handles. A slot whose generation
    /// would wrap to zero is retired rather than reused, so an old handle
    /// from generation zero can never alias a new value.
    pub fn remove(&mut self, raw: u64) -> Option<T> {
        let handle = Handle::unpack(raw);
        let entry = self.entries.get_mut(handle.slot as usize)?;
        match &*entry {
            Entry::Occupied { generation, .. } if *generation == handle.generation => {}
            _ => return None,
        }
        let next = match handle.generation.checked_add(1) {
            Some(generation) => {
                self.vacant.push(handle.slot);
                Entry::Vacant { generation }
            }
            None => Entry::Retired,
        };
        match std::mem::replace(entry, next) {
            Entry::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }
}
