use core::mem;

use super::handle::Handle;

enum Slot<T> {
    Occupied(T),
    /// A released slot, linked to the next released slot.
    Vacant(Option<Handle>),
}

/// Slot storage for tree nodes.
///
/// Released slots form an intrusive free list threaded through the vacant
/// slots themselves, so handing a slot back never allocates.
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    next_free: Option<Handle>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_free: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            next_free: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, element: T) -> Handle {
        self.len += 1;
        if let Some(handle) = self.next_free {
            let slot = &mut self.slots[handle.index()];
            match mem::replace(slot, Slot::Occupied(element)) {
                Slot::Vacant(next) => self.next_free = next,
                Slot::Occupied(_) => unreachable!("`Arena::insert()` - free list points at a live slot"),
            }
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::insert()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Slot::Occupied(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get()` - stale handle {handle:?}"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get_mut()` - stale handle {handle:?}"),
        }
    }

    /// Moves the element out and pushes its slot onto the free list.
    pub(crate) fn remove(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.index()];
        match mem::replace(slot, Slot::Vacant(self.next_free)) {
            Slot::Occupied(element) => {
                self.next_free = Some(handle);
                self.len -= 1;
                element
            }
            Slot::Vacant(next) => {
                // Undo the overwrite before reporting the double release.
                *slot = Slot::Vacant(next);
                panic!("`Arena::remove()` - stale handle {handle:?}")
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.next_free = None;
        self.len = 0;
    }
}
