//! Generational arena for host-visible objects.

use std::fmt;

use crate::TypeHash;

/// Handle to a heap slot.
///
/// The generation detects handles whose object was freed, even after the
/// slot has been reused. The tag records which kind of object the handle
/// was created for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    pub index: u32,
    pub generation: u32,
    pub tag: TypeHash,
}

impl ObjectHandle {
    pub fn new(index: u32, generation: u32, tag: TypeHash) -> Self {
        Self {
            index,
            generation,
            tag,
        }
    }
}

struct HeapSlot<T> {
    generation: u32,
    tag: TypeHash,
    value: Option<T>,
    ref_count: u32,
}

/// Reference counted storage with generational indices.
///
/// When an object is freed its slot is reused with the generation
/// incremented, so stale handles never alias the new occupant.
pub struct ObjectHeap<T> {
    slots: Vec<HeapSlot<T>>,
    free_list: Vec<u32>,
}

impl<T> ObjectHeap<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Store `value` with a reference count of one.
    pub fn allocate(&mut self, tag: TypeHash, value: T) -> ObjectHandle {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.tag = tag;
            slot.value = Some(value);
            slot.ref_count = 1;
            ObjectHandle::new(index, slot.generation, tag)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(HeapSlot {
                generation: 0,
                tag,
                value: Some(value),
                ref_count: 1,
            });
            ObjectHandle::new(index, 0, tag)
        }
    }

    fn slot(&self, handle: ObjectHandle) -> Option<&HeapSlot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.tag == handle.tag && slot.value.is_some())
    }

    fn slot_mut(&mut self, handle: ObjectHandle) -> Option<&mut HeapSlot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.tag == handle.tag && slot.value.is_some())
    }

    /// Returns `None` if the handle is stale.
    pub fn get(&self, handle: ObjectHandle) -> Option<&T> {
        self.slot(handle)?.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut T> {
        self.slot_mut(handle)?.value.as_mut()
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Increment the reference count.
    pub fn add_ref(&mut self, handle: ObjectHandle) -> bool {
        match self.slot_mut(handle) {
            Some(slot) => {
                slot.ref_count = slot.ref_count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decrement the reference count, returning the value when it reaches
    /// zero.
    pub fn release(&mut self, handle: ObjectHandle) -> Option<T> {
        let slot = self.slot_mut(handle)?;
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count == 0 { self.take(handle) } else { None }
    }

    /// Free the slot immediately, whatever its reference count.
    pub fn take(&mut self, handle: ObjectHandle) -> Option<T> {
        let slot = self.slot_mut(handle)?;
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        slot.ref_count = 0;
        self.free_list.push(handle.index);
        value
    }

    pub fn ref_count(&self, handle: ObjectHandle) -> Option<u32> {
        self.slot(handle).map(|slot| slot.ref_count)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles of every live object.
    pub fn handles(&self) -> Vec<ObjectHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.value.is_some())
            .map(|(index, slot)| ObjectHandle::new(index as u32, slot.generation, slot.tag))
            .collect()
    }
}

impl<T> Default for ObjectHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObjectHeap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .finish()
    }
}
