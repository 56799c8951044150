//! Arena of receiver objects addressed by generational handles.

use std::any::{Any, TypeId, type_name};
use std::fmt;

use crate::NativeError;

/// Copyable reference to an object in an [`ObjectHeap`].
///
/// A handle remembers the generation of the slot it was issued for, so once
/// the object is freed the handle goes stale instead of reaching whatever
/// is allocated in that slot next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    index: u32,
    generation: u32,
    type_id: TypeId,
}

impl ObjectHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether this handle was issued for a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

enum Slot {
    Occupied { generation: u32, value: Box<dyn Any> },
    Vacant { generation: u32 },
}

impl Slot {
    fn generation(&self) -> u32 {
        match self {
            Slot::Occupied { generation, .. } | Slot::Vacant { generation } => *generation,
        }
    }
}

/// Owner of every heap-allocated receiver in a [`State`](crate::State).
///
/// Objects are created by constructor callbacks and by
/// [`State::allocate`](crate::State::allocate), and are reached from the
/// stack through `Dynamic::Object` handles.
#[derive(Default)]
pub struct ObjectHeap {
    slots: Vec<Slot>,
    vacant: Vec<u32>,
}

impl ObjectHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate<T: Any>(&mut self, value: T) -> ObjectHandle {
        let value: Box<dyn Any> = Box::new(value);
        let (index, generation) = match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                let generation = slot.generation();
                *slot = Slot::Occupied { generation, value };
                (index, generation)
            }
            None => {
                self.slots.push(Slot::Occupied {
                    generation: 0,
                    value,
                });
                (self.slots.len() as u32 - 1, 0)
            }
        };
        ObjectHandle {
            index,
            generation,
            type_id: TypeId::of::<T>(),
        }
    }

    fn value(&self, handle: ObjectHandle) -> Option<&dyn Any> {
        match self.slots.get(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => {
                Some(&**value)
            }
            _ => None,
        }
    }

    fn value_mut(&mut self, handle: ObjectHandle) -> Option<&mut dyn Any> {
        match self.slots.get_mut(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => {
                Some(&mut **value)
            }
            _ => None,
        }
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.value(handle).is_some()
    }

    /// `None` for stale handles and type mismatches alike.
    pub fn get<T: Any>(&self, handle: ObjectHandle) -> Option<&T> {
        self.value(handle)?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self, handle: ObjectHandle) -> Option<&mut T> {
        self.value_mut(handle)?.downcast_mut()
    }

    /// Borrow a receiver, reporting why it could not be reached.
    pub fn try_get<T: Any>(&self, handle: ObjectHandle) -> Result<&T, NativeError> {
        self.value(handle)
            .ok_or(NativeError::StaleHandle {
                index: handle.index,
            })?
            .downcast_ref()
            .ok_or_else(object_mismatch::<T>)
    }

    pub fn try_get_mut<T: Any>(&mut self, handle: ObjectHandle) -> Result<&mut T, NativeError> {
        self.value_mut(handle)
            .ok_or(NativeError::StaleHandle {
                index: handle.index,
            })?
            .downcast_mut()
            .ok_or_else(object_mismatch::<T>)
    }

    /// Drop the object behind `handle`. Returns false if it was already gone.
    pub fn free(&mut self, handle: ObjectHandle) -> bool {
        if !self.contains(handle) {
            return false;
        }
        self.slots[handle.index as usize] = Slot::Vacant {
            generation: handle.generation.wrapping_add(1),
        };
        self.vacant.push(handle.index);
        true
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn object_mismatch<T: Any>() -> NativeError {
    NativeError::invalid_this(format!("object is not a {}", type_name::<T>()))
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("live", &self.len())
            .field("vacant", &self.vacant.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Crate {
        weight: u32,
    }

    #[test]
    fn handles_reach_their_object() {
        let mut heap = ObjectHeap::new();
        let a = heap.allocate(Crate { weight: 3 });
        let b = heap.allocate(Crate { weight: 5 });

        assert!(a.is::<Crate>());
        assert!(!a.is::<u32>());
        assert_eq!(heap.get::<Crate>(b).map(|c| c.weight), Some(5));

        heap.get_mut::<Crate>(a).unwrap().weight = 4;
        assert_eq!(heap.try_get::<Crate>(a).unwrap().weight, 4);
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn type_mismatch_is_an_invalid_receiver() {
        let mut heap = ObjectHeap::new();
        let handle = heap.allocate(Crate { weight: 1 });

        assert!(heap.get::<String>(handle).is_none());
        assert!(matches!(
            heap.try_get::<String>(handle),
            Err(NativeError::InvalidThis { .. })
        ));
    }

    #[test]
    fn freed_slots_are_reused_under_a_new_generation() {
        let mut heap = ObjectHeap::new();
        let old = heap.allocate(Crate { weight: 1 });
        assert!(heap.free(old));

        let new = heap.allocate(Crate { weight: 2 });
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert_eq!(heap.get::<Crate>(new).map(|c| c.weight), Some(2));
        assert!(heap.get::<Crate>(old).is_none());
        assert!(matches!(
            heap.try_get_mut::<Crate>(old),
            Err(NativeError::StaleHandle { .. })
        ));
    }

    #[test]
    fn double_free_is_a_no_op() {
        let mut heap = ObjectHeap::new();
        let handle = heap.allocate(Crate { weight: 1 });

        assert!(heap.free(handle));
        assert!(!heap.free(handle));
        assert!(!heap.contains(handle));
        assert!(heap.is_empty());
    }
}
