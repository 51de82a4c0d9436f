//! # Entity: Opaque Identifiers
//!
//! An [`Entity`] owns nothing. It names a row of components that lives inside
//! an [`EntityList`](super::EntityList), and it is only meaningful for the list
//! that produced it.
//!
//! ## Generations
//!
//! Slots are recycled after destruction. Every slot carries a generation that
//! is bumped when the slot is freed, so a copied handle to a destroyed entity
//! can never silently alias whatever gets created in the same slot later:
//!
//! ```text
//! create          → Entity { index: 3, generation: 0 }
//! destroy 3v0     → slot 3 generation becomes 1, slot pushed on the free list
//! create          → Entity { index: 3, generation: 1 }
//! is_valid(3v0)   → false
//! ```
//!
//! [`Entity::NULL`] never refers to a live slot and is used for "no link" in
//! hierarchy components.

use std::fmt;

/// Identifier of an entity inside an [`EntityList`](super::EntityList).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// An id that is never valid in any list.
    pub const NULL: Entity = Entity {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Slot index. Reused after the entity is destroyed.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this id was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Returns `true` for [`Entity::NULL`].
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    /// Packs the id into a single integer (generation in the high half).
    pub fn to_bits(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Inverse of [`to_bits`](Self::to_bits).
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Hands out ids and recycles freed slots.
pub(crate) struct EntityAllocator {
    slots: Vec<Slot>,
    free: Vec<u32>,
    alive: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            alive: 0,
        }
    }

    pub fn allocate(&mut self) -> Entity {
        self.alive += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            return Entity {
                index,
                generation: slot.generation,
            };
        }
        // u32::MAX is reserved for NULL.
        let index = self.slots.len() as u32;
        debug_assert!(index != u32::MAX, "entity index space exhausted");
        self.slots.push(Slot {
            generation: 0,
            alive: true,
        });
        Entity {
            index,
            generation: 0,
        }
    }

    /// Frees the slot. Returns `false` for stale or null ids.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.slots[entity.index as usize];
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index);
        self.alive -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Forget every id. Generations are kept so old handles stay invalid.
    pub fn free_all(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.alive {
                slot.alive = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.alive = 0;
    }

    #[cfg(test)]
    pub(crate) fn total_slots(&self) -> usize {
        self.slots.len()
    }
}
