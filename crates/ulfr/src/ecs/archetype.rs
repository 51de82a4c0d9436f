//! # Archetype Storage
//!
//! Entities with exactly the same set of component types share one
//! [`Archetype`]: a table with one type-erased [`Column`] per component type and
//! a parallel `entities` vector. Row `i` of every column belongs to
//! `entities[i]`.
//!
//! ```text
//! Archetype { key: [Name, Relationship, Transform, Velocity] }
//!   Name:         [n0, n1, n2]
//!   Relationship: [r0, r1, r2]
//!   Transform:    [t0, t1, t2]
//!   Velocity:     [v0, v1, v2]
//!   entities:     [e0, e1, e2]
//! ```
//!
//! Adding or removing a component moves the entity's whole row to the table
//! whose key differs by that one type. Removal is swap-remove, so the entity
//! that used to be last takes the freed row; callers must patch that entity's
//! location.
//!
//! Components are boxed (`Box<dyn Any + Send + Sync>`) and checked with
//! `downcast_*` on access. No unsafe code.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::Entity;

/// Sorted, deduplicated component type set identifying an archetype.
pub(crate) type ArchetypeKey = Vec<TypeId>;

/// One entity's components, detached from any table.
pub(crate) type Row = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

pub(crate) fn archetype_key(mut type_ids: Vec<TypeId>) -> ArchetypeKey {
    type_ids.sort();
    type_ids.dedup();
    type_ids
}

/// `key` plus `extra`, still sorted.
pub(crate) fn key_with(key: &[TypeId], extra: TypeId) -> ArchetypeKey {
    let mut ids = key.to_vec();
    ids.push(extra);
    archetype_key(ids)
}

/// `key` minus `removed`.
pub(crate) fn key_without(key: &[TypeId], removed: TypeId) -> ArchetypeKey {
    key.iter().copied().filter(|&t| t != removed).collect()
}

/// Type-erased storage for every component of one type in one archetype.
pub struct Column {
    items: Vec<Box<dyn Any + Send + Sync>>,
}

impl Column {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub(crate) fn push_boxed(&mut self, value: Box<dyn Any + Send + Sync>) {
        self.items.push(value);
    }

    pub(crate) fn get<T: 'static>(&self, row: usize) -> Option<&T> {
        self.items.get(row)?.downcast_ref()
    }

    pub(crate) fn get_mut<T: 'static>(&mut self, row: usize) -> Option<&mut T> {
        self.items.get_mut(row)?.downcast_mut()
    }

    /// Overwrites the value at `row`, returning the previous one.
    pub(crate) fn replace(
        &mut self,
        row: usize,
        value: Box<dyn Any + Send + Sync>,
    ) -> Box<dyn Any + Send + Sync> {
        std::mem::replace(&mut self.items[row], value)
    }

    /// Swap-removes `row`.
    pub(crate) fn take(&mut self, row: usize) -> Box<dyn Any + Send + Sync> {
        self.items.swap_remove(row)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

/// A table of entities sharing one component signature.
pub(crate) struct Archetype {
    pub columns: HashMap<TypeId, Column>,
    pub entities: Vec<Entity>,
}

impl Archetype {
    pub fn with_types(key: &[TypeId]) -> Self {
        Self {
            columns: key.iter().map(|&t| (t, Column::new())).collect(),
            entities: Vec::new(),
        }
    }

    pub fn contains(&self, type_id: &TypeId) -> bool {
        self.columns.contains_key(type_id)
    }

    pub fn contains_all(&self, type_ids: &[TypeId]) -> bool {
        type_ids.iter().all(|t| self.columns.contains_key(t))
    }

    pub fn contains_any(&self, type_ids: &[TypeId]) -> bool {
        type_ids.iter().any(|t| self.columns.contains_key(t))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Appends `entity` with its components and returns the new row.
    ///
    /// `row` must hold exactly one value per column of this archetype.
    pub fn push_row(&mut self, entity: Entity, mut row: Row) -> usize {
        debug_assert_eq!(row.len(), self.columns.len(), "row does not match archetype");
        for (type_id, column) in self.columns.iter_mut() {
            if let Some(value) = row.remove(type_id) {
                column.push_boxed(value);
            }
        }
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Swap-removes `row`, handing back its components and the entity that
    /// now occupies `row` (if any).
    pub fn take_row(&mut self, row: usize) -> (Row, Option<Entity>) {
        let taken = self
            .columns
            .iter_mut()
            .map(|(&type_id, column)| (type_id, column.take(row)))
            .collect();
        self.entities.swap_remove(row);
        (taken, self.entities.get(row).copied())
    }
}
