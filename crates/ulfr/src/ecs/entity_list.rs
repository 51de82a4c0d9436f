//! # EntityList: The Entity Store
//!
//! [`EntityList`] owns every entity of a scene and all of their components.
//! Entities are plain ids ([`Entity`]); the list maps each live id to a row
//! in one of its archetype tables.
//!
//! ```text
//! EntityList
//!   allocator:  slot generations + free list
//!   archetypes: HashMap<ArchetypeKey, Archetype>
//!   locations:  Vec<Option<Location>>   indexed by Entity::index
//! ```
//!
//! ## Guarantees
//!
//! - Ids are unique while alive; destroyed ids are never valid again, even
//!   after their slot is reused.
//! - At most one component per type per entity. Adding a type the entity
//!   already has drops the old value and stores the new one.
//! - Lookups of dead entities or absent components return `None`.
//! - [`for_each`](EntityList::for_each) visits exactly the entities that
//!   matched when the call started.

use std::any::TypeId;
use std::collections::HashMap;

use super::archetype::{Archetype, ArchetypeKey, Row, archetype_key, key_with, key_without};
use super::components::{Name, Relationship};
use super::entity::{Entity, EntityAllocator};
use super::handle::{EntityMut, EntityRef};
use super::query::{ComponentSet, QueryParam};
use crate::math::Transform;

#[derive(Clone)]
struct Location {
    key: ArchetypeKey,
    row: usize,
}

/// Container for all entities and components of one scene.
pub struct EntityList {
    allocator: EntityAllocator,
    archetypes: HashMap<ArchetypeKey, Archetype>,
    locations: Vec<Option<Location>>,
}

impl EntityList {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            archetypes: HashMap::new(),
            locations: Vec::new(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create an entity with the default [`Transform`], [`Name`] and
    /// [`Relationship`] components.
    ///
    /// The name is `"Entity {index}"`.
    pub fn create_entity(&mut self) -> EntityMut<'_> {
        let entity = self.allocator.allocate();

        let mut row = Row::new();
        row.insert(TypeId::of::<Transform>(), Box::new(Transform::IDENTITY));
        row.insert(
            TypeId::of::<Name>(),
            Box::new(Name::new(&format!("Entity {}", entity.index))),
        );
        row.insert(TypeId::of::<Relationship>(), Box::new(Relationship::default()));
        let key = archetype_key(row.keys().copied().collect());
        self.place(entity, key, row);

        EntityMut::new(self, entity)
    }

    /// Mutable handle to `entity`, or `None` if it is not alive.
    pub fn get_entity(&mut self, entity: Entity) -> Option<EntityMut<'_>> {
        if self.is_valid(entity) {
            Some(EntityMut::new(self, entity))
        } else {
            None
        }
    }

    /// Read-only handle to `entity`, or `None` if it is not alive.
    pub fn entity(&self, entity: Entity) -> Option<EntityRef<'_>> {
        self.is_valid(entity).then(|| EntityRef::new(self, entity))
    }

    /// Destroy `entity` and every component it holds.
    ///
    /// The entity is unlinked from its parent, and its children become roots.
    /// Returns `false` if the id was already invalid.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        self.unlink_for_destroy(entity);

        let location = self
            .locations
            .get_mut(entity.index as usize)
            .and_then(Option::take);
        if let Some(location) = location {
            if let Some(arch) = self.archetypes.get_mut(&location.key) {
                let (_dropped, moved) = arch.take_row(location.row);
                if let Some(moved) = moved {
                    self.set_row(moved, location.row);
                }
            }
        }
        self.allocator.deallocate(entity)
    }

    /// Returns `true` if `entity` is alive in this list.
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Alias of [`is_valid`](Self::is_valid).
    pub fn has_entity(&self, entity: Entity) -> bool {
        self.is_valid(entity)
    }

    /// Destroy every entity. Previously issued ids stay invalid.
    pub fn clear(&mut self) {
        self.archetypes.clear();
        self.locations.clear();
        self.allocator.free_all();
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.allocator.alive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct component signatures seen so far.
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Snapshot of every live entity.
    pub fn entities(&self) -> Vec<Entity> {
        self.archetypes
            .values()
            .flat_map(|arch| arch.entities.iter().copied())
            .collect()
    }

    /// First entity whose [`Name`] equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        let name_id = TypeId::of::<Name>();
        self.archetypes.values().find_map(|arch| {
            let column = arch.columns.get(&name_id)?;
            arch.entities
                .iter()
                .enumerate()
                .find(|(row, _)| column.get::<Name>(*row).is_some_and(|n| n.as_str() == name))
                .map(|(_, &entity)| entity)
        })
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach `component` to `entity`, replacing any existing `T`.
    ///
    /// Returns a reference to the stored value, or `None` if the entity is
    /// dead.
    pub fn add_component<T: 'static + Send + Sync>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Option<&mut T> {
        let location = self.location(entity)?.clone();
        let type_id = TypeId::of::<T>();

        if location.key.binary_search(&type_id).is_ok() {
            let column = self
                .archetypes
                .get_mut(&location.key)?
                .columns
                .get_mut(&type_id)?;
            drop(column.replace(location.row, Box::new(component)));
            return column.get_mut::<T>(location.row);
        }

        let new_key = key_with(&location.key, type_id);
        let row = self.migrate(entity, &location, new_key.clone(), |row| {
            row.insert(type_id, Box::new(component));
        })?;
        self.archetypes
            .get_mut(&new_key)?
            .columns
            .get_mut(&type_id)?
            .get_mut::<T>(row)
    }

    /// Detach and return the entity's `T`. `None` if absent or dead.
    pub fn remove_component<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        let location = self.location(entity)?.clone();
        let type_id = TypeId::of::<T>();
        if location.key.binary_search(&type_id).is_err() {
            return None;
        }

        let mut removed = None;
        self.migrate(entity, &location, key_without(&location.key, type_id), |row| {
            removed = row.remove(&type_id);
        })?;
        removed
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn get_component<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        let location = self.location(entity)?;
        self.archetypes
            .get(&location.key)?
            .columns
            .get(&TypeId::of::<T>())?
            .get::<T>(location.row)
    }

    pub fn get_component_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        let Location { key, row } = self.location(entity)?.clone();
        self.archetypes
            .get_mut(&key)?
            .columns
            .get_mut(&TypeId::of::<T>())?
            .get_mut::<T>(row)
    }

    pub fn has_component<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.archetype_of(entity)
            .is_some_and(|arch| arch.contains(&TypeId::of::<T>()))
    }

    /// `true` if the entity holds every type in `S`.
    pub fn has_all<S: ComponentSet>(&self, entity: Entity) -> bool {
        self.archetype_of(entity)
            .is_some_and(|arch| arch.contains_all(&S::type_ids()))
    }

    /// `true` if the entity holds at least one type in `S`.
    pub fn has_any<S: ComponentSet>(&self, entity: Entity) -> bool {
        self.archetype_of(entity)
            .is_some_and(|arch| arch.contains_any(&S::type_ids()))
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Call `f` for every entity holding all components requested by `Q`.
    ///
    /// ```ignore
    /// list.for_each::<(&mut Transform, &Velocity)>(|_, (transform, vel)| {
    ///     transform.position += vel.0;
    /// });
    /// ```
    pub fn for_each<Q: QueryParam>(&mut self, f: impl FnMut(Entity, Q::Item<'_>)) {
        self.run_query::<Q>(Q::type_ids(), f);
    }

    /// Like [`for_each`](Self::for_each), restricted to entities that also
    /// hold every type in `F`. Filter components are not borrowed.
    pub fn for_each_filtered<Q: QueryParam, F: ComponentSet>(
        &mut self,
        f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        let mut required = Q::type_ids();
        required.extend(F::type_ids());
        self.run_query::<Q>(required, f);
    }

    /// Snapshot of the entities holding every type in `S`.
    ///
    /// Use this when a system needs to create or destroy entities while
    /// walking the matches.
    pub fn entities_with<S: ComponentSet>(&self) -> Vec<Entity> {
        let required = S::type_ids();
        self.archetypes
            .values()
            .filter(|arch| arch.contains_all(&required))
            .flat_map(|arch| arch.entities.iter().copied())
            .collect()
    }

    fn run_query<Q: QueryParam>(
        &mut self,
        required: Vec<TypeId>,
        mut f: impl FnMut(Entity, Q::Item<'_>),
    ) {
        let mut requested = Q::type_ids();
        requested.sort_unstable();
        requested.dedup();
        assert_eq!(
            requested.len(),
            Q::type_ids().len(),
            "query `{}` requests the same component type twice",
            std::any::type_name::<Q>()
        );

        for arch in self.archetypes.values_mut() {
            if arch.len() == 0 || !arch.contains_all(&required) {
                continue;
            }
            let mut columns = Q::extract(&mut arch.columns);
            for (row, &entity) in arch.entities.iter().enumerate() {
                f(entity, Q::fetch(&mut columns, row));
            }
            Q::restore(columns, &mut arch.columns);
        }
    }

    // ── Storage plumbing ─────────────────────────────────────────────

    fn location(&self, entity: Entity) -> Option<&Location> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.locations.get(entity.index as usize)?.as_ref()
    }

    fn archetype_of(&self, entity: Entity) -> Option<&Archetype> {
        let location = self.location(entity)?;
        self.archetypes.get(&location.key)
    }

    fn set_row(&mut self, entity: Entity, row: usize) {
        if let Some(Some(location)) = self.locations.get_mut(entity.index as usize) {
            location.row = row;
        }
    }

    fn place(&mut self, entity: Entity, key: ArchetypeKey, row: Row) -> usize {
        let arch = self
            .archetypes
            .entry(key.clone())
            .or_insert_with(|| Archetype::with_types(&key));
        let new_row = arch.push_row(entity, row);

        let index = entity.index as usize;
        if self.locations.len() <= index {
            self.locations.resize(index + 1, None);
        }
        self.locations[index] = Some(Location { key, row: new_row });
        new_row
    }

    /// Move `entity` from its current table to the table for `to`, letting
    /// `edit` add or drop values on the way.
    fn migrate(
        &mut self,
        entity: Entity,
        from: &Location,
        to: ArchetypeKey,
        edit: impl FnOnce(&mut Row),
    ) -> Option<usize> {
        let (mut row, moved) = self.archetypes.get_mut(&from.key)?.take_row(from.row);
        if let Some(moved) = moved {
            self.set_row(moved, from.row);
        }
        edit(&mut row);
        Some(self.place(entity, to, row))
    }
}

impl Default for EntityList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[derive(Debug, PartialEq)]
    struct Velocity(Vec3);
    #[derive(Debug, PartialEq)]
    struct Health(u32);
    struct Player;

    #[test]
    fn create_entity_attaches_defaults() {
        let mut list = EntityList::new();
        let e = list.create_entity().id();

        assert_eq!(list.get_component::<Transform>(e), Some(&Transform::IDENTITY));
        assert_eq!(
            list.get_component::<Name>(e).map(Name::as_str),
            Some(format!("Entity {}", e.index()).as_str())
        );
        assert!(list.has_component::<Relationship>(e));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn destroyed_entity_is_invalid() {
        let mut list = EntityList::new();
        let e = list.create_entity().id();
        assert!(list.destroy_entity(e));

        assert!(list.get_entity(e).is_none());
        assert!(list.entity(e).is_none());
        assert!(!list.has_entity(e));
        assert!(list.get_component::<Transform>(e).is_none());
        assert!(!list.destroy_entity(e));
        assert!(list.is_empty());
    }

    #[test]
    fn recycled_slot_does_not_revive_stale_handle() {
        let mut list = EntityList::new();
        let old = list.create_entity().id();
        list.destroy_entity(old);
        let new = list.create_entity().id();

        assert_eq!(old.index(), new.index());
        assert!(!list.is_valid(old));
        assert!(list.is_valid(new));
        assert!(list.add_component(old, Health(1)).is_none());
        assert!(!list.has_component::<Health>(new));
    }

    #[test]
    fn add_component_replaces_existing() {
        let mut list = EntityList::new();
        let e = list.create_entity().id();
        list.add_component(e, Health(10));
        list.add_component(e, Health(99));

        assert_eq!(list.get_component::<Health>(e), Some(&Health(99)));
        assert_eq!(list.entities_with::<(Health,)>(), vec![e]);
    }

    #[test]
    fn add_component_returns_stored_value() {
        let mut list = EntityList::new();
        let e = list.create_entity().id();
        if let Some(health) = list.add_component(e, Health(5)) {
            health.0 += 1;
        }
        assert_eq!(list.get_component::<Health>(e), Some(&Health(6)));
    }

    #[test]
    fn replacing_drops_old_value() {
        use std::sync::Arc;

        let mut list = EntityList::new();
        let e = list.create_entity().id();
        let first = Arc::new(());
        list.add_component(e, Arc::clone(&first));
        assert_eq!(Arc::strong_count(&first), 2);
        list.add_component(e, Arc::new(()));
        assert_eq!(Arc::strong_count(&first), 1);
    }

    #[test]
    fn remove_component_returns_value_and_keeps_others() {
        let mut list = EntityList::new();
        let e = list.create_entity().id();
        list.add_component(e, Health(3));
        list.add_component(e, Velocity(Vec3::X));

        assert_eq!(list.remove_component::<Health>(e), Some(Health(3)));
        assert_eq!(list.remove_component::<Health>(e), None);
        assert_eq!(list.get_component::<Velocity>(e), Some(&Velocity(Vec3::X)));
        assert!(list.has_component::<Transform>(e));
    }

    #[test]
    fn has_all_and_has_any() {
        let mut list = EntityList::new();
        let e = list.create_entity().id();
        list.add_component(e, Health(1));

        assert!(list.has_all::<(Transform, Health)>(e));
        assert!(!list.has_all::<(Health, Player)>(e));
        assert!(list.has_any::<(Health, Player)>(e));
        assert!(!list.has_any::<(Player, Velocity)>(e));
    }

    #[test]
    fn migration_keeps_swapped_entities_addressable() {
        let mut list = EntityList::new();
        let ids: Vec<_> = (0..4u32)
            .map(|i| {
                let e = list.create_entity().id();
                list.add_component(e, Health(i));
                e
            })
            .collect();

        // Moving the first entity out swaps the last one into its row.
        list.add_component(ids[0], Player);
        list.destroy_entity(ids[1]);

        assert_eq!(list.get_component::<Health>(ids[0]), Some(&Health(0)));
        assert_eq!(list.get_component::<Health>(ids[2]), Some(&Health(2)));
        assert_eq!(list.get_component::<Health>(ids[3]), Some(&Health(3)));
    }

    #[test]
    fn for_each_mutates_matching_entities() {
        let mut list = EntityList::new();
        let moving = list.create_entity().id();
        list.add_component(moving, Velocity(Vec3::new(1.0, 2.0, 3.0)));
        let still = list.create_entity().id();

        list.for_each::<(&mut Transform, &Velocity)>(|_, (transform, vel)| {
            transform.translate(vel.0);
        });

        assert_eq!(
            list.get_component::<Transform>(moving).map(|t| t.position),
            Some(Vec3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(list.get_component::<Transform>(still), Some(&Transform::IDENTITY));
    }

    #[test]
    fn for_each_visits_each_match_once() {
        let mut list = EntityList::new();
        for i in 0..10u32 {
            let e = list.create_entity().id();
            if i % 2 == 0 {
                list.add_component(e, Health(i));
            }
            if i % 3 == 0 {
                list.add_component(e, Player);
            }
        }

        let mut seen = Vec::new();
        list.for_each::<(&Health,)>(|e, (health,)| seen.push((e, health.0)));
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn for_each_filtered_requires_marker() {
        let mut list = EntityList::new();
        let hero = list.create_entity().id();
        list.add_component(hero, Health(10));
        list.add_component(hero, Player);
        let grunt = list.create_entity().id();
        list.add_component(grunt, Health(5));

        let mut hits = Vec::new();
        list.for_each_filtered::<(&mut Health,), (Player,)>(|e, (health,)| {
            health.0 += 1;
            hits.push(e);
        });

        assert_eq!(hits, vec![hero]);
        assert_eq!(list.get_component::<Health>(hero), Some(&Health(11)));
        assert_eq!(list.get_component::<Health>(grunt), Some(&Health(5)));
    }

    #[test]
    fn snapshot_allows_creation_while_walking() {
        let mut list = EntityList::new();
        for _ in 0..3 {
            let e = list.create_entity().id();
            list.add_component(e, Player);
        }

        for e in list.entities_with::<(Player,)>() {
            let spawned = list.create_entity().id();
            list.add_component(spawned, Player);
            assert!(list.is_valid(e));
        }

        assert_eq!(list.entities_with::<(Player,)>().len(), 6);
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut list = EntityList::new();
        let a = list.create_entity().id();
        let b = list.create_entity().id();
        list.clear();

        assert!(list.is_empty());
        assert!(!list.is_valid(a));
        assert!(!list.is_valid(b));
        let c = list.create_entity().id();
        assert!(list.has_component::<Transform>(c));
    }

    #[test]
    fn find_by_name_uses_name_component() {
        let mut list = EntityList::new();
        let e = list.create_entity().with(Name::new("camera")).id();
        list.create_entity();

        assert_eq!(list.find_by_name("camera"), Some(e));
        assert_eq!(list.find_by_name("missing"), None);
        assert_eq!(list.entities().len(), 2);
    }

    #[test]
    fn duplicate_query_type_panics_without_losing_columns() {
        let mut list = EntityList::new();
        let e = list.create_entity().with(Health(10)).id();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            list.for_each::<(&Health, &mut Health)>(|_, _| {});
        }));
        assert!(result.is_err());

        let mut seen = Vec::new();
        list.for_each::<(&Transform, &Health)>(|entity, (_, health)| seen.push((entity, health.0)));
        assert_eq!(seen, vec![(e, 10)]);
        assert_eq!(list.get_component::<Health>(e), Some(&Health(10)));
    }
}
