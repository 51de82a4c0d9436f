//! Entity handles: an [`Entity`] id bundled with a borrow of its list.
//!
//! [`EntityMut`] is what [`EntityList::create_entity`] returns, so setup code
//! can chain component insertion:
//!
//! ```ignore
//! let player = list
//!     .create_entity()
//!     .with(Name::new("player"))
//!     .with(Health(100))
//!     .id();
//! ```

use super::entity::Entity;
use super::entity_list::EntityList;
use super::query::ComponentSet;

/// Read-only view of a live entity.
#[derive(Clone, Copy)]
pub struct EntityRef<'w> {
    list: &'w EntityList,
    entity: Entity,
}

impl<'w> EntityRef<'w> {
    pub(crate) fn new(list: &'w EntityList, entity: Entity) -> Self {
        Self { list, entity }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }

    pub fn get_component<T: 'static + Send + Sync>(&self) -> Option<&'w T> {
        self.list.get_component::<T>(self.entity)
    }

    pub fn has_component<T: 'static + Send + Sync>(&self) -> bool {
        self.list.has_component::<T>(self.entity)
    }

    pub fn has_all<S: ComponentSet>(&self) -> bool {
        self.list.has_all::<S>(self.entity)
    }

    pub fn has_any<S: ComponentSet>(&self) -> bool {
        self.list.has_any::<S>(self.entity)
    }

    pub fn parent(&self) -> Option<Entity> {
        self.list.parent(self.entity)
    }

    pub fn children(&self) -> Vec<Entity> {
        self.list.children(self.entity)
    }
}

/// Mutable view of a live entity.
///
/// Holding the handle borrows the whole list, so the entity cannot be
/// destroyed behind its back.
pub struct EntityMut<'w> {
    list: &'w mut EntityList,
    entity: Entity,
}

impl<'w> EntityMut<'w> {
    pub(crate) fn new(list: &'w mut EntityList, entity: Entity) -> Self {
        Self { list, entity }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }

    /// Attach `component`, replacing any existing `T`.
    pub fn add_component<T: 'static + Send + Sync>(&mut self, component: T) -> &mut T {
        self.list
            .add_component(self.entity, component)
            .expect("EntityMut always refers to a live entity")
    }

    /// Builder form of [`add_component`](Self::add_component).
    pub fn with<T: 'static + Send + Sync>(mut self, component: T) -> Self {
        self.add_component(component);
        self
    }

    pub fn remove_component<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.list.remove_component::<T>(self.entity)
    }

    pub fn get_component<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.list.get_component::<T>(self.entity)
    }

    pub fn get_component_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.list.get_component_mut::<T>(self.entity)
    }

    pub fn has_component<T: 'static + Send + Sync>(&self) -> bool {
        self.list.has_component::<T>(self.entity)
    }

    pub fn has_all<S: ComponentSet>(&self) -> bool {
        self.list.has_all::<S>(self.entity)
    }

    pub fn has_any<S: ComponentSet>(&self) -> bool {
        self.list.has_any::<S>(self.entity)
    }

    /// Make `child` the last child of this entity. See
    /// [`EntityList::add_child`].
    pub fn add_child(&mut self, child: Entity) -> bool {
        self.list.add_child(self.entity, child)
    }

    pub fn remove_child(&mut self, child: Entity) -> bool {
        self.list.remove_child(self.entity, child)
    }

    pub fn parent(&self) -> Option<Entity> {
        self.list.parent(self.entity)
    }

    pub fn children(&self) -> Vec<Entity> {
        self.list.children(self.entity)
    }

    pub fn for_each_child(&self, f: impl FnMut(Entity)) {
        self.list.for_each_child(self.entity, f);
    }

    /// Destroy the entity, consuming the handle.
    pub fn destroy(self) -> bool {
        self.list.destroy_entity(self.entity)
    }
}
