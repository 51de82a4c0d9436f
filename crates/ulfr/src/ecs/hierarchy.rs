//! # Parent / Child Hierarchy
//!
//! Links live in each entity's [`Relationship`] component. A parent points
//! at its first child; siblings form a doubly linked list.
//!
//! ```text
//! parent.first_child ──► a ⇄ b ⇄ c
//! a.parent == b.parent == c.parent == parent
//! ```
//!
//! An entity has at most one parent. Attaching it somewhere else first
//! detaches it from the old parent. Cycles are rejected. Destroying an
//! entity unlinks it from its parent and turns its children into roots.
//!
//! Links to dead entities are treated as empty, so a stray stale id never
//! walks into a recycled slot.

use super::components::Relationship;
use super::entity::Entity;
use super::entity_list::EntityList;

impl EntityList {
    /// Append `child` to `parent`'s children.
    ///
    /// Returns `false` (and changes nothing) if either id is dead, if they
    /// are the same entity, or if `child` is an ancestor of `parent`.
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> bool {
        if parent == child || !self.is_valid(parent) || !self.is_valid(child) {
            return false;
        }
        if self.is_ancestor_of(child, parent) {
            return false;
        }
        if self.links(child).parent == parent {
            return true;
        }

        self.detach(child);

        let first = self.links(parent).first_child;
        if self.is_valid(first) {
            let last = self.children(parent).last().copied().unwrap_or(first);
            self.edit_links(last, |rel| rel.next_sibling = child);
            self.edit_links(child, |rel| rel.prev_sibling = last);
        } else {
            self.edit_links(parent, |rel| rel.first_child = child);
        }
        self.edit_links(child, |rel| rel.parent = parent);
        true
    }

    /// Detach `child` from `parent`. It becomes a root.
    ///
    /// Returns `false` if `child` is not currently a child of `parent`.
    pub fn remove_child(&mut self, parent: Entity, child: Entity) -> bool {
        if !self.is_valid(parent) || self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child)
    }

    /// Parent of `entity`, if it has a live one.
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        let parent = self.links(entity).parent;
        self.is_valid(parent).then_some(parent)
    }

    /// Direct children of `parent`, in insertion order.
    pub fn children(&self, parent: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        let mut cursor = self.links(parent).first_child;
        while self.is_valid(cursor) && out.len() < self.len() {
            out.push(cursor);
            cursor = self.links(cursor).next_sibling;
        }
        out
    }

    /// Call `f` for each direct child of `parent`.
    pub fn for_each_child(&self, parent: Entity, mut f: impl FnMut(Entity)) {
        for child in self.children(parent) {
            f(child);
        }
    }

    /// Unlink `entity` before it is destroyed.
    pub(crate) fn unlink_for_destroy(&mut self, entity: Entity) {
        self.detach(entity);
        for child in self.children(entity) {
            self.edit_links(child, |rel| {
                rel.parent = Entity::NULL;
                rel.next_sibling = Entity::NULL;
                rel.prev_sibling = Entity::NULL;
            });
        }
        self.edit_links(entity, |rel| rel.first_child = Entity::NULL);
    }

    fn is_ancestor_of(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut cursor = self.links(entity).parent;
        let mut steps = 0;
        while self.is_valid(cursor) && steps <= self.len() {
            if cursor == ancestor {
                return true;
            }
            cursor = self.links(cursor).parent;
            steps += 1;
        }
        false
    }

    /// Remove `child` from its parent's sibling chain. Returns `true` if it
    /// had a live parent.
    fn detach(&mut self, child: Entity) -> bool {
        let rel = self.links(child);
        let parent = rel.parent;
        let had_parent = self.is_valid(parent);

        if had_parent {
            if self.links(parent).first_child == child {
                self.edit_links(parent, |p| p.first_child = rel.next_sibling);
            } else if self.is_valid(rel.prev_sibling) {
                self.edit_links(rel.prev_sibling, |p| p.next_sibling = rel.next_sibling);
            }
            if self.is_valid(rel.next_sibling) {
                self.edit_links(rel.next_sibling, |n| n.prev_sibling = rel.prev_sibling);
            }
        }

        self.edit_links(child, |c| {
            c.parent = Entity::NULL;
            c.next_sibling = Entity::NULL;
            c.prev_sibling = Entity::NULL;
        });
        had_parent
    }

    fn links(&self, entity: Entity) -> Relationship {
        self.get_component::<Relationship>(entity)
            .copied()
            .unwrap_or_default()
    }

    /// Edit `entity`'s links, attaching a fresh [`Relationship`] if the
    /// component was removed.
    fn edit_links(&mut self, entity: Entity, f: impl FnOnce(&mut Relationship)) {
        if !self.is_valid(entity) {
            return;
        }
        if let Some(rel) = self.get_component_mut::<Relationship>(entity) {
            f(rel);
            return;
        }
        let mut rel = Relationship::default();
        f(&mut rel);
        self.add_component(entity, rel);
    }
}
