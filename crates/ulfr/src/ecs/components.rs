//! Components every entity starts with.
//!
//! [`EntityList::create_entity`](super::EntityList::create_entity) attaches a
//! [`Transform`](crate::math::Transform), a [`Name`] and a [`Relationship`] to
//! each new entity.

use std::fmt;

use super::entity::Entity;

/// Human-readable label of an entity. At most [`Name::MAX_LEN`] bytes.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
    /// Longest name kept, in bytes. Longer input is cut at a char boundary.
    pub const MAX_LEN: usize = 255;

    pub fn new(name: &str) -> Self {
        let mut out = Self::default();
        out.set(name);
        out
    }

    /// Replaces the stored name.
    pub fn set(&mut self, name: &str) {
        let mut end = name.len().min(Self::MAX_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        self.0.clear();
        self.0.push_str(&name[..end]);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Hierarchy links, maintained by the methods in [`hierarchy`](super::hierarchy).
///
/// Children form a doubly linked list through `next_sibling` /
/// `prev_sibling`, starting at the parent's `first_child`. Unused links hold
/// [`Entity::NULL`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relationship {
    pub parent: Entity,
    pub first_child: Entity,
    pub next_sibling: Entity,
    pub prev_sibling: Entity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_truncates_to_max_len() {
        let long = "x".repeat(400);
        let name = Name::new(&long);
        assert_eq!(name.len(), Name::MAX_LEN);
    }

    #[test]
    fn name_truncation_respects_char_boundaries() {
        // 'é' is two bytes; 128 of them straddle the 255-byte limit.
        let long = "é".repeat(128);
        let name = Name::new(&long);
        assert_eq!(name.len(), 254);
        assert!(name.as_str().chars().all(|c| c == 'é'));
    }

    #[test]
    fn name_set_and_clear() {
        let mut name = Name::from("player");
        assert_eq!(name.to_string(), "player");
        name.set("enemy");
        assert_eq!(name.as_str(), "enemy");
        name.clear();
        assert!(name.is_empty());
    }

    #[test]
    fn default_relationship_has_no_links() {
        let rel = Relationship::default();
        assert!(rel.parent.is_null());
        assert!(rel.first_child.is_null());
        assert!(rel.next_sibling.is_null());
        assert!(rel.prev_sibling.is_null());
    }
}
