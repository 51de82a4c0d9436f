//! # Entity Store
//!
//! An archetype-based entity-component store. Entities are generational ids;
//! components are any `'static + Send + Sync` value, at most one per type per
//! entity.
//!
//! ## Module Overview
//!
//! - [`entity`]: Generational entity ids and the slot allocator
//! - `archetype`: Type-erased columnar tables grouped by component signature
//! - [`query`]: Closure-based iteration over matching archetypes
//! - [`entity_list`]: [`EntityList`], the container for one scene
//! - [`handle`]: [`EntityRef`] / [`EntityMut`] views
//! - [`components`]: [`Name`] and [`Relationship`], attached to every entity
//! - [`hierarchy`]: Parent / child links

pub(crate) mod archetype;
pub mod components;
pub mod entity;
pub mod entity_list;
pub mod handle;
pub mod hierarchy;
pub mod query;

pub use components::{Name, Relationship};
pub use entity::Entity;
pub use entity_list::EntityList;
pub use handle::{EntityMut, EntityRef};
pub use query::{ComponentSet, QueryParam};
