//! Scenes: a named [`EntityList`].
//!
//! [`Context`](crate::Context) owns exactly one active scene. Switching
//! scenes with [`Context::replace_scene`](crate::Context::replace_scene) hands
//! back the old one; dropping it tears down every entity it held.

use crate::ecs::EntityList;

pub struct Scene {
    name: String,
    entities: EntityList,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: EntityList::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn entities(&self) -> &EntityList {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityList {
        &mut self.entities
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Scene")
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("entities", &self.entities.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_owns_its_entities() {
        let mut scene = Scene::new("level-1");
        scene.entities_mut().create_entity();
        scene.entities_mut().create_entity();

        assert_eq!(scene.name(), "level-1");
        assert_eq!(scene.entities().len(), 2);

        scene.set_name("level-2");
        assert_eq!(format!("{scene:?}"), r#"Scene { name: "level-2", entities: 2 }"#);
    }
}
