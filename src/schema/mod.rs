//! Shared schema model.
//!
//! Both the relational and the document pipelines produce a [`Schema`]: an
//! insertion-ordered map from entity name to [`Entity`]. The model is built
//! fresh on every analysis run and handed to the caller; nothing in this
//! crate mutates it afterwards.

mod entity;
mod field;
mod reference;

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub use entity::{Entity, EntityOptions};
pub use field::{DefaultValue, Field, FieldType};
pub use reference::{Reference, ReferenceKind, Through};

/// Entities keyed by name, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, replacing any previous entity of the same name in place.
    pub fn insert(&mut self, entity: Entity) {
        match self.index.get(&entity.name) {
            Some(&pos) => self.entities[pos] = entity,
            None => {
                self.index.insert(entity.name.clone(), self.entities.len());
                self.entities.push(entity);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&pos| &self.entities[pos])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        match self.index.get(name) {
            Some(&pos) => Some(&mut self.entities[pos]),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }
}

impl FromIterator<Entity> for Schema {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for entity in iter {
            schema.insert(entity);
        }
        schema
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entities.len()))?;
        for entity in &self.entities {
            map.serialize_entry(&entity.name, entity)?;
        }
        map.end()
    }
}
