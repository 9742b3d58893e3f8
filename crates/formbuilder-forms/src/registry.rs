//! The entity registry.
//!
//! The registry owns the main entity and records every entity the form is
//! built for: the main one and the related entities reached through its
//! single-valued relation properties. Each registration gets an opaque
//! [`EntityHandle`]; per-entity tables elsewhere are keyed by that handle.
//! Related entities stay owned by the main entity and are reached through
//! it on every access.

use std::fmt;

use formbuilder_core::{FormBuilderError, FormBuilderResult};
use formbuilder_meta::entity::{Entity, EntityDescriptor};

/// An opaque handle to a registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle(usize);

impl EntityHandle {
    /// The handle of the main entity.
    pub const MAIN: Self = Self(0);

    /// The registration index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One registered entity.
#[derive(Debug, Clone)]
pub struct EntityEntry {
    /// The registration handle.
    pub handle: EntityHandle,
    /// The relation property the entity is reached through; `None` for the
    /// main entity.
    pub relation: Option<String>,
    /// The entity's class description.
    pub descriptor: &'static EntityDescriptor,
}

impl EntityEntry {
    /// Returns `true` for the main entity.
    pub const fn is_main(&self) -> bool {
        self.relation.is_none()
    }

    /// The entity's short name.
    pub fn short_name(&self) -> String {
        self.descriptor.short_name()
    }
}

/// Holds the main entity and the entries of all registered entities.
#[derive(Default)]
pub struct EntityRegistry {
    main: Option<Box<dyn Entity>>,
    entries: Vec<EntityEntry>,
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the main entity.
    ///
    /// Fails with `ConfigurationError` if a main entity is already set.
    pub fn set_main(&mut self, entity: Box<dyn Entity>) -> FormBuilderResult<&EntityEntry> {
        if self.main.is_some() {
            return Err(FormBuilderError::ConfigurationError(
                "Main entity has already been set".to_string(),
            ));
        }
        let descriptor = entity.descriptor();
        self.main = Some(entity);
        self.entries.push(EntityEntry {
            handle: EntityHandle::MAIN,
            relation: None,
            descriptor,
        });
        tracing::debug!(entity = descriptor.name, "Registered main entity");
        Ok(&self.entries[0])
    }

    /// Registers the entity held by the main entity's relation `property`.
    ///
    /// When the property currently holds nothing, a fresh instance of the
    /// relation target is constructed and assigned to it first. Registering
    /// the same property twice returns the existing entry.
    ///
    /// Fails with `ConfigurationError` when there is no main entity and with
    /// `InvalidReference` when the property does not exist or is not a
    /// one-to-one relation.
    pub fn add_related(&mut self, property: &str) -> FormBuilderResult<&EntityEntry> {
        if let Some(index) = self.position_of(property) {
            return Ok(&self.entries[index]);
        }

        let main: &mut dyn Entity = self.main.as_deref_mut().ok_or_else(no_main_entity)?;
        let main_descriptor = main.descriptor();
        let prop = main_descriptor.property(property).ok_or_else(|| {
            FormBuilderError::InvalidReference(format!(
                "Entity '{}' has no sub-entity property '{property}'.",
                main_descriptor.name
            ))
        })?;

        let descriptor = if let Some(existing) = main.related(property) {
            existing.descriptor()
        } else {
            let target = prop.relation_target().ok_or_else(|| no_relation(property))?;
            let created = main
                .instantiate_related(property)
                .ok_or_else(|| no_relation(property))?;
            tracing::debug!(property, target, "Constructed related entity");
            created.descriptor()
        };

        self.entries.push(EntityEntry {
            handle: EntityHandle(self.entries.len()),
            relation: Some(property.to_string()),
            descriptor,
        });
        tracing::debug!(entity = descriptor.name, relation = property, "Registered related entity");
        Ok(&self.entries[self.entries.len() - 1])
    }

    fn position_of(&self, relation: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.relation.as_deref() == Some(relation))
    }

    /// Returns `true` once a main entity is registered.
    pub const fn has_main(&self) -> bool {
        self.main.is_some()
    }

    /// All entries in registration order; the main entity comes first.
    pub fn entries(&self) -> &[EntityEntry] {
        &self.entries
    }

    /// The number of registered entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The main entity's entry.
    pub fn main_entry(&self) -> FormBuilderResult<&EntityEntry> {
        self.entries.first().ok_or_else(no_main_entity)
    }

    /// The entry registered under `relation`, or the main entry for `None`.
    pub fn entry_for(&self, relation: Option<&str>) -> FormBuilderResult<&EntityEntry> {
        match relation {
            None => self.main_entry(),
            Some(r) => self
                .position_of(r)
                .map(|i| &self.entries[i])
                .ok_or_else(|| {
                    FormBuilderError::InvalidReference(format!(
                        "No entity is registered under property '{r}'."
                    ))
                }),
        }
    }

    /// The entry for a handle.
    pub fn entry(&self, handle: EntityHandle) -> Option<&EntityEntry> {
        self.entries.get(handle.0)
    }

    /// The main entity.
    pub fn main(&self) -> FormBuilderResult<&dyn Entity> {
        self.main.as_deref().ok_or_else(no_main_entity)
    }

    /// The main entity, mutably.
    pub fn main_mut(&mut self) -> FormBuilderResult<&mut dyn Entity> {
        match self.main.as_deref_mut() {
            Some(main) => Ok(main as &mut dyn Entity),
            None => Err(no_main_entity()),
        }
    }

    /// Takes the main entity out of the registry.
    pub fn into_main(self) -> Option<Box<dyn Entity>> {
        self.main
    }

    /// The entity for a handle. `None` when the handle is unknown or its
    /// relation currently holds nothing.
    pub fn entity(&self, handle: EntityHandle) -> Option<&dyn Entity> {
        let entry = self.entry(handle)?;
        let main: &dyn Entity = self.main.as_deref()?;
        match &entry.relation {
            None => Some(main),
            Some(r) => main.related(r),
        }
    }

    /// The entity for a handle, mutably.
    pub fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut dyn Entity> {
        let relation = self.entry(handle)?.relation.clone();
        let main: &mut dyn Entity = self.main.as_deref_mut()?;
        match relation {
            None => Some(main),
            Some(r) => main.related_mut(&r),
        }
    }
}

fn no_main_entity() -> FormBuilderError {
    FormBuilderError::ConfigurationError("No main entity set".to_string())
}

fn no_relation(property: &str) -> FormBuilderError {
    FormBuilderError::InvalidReference(format!(
        "There's no one-to-one relation via property '{property}'."
    ))
}
