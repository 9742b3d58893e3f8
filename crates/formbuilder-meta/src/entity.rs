//! Entity class descriptions and the runtime entity interface.
//!
//! An [`EntityDescriptor`] is the static description of an entity type: its
//! simple name, the module it lives in, and its properties in declaration
//! order with their [`Annotation`]s. The [`Entity`] trait is the object-safe
//! runtime interface the form builder uses to read and write attribute
//! values and to reach related entities. Both are normally generated by
//! `#[derive(Entity)]`.

use std::any::Any;
use std::fmt;

use formbuilder_core::utils::text::lcfirst;
use formbuilder_core::FormBuilderResult;

use crate::annotations::{Annotation, ColumnType};
use crate::value::Value;

/// Static description of one entity property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// The property (field) name.
    pub name: &'static str,
    /// Annotations in declaration order.
    pub annotations: Vec<Annotation>,
}

impl PropertyDescriptor {
    /// Creates a descriptor.
    pub const fn new(name: &'static str, annotations: Vec<Annotation>) -> Self {
        Self { name, annotations }
    }

    /// Returns the annotations in declaration order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns `true` if the property carries an `Id` annotation.
    pub fn is_identifier(&self) -> bool {
        self.annotations.iter().any(|a| matches!(a, Annotation::Id))
    }

    /// Returns the declared column type, if the property is a column.
    pub fn column_type(&self) -> Option<&ColumnType> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Column { column_type } => Some(column_type),
            _ => None,
        })
    }

    /// Returns the target of a one-to-one relation, if declared.
    pub fn relation_target(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::OneToOne { target_entity } => Some(target_entity.as_str()),
            _ => None,
        })
    }
}

/// Static description of an entity type.
///
/// # Examples
///
/// ```
/// use formbuilder_meta::annotations::Annotation;
/// use formbuilder_meta::entity::{EntityDescriptor, PropertyDescriptor};
///
/// let desc = EntityDescriptor::new("TestEntity", "app::model", vec![
///     PropertyDescriptor::new("id", vec![Annotation::column("integer"), Annotation::Id]),
/// ]);
/// assert_eq!(desc.short_name(), "testEntity");
/// assert!(desc.property("id").is_some());
/// assert_eq!(desc.id_property().map(|p| p.name), Some("id"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    /// The simple type name.
    pub name: &'static str,
    /// The module path the type is declared in.
    pub namespace: &'static str,
    /// Properties in declaration order.
    pub properties: Vec<PropertyDescriptor>,
}

impl EntityDescriptor {
    /// Creates a descriptor.
    pub const fn new(
        name: &'static str,
        namespace: &'static str,
        properties: Vec<PropertyDescriptor>,
    ) -> Self {
        Self {
            name,
            namespace,
            properties,
        }
    }

    /// Returns the properties in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The first property carrying an `Id` annotation.
    pub fn id_property(&self) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.is_identifier())
    }

    /// The simple name with its first character lower-cased.
    pub fn short_name(&self) -> String {
        lcfirst(self.name)
    }

    /// The fully qualified name, `namespace::Name`.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.to_string()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }
}

/// The runtime interface of an entity instance.
///
/// The trait is object safe; the form builder owns entities as
/// `Box<dyn Entity>` and reaches related entities through
/// [`related_mut`](Entity::related_mut).
pub trait Entity: Any + Send + fmt::Debug {
    /// Returns the static description of this entity's type.
    fn descriptor(&self) -> &'static EntityDescriptor;

    /// Reads an attribute. `None` when the property has no readable value
    /// (unknown, or a relation).
    fn get(&self, property: &str) -> Option<Value>;

    /// Writes an attribute, converting the value to the attribute's type.
    ///
    /// Fails with `InvalidReference` for an unknown property and
    /// `InvalidValue` when the value cannot be converted.
    fn set(&mut self, property: &str, value: Value) -> FormBuilderResult<()>;

    /// Checks that `value` converts to the attribute's type without writing
    /// it. Fails like [`set`](Entity::set) would.
    fn check_value(&self, property: &str, value: &Value) -> FormBuilderResult<()>;

    /// Returns the entity currently held by a relation property.
    fn related(&self, property: &str) -> Option<&dyn Entity>;

    /// Returns the entity currently held by a relation property, mutably.
    fn related_mut(&mut self, property: &str) -> Option<&mut dyn Entity>;

    /// Constructs a fresh instance of the relation target, assigns it to the
    /// property, and returns it. `None` when the property is not a
    /// constructible relation.
    fn instantiate_related(&mut self, property: &str) -> Option<&mut dyn Entity>;

    /// Upcasts to `Any` for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to `Any` for downcasting to the concrete type, mutably.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An entity type that can be constructed without an existing instance.
pub trait EntityClass: Entity + Default {
    /// Returns the static description of this type.
    fn class_descriptor() -> &'static EntityDescriptor;
}

impl dyn Entity + '_ {
    /// Downcasts to a concrete entity type.
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Downcasts to a concrete entity type, mutably.
    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}
