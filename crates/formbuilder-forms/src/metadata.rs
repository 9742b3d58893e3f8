//! Property metadata derived from entity annotations.
//!
//! [`derive_metadata`] scans the annotations of one property and produces a
//! [`PropertyMetadata`]: whether the property is a persisted column, the
//! input kind of its control, its identifier and ignore flags, and the
//! ordered validation rules. A [`MetadataTable`] keeps the derived metadata
//! per registered entity, in derivation order.

use std::collections::BTreeMap;

use formbuilder_meta::annotations::{Annotation, ColumnType};
use formbuilder_meta::entity::PropertyDescriptor;

use crate::registry::EntityHandle;
use crate::rules::Rule;
use crate::widgets::InputKind;

/// Everything the form builder knows about one entity property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMetadata {
    /// The property name.
    pub name: String,
    /// Whether the property is a persisted column and gets a control.
    pub is_column: bool,
    /// The kind of control to create. `None` when the storage type has no
    /// matching control.
    pub input_kind: Option<InputKind>,
    /// Whether the property is the entity's identifier.
    pub is_identifier: bool,
    /// Whether the property is excluded from forms unconditionally.
    pub ignored: bool,
    /// Whether the property holds a sensitive value.
    pub password: bool,
    /// The declared storage type.
    pub column_type: Option<ColumnType>,
    /// Validation rules in declaration order.
    pub rules: Vec<Rule>,
}

impl PropertyMetadata {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_column: false,
            input_kind: None,
            is_identifier: false,
            ignored: false,
            password: false,
            column_type: None,
            rules: Vec::new(),
        }
    }

    /// Returns `true` if the form builder should create a control for the
    /// property.
    pub const fn is_control_candidate(&self) -> bool {
        self.is_column && !self.ignored
    }
}

/// Maps a storage type to the kind of control that edits it.
pub const fn input_kind_for(column_type: &ColumnType) -> Option<InputKind> {
    match column_type {
        ColumnType::String
        | ColumnType::Integer
        | ColumnType::Float
        | ColumnType::Date
        | ColumnType::DateTime => Some(InputKind::Text),
        ColumnType::Text => Some(InputKind::TextArea),
        ColumnType::Boolean => Some(InputKind::Checkbox),
        ColumnType::Other(_) => None,
    }
}

/// Derives the metadata of one property from its annotations.
///
/// `expose_identifier` is `true` only for the main entity when identifier
/// exposure is enabled. An identifier that is not exposed loses its rules
/// and its column status, so no control is ever created for it; an exposed
/// one becomes a hidden control.
pub fn derive_metadata(property: &PropertyDescriptor, expose_identifier: bool) -> PropertyMetadata {
    let mut meta = PropertyMetadata::empty(property.name);

    for annotation in property.annotations() {
        match annotation {
            Annotation::Column { column_type } => {
                meta.is_column = true;
                meta.column_type = Some(column_type.clone());
                if !meta.password {
                    meta.input_kind = input_kind_for(column_type);
                }
                if meta.input_kind.is_none() {
                    tracing::warn!(
                        property = property.name,
                        column_type = %column_type,
                        "No control kind for storage type"
                    );
                }
            }
            Annotation::Id => meta.is_identifier = true,
            Annotation::Ignore => meta.ignored = true,
            Annotation::Password => {
                meta.password = true;
                meta.input_kind = Some(InputKind::Password);
            }
            Annotation::Constraint(constraint) => meta.rules.push(Rule::from(constraint)),
            Annotation::GeneratedValue | Annotation::OneToOne { .. } => {}
        }
    }

    if meta.is_identifier {
        if expose_identifier {
            meta.input_kind = Some(InputKind::Hidden);
        } else {
            meta.rules.clear();
            meta.is_column = false;
        }
    }

    tracing::trace!(
        property = property.name,
        is_column = meta.is_column,
        input_kind = ?meta.input_kind,
        rules = meta.rules.len(),
        "Derived property metadata"
    );
    meta
}

/// Derived metadata for every registered entity.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    entries: BTreeMap<EntityHandle, Vec<PropertyMetadata>>,
}

impl MetadataTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores metadata unless the property was already derived.
    ///
    /// Returns `true` if the metadata was stored.
    pub fn insert(&mut self, handle: EntityHandle, meta: PropertyMetadata) -> bool {
        let list = self.entries.entry(handle).or_default();
        if list.iter().any(|m| m.name == meta.name) {
            return false;
        }
        list.push(meta);
        true
    }

    /// Stores metadata, replacing an earlier derivation in place.
    pub fn replace(&mut self, handle: EntityHandle, meta: PropertyMetadata) {
        let list = self.entries.entry(handle).or_default();
        match list.iter_mut().find(|m| m.name == meta.name) {
            Some(existing) => *existing = meta,
            None => list.push(meta),
        }
    }

    /// Looks up the metadata of a property.
    pub fn get(&self, handle: EntityHandle, property: &str) -> Option<&PropertyMetadata> {
        self.entries
            .get(&handle)?
            .iter()
            .find(|m| m.name == property)
    }

    /// Returns `true` if the property was derived.
    pub fn contains(&self, handle: EntityHandle, property: &str) -> bool {
        self.get(handle, property).is_some()
    }

    /// Removes the metadata of a property.
    pub fn remove(&mut self, handle: EntityHandle, property: &str) -> Option<PropertyMetadata> {
        let list = self.entries.get_mut(&handle)?;
        let index = list.iter().position(|m| m.name == property)?;
        Some(list.remove(index))
    }

    /// The metadata of one entity, in derivation order.
    pub fn for_entity(&self, handle: EntityHandle) -> &[PropertyMetadata] {
        self.entries.get(&handle).map(Vec::as_slice).unwrap_or_default()
    }

    /// The total number of derived properties.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing was derived.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
