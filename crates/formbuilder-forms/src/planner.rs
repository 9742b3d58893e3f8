//! Control planning and data binding.
//!
//! This module owns the naming scheme that ties controls to entity
//! properties, turns [`PropertyMetadata`] into configured [`Control`]s, and
//! writes submitted values back onto the entities.
//!
//! ## Naming
//!
//! A property `p` of the main entity is edited by the control
//! `{main}_{p}`; a property `p` of the related entity reached through
//! relation `r` by `{main}_{r}_{p}`, where `main` is the main entity's short
//! name. External references use dotted paths: `"p"` or `"r.p"`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use formbuilder_core::i18n::{substitute, Params, Translator};
use formbuilder_core::{FormBuilderError, FormBuilderResult, Settings};
use formbuilder_meta::annotations::ColumnType;
use formbuilder_meta::constraints::RuleKind;
use formbuilder_meta::entity::{Entity, PropertyDescriptor};
use formbuilder_meta::value::Value;

use crate::control::Control;
use crate::metadata::PropertyMetadata;
use crate::registry::EntityRegistry;
use crate::rules::{ControlRule, Rule};
use crate::widgets::InputKind;

// ── Paths ───────────────────────────────────────────────────────────────

/// A property path: `property` on the main entity or `relation.property`
/// on a related entity.
///
/// # Examples
///
/// ```
/// use formbuilder_forms::planner::ControlPath;
///
/// let path = ControlPath::parse("car.color").unwrap();
/// assert_eq!(path.relation(), Some("car"));
/// assert_eq!(path.property(), "color");
/// assert_eq!(path.to_string(), "car.color");
///
/// assert!(ControlPath::parse("a.b.c").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlPath {
    relation: Option<String>,
    property: String,
}

impl ControlPath {
    /// A path to a main-entity property.
    pub fn main(property: impl Into<String>) -> Self {
        Self {
            relation: None,
            property: property.into(),
        }
    }

    /// A path to a property of the entity reached through `relation`.
    pub fn related(relation: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            relation: Some(relation.into()),
            property: property.into(),
        }
    }

    /// Parses `property` or `relation.property`.
    ///
    /// Fails with `InvalidReference` on empty segments or more than one dot.
    pub fn parse(path: &str) -> FormBuilderResult<Self> {
        let invalid = || FormBuilderError::InvalidReference(format!("Invalid property path '{path}'."));
        let mut segments = path.split('.');
        let first = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        match (segments.next(), segments.next()) {
            (None, _) => Ok(Self::main(first)),
            (Some(second), None) if !second.is_empty() => Ok(Self::related(first, second)),
            _ => Err(invalid()),
        }
    }

    /// The relation segment, if any.
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    /// The property segment.
    pub fn property(&self) -> &str {
        &self.property
    }
}

impl fmt::Display for ControlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation {
            Some(r) => write!(f, "{r}.{}", self.property),
            None => f.write_str(&self.property),
        }
    }
}

/// The control name for a path.
pub fn control_name(main_short_name: &str, path: &ControlPath) -> String {
    match path.relation() {
        Some(r) => format!("{main_short_name}_{r}_{}", path.property()),
        None => format!("{main_short_name}_{}", path.property()),
    }
}

/// Recovers the path from a control name built by [`control_name`].
///
/// Property names may contain underscores themselves, so the registered
/// relation names decide whether the middle segment is a relation. The
/// longest matching relation wins.
pub fn split_control_name<'a>(
    name: &str,
    main_short_name: &str,
    relations: impl IntoIterator<Item = &'a str>,
) -> Option<ControlPath> {
    let rest = name.strip_prefix(main_short_name)?.strip_prefix('_')?;
    if rest.is_empty() {
        return None;
    }
    let mut relations: Vec<&str> = relations.into_iter().collect();
    relations.sort_by_key(|r| std::cmp::Reverse(r.len()));
    for relation in relations {
        if let Some(property) = rest
            .strip_prefix(relation)
            .and_then(|s| s.strip_prefix('_'))
            .filter(|s| !s.is_empty())
        {
            return Some(ControlPath::related(relation, property));
        }
    }
    Some(ControlPath::main(rest))
}

// ── Bindings ────────────────────────────────────────────────────────────

/// A function applied to a submitted value before it is written back.
pub type Transform = Box<dyn Fn(Value) -> Value>;

/// Boxes a closure as a [`Transform`].
///
/// # Examples
///
/// ```
/// use formbuilder_forms::planner::transform;
/// use formbuilder_meta::value::Value;
///
/// let double = transform(|v| Value::from(v.to_number().unwrap_or(0.0) * 2.0));
/// assert_eq!(double(Value::from("5")), Value::Float(10.0));
/// ```
pub fn transform(f: impl Fn(Value) -> Value + 'static) -> Transform {
    Box::new(f)
}

/// An explicit control-to-property mapping.
pub struct Binding {
    /// The property the control writes into.
    pub target: ControlPath,
    /// Applied to the submitted value first.
    pub transform: Option<Transform>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("target", &self.target)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// The write-back table: explicit mappings by control name, and the names
/// of controls bound automatically through the naming scheme.
#[derive(Debug, Default)]
pub struct BindingTable {
    explicit: BTreeMap<String, Binding>,
    automatic: BTreeSet<String>,
}

impl BindingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or overwrites an explicit mapping.
    pub fn set_explicit(&mut self, control_name: impl Into<String>, binding: Binding) {
        self.explicit.insert(control_name.into(), binding);
    }

    /// The explicit mapping of a control.
    pub fn explicit(&self, control_name: &str) -> Option<&Binding> {
        self.explicit.get(control_name)
    }

    /// Drops every explicit mapping targeting `path`, returning the
    /// affected control names.
    pub fn remove_targeting(&mut self, path: &ControlPath) -> Vec<String> {
        let names: Vec<String> = self
            .explicit
            .iter()
            .filter(|(_, b)| &b.target == path)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &names {
            self.explicit.remove(name);
        }
        names
    }

    /// Binds a control through the naming scheme.
    pub fn add_automatic(&mut self, control_name: impl Into<String>) {
        self.automatic.insert(control_name.into());
    }

    /// Removes an automatic binding.
    pub fn remove_automatic(&mut self, control_name: &str) -> bool {
        self.automatic.remove(control_name)
    }

    /// Returns `true` if the control is bound through the naming scheme.
    pub fn is_automatic(&self, control_name: &str) -> bool {
        self.automatic.contains(control_name)
    }

    /// Returns `true` if the control is bound either way.
    pub fn is_bound(&self, control_name: &str) -> bool {
        self.explicit.contains_key(control_name) || self.is_automatic(control_name)
    }

    /// The number of bound controls.
    pub fn len(&self) -> usize {
        self.automatic
            .iter()
            .filter(|name| !self.explicit.contains_key(*name))
            .count()
            + self.explicit.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && self.automatic.is_empty()
    }
}

// ── Control construction ────────────────────────────────────────────────

/// Everything control construction reads from the builder.
#[derive(Clone, Copy)]
pub struct Planner<'a> {
    /// The builder settings.
    pub settings: &'a Settings,
    /// The translator, if one is configured.
    pub translator: Option<&'a dyn Translator>,
    /// The logical form name.
    pub form_name: &'a str,
}

impl fmt::Debug for Planner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("form_name", &self.form_name)
            .field("translator", &self.translator.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> Planner<'a> {
    /// Creates a planner.
    pub const fn new(
        settings: &'a Settings,
        translator: Option<&'a dyn Translator>,
        form_name: &'a str,
    ) -> Self {
        Self {
            settings,
            translator,
            form_name,
        }
    }

    /// The translation key of a property label,
    /// `{namespace}.{form}[.{relation}].{property}`.
    pub fn label_key(&self, path: &ControlPath) -> String {
        let ns = &self.settings.translation_namespace;
        match path.relation() {
            Some(r) => format!("{ns}.{}.{r}.{}", self.form_name, path.property()),
            None => format!("{ns}.{}.{}", self.form_name, path.property()),
        }
    }

    /// The label of a property's control, or `None` when labels are off.
    ///
    /// Fails with `ConfigurationError` when labels are on and no translator
    /// is set.
    pub fn label(&self, path: &ControlPath) -> FormBuilderResult<Option<String>> {
        if !self.settings.create_labels {
            return Ok(None);
        }
        let translator = self.require_translator()?;
        Ok(Some(translator.translate(&self.label_key(path), &Params::new())))
    }

    /// The label of the submit button, translated when a translator exists.
    pub fn submit_label(&self) -> Option<String> {
        let key = format!("{}.{}.submit", self.settings.translation_namespace, self.form_name);
        self.translator.map(|t| t.translate(&key, &Params::new()))
    }

    fn require_translator(&self) -> FormBuilderResult<&'a dyn Translator> {
        self.translator.ok_or_else(|| {
            FormBuilderError::ConfigurationError(
                "Translator for FormBuilder has not been set.".to_string(),
            )
        })
    }

    /// Formats an attribute value for use as a control default.
    pub fn format_default(&self, value: Value) -> Value {
        match value {
            Value::Date(d) => Value::String(d.format(&self.settings.date_format).to_string()),
            Value::DateTime(dt) => {
                Value::String(dt.format(&self.settings.datetime_format).to_string())
            }
            other => other,
        }
    }

    /// Creates the control for a property.
    ///
    /// The control is named `name`, labelled through the translator unless
    /// hidden, pre-filled from `entity` when default values are on (always
    /// for an identifier), and carries the property's rules.
    pub fn build_control(
        &self,
        meta: &PropertyMetadata,
        path: &ControlPath,
        name: &str,
        entity: &dyn Entity,
    ) -> FormBuilderResult<Control> {
        let kind = meta.input_kind.ok_or_else(|| {
            FormBuilderError::ConfigurationError(format!(
                "Property '{path}' has storage type '{}' that no control can edit.",
                meta.column_type
                    .as_ref()
                    .map_or_else(String::new, ToString::to_string)
            ))
        })?;

        let label = if kind == InputKind::Hidden {
            None
        } else {
            self.label(path)?
        };
        let mut control = Control::new(name, kind).with_label(label);

        if self.settings.set_default_values || meta.is_identifier {
            if let Some(value) = entity.get(path.property()) {
                control.set_default_value(self.format_default(value));
            }
        }

        self.attach_rules(&mut control, &meta.rules)?;
        Ok(control)
    }

    /// The error recorded on a control whose submitted value its attribute
    /// cannot hold.
    pub fn invalid_value_message(&self, submitted: &str) -> String {
        let params = Params::new().with("value", submitted);
        match self.translator {
            Some(t) => t.translate(INVALID_VALUE_MESSAGE, &params),
            None => substitute(INVALID_VALUE_MESSAGE, &params),
        }
    }

    /// Replaces the control's rules with `rules`.
    ///
    /// A `Required` rule makes the control mandatory; without one the
    /// control is marked optional.
    pub fn attach_rules(&self, control: &mut Control, rules: &[Rule]) -> FormBuilderResult<()> {
        control.clear_rules();
        for rule in rules {
            let message = rule.resolve_message(self.translator);
            if rule.kind == RuleKind::Required {
                control.set_required(message);
            } else {
                control.add_rule(ControlRule::new(rule.kind, rule.params.clone(), message)?);
            }
        }
        if !control.is_required() {
            control.set_optional();
        }
        Ok(())
    }
}

// ── Write-back ──────────────────────────────────────────────────────────

/// Message template for a submitted value its attribute cannot hold.
pub const INVALID_VALUE_MESSAGE: &str = "The value %value% is not valid.";

/// Converts a submitted value for the property `path` points at without
/// writing it.
///
/// Date and date-time attributes parse the configured formats first, so a
/// default rendered with them submits back unchanged. Returns `Ok(None)`
/// when there is nothing to write: the relation holds no entity, or the
/// value is empty and the attribute cannot hold it. Fails with
/// `InvalidValue` when a filled value does not fit the attribute.
pub fn stage_value(
    registry: &EntityRegistry,
    path: &ControlPath,
    value: Value,
    settings: &Settings,
) -> FormBuilderResult<Option<Value>> {
    let main = registry.main()?;
    let target = match path.relation() {
        None => Some(main),
        Some(r) => main.related(r),
    };
    let Some(target) = target else {
        tracing::trace!(path = %path, "Related entity is empty, nothing to stage");
        return Ok(None);
    };

    let column_type = target
        .descriptor()
        .property(path.property())
        .and_then(PropertyDescriptor::column_type);
    let value = parse_configured_format(value, column_type, settings);

    let filled = value.is_filled();
    match target.check_value(path.property(), &value) {
        Ok(()) => Ok(Some(value)),
        Err(FormBuilderError::InvalidValue(reason)) if !filled => {
            tracing::trace!(path = %path, reason = %reason, "Empty value does not fit attribute, skipping");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn parse_configured_format(
    value: Value,
    column_type: Option<&ColumnType>,
    settings: &Settings,
) -> Value {
    let Value::String(text) = &value else {
        return value;
    };
    let text = text.trim();
    match column_type {
        Some(ColumnType::Date) => NaiveDate::parse_from_str(text, &settings.date_format)
            .map_or(value, Value::Date),
        Some(ColumnType::DateTime) => {
            NaiveDateTime::parse_from_str(text, &settings.datetime_format)
                .map_or(value, Value::DateTime)
        }
        _ => value,
    }
}

/// Writes a submitted value into the property `path` points at.
///
/// A relation that currently holds nothing is skipped. An empty value the
/// attribute cannot hold is skipped too, leaving the attribute unchanged.
pub fn write_back(
    registry: &mut EntityRegistry,
    path: &ControlPath,
    value: Value,
) -> FormBuilderResult<()> {
    let main = registry.main_mut()?;
    let target = match path.relation() {
        None => Some(main),
        Some(r) => main.related_mut(r),
    };
    let Some(target) = target else {
        tracing::trace!(path = %path, "Related entity is empty, skipping write-back");
        return Ok(());
    };

    let filled = value.is_filled();
    match target.set(path.property(), value) {
        Err(FormBuilderError::InvalidValue(reason)) if !filled => {
            tracing::trace!(path = %path, reason = %reason, "Empty value does not fit attribute, skipping");
            Ok(())
        }
        result => {
            if result.is_ok() {
                tracing::trace!(path = %path, "Wrote submitted value");
            }
            result
        }
    }
}
