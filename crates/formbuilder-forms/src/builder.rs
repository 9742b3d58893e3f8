//! The form builder.
//!
//! A [`FormBuilder`] takes a main entity (and optionally related entities
//! reached through its one-to-one relations), derives metadata from their
//! annotations, and materializes a [`Form`] with one control per editable
//! property. On a valid submission it writes the submitted values back onto
//! the entities.
//!
//! The builder has two states. While [`BuilderState::Configuring`], every
//! setter applies. The first call that needs controls (`form`, `control`,
//! `render`, `submit` or an explicit `materialize`) builds them and moves
//! the builder to [`BuilderState::Materialized`]; from then on most settings
//! no longer have an effect.
//!
//! # Examples
//!
//! ```ignore
//! let mut builder = FormBuilder::new("test", Settings::default())
//!     .with_translator(Arc::new(translator));
//! builder.set_entity(User::default())?;
//! assert_eq!(builder.control("name")?.name(), "user_name");
//!
//! let data = SubmittedData::parse("user_name=abcdef&_form_=test&_token_=...");
//! if builder.submit(&data)? {
//!     let user = builder.entity()?.downcast_ref::<User>().unwrap();
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use formbuilder_core::i18n::Translator;
use formbuilder_core::logging::builder_span;
use formbuilder_core::{FormBuilderError, FormBuilderResult, Settings};
use formbuilder_meta::entity::{Entity, EntityClass, PropertyDescriptor};
use formbuilder_meta::value::Value;

use crate::control::Control;
use crate::form::Form;
use crate::metadata::{derive_metadata, MetadataTable};
use crate::planner::{
    control_name, split_control_name, stage_value, write_back, Binding, BindingTable, ControlPath,
    Planner, Transform,
};
use crate::registry::{EntityEntry, EntityHandle, EntityRegistry};
use crate::submission::SubmittedData;

/// The lifecycle state of a [`FormBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuilderState {
    /// Settings, entities, exclusions and mappings can change freely.
    #[default]
    Configuring,
    /// Controls exist; most settings no longer apply.
    Materialized,
}

/// Builds a form from entity metadata and binds it back to the entities.
pub struct FormBuilder {
    name: String,
    settings: Settings,
    translator: Option<Arc<dyn Translator>>,
    registry: EntityRegistry,
    metadata: MetadataTable,
    bindings: BindingTable,
    excluded: BTreeSet<ControlPath>,
    form: Form,
    state: BuilderState,
    binder_installed: bool,
    span: tracing::Span,
}

impl fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBuilder")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("excluded", &self.excluded)
            .field("has_translator", &self.translator.is_some())
            .finish_non_exhaustive()
    }
}

impl FormBuilder {
    /// Creates a builder for the form with the given logical name.
    pub fn new(name: impl Into<String>, settings: Settings) -> Self {
        let name = name.into();
        Self {
            form: Form::new(name.clone()),
            span: builder_span(&name),
            name,
            settings,
            translator: None,
            registry: EntityRegistry::new(),
            metadata: MetadataTable::new(),
            bindings: BindingTable::new(),
            excluded: BTreeSet::new(),
            state: BuilderState::Configuring,
            binder_installed: false,
        }
    }

    /// Sets the translator used for labels and rule messages.
    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Sets the translator used for labels and rule messages.
    pub fn set_translator(&mut self, translator: Arc<dyn Translator>) -> &mut Self {
        self.translator = Some(translator);
        self
    }

    /// Returns `true` if a translator is set.
    pub const fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    /// The logical form name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The effective settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The lifecycle state.
    pub const fn state(&self) -> BuilderState {
        self.state
    }

    /// Returns `true` once controls exist.
    pub fn is_materialized(&self) -> bool {
        self.state == BuilderState::Materialized
    }

    // ── Entities ────────────────────────────────────────────────────

    /// Sets the main entity.
    ///
    /// In auto mode metadata is derived for every property; in manual mode
    /// only for the identifier. Fails with `ConfigurationError` if a main
    /// entity is already set.
    pub fn set_entity<E: Entity>(&mut self, entity: E) -> FormBuilderResult<&mut Self> {
        self.set_boxed_entity(Box::new(entity))
    }

    /// Sets a fresh default instance of `T` as the main entity.
    pub fn set_entity_class<T: EntityClass>(&mut self) -> FormBuilderResult<&mut Self> {
        self.set_boxed_entity(Box::new(T::default()))
    }

    /// Sets an already boxed main entity.
    pub fn set_boxed_entity(&mut self, entity: Box<dyn Entity>) -> FormBuilderResult<&mut Self> {
        let span = self.span.clone();
        let _enter = span.enter();

        let descriptor = self.registry.set_main(entity)?.descriptor;
        if self.settings.auto_mode {
            for property in descriptor.properties() {
                self.register_property(EntityHandle::MAIN, property);
            }
        } else if let Some(id) = descriptor.id_property() {
            self.register_property(EntityHandle::MAIN, id);
        }
        Ok(self)
    }

    /// Registers the related entity held by the main entity's relation
    /// `property`, constructing it when the relation is empty.
    ///
    /// In auto mode metadata is derived for all of its properties; in
    /// manual mode for none.
    pub fn add_related_entity(&mut self, property: &str) -> FormBuilderResult<&mut Self> {
        let span = self.span.clone();
        let _enter = span.enter();

        let entry = self.registry.add_related(property)?;
        let (handle, descriptor) = (entry.handle, entry.descriptor);
        if self.settings.auto_mode {
            for prop in descriptor.properties() {
                self.register_property(handle, prop);
            }
        }
        Ok(self)
    }

    /// Derives metadata for a property once and binds its control through
    /// the naming scheme when it will get one.
    fn register_property(&mut self, handle: EntityHandle, property: &PropertyDescriptor) {
        if self.metadata.contains(handle, property.name) {
            return;
        }
        let expose = handle == EntityHandle::MAIN && self.settings.allow_id;
        let meta = derive_metadata(property, expose);
        if meta.is_control_candidate() {
            if let Some(name) = self.automatic_name(handle, property.name) {
                self.bindings.add_automatic(name);
            }
        }
        self.metadata.insert(handle, meta);
    }

    fn automatic_name(&self, handle: EntityHandle, property: &str) -> Option<String> {
        let entry = self.registry.entry(handle)?;
        let main = self.registry.main_entry().ok()?;
        let path = path_for(entry, property);
        Some(control_name(&main.short_name(), &path))
    }

    /// The main entity.
    pub fn entity(&self) -> FormBuilderResult<&dyn Entity> {
        self.registry.main()
    }

    /// The main entity, mutably.
    pub fn entity_mut(&mut self) -> FormBuilderResult<&mut dyn Entity> {
        self.registry.main_mut()
    }

    /// The related entity registered under relation `property`.
    pub fn related_entity(&self, property: &str) -> FormBuilderResult<&dyn Entity> {
        let handle = self.registry.entry_for(Some(property))?.handle;
        self.registry.entity(handle).ok_or_else(|| {
            FormBuilderError::InvalidReference(format!("Sub-entity '{property}' is empty."))
        })
    }

    /// The number of registered entities, the main one included.
    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    /// The entry of the entity a control name belongs to.
    pub fn entity_entry_by_control_name(&self, name: &str) -> FormBuilderResult<&EntityEntry> {
        let not_found = || {
            FormBuilderError::InvalidReference(format!(
                "Control '{name}' does not belong to any registered entity."
            ))
        };
        let path = self.split(name).ok_or_else(not_found)?;
        let entry = self.registry.entry_for(path.relation()).map_err(|_| not_found())?;
        if entry.descriptor.property(path.property()).is_none() {
            return Err(not_found());
        }
        Ok(entry)
    }

    /// Consumes the builder and returns the main entity.
    pub fn into_entity(self) -> FormBuilderResult<Box<dyn Entity>> {
        self.registry.into_main().ok_or_else(|| {
            FormBuilderError::ConfigurationError("No main entity set".to_string())
        })
    }

    // ── Settings ────────────────────────────────────────────────────

    fn configure(&mut self, setting: &str, apply: impl FnOnce(&mut Settings)) -> &mut Self {
        if self.is_materialized() {
            tracing::debug!(form = %self.name, setting, "Controls already created, setting has no effect");
        } else {
            apply(&mut self.settings);
        }
        self
    }

    /// Turns label generation on or off.
    pub fn set_create_labels(&mut self, enabled: bool) -> &mut Self {
        self.configure("create_labels", |s| s.create_labels = enabled)
    }

    /// Turns pre-filling controls from entity values on or off.
    pub fn set_default_values(&mut self, enabled: bool) -> &mut Self {
        self.configure("set_default_values", |s| s.set_default_values = enabled)
    }

    /// Exposes the main entity's identifier as a hidden control.
    ///
    /// Already derived identifier metadata is derived again.
    pub fn allow_id(&mut self, enabled: bool) -> &mut Self {
        if self.is_materialized() {
            return self.configure("allow_id", |_| {});
        }
        self.settings.allow_id = enabled;

        let id = self
            .registry
            .main_entry()
            .ok()
            .and_then(|entry| entry.descriptor.id_property());
        if let Some(id) = id {
            if self.metadata.contains(EntityHandle::MAIN, id.name) {
                let meta = derive_metadata(id, enabled);
                if meta.is_control_candidate() {
                    if let Some(name) = self.automatic_name(EntityHandle::MAIN, id.name) {
                        self.bindings.add_automatic(name);
                    }
                }
                self.metadata.replace(EntityHandle::MAIN, meta);
            }
        }
        self
    }

    /// Turns the CSRF protection field on or off.
    pub fn enable_csrf_protection(&mut self, enabled: bool) -> &mut Self {
        self.configure("csrf_protection", |s| s.csrf_protection = enabled)
    }

    /// Turns automatic metadata derivation on or off for entities set
    /// afterwards.
    pub fn set_auto_mode(&mut self, enabled: bool) -> &mut Self {
        self.configure("auto_mode", |s| s.auto_mode = enabled)
    }

    /// Turns writing submitted values back onto the entities on or off.
    pub fn set_auto_data_setting(&mut self, enabled: bool) -> &mut Self {
        self.configure("auto_data_setting", |s| s.auto_data_setting = enabled)
    }

    /// Sets the chrono format of date-time default values.
    pub fn set_datetime_format(&mut self, format: impl Into<String>) -> &mut Self {
        let format = format.into();
        self.configure("datetime_format", |s| s.datetime_format = format)
    }

    /// Sets the chrono format of date default values.
    pub fn set_date_format(&mut self, format: impl Into<String>) -> &mut Self {
        let format = format.into();
        self.configure("date_format", |s| s.date_format = format)
    }

    /// Sets the HTTP method of the form.
    pub fn set_method(&mut self, method: http::Method) -> &mut Self {
        self.form.set_method(method);
        self
    }

    // ── Paths, exclusion and mapping ────────────────────────────────

    /// Derives metadata for additional property paths, typically in manual
    /// mode.
    pub fn include<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) -> FormBuilderResult<&mut Self> {
        for raw in paths {
            let path = ControlPath::parse(raw)?;
            let (handle, property) = self.resolve_property(&path)?;
            self.register_property(handle, property);
        }
        Ok(self)
    }

    fn resolve_property(
        &self,
        path: &ControlPath,
    ) -> FormBuilderResult<(EntityHandle, &'static PropertyDescriptor)> {
        let entry = self.registry.entry_for(path.relation())?;
        let property = entry.descriptor.property(path.property()).ok_or_else(|| {
            FormBuilderError::InvalidReference(format!(
                "Entity '{}' has no property '{}'.",
                entry.descriptor.name,
                path.property()
            ))
        })?;
        Ok((entry.handle, property))
    }

    /// Excludes property paths from the form.
    ///
    /// Explicit mappings targeting a path are dropped with it. Once
    /// controls exist, the path's control is removed as well.
    pub fn exclude<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) -> FormBuilderResult<&mut Self> {
        let span = self.span.clone();
        let _enter = span.enter();

        for raw in paths {
            let path = ControlPath::parse(raw)?;
            for name in self.bindings.remove_targeting(&path) {
                tracing::debug!(control = %name, path = %path, "Dropped mapping of excluded path");
            }
            if let Ok(entry) = self.registry.entry_for(path.relation()) {
                let handle = entry.handle;
                self.metadata.remove(handle, path.property());
            }
            if let Ok(name) = self.control_name(&path) {
                self.bindings.remove_automatic(&name);
                if self.is_materialized() && self.form.remove_control(&name).is_some() {
                    tracing::debug!(control = %name, "Removed control of excluded path");
                }
            }
            self.excluded.insert(path);
        }
        Ok(self)
    }

    /// Maps a control to a property path, overriding the naming scheme.
    ///
    /// `path` defaults to the control name. `transform` is applied to the
    /// submitted value before it is written. Once controls exist, the
    /// path's metadata is derived if needed and its rules are attached to
    /// the control again.
    pub fn set_mapping(
        &mut self,
        control: &str,
        path: Option<&str>,
        transform: Option<Transform>,
    ) -> FormBuilderResult<&mut Self> {
        let target = ControlPath::parse(path.unwrap_or(control))?;
        let resolved = if self.is_materialized() {
            Some(self.resolve_property(&target)?)
        } else {
            None
        };
        tracing::debug!(control, path = %target, "Set explicit mapping");
        self.bindings.set_explicit(
            control,
            Binding {
                target,
                transform,
            },
        );

        if let Some((handle, property)) = resolved {
            self.register_property(handle, property);
            let rules = self
                .metadata
                .get(handle, property.name)
                .map(|m| m.rules.clone())
                .unwrap_or_default();
            if self.form.has_control(control) {
                let planner = Planner::new(&self.settings, self.translator.as_deref(), &self.name);
                planner.attach_rules(self.form.control_mut(control)?, &rules)?;
            }
        }
        Ok(self)
    }

    /// Overwrites labels of controls addressed by property path.
    pub fn set_labels<'a>(
        &mut self,
        labels: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> FormBuilderResult<&mut Self> {
        for (path, label) in labels {
            self.control_mut(path)?.set_label(label);
        }
        Ok(self)
    }

    // ── Materialization ─────────────────────────────────────────────

    /// Creates the controls. A second call does nothing.
    ///
    /// Fails with `ConfigurationError` when no main entity is set, when
    /// labels are on without a translator, or when a property's storage
    /// type has no control kind. On failure the builder stays configurable.
    pub fn materialize(&mut self) -> FormBuilderResult<&mut Self> {
        if self.is_materialized() {
            return Ok(self);
        }
        let span = self.span.clone();
        let _enter = span.enter();

        let main_short_name = self.registry.main_entry()?.short_name();
        let planner = Planner::new(&self.settings, self.translator.as_deref(), &self.name);

        let mut controls = Vec::new();
        for entry in self.registry.entries() {
            let Some(entity) = self.registry.entity(entry.handle) else {
                tracing::trace!(entity = %entry.handle, "Related entity is empty, no controls");
                continue;
            };
            for meta in self.metadata.for_entity(entry.handle) {
                if !meta.is_control_candidate() {
                    continue;
                }
                let path = path_for(entry, &meta.name);
                if self.excluded.contains(&path) {
                    continue;
                }
                let name = control_name(&main_short_name, &path);
                controls.push(planner.build_control(meta, &path, &name, entity)?);
            }
        }
        let submit_label = planner.submit_label();

        let created = controls.len();
        for control in controls {
            self.form.add_control(control)?;
        }
        if self.settings.csrf_protection {
            if self.settings.secret_key.is_empty() {
                tracing::warn!(form = %self.name, "Signing protection tokens with an empty secret key");
            }
            self.form.add_protection(&self.settings.secret_key)?;
        }
        self.form.add_submit(&format!("{}_submit", self.name), submit_label)?;

        self.binder_installed = self.settings.auto_data_setting;
        self.state = BuilderState::Materialized;
        tracing::debug!(
            form = %self.name,
            controls = created,
            entities = self.registry.len(),
            protected = self.form.is_protected(),
            binder = self.binder_installed,
            "Materialized form controls"
        );
        Ok(self)
    }

    /// The form, materializing it first.
    pub fn form(&mut self) -> FormBuilderResult<&Form> {
        self.materialize()?;
        Ok(&self.form)
    }

    /// The form, mutably, materializing it first.
    pub fn form_mut(&mut self) -> FormBuilderResult<&mut Form> {
        self.materialize()?;
        Ok(&mut self.form)
    }

    /// The control name a property path maps to.
    pub fn control_name(&self, path: &ControlPath) -> FormBuilderResult<String> {
        let main = self.registry.main_entry()?;
        Ok(control_name(&main.short_name(), path))
    }

    /// The control for a property path (`"name"` or `"car.color"`),
    /// materializing first.
    pub fn control(&mut self, path: &str) -> FormBuilderResult<&Control> {
        let name = self.control_name(&ControlPath::parse(path)?)?;
        self.control_exact(&name)
    }

    /// The control for a property path, mutably.
    pub fn control_mut(&mut self, path: &str) -> FormBuilderResult<&mut Control> {
        let name = self.control_name(&ControlPath::parse(path)?)?;
        self.materialize()?;
        self.form.control_mut(&name)
    }

    /// The control with exactly the given name, materializing first.
    pub fn control_exact(&mut self, name: &str) -> FormBuilderResult<&Control> {
        self.materialize()?;
        self.form.control(name)
    }

    /// Renders the form, materializing it first.
    pub fn render(&mut self) -> FormBuilderResult<String> {
        self.materialize()?;
        Ok(self.form.render())
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submits data to the form and, when it is valid, writes the values of
    /// bound controls back onto the entities.
    ///
    /// Every bound value is converted before any is written. A filled value
    /// its attribute cannot hold is reported as an error on its control and
    /// the submission is invalid, with no entity touched. `on_success` hooks
    /// run after the write-back.
    pub fn submit(&mut self, data: &SubmittedData) -> FormBuilderResult<bool> {
        self.materialize()?;
        let span = self.span.clone();
        let _enter = span.enter();

        if !self.form.validate_submission(data) {
            return Ok(false);
        }
        if self.binder_installed {
            let Some(writes) = self.stage_submitted_values()? else {
                return Ok(false);
            };
            for (path, value) in writes {
                write_back(&mut self.registry, &path, value)?;
            }
        }
        self.form.complete_submission();
        Ok(true)
    }

    /// Converts the values of bound controls. Returns `None` when a control
    /// was rejected.
    fn stage_submitted_values(&mut self) -> FormBuilderResult<Option<Vec<(ControlPath, Value)>>> {
        let mut writes = Vec::new();
        let mut rejected = false;
        for (name, value) in self.form.values() {
            let (path, value) = if let Some(binding) = self.bindings.explicit(&name) {
                let value = match &binding.transform {
                    Some(transform) => transform(value),
                    None => value,
                };
                (binding.target.clone(), value)
            } else if self.bindings.is_automatic(&name) {
                match self.split(&name) {
                    Some(path) => (path, value),
                    None => continue,
                }
            } else {
                tracing::trace!(control = %name, "Control is not bound, skipping");
                continue;
            };

            let shown = value.to_form_string();
            match stage_value(&self.registry, &path, value, &self.settings) {
                Ok(Some(value)) => writes.push((path, value)),
                Ok(None) => {}
                Err(FormBuilderError::InvalidValue(reason)) => {
                    tracing::debug!(control = %name, reason = %reason, "Submitted value rejected");
                    let planner =
                        Planner::new(&self.settings, self.translator.as_deref(), &self.name);
                    let message = planner.invalid_value_message(&shown);
                    self.form.control_mut(&name)?.add_error(message);
                    rejected = true;
                }
                Err(e) => return Err(e),
            }
        }
        Ok((!rejected).then_some(writes))
    }

    fn split(&self, name: &str) -> Option<ControlPath> {
        let main = self.registry.main_entry().ok()?;
        let relations = self
            .registry
            .entries()
            .iter()
            .filter_map(|e| e.relation.as_deref());
        split_control_name(name, &main.short_name(), relations)
    }
}

fn path_for(entry: &EntityEntry, property: &str) -> ControlPath {
    match &entry.relation {
        Some(r) => ControlPath::related(r.clone(), property),
        None => ControlPath::main(property),
    }
}
