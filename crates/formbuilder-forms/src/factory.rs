//! A factory for configured form builders.
//!
//! [`FormBuilderFactory`] holds what every builder of an application
//! shares: the default [`Settings`] and the translator. Per-form overrides
//! go through [`BuilderOptions`].

use std::fmt;
use std::sync::Arc;

use formbuilder_core::i18n::Translator;
use formbuilder_core::{FormBuilderResult, Settings};
use formbuilder_meta::entity::{Entity, EntityClass};

use crate::builder::FormBuilder;

/// Per-form overrides applied before the entity is set.
///
/// `None` keeps the factory's setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Overrides automatic metadata derivation.
    pub auto_mode: Option<bool>,
    /// Overrides writing submitted values back onto the entities.
    pub auto_data_setting: Option<bool>,
    /// Overrides the date-time format of default values.
    pub datetime_format: Option<String>,
}

/// Creates form builders sharing settings and a translator.
#[derive(Clone, Default)]
pub struct FormBuilderFactory {
    settings: Settings,
    translator: Option<Arc<dyn Translator>>,
}

impl fmt::Debug for FormBuilderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBuilderFactory")
            .field("settings", &self.settings)
            .field("has_translator", &self.translator.is_some())
            .finish()
    }
}

impl FormBuilderFactory {
    /// Creates a factory with the given default settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            translator: None,
        }
    }

    /// Sets the translator handed to every builder.
    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// The default settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Creates a builder for `entity`.
    pub fn create<E: Entity>(
        &self,
        name: &str,
        entity: E,
        options: BuilderOptions,
    ) -> FormBuilderResult<FormBuilder> {
        let mut builder = self.configured(name, options);
        builder.set_entity(entity)?;
        Ok(builder)
    }

    /// Creates a builder for a fresh default instance of `T`.
    pub fn create_class<T: EntityClass>(
        &self,
        name: &str,
        options: BuilderOptions,
    ) -> FormBuilderResult<FormBuilder> {
        let mut builder = self.configured(name, options);
        builder.set_entity_class::<T>()?;
        Ok(builder)
    }

    fn configured(&self, name: &str, options: BuilderOptions) -> FormBuilder {
        let mut builder = FormBuilder::new(name, self.settings.clone());
        if let Some(translator) = &self.translator {
            builder.set_translator(Arc::clone(translator));
        }
        if let Some(enabled) = options.auto_mode {
            builder.set_auto_mode(enabled);
        }
        if let Some(enabled) = options.auto_data_setting {
            builder.set_auto_data_setting(enabled);
        }
        if let Some(format) = options.datetime_format {
            builder.set_datetime_format(format);
        }
        tracing::debug!(form = name, "Created form builder");
        builder
    }
}
