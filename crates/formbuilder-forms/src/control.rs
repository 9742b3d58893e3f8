//! Form controls.
//!
//! A [`Control`] is one named input: its widget, label, default and
//! submitted value, requirement, attached rules and validation errors.

use std::collections::BTreeMap;

use formbuilder_core::utils::text::escape_html;
use formbuilder_meta::value::Value;

use crate::rules::ControlRule;
use crate::submission::SubmittedData;
use crate::widgets::{create_widget, InputKind, Select, Widget};

/// Whether a control must be filled.
///
/// Controls start `Unspecified`; the form builder always resolves it to
/// `Required` or `Optional`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requirement {
    /// Not decided yet.
    #[default]
    Unspecified,
    /// The control must be filled; carries the error message.
    Required(String),
    /// The control may be left empty.
    Optional,
}

/// One form input.
#[derive(Debug)]
pub struct Control {
    name: String,
    kind: InputKind,
    widget: Box<dyn Widget>,
    label: Option<String>,
    default_value: Value,
    value: Option<Value>,
    requirement: Requirement,
    rules: Vec<ControlRule>,
    errors: Vec<String>,
}

impl Control {
    /// Creates a control of the given kind with its default widget.
    pub fn new(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            widget: create_widget(kind),
            label: None,
            default_value: Value::Null,
            value: None,
            requirement: Requirement::Unspecified,
            rules: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    /// The control name, also its HTML `name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The control kind.
    pub const fn kind(&self) -> InputKind {
        self.kind
    }

    /// The HTML `id` of the rendered element.
    pub fn html_id(&self) -> String {
        format!("frm-{}", self.name)
    }

    /// The label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Replaces the label.
    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    /// The default value.
    pub const fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Sets the default value.
    pub fn set_default_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default_value = value.into();
        self
    }

    /// The submitted value, or the default before submission.
    pub fn value(&self) -> &Value {
        self.value.as_ref().unwrap_or(&self.default_value)
    }

    /// Sets the current value directly.
    pub fn set_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = Some(value.into());
        self
    }

    /// Replaces the items of a select control. No effect on other kinds.
    pub fn set_items(&mut self, items: Vec<(String, String)>) -> &mut Self {
        if self.kind == InputKind::Select {
            self.widget = Box::new(Select::new(items));
        }
        self
    }

    /// The requirement.
    pub const fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Returns `true` if the control must be filled.
    pub const fn is_required(&self) -> bool {
        matches!(self.requirement, Requirement::Required(_))
    }

    /// Marks the control mandatory with an error message.
    pub fn set_required(&mut self, message: impl Into<String>) -> &mut Self {
        self.requirement = Requirement::Required(message.into());
        self
    }

    /// Marks the control explicitly optional.
    pub fn set_optional(&mut self) -> &mut Self {
        self.requirement = Requirement::Optional;
        self
    }

    /// Attaches a rule.
    pub fn add_rule(&mut self, rule: ControlRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// The attached rules, in attachment order.
    pub fn rules(&self) -> &[ControlRule] {
        &self.rules
    }

    /// Removes every rule and resets the requirement.
    pub fn clear_rules(&mut self) {
        self.rules.clear();
        self.requirement = Requirement::Unspecified;
    }

    /// Validation errors from the last submission.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Records an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Reads the submitted value through the widget.
    pub fn load(&mut self, data: &SubmittedData) {
        if self.kind.is_button() {
            return;
        }
        self.value = Some(self.widget.value_from_data(data, &self.name));
    }

    /// Runs the requirement and the rules against the current value.
    ///
    /// An empty optional control skips its rules. Returns `true` when no
    /// error was recorded.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        let value = self.value().clone();
        if !value.is_filled() {
            if let Requirement::Required(message) = &self.requirement {
                self.errors.push(message.clone());
            }
            return self.errors.is_empty();
        }
        let failed: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| !rule.is_satisfied(&value))
            .map(|rule| rule.message().to_string())
            .collect();
        self.errors.extend(failed);
        self.errors.is_empty()
    }

    /// Renders the label, the widget and any errors.
    pub fn render(&self) -> String {
        let mut attrs = BTreeMap::new();
        attrs.insert("id".to_string(), self.html_id());
        if let Requirement::Required(message) = &self.requirement {
            attrs.insert("required".to_string(), String::new());
            attrs.insert("data-required".to_string(), message.clone());
        }
        if !self.rules.is_empty() {
            let described: Vec<_> = self.rules.iter().map(ControlRule::describe).collect();
            if let Ok(json) = serde_json::to_string(&described) {
                attrs.insert("data-rules".to_string(), json);
            }
        }

        let mut html = String::new();
        if let Some(label) = &self.label {
            if !self.kind.is_button() && self.kind != InputKind::Hidden {
                html.push_str(&format!(
                    r#"<label for="{}">{}</label>"#,
                    escape_html(&self.html_id()),
                    escape_html(label)
                ));
            }
        }
        let value = if self.kind.is_button() {
            self.label.clone().map_or(Value::Null, Value::String)
        } else {
            self.value().clone()
        };
        html.push_str(&self.widget.render(&self.name, &value, &attrs));
        for error in &self.errors {
            html.push_str(&format!(r#"<span class="error">{}</span>"#, escape_html(error)));
        }
        html
    }
}
