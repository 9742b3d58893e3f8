//! Validation rules.
//!
//! A [`Rule`] is the declarative form collected from entity metadata: a
//! kind, its parameters and an untranslated message template. A
//! [`ControlRule`] is a rule attached to a control, with its final message
//! and the validator that checks it.

use formbuilder_core::i18n::{substitute, Translator};
use formbuilder_core::FormBuilderResult;
use formbuilder_meta::constraints::{Constraint, RuleKind, RuleParams};
use formbuilder_meta::validators::{validator_for, Validator};
use formbuilder_meta::value::Value;
use serde::Serialize;

/// A rule as declared on an entity property.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// The rule kind.
    pub kind: RuleKind,
    /// Kind-specific parameters.
    pub params: RuleParams,
    /// The message template, usually a translation key.
    pub message: String,
}

impl Rule {
    /// Creates a rule.
    pub fn new(kind: RuleKind, params: RuleParams, message: impl Into<String>) -> Self {
        Self {
            kind,
            params,
            message: message.into(),
        }
    }

    /// Resolves the message template, substituting `%value%`, `%min%` and
    /// `%max%`. With a translator the template is translated first.
    pub fn resolve_message(&self, translator: Option<&dyn Translator>) -> String {
        let params = self.params.placeholders();
        match translator {
            Some(t) => t.translate(&self.message, &params),
            None => substitute(&self.message, &params),
        }
    }
}

impl From<&Constraint> for Rule {
    fn from(constraint: &Constraint) -> Self {
        Self::new(
            constraint.kind.rule_kind(),
            constraint.params.clone(),
            constraint.message.clone(),
        )
    }
}

/// A rule attached to a control.
#[derive(Debug)]
pub struct ControlRule {
    kind: RuleKind,
    params: RuleParams,
    message: String,
    validator: Box<dyn Validator>,
}

impl ControlRule {
    /// Creates a rule with a final message, building its validator.
    ///
    /// Fails with `InvalidValue` when the parameters do not fit the kind.
    pub fn new(kind: RuleKind, params: RuleParams, message: impl Into<String>) -> FormBuilderResult<Self> {
        let validator = validator_for(kind, &params)?;
        Ok(Self {
            kind,
            params,
            message: message.into(),
            validator,
        })
    }

    /// The rule kind.
    pub const fn kind(&self) -> RuleKind {
        self.kind
    }

    /// The rule parameters.
    pub const fn params(&self) -> &RuleParams {
        &self.params
    }

    /// The final error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the value satisfies the rule.
    pub fn is_satisfied(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }

    /// A serializable description used in rendered markup.
    pub fn describe(&self) -> RuleDescription<'_> {
        RuleDescription {
            op: self.kind.code(),
            msg: &self.message,
            arg: match &self.params {
                RuleParams::None => None,
                RuleParams::Value(v) => Some(serde_json::Value::String(v.to_form_string())),
                RuleParams::Range { min, max } => Some(serde_json::json!([
                    min.as_ref().map(Value::to_form_string),
                    max.as_ref().map(Value::to_form_string),
                ])),
            },
        }
    }
}

/// The client-side description of a rule.
#[derive(Debug, Serialize)]
pub struct RuleDescription<'a> {
    /// The rule code.
    pub op: &'static str,
    /// The error message.
    pub msg: &'a str,
    /// The parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<serde_json::Value>,
}
