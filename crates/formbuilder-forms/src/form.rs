//! The form: an ordered set of controls with submission handling.
//!
//! [`Form`] is the widget-layer collaborator of the form builder. It
//! creates controls, renders them, reads submitted values, validates them,
//! checks the CSRF token and fires the `on_validate` / `on_success` hooks.

use std::fmt;

use formbuilder_core::utils::text::escape_html;
use formbuilder_core::{FormBuilderError, FormBuilderResult};
use formbuilder_meta::value::Value;

use crate::control::Control;
use crate::csrf::{Protection, PROTECTION_MESSAGE, PROTECTOR_ID, TRACKER_ID};
use crate::submission::SubmittedData;
use crate::widgets::InputKind;

type ValidateHook = Box<dyn FnMut(&mut Form)>;
type SuccessHook = Box<dyn FnMut(&Form)>;

/// A form.
///
/// # Examples
///
/// ```
/// use formbuilder_forms::form::Form;
/// use formbuilder_forms::submission::SubmittedData;
///
/// let mut form = Form::new("contact");
/// form.add_text("email", Some("E-mail".into())).unwrap().set_required("Fill it in.");
/// form.add_submit("send", Some("Send".into())).unwrap();
///
/// assert!(!form.submit(&SubmittedData::parse("email=")));
/// assert!(form.submit(&SubmittedData::parse("email=a%40b.cz")));
/// ```
pub struct Form {
    name: String,
    method: http::Method,
    action: String,
    controls: Vec<Control>,
    protection: Option<Protection>,
    submitted: bool,
    form_errors: Vec<String>,
    on_validate: Vec<ValidateHook>,
    on_success: Vec<SuccessHook>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("controls", &self.controls)
            .field("submitted", &self.submitted)
            .finish_non_exhaustive()
    }
}

impl Form {
    /// Creates an empty form submitted by POST.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: http::Method::POST,
            action: String::new(),
            controls: Vec::new(),
            protection: None,
            submitted: false,
            form_errors: Vec::new(),
            on_validate: Vec::new(),
            on_success: Vec::new(),
        }
    }

    /// The form name, sent back in the tracker field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The HTTP method.
    pub const fn method(&self) -> &http::Method {
        &self.method
    }

    /// Sets the HTTP method.
    pub fn set_method(&mut self, method: http::Method) -> &mut Self {
        self.method = method;
        self
    }

    /// Sets the form action URL.
    pub fn set_action(&mut self, action: impl Into<String>) -> &mut Self {
        self.action = action.into();
        self
    }

    // ── Controls ────────────────────────────────────────────────────

    /// Adds a control. Fails with `ConfigurationError` on a duplicate name.
    pub fn add_control(&mut self, control: Control) -> FormBuilderResult<&mut Control> {
        if self.has_control(control.name()) {
            return Err(FormBuilderError::ConfigurationError(format!(
                "Component with name '{}' already exists.",
                control.name()
            )));
        }
        self.controls.push(control);
        let last = self.controls.len() - 1;
        Ok(&mut self.controls[last])
    }

    fn add_kind(
        &mut self,
        name: &str,
        kind: InputKind,
        label: Option<String>,
    ) -> FormBuilderResult<&mut Control> {
        self.add_control(Control::new(name, kind).with_label(label))
    }

    /// Adds a text input.
    pub fn add_text(&mut self, name: &str, label: Option<String>) -> FormBuilderResult<&mut Control> {
        self.add_kind(name, InputKind::Text, label)
    }

    /// Adds a textarea.
    pub fn add_text_area(&mut self, name: &str, label: Option<String>) -> FormBuilderResult<&mut Control> {
        self.add_kind(name, InputKind::TextArea, label)
    }

    /// Adds a checkbox.
    pub fn add_checkbox(&mut self, name: &str, label: Option<String>) -> FormBuilderResult<&mut Control> {
        self.add_kind(name, InputKind::Checkbox, label)
    }

    /// Adds a hidden field.
    pub fn add_hidden(&mut self, name: &str) -> FormBuilderResult<&mut Control> {
        self.add_kind(name, InputKind::Hidden, None)
    }

    /// Adds a password input.
    pub fn add_password(&mut self, name: &str, label: Option<String>) -> FormBuilderResult<&mut Control> {
        self.add_kind(name, InputKind::Password, label)
    }

    /// Adds a select box.
    pub fn add_select(
        &mut self,
        name: &str,
        label: Option<String>,
        items: Vec<(String, String)>,
    ) -> FormBuilderResult<&mut Control> {
        let control = self.add_kind(name, InputKind::Select, label)?;
        control.set_items(items);
        Ok(control)
    }

    /// Adds a submit button.
    pub fn add_submit(&mut self, name: &str, label: Option<String>) -> FormBuilderResult<&mut Control> {
        self.add_kind(name, InputKind::Submit, label)
    }

    /// Adds the CSRF protection field, keyed by `secret_key`.
    pub fn add_protection(&mut self, secret_key: &str) -> FormBuilderResult<&mut Control> {
        let protection = Protection::new(secret_key);
        let token = protection.generate_token();
        self.add_hidden(PROTECTOR_ID)?.set_default_value(token);
        self.protection = Some(protection);
        self.control_mut(PROTECTOR_ID)
    }

    /// Returns `true` if the form is CSRF protected.
    pub const fn is_protected(&self) -> bool {
        self.protection.is_some()
    }

    /// Removes a control, returning it if it existed.
    pub fn remove_control(&mut self, name: &str) -> Option<Control> {
        let index = self.controls.iter().position(|c| c.name() == name)?;
        if name == PROTECTOR_ID {
            self.protection = None;
        }
        Some(self.controls.remove(index))
    }

    /// Returns `true` if a control with this name exists.
    pub fn has_control(&self, name: &str) -> bool {
        self.controls.iter().any(|c| c.name() == name)
    }

    /// Looks up a control. Fails with `InvalidReference` when absent.
    pub fn control(&self, name: &str) -> FormBuilderResult<&Control> {
        self.controls
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| missing_control(name))
    }

    /// Looks up a control mutably. Fails with `InvalidReference` when absent.
    pub fn control_mut(&mut self, name: &str) -> FormBuilderResult<&mut Control> {
        self.controls
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| missing_control(name))
    }

    /// All controls in creation order.
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Controls that carry data: everything except buttons and the
    /// protection field.
    pub fn data_controls(&self) -> impl Iterator<Item = &Control> {
        self.controls
            .iter()
            .filter(|c| !c.kind().is_button() && c.name() != PROTECTOR_ID)
    }

    /// Current values of the data controls, by name.
    pub fn values(&self) -> Vec<(String, Value)> {
        self.data_controls()
            .map(|c| (c.name().to_string(), c.value().clone()))
            .collect()
    }

    // ── Hooks ───────────────────────────────────────────────────────

    /// Registers a hook run after the controls validate. It may record
    /// errors with [`add_error`](Self::add_error) to fail the submission.
    pub fn on_validate(&mut self, hook: impl FnMut(&mut Self) + 'static) -> &mut Self {
        self.on_validate.push(Box::new(hook));
        self
    }

    /// Registers a hook run after a successful submission.
    ///
    /// When the form belongs to a `FormBuilder` submitted through
    /// `FormBuilder::submit`, the entities already hold the submitted values
    /// when the hook runs. [`submit`](Self::submit) on its own never writes
    /// entities.
    pub fn on_success(&mut self, hook: impl FnMut(&Self) + 'static) -> &mut Self {
        self.on_success.push(Box::new(hook));
        self
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submits data to the form: [`validate_submission`](Self::validate_submission)
    /// and, when it succeeds, [`complete_submission`](Self::complete_submission).
    ///
    /// Returns `true` when the submission is valid.
    pub fn submit(&mut self, data: &SubmittedData) -> bool {
        let valid = self.validate_submission(data);
        if valid {
            self.complete_submission();
        }
        valid
    }

    /// Loads control values, validates them, checks the CSRF token and runs
    /// the `on_validate` hooks. Data whose tracker names another form is
    /// ignored.
    ///
    /// Returns `true` when the submission is valid so far. The `on_success`
    /// hooks have not run yet.
    pub fn validate_submission(&mut self, data: &SubmittedData) -> bool {
        if data.get(TRACKER_ID).is_some_and(|tracker| tracker != self.name) {
            tracing::debug!(form = %self.name, "Submission tracker names another form");
            return false;
        }
        self.submitted = true;
        self.form_errors.clear();

        for control in &mut self.controls {
            control.load(data);
        }
        let mut valid = true;
        for control in &mut self.controls {
            valid &= control.validate();
        }

        if let Some(protection) = &self.protection {
            let token = data.get(PROTECTOR_ID).unwrap_or_default();
            if !protection.verify(token) {
                self.form_errors.push(PROTECTION_MESSAGE.to_string());
                valid = false;
            }
        }

        if valid {
            let mut hooks = std::mem::take(&mut self.on_validate);
            for hook in &mut hooks {
                hook(&mut *self);
            }
            self.on_validate = hooks;
            valid = self.form_errors.is_empty();
        }

        if !valid {
            tracing::debug!(form = %self.name, errors = ?self.errors(), "Form submission is invalid");
        }
        valid
    }

    /// Runs the `on_success` hooks of a validated submission.
    pub fn complete_submission(&mut self) {
        let mut hooks = std::mem::take(&mut self.on_success);
        for hook in &mut hooks {
            hook(&*self);
        }
        self.on_success = hooks;
    }

    /// Returns `true` once data has been submitted.
    pub const fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Returns `true` if the form was submitted without errors.
    pub fn is_valid(&self) -> bool {
        self.submitted
            && self.form_errors.is_empty()
            && self.controls.iter().all(|c| c.errors().is_empty())
    }

    /// Records a form-level error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    /// Form-level errors followed by every control's errors.
    pub fn errors(&self) -> Vec<String> {
        self.form_errors
            .iter()
            .cloned()
            .chain(self.controls.iter().flat_map(|c| c.errors().iter().cloned()))
            .collect()
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Renders the whole form.
    pub fn render(&self) -> String {
        let mut html = format!(
            r#"<form action="{}" method="{}" id="frm-{}">"#,
            escape_html(&self.action),
            self.method.as_str().to_lowercase(),
            escape_html(&self.name)
        );
        for error in &self.form_errors {
            html.push_str(&format!(r#"<p class="error">{}</p>"#, escape_html(error)));
        }
        for control in &self.controls {
            html.push_str(&control.render());
        }
        html.push_str(&format!(
            r#"<input type="hidden" name="{TRACKER_ID}" value="{}">"#,
            escape_html(&self.name)
        ));
        html.push_str("</form>");
        html
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn missing_control(name: &str) -> FormBuilderError {
    FormBuilderError::InvalidReference(format!("Component with name '{name}' does not exist."))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn contact_form() -> Form {
        let mut form = Form::new("contact");
        form.add_text("name", Some("Name".into()))
            .unwrap()
            .set_required("Fill in the name.");
        form.add_checkbox("agree", None).unwrap().set_optional();
        form.add_submit("send", Some("Send".into())).unwrap();
        form
    }

    #[test]
    fn test_add_and_lookup_controls() {
        let form = contact_form();
        assert_eq!(form.controls().len(), 3);
        assert_eq!(form.control("name").unwrap().label(), Some("Name"));
        assert!(form.control("missing").unwrap_err().is_invalid_reference());
    }

    #[test]
    fn test_duplicate_control_rejected() {
        let mut form = contact_form();
        let err = form.add_text("name", None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_remove_control() {
        let mut form = contact_form();
        assert!(form.remove_control("name").is_some());
        assert!(form.remove_control("name").is_none());
        assert!(form.control("name").is_err());
    }

    #[test]
    fn test_submit_valid_and_invalid() {
        let mut form = contact_form();
        assert!(!form.submit(&SubmittedData::parse("name=")));
        assert!(form.is_submitted());
        assert!(!form.is_valid());
        assert_eq!(form.errors(), vec!["Fill in the name.".to_string()]);

        assert!(form.submit(&SubmittedData::parse("name=Jan&agree=1")));
        assert!(form.is_valid());
        assert_eq!(form.control("agree").unwrap().value(), &Value::Bool(true));
    }

    #[test]
    fn test_tracker_for_other_form_is_ignored() {
        let mut form = contact_form();
        assert!(!form.submit(&SubmittedData::parse("_form_=other&name=Jan")));
        assert!(!form.is_submitted());
        assert!(form.submit(&SubmittedData::parse("_form_=contact&name=Jan")));
    }

    #[test]
    fn test_hooks_fire_in_order() {
        let mut form = contact_form();
        let validated = Rc::new(Cell::new(0));
        let succeeded = Rc::new(Cell::new(0));
        let v = Rc::clone(&validated);
        form.on_validate(move |_| v.set(v.get() + 1));
        let s = Rc::clone(&succeeded);
        form.on_success(move |f| {
            assert!(f.is_valid());
            s.set(s.get() + 1);
        });

        form.submit(&SubmittedData::parse("name="));
        assert_eq!((validated.get(), succeeded.get()), (0, 0));

        form.submit(&SubmittedData::parse("name=Jan"));
        assert_eq!((validated.get(), succeeded.get()), (1, 1));
    }

    #[test]
    fn test_success_hooks_wait_for_completion() {
        let mut form = contact_form();
        let succeeded = Rc::new(Cell::new(0));
        let s = Rc::clone(&succeeded);
        form.on_success(move |_| s.set(s.get() + 1));

        assert!(form.validate_submission(&SubmittedData::parse("name=Jan")));
        assert_eq!(succeeded.get(), 0);
        form.complete_submission();
        assert_eq!(succeeded.get(), 1);
    }

    #[test]
    fn test_on_validate_can_reject() {
        let mut form = contact_form();
        let succeeded = Rc::new(Cell::new(false));
        form.on_validate(|f| f.add_error("Name is taken."));
        let s = Rc::clone(&succeeded);
        form.on_success(move |_| s.set(true));

        assert!(!form.submit(&SubmittedData::parse("name=Jan")));
        assert!(!succeeded.get());
        assert_eq!(form.errors(), vec!["Name is taken.".to_string()]);
    }

    #[test]
    fn test_protection_token() {
        let mut form = contact_form();
        form.add_protection("secret").unwrap();
        assert!(form.is_protected());
        let token = form.control(PROTECTOR_ID).unwrap().default_value().to_form_string();

        assert!(!form.submit(&SubmittedData::parse("name=Jan")));
        assert_eq!(form.errors(), vec![PROTECTION_MESSAGE.to_string()]);

        let mut data = SubmittedData::parse("name=Jan");
        data.set(PROTECTOR_ID, token);
        assert!(form.submit(&data));
    }

    #[test]
    fn test_removing_protection_disables_check() {
        let mut form = contact_form();
        form.add_protection("secret").unwrap();
        form.remove_control(PROTECTOR_ID);
        assert!(!form.is_protected());
        assert!(form.submit(&SubmittedData::parse("name=Jan")));
    }

    #[test]
    fn test_data_controls_skip_buttons_and_token() {
        let mut form = contact_form();
        form.add_protection("secret").unwrap();
        let names: Vec<_> = form.data_controls().map(Control::name).collect();
        assert_eq!(names, vec!["name", "agree"]);
    }

    #[test]
    fn test_render() {
        let mut form = contact_form();
        form.set_method(http::Method::GET).set_action("/send");
        let html = form.render();
        assert!(html.starts_with(r#"<form action="/send" method="get" id="frm-contact">"#));
        assert!(html.contains(r#"name="name""#));
        assert!(html.contains(r#"<input type="hidden" name="_form_" value="contact">"#));
        assert!(html.ends_with("</form>"));
        assert_eq!(form.to_string(), html);
    }

    #[test]
    fn test_select_items() {
        let mut form = Form::new("f");
        form.add_select("color", None, vec![("r".into(), "Red".into())])
            .unwrap();
        assert!(form.render().contains("Red"));
        assert_eq!(form.method(), &http::Method::POST);
    }
}
