//! Widget system for rendering form controls.
//!
//! Widgets are the bridge between controls and their markup. Each widget
//! knows how to render itself for a name, a current value and extra
//! attributes, and how to read its value back from [`SubmittedData`].

use std::collections::BTreeMap;
use std::fmt;

use formbuilder_core::utils::text::escape_html;
use formbuilder_meta::value::Value;

use crate::submission::SubmittedData;

/// The kind of a form control.
///
/// The first five variants are the kinds the form builder derives from
/// entity metadata; `Select` and `Submit` exist for manually added controls
/// and the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// `<input type="text">`.
    Text,
    /// `<textarea>`.
    TextArea,
    /// `<input type="checkbox">`.
    Checkbox,
    /// `<input type="hidden">`.
    Hidden,
    /// `<input type="password">`.
    Password,
    /// `<select>`.
    Select,
    /// `<input type="submit">`.
    Submit,
}

impl InputKind {
    /// Returns `true` for buttons, which carry no data.
    pub const fn is_button(self) -> bool {
        matches!(self, Self::Submit)
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::TextArea => "textArea",
            Self::Checkbox => "checkbox",
            Self::Hidden => "hidden",
            Self::Password => "password",
            Self::Select => "select",
            Self::Submit => "submit",
        };
        f.write_str(name)
    }
}

/// A trait for form widgets.
pub trait Widget: Send + Sync + fmt::Debug {
    /// Returns the control kind this widget renders.
    fn input_kind(&self) -> InputKind;

    /// Renders the widget.
    fn render(&self, name: &str, value: &Value, attrs: &BTreeMap<String, String>) -> String;

    /// Extracts the submitted value for `name`.
    ///
    /// A missing text value reads as an empty string, so every control has
    /// a value after submission.
    fn value_from_data(&self, data: &SubmittedData, name: &str) -> Value {
        Value::String(data.get(name).unwrap_or_default().to_string())
    }
}

/// Formats an attribute map into ` key="value" key2="value2"`.
fn render_attrs(attrs: &BTreeMap<String, String>) -> String {
    attrs
        .iter()
        .map(|(k, v)| {
            if v.is_empty() {
                format!(" {k}")
            } else {
                format!(r#" {k}="{}""#, escape_html(v))
            }
        })
        .collect()
}

fn render_input(kind: &str, name: &str, value: &str, attrs: &BTreeMap<String, String>) -> String {
    format!(
        r#"<input type="{kind}" name="{}" value="{}"{}>"#,
        escape_html(name),
        escape_html(value),
        render_attrs(attrs)
    )
}

// ── Built-in widgets ────────────────────────────────────────────────

/// A single-line text input. Submitted values are trimmed.
#[derive(Debug, Clone, Copy)]
pub struct TextInput;

impl Widget for TextInput {
    fn input_kind(&self) -> InputKind {
        InputKind::Text
    }

    fn render(&self, name: &str, value: &Value, attrs: &BTreeMap<String, String>) -> String {
        render_input("text", name, &value.to_form_string(), attrs)
    }

    fn value_from_data(&self, data: &SubmittedData, name: &str) -> Value {
        Value::String(data.get(name).unwrap_or_default().trim().to_string())
    }
}

/// A multi-line `<textarea>`.
#[derive(Debug, Clone, Copy)]
pub struct TextArea;

impl Widget for TextArea {
    fn input_kind(&self) -> InputKind {
        InputKind::TextArea
    }

    fn render(&self, name: &str, value: &Value, attrs: &BTreeMap<String, String>) -> String {
        format!(
            r#"<textarea name="{}"{}>{}</textarea>"#,
            escape_html(name),
            render_attrs(attrs),
            escape_html(&value.to_form_string())
        )
    }
}

/// A checkbox; its value is a boolean.
#[derive(Debug, Clone, Copy)]
pub struct CheckboxInput;

impl Widget for CheckboxInput {
    fn input_kind(&self) -> InputKind {
        InputKind::Checkbox
    }

    fn render(&self, name: &str, value: &Value, attrs: &BTreeMap<String, String>) -> String {
        let checked = if value.is_filled() { " checked" } else { "" };
        format!(
            r#"<input type="checkbox" name="{}" value="1"{checked}{}>"#,
            escape_html(name),
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &SubmittedData, name: &str) -> Value {
        let checked = data
            .get(name)
            .is_some_and(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("off"));
        Value::Bool(checked)
    }
}

/// A hidden input.
#[derive(Debug, Clone, Copy)]
pub struct HiddenInput;

impl Widget for HiddenInput {
    fn input_kind(&self) -> InputKind {
        InputKind::Hidden
    }

    fn render(&self, name: &str, value: &Value, attrs: &BTreeMap<String, String>) -> String {
        render_input("hidden", name, &value.to_form_string(), attrs)
    }
}

/// A password input. The current value is never rendered.
#[derive(Debug, Clone, Copy)]
pub struct PasswordInput;

impl Widget for PasswordInput {
    fn input_kind(&self) -> InputKind {
        InputKind::Password
    }

    fn render(&self, name: &str, _value: &Value, attrs: &BTreeMap<String, String>) -> String {
        render_input("password", name, "", attrs)
    }
}

/// A `<select>` with `(value, label)` items.
#[derive(Debug, Clone, Default)]
pub struct Select {
    /// Available items as `(value, label)` pairs.
    pub items: Vec<(String, String)>,
}

impl Select {
    /// Creates a select with the given items.
    pub const fn new(items: Vec<(String, String)>) -> Self {
        Self { items }
    }
}

impl Widget for Select {
    fn input_kind(&self) -> InputKind {
        InputKind::Select
    }

    fn render(&self, name: &str, value: &Value, attrs: &BTreeMap<String, String>) -> String {
        let selected = value.to_form_string();
        let options: String = self
            .items
            .iter()
            .map(|(v, label)| {
                let sel = if *v == selected { " selected" } else { "" };
                format!(
                    r#"<option value="{}"{sel}>{}</option>"#,
                    escape_html(v),
                    escape_html(label)
                )
            })
            .collect();
        format!(
            r#"<select name="{}"{}>{options}</select>"#,
            escape_html(name),
            render_attrs(attrs)
        )
    }
}

/// A submit button. The value is the button's label.
#[derive(Debug, Clone, Copy)]
pub struct SubmitButton;

impl Widget for SubmitButton {
    fn input_kind(&self) -> InputKind {
        InputKind::Submit
    }

    fn render(&self, name: &str, value: &Value, attrs: &BTreeMap<String, String>) -> String {
        render_input("submit", name, &value.to_form_string(), attrs)
    }
}

/// Creates the default widget for a control kind.
pub fn create_widget(kind: InputKind) -> Box<dyn Widget> {
    match kind {
        InputKind::Text => Box::new(TextInput),
        InputKind::TextArea => Box::new(TextArea),
        InputKind::Checkbox => Box::new(CheckboxInput),
        InputKind::Hidden => Box::new(HiddenInput),
        InputKind::Password => Box::new(PasswordInput),
        InputKind::Select => Box::new(Select::default()),
        InputKind::Submit => Box::new(SubmitButton),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_attrs() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn test_text_input_render() {
        let html = TextInput.render("user_name", &Value::from("Alice"), &no_attrs());
        assert!(html.contains(r#"type="text""#));
        assert!(html.contains(r#"name="user_name""#));
        assert!(html.contains(r#"value="Alice""#));
    }

    #[test]
    fn test_render_escapes_value() {
        let html = TextInput.render("n", &Value::from("<b>\"x\""), &no_attrs());
        assert!(html.contains("&lt;b&gt;&quot;x&quot;"));
    }

    #[test]
    fn test_render_attrs_sorted_and_flags() {
        let mut attrs = BTreeMap::new();
        attrs.insert("required".to_string(), String::new());
        attrs.insert("id".to_string(), "frm-n".to_string());
        let html = TextInput.render("n", &Value::Null, &attrs);
        assert!(html.ends_with(r#" id="frm-n" required>"#));
    }

    #[test]
    fn test_textarea_render() {
        let html = TextArea.render("bio", &Value::from("a & b"), &no_attrs());
        assert_eq!(html, r#"<textarea name="bio">a &amp; b</textarea>"#);
    }

    #[test]
    fn test_checkbox_render_and_read() {
        let html = CheckboxInput.render("active", &Value::Bool(true), &no_attrs());
        assert!(html.contains(" checked"));
        let html = CheckboxInput.render("active", &Value::Bool(false), &no_attrs());
        assert!(!html.contains("checked"));

        let data = SubmittedData::parse("active=1");
        assert_eq!(CheckboxInput.value_from_data(&data, "active"), Value::Bool(true));
        assert_eq!(CheckboxInput.value_from_data(&data, "other"), Value::Bool(false));
    }

    #[test]
    fn test_password_never_renders_value() {
        let html = PasswordInput.render("pw", &Value::from("secret"), &no_attrs());
        assert!(!html.contains("secret"));
        assert!(html.contains(r#"type="password""#));
    }

    #[test]
    fn test_select_render() {
        let select = Select::new(vec![
            ("a".into(), "Alpha".into()),
            ("b".into(), "Beta".into()),
        ]);
        let html = select.render("letter", &Value::from("b"), &no_attrs());
        assert!(html.contains(r#"<option value="b" selected>Beta</option>"#));
        assert!(html.contains(r#"<option value="a">Alpha</option>"#));
    }

    #[test]
    fn test_text_value_trimmed_and_defaulted() {
        let data = SubmittedData::parse("name=+Bob+");
        assert_eq!(TextInput.value_from_data(&data, "name"), Value::from("Bob"));
        assert_eq!(TextInput.value_from_data(&data, "missing"), Value::from(""));
        assert_eq!(TextArea.value_from_data(&data, "name"), Value::from(" Bob "));
    }

    #[test]
    fn test_create_widget_kinds() {
        for kind in [
            InputKind::Text,
            InputKind::TextArea,
            InputKind::Checkbox,
            InputKind::Hidden,
            InputKind::Password,
            InputKind::Select,
            InputKind::Submit,
        ] {
            assert_eq!(create_widget(kind).input_kind(), kind);
        }
        assert!(InputKind::Submit.is_button());
        assert!(!InputKind::Hidden.is_button());
        assert_eq!(InputKind::TextArea.to_string(), "textArea");
    }
}
