//! Integration tests for the form builder: naming, entity registration,
//! CSRF protection, mappings and the submit round trip.

use std::sync::Arc;

use formbuilder_core::{CatalogTranslator, Settings, Translator};
use formbuilder_forms::csrf::{PROTECTION_MESSAGE, PROTECTOR_ID, TRACKER_ID};
use formbuilder_forms::{
    transform, BuilderOptions, ControlPath, FormBuilder, FormBuilderFactory, InputKind,
    Requirement, SubmittedData,
};
use formbuilder_macros::Entity;
use formbuilder_meta::value::Value;

// ── Models ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Entity)]
pub struct Car {
    #[column(type = "integer")]
    #[id]
    #[generated_value]
    pub id: Option<i64>,

    #[column(type = "string")]
    #[constraint(not_blank(message = "car.colorNotFilled"))]
    pub color: String,

    #[column(type = "integer")]
    #[constraint(min(value = 1, message = "car.weightTooLow"))]
    pub weight: i64,
}

#[derive(Debug, Default, Entity)]
pub struct User {
    #[column(type = "integer")]
    #[id]
    #[generated_value]
    pub id: Option<i64>,

    #[column(type = "string")]
    #[constraint(not_blank(message = "user.nameNotFilled"))]
    #[constraint(min_length(value = 3, message = "user.nameTooShort"))]
    pub name: String,

    #[column(type = "string")]
    pub test_attribute: String,

    #[one_to_one(target_entity = "Car")]
    pub car: Option<Car>,
}

#[derive(Debug, Default, Entity)]
pub struct TestEntity {
    #[column(type = "integer")]
    #[id]
    #[generated_value]
    pub id: Option<i64>,

    #[column(type = "string")]
    pub test_attribute: String,
}

#[derive(Debug, Default, Entity)]
pub struct Counter {
    #[column(type = "integer")]
    pub amount: i64,
}

#[derive(Debug, Default, Entity)]
pub struct Tally {
    #[column(type = "string")]
    pub label: String,

    #[column(type = "integer")]
    pub amount: i64,
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn translator() -> Arc<dyn Translator> {
    Arc::new(CatalogTranslator::new("en").with_translations(vec![
        ("form.test.name", "Name"),
        ("form.test.submit", "Save"),
        ("user.nameNotFilled", "Please fill in the name."),
        ("user.nameTooShort", "The name needs at least %value% characters."),
        ("car.colorNotFilled", "Please fill in the color."),
    ]))
}

fn settings() -> Settings {
    Settings {
        secret_key: "integration-secret".into(),
        ..Settings::default()
    }
}

fn builder_for<E: formbuilder_meta::entity::Entity>(entity: E) -> FormBuilder {
    let mut builder = FormBuilder::new("test", settings()).with_translator(translator());
    builder.set_entity(entity).unwrap();
    builder
}

fn user_builder() -> FormBuilder {
    builder_for(User::default())
}

/// Submission data carrying the tracker and the builder's current token.
fn submission(builder: &mut FormBuilder, pairs: &[(&str, &str)]) -> SubmittedData {
    let token = builder
        .control_exact(PROTECTOR_ID)
        .unwrap()
        .value()
        .to_form_string();
    let mut data = SubmittedData::from_pairs(pairs.iter().copied());
    data.set(TRACKER_ID, builder.name().to_string());
    data.set(PROTECTOR_ID, token);
    data
}

// ── Naming ──────────────────────────────────────────────────────────────

#[test]
fn test_component_name() {
    let mut builder = user_builder();
    assert_eq!(builder.control("name").unwrap().name(), "user_name");
}

#[test]
fn test_component_composed_name() {
    let mut builder = user_builder();
    assert_eq!(
        builder.control("test_attribute").unwrap().name(),
        "user_test_attribute"
    );
}

#[test]
fn test_component_name_of_composed_entity_name() {
    let mut builder = builder_for(TestEntity::default());
    assert_eq!(
        builder.control("test_attribute").unwrap().name(),
        "testEntity_test_attribute"
    );
}

#[test]
fn test_control_name_for_path() {
    let mut builder = user_builder();
    builder.add_related_entity("car").unwrap();
    let path = ControlPath::parse("car.color").unwrap();
    assert_eq!(builder.control_name(&path).unwrap(), "user_car_color");
}

// ── Labels ──────────────────────────────────────────────────────────────

#[test]
fn test_missing_translator() {
    let mut builder = FormBuilder::new("test", settings());
    builder.set_entity_class::<User>().unwrap();
    let err = builder.form().unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_disabled_labels() {
    let mut builder = FormBuilder::new("test", settings());
    builder.set_entity_class::<User>().unwrap();
    builder.set_create_labels(false);
    assert!(builder.form().is_ok());
    assert_eq!(builder.control("name").unwrap().label(), None);
}

#[test]
fn test_translated_labels() {
    let mut builder = user_builder();
    assert_eq!(builder.control("name").unwrap().label(), Some("Name"));
    // Missing keys fall back to the key itself.
    assert_eq!(
        builder.control("test_attribute").unwrap().label(),
        Some("form.test.test_attribute")
    );
    assert_eq!(
        builder.control_exact("test_submit").unwrap().label(),
        Some("Save")
    );
}

#[test]
fn test_custom_labels() {
    let mut builder = user_builder();
    builder
        .set_labels([("test_attribute", "Attribute")])
        .unwrap();
    assert_eq!(
        builder.control("test_attribute").unwrap().label(),
        Some("Attribute")
    );
}

// ── Exclusion ───────────────────────────────────────────────────────────

#[test]
fn test_excluded_control() {
    let mut builder = user_builder();
    builder.exclude(["name"]).unwrap();
    let err = builder.control("name").unwrap_err();
    assert!(err.is_invalid_reference());
    assert!(builder.control("test_attribute").is_ok());
}

#[test]
fn test_exclude_after_materialization() {
    let mut builder = user_builder();
    builder.materialize().unwrap();
    builder.exclude(["test_attribute"]).unwrap();
    assert!(!builder.form().unwrap().has_control("user_test_attribute"));
}

// ── CSRF protection ─────────────────────────────────────────────────────

#[test]
fn test_csrf_protection_control() {
    let mut builder = user_builder();
    let token = builder.control_exact(PROTECTOR_ID).unwrap();
    assert_eq!(token.kind(), InputKind::Hidden);
    assert!(!token.value().to_form_string().is_empty());
}

#[test]
fn test_csrf_protection_control_missing() {
    let mut builder = user_builder();
    builder.enable_csrf_protection(false);
    let err = builder.control_exact(PROTECTOR_ID).unwrap_err();
    assert!(err.is_invalid_reference());
}

#[test]
fn test_submission_without_token_is_rejected() {
    let mut builder = user_builder();
    let data = SubmittedData::from_pairs([(TRACKER_ID, "test"), ("user_name", "Alice")]);
    assert!(!builder.submit(&data).unwrap());
    let errors = builder.form().unwrap().errors();
    assert!(errors.iter().any(|e| e == PROTECTION_MESSAGE));
    assert_eq!(
        builder.entity().unwrap().downcast_ref::<User>().unwrap().name,
        ""
    );
}

// ── Entities ────────────────────────────────────────────────────────────

#[test]
fn test_main_entity() {
    let builder = user_builder();
    assert!(builder.entity().unwrap().downcast_ref::<User>().is_some());
}

#[test]
fn test_main_entity_data_from_control_name() {
    let mut builder = user_builder();
    builder.materialize().unwrap();
    let entry = builder.entity_entry_by_control_name("user_name").unwrap();
    assert!(entry.is_main());
    assert_eq!(entry.descriptor.name, "User");
}

#[test]
fn test_main_entity_data_from_control_name_failure() {
    let mut builder = user_builder();
    builder.materialize().unwrap();
    let err = builder
        .entity_entry_by_control_name("wrong_control_name")
        .unwrap_err();
    assert!(err.is_invalid_reference());
}

#[test]
fn test_sub_entity() {
    let mut builder = user_builder();
    assert!(builder.add_related_entity("car").is_ok());
}

#[test]
fn test_sub_entity_failure() {
    let mut builder = user_builder();
    let err = builder.add_related_entity("wrong_property_name").unwrap_err();
    assert!(err.is_invalid_reference());
}

#[test]
fn test_entity_count() {
    let mut builder = user_builder();
    builder.add_related_entity("car").unwrap();
    assert_eq!(builder.entity_count(), 2);
}

#[test]
fn test_sub_entity_control_name() {
    let mut builder = user_builder();
    builder.add_related_entity("car").unwrap();
    assert_eq!(builder.control("car.color").unwrap().name(), "user_car_color");
}

#[test]
fn test_sub_entity_data_from_control_name() {
    let mut builder = user_builder();
    builder.add_related_entity("car").unwrap();
    builder.materialize().unwrap();
    let entry = builder.entity_entry_by_control_name("user_car_color").unwrap();
    assert_eq!(entry.relation.as_deref(), Some("car"));
    assert_eq!(entry.descriptor.name, "Car");
}

#[test]
fn test_sub_entity_instance() {
    let mut builder = user_builder();
    builder.add_related_entity("car").unwrap();
    assert!(builder
        .related_entity("car")
        .unwrap()
        .downcast_ref::<Car>()
        .is_some());
}

#[test]
fn test_sub_entity_instance_failure() {
    let builder = user_builder();
    let err = builder.related_entity("car").unwrap_err();
    assert!(err.is_invalid_reference());
}

#[test]
fn test_related_identifier_never_exposed() {
    let mut builder = user_builder();
    builder.add_related_entity("car").unwrap();
    builder.allow_id(true);
    assert!(builder.control("id").is_ok());
    assert!(builder.control("car.id").unwrap_err().is_invalid_reference());
}

// ── Form ────────────────────────────────────────────────────────────────

#[test]
fn test_form_instance() {
    let mut builder = user_builder();
    let form = builder.form().unwrap();
    assert_eq!(form.name(), "test");
    assert!(form.has_control("test_submit"));
}

#[test]
fn test_manual_mapping() {
    let mut builder = user_builder();
    builder
        .form_mut()
        .unwrap()
        .add_select(
            "test_select",
            None,
            vec![("a".into(), "Alice".into()), ("b".into(), "Bob".into())],
        )
        .unwrap();
    builder
        .set_mapping("test_select", Some("name"), None)
        .unwrap();
    let select = builder.control_exact("test_select").unwrap();
    assert_eq!(
        select.requirement(),
        &Requirement::Required("Please fill in the name.".into())
    );
    assert_eq!(select.rules().len(), 1);
}

#[test]
fn test_default_control_value() {
    let user = User {
        id: Some(123),
        name: "testUser".into(),
        ..User::default()
    };
    let mut builder = builder_for(user);
    assert_eq!(
        builder.control("name").unwrap().value(),
        &Value::String("testUser".into())
    );
}

#[test]
fn test_default_values_disabled() {
    let user = User {
        name: "testUser".into(),
        ..User::default()
    };
    let mut builder = builder_for(user);
    builder.set_default_values(false);
    assert!(!builder.control("name").unwrap().value().is_filled());
}

#[test]
fn test_id_input_element() {
    let user = User {
        id: Some(123),
        ..User::default()
    };
    let mut builder = builder_for(user);
    builder.allow_id(true);
    let id = builder.control("id").unwrap();
    assert_eq!(id.kind(), InputKind::Hidden);
    assert_eq!(id.label(), None);
    assert_eq!(id.value().to_form_string(), "123");
}

#[test]
fn test_requirement_follows_constraints() {
    let mut builder = user_builder();
    assert_eq!(
        builder.control("name").unwrap().requirement(),
        &Requirement::Required("Please fill in the name.".into())
    );
    assert_eq!(
        builder.control("test_attribute").unwrap().requirement(),
        &Requirement::Optional
    );
}

#[test]
fn test_render() {
    let mut builder = user_builder();
    let html = builder.render().unwrap();
    assert!(html.starts_with("<form"));
    assert!(html.contains(r#"name="user_name""#));
    assert!(html.contains(r#"name="_token_""#));
}

// ── Submission ──────────────────────────────────────────────────────────

#[test]
fn test_submit_validates_then_writes_back() {
    let mut builder = user_builder();

    let data = submission(&mut builder, &[("user_name", "ab")]);
    assert!(!builder.submit(&data).unwrap());
    let errors = builder.form().unwrap().errors();
    assert!(errors
        .iter()
        .any(|e| e == "The name needs at least 3 characters."));
    assert_eq!(
        builder.entity().unwrap().downcast_ref::<User>().unwrap().name,
        ""
    );

    let data = submission(&mut builder, &[("user_name", "abcdef")]);
    assert!(builder.submit(&data).unwrap());
    let user = builder.into_entity().unwrap();
    assert_eq!(user.downcast_ref::<User>().unwrap().name, "abcdef");
}

#[test]
fn test_submit_into_sub_entity() {
    let mut builder = user_builder();
    builder.add_related_entity("car").unwrap();
    let data = submission(
        &mut builder,
        &[
            ("user_name", "Alice"),
            ("user_car_color", "red"),
            ("user_car_weight", "1200"),
        ],
    );
    assert!(builder.submit(&data).unwrap());

    let car = builder.related_entity("car").unwrap().downcast_ref::<Car>().unwrap();
    assert_eq!(car.color, "red");
    assert_eq!(car.weight, 1200);
}

#[test]
fn test_submit_sub_entity_rule_fails() {
    let mut builder = user_builder();
    builder.add_related_entity("car").unwrap();
    let data = submission(
        &mut builder,
        &[("user_name", "Alice"), ("user_car_weight", "1200")],
    );
    assert!(!builder.submit(&data).unwrap());
    let errors = builder.form().unwrap().errors();
    assert!(errors.iter().any(|e| e == "Please fill in the color."));
}

#[test]
fn test_unconvertible_value_rejects_whole_submission() {
    let mut builder = FormBuilder::new("tally", Settings::bare());
    builder.set_entity(Tally::default()).unwrap();
    let data = SubmittedData::parse("tally_label=written&tally_amount=abc");
    assert!(!builder.submit(&data).unwrap());
    assert!(!builder.form().unwrap().is_valid());
    assert_eq!(
        builder.control("amount").unwrap().errors(),
        &["The value abc is not valid.".to_string()]
    );

    let tally = builder.entity().unwrap().downcast_ref::<Tally>().unwrap();
    assert_eq!(tally.label, "");
    assert_eq!(tally.amount, 0);

    let data = SubmittedData::parse("tally_label=written&tally_amount=4");
    assert!(builder.submit(&data).unwrap());
    let tally = builder.into_entity().unwrap();
    let tally = tally.downcast_ref::<Tally>().unwrap();
    assert_eq!(tally.label, "written");
    assert_eq!(tally.amount, 4);
}

#[test]
fn test_submission_for_another_form_is_ignored() {
    let mut builder = user_builder();
    let mut data = submission(&mut builder, &[("user_name", "Alice")]);
    data.set(TRACKER_ID, "other");
    assert!(!builder.submit(&data).unwrap());
    assert!(!builder.form().unwrap().is_submitted());
}

#[test]
fn test_transform_mapping() {
    let mut builder = FormBuilder::new("counter", Settings::bare());
    builder.set_entity(Counter::default()).unwrap();
    builder
        .set_mapping(
            "counter_amount",
            Some("amount"),
            Some(transform(|value| {
                let amount = value
                    .as_str()
                    .and_then(|s| s.parse::<i64>().ok())
                    .unwrap_or_default();
                Value::Int(amount * 2)
            })),
        )
        .unwrap();
    let data = SubmittedData::from_pairs([("counter_amount", "5")]);
    assert!(builder.submit(&data).unwrap());
    let counter = builder.into_entity().unwrap();
    assert_eq!(counter.downcast_ref::<Counter>().unwrap().amount, 10);
}

#[test]
fn test_unbound_control_is_skipped() {
    let mut builder = FormBuilder::new("test", Settings::bare());
    builder.set_entity(User::default()).unwrap();
    builder.form_mut().unwrap().add_text("note", None).unwrap();
    let data = SubmittedData::from_pairs([("user_name", "Alice"), ("note", "hello")]);
    assert!(builder.submit(&data).unwrap());
    let user = builder.into_entity().unwrap();
    assert_eq!(user.downcast_ref::<User>().unwrap().name, "Alice");
}

#[test]
fn test_auto_data_setting_disabled() {
    let mut builder = FormBuilder::new("test", Settings::bare());
    builder.set_entity(User::default()).unwrap();
    builder.set_auto_data_setting(false);
    let data = SubmittedData::from_pairs([("user_name", "Alice")]);
    assert!(builder.submit(&data).unwrap());
    let user = builder.into_entity().unwrap();
    assert_eq!(user.downcast_ref::<User>().unwrap().name, "");
}

// ── Factory ─────────────────────────────────────────────────────────────

#[test]
fn test_factory_builds_working_forms() {
    let factory = FormBuilderFactory::new(settings()).with_translator(translator());
    let mut builder = factory
        .create("test", User::default(), BuilderOptions::default())
        .unwrap();
    assert_eq!(builder.control("name").unwrap().label(), Some("Name"));

    let data = submission(&mut builder, &[("user_name", "Alice")]);
    assert!(builder.submit(&data).unwrap());
    let user = builder.into_entity().unwrap();
    assert_eq!(user.downcast_ref::<User>().unwrap().name, "Alice");
}
