//! Form configuration → validation schema compiler
//!
//! The compiled schema is derived, never persisted, and rebuilt whenever a
//! form is rendered. Compilation is total: unknown field types degrade to
//! text rules and invalid patterns are dropped.

pub mod rules;

use serde::Serialize;
use std::collections::BTreeMap;

pub use rules::{BaseRule, FieldRule, RuleBuilder, TextPattern};

use crate::domain::form::{FieldValue, FormConfig, FormValues};

/// Field id → error message for every field that failed validation
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledSchema {
    form_id: String,
    rules: Vec<FieldRule>,
}

/// Compile a configuration into its validation schema
pub fn compile(config: &FormConfig) -> CompiledSchema {
    CompiledSchema::compile(config)
}

impl CompiledSchema {
    pub fn compile(config: &FormConfig) -> Self {
        let mut rules: Vec<FieldRule> = Vec::with_capacity(config.fields.len());

        for field in &config.fields {
            let rule = FieldRule::for_field(field);
            // Later definitions win, matching how the configuration is keyed by id
            if let Some(existing) = rules.iter_mut().find(|r| r.field_id == rule.field_id) {
                tracing::warn!("Form {} defines field id {} more than once", config.id, field.id);
                *existing = rule;
            } else {
                rules.push(rule);
            }
        }

        Self {
            form_id: config.id.clone(),
            rules,
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, field_id: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field_id == field_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Initial value of every field
    pub fn initial_values(&self) -> FormValues {
        self.rules
            .iter()
            .map(|r| (r.field_id.clone(), r.empty_value()))
            .collect()
    }

    /// Validate a full submission. A field missing from `values` is checked
    /// as if it held its empty value; unknown keys are ignored.
    pub fn validate(&self, values: &FormValues) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for rule in &self.rules {
            let result = match values.get(&rule.field_id) {
                Some(value) => rule.check(value),
                None => rule.check(&rule.empty_value()),
            };
            if let Err(message) = result {
                errors.insert(rule.field_id.clone(), message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate a single field's value
    pub fn validate_field(&self, field_id: &str, value: &FieldValue) -> Option<Result<(), String>> {
        self.rule(field_id).map(|rule| rule.check(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::{FieldDefinition, FieldType, FieldValidation};
    use crate::domain::presets;

    fn form(fields: Vec<FieldDefinition>) -> FormConfig {
        let mut config = presets::default_form();
        config.fields = fields;
        config
    }

    fn values(pairs: &[(&str, FieldValue)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_required_empty_fails_with_label_for_every_type() {
        let types = [
            FieldType::Text,
            FieldType::Email,
            FieldType::Number,
            FieldType::Textarea,
            FieldType::Select,
            FieldType::Checkbox,
            FieldType::Radio,
            FieldType::from("color"),
        ];
        let fields: Vec<_> = types
            .iter()
            .enumerate()
            .map(|(i, t)| {
                FieldDefinition::new(format!("f{}", i), t.clone(), format!("Label {}", i))
                    .with_options(["A", "B"])
                    .required()
            })
            .collect();
        let config = form(fields);
        let schema = compile(&config);

        let errors = schema.validate(&schema.initial_values()).unwrap_err();
        assert_eq!(errors.len(), types.len());
        for (i, _) in types.iter().enumerate() {
            let message = &errors[&format!("f{}", i)];
            assert!(message.contains(&format!("Label {}", i)), "{}", message);
        }
    }

    #[test]
    fn test_optional_fields_accept_empty() {
        let config = form(vec![
            FieldDefinition::new("email", FieldType::Email, "Email"),
            FieldDefinition::new("rooms", FieldType::Number, "Rooms").with_validation(FieldValidation {
                min: Some(1.0),
                ..Default::default()
            }),
            FieldDefinition::new("extras", FieldType::Checkbox, "Extras").with_options(["Pool"]),
            FieldDefinition::new("kind", FieldType::Radio, "Kind").with_options(["A"]),
        ]);
        let schema = compile(&config);

        assert!(schema.validate(&schema.initial_values()).is_ok());
        assert!(schema.validate(&FormValues::new()).is_ok());
    }

    #[test]
    fn test_select_rejects_unknown_option_regardless_of_required() {
        for (field_type, required) in [
            (FieldType::Select, true),
            (FieldType::Select, false),
            (FieldType::Radio, true),
            (FieldType::Radio, false),
        ] {
            let mut field = FieldDefinition::new("pt", field_type, "Property Type")
                .with_options(["House", "Apartment", "Plot"]);
            field.required = required;
            let schema = compile(&form(vec![field]));

            let errors = schema
                .validate(&values(&[("pt", FieldValue::from("Castle"))]))
                .unwrap_err();
            assert_eq!(errors["pt"], "Please select a valid option");
            assert!(schema.validate(&values(&[("pt", FieldValue::from("Plot"))])).is_ok());
        }
    }

    #[test]
    fn test_number_min_boundary() {
        let schema = compile(&form(vec![FieldDefinition::new("a", FieldType::Number, "Area")
            .with_validation(FieldValidation {
                min: Some(100.0),
                ..Default::default()
            })
            .required()]));

        assert!(schema.validate(&values(&[("a", FieldValue::from("99.9"))])).is_err());
        assert!(schema.validate(&values(&[("a", FieldValue::from("100"))])).is_ok());
    }

    #[test]
    fn test_errors_reported_for_all_failing_fields() {
        let schema = compile(&form(vec![
            FieldDefinition::new("email", FieldType::Email, "Email").required(),
            FieldDefinition::new("phone", FieldType::Text, "Phone").required(),
            FieldDefinition::new("ok", FieldType::Text, "Fine"),
        ]));

        let errors = schema
            .validate(&values(&[("email", FieldValue::from("not-an-email"))]))
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["email"], "Invalid email address");
        assert_eq!(errors["phone"], "Phone is required");
    }

    #[test]
    fn test_duplicate_ids_last_definition_wins() {
        let schema = compile(&form(vec![
            FieldDefinition::new("x", FieldType::Text, "First").required(),
            FieldDefinition::new("x", FieldType::Email, "Second"),
        ]));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.rule("x").unwrap().label, "Second");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let config = presets::preset(presets::PROPERTY_ESTIMATOR).unwrap();
        let a = serde_json::to_value(compile(&config)).unwrap();
        let b = serde_json::to_value(compile(&config)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["formId"], presets::PROPERTY_ESTIMATOR);
    }
}
