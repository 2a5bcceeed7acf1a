//! Built-in form configurations
//!
//! The default dynamic form is what the embed view falls back to when a
//! requested configuration cannot be resolved. The fixed-path presets back
//! `/embed/<name>` pages.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::form::{FieldDefinition, FieldType, FieldValidation, FormConfig};

/// Id of the built-in fallback configuration
pub const DEFAULT_FORM_ID: &str = "a880ad94-9840-4de5-b418-b3076b9ccd22";

pub const PHONE_LEAD: &str = "phone-lead";
pub const PROPERTY_ESTIMATOR: &str = "property-estimator";

/// Names accepted by [`preset`]
pub const PRESET_NAMES: &[&str] = &[PHONE_LEAD, PROPERTY_ESTIMATOR];

const DEFAULT_TIMESTAMP_MILLIS: i64 = 1_761_590_873_376;

fn default_timestamp() -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(DEFAULT_TIMESTAMP_MILLIS).single()
}

fn property_type_options() -> [&'static str; 3] {
    ["House", "Apartment", "Plot"]
}

/// The configuration rendered when nothing better can be resolved
pub fn default_form() -> FormConfig {
    FormConfig {
        id: DEFAULT_FORM_ID.to_string(),
        title: "Property Value Estimator".to_string(),
        description: "Get an instant estimate of your property value".to_string(),
        submit_button_text: "Estimate Value".to_string(),
        success_message: "Thank you! We'll get back to you soon.".to_string(),
        webhook_url: None,
        fields: vec![
            FieldDefinition::new("fed0efd8-347d-40ad-bdfa-e9f72ce8f908", FieldType::Text, "Location")
                .with_placeholder("e.g. DHA Phase 6, Lahore")
                .required(),
            FieldDefinition::new("16319d4c-1a94-471b-84be-f2ffeea27085", FieldType::Select, "Property Type")
                .with_options(property_type_options())
                .required(),
        ],
        primary_color: "#041e48".to_string(),
        background_color: "#eee9e9".to_string(),
        border_radius: 8,
        created_at: default_timestamp(),
        updated_at: default_timestamp(),
    }
}

/// Starting point for a new builder draft. Ids are freshly generated.
pub fn starter_form() -> FormConfig {
    FormConfig {
        id: new_id(),
        title: "Property Value Estimator".to_string(),
        description: "Get an instant estimate of your property value".to_string(),
        submit_button_text: "Estimate Value".to_string(),
        success_message: "Thank you! We'll get back to you soon.".to_string(),
        webhook_url: None,
        fields: vec![
            FieldDefinition::new(new_id(), FieldType::Text, "Location")
                .with_placeholder("e.g. DHA Phase 6, Lahore")
                .required(),
            FieldDefinition::new(new_id(), FieldType::Select, "Property Type")
                .with_options(property_type_options())
                .required(),
            FieldDefinition::new(new_id(), FieldType::Number, "Area (sq ft)")
                .with_placeholder("Enter total area")
                .required(),
        ],
        primary_color: "#3b82f6".to_string(),
        background_color: "#ffffff".to_string(),
        border_radius: 8,
        created_at: None,
        updated_at: None,
    }
}

/// Look up a fixed-path preset by the last segment of its embed path
pub fn preset(name: &str) -> Option<FormConfig> {
    match name {
        PHONE_LEAD => Some(phone_lead()),
        PROPERTY_ESTIMATOR => Some(property_estimator()),
        _ => None,
    }
}

fn phone_lead() -> FormConfig {
    FormConfig {
        id: PHONE_LEAD.to_string(),
        title: "Get Your Property Estimate".to_string(),
        description: String::new(),
        submit_button_text: "Get Estimate".to_string(),
        success_message: "Phone number submitted successfully!".to_string(),
        webhook_url: None,
        fields: vec![FieldDefinition::new("phone", FieldType::Text, "Phone Number")
            .with_placeholder("+92 300 1234567")
            .with_validation(FieldValidation {
                pattern: Some(r"[0-9+\-\s()]{10,}".to_string()),
                ..Default::default()
            })
            .required()],
        primary_color: "#3b82f6".to_string(),
        background_color: "#ffffff".to_string(),
        border_radius: 16,
        created_at: default_timestamp(),
        updated_at: default_timestamp(),
    }
}

fn property_estimator() -> FormConfig {
    let count = |id: &str, label: &str| {
        FieldDefinition::new(id, FieldType::Number, label)
            .with_validation(FieldValidation {
                min: Some(0.0),
                ..Default::default()
            })
            .required()
    };

    FormConfig {
        id: PROPERTY_ESTIMATOR.to_string(),
        title: "Property Value Estimator".to_string(),
        description: "Get an instant estimate of your property value".to_string(),
        submit_button_text: "Estimate Value".to_string(),
        success_message: "Thank you! We'll get back to you soon.".to_string(),
        webhook_url: None,
        fields: vec![
            FieldDefinition::new("location", FieldType::Text, "Location")
                .with_placeholder("e.g. DHA Phase 6, Lahore")
                .with_validation(FieldValidation {
                    pattern: Some(r"(?s).{3,}".to_string()),
                    ..Default::default()
                })
                .required(),
            FieldDefinition::new("propertyType", FieldType::Select, "Property Type")
                .with_options(property_type_options())
                .required(),
            FieldDefinition::new("area", FieldType::Number, "Area (sq ft)")
                .with_placeholder("Enter total area")
                .with_validation(FieldValidation {
                    min: Some(1.0),
                    ..Default::default()
                })
                .required(),
            count("bedrooms", "Bedrooms"),
            count("bathrooms", "Bathrooms"),
            FieldDefinition::new("condition", FieldType::Select, "Condition")
                .with_options(["Excellent", "Good", "Average", "Needs Renovation"])
                .required(),
        ],
        primary_color: "#3b82f6".to_string(),
        background_color: "#ffffff".to_string(),
        border_radius: 8,
        created_at: default_timestamp(),
        updated_at: default_timestamp(),
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
