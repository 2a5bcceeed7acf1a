//! Form configuration model
//!
//! A [`FormConfig`] is the serializable snapshot the builder produces and the
//! renderer consumes. Field order is render order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Field Type
// ============================================================================

/// Closed set of field kinds, plus a catch-all for tags written by a newer
/// or older builder.
///
/// Unknown tags survive a load/save round trip unchanged and are treated as
/// plain text wherever a rule or input kind is derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Other(tag) => tag,
        }
    }

    /// Whether the field carries an option list
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Checkbox | Self::Radio)
    }

    /// Whether the submitted value is a set of selections rather than a string
    pub fn is_multi_value(&self) -> bool {
        matches!(self, Self::Checkbox)
    }

    /// Whether `validation.pattern` applies to this field
    pub fn accepts_pattern(&self) -> bool {
        matches!(self, Self::Text | Self::Textarea | Self::Other(_))
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => Self::Text,
            "email" => Self::Email,
            "number" => Self::Number,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Field Definition
// ============================================================================

/// Optional refinements. `min`/`max` only apply to number fields and
/// `pattern` only to free-text fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.pattern.is_none()
    }
}

/// One input of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            placeholder: None,
            required: false,
            options: Vec::new(),
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// The value a freshly rendered input holds
    pub fn empty_value(&self) -> FieldValue {
        if self.field_type.is_multi_value() {
            FieldValue::Selections(Vec::new())
        } else {
            FieldValue::Text(String::new())
        }
    }
}

// ============================================================================
// Form Configuration
// ============================================================================

fn default_primary_color() -> String {
    "#3b82f6".to_string()
}

fn default_background_color() -> String {
    "#ffffff".to_string()
}

fn default_border_radius() -> u32 {
    8
}

/// Serializable description of a whole form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    /// Lookup key for editing and embedding. Empty until first save when
    /// submitted through the API without one.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub submit_button_text: String,
    pub success_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub fields: Vec<FieldDefinition>,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_border_radius")]
    pub border_radius: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FormConfig {
    pub fn field(&self, field_id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    pub fn field_mut(&mut self, field_id: &str) -> Option<&mut FieldDefinition> {
        self.fields.iter_mut().find(|f| f.id == field_id)
    }

    /// Webhook endpoint to dispatch submissions to. A blank URL counts as unset.
    pub fn webhook_target(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Initial values for every field, keyed by field id
    pub fn empty_values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|f| (f.id.clone(), f.empty_value()))
            .collect()
    }
}

// ============================================================================
// Submitted Values
// ============================================================================

/// A submitted value: one string for scalar inputs, a set of option strings
/// for checkbox groups. Numbers travel as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "RawFieldValue")]
pub enum FieldValue {
    Text(String),
    Selections(Vec<String>),
}

/// Wire shapes accepted for a [`FieldValue`]. JSON scalars other than strings
/// are kept in their textual form; `null` is the empty value.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Selections(Vec<String>),
    Empty,
}

impl From<RawFieldValue> for FieldValue {
    fn from(raw: RawFieldValue) -> Self {
        match raw {
            RawFieldValue::Text(s) => Self::Text(s),
            RawFieldValue::Number(n) => Self::Text(n.to_string()),
            RawFieldValue::Flag(b) => Self::Text(b.to_string()),
            RawFieldValue::Selections(v) => Self::Selections(v),
            RawFieldValue::Empty => Self::Text(String::new()),
        }
    }
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Selections(v) => v.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Selections(_) => None,
        }
    }

    pub fn selections(&self) -> &[String] {
        match self {
            Self::Selections(v) => v,
            Self::Text(_) => &[],
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Selections(values)
    }
}

/// Field id → submitted value
pub type FormValues = BTreeMap<String, FieldValue>;

/// Body POSTed to a form's webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub form_id: String,
    pub form_title: String,
    pub submitted_at: DateTime<Utc>,
    pub data: FormValues,
}
