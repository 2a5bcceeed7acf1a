//! Per-field validation rules
//!
//! A [`FieldRule`] pairs a type-specific [`BaseRule`] with the required/optional
//! wrapping: required fields fail on their empty value, optional ones accept
//! it without consulting the base rule.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::sync::LazyLock;

use crate::domain::form::{FieldDefinition, FieldType, FieldValue};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("email pattern is valid")
});

/// A free-text pattern, matched against the whole value
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    regex: Regex,
}

impl TextPattern {
    /// Compile `source` anchored at both ends. `None` if it is not a valid regex.
    pub fn compile(source: &str) -> Option<Self> {
        match Regex::new(&format!("^(?:{})$", source)) {
            Ok(regex) => Some(Self {
                source: source.to_string(),
                regex,
            }),
            Err(e) => {
                tracing::warn!("Ignoring invalid field pattern '{}': {}", source, e);
                None
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl Serialize for TextPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Type-specific check applied to a non-empty value
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseRule {
    Email,
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    OneOf {
        options: Vec<String>,
    },
    Selections,
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<TextPattern>,
    },
}

/// Builds the base rule for one field
pub type RuleBuilder = fn(&FieldDefinition) -> BaseRule;

/// Tag → rule constructor. Unrecognised tags get the plain text rule.
pub fn rule_builder(field_type: &FieldType) -> RuleBuilder {
    match field_type {
        FieldType::Email => email_rule,
        FieldType::Number => number_rule,
        FieldType::Select | FieldType::Radio => one_of_rule,
        FieldType::Checkbox => selections_rule,
        FieldType::Text | FieldType::Textarea | FieldType::Other(_) => text_rule,
    }
}

fn email_rule(_field: &FieldDefinition) -> BaseRule {
    BaseRule::Email
}

fn number_rule(field: &FieldDefinition) -> BaseRule {
    let validation = field.validation.as_ref();
    BaseRule::Number {
        min: validation.and_then(|v| v.min),
        max: validation.and_then(|v| v.max),
    }
}

fn one_of_rule(field: &FieldDefinition) -> BaseRule {
    BaseRule::OneOf {
        options: field.options.clone(),
    }
}

fn selections_rule(_field: &FieldDefinition) -> BaseRule {
    BaseRule::Selections
}

fn text_rule(field: &FieldDefinition) -> BaseRule {
    let pattern = field
        .validation
        .as_ref()
        .and_then(|v| v.pattern.as_deref())
        .filter(|p| !p.is_empty())
        .and_then(TextPattern::compile);
    BaseRule::Text { pattern }
}

/// Parse a numeric-looking string. Surrounding whitespace is ignored;
/// NaN and infinities are not numbers here.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn is_valid_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_RE.is_match(value)
}

impl BaseRule {
    pub fn is_multi_value(&self) -> bool {
        matches!(self, Self::Selections)
    }

    fn check_text(&self, value: &str) -> Result<(), String> {
        match self {
            Self::Email => {
                if is_valid_email(value) {
                    Ok(())
                } else {
                    Err("Invalid email address".to_string())
                }
            }
            Self::Number { min, max } => {
                let n = parse_number(value).ok_or_else(|| "Must be a valid number".to_string())?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("Minimum value is {}", min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("Maximum value is {}", max));
                    }
                }
                Ok(())
            }
            Self::OneOf { options } => {
                if options.iter().any(|o| o == value) {
                    Ok(())
                } else {
                    Err("Please select a valid option".to_string())
                }
            }
            Self::Text { pattern } => match pattern {
                Some(p) if !p.is_match(value) => Err("Invalid format".to_string()),
                _ => Ok(()),
            },
            Self::Selections => Ok(()),
        }
    }
}

/// Compiled rule for one field
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub field_id: String,
    pub label: String,
    pub required: bool,
    #[serde(flatten)]
    pub base: BaseRule,
}

impl FieldRule {
    pub fn for_field(field: &FieldDefinition) -> Self {
        let build = rule_builder(&field.field_type);
        Self {
            field_id: field.id.clone(),
            label: field.label.clone(),
            required: field.required,
            base: build(field),
        }
    }

    /// The value this field holds before any input
    pub fn empty_value(&self) -> FieldValue {
        if self.base.is_multi_value() {
            FieldValue::Selections(Vec::new())
        } else {
            FieldValue::Text(String::new())
        }
    }

    /// Check one submitted value; `Err` carries the message shown next to the field
    pub fn check(&self, value: &FieldValue) -> Result<(), String> {
        if self.base.is_multi_value() {
            let selected = match value {
                FieldValue::Selections(v) => v.len(),
                FieldValue::Text(s) if s.is_empty() => 0,
                FieldValue::Text(_) => {
                    return Err(format!("{} expects a list of selected options", self.label))
                }
            };
            if self.required && selected == 0 {
                return Err(format!("Select at least one option for {}", self.label));
            }
            return Ok(());
        }

        let text = match value {
            FieldValue::Text(s) => s.as_str(),
            FieldValue::Selections(v) if v.is_empty() => "",
            FieldValue::Selections(_) => {
                return Err(format!("{} expects a single value", self.label))
            }
        };

        if text.is_empty() {
            return if self.required {
                Err(format!("{} is required", self.label))
            } else {
                Ok(())
            };
        }

        self.base.check_text(text)
    }
}
