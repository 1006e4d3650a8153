//! Structural validation of envelopes and JSON values.

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;

use super::schema::{FieldKind, FieldSpec, Schema};
use crate::client::{Body, Envelope};

/// Outcome of a validation pass. `valid` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::from_errors(Vec::new())
    }
}

impl ValidationResult {
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Append the errors of another result, keeping order.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
        self
    }

    /// Convert into a `Result`, keeping the full error list on failure.
    ///
    /// # Errors
    /// Returns [`ValidationFailure`] when any error was recorded.
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.valid {
            Ok(())
        } else {
            Err(ValidationFailure {
                errors: self.errors,
            })
        }
    }
}

/// A failed validation with every discrepancy found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", errors.join("; "))]
pub struct ValidationFailure {
    pub errors: Vec<String>,
}

/// What a caller expects from a response.
#[derive(Debug, Clone, Default)]
pub struct Expectation<'a> {
    statuses: Vec<u16>,
    content_type: Option<&'a str>,
    schema: Option<&'a Schema>,
}

impl<'a> Expectation<'a> {
    /// No expectations; every envelope is valid.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Expect exactly this status.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::any().or_status(status)
    }

    /// Also accept `status`.
    #[must_use]
    pub fn or_status(mut self, status: u16) -> Self {
        self.statuses.push(status);
        self
    }

    /// Require the content type to contain `fragment`.
    #[must_use]
    pub const fn with_content_type(mut self, fragment: &'a str) -> Self {
        self.content_type = Some(fragment);
        self
    }

    /// Require the body to be JSON matching `schema`.
    #[must_use]
    pub const fn with_schema(mut self, schema: &'a Schema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Validate an envelope against an expectation.
///
/// Status, content type and body are all checked; every violation is
/// reported in the order found.
#[must_use]
pub fn validate(envelope: &Envelope, expectation: &Expectation<'_>) -> ValidationResult {
    let mut errors = Vec::new();

    if !expectation.statuses.is_empty() && !expectation.statuses.contains(&envelope.status) {
        errors.push(format!(
            "status: expected {}, got {}",
            describe_statuses(&expectation.statuses),
            envelope.status
        ));
    }

    if let Some(fragment) = expectation.content_type {
        match envelope.content_type() {
            Some(actual) if actual.contains(fragment) => {}
            Some(actual) => errors.push(format!(
                "content-type: expected to contain '{fragment}', got '{actual}'"
            )),
            None => errors.push(format!(
                "content-type: expected to contain '{fragment}', header missing"
            )),
        }
    }

    if let Some(schema) = expectation.schema {
        match &envelope.body {
            Body::Json(value) => check_schema(value, schema, "$", &mut errors),
            other => errors.push(format!("$: expected JSON body, got {} body", other.kind())),
        }
    }

    if !errors.is_empty() {
        tracing::debug!(status = envelope.status, ?errors, "envelope validation failed");
    }
    ValidationResult::from_errors(errors)
}

/// Validate a bare JSON value (e.g. a generated payload) against a schema.
#[must_use]
pub fn validate_value(value: &Value, schema: &Schema) -> ValidationResult {
    let mut errors = Vec::new();
    check_schema(value, schema, "$", &mut errors);
    ValidationResult::from_errors(errors)
}

fn describe_statuses(statuses: &[u16]) -> String {
    match statuses {
        [single] => single.to_string(),
        many => {
            let list: Vec<String> = many.iter().map(u16::to_string).collect();
            format!("one of [{}]", list.join(", "))
        }
    }
}

fn check_schema(value: &Value, schema: &Schema, path: &str, errors: &mut Vec<String>) {
    match schema {
        Schema::Array(items) => match value {
            Value::Array(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    check_schema(element, items, &format!("{path}[{index}]"), errors);
                }
            }
            other => errors.push(format!(
                "{path}: expected array, found {}",
                json_type(other)
            )),
        },
        Schema::Object {
            fields,
            allow_additional,
        } => match value {
            Value::Object(map) => {
                for spec in fields {
                    let field_path = format!("{path}.{}", spec.name);
                    match map.get(spec.name) {
                        None if spec.required => {
                            errors.push(format!("{field_path}: required field missing"));
                        }
                        None => {}
                        Some(field) => check_field(field, spec, &field_path, errors),
                    }
                }
                if !allow_additional {
                    for key in map.keys() {
                        if !fields.iter().any(|spec| spec.name == key) {
                            errors.push(format!("{path}.{key}: unexpected field"));
                        }
                    }
                }
            }
            other => errors.push(format!(
                "{path}: expected object, found {}",
                json_type(other)
            )),
        },
    }
}

fn check_field(value: &Value, spec: &FieldSpec, path: &str, errors: &mut Vec<String>) {
    if value.is_null() {
        if !spec.nullable {
            errors.push(format!("{path}: expected {}, found null", spec.kind));
        }
        return;
    }

    match spec.kind {
        FieldKind::Integer => check_integer(value, spec, path, errors),
        FieldKind::Number => {
            if !value.is_number() {
                errors.push(type_error(path, spec.kind, value));
            }
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                errors.push(type_error(path, spec.kind, value));
            }
        }
        FieldKind::String => match value.as_str() {
            Some(text) => check_length(text, spec, path, errors),
            None => errors.push(type_error(path, spec.kind, value)),
        },
        FieldKind::DateTime => match value.as_str() {
            Some(text) => {
                if DateTime::parse_from_rfc3339(text).is_err() {
                    errors.push(format!("{path}: '{text}' is not an RFC 3339 date-time"));
                }
            }
            None => errors.push(type_error(path, spec.kind, value)),
        },
    }
}

fn check_integer(value: &Value, spec: &FieldSpec, path: &str, errors: &mut Vec<String>) {
    let Value::Number(number) = value else {
        errors.push(type_error(path, spec.kind, value));
        return;
    };

    if let Some(n) = number.as_i64() {
        if let Some(min) = spec.min {
            if n < min {
                errors.push(format!("{path}: {n} is below minimum {min}"));
            }
        }
        if let Some(max) = spec.max {
            if n > max {
                errors.push(format!("{path}: {n} exceeds maximum {max}"));
            }
        }
    } else if let Some(n) = number.as_u64() {
        // Beyond i64, so above any i64 maximum.
        if let Some(max) = spec.max {
            errors.push(format!("{path}: {n} exceeds maximum {max}"));
        }
    } else {
        errors.push(format!("{path}: expected integer, found fractional number {number}"));
    }
}

fn check_length(text: &str, spec: &FieldSpec, path: &str, errors: &mut Vec<String>) {
    let len = text.chars().count();
    if let Some(min) = spec.min_len {
        if len < min {
            errors.push(format!("{path}: length {len} is below minimum {min}"));
        }
    }
    if let Some(max) = spec.max_len {
        if len > max {
            errors.push(format!("{path}: length {len} exceeds maximum {max}"));
        }
    }
}

fn type_error(path: &str, expected: FieldKind, found: &Value) -> String {
    format!("{path}: expected {expected}, found {}", json_type(found))
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
