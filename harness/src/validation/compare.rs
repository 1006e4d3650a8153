//! Field-by-field comparison of a returned book with the payload sent.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::validator::ValidationResult;

/// Report every property of `expected` whose value differs in `actual`.
///
/// Properties missing from `actual` are reported as missing. `publishDate`
/// compares as an instant when both sides parse as RFC 3339, otherwise by
/// calendar date, since the service re-serializes timestamps with its own
/// precision.
#[must_use]
pub fn compare_book_fields(actual: &Value, expected: &Value) -> ValidationResult {
    let (Some(actual_map), Some(expected_map)) = (actual.as_object(), expected.as_object()) else {
        return ValidationResult::from_errors(vec![
            "content: both sides must be JSON objects".to_string(),
        ]);
    };

    let mut errors = Vec::new();
    for (field, expected_value) in expected_map {
        let Some(actual_value) = actual_map.get(field) else {
            errors.push(format!("{field}: missing from response"));
            continue;
        };

        let equal = if field == "publishDate" {
            same_timestamp(actual_value, expected_value)
        } else {
            actual_value == expected_value
        };

        if !equal {
            errors.push(format!(
                "{field}: expected {}, got {}",
                preview(expected_value),
                preview(actual_value)
            ));
        }
    }
    ValidationResult::from_errors(errors)
}

fn same_timestamp(actual: &Value, expected: &Value) -> bool {
    match (actual.as_str(), expected.as_str()) {
        (Some(a), Some(e)) => match (parse_instant(a), parse_instant(e)) {
            (Some(a), Some(e)) => a == e,
            _ => date_part(a) == date_part(e),
        },
        _ => actual == expected,
    }
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn date_part(value: &str) -> &str {
    value.split_once('T').map_or(value, |(date, _)| date)
}

/// Render a value for an error message, shortening long strings.
fn preview(value: &Value) -> String {
    const MAX: usize = 40;
    match value {
        Value::String(text) if text.chars().count() > MAX => {
            let head: String = text.chars().take(MAX).collect();
            format!("\"{head}...\" ({} chars)", text.chars().count())
        }
        other => other.to_string(),
    }
}
