use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::book::BookField;

/// Which edge of a documented range a boundary payload sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Smallest valid value (just inside).
    Min,
    /// One step below the smallest valid value (just outside).
    BelowMin,
    /// Largest valid value (just inside).
    Max,
    /// One step above the largest valid value (just outside).
    AboveMax,
    /// Far outside the range the service supports.
    Overflow,
}

impl Boundary {
    pub const ALL: [Self; 5] = [
        Self::Min,
        Self::BelowMin,
        Self::Max,
        Self::AboveMax,
        Self::Overflow,
    ];
}

/// What a payload is meant to exercise. Attached to every generated payload
/// so the intent of a case never depends on the random content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum PayloadIntent {
    /// Well-formed book with ordinary content.
    Valid,
    /// Well-formed book with unusual content (long strings, unicode, injection text).
    EdgeCase,
    /// Value placed at or past the edge of a documented range.
    Boundary {
        field: BookField,
        boundary: Boundary,
        in_range: bool,
    },
    /// Deliberately malformed.
    Invalid { fields: Vec<BookField> },
}

impl PayloadIntent {
    /// Whether the payload satisfies the documented book schema.
    #[must_use]
    pub const fn expects_valid(&self) -> bool {
        match self {
            Self::Valid | Self::EdgeCase => true,
            Self::Boundary { in_range, .. } => *in_range,
            Self::Invalid { .. } => false,
        }
    }
}

/// A request body plus the description used in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPayload {
    pub description: String,
    pub intent: PayloadIntent,
    pub body: Value,
}

impl GeneratedPayload {
    /// Numeric `id` of the body, when it has one.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.body.get("id").and_then(Value::as_i64)
    }

    #[must_use]
    pub fn field(&self, field: BookField) -> Option<&Value> {
        self.body.get(field.as_str())
    }
}
