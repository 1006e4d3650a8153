//! Declarative description of expected JSON shapes.

use std::fmt;

/// Expected JSON type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON number without fractional part. Floats are rejected.
    Integer,
    /// Any JSON number.
    Number,
    String,
    Boolean,
    /// RFC 3339 timestamp carried as a string.
    DateTime,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::DateTime => "date-time string",
        })
    }
}

/// Constraints for one object property.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    /// Inclusive numeric bounds (integers only).
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// Inclusive length bounds in characters (strings only).
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
            min: None,
            max: None,
            min_len: None,
            max_len: None,
        }
    }

    #[must_use]
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    #[must_use]
    pub const fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    #[must_use]
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    #[must_use]
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    #[must_use]
    pub const fn date_time(name: &'static str) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    /// Field may be absent.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Field may be `null`.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    #[must_use]
    pub const fn length(mut self, min: usize, max: usize) -> Self {
        self.min_len = Some(min);
        self.max_len = Some(max);
        self
    }
}

/// Expected shape of a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Object {
        fields: Vec<FieldSpec>,
        /// Whether properties not listed in `fields` are tolerated.
        allow_additional: bool,
    },
    Array(Box<Schema>),
}

impl Schema {
    /// Strict object schema: unknown properties are reported.
    #[must_use]
    pub fn object(fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        Self::Object {
            fields: fields.into_iter().collect(),
            allow_additional: false,
        }
    }

    #[must_use]
    pub fn array_of(items: Self) -> Self {
        Self::Array(Box::new(items))
    }

    /// Relax an object schema to accept unknown properties.
    #[must_use]
    pub fn allowing_additional(self) -> Self {
        match self {
            Self::Object { fields, .. } => Self::Object {
                fields,
                allow_additional: true,
            },
            Self::Array(items) => Self::Array(Box::new(items.allowing_additional())),
        }
    }

    /// Spec for a named property of an object schema.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        match self {
            Self::Object { fields, .. } => fields.iter().find(|f| f.name == name),
            Self::Array(_) => None,
        }
    }
}
