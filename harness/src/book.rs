//! Book record as exposed by the Books service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A book as returned by the service.
///
/// The service owns the record; the harness only holds transient copies
/// for assertions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub page_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub publish_date: DateTime<Utc>,
}

/// Fields of a [`Book`], named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookField {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "pageCount")]
    PageCount,
    #[serde(rename = "excerpt")]
    Excerpt,
    #[serde(rename = "publishDate")]
    PublishDate,
}

impl BookField {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Title,
        Self::Description,
        Self::PageCount,
        Self::Excerpt,
        Self::PublishDate,
    ];

    /// JSON property name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Description => "description",
            Self::PageCount => "pageCount",
            Self::Excerpt => "excerpt",
            Self::PublishDate => "publishDate",
        }
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Id | Self::PageCount)
    }

    /// `description` and `excerpt` may be omitted; everything else is required.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Description | Self::Excerpt)
    }
}

impl fmt::Display for BookField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown book field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for BookField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_service_payload() {
        let book: Book = serde_json::from_value(json!({
            "id": 1,
            "title": "Book 1",
            "description": "Lorem ipsum",
            "pageCount": 100,
            "excerpt": "Lorem ipsum dolor",
            "publishDate": "2025-10-07T12:28:53.1234567+00:00"
        }))
        .expect("should parse");

        assert_eq!(book.id, 1);
        assert_eq!(book.page_count, 100);
        assert_eq!(book.description.as_deref(), Some("Lorem ipsum"));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let book: Book = serde_json::from_value(json!({
            "id": 2,
            "title": "Sample",
            "pageCount": 100,
            "publishDate": "2023-01-01T00:00:00Z"
        }))
        .expect("should parse");

        assert!(book.description.is_none());
        assert!(book.excerpt.is_none());
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in BookField::ALL {
            assert_eq!(field.as_str().parse::<BookField>().ok(), Some(field));
        }
        assert_eq!("PAGECOUNT".parse::<BookField>().ok(), Some(BookField::PageCount));
        assert!("author".parse::<BookField>().is_err());
    }
}
