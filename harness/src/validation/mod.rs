//! Response validation.
//!
//! Expected shapes are declared as [`Schema`] values and checked by one
//! generic validator. Every discrepancy is collected, so a failing case
//! carries the full diagnostic rather than the first violation.

mod compare;
mod schema;
mod validator;

pub use compare::compare_book_fields;
pub use schema::{FieldKind, FieldSpec, Schema};
pub use validator::{validate, validate_value, Expectation, ValidationFailure, ValidationResult};

use once_cell::sync::Lazy;

use crate::generator::limits;

static BOOK_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::object([
        FieldSpec::integer("id").range(limits::INT_MIN, limits::INT_MAX),
        FieldSpec::string("title").length(limits::TITLE_MIN_LEN, limits::TITLE_MAX_LEN),
        FieldSpec::string("description")
            .optional()
            .nullable()
            .length(limits::DESCRIPTION_MIN_LEN, limits::DESCRIPTION_MAX_LEN),
        FieldSpec::integer("pageCount").range(limits::INT_MIN, limits::INT_MAX),
        FieldSpec::string("excerpt")
            .optional()
            .nullable()
            .length(0, limits::EXCERPT_MAX_LEN),
        FieldSpec::date_time("publishDate"),
    ])
});

static BOOK_STRUCTURE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::object([
        FieldSpec::integer("id"),
        FieldSpec::string("title").nullable(),
        FieldSpec::string("description").optional().nullable(),
        FieldSpec::integer("pageCount"),
        FieldSpec::string("excerpt").optional().nullable(),
        FieldSpec::string("publishDate"),
    ])
});

static BOOK_LIST_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::array_of(book_schema().clone()));

/// Schema of a single book, using the documented field limits.
#[must_use]
pub fn book_schema() -> &'static Schema {
    &BOOK_SCHEMA
}

/// Field names and JSON types of a book without any range or length limits.
///
/// Used to judge what the service echoes back after accepting a payload the
/// documented limits reject.
#[must_use]
pub fn book_structure_schema() -> &'static Schema {
    &BOOK_STRUCTURE_SCHEMA
}

/// Schema of the `GET /Books` response.
#[must_use]
pub fn book_list_schema() -> &'static Schema {
    &BOOK_LIST_SCHEMA
}
