//! Documented field limits.
//!
//! The service does not publish its constraints, so these are the limits the
//! harness holds it to. Integer fields follow a positive 32-bit range, which
//! is what the service stores them as. String limits follow the longest
//! inputs exercised by the edge-case suite.

use crate::book::BookField;

/// Smallest valid `id` / `pageCount`.
pub const INT_MIN: i64 = 1;
/// Largest valid `id` / `pageCount`.
pub const INT_MAX: i64 = 2_147_483_647;
/// Integer beyond even a signed 64-bit range.
pub const INT_OVERFLOW: u64 = 9_223_372_036_854_775_808;

pub const TITLE_MIN_LEN: usize = 1;
pub const TITLE_MAX_LEN: usize = 1_000;
pub const DESCRIPTION_MIN_LEN: usize = 1;
pub const DESCRIPTION_MAX_LEN: usize = 2_000;
pub const EXCERPT_MIN_LEN: usize = 0;
pub const EXCERPT_MAX_LEN: usize = 5_000;
/// Overflowing strings are this many times the maximum length.
pub const STRING_OVERFLOW_FACTOR: usize = 10;

pub const DATE_MIN: &str = "0001-01-01T00:00:00Z";
pub const DATE_MAX: &str = "9999-12-31T23:59:59Z";
pub const DATE_BELOW_MIN: &str = "-0001-12-31T23:59:59Z";
pub const DATE_ABOVE_MAX: &str = "+10000-01-01T00:00:00Z";
pub const DATE_OVERFLOW: &str = "99999999-12-31T23:59:59Z";

/// Range for randomly generated valid ids.
pub const GENERATED_ID_RANGE: std::ops::RangeInclusive<i64> = 1_000..=9_999;
/// Range for randomly generated valid page counts.
pub const GENERATED_PAGE_RANGE: std::ops::RangeInclusive<i64> = 50..=1_000;

/// Inclusive character-length bounds of a string field.
#[must_use]
pub const fn string_bounds(field: BookField) -> Option<(usize, usize)> {
    match field {
        BookField::Title => Some((TITLE_MIN_LEN, TITLE_MAX_LEN)),
        BookField::Description => Some((DESCRIPTION_MIN_LEN, DESCRIPTION_MAX_LEN)),
        BookField::Excerpt => Some((EXCERPT_MIN_LEN, EXCERPT_MAX_LEN)),
        BookField::Id | BookField::PageCount | BookField::PublishDate => None,
    }
}
