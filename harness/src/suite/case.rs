use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Groups of cases, selectable from the command line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    HappyPath,
    Negative,
    EdgeCase,
    Integration,
    Regression,
    Performance,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HappyPath => "happy-path",
            Self::Negative => "negative",
            Self::EdgeCase => "edge-case",
            Self::Integration => "integration",
            Self::Regression => "regression",
            Self::Performance => "performance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every case the harness knows how to run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    GetAllBooks,
    GetBookById,
    CreateBook,
    UpdateBook,
    DeleteBook,
    GetBookByInvalidId,
    GetBookByNegativeId,
    CreateBookWithInvalidData,
    UpdateNonexistentBook,
    DeleteNonexistentBook,
    CreateBookMissingRequiredFields,
    CreateBookWrongDataTypes,
    EdgeCaseLongStrings,
    EdgeCaseSpecialCharacters,
    EdgeCaseEmptyFields,
    CreateBookVeryLongTitle,
    CreateBookSpecialCharacters,
    CreateBookUnicode,
    CreateBookInjectionAttempts,
    CreateBookPageCountOverflow,
    FullCrudLifecycle,
    ApiResponseConsistency,
    ApiHeadersConsistency,
    BookDataValidation,
    BooksListDataValidation,
    ApiResponseTime,
}

impl Case {
    pub const ALL: [Self; 26] = [
        Self::GetAllBooks,
        Self::GetBookById,
        Self::CreateBook,
        Self::UpdateBook,
        Self::DeleteBook,
        Self::GetBookByInvalidId,
        Self::GetBookByNegativeId,
        Self::CreateBookWithInvalidData,
        Self::UpdateNonexistentBook,
        Self::DeleteNonexistentBook,
        Self::CreateBookMissingRequiredFields,
        Self::CreateBookWrongDataTypes,
        Self::EdgeCaseLongStrings,
        Self::EdgeCaseSpecialCharacters,
        Self::EdgeCaseEmptyFields,
        Self::CreateBookVeryLongTitle,
        Self::CreateBookSpecialCharacters,
        Self::CreateBookUnicode,
        Self::CreateBookInjectionAttempts,
        Self::CreateBookPageCountOverflow,
        Self::FullCrudLifecycle,
        Self::ApiResponseConsistency,
        Self::ApiHeadersConsistency,
        Self::BookDataValidation,
        Self::BooksListDataValidation,
        Self::ApiResponseTime,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetAllBooks => "get_all_books",
            Self::GetBookById => "get_book_by_id",
            Self::CreateBook => "create_book",
            Self::UpdateBook => "update_book",
            Self::DeleteBook => "delete_book",
            Self::GetBookByInvalidId => "get_book_by_invalid_id",
            Self::GetBookByNegativeId => "get_book_by_negative_id",
            Self::CreateBookWithInvalidData => "create_book_with_invalid_data",
            Self::UpdateNonexistentBook => "update_nonexistent_book",
            Self::DeleteNonexistentBook => "delete_nonexistent_book",
            Self::CreateBookMissingRequiredFields => "create_book_missing_required_fields",
            Self::CreateBookWrongDataTypes => "create_book_wrong_data_types",
            Self::EdgeCaseLongStrings => "edge_case_long_strings",
            Self::EdgeCaseSpecialCharacters => "edge_case_special_characters",
            Self::EdgeCaseEmptyFields => "edge_case_empty_fields",
            Self::CreateBookVeryLongTitle => "create_book_very_long_title",
            Self::CreateBookSpecialCharacters => "create_book_special_characters",
            Self::CreateBookUnicode => "create_book_unicode",
            Self::CreateBookInjectionAttempts => "create_book_injection_attempts",
            Self::CreateBookPageCountOverflow => "create_book_page_count_overflow",
            Self::FullCrudLifecycle => "full_crud_lifecycle",
            Self::ApiResponseConsistency => "api_response_consistency",
            Self::ApiHeadersConsistency => "api_headers_consistency",
            Self::BookDataValidation => "book_data_validation",
            Self::BooksListDataValidation => "books_list_data_validation",
            Self::ApiResponseTime => "api_response_time",
        }
    }

    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::GetAllBooks
            | Self::GetBookById
            | Self::CreateBook
            | Self::UpdateBook
            | Self::DeleteBook => Category::HappyPath,
            Self::GetBookByInvalidId
            | Self::GetBookByNegativeId
            | Self::CreateBookWithInvalidData
            | Self::UpdateNonexistentBook
            | Self::DeleteNonexistentBook
            | Self::CreateBookMissingRequiredFields
            | Self::CreateBookWrongDataTypes => Category::Negative,
            Self::EdgeCaseLongStrings
            | Self::EdgeCaseSpecialCharacters
            | Self::EdgeCaseEmptyFields
            | Self::CreateBookVeryLongTitle
            | Self::CreateBookSpecialCharacters
            | Self::CreateBookUnicode
            | Self::CreateBookInjectionAttempts
            | Self::CreateBookPageCountOverflow => Category::EdgeCase,
            Self::FullCrudLifecycle => Category::Integration,
            Self::ApiResponseConsistency
            | Self::ApiHeadersConsistency
            | Self::BookDataValidation
            | Self::BooksListDataValidation => Category::Regression,
            Self::ApiResponseTime => Category::Performance,
        }
    }

    /// Position in [`Case::ALL`]; offsets the run seed for this case.
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or_default()
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown case '{0}' (run `books-harness list` for the catalogue)")]
pub struct UnknownCase(pub String);

impl FromStr for Case {
    type Err = UnknownCase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|case| case.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownCase(s.to_string()))
    }
}

impl Serialize for Case {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Case {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Which cases to run. Empty means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub categories: Vec<Category>,
    pub cases: Vec<Case>,
}

impl Selection {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn includes(&self, case: Case) -> bool {
        (self.categories.is_empty() && self.cases.is_empty())
            || self.cases.contains(&case)
            || self.categories.contains(&case.category())
    }

    /// Selected cases in execution order.
    #[must_use]
    pub fn cases(&self) -> Vec<Case> {
        Case::ALL.into_iter().filter(|c| self.includes(*c)).collect()
    }
}
