use std::time::{Duration, Instant};

use super::case::{Case, Selection};
use super::cases::{self, CaseContext};
use super::report::{CaseOutcome, CaseStatus, RunReport};
use crate::client::BooksApi;
use crate::config::Config;
use crate::generator::TestDataGenerator;

const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Runs cases one after another against a [`BooksApi`].
///
/// A failing case is recorded and the run moves on; nothing a case does
/// can abort the remaining cases.
pub struct Runner<'a, C: ?Sized> {
    client: &'a C,
    config: &'a Config,
    settle_delay: Duration,
}

impl<'a, C: BooksApi + ?Sized> Runner<'a, C> {
    #[must_use]
    pub const fn new(client: &'a C, config: &'a Config) -> Self {
        Self {
            client,
            config,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Pause between creating a book and reading it back in lifecycle cases.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Seed for `case` within a run seeded with `run_seed`.
    #[must_use]
    pub fn case_seed(run_seed: u64, case: Case) -> u64 {
        run_seed.wrapping_add(case.index() as u64)
    }

    /// Run a single case with its own generator.
    pub async fn run_case(&self, case: Case, run_seed: u64) -> CaseOutcome {
        let seed = Self::case_seed(run_seed, case);
        let mut ctx = CaseContext {
            client: self.client,
            config: self.config,
            generator: TestDataGenerator::from_seed(seed),
            settle_delay: self.settle_delay,
        };

        tracing::debug!(case = case.name(), seed, "running case");
        let started = Instant::now();
        let result = cases::run(case, &mut ctx).await;
        let outcome = CaseOutcome::from_result(case, started.elapsed(), result);

        match outcome.status {
            CaseStatus::Passed => tracing::info!(
                case = case.name(),
                duration_ms = outcome.duration_ms,
                "{}",
                outcome.message
            ),
            CaseStatus::Skipped => tracing::warn!(
                case = case.name(),
                reason = %outcome.message,
                "case skipped"
            ),
            CaseStatus::Failed => tracing::error!(
                case = case.name(),
                errors = ?outcome.errors,
                "case failed"
            ),
        }
        outcome
    }

    /// Run every selected case and collect the report.
    pub async fn run(&self, selection: &Selection, run_seed: u64) -> RunReport {
        let selected = selection.cases();
        tracing::info!(
            cases = selected.len(),
            seed = run_seed,
            base_url = %self.config.api.base_url,
            "starting run"
        );

        let mut report = RunReport::new(run_seed, self.config.api.base_url.clone());
        for case in selected {
            report.push(self.run_case(case, run_seed).await);
        }
        report.finish();

        tracing::info!(
            passed = report.totals.passed,
            failed = report.totals.failed,
            skipped = report.totals.skipped,
            duration_ms = report.duration_ms,
            "run finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{BooksCall, MockBooksClient};
    use crate::client::{BookId, Envelope, TransportError};
    use crate::suite::Category;
    use serde_json::json;

    fn book(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Book",
            "description": "Lorem ipsum",
            "pageCount": 100,
            "excerpt": "Lorem ipsum dolor",
            "publishDate": "2025-10-07T12:28:53.1234567+00:00"
        })
    }

    fn runner<'a>(mock: &'a MockBooksClient, config: &'a Config) -> Runner<'a, MockBooksClient> {
        Runner::new(mock, config).with_settle_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn get_all_books_passes_on_valid_list() {
        let config = Config::default();
        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(200, json!([book(1), book(2)])));

        let outcome = runner(&mock, &config).run_case(Case::GetAllBooks, 0).await;

        assert_eq!(outcome.status, CaseStatus::Passed, "{:?}", outcome.errors);
        assert_eq!(outcome.message, "retrieved 2 books");
        assert_eq!(mock.calls(), vec![BooksCall::List]);
    }

    #[tokio::test]
    async fn schema_violations_are_all_reported() {
        let config = Config::default();
        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(200, json!([{"id": -1, "title": ""}])));

        let outcome = runner(&mock, &config).run_case(Case::GetAllBooks, 0).await;

        assert_eq!(outcome.status, CaseStatus::Failed);
        assert!(outcome.errors.len() >= 4, "{:?}", outcome.errors);
        assert!(outcome.errors.iter().any(|e| e.starts_with("$[0].id")));
        assert!(outcome.errors.iter().any(|e| e.contains("pageCount")));
    }

    #[tokio::test]
    async fn transport_error_fails_only_that_case() {
        let config = Config::default();
        let mock = MockBooksClient::new();
        mock.push_error(TransportError::InvalidUrl {
            url: "nowhere".into(),
            reason: "test".into(),
        });
        mock.push_response(Envelope::empty(404));

        let selection = Selection {
            categories: Vec::new(),
            cases: vec![Case::GetAllBooks, Case::GetBookByInvalidId],
        };
        let report = runner(&mock, &config).run(&selection, 5).await;

        assert_eq!(report.totals.total, 2);
        assert_eq!(report.totals.failed, 1);
        assert_eq!(report.totals.passed, 1);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(mock.calls()[1], BooksCall::Get(BookId::from(99_999)));
    }

    #[tokio::test]
    async fn lifecycle_skips_when_service_does_not_persist() {
        let config = Config::default();
        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(200, book(1234)));
        mock.push_response(Envelope::empty(404));

        let outcome = runner(&mock, &config).run_case(Case::FullCrudLifecycle, 1).await;

        assert_eq!(outcome.status, CaseStatus::Skipped);
        assert!(outcome.message.contains("1234"));
    }

    fn lifecycle_payload(seed: u64) -> crate::generator::GeneratedPayload {
        TestDataGenerator::from_seed(Runner::<MockBooksClient>::case_seed(
            seed,
            Case::FullCrudLifecycle,
        ))
        .book_titled("Sample", 100)
    }

    #[tokio::test]
    async fn lifecycle_fails_when_read_back_differs_from_payload() {
        let config = Config::default();
        let payload = lifecycle_payload(3);
        let mut stored = payload.body.clone();
        stored["title"] = json!("Completely different");
        stored["pageCount"] = json!(7);
        let updated = TestDataGenerator::updated_book(&payload, "Updated");

        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(200, payload.body.clone()));
        mock.push_response(Envelope::json(200, stored));
        mock.push_response(Envelope::json(200, updated.body.clone()));
        mock.push_response(Envelope::json(200, updated.body));
        mock.push_response(Envelope::empty(200));

        let outcome = runner(&mock, &config).run_case(Case::FullCrudLifecycle, 3).await;

        assert_eq!(outcome.status, CaseStatus::Failed);
        assert!(outcome.errors.iter().any(|e| e.starts_with("title")), "{:?}", outcome.errors);
        assert!(outcome.errors.iter().any(|e| e.starts_with("pageCount")), "{:?}", outcome.errors);
    }

    #[tokio::test]
    async fn lifecycle_passes_when_service_stores_payload() {
        let config = Config::default();
        let payload = lifecycle_payload(3);
        let updated = TestDataGenerator::updated_book(&payload, "Updated");
        let id = payload.id().expect("generated id");

        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(201, payload.body.clone()));
        mock.push_response(Envelope::json(200, payload.body.clone()));
        mock.push_response(Envelope::json(200, updated.body.clone()));
        mock.push_response(Envelope::json(200, updated.body));
        mock.push_response(Envelope::empty(204));

        let outcome = runner(&mock, &config).run_case(Case::FullCrudLifecycle, 3).await;

        assert_eq!(outcome.status, CaseStatus::Passed, "{:?}", outcome.errors);
        assert_eq!(mock.calls().last(), Some(&BooksCall::Get(BookId::from(id))));
    }

    #[tokio::test]
    async fn delete_book_accepts_created_and_no_content() {
        let config = Config::default();
        let payload = TestDataGenerator::from_seed(Runner::<MockBooksClient>::case_seed(
            0,
            Case::DeleteBook,
        ))
        .valid_book();

        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(201, payload.body));
        mock.push_response(Envelope::empty(204));

        let outcome = runner(&mock, &config).run_case(Case::DeleteBook, 0).await;

        assert_eq!(outcome.status, CaseStatus::Passed, "{:?}", outcome.errors);
    }

    #[tokio::test]
    async fn list_validation_reports_indexed_paths() {
        let config = Config::default();
        let mut broken = book(2);
        broken["pageCount"] = json!("many");
        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(200, json!([book(1), broken])));

        let outcome = runner(&mock, &config)
            .run_case(Case::BooksListDataValidation, 0)
            .await;

        assert_eq!(outcome.status, CaseStatus::Failed);
        assert_eq!(outcome.errors.len(), 1, "{:?}", outcome.errors);
        assert!(outcome.errors[0].starts_with("$[1].pageCount"));
    }

    #[tokio::test]
    async fn create_book_compares_echo_and_cleans_up() {
        let config = Config::default();
        let seed = 9;
        let expected = TestDataGenerator::from_seed(Runner::<MockBooksClient>::case_seed(
            seed,
            Case::CreateBook,
        ))
        .valid_book();
        let id = expected.id().expect("generated id");

        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(200, expected.body.clone()));
        mock.push_response(Envelope::empty(200));

        let outcome = runner(&mock, &config).run_case(Case::CreateBook, seed).await;

        assert_eq!(outcome.status, CaseStatus::Passed, "{:?}", outcome.errors);
        assert_eq!(
            mock.calls(),
            vec![
                BooksCall::Create(expected.body),
                BooksCall::Delete(BookId::from(id)),
            ]
        );
    }

    #[tokio::test]
    async fn create_book_reports_mismatched_echo() {
        let config = Config::default();
        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(200, book(1)));

        let outcome = runner(&mock, &config).run_case(Case::CreateBook, 0).await;

        assert_eq!(outcome.status, CaseStatus::Failed);
        assert!(outcome.errors.iter().any(|e| e.starts_with("title")));
    }

    #[tokio::test]
    async fn overflow_rejection_passes() {
        let config = Config::default();
        let mock = MockBooksClient::new();
        mock.push_response(Envelope::json(400, json!({"title": "One or more validation errors occurred."})));

        let outcome = runner(&mock, &config)
            .run_case(Case::CreateBookPageCountOverflow, 0)
            .await;

        assert_eq!(outcome.status, CaseStatus::Passed, "{:?}", outcome.errors);
    }

    #[tokio::test]
    async fn nonexistent_update_accepts_404() {
        let config = Config::default();
        let mock = MockBooksClient::new();

        let outcome = runner(&mock, &config)
            .run_case(Case::UpdateNonexistentBook, 0)
            .await;

        assert_eq!(outcome.status, CaseStatus::Passed);
        assert!(matches!(mock.calls()[0], BooksCall::Update(BookId::Numeric(99_999), _)));
    }

    #[tokio::test]
    async fn slow_response_fails_performance_case() {
        let mut config = Config::default();
        config.performance.response_time_limit_ms = 10;
        let mock = MockBooksClient::new();
        let mut envelope = Envelope::json(200, json!([]));
        envelope.elapsed = Duration::from_millis(50);
        mock.push_response(envelope);

        let outcome = runner(&mock, &config).run_case(Case::ApiResponseTime, 0).await;

        assert_eq!(outcome.status, CaseStatus::Failed);
        assert!(outcome.message.contains("exceeds limit of 10 ms"));
    }

    #[tokio::test]
    async fn selection_by_category_runs_only_matching_cases() {
        let config = Config::default();
        let mock = MockBooksClient::new();
        let selection = Selection {
            categories: vec![Category::Negative],
            cases: Vec::new(),
        };

        let report = runner(&mock, &config).run(&selection, 0).await;

        assert_eq!(report.totals.total, 7);
        assert!(report.outcomes.iter().all(|o| o.category == Category::Negative));
    }

    #[test]
    fn case_seeds_differ_per_case() {
        let a = Runner::<MockBooksClient>::case_seed(100, Case::GetAllBooks);
        let b = Runner::<MockBooksClient>::case_seed(100, Case::GetBookById);
        assert_ne!(a, b);
        assert_eq!(Runner::<MockBooksClient>::case_seed(u64::MAX, Case::GetBookById), 0);
    }
}
