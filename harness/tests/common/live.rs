//! Runtime shared by `#[live_api_test]` tests.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::Runtime;

static TEST_RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create test runtime")
});

/// Drive a live test body to completion on the shared runtime.
pub fn block_on<F: Future>(f: F) -> F::Output {
    TEST_RUNTIME.block_on(f)
}
