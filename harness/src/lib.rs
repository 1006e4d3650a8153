#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

pub mod book;
pub mod client;
pub mod config;
pub mod generator;
pub mod suite;
pub mod validation;
