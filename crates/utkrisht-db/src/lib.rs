//! Utkrisht DB Library
//!
//! Postgres repositories for the site content, each behind an async trait so
//! the HTTP layer can run against in-memory doubles in tests.

pub mod db;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use db::*;
#[cfg(any(test, feature = "test-helpers"))]
pub use mock::InMemoryRepositories;
