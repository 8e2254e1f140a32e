//! Test helpers: build AppState and router for integration tests.
//!
//! Repositories are in-memory and the media store is a recording mock, so
//! these tests run without Postgres or Cloudinary:
//! `cargo test -p utkrisht-api`.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use std::sync::Arc;

use axum_test::TestServer;
use utkrisht_api::constants;
use utkrisht_api::services::upload::RetryPolicy;
use utkrisht_api::setup::routes;
use utkrisht_api::state::AppState;
use utkrisht_core::{Config, SiteConfig};
use utkrisht_db::InMemoryRepositories;
use utkrisht_storage::MockMediaStore;

pub const TEST_JWT_SECRET: &str = "integration-secret-key-at-least-32-chars";

/// Public API path (e.g. `/api/blog`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Admin API path (e.g. `/api/admin/projects`).
pub fn admin_path(path: &str) -> String {
    format!("{}{}", constants::ADMIN_PREFIX, path)
}

/// Test application: server plus handles on the doubles behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub db: InMemoryRepositories,
    pub store: MockMediaStore,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars = vec![
        ("DATABASE_URL", "postgres://localhost/utkrisht_test"),
        ("JWT_SECRET", TEST_JWT_SECRET),
        ("CORS_ORIGINS", "*"),
    ];
    vars.extend_from_slice(extra);
    let site = SiteConfig::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("test config");
    Config(Box::new(site))
}

/// Setup test app with default configuration.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(&[])
}

/// Setup test app with extra configuration variables.
pub fn setup_test_app_with(extra: &[(&str, &str)]) -> TestApp {
    let db = InMemoryRepositories::new();
    let store = MockMediaStore::new();

    let state = Arc::new(
        AppState::new(
            test_config(extra),
            db.repositories(),
            Arc::new(store.clone()),
        )
        .with_retry_policy(RetryPolicy::default().without_delays()),
    );
    let app = routes::setup_routes(state.clone()).expect("routes");
    let server = TestServer::new(app).expect("test server");

    TestApp {
        server,
        state,
        db,
        store,
    }
}
