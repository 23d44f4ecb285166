//! Test helpers: build AppState and router for API integration tests.
//!
//! Run from workspace root: `cargo test -p inspecta-api`. The router is wired to the
//! in-memory repositories and storage from `inspecta_services::test_helpers`, so no Docker
//! is needed.

pub mod workflows;

use axum_test::TestServer;
use inspecta_api::constants;
use inspecta_api::setup::routes;
use inspecta_api::state::AppState;
use inspecta_core::{Config, PictureServiceConfig};
use inspecta_services::test_helpers::{FlakyStorage, MockPictureRepository};
use std::sync::Arc;

pub const INSPECTION_ID: i64 = 7;
pub const CHECKLIST_ITEM_ID: i64 = 70;
pub const SUB_ITEM_ID: i64 = 700;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus handles on the in-memory backends.
pub struct TestApp {
    pub server: TestServer,
    pub repository: MockPictureRepository,
    pub storage: FlakyStorage,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn create_test_config() -> Config {
    Config::from(PictureServiceConfig {
        database_url: "postgres://unused".to_string(),
        max_files_per_request: 5,
        default_page_size: 2,
        max_page_size: 10,
        ..Default::default()
    })
}

/// App with one inspection owning one checklist sub-item at position (1, 1, 1).
pub async fn setup_test_app() -> TestApp {
    let repository = MockPictureRepository::with_next_id(101);
    repository.add_inspection(INSPECTION_ID);
    repository.add_sub_item(INSPECTION_ID, CHECKLIST_ITEM_ID, SUB_ITEM_ID, (1, 1, 1));

    let storage = FlakyStorage::new();
    let config = create_test_config();

    let state = AppState::new(
        config.clone(),
        None,
        Arc::new(repository.clone()),
        Arc::new(repository.clone()),
        Arc::new(storage.clone()),
    )
    .expect("Failed to build app state");

    let router = routes::setup_routes(&config, Arc::new(state)).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        repository,
        storage,
    }
}
