//! Test utilities for handler and integration tests.

use crate::catalog::Catalog;
use crate::classifier::Classifier;
use crate::config::{ClassifierConfig, Config, MarkerStoreConfig};
use crate::db::handlers::InMemoryMarkers;
use crate::itinerary::TripPlanner;
use crate::AppState;
use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Defaults with an in-memory marker store and no artificial trip latency.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.markers.store = MarkerStoreConfig::Memory;
    config.trips.simulated_latency = Duration::ZERO;
    config.classifier.scratch_dir = std::env::temp_dir().join(format!("yatri-test-scratch-{}", std::process::id()));
    config
}

/// Classifier settings that run `sh <dir>/classify.sh` with `script_body` as the script.
pub fn create_test_classifier_config(dir: &Path, script_body: &str) -> ClassifierConfig {
    let script = dir.join("classify.sh");
    std::fs::write(&script, script_body).expect("Failed to write classifier script");

    ClassifierConfig {
        program: "sh".to_string(),
        script: Some(script),
        model_dir: dir.join("model"),
        scratch_dir: dir.join("scratch"),
        timeout: Duration::from_secs(10),
        ..Default::default()
    }
}

pub fn create_test_state(config: Config) -> AppState {
    AppState::builder()
        .classifier(Arc::new(Classifier::new(config.classifier.clone())))
        .config(config)
        .markers(Arc::new(InMemoryMarkers::new()))
        .catalog(Arc::new(Catalog::load().expect("Failed to load catalog")))
        .planner(Arc::new(TripPlanner::new().expect("Failed to build trip planner")))
        .build()
}

pub fn create_test_server(config: Config) -> TestServer {
    let router = crate::build_router(create_test_state(config)).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}
