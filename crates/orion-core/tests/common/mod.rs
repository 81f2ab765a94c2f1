#![allow(dead_code)]

use std::sync::Arc;

use orion_core::drafter::DisabledOracle;
use orion_core::models::{Plan, PlanMetadata, Step};
use orion_core::{Orchestrator, OrchestratorBuilder, Settings, SqlitePlanStore};
use tempfile::TempDir;

/// Settings that never sleep between tool-less steps.
pub fn fast_settings() -> Settings {
    Settings {
        idle_delay_ms: 0,
        tool_timeout_secs: 5,
        webhook_timeout_secs: 5,
        oracle_timeout_secs: 5,
        ..Settings::default()
    }
}

/// Helper function to create a SQLite store in a fresh directory.
pub async fn create_test_store() -> (TempDir, SqlitePlanStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqlitePlanStore::open(temp_dir.path().join("test.db"))
        .await
        .expect("Failed to open store");
    (temp_dir, store)
}

/// Helper function to create an offline orchestrator backed by SQLite.
pub async fn create_test_orchestrator(settings: Settings) -> (TempDir, Orchestrator) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let orchestrator = OrchestratorBuilder::new()
        .with_settings(settings)
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_oracle(Arc::new(DisabledOracle))
        .build()
        .await
        .expect("Failed to create orchestrator");
    (temp_dir, orchestrator)
}

pub fn sample_plan(id: &str) -> Plan {
    Plan {
        id: id.to_string(),
        steps: vec![
            Step::new("step_1", "Triage inbox")
                .with_summary("Sort unread mail")
                .with_tools(["inbox.triage"])
                .with_estimate("5m"),
            Step::new("step_2", "Queue leads").with_tools(["leads.queue", "ops.report.daily"]),
        ],
        metadata: PlanMetadata::new("Morning routine", "production", "U123"),
    }
}
