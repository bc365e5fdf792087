use trellis_core::{store::SqliteStore, Planner, PlannerBuilder};
use tempfile::TempDir;

/// Helper function to create a planner over a fresh project in a temp database
pub async fn create_test_planner() -> (TempDir, Planner<SqliteStore>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let store = SqliteStore::open(&db_path)
        .await
        .expect("Failed to open store");
    let project = store
        .create_project("Test Project", None)
        .await
        .expect("Failed to create project");

    let planner = PlannerBuilder::new(project.id)
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}
