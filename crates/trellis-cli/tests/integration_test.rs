//! Integration tests comparing CLI output with the core Display types
//!
//! The CLI renders through the same Display implementations the library
//! exposes, so with `--no-color` both must print the same markdown.

use std::{collections::HashSet, path::Path, process::Command};

use tempfile::TempDir;
use trellis_core::{
    display::{Outline, Projects},
    params::CreateItem,
    store::SqliteStore,
    Planner, PlannerBuilder,
};

/// Helper function to create a planner over a fresh project in a temp database
async fn create_test_planner() -> (Planner<SqliteStore>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("test.db");

    let store = SqliteStore::open(&db_path)
        .await
        .expect("Failed to open store");
    let project = store
        .create_project("Integration", Some("CLI and library agree"))
        .await
        .expect("Failed to create project");
    let planner = PlannerBuilder::new(project.id)
        .build_with_store(store)
        .await
        .expect("Failed to create planner");

    (planner, temp_dir)
}

/// Run a CLI command and capture its output
fn run_cli_command(db_path: &Path, args: &[&str]) -> String {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_trellis"));
    cmd.arg("--no-color").arg("--database-file").arg(db_path);

    for arg in args {
        cmd.arg(arg);
    }

    let output = cmd.output().expect("Failed to run CLI command");
    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("Invalid UTF-8 in CLI output")
}

async fn seed(planner: &mut Planner<SqliteStore>) {
    let design = planner
        .create_item(&CreateItem {
            name: "Design".to_string(),
            ..Default::default()
        })
        .await
        .expect("Failed to create milestone");
    let mockups = planner
        .create_item(&CreateItem {
            parent_id: Some(design.id),
            name: "Mockups".to_string(),
            start_date: Some("2026-02-02".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to create deliverable");
    for name in ["Sketch", "Review"] {
        planner
            .create_item(&CreateItem {
                parent_id: Some(mockups.id),
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create task");
    }
}

#[tokio::test]
async fn test_tree_matches_outline_display() {
    let (mut planner, temp_dir) = create_test_planner().await;
    let db_path = temp_dir.path().join("test.db");
    seed(&mut planner).await;

    let cli_output = run_cli_command(&db_path, &["tree"]);
    let direct_output = Outline(planner.tree().visible_rows(&HashSet::new())).to_string();

    assert_eq!(cli_output, direct_output);
    assert!(cli_output.contains("    - **1.1.2** · Review"));
}

#[tokio::test]
async fn test_item_show_matches_item_display() {
    let (mut planner, temp_dir) = create_test_planner().await;
    let db_path = temp_dir.path().join("test.db");
    seed(&mut planner).await;

    let mockups = planner
        .items()
        .iter()
        .find(|item| item.name == "Mockups")
        .expect("Mockups exists")
        .clone();

    let cli_output = run_cli_command(&db_path, &["item", "show", "1.1"]);
    assert_eq!(cli_output, mockups.to_string());

    // A unique id prefix resolves to the same item.
    let prefix = &mockups.id.to_string()[..8];
    let by_prefix = run_cli_command(&db_path, &["item", "show", prefix]);
    assert_eq!(by_prefix, cli_output);
}

#[tokio::test]
async fn test_cli_changes_are_visible_to_the_library() {
    let (mut planner, temp_dir) = create_test_planner().await;
    let db_path = temp_dir.path().join("test.db");
    seed(&mut planner).await;

    run_cli_command(&db_path, &["link", "chain", "1.1.1", "1.1.2"]);
    planner.refresh().await.expect("Failed to refresh");

    let sketch = planner
        .items()
        .iter()
        .find(|item| item.name == "Sketch")
        .expect("Sketch exists");
    let review = planner
        .items()
        .iter()
        .find(|item| item.name == "Review")
        .expect("Review exists");
    assert_eq!(review.predecessors.len(), 1);
    assert_eq!(review.predecessors[0].id, sketch.id);

    let cli_output = run_cli_command(&db_path, &["tree"]);
    let direct_output = Outline(planner.tree().visible_rows(&HashSet::new())).to_string();
    assert_eq!(cli_output, direct_output);
    assert!(cli_output.contains("Review · ○ Not started · 0% · 1 deps"));
}

#[tokio::test]
async fn test_project_list_matches_projects_display() {
    let (planner, temp_dir) = create_test_planner().await;
    let db_path = temp_dir.path().join("test.db");

    let cli_output = run_cli_command(&db_path, &["project", "list"]);
    let projects = planner
        .store()
        .list_projects()
        .await
        .expect("Failed to list projects");
    assert_eq!(cli_output, Projects(projects).to_string());
    assert!(cli_output.contains("## Integration (ID: 1)"));
}
