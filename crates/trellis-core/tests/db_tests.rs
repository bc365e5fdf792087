use jiff::civil::date;
use tempfile::NamedTempFile;
use trellis_core::{
    models::{DependencyType, ItemPatch, ItemStatus, ItemType, NewPlanItem, PlanItem, Predecessor},
    Database, PlanningError,
};

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn new_item(project_id: u64, parent: Option<&PlanItem>, item_type: ItemType, name: &str) -> NewPlanItem {
    NewPlanItem {
        project_id,
        parent_id: parent.map(|p| p.id),
        item_type,
        name: name.to_string(),
        description: None,
        status: ItemStatus::NotStarted,
        progress: 0,
        start_date: None,
        end_date: None,
        duration_days: None,
        indent_level: parent.map_or(0, |p| p.indent_level + 1),
        sort_order: None,
        predecessors: Vec::new(),
        estimate_component_id: None,
    }
}

#[test]
fn test_database_initialization() {
    let (temp_file, _db) = create_test_db();
    assert!(temp_file.path().exists());

    // Opening an existing database again leaves the schema intact.
    Database::new(temp_file.path()).expect("Failed to reopen database");
}

#[test]
fn test_create_and_list_projects() {
    let (_temp_file, mut db) = create_test_db();

    let first = db
        .create_project("Office move", Some("Relocate the team"))
        .expect("Failed to create project");
    db.create_project("Website", None)
        .expect("Failed to create project");

    assert!(first.id > 0);
    assert_eq!(first.description.as_deref(), Some("Relocate the team"));

    let fetched = db
        .get_project(first.id)
        .expect("Failed to get project")
        .expect("Project should exist");
    assert_eq!(fetched.name, "Office move");

    let projects = db.list_projects().expect("Failed to list projects");
    assert_eq!(projects.len(), 2);
    assert!(db.project_exists(first.id).unwrap());
    assert!(!db.project_exists(999).unwrap());
    assert!(db.get_project(999).unwrap().is_none());
}

#[test]
fn test_create_item_assigns_sort_order() {
    let (_temp_file, mut db) = create_test_db();
    let project = db.create_project("P", None).unwrap();

    let m1 = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "M1"))
        .expect("Failed to create item");
    let m2 = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "M2"))
        .expect("Failed to create item");
    let d = db
        .create_item(new_item(project.id, Some(&m1), ItemType::Deliverable, "D"))
        .expect("Failed to create item");

    assert_eq!(m1.sort_order, 10);
    assert_eq!(m2.sort_order, 20);
    assert_eq!(d.sort_order, 10);
    assert_eq!(d.parent_id, Some(m1.id));
    assert_eq!(d.indent_level, 1);

    let stored = db.get_item(d.id).unwrap().expect("Item should exist");
    assert_eq!(stored, d);
}

#[test]
fn test_create_item_rejects_missing_parent_and_project() {
    let (_temp_file, mut db) = create_test_db();
    let project = db.create_project("P", None).unwrap();
    let ghost = PlanItem::new(project.id, ItemType::Milestone, "Ghost");

    let err = db
        .create_item(new_item(project.id, Some(&ghost), ItemType::Deliverable, "D"))
        .unwrap_err();
    assert!(matches!(err, PlanningError::ItemNotFound { id } if id == ghost.id));

    let err = db
        .create_item(new_item(42, None, ItemType::Milestone, "M"))
        .unwrap_err();
    assert!(matches!(err, PlanningError::ProjectNotFound { id: 42 }));
}

#[test]
fn test_update_item_round_trips_fields() {
    let (_temp_file, mut db) = create_test_db();
    let project = db.create_project("P", None).unwrap();
    let a = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "A"))
        .unwrap();
    let b = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "B"))
        .unwrap();

    let patch = ItemPatch {
        name: Some("B renamed".to_string()),
        description: Some(Some("Notes".to_string())),
        status: Some(ItemStatus::OnHold),
        progress: Some(25),
        start_date: Some(Some(date(2026, 5, 4))),
        end_date: Some(Some(date(2026, 5, 8))),
        duration_days: Some(Some(5)),
        predecessors: Some(vec![Predecessor {
            id: a.id,
            dependency_type: DependencyType::SS,
            lag: 2,
        }]),
        ..Default::default()
    };
    let updated = db.update_item(b.id, &patch).expect("Failed to update item");
    let stored = db.get_item(b.id).unwrap().unwrap();

    assert_eq!(stored.name, "B renamed");
    assert_eq!(stored.description.as_deref(), Some("Notes"));
    assert_eq!(stored.status, ItemStatus::OnHold);
    assert_eq!(stored.progress, 25);
    assert_eq!(stored.start_date, Some(date(2026, 5, 4)));
    assert_eq!(stored.duration_days, Some(5));
    assert_eq!(stored.predecessors, updated.predecessors);
    assert_eq!(stored.predecessors[0].dependency_type, DependencyType::SS);
    assert_eq!(stored.predecessors[0].lag, 2);

    // Clearing nullable fields.
    let cleared = db
        .update_item(
            b.id,
            &ItemPatch {
                description: Some(None),
                start_date: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.start_date, None);
    assert_eq!(cleared.end_date, Some(date(2026, 5, 8)));
}

#[test]
fn test_update_deleted_item_fails() {
    let (_temp_file, mut db) = create_test_db();
    let project = db.create_project("P", None).unwrap();
    let a = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "A"))
        .unwrap();
    db.set_items_deleted(&[a.id], true).unwrap();

    let err = db
        .update_item(a.id, &ItemPatch::predecessors(Vec::new()))
        .unwrap_err();
    assert!(matches!(err, PlanningError::ItemNotFound { .. }));
}

#[test]
fn test_soft_delete_and_restore() {
    let (_temp_file, mut db) = create_test_db();
    let project = db.create_project("P", None).unwrap();
    let a = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "A"))
        .unwrap();
    let b = db
        .create_item(new_item(project.id, Some(&a), ItemType::Deliverable, "B"))
        .unwrap();

    db.set_items_deleted(&[a.id, b.id], true).unwrap();
    assert!(db.list_items(project.id, false).unwrap().is_empty());
    let all = db.list_items(project.id, true).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|item| item.is_deleted));

    db.set_items_deleted(&[a.id, b.id], false).unwrap();
    assert_eq!(db.list_items(project.id, false).unwrap().len(), 2);
}

#[test]
fn test_soft_delete_unknown_id_changes_nothing() {
    let (_temp_file, mut db) = create_test_db();
    let project = db.create_project("P", None).unwrap();
    let a = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "A"))
        .unwrap();
    let ghost = PlanItem::new(project.id, ItemType::Milestone, "Ghost");

    let err = db.set_items_deleted(&[a.id, ghost.id], true).unwrap_err();
    assert!(matches!(err, PlanningError::ItemNotFound { id } if id == ghost.id));
    assert_eq!(db.list_items(project.id, false).unwrap().len(), 1);
}

#[test]
fn test_create_items_batch_keeps_prepared_fields() {
    let (_temp_file, mut db) = create_test_db();
    let project = db.create_project("P", None).unwrap();

    let mut root = PlanItem::new(project.id, ItemType::Milestone, "Root");
    root.sort_order = 5;
    let mut child = PlanItem::new(project.id, ItemType::Deliverable, "Child");
    child.parent_id = Some(root.id);
    child.indent_level = 1;
    child.sort_order = 6;
    child.predecessors.push(Predecessor::finish_to_start(root.id));

    let created = db
        .create_items(project.id, vec![root.clone(), child.clone()])
        .expect("Failed to create batch");
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|item| item.created_at.is_some()));

    let stored = db.get_item(child.id).unwrap().unwrap();
    assert_eq!(stored.parent_id, Some(root.id));
    assert_eq!(stored.sort_order, 6);
    assert_eq!(stored.predecessors, child.predecessors);
}

#[test]
fn test_recalculate_wbs() {
    let (_temp_file, mut db) = create_test_db();
    let project = db.create_project("P", None).unwrap();
    let m1 = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "M1"))
        .unwrap();
    let m2 = db
        .create_item(new_item(project.id, None, ItemType::Milestone, "M2"))
        .unwrap();
    let d1 = db
        .create_item(new_item(project.id, Some(&m2), ItemType::Deliverable, "D1"))
        .unwrap();
    let d2 = db
        .create_item(new_item(project.id, Some(&m2), ItemType::Deliverable, "D2"))
        .unwrap();

    db.recalculate_wbs(project.id).unwrap();
    let wbs = |db: &Database, id| db.get_item(id).unwrap().unwrap().wbs;
    assert_eq!(wbs(&db, m1.id).as_deref(), Some("1"));
    assert_eq!(wbs(&db, d2.id).as_deref(), Some("2.2"));

    db.set_items_deleted(&[m1.id, d1.id], true).unwrap();
    db.recalculate_wbs(project.id).unwrap();
    assert_eq!(wbs(&db, m2.id).as_deref(), Some("1"));
    assert_eq!(wbs(&db, d2.id).as_deref(), Some("1.1"));
    assert_eq!(wbs(&db, m1.id), None);
}
