//! Command handlers over one planning session.

use std::{collections::HashSet, path::PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info};
use trellis_core::{
    display::{CreateResult, DeleteResult, HistoryEntries, Outline, Projects, UpdateResult},
    models::{ItemId, Project},
    params::{ImportNode, MoveItem},
    store::SqliteStore,
    tree::TreeIndex,
    OperationStatus, Planner, PlannerBuilder,
};

use crate::{
    cli::{ImportArgs, ItemCommands, LinkArgs, ProjectCommands, TreeArgs},
    item_ref::ItemRefs,
    renderer::TerminalRenderer,
};

/// Opens the database at `database_file`, or the default XDG location.
pub async fn open_store(database_file: Option<PathBuf>) -> Result<SqliteStore> {
    let path = match database_file {
        Some(path) => path,
        None => SqliteStore::default_path().context("Failed to locate data directory")?,
    };
    debug!("Using database {}", path.display());
    SqliteStore::open(&path)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))
}

/// The requested project, or the most recently created one.
async fn current_project(store: &SqliteStore, requested: Option<u64>) -> Result<Project> {
    match requested {
        Some(id) => store
            .get_project(id)
            .await?
            .with_context(|| format!("Project {id} not found")),
        None => store
            .list_projects()
            .await?
            .into_iter()
            .max_by_key(|project| project.id)
            .context("No projects yet. Create one with `trellis project create <NAME>`"),
    }
}

pub async fn handle_project_command(
    store: &SqliteStore,
    renderer: &TerminalRenderer,
    requested: Option<u64>,
    command: ProjectCommands,
) -> Result<()> {
    match command {
        ProjectCommands::Create(args) => {
            let project = store
                .create_project(&args.name, args.description.as_deref())
                .await
                .context("Failed to create project")?;
            info!("Created project {}", project.id);
            renderer.render(&CreateResult::new(project).to_string())
        }
        ProjectCommands::List => {
            let projects = store.list_projects().await?;
            renderer.render(&Projects(projects).to_string())
        }
        ProjectCommands::Show(args) => {
            let project = current_project(store, args.id.or(requested)).await?;
            renderer.render(&project.to_string())
        }
    }
}

/// One planner plus the renderer its output goes to.
pub struct Session {
    planner: Planner<SqliteStore>,
    renderer: TerminalRenderer,
}

impl Session {
    pub async fn open(
        store: SqliteStore,
        requested: Option<u64>,
        renderer: TerminalRenderer,
    ) -> Result<Self> {
        let project = current_project(&store, requested).await?;
        let planner = PlannerBuilder::new(project.id)
            .build_with_store(store)
            .await
            .context("Failed to load project")?;
        info!("Opened project {} '{}'", project.id, project.name);
        Ok(Self { planner, renderer })
    }

    fn refs(&self) -> ItemRefs<'_> {
        ItemRefs::new(self.planner.items())
    }

    fn status(&self, message: impl Into<String>) -> Result<()> {
        self.renderer
            .render(&OperationStatus::success(message).to_string())
    }

    /// Outline number of `id`, or its name when it has none yet.
    fn label(&self, id: ItemId) -> String {
        self.planner
            .item(id)
            .map(|item| match &item.wbs {
                Some(wbs) => format!("{wbs} '{}'", item.name),
                None => format!("'{}'", item.name),
            })
            .unwrap_or_else(|| id.to_string())
    }

    pub async fn handle_item_command(&mut self, command: ItemCommands) -> Result<()> {
        match command {
            ItemCommands::Add(args) => {
                let params = args.into_params(&self.refs())?;
                let item = self.planner.create_item(&params).await?;
                self.renderer.render(&CreateResult::new(item).to_string())
            }
            ItemCommands::Update(args) => {
                let params = args.into_params(&self.refs())?;
                let changes = params
                    .to_patch()?
                    .changed_fields()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                let item = self.planner.update_item(&params).await?;
                self.renderer
                    .render(&UpdateResult::with_changes(item, changes).to_string())
            }
            ItemCommands::Show(args) => {
                let id = self.refs().resolve(&args.item)?;
                match self.planner.item(id) {
                    Some(item) => self.renderer.render(&item.to_string()),
                    None => bail!("Item {id} not found"),
                }
            }
            ItemCommands::Delete(args) => {
                let ids = self.refs().resolve_all(&args.items)?;
                let first = self.planner.item(ids[0]).cloned();
                let deleted = self.planner.delete_items(&ids).await?;
                match first {
                    Some(item) if ids.len() == 1 => self.renderer.render(
                        &DeleteResult::with_cascaded(item, deleted.len() - 1).to_string(),
                    ),
                    _ => self.status(format!("Deleted {} items", deleted.len())),
                }
            }
            ItemCommands::Move(args) => {
                let refs = self.refs();
                let id = refs.resolve(&args.item)?;
                let parent_id = refs.resolve_optional(args.parent.as_deref())?;
                let sort_order =
                    sort_order_at(&self.planner.tree(), parent_id, args.position, id);
                let item = self
                    .planner
                    .move_item(&MoveItem {
                        id,
                        parent_id,
                        sort_order,
                    })
                    .await?;
                self.status(format!("Moved {}", self.label(item.id)))
            }
            ItemCommands::Promote(args) => {
                let id = self.refs().resolve(&args.item)?;
                let item = self.planner.promote(id).await?;
                self.status(format!("Promoted {} to {}", self.label(item.id), item.item_type))
            }
            ItemCommands::Demote(args) => {
                let id = self.refs().resolve(&args.item)?;
                let item = self.planner.demote(id).await?;
                self.status(format!("Demoted {} to {}", self.label(item.id), item.item_type))
            }
            ItemCommands::Drop(args) => {
                let params = args.into_params(&self.refs())?;
                let moved = self.planner.drop_items(&params).await?;
                self.status(format!(
                    "Dropped {} {}",
                    moved.len(),
                    if moved.len() == 1 { "item" } else { "items" }
                ))
            }
        }
    }

    pub fn show_tree(&self, args: &TreeArgs) -> Result<()> {
        let collapsed: HashSet<ItemId> =
            self.refs().resolve_all(&args.collapse)?.into_iter().collect();
        let rows = self.planner.tree().visible_rows(&collapsed);
        self.renderer.render(&Outline(rows).to_string())
    }

    pub async fn link(&mut self, args: LinkArgs) -> Result<()> {
        let ids = self.refs().resolve_all(&args.items)?;
        let summary = self.planner.link(args.strategy.into(), &ids).await?;
        self.renderer.render(&summary.to_string())
    }

    pub async fn import(&mut self, args: ImportArgs) -> Result<()> {
        let text = std::fs::read_to_string(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        let nodes: Vec<ImportNode> = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a valid outline", args.file.display()))?;
        let parent_id = self.refs().resolve_optional(args.parent.as_deref())?;

        let created = self.planner.import_structure(&nodes, parent_id).await?;
        self.status(format!("Imported {} items", created.len()))?;
        self.show_tree(&TreeArgs::default())
    }

    pub fn copy(&mut self, items: &[String], cut: bool) -> Result<()> {
        let ids = self.refs().resolve_all(items)?;
        let count = if cut {
            self.planner.cut(&ids)?
        } else {
            self.planner.copy(&ids)?
        };
        let verb = if cut { "Cut" } else { "Copied" };
        self.status(format!("{verb} {count} items"))
    }

    pub async fn paste(&mut self, target: Option<&str>) -> Result<()> {
        let target_id = self.refs().resolve_optional(target)?;
        let outcome = self.planner.paste(target_id).await?;
        self.renderer.render(&outcome.to_string())
    }

    pub async fn undo(&mut self) -> Result<()> {
        match self.planner.undo().await? {
            Some(entry) => self.status(format!("Undid {}", entry.action.label())),
            None => self
                .renderer
                .render(&OperationStatus::failure("Nothing to undo.").to_string()),
        }
    }

    pub async fn redo(&mut self) -> Result<()> {
        match self.planner.redo().await? {
            Some(entry) => self.status(format!("Redid {}", entry.action.label())),
            None => self
                .renderer
                .render(&OperationStatus::failure("Nothing to redo.").to_string()),
        }
    }

    pub fn show_history(&self) -> Result<()> {
        let entries = self.planner.history().undo_entries().collect();
        self.renderer.render(&HistoryEntries(entries).to_string())
    }

    pub fn renderer(&self) -> &TerminalRenderer {
        &self.renderer
    }
}

/// Sort order that lands an item at `position` among the children of
/// `parent_id`, ignoring the item itself. `None` appends.
fn sort_order_at(
    tree: &TreeIndex<'_>,
    parent_id: Option<ItemId>,
    position: Option<usize>,
    moving: ItemId,
) -> i64 {
    let siblings: Vec<i64> = tree
        .children(parent_id)
        .iter()
        .filter(|sibling| sibling.id != moving)
        .map(|sibling| sibling.sort_order)
        .collect();
    match position.and_then(|p| siblings.get(p)) {
        Some(&order) => order,
        None => siblings.iter().max().map_or(0, |max| max + 1),
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::models::{ItemType, PlanItem};

    use super::*;

    #[test]
    fn test_sort_order_at() {
        let root = PlanItem::new(1, ItemType::Milestone, "Root");
        let child = |name: &str, order: i64| PlanItem {
            parent_id: Some(root.id),
            indent_level: 1,
            sort_order: order,
            ..PlanItem::new(1, ItemType::Deliverable, name)
        };
        let items = vec![root.clone(), child("A", 10), child("B", 20), child("C", 30)];
        let tree = TreeIndex::new(&items);
        let moving = items[1].id;

        assert_eq!(sort_order_at(&tree, Some(root.id), Some(0), moving), 20);
        assert_eq!(sort_order_at(&tree, Some(root.id), Some(1), moving), 30);
        assert_eq!(sort_order_at(&tree, Some(root.id), Some(5), moving), 31);
        assert_eq!(sort_order_at(&tree, Some(root.id), None, moving), 31);
        assert_eq!(sort_order_at(&tree, Some(items[3].id), None, moving), 0);
    }
}
