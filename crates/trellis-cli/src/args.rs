use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{ImportArgs, ItemCommands, LinkArgs, ProjectCommands, TreeArgs};

/// Work breakdown planner for the terminal
///
/// Trellis keeps a project's plan as a strict hierarchy of components,
/// milestones, deliverables and tasks, with dependencies between items.
/// Items are referred to by outline number (`1.2`) or an ID prefix.
#[derive(Parser)]
#[command(version, about, name = "trellis")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/trellis/trellis.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project to work on. Defaults to the most recently created one
    #[arg(long, global = true)]
    pub project: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Trellis CLI
///
/// Without a command the current project's outline is shown.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage projects
    #[command(alias = "p")]
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage plan items
    #[command(alias = "i")]
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Show the project outline
    #[command(alias = "t")]
    Tree(TreeArgs),
    /// Link or unlink dependencies across a selection
    #[command(alias = "l")]
    Link(LinkArgs),
    /// Import a nested outline from a JSON file
    Import(ImportArgs),
    /// Interactive session with copy, paste, undo and redo
    Shell,
}
