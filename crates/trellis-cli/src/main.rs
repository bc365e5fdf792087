//! Trellis CLI Application
//!
//! Command-line interface for the Trellis work breakdown planner.

mod args;
mod cli;
mod item_ref;
mod renderer;
mod session;
mod shell;

use anyhow::Result;
use args::{Args, Commands};
use clap::Parser;
use log::info;
use renderer::TerminalRenderer;
use session::Session;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        project,
        command,
    } = Args::parse();

    let store = session::open_store(database_file).await?;
    let renderer = TerminalRenderer::new(!no_color);

    info!("Trellis started");

    match command {
        Some(Project { command }) => {
            session::handle_project_command(&store, &renderer, project, command).await
        }
        Some(Item { command }) => {
            Session::open(store, project, renderer)
                .await?
                .handle_item_command(command)
                .await
        }
        Some(Tree(args)) => Session::open(store, project, renderer)
            .await?
            .show_tree(&args),
        Some(Link(args)) => Session::open(store, project, renderer).await?.link(args).await,
        Some(Import(args)) => {
            Session::open(store, project, renderer)
                .await?
                .import(args)
                .await
        }
        Some(Shell) => shell::run(Session::open(store, project, renderer).await?).await,
        None => Session::open(store, project, renderer)
            .await?
            .show_tree(&Default::default()),
    }
}
