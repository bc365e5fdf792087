//! Interactive session.
//!
//! One planner lives for the whole session, so the clipboard and the
//! undo history carry over from command to command. Each input line is
//! parsed with the same clap definitions as the one-shot commands.

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use trellis_core::OperationStatus;

use crate::{
    cli::{ImportArgs, ItemCommands, ItemsArgs, LinkArgs, TreeArgs},
    session::Session,
};

#[derive(Parser)]
#[command(name = "trellis", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
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
    /// Copy items and everything below them
    #[command(alias = "c")]
    Copy(ItemsArgs),
    /// Cut items; the next paste moves them
    #[command(alias = "x")]
    Cut(ItemsArgs),
    /// Paste the clipboard under an item, or at root level
    #[command(alias = "v")]
    Paste {
        /// Target item; root level when omitted
        target: Option<String>,
    },
    /// Revert the last change
    #[command(alias = "u")]
    Undo,
    /// Re-apply the last undone change
    #[command(alias = "r")]
    Redo,
    /// List the changes that can be undone
    History,
    /// Leave the session
    #[command(alias = "quit")]
    Exit,
}

enum Flow {
    Continue,
    Exit,
}

pub async fn run(mut session: Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    session.show_tree(&TreeArgs::default())?;

    loop {
        print!("trellis> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, leaving the session");
                None
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match execute(&mut session, &line).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(err) => session
                .renderer()
                .render(&OperationStatus::failure(format!("{err:#}")).to_string())?,
        }
    }
    Ok(())
}

async fn execute(session: &mut Session, line: &str) -> Result<Flow> {
    let words = split_line(line)?;
    if words.is_empty() {
        return Ok(Flow::Continue);
    }
    let command = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed.command,
        Err(err) => {
            // Covers --help as well as usage errors.
            print!("{err}");
            return Ok(Flow::Continue);
        }
    };

    match command {
        ShellCommand::Item { command } => session.handle_item_command(command).await?,
        ShellCommand::Tree(args) => session.show_tree(&args)?,
        ShellCommand::Link(args) => session.link(args).await?,
        ShellCommand::Import(args) => session.import(args).await?,
        ShellCommand::Copy(args) => session.copy(&args.items, false)?,
        ShellCommand::Cut(args) => session.copy(&args.items, true)?,
        ShellCommand::Paste { target } => session.paste(target.as_deref()).await?,
        ShellCommand::Undo => session.undo().await?,
        ShellCommand::Redo => session.redo().await?,
        ShellCommand::History => session.show_history()?,
        ShellCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

/// Splits a line on whitespace, keeping single- or double-quoted runs
/// together.
fn split_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        bail!("Unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line() {
        assert_eq!(
            split_line(r#"item add "Site survey" --parent 1"#).unwrap(),
            vec!["item", "add", "Site survey", "--parent", "1"]
        );
        assert_eq!(split_line("  undo  ").unwrap(), vec!["undo"]);
        assert_eq!(
            split_line("item update 1 -d ''").unwrap(),
            vec!["item", "update", "1", "-d", ""]
        );
        assert!(split_line("").unwrap().is_empty());
        assert!(split_line("item add \"open").is_err());
    }

    #[test]
    fn test_shell_line_parsing() {
        let parsed = ShellLine::try_parse_from(["paste", "1.2"]).unwrap();
        assert!(matches!(
            parsed.command,
            ShellCommand::Paste { target: Some(ref t) } if t == "1.2"
        ));
        assert!(ShellLine::try_parse_from(["copy"]).is_err());
        assert!(matches!(
            ShellLine::try_parse_from(["quit"]).unwrap().command,
            ShellCommand::Exit
        ));
    }
}
