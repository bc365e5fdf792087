//! Terminal rendering of the markdown produced by the core display types.
//!
//! Rich output goes through a termimad skin; `--no-color` prints the
//! markdown as is.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::DarkGrey);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to the terminal.
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }
        for line in markdown.lines() {
            if line.starts_with('#') {
                println!("\x1b[34m{line}\x1b[0m");
            } else if let Some(rest) = line.strip_prefix("Success:") {
                println!("\x1b[32mSuccess:\x1b[0m{rest}");
            } else if let Some(rest) = line.strip_prefix("Error:") {
                println!("\x1b[31mError:\x1b[0m{rest}");
            } else {
                // Keep list indentation; termimad trims leading spaces.
                let trimmed = line.trim_start();
                print!("{}", &line[..line.len() - trimmed.len()]);
                self.skin.print_inline(trimmed);
                println!();
            }
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
