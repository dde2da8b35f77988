//! Terminal display module
//!
//! Prints Markdown with termimad when colors are wanted, plain text otherwise.

use std::io::IsTerminal;
use termimad::crossterm::style::{Attribute, Color};
use termimad::MadSkin;
use tracing::warn;

/// `--color` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Follow NO_COLOR / CLICOLOR / CLICOLOR_FORCE and TTY detection
    #[default]
    Auto,
    Always,
    Never,
}

/// Decide whether to style output
///
/// An explicit `always`/`never` wins. Under `auto`, NO_COLOR disables colors,
/// CLICOLOR_FORCE (other than "0") enables them even when piped, CLICOLOR=0
/// disables them, and otherwise stdout must be a terminal.
pub fn should_use_colors(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => return true,
        ColorChoice::Never => return false,
        ColorChoice::Auto => {}
    }

    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0") {
        return true;
    }
    if std::env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }

    std::io::stdout().is_terminal()
}

/// Print Markdown to stdout
pub fn print_markdown(markdown: &str, choice: ColorChoice) {
    if !should_use_colors(choice) {
        println!("{}", markdown);
        return;
    }

    if let Err(e) = skin().write_text(markdown) {
        warn!("Terminal rendering failed ({}), using plain output", e);
        println!("{}", markdown);
    }
}

fn skin() -> MadSkin {
    let mut skin = MadSkin::default();

    skin.headers[0].set_fg(Color::Cyan);
    skin.headers[0].add_attr(Attribute::Bold);
    skin.headers[1].set_fg(Color::Blue);
    skin.headers[1].add_attr(Attribute::Bold);

    // Chart ids and file paths
    skin.inline_code.set_fg(Color::Yellow);

    skin.table.set_fg(Color::White);
    skin.bold.add_attr(Attribute::Bold);
    skin.bullet.set_fg(Color::Cyan);

    skin
}
