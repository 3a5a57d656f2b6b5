use super::print_json;
use crate::{
    cli::globals::GlobalArgs,
    preferences::{Language, Preferences, Theme},
};
use anyhow::Result;
use serde_json::json;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub theme: Option<Theme>,
    pub language: Option<Language>,
    pub toggle_theme: bool,
}

/// # Errors
/// Returns an error if the store cannot be opened or written.
pub fn execute(args: &Args) -> Result<()> {
    let config = args.globals.config()?;
    let preferences = Preferences::new(args.globals.open_storage(&config)?);

    if let Some(theme) = args.theme {
        preferences.set_theme(theme)?;
    }
    if args.toggle_theme {
        preferences.toggle_theme()?;
    }
    if let Some(language) = args.language {
        preferences.set_language(language)?;
    }

    print_json(&json!({
        "theme": preferences.theme(),
        "language": preferences.language(),
    }))
}
