pub mod prefs;
pub mod route;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug)]
pub enum Action {
    Login(session::LoginArgs),
    Register(session::RegisterArgs),
    Logout(GlobalArgs),
    Whoami(GlobalArgs),
    Status(GlobalArgs),
    Check(route::Args),
    Prefs(prefs::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Prints a command result as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{json}");
    Ok(())
}
