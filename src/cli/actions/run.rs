use crate::cli::actions::{prefs, route, session, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => session::login(args).await,
        Action::Register(args) => session::register(args).await,
        Action::Logout(globals) => session::logout(&globals).await,
        Action::Whoami(globals) => session::whoami(&globals).await,
        Action::Status(globals) => session::status(&globals).await,
        Action::Check(args) => route::check(args).await,
        Action::Prefs(args) => prefs::execute(&args),
    }
}
