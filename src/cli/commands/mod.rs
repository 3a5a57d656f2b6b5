pub mod client;
pub mod logging;
pub mod prefs;
pub mod route;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("lingodesk")
        .about("Session and route access control for the Lingodesk learning platform")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = client::with_args(command);
    let command = session::with_subcommands(command);
    let command = route::with_subcommand(command);
    let command = prefs::with_subcommand(command);
    logging::with_args(command)
}
