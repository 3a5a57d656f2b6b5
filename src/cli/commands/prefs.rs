use crate::preferences::{Language, Theme};
use clap::{Arg, ArgAction, Command};

pub const CMD_PREFS: &str = "prefs";

pub const ARG_THEME: &str = "theme";
pub const ARG_LANGUAGE: &str = "language";
pub const ARG_TOGGLE_THEME: &str = "toggle-theme";

#[must_use]
pub fn with_subcommand(command: Command) -> Command {
    command.subcommand(
        Command::new(CMD_PREFS)
            .about("Show or change display preferences")
            .arg(
                Arg::new(ARG_THEME)
                    .long("theme")
                    .help("Color theme: light, dark")
                    .value_parser(clap::value_parser!(Theme)),
            )
            .arg(
                Arg::new(ARG_LANGUAGE)
                    .long("language")
                    .help("Interface language: en, fr")
                    .value_parser(clap::value_parser!(Language)),
            )
            .arg(
                Arg::new(ARG_TOGGLE_THEME)
                    .long("toggle-theme")
                    .help("Switch between light and dark")
                    .action(ArgAction::SetTrue)
                    .conflicts_with(ARG_THEME),
            ),
    )
}
