use crate::features::auth::{DenyBehavior, Role};
use clap::{Arg, ArgAction, Command};

pub const CMD_CHECK: &str = "check";

pub const ARG_PATH: &str = "path";
pub const ARG_ROLES: &str = "roles";
pub const ARG_ON_DENY: &str = "on-deny";
pub const ARG_RESET: &str = "reset";

#[must_use]
pub fn with_subcommand(command: Command) -> Command {
    command.subcommand(
        Command::new(CMD_CHECK)
            .about("Evaluate the route guards for a path against the stored session")
            .arg(
                Arg::new(ARG_PATH)
                    .help("Path to navigate to, example: /admin/users")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_ROLES)
                    .short('r')
                    .long("roles")
                    .help("Roles allowed by the role guard, comma separated (ADMIN, TRAINER, USER)")
                    .value_delimiter(',')
                    .value_parser(clap::value_parser!(Role)),
            )
            .arg(
                Arg::new(ARG_ON_DENY)
                    .long("on-deny")
                    .help("Role guard behavior on denial: unauthorized, redirect")
                    .default_value("unauthorized")
                    .value_parser(clap::value_parser!(DenyBehavior)),
            )
            .arg(
                Arg::new(ARG_RESET)
                    .long("reset")
                    .help("When the unauthorized view is shown, clear the session and go to login")
                    .action(ArgAction::SetTrue),
            ),
    )
}
