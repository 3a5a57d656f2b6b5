use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_STATUS: &str = "status";

pub const ARG_IDENTIFIER: &str = "identifier";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_NAME: &str = "name";
pub const ARG_EMAIL: &str = "email";

fn identifier_arg() -> Arg {
    Arg::new(ARG_IDENTIFIER)
        .short('i')
        .long("identifier")
        .help("Phone number or email")
        .env("LINGODESK_IDENTIFIER")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long("password")
        .help("Account password")
        .env("LINGODESK_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Sign in and persist the session")
                .arg(identifier_arg())
                .arg(password_arg()),
        )
        .subcommand(
            Command::new(CMD_REGISTER)
                .about("Create an account and sign in")
                .arg(
                    Arg::new(ARG_NAME)
                        .short('n')
                        .long("name")
                        .help("Display name")
                        .required(true),
                )
                .arg(identifier_arg())
                .arg(
                    Arg::new(ARG_EMAIL)
                        .short('e')
                        .long("email")
                        .help("Contact email (optional)"),
                )
                .arg(password_arg()),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("Sign out and wipe the persisted store"))
        .subcommand(
            Command::new(CMD_WHOAMI).about("Ask the server who the stored session belongs to"),
        )
        .subcommand(
            Command::new(CMD_STATUS)
                .about("Restore the stored session, revalidate it, and print the auth state"),
        )
}
