use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STORE: &str = "store";
pub const ARG_TIMEOUT_MS: &str = "timeout-ms";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the learning platform API, example: https://api.lingodesk.dev/api")
                .env("LINGODESK_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STORE)
                .long("store")
                .help("Path of the persisted session store (default: ~/.lingodesk/lingodesk-session.json)")
                .env("LINGODESK_STORE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_MS)
                .long("timeout-ms")
                .help("Request timeout in milliseconds")
                .env("LINGODESK_TIMEOUT_MS")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
}
