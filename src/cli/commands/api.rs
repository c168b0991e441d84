use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the event API")
                .env("GATEPASS_API_URL")
                .default_value(DEFAULT_API_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long("session-file")
                .help("Where the login session is kept (default: ~/.config/gatepass/session.json)")
                .env("GATEPASS_SESSION_FILE")
                .global(true),
        )
}
