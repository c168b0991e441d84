pub mod account;
pub mod admin;
pub mod api;
pub mod logging;
pub mod scan;

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

    let command = Command::new("gatepass")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = account::with_subcommands(command);
    let command = command.subcommand(scan::subcommand());
    let command = command.subcommand(admin::subcommand());
    let command = api::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "gatepass");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_debug_assert() {
        new().debug_assert();
    }

    #[test]
    fn test_subcommand_required() {
        let result = new().try_get_matches_from(vec!["gatepass", "--api-url", "http://x/api/"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_api_defaults() {
        temp_env::with_vars(
            [
                ("GATEPASS_API_URL", None::<&str>),
                ("GATEPASS_SESSION_FILE", None),
            ],
            || {
                let matches = new().get_matches_from(vec!["gatepass", "me"]);
                assert_eq!(
                    matches.get_one::<String>(api::ARG_API_URL).cloned(),
                    Some(api::DEFAULT_API_URL.to_string())
                );
                assert_eq!(matches.get_one::<String>(api::ARG_SESSION_FILE), None);
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("GATEPASS_API_URL", Some("https://gate.example.org/api/")),
                ("GATEPASS_SESSION_FILE", Some("/tmp/gatepass-session.json")),
                ("GATEPASS_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["gatepass", "passes"]);
                assert_eq!(
                    matches.get_one::<String>(api::ARG_API_URL).cloned(),
                    Some("https://gate.example.org/api/".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(api::ARG_SESSION_FILE).cloned(),
                    Some("/tmp/gatepass-session.json".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("GATEPASS_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["gatepass", "me"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("GATEPASS_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["gatepass".to_string(), "me".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_global_args_after_subcommand() {
        temp_env::with_vars([("GATEPASS_LOG_JSON", None::<&str>)], || {
            let matches = new().get_matches_from(vec![
                "gatepass",
                "scan",
                "qr",
                "EVENT_1_USER_2_erin",
                "--log-json",
                "--api-url",
                "http://10.0.0.2:8000/api/",
            ]);
            assert!(matches.get_flag(logging::ARG_LOG_JSON));
            assert_eq!(
                matches.get_one::<String>(api::ARG_API_URL).cloned(),
                Some("http://10.0.0.2:8000/api/".to_string())
            );
        });
    }
}
