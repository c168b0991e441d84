use clap::{Arg, ArgAction, Command};

pub const LOGIN: &str = "login";
pub const LOGOUT: &str = "logout";
pub const REGISTER: &str = "register";
pub const ME: &str = "me";
pub const PASSES: &str = "passes";

pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_AS: &str = "as";
pub const ARG_EMAIL: &str = "email";
pub const ARG_ROLE: &str = "role";
pub const ARG_STUDENT_TYPE: &str = "student-type";
pub const ARG_COLLEGE_NAME: &str = "college-name";
pub const ARG_PHOTO: &str = "photo";

fn credentials(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_USERNAME)
                .short('u')
                .long("username")
                .help("Account username")
                .env("GATEPASS_USERNAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long("password")
                .help("Account password")
                .env("GATEPASS_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand(
            credentials(Command::new(LOGIN).about("Sign in and keep the session token")).arg(
                Arg::new(ARG_AS)
                    .long("as")
                    .help("Console to sign in to")
                    .value_parser(["user", "coordinator", "admin"])
                    .default_value("user"),
            ),
        )
        .subcommand(Command::new(LOGOUT).about("Forget the stored session"))
        .subcommand(
            credentials(Command::new(REGISTER).about("Create an attendee account"))
                .arg(
                    Arg::new(ARG_EMAIL)
                        .short('e')
                        .long("email")
                        .help("Contact email")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_ROLE)
                        .long("role")
                        .help("Account role")
                        .default_value("student"),
                )
                .arg(
                    Arg::new(ARG_STUDENT_TYPE)
                        .long("student-type")
                        .help("Whether the attendee is from this college")
                        .value_parser(["internal", "external"])
                        .default_value("internal"),
                )
                .arg(
                    Arg::new(ARG_COLLEGE_NAME)
                        .long("college-name")
                        .help("College of an external attendee"),
                )
                .arg(
                    Arg::new(ARG_PHOTO)
                        .long("photo")
                        .help("Face photo used for recognition at the gate (path or data URL)")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(Command::new(ME).about("Show the signed-in profile"))
        .subcommand(Command::new(PASSES).about("List your active passes"))
}
