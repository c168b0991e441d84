use clap::{Arg, ArgAction, Command};

pub const ADMIN: &str = "admin";
pub const USERS: &str = "users";
pub const EVENTS: &str = "events";
pub const CREATE_EVENT: &str = "create-event";
pub const COMPLAINTS: &str = "complaints";
pub const INVITE: &str = "invite";
pub const REVOKE: &str = "revoke";
pub const SUSPEND: &str = "suspend";
pub const UNSUSPEND: &str = "unsuspend";
pub const DELETE_USER: &str = "delete-user";
pub const DELETE_COMPLAINT: &str = "delete-complaint";

pub const ARG_ROLE: &str = "role";
pub const ARG_STUDENT_TYPE: &str = "student-type";
pub const ARG_NAME: &str = "name";
pub const ARG_PERSISTENT: &str = "persistent";
pub const ARG_EVENT: &str = "event";
pub const ARG_USER: &str = "user";
pub const ARG_HOURS: &str = "hours";
pub const ARG_ID: &str = "id";
pub const ARG_YES: &str = "yes";

fn user_arg() -> Arg {
    Arg::new(ARG_USER).help("Target username").required(true)
}

fn event_arg() -> Arg {
    Arg::new(ARG_EVENT)
        .short('e')
        .long("event")
        .help("Event name")
        .required(true)
}

// Destructive commands ask on stdin unless --yes is given.
fn confirmable(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_YES)
            .short('y')
            .long("yes")
            .help("Do not ask for confirmation")
            .action(ArgAction::SetTrue),
    )
}

#[must_use]
pub fn subcommand() -> Command {
    Command::new(ADMIN)
        .about("Admin panel: users, events, passes and complaints")
        .subcommand_required(true)
        .subcommand(
            Command::new(USERS)
                .about("List users")
                .arg(
                    Arg::new(ARG_ROLE)
                        .long("role")
                        .help("Only users with this role")
                        .default_value(crate::console::admin::ALL),
                )
                .arg(
                    Arg::new(ARG_STUDENT_TYPE)
                        .long("student-type")
                        .help("Only internal or external attendees")
                        .value_parser([crate::console::admin::ALL, "internal", "external"])
                        .default_value(crate::console::admin::ALL),
                ),
        )
        .subcommand(Command::new(EVENTS).about("List events"))
        .subcommand(
            Command::new(CREATE_EVENT)
                .about("Create an event")
                .arg(Arg::new(ARG_NAME).help("Event name").required(true))
                .arg(
                    Arg::new(ARG_PERSISTENT)
                        .long("persistent")
                        .help("Passes for this event stay valid after a scan")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new(COMPLAINTS).about("List incident reports"))
        .subcommand(
            Command::new(INVITE)
                .about("Issue passes for an event")
                .arg(event_arg())
                .arg(
                    Arg::new(ARG_USER)
                        .help("Usernames to invite")
                        .required(true)
                        .num_args(1..),
                ),
        )
        .subcommand(confirmable(
            Command::new(REVOKE)
                .about("Revoke a user's pass for an event")
                .arg(event_arg())
                .arg(user_arg()),
        ))
        .subcommand(confirmable(
            Command::new(SUSPEND)
                .about("Suspend a user")
                .arg(user_arg())
                .arg(
                    Arg::new(ARG_HOURS)
                        .long("hours")
                        .help("Suspension length in hours (default: indefinite)")
                        .value_parser(clap::value_parser!(u32)),
                ),
        ))
        .subcommand(confirmable(
            Command::new(UNSUSPEND)
                .about("Lift a user's suspension")
                .arg(user_arg()),
        ))
        .subcommand(confirmable(
            Command::new(DELETE_USER)
                .about("Permanently delete a user")
                .arg(user_arg()),
        ))
        .subcommand(confirmable(
            Command::new(DELETE_COMPLAINT)
                .about("Delete an incident report")
                .arg(
                    Arg::new(ARG_ID)
                        .help("Complaint id")
                        .required(true)
                        .value_parser(clap::value_parser!(u64)),
                ),
        ))
}
