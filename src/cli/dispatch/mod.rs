use crate::cli::actions::{account, admin, scan, Action};
use crate::cli::commands::{account as account_cmd, admin as admin_cmd, scan as scan_cmd};
use crate::console::{account::Landing, ScanMode};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((account_cmd::LOGIN, sub)) => Ok(Action::Login(account::Login {
            username: required(sub, account_cmd::ARG_USERNAME)?,
            password: SecretString::from(required(sub, account_cmd::ARG_PASSWORD)?),
            landing: required(sub, account_cmd::ARG_AS)?.parse::<Landing>()?,
        })),
        Some((account_cmd::LOGOUT, _)) => Ok(Action::Logout),
        Some((account_cmd::REGISTER, sub)) => Ok(Action::Register(account::Register {
            username: required(sub, account_cmd::ARG_USERNAME)?,
            password: SecretString::from(required(sub, account_cmd::ARG_PASSWORD)?),
            email: required(sub, account_cmd::ARG_EMAIL)?,
            role: required(sub, account_cmd::ARG_ROLE)?,
            student_type: required(sub, account_cmd::ARG_STUDENT_TYPE)?,
            college_name: sub.get_one::<String>(account_cmd::ARG_COLLEGE_NAME).cloned(),
            photo: sub.get_one::<String>(account_cmd::ARG_PHOTO).cloned(),
        })),
        Some((account_cmd::ME, _)) => Ok(Action::Me),
        Some((account_cmd::PASSES, _)) => Ok(Action::Passes),
        Some((scan_cmd::SCAN, sub)) => scan_action(sub),
        Some((admin_cmd::ADMIN, sub)) => admin_action(sub),
        Some((other, _)) => Err(anyhow!("unknown command: {other}")),
        None => Err(anyhow!("no command given, see --help")),
    }
}

fn scan_action(matches: &ArgMatches) -> Result<Action> {
    let (mode, sub, source) = match matches.subcommand() {
        Some((scan_cmd::QR, sub)) => (
            ScanMode::Qr,
            sub,
            sub.get_one::<String>(scan_cmd::ARG_DATA).cloned(),
        ),
        Some((scan_cmd::FACE, sub)) => (
            ScanMode::Face,
            sub,
            Some(required(sub, scan_cmd::ARG_IMAGE)?),
        ),
        _ => return Err(anyhow!("scan needs a mode: qr or face")),
    };

    let evidence = if sub.get_flag(scan_cmd::ARG_NO_EVIDENCE) {
        scan::Evidence::Omitted
    } else {
        sub.get_one::<String>(scan_cmd::ARG_EVIDENCE)
            .cloned()
            .map_or(scan::Evidence::Captured, scan::Evidence::Source)
    };

    Ok(Action::Scan(scan::Args {
        mode,
        source,
        report: sub.get_one::<String>(scan_cmd::ARG_REPORT).cloned(),
        evidence,
    }))
}

fn admin_action(matches: &ArgMatches) -> Result<Action> {
    let yes = |sub: &ArgMatches| sub.get_flag(admin_cmd::ARG_YES);

    let command = match matches.subcommand() {
        Some((admin_cmd::USERS, sub)) => admin::Command::Users {
            role: required(sub, admin_cmd::ARG_ROLE)?,
            student_type: required(sub, admin_cmd::ARG_STUDENT_TYPE)?,
        },
        Some((admin_cmd::EVENTS, _)) => admin::Command::Events,
        Some((admin_cmd::CREATE_EVENT, sub)) => admin::Command::CreateEvent {
            name: required(sub, admin_cmd::ARG_NAME)?,
            persistent: sub.get_flag(admin_cmd::ARG_PERSISTENT),
        },
        Some((admin_cmd::COMPLAINTS, _)) => admin::Command::Complaints,
        Some((admin_cmd::INVITE, sub)) => admin::Command::Invite {
            event: required(sub, admin_cmd::ARG_EVENT)?,
            users: sub
                .get_many::<String>(admin_cmd::ARG_USER)
                .map(|users| users.cloned().collect())
                .unwrap_or_default(),
        },
        Some((admin_cmd::REVOKE, sub)) => admin::Command::Revoke {
            event: required(sub, admin_cmd::ARG_EVENT)?,
            user: required(sub, admin_cmd::ARG_USER)?,
            yes: yes(sub),
        },
        Some((admin_cmd::SUSPEND, sub)) => admin::Command::Suspend {
            user: required(sub, admin_cmd::ARG_USER)?,
            hours: sub.get_one::<u32>(admin_cmd::ARG_HOURS).copied(),
            yes: yes(sub),
        },
        Some((admin_cmd::UNSUSPEND, sub)) => admin::Command::Unsuspend {
            user: required(sub, admin_cmd::ARG_USER)?,
            yes: yes(sub),
        },
        Some((admin_cmd::DELETE_USER, sub)) => admin::Command::DeleteUser {
            user: required(sub, admin_cmd::ARG_USER)?,
            yes: yes(sub),
        },
        Some((admin_cmd::DELETE_COMPLAINT, sub)) => admin::Command::DeleteComplaint {
            id: sub
                .get_one::<u64>(admin_cmd::ARG_ID)
                .copied()
                .context("missing required argument: id")?,
            yes: yes(sub),
        },
        Some((other, _)) => return Err(anyhow!("unknown admin command: {other}")),
        None => return Err(anyhow!("admin needs a command, see --help")),
    };

    Ok(Action::Admin(command))
}
