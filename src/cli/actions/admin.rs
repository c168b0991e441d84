use crate::cli::globals::GlobalArgs;
use crate::console::{admin, ApiClient, Confirm, Outcome};
use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Users { role: String, student_type: String },
    Events,
    CreateEvent { name: String, persistent: bool },
    Complaints,
    Invite { event: String, users: Vec<String> },
    Revoke { event: String, user: String, yes: bool },
    Suspend { user: String, hours: Option<u32>, yes: bool },
    Unsuspend { user: String, yes: bool },
    DeleteUser { user: String, yes: bool },
    DeleteComplaint { id: u64, yes: bool },
}

/// Asks on the terminal; `--yes` answers for the operator.
#[derive(Debug, Clone, Copy)]
pub struct StdinConfirm {
    pub assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!("{prompt} [y/N] ");
        if io::stderr().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(err) => {
                warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn report(outcome: Outcome) {
    match outcome {
        Outcome::Done(message) => println!("{message}"),
        Outcome::Cancelled => println!("Cancelled."),
    }
}

/// # Errors
/// Returns an error without a session or when the API rejects the call.
pub async fn execute(command: Command, globals: &GlobalArgs) -> Result<()> {
    let api = globals.client()?;

    match command {
        Command::Users { role, student_type } => users(&api, &role, &student_type).await,
        Command::Events => events(&api).await,
        Command::CreateEvent { name, persistent } => {
            let event = admin::create_event(&api, &name, persistent).await?;
            println!("Event created: {} (id {})", event.name, event.id);
            Ok(())
        }
        Command::Complaints => complaints(&api).await,
        Command::Invite { event, users } => invite(&api, &event, &users).await,
        Command::Revoke { event, user, yes } => {
            let confirm = StdinConfirm { assume_yes: yes };
            report(admin::revoke_invite(&api, &user, &event, &confirm).await?);
            Ok(())
        }
        Command::Suspend { user, hours, yes } => {
            let confirm = StdinConfirm { assume_yes: yes };
            report(admin::suspend(&api, &user, hours, &confirm).await?);
            Ok(())
        }
        Command::Unsuspend { user, yes } => {
            let confirm = StdinConfirm { assume_yes: yes };
            report(admin::unsuspend(&api, &user, &confirm).await?);
            Ok(())
        }
        Command::DeleteUser { user, yes } => {
            let confirm = StdinConfirm { assume_yes: yes };
            report(admin::delete_user(&api, &user, &confirm).await?);
            Ok(())
        }
        Command::DeleteComplaint { id, yes } => {
            let confirm = StdinConfirm { assume_yes: yes };
            report(admin::delete_complaint(&api, id, &confirm).await?);
            Ok(())
        }
    }
}

async fn users(api: &ApiClient, role: &str, student_type: &str) -> Result<()> {
    let users = admin::users(api).await?;
    let shown = admin::filter_users(&users, role, student_type);

    if shown.is_empty() {
        println!("No users match.");
        return Ok(());
    }

    for user in shown {
        let passes = if user.pass_event_names.is_empty() {
            "-".to_string()
        } else {
            user.pass_event_names.join(", ")
        };
        println!(
            "{}\t{}\t{}\t{}\t{}{}",
            user.username,
            user.role,
            user.student_type.as_deref().unwrap_or("internal"),
            user.email,
            passes,
            if user.is_suspended { "\tSUSPENDED" } else { "" }
        );
    }

    Ok(())
}

async fn events(api: &ApiClient) -> Result<()> {
    for event in admin::events(api).await? {
        println!(
            "{}\t{}{}",
            event.id,
            event.name,
            if event.is_persistent { "\t(persistent)" } else { "" }
        );
    }
    Ok(())
}

async fn complaints(api: &ApiClient) -> Result<()> {
    let complaints = admin::complaints(api).await?;
    if complaints.is_empty() {
        println!("No complaints.");
        return Ok(());
    }

    for complaint in complaints {
        let target = complaint
            .user_details
            .as_ref()
            .map_or("unknown", |user| user.username.as_str());
        println!(
            "#{} [{}] {} -> {}: {}",
            complaint.id,
            complaint.status,
            complaint.reporter_name.as_deref().unwrap_or("unknown"),
            target,
            complaint.description
        );
        if let Some(proof) = complaint.proof_photo.as_deref().and_then(|p| api.media_url(p)) {
            println!("    proof: {proof}");
        }
    }
    Ok(())
}

async fn invite(api: &ApiClient, event: &str, users: &[String]) -> Result<()> {
    let summary = admin::bulk_invite(api, users, event).await?;

    if !summary.invited.is_empty() {
        println!(
            "Invited {} user(s) to {event}: {}",
            summary.invited.len(),
            summary.invited.join(", ")
        );
    }
    for (user, reason) in &summary.failed {
        eprintln!("  {user}: {reason}");
    }

    if summary.invited.is_empty() {
        bail!("no invitations were issued");
    }

    Ok(())
}
