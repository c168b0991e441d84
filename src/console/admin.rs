//! Admin panel calls: users, events, complaints and invitations. Every
//! destructive call asks a [`Confirm`] first and makes no request when the
//! operator declines.

use super::{
    api::{ApiClient, Payload},
    confirm::{Confirm, Outcome},
    error::{Error, Result},
    types::{ActionResponse, Complaint, Event, Pass, User},
};
use serde_json::json;
use tracing::{info, instrument, warn};

pub const ALL: &str = "all";
const DEFAULT_STUDENT_TYPE: &str = "internal";

/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn users(api: &ApiClient) -> Result<Vec<User>> {
    api.session().require()?;
    api.get("users/").await
}

/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn events(api: &ApiClient) -> Result<Vec<Event>> {
    api.session().require()?;
    api.get("events/").await
}

/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn complaints(api: &ApiClient) -> Result<Vec<Complaint>> {
    api.session().require()?;
    api.get("complaints/").await
}

/// Narrows the user list by role and student type; `all` matches anything and
/// a user without a student type counts as internal.
#[must_use]
pub fn filter_users<'u>(users: &'u [User], role: &str, student_type: &str) -> Vec<&'u User> {
    users
        .iter()
        .filter(|user| role == ALL || user.role == role)
        .filter(|user| {
            student_type == ALL
                || user
                    .student_type
                    .as_deref()
                    .unwrap_or(DEFAULT_STUDENT_TYPE)
                    == student_type
        })
        .collect()
}

/// # Errors
/// Returns `Error::Validation` for a blank name, otherwise the API error.
#[instrument(skip(api))]
pub async fn create_event(api: &ApiClient, name: &str, persistent: bool) -> Result<Event> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("event name is required"));
    }
    api.session().require()?;
    api.post(
        "events/",
        Payload::Json(json!({ "name": name, "is_persistent": persistent })),
    )
    .await
}

/// Issues a pass for `username` to `event`.
///
/// # Errors
/// Returns the API error, e.g. when the user already holds a pass.
#[instrument(skip(api))]
pub async fn invite(api: &ApiClient, username: &str, event: &str) -> Result<Pass> {
    api.session().require()?;
    api.post(
        "admin/generate-invite/",
        Payload::Json(json!({ "username": username, "event": event })),
    )
    .await
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InviteSummary {
    pub invited: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Invites each user in turn; one failure does not stop the batch.
///
/// # Errors
/// Returns `Error::Validation` without an event or users, and
/// `Error::Unauthenticated` without a session.
#[instrument(skip(api, usernames), fields(count = usernames.len()))]
pub async fn bulk_invite(
    api: &ApiClient,
    usernames: &[String],
    event: &str,
) -> Result<InviteSummary> {
    let event = event.trim();
    if event.is_empty() {
        return Err(Error::validation("Please select an event."));
    }
    if usernames.is_empty() {
        return Err(Error::validation("No users selected."));
    }
    api.session().require()?;

    let mut summary = InviteSummary::default();

    for username in usernames {
        match invite(api, username, event).await {
            Ok(_) => summary.invited.push(username.clone()),
            Err(err) => {
                warn!(%username, error = %err, "invite failed");
                let reason = err.detail().unwrap_or_else(|| err.to_string());
                summary.failed.push((username.clone(), reason));
            }
        }
    }

    info!(
        invited = summary.invited.len(),
        failed = summary.failed.len(),
        "bulk invite finished"
    );

    Ok(summary)
}

async fn confirmed(
    api: &ApiClient,
    confirm: &impl Confirm,
    prompt: &str,
    path: &str,
    body: serde_json::Value,
    fallback: String,
) -> Result<Outcome> {
    api.session().require()?;

    if !confirm.confirm(prompt) {
        info!("cancelled: {prompt}");
        return Ok(Outcome::Cancelled);
    }

    let response: ActionResponse = api.post(path, Payload::Json(body)).await?;
    Ok(Outcome::Done(response.text().unwrap_or(fallback)))
}

/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn revoke_invite(
    api: &ApiClient,
    username: &str,
    event: &str,
    confirm: &impl Confirm,
) -> Result<Outcome> {
    confirmed(
        api,
        confirm,
        &format!("Revoke pass for {username} for {event}?"),
        "admin/revoke-invite/",
        json!({ "username": username, "event": event }),
        format!("Pass revoked for {username}."),
    )
    .await
}

/// Suspends `username`, for `hours` or indefinitely.
///
/// # Errors
/// Returns `Error::Validation` for a zero duration, otherwise the API error.
pub async fn suspend(
    api: &ApiClient,
    username: &str,
    hours: Option<u32>,
    confirm: &impl Confirm,
) -> Result<Outcome> {
    if hours == Some(0) {
        return Err(Error::validation("suspension duration must be at least one hour"));
    }

    let prompt = match hours {
        Some(hours) => format!("Suspend {username} for {hours} hours?"),
        None => format!("Suspend {username} indefinitely?"),
    };

    confirmed(
        api,
        confirm,
        &prompt,
        "admin/suspend-user/",
        json!({ "username": username, "action": "suspend", "duration": hours }),
        format!("User {username} suspended."),
    )
    .await
}

/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn unsuspend(api: &ApiClient, username: &str, confirm: &impl Confirm) -> Result<Outcome> {
    confirmed(
        api,
        confirm,
        &format!("Are you sure you want to UNSUSPEND {username}?"),
        "admin/suspend-user/",
        json!({ "username": username, "action": "unsuspend", "duration": null }),
        format!("User {username} unsuspended."),
    )
    .await
}

/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn delete_user(api: &ApiClient, username: &str, confirm: &impl Confirm) -> Result<Outcome> {
    confirmed(
        api,
        confirm,
        &format!("PERMANENTLY DELETE user {username}? This cannot be undone."),
        "admin/delete-user/",
        json!({ "username": username }),
        format!("User {username} deleted."),
    )
    .await
}

/// # Errors
/// Returns `Error::Unauthenticated` without a session, otherwise the API error.
pub async fn delete_complaint(api: &ApiClient, id: u64, confirm: &impl Confirm) -> Result<Outcome> {
    confirmed(
        api,
        confirm,
        "Delete this complaint report?",
        "admin/delete-complaint/",
        json!({ "id": id }),
        "Complaint deleted.".to_string(),
    )
    .await
}
