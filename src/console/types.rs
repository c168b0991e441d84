//! Request and response payloads for the event API. Login requests carry the
//! operator password, so they must never be logged.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

#[allow(clippy::trivially_copy_pass_by_ref)]
fn expose<S: Serializer>(secret: &&SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    #[serde(serialize_with = "expose")]
    pub password: &'a SecretString,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Identity record the verification endpoints return for a matched person.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDetails {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub student_type: Option<String>,
    #[serde(default)]
    pub college_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub passes: Vec<String>,
}

/// Successful answer of either verification endpoint.
///
/// QR verification fills `message` and `pass`; face recognition usually only
/// fills `user_details`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verification {
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "data")]
    pub pass: Option<Pass>,
    pub user_details: UserDetails,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub is_persistent: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pass {
    pub id: u64,
    #[serde(default)]
    pub user: Option<u64>,
    #[serde(default)]
    pub event: Option<Event>,
    pub qr_code_data: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl Pass {
    /// Event name shown on the pass card.
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.event
            .as_ref()
            .map_or("Hackathon Entry", |event| event.name.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub pass_event_names: Vec<String>,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub student_type: Option<String>,
    #[serde(default)]
    pub college_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Complaint {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub reporter_name: Option<String>,
    #[serde(default)]
    pub proof_photo: Option<String>,
    #[serde(default)]
    pub user_details: Option<User>,
}

/// Body of the admin endpoints, which reply with a `detail` or `message` line.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionResponse {
    #[must_use]
    pub fn text(self) -> Option<String> {
        self.detail.or(self.message)
    }
}
