//! # Gatepass (event pass console)
//!
//! `gatepass` is the operator side of an event-management service. Attendees
//! sign in to see their QR-coded passes, administrators manage users, events
//! and invitations, and coordinators verify people at the door by QR code or
//! by face.
//!
//! ## Verification workflow
//!
//! A coordinator drives one scan attempt at a time through
//! `idle → capturing → verifying → granted | denied`. A granted attempt may be
//! followed by an incident report against the identified user. Remote failures
//! never escape the workflow as errors; they become a denial with a readable
//! reason, and the operator resets to try again.
//!
//! ## Sessions
//!
//! The bearer token lives in an explicit [`console::Session`] injected into the
//! [`console::ApiClient`]. The CLI persists it in a session file between runs.
//! The token must never be logged.

pub mod cli;
pub mod console;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
