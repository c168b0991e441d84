//! Client side of the event service: session, API client, the coordinator
//! verification workflow, and the account and admin calls the console views
//! are built from.

pub mod account;
pub mod admin;
pub mod api;
pub mod capture;
pub mod confirm;
pub mod error;
pub mod session;
pub mod types;
pub mod workflow;

pub use api::{ApiClient, Form, Payload};
pub use capture::{CapturePayload, ImageBlob};
pub use confirm::{Confirm, Outcome};
pub use error::{Error, Result};
pub use session::{Session, SessionStore};
pub use workflow::{IncidentReport, ScanAttempt, ScanMode, ScanStatus, VerificationWorkflow};
