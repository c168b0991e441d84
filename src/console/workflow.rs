//! Coordinator verification workflow.
//!
//! One scan attempt at a time moves through
//! `idle → capturing → verifying → granted | denied` and returns to `idle`
//! only through [`VerificationWorkflow::reset`]. Remote failures are folded
//! into a `denied` attempt with a readable reason; only local precondition
//! violations come back as errors. A granted attempt may be followed by a
//! single incident report against the identified user.

use super::{
    api::{ApiClient, Form, Payload},
    capture::{CapturePayload, ImageBlob},
    error::{Error, Result},
    types::{UserDetails, Verification},
};
use serde_json::json;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use ulid::Ulid;

const VERIFY_QR_PATH: &str = "admin/verify-qr/";
const FACE_RECOGNIZE_PATH: &str = "admin/face-recognize/";
const COMPLAINTS_PATH: &str = "complaints/";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    Qr,
    Face,
}

impl ScanMode {
    /// Denial shown when the server gives no reason.
    #[must_use]
    pub const fn fallback_reason(self) -> &'static str {
        match self {
            Self::Qr => "Verification Failed",
            Self::Face => "Face verification failed.",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qr => f.write_str("qr"),
            Self::Face => f.write_str("face"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Capturing,
    Verifying,
    Granted,
    Denied,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Verifying => "verifying",
            Self::Granted => "granted",
            Self::Denied => "denied",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub struct ScanAttempt {
    id: Ulid,
    mode: ScanMode,
    status: ScanStatus,
    payload: Option<CapturePayload>,
    details: Option<Verification>,
    reason: Option<String>,
    report_draft: Option<String>,
    reported: bool,
}

impl ScanAttempt {
    fn new(mode: ScanMode) -> Self {
        Self {
            id: Ulid::new(),
            mode,
            status: ScanStatus::Capturing,
            payload: None,
            details: None,
            reason: None,
            report_draft: None,
            reported: false,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Ulid {
        self.id
    }

    #[must_use]
    pub const fn mode(&self) -> ScanMode {
        self.mode
    }

    #[must_use]
    pub const fn status(&self) -> ScanStatus {
        self.status
    }

    #[must_use]
    pub const fn payload(&self) -> Option<&CapturePayload> {
        self.payload.as_ref()
    }

    /// Server answer of a granted attempt.
    #[must_use]
    pub const fn details(&self) -> Option<&Verification> {
        self.details.as_ref()
    }

    /// Why a denied attempt was denied.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    #[must_use]
    pub fn report_draft(&self) -> Option<&str> {
        self.report_draft.as_deref()
    }

    #[must_use]
    pub const fn is_reported(&self) -> bool {
        self.reported
    }

    /// The image a face attempt was verified with, usable as report evidence.
    #[must_use]
    pub fn captured_image(&self) -> Option<&ImageBlob> {
        match &self.payload {
            Some(CapturePayload::Image(image)) => Some(image),
            _ => None,
        }
    }

    fn identity(&self) -> Option<&UserDetails> {
        self.details.as_ref().map(|details| &details.user_details)
    }

    /// Builds an incident report against the identified user.
    fn incident_report(&self, text: &str, evidence: Option<ImageBlob>) -> Result<IncidentReport> {
        if self.status != ScanStatus::Granted {
            return Err(Error::validation(format!(
                "incident reports need a granted scan, attempt is {}",
                self.status
            )));
        }

        if self.reported {
            return Err(Error::validation(
                "an incident report was already filed for this scan",
            ));
        }

        let description = text.trim();
        if description.is_empty() {
            return Err(Error::validation("incident description is required"));
        }

        let target = self
            .identity()
            .map(|identity| identity.name.trim())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::validation("granted scan has no identified user"))?;

        Ok(IncidentReport {
            target_username: target.to_string(),
            description: description.to_string(),
            evidence,
        })
    }
}

/// Coordinator-filed note against an identified user.
///
/// Only a granted [`ScanAttempt`] can produce one.
#[derive(Clone, Debug)]
pub struct IncidentReport {
    target_username: String,
    description: String,
    evidence: Option<ImageBlob>,
}

impl IncidentReport {
    #[must_use]
    pub fn target_username(&self) -> &str {
        &self.target_username
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn evidence(&self) -> Option<&ImageBlob> {
        self.evidence.as_ref()
    }

    fn into_form(self) -> Form {
        let form = Form::new()
            .text("username", self.target_username)
            .text("description", self.description);

        match self.evidence {
            Some(image) => form.file("proof_photo", image),
            None => form,
        }
    }
}

/// Drives one scan attempt at a time against the verification endpoints.
pub struct VerificationWorkflow<'a> {
    api: &'a ApiClient,
    attempt: Option<ScanAttempt>,
}

impl<'a> VerificationWorkflow<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api, attempt: None }
    }

    #[must_use]
    pub const fn api(&self) -> &'a ApiClient {
        self.api
    }

    #[must_use]
    pub fn status(&self) -> ScanStatus {
        self.attempt
            .as_ref()
            .map_or(ScanStatus::Idle, ScanAttempt::status)
    }

    #[must_use]
    pub const fn attempt(&self) -> Option<&ScanAttempt> {
        self.attempt.as_ref()
    }

    /// Begins capturing for a new attempt.
    ///
    /// A finished attempt is discarded first, exactly as `reset` would.
    ///
    /// # Errors
    /// Returns `Error::Validation` while another attempt is capturing or
    /// verifying.
    pub fn start_attempt(&mut self, mode: ScanMode) -> Result<&ScanAttempt> {
        match self.status() {
            ScanStatus::Capturing | ScanStatus::Verifying => {
                return Err(Error::validation(format!(
                    "a scan attempt is already {}, reset it first",
                    self.status()
                )));
            }
            ScanStatus::Granted | ScanStatus::Denied => self.reset(),
            ScanStatus::Idle => {}
        }

        let attempt = self.attempt.insert(ScanAttempt::new(mode));
        debug!(attempt = %attempt.id, %mode, "scan attempt started");

        Ok(attempt)
    }

    /// Sends the capture for verification and resolves the attempt.
    ///
    /// Remote failures (non-2xx, unreachable server, malformed body) end the
    /// attempt as `denied`; they are not returned as errors.
    ///
    /// # Errors
    /// Returns `Error::Validation` if no attempt is capturing, the payload does
    /// not match the attempt mode, or the QR text is empty. The attempt stays
    /// in `capturing` in those cases.
    #[instrument(skip_all)]
    pub async fn submit_capture(&mut self, payload: CapturePayload) -> Result<&ScanAttempt> {
        let api = self.api;

        let attempt = match self.attempt.as_mut() {
            Some(attempt) if attempt.status == ScanStatus::Capturing => attempt,
            Some(attempt) => {
                return Err(Error::validation(format!(
                    "cannot submit a capture while the attempt is {}",
                    attempt.status
                )))
            }
            None => return Err(Error::validation("no scan attempt in progress")),
        };

        match (&payload, attempt.mode) {
            (CapturePayload::QrText(text), ScanMode::Qr) if text.trim().is_empty() => {
                return Err(Error::validation("QR data is empty"));
            }
            (CapturePayload::QrText(_), ScanMode::Qr)
            | (CapturePayload::Image(_), ScanMode::Face) => {}
            (_, mode) => {
                return Err(Error::validation(format!(
                    "capture does not match the {mode} scan mode"
                )));
            }
        }

        attempt.status = ScanStatus::Verifying;
        let payload = attempt.payload.insert(payload);

        debug!(attempt = %attempt.id, "verifying capture");

        let outcome = match payload {
            CapturePayload::QrText(text) => verify_qr(api, text.trim()).await,
            CapturePayload::Image(image) => recognize_face(api, image.clone()).await,
        };

        match outcome {
            Ok(verification) => {
                info!(
                    attempt = %attempt.id,
                    user = %verification.user_details.name,
                    "access granted"
                );
                attempt.details = Some(verification);
                attempt.status = ScanStatus::Granted;
            }
            Err(err) => {
                let reason = denial_reason(attempt.mode, &err);
                warn!(attempt = %attempt.id, error = %err, "access denied");
                attempt.reason = Some(reason);
                attempt.status = ScanStatus::Denied;
            }
        }

        Ok(attempt)
    }

    /// Keeps a report draft on the granted attempt until it is filed or reset.
    ///
    /// # Errors
    /// Returns `Error::Validation` unless the attempt is granted.
    pub fn set_report_draft(&mut self, text: impl Into<String>) -> Result<()> {
        match self.attempt.as_mut() {
            Some(attempt) if attempt.status == ScanStatus::Granted => {
                attempt.report_draft = Some(text.into());
                Ok(())
            }
            _ => Err(Error::validation(
                "incident reports need a granted scan",
            )),
        }
    }

    /// Files an incident report against the user identified by the granted
    /// attempt. The attempt status is left untouched either way.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the attempt is not granted, was already
    /// reported, or `text` is blank; otherwise the API error of the submission.
    #[instrument(skip_all)]
    pub async fn file_incident_report(
        &mut self,
        text: &str,
        evidence: Option<ImageBlob>,
    ) -> Result<()> {
        let api = self.api;

        let attempt = self
            .attempt
            .as_mut()
            .ok_or_else(|| Error::validation("incident reports need a granted scan"))?;

        let report = attempt.incident_report(text, evidence)?;

        info!(
            attempt = %attempt.id,
            user = %report.target_username(),
            evidence = report.evidence().is_some(),
            "filing incident report"
        );

        api.post_empty(COMPLAINTS_PATH, Payload::Form(report.into_form()))
            .await?;

        attempt.reported = true;
        attempt.report_draft = None;

        Ok(())
    }

    /// Returns to `idle`, discarding the attempt, its result and any draft.
    pub fn reset(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            debug!(attempt = %attempt.id, status = %attempt.status, "scan attempt reset");
        }
    }
}

async fn verify_qr(api: &ApiClient, qr_data: &str) -> Result<Verification> {
    let verification: Verification = api
        .post(VERIFY_QR_PATH, Payload::Json(json!({ "qr_data": qr_data })))
        .await?;
    accepted(verification)
}

async fn recognize_face(api: &ApiClient, image: ImageBlob) -> Result<Verification> {
    let form = Form::new().file("image", image);
    let verification: Verification = api.post(FACE_RECOGNIZE_PATH, Payload::Form(form)).await?;
    accepted(verification)
}

// A 2xx body that explicitly says `valid: false` is still a rejection.
fn accepted(verification: Verification) -> Result<Verification> {
    if verification.valid == Some(false) {
        return Err(Error::Rejected(verification.message.unwrap_or_default()));
    }
    Ok(verification)
}

fn denial_reason(mode: ScanMode, err: &Error) -> String {
    let reason = match err {
        Error::Http { .. } => err.detail(),
        _ => Some(err.to_string()),
    };

    reason
        .map(|reason| reason.trim().to_string())
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| mode.fallback_reason().to_string())
}
