use crate::cli::globals::GlobalArgs;
use crate::console::{
    ApiClient, CapturePayload, ImageBlob, ScanAttempt, ScanMode, ScanStatus, VerificationWorkflow,
};
use anyhow::{bail, Context, Result};
use std::fmt::Write as _;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Proof photo attached to an incident report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Evidence {
    /// The image captured for the attempt; none for QR scans.
    #[default]
    Captured,
    Source(String),
    Omitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub mode: ScanMode,
    /// QR text or image path/data URL. QR scans read stdin when absent.
    pub source: Option<String>,
    pub report: Option<String>,
    pub evidence: Evidence,
}

/// # Errors
/// Returns an error without a session, on a rejected capture, or when a
/// single attempt is denied.
pub async fn execute(args: Args, globals: &GlobalArgs) -> Result<()> {
    let api = globals.client()?;
    api.session().require()?;

    let mut workflow = VerificationWorkflow::new(&api);

    let payload = match (args.mode, args.source.as_deref()) {
        (ScanMode::Qr, Some(text)) => CapturePayload::QrText(text.to_string()),
        (ScanMode::Qr, None) => return scan_stdin(&mut workflow).await,
        (ScanMode::Face, Some(source)) => CapturePayload::Image(
            ImageBlob::load(source)
                .await
                .with_context(|| format!("failed to load capture {source}"))?,
        ),
        (ScanMode::Face, None) => bail!("a face scan needs an image"),
    };

    let status = attempt(&mut workflow, args.mode, payload).await?;

    if status == ScanStatus::Granted {
        if let Some(text) = args.report.as_deref() {
            report(&mut workflow, text, &args.evidence).await?;
        }
    }

    if status == ScanStatus::Denied {
        bail!("access denied");
    }

    Ok(())
}

async fn scan_stdin(workflow: &mut VerificationWorkflow<'_>) -> Result<()> {
    eprintln!("Waiting for QR data, one pass per line (Ctrl-D to stop)");

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let payload = CapturePayload::QrText(text.to_string());
        if let Err(err) = attempt(workflow, ScanMode::Qr, payload).await {
            warn!(error = %err, "scan skipped");
            eprintln!("{err}");
        }
        workflow.reset();
    }

    Ok(())
}

async fn attempt(
    workflow: &mut VerificationWorkflow<'_>,
    mode: ScanMode,
    payload: CapturePayload,
) -> Result<ScanStatus> {
    let api = workflow.api();
    workflow.start_attempt(mode)?;
    let attempt = workflow.submit_capture(payload).await?;
    print!("{}", render(api, attempt));
    Ok(attempt.status())
}

async fn report(
    workflow: &mut VerificationWorkflow<'_>,
    text: &str,
    evidence: &Evidence,
) -> Result<()> {
    let evidence = match evidence {
        Evidence::Captured => workflow
            .attempt()
            .and_then(ScanAttempt::captured_image)
            .cloned(),
        Evidence::Source(source) => Some(
            ImageBlob::load(source)
                .await
                .with_context(|| format!("failed to load evidence {source}"))?,
        ),
        Evidence::Omitted => None,
    };

    debug!(evidence = evidence.is_some(), "submitting incident report");

    workflow
        .file_incident_report(text, evidence)
        .await
        .context("Failed to submit report")?;

    println!("Report submitted successfully.");

    Ok(())
}

/// Operator-facing summary of a resolved attempt.
#[must_use]
pub fn render(api: &ApiClient, attempt: &ScanAttempt) -> String {
    let mut out = String::new();

    match attempt.status() {
        ScanStatus::Granted => {
            out.push_str("ACCESS GRANTED\n");
            if let Some(details) = attempt.details() {
                let user = &details.user_details;
                let _ = writeln!(out, "  name: {}", user.name);
                let _ = writeln!(out, "  role: {}", user.role);
                if let Some(student_type) = &user.student_type {
                    let _ = writeln!(out, "  type: {student_type}");
                }
                if let Some(college) = &user.college_name {
                    let _ = writeln!(out, "  college: {college}");
                }
                if let Some(photo) = user.photo_url.as_deref().and_then(|p| api.media_url(p)) {
                    let _ = writeln!(out, "  photo: {photo}");
                }
                if !user.passes.is_empty() {
                    let _ = writeln!(out, "  passes: {}", user.passes.join(", "));
                }
                if let Some(message) = &details.message {
                    let _ = writeln!(out, "  {message}");
                }
            }
        }
        ScanStatus::Denied => {
            let reason = attempt
                .reason()
                .unwrap_or_else(|| attempt.mode().fallback_reason());
            let _ = writeln!(out, "ACCESS DENIED: {reason}");
        }
        status => {
            let _ = writeln!(out, "{status}");
        }
    }

    out
}
