use clap::{Arg, ArgAction, Command};

pub const SCAN: &str = "scan";
pub const QR: &str = "qr";
pub const FACE: &str = "face";

pub const ARG_DATA: &str = "data";
pub const ARG_IMAGE: &str = "image";
pub const ARG_REPORT: &str = "report";
pub const ARG_EVIDENCE: &str = "evidence";
pub const ARG_NO_EVIDENCE: &str = "no-evidence";

fn report_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_REPORT)
                .long("report")
                .help("File an incident report against the identified user if access is granted"),
        )
        .arg(
            Arg::new(ARG_EVIDENCE)
                .long("evidence")
                .help("Proof photo for the report (path or data URL)")
                .requires(ARG_REPORT)
                .conflicts_with(ARG_NO_EVIDENCE),
        )
        .arg(
            Arg::new(ARG_NO_EVIDENCE)
                .long("no-evidence")
                .help("File the report without a proof photo")
                .requires(ARG_REPORT)
                .action(ArgAction::SetTrue),
        )
}

#[must_use]
pub fn subcommand() -> Command {
    Command::new(SCAN)
        .about("Coordinator gate: verify an attendee by QR pass or face")
        .subcommand_required(true)
        .subcommand(report_args(
            Command::new(QR)
                .about("Verify QR pass data; without DATA, one attempt per stdin line")
                .arg(Arg::new(ARG_DATA).help("Decoded QR text")),
        )
        .mut_arg(ARG_REPORT, |arg| arg.requires(ARG_DATA)))
        .subcommand(report_args(
            Command::new(FACE).about("Verify a face capture").arg(
                Arg::new(ARG_IMAGE)
                    .short('i')
                    .long("image")
                    .help("Captured image (path or data URL)")
                    .required(true),
            ),
        ))
}
