use crate::cli::actions::{account, admin, scan, Action};
use crate::cli::globals::GlobalArgs;
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Login(args) => account::login(args, globals).await,
        Action::Logout => account::logout(globals),
        Action::Register(args) => account::register(args, globals).await,
        Action::Me => account::me(globals).await,
        Action::Passes => account::passes(globals).await,
        Action::Scan(args) => scan::execute(args, globals).await,
        Action::Admin(command) => admin::execute(command, globals).await,
    }
}
