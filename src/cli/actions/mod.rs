pub mod account;
pub mod admin;
pub mod scan;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Login(account::Login),
    Logout,
    Register(account::Register),
    Me,
    Passes,
    Scan(scan::Args),
    Admin(admin::Command),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
