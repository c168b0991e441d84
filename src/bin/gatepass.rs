use anyhow::Result;
use gatepass::cli::start;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (action, globals) = start()?;

    action.execute(&globals).await
}
