use anyhow::Result;
use bitzzie::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
