use anyhow::Result;
use ekoli::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
