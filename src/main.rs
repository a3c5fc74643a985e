use anyhow::Result;
use edbot::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
