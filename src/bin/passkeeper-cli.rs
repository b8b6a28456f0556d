//! PassKeeper CLI binary
//!
//! Command-line client for a PassKeeper server.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    passkeeper::cli::run_cli().await
}
