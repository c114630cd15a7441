use clap::Parser;
use tracing::error;

use storeforge::adapter::inbound::cli::{command::Cli, output, run};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run::run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!(error = %e, "command failed");
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }
}
