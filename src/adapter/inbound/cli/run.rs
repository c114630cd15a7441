//! Command dispatch.
//!
//! [`run`] loads configuration, wires the application and hands the parsed
//! subcommand to its handler.

use tracing::debug;

use crate::error::Result;
use crate::infrastructure::bootstrap::App;
use crate::infrastructure::config::settings::Config;
use super::command::{Cli, Commands};
use super::{output, serve, store};

/// Execute a parsed command line.
///
/// Returns `Ok(false)` when the command ran but reported a failure the
/// process should signal through its exit status.
pub async fn run(cli: Cli) -> Result<bool> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet));

    let config = Config::load_or_default(&cli.config)?;
    config.init_logging();
    debug!(config = %cli.config.display(), "configuration loaded");

    let app = App::build(&config)?;

    match cli.command {
        Commands::Serve(args) => {
            let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
            serve::execute(&app, &bind).await?;
        }
        Commands::Create(args) => store::create(&app, &args.name, &args.owner).await?,
        Commands::List(args) => store::list(&app, args.owner.as_deref()).await?,
        Commands::Show(arg) => store::show(&app, &arg.id).await?,
        Commands::Provision(arg) => return store::provision(&app, &arg.id).await,
        Commands::Retry(arg) => store::retry(&app, &arg.id).await?,
        Commands::Delete(arg) => store::delete(&app, &arg.id).await?,
    }
    Ok(true)
}
