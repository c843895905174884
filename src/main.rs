//! Requester CLI entry point.

use clap::Parser;

use requester::cli::{handle_error, load_config, Cli, Commands};
use requester::infrastructure::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Download(args) => {
            requester::cli::commands::download::execute(args, config, cli.json).await
        }
        Commands::Probe(args) => requester::cli::commands::probe::execute(args, config, cli.json).await,
    };

    // Flush file logs before a possible process exit
    drop(guard);

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
