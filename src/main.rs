mod app;
mod cli;
mod generate;
mod model;
mod questionnaire;
mod storage;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_headless = args.json || args.text || args.list_saved;

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success for scripting modes
            if is_headless {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}
