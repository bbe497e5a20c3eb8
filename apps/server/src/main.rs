mod catalog;
mod cli;
mod command;
mod config;
mod error;

use error::WrapErr;

use clap::CommandFactory;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();
    init_tracing(command_line.verbose);

    let cfg = config::Config::load().context("Load configuration error")?;

    if let Some(command) = command_line.command {
        let cmd: Box<dyn command::Command> = match command {
            cli::Commands::Serve => Box::new(command::ServeCommand::new(cfg)),
            cli::Commands::Page { query, after } => {
                Box::new(command::PageCommand::new(cfg, query, after))
            }
        };
        cmd.execute().await?;
    } else {
        cli::Cli::command().print_help()?;
    }

    Ok(())
}
