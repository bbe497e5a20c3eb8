use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the user catalog on the unix socket
    Serve,
    /// Print one page of a search against the configured catalog as JSON
    Page {
        query: String,
        /// `next-cursor` of the previous page
        #[arg(long)]
        after: Option<String>,
    },
}
