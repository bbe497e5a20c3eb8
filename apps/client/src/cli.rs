use clap::{ArgAction, Parser};

/// Type to search users. Each line replaces the query.
///
/// Commands: `:more` loads the next page, `:open N` shows record N,
/// `:status` prints progress, `:quit` exits.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Access token sent with every search. Overrides `app.credential`.
    #[arg(long, env = "USERSEARCH_CREDENTIAL")]
    pub credential: Option<String>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
