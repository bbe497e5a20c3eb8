//! Line-oriented rendering of controller events and parsing of typed input.

use rpc::search::User;
use search_controller::{ObserverEvent, Snapshot};
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewInput {
    /// New contents of the search field
    Text(String),
    /// Scrolled to the bottom of the list
    More,
    Open(usize),
    Status,
    Quit,
}

pub fn parse_line(line: &str) -> Result<ViewInput, String> {
    let Some(command) = line.trim_end().strip_prefix(':') else {
        return Ok(ViewInput::Text(line.trim_end_matches(['\r', '\n']).to_string()));
    };

    let mut words = command.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("more"), None, _) => Ok(ViewInput::More),
        (Some("status"), None, _) => Ok(ViewInput::Status),
        (Some("quit" | "q"), None, _) => Ok(ViewInput::Quit),
        (Some("open"), Some(index), None) => index
            .parse()
            .map(ViewInput::Open)
            .map_err(|_| format!("not a row number: {index}")),
        _ => Err(format!("unknown command :{command}")),
    }
}

/// Prints rows as they arrive. Rows already printed are not repeated; a
/// shorter list than last time means the results were reset.
#[derive(Debug, Default)]
pub struct TerminalView {
    printed: usize,
    loading: bool,
}

impl TerminalView {
    pub fn render(&mut self, event: &ObserverEvent<User>, out: &mut impl Write) -> io::Result<()> {
        match event {
            ObserverEvent::StateChanged(snapshot) => self.render_snapshot(snapshot, out),
            ObserverEvent::ShowRecord(user) => {
                writeln!(out, "#{} {}", user.id, user.login)?;
                writeln!(out, "    profile: {}", user.html_url)?;
                writeln!(out, "    avatar:  {}", user.avatar_url)
            }
            ObserverEvent::AuthError => self.notice(
                out,
                "authentication required: pass --credential or set app.credential",
            ),
            ObserverEvent::FetchFailed(reason) => {
                self.notice(out, &format!("search failed: {reason}"))
            }
        }
    }

    fn render_snapshot(
        &mut self,
        snapshot: &Snapshot<User>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        if snapshot.items.len() < self.printed {
            writeln!(out, "-- cleared")?;
            self.printed = 0;
        }

        for (index, user) in snapshot.items.iter().enumerate().skip(self.printed) {
            writeln!(out, "{index:>4}  {}", user.login)?;
        }
        self.printed = snapshot.items.len();

        if snapshot.is_loading() && !self.loading {
            writeln!(out, "   ...")?;
        }
        self.loading = snapshot.is_loading();
        Ok(())
    }

    pub fn status(&self, out: &mut impl Write, snapshot: &Snapshot<User>) -> io::Result<()> {
        writeln!(out, "-- {} [{}]", snapshot.progress_label(), snapshot.phase)
    }

    pub fn notice(&self, out: &mut impl Write, message: &str) -> io::Result<()> {
        writeln!(out, "!! {message}")
    }
}
