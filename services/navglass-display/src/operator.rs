//! Operator commands read from stdin.
//!
//! ```text
//! filter 7      only bind positioning markers with AmId 7
//! filter off    bind every marker
//! ```

use navglass_binding::MarkerFilter;
use std::io::BufRead;
use tracing::{info, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    SetFilter(i64),
    ClearFilter,
}

pub fn parse(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("filter"), Some("off"), None) => Some(Command::ClearFilter),
        (Some("filter"), Some(value), None) => match value.parse::<i64>() {
            Ok(id) if id < 0 => Some(Command::ClearFilter),
            Ok(id) => Some(Command::SetFilter(id)),
            Err(_) => None,
        },
        _ => None,
    }
}

pub fn apply(command: Command, filter: &MarkerFilter) {
    match command {
        Command::SetFilter(id) => {
            filter.set(id);
            info!(marker_id = id, "Marker filter set");
        }
        Command::ClearFilter => {
            filter.clear();
            info!("Marker filter cleared");
        }
    }
}

/// Read commands until stdin closes.
///
/// Blocking; run it on its own thread so a pending read never holds up
/// runtime shutdown.
pub fn listen(filter: MarkerFilter) {
    for line in std::io::stdin().lock().lines() {
        match line {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => match parse(&line) {
                Some(command) => apply(command, &filter),
                None => warn!(input = %line.trim(), "Unknown operator command"),
            },
            Err(e) => {
                warn!(error = %e, "Operator input failed");
                break;
            }
        }
    }
}
