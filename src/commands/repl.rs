//! Interactive session over grouped snapshots.
//!
//! A line is split into a keyword (leading letters) and an optional
//! argument, the keyword is matched exactly against [`COMMANDS`], and the
//! resulting [`Command`] is dispatched through the session state machine.

use crate::aggregator::Grouped;
use crate::output::{render, summary};
use crate::utils::config::PROMPT;
use crate::utils::error::CommandError;
use log::debug;
use std::io::{self, BufRead, Write};
use std::num::ParseIntError;
use std::str::FromStr;

/// Interactive commands
///
/// Group numbers are 1-based, as typed by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
    PrintFull,
    PrintShort,
    Top(usize),
    FilterMinutesUnder(u32),
    DropGroupsBySize(usize),
    DropGroup(usize),
    Group(usize),
    Help,
    Quit,
}

/// Keyword table, also used for `h` output
pub struct CommandSpec {
    pub keyword: &'static str,
    pub takes_number: bool,
    pub description: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        keyword: "r",
        takes_number: false,
        description: "clear filters, back to the initial grouping",
    },
    CommandSpec {
        keyword: "p",
        takes_number: false,
        description: "print groups with all frames",
    },
    CommandSpec {
        keyword: "pf",
        takes_number: false,
        description: "print groups, first two frames only",
    },
    CommandSpec {
        keyword: "t",
        takes_number: true,
        description: "top <#> groups",
    },
    CommandSpec {
        keyword: "fmu",
        takes_number: true,
        description: "filter goroutines hung for less than <#> minutes",
    },
    CommandSpec {
        keyword: "dgs",
        takes_number: true,
        description: "drop groups smaller than <#>",
    },
    CommandSpec {
        keyword: "dg",
        takes_number: true,
        description: "drop group <#>; 1-indexed",
    },
    CommandSpec {
        keyword: "g",
        takes_number: true,
        description: "keep only group <#>; 1-indexed",
    },
    CommandSpec {
        keyword: "h",
        takes_number: false,
        description: "show this help",
    },
    CommandSpec {
        keyword: "q",
        takes_number: false,
        description: "quit",
    },
];

/// Split input into its keyword and optional trailing argument
pub fn tokenize(input: &str) -> (&str, Option<&str>) {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (keyword, rest) = input.split_at(split);
    let rest = rest.trim();
    (keyword, (!rest.is_empty()).then_some(rest))
}

impl Command {
    /// Parse one input line; blank input yields `Ok(None)`
    pub fn parse(input: &str) -> Result<Option<Command>, CommandError> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let (keyword, argument) = tokenize(input);
        let spec = COMMANDS
            .iter()
            .find(|spec| spec.keyword == keyword)
            .ok_or_else(|| CommandError::Unrecognized(input.trim().to_string()))?;

        if !spec.takes_number {
            if argument.is_some() {
                return Err(CommandError::UnexpectedArgument(spec.keyword));
            }
            let command = match spec.keyword {
                "r" => Command::Reset,
                "p" => Command::PrintFull,
                "pf" => Command::PrintShort,
                "h" => Command::Help,
                _ => Command::Quit,
            };
            return Ok(Some(command));
        }

        let command = match spec.keyword {
            "t" => Command::Top(number(spec.keyword, argument)?),
            "fmu" => Command::FilterMinutesUnder(number(spec.keyword, argument)?),
            "dgs" => Command::DropGroupsBySize(number(spec.keyword, argument)?),
            "dg" => Command::DropGroup(number(spec.keyword, argument)?),
            _ => Command::Group(number(spec.keyword, argument)?),
        };
        Ok(Some(command))
    }
}

fn number<T>(keyword: &'static str, argument: Option<&str>) -> Result<T, CommandError>
where
    T: FromStr<Err = ParseIntError>,
{
    let text = argument.ok_or(CommandError::MissingArgument(keyword))?;
    text.parse::<T>().map_err(|source| CommandError::InvalidNumber {
        keyword,
        text: text.to_string(),
        source,
    })
}

/// Session states; only grouped browsing exists so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplState {
    Grouped,
}

/// What a command does to the session
enum Action {
    Show(String),
    Replace(Grouped),
    Reset,
    Quit,
}

/// Result of executing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// An interactive session: the base snapshot and the one being narrowed
pub struct Session {
    state: ReplState,
    base: Grouped,
    current: Grouped,
}

impl Session {
    pub fn new(base: Grouped) -> Self {
        Self {
            state: ReplState::Grouped,
            current: base.clone(),
            base,
        }
    }

    pub fn state(&self) -> ReplState {
        self.state
    }

    pub fn base(&self) -> &Grouped {
        &self.base
    }

    pub fn current(&self) -> &Grouped {
        &self.current
    }

    /// Execute one input line
    ///
    /// Errors are reported in the output and leave the snapshot unchanged.
    pub fn execute(&mut self, input: &str) -> Reply {
        let command = match Command::parse(input) {
            Ok(Some(command)) => command,
            Ok(None) => return Reply::Output(String::new()),
            Err(err) => return Reply::Output(format!("{}\n", err)),
        };
        debug!("{:?} in state {:?}", command, self.state);

        let (action, next) = self.transition(command);
        self.state = next;

        match action {
            Action::Show(text) => Reply::Output(text),
            Action::Replace(grouped) => {
                self.current = grouped;
                Reply::Output(format!("{}\n", summary(&self.current)))
            }
            Action::Reset => {
                self.current = self.base.clone();
                Reply::Output(format!("grouping reset\n{}\n", summary(&self.current)))
            }
            Action::Quit => Reply::Quit,
        }
    }

    /// (state, command) -> (action, next state)
    fn transition(&self, command: Command) -> (Action, ReplState) {
        let on = &self.current;
        match (self.state, command) {
            (ReplState::Grouped, Command::Reset) => (Action::Reset, ReplState::Grouped),
            (ReplState::Grouped, Command::PrintFull) => {
                (Action::Show(render(on, false)), ReplState::Grouped)
            }
            (ReplState::Grouped, Command::PrintShort) => {
                (Action::Show(render(on, true)), ReplState::Grouped)
            }
            (ReplState::Grouped, Command::Top(n)) => {
                (Action::Replace(on.top(n)), ReplState::Grouped)
            }
            (ReplState::Grouped, Command::FilterMinutesUnder(n)) => {
                (Action::Replace(on.filter_minutes_under(n)), ReplState::Grouped)
            }
            (ReplState::Grouped, Command::DropGroupsBySize(n)) => {
                (Action::Replace(on.drop_groups_by_size(n)), ReplState::Grouped)
            }
            (ReplState::Grouped, Command::DropGroup(n)) => {
                let next = match n.checked_sub(1) {
                    Some(index) => on.drop_group(index),
                    None => on.clone(),
                };
                (Action::Replace(next), ReplState::Grouped)
            }
            (ReplState::Grouped, Command::Group(n)) => {
                let next = match n.checked_sub(1) {
                    Some(index) => on.get_group(index),
                    None => on.empty(),
                };
                (Action::Replace(next), ReplState::Grouped)
            }
            (ReplState::Grouped, Command::Help) => (Action::Show(help()), ReplState::Grouped),
            (ReplState::Grouped, Command::Quit) => (Action::Quit, ReplState::Grouped),
        }
    }
}

/// Command table as text
pub fn help() -> String {
    COMMANDS
        .iter()
        .map(|spec| {
            let usage = if spec.takes_number {
                format!("{}<#>", spec.keyword)
            } else {
                spec.keyword.to_string()
            };
            format!("  {:<8} {}\n", usage, spec.description)
        })
        .collect()
}

/// Read commands line by line until EOF or `q`
///
/// **Public** - drives a [`Session`] from any reader/writer pair
///
/// Input is decoded lossily, so a stray non-UTF-8 byte only spoils its own line.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    let mut buf = Vec::new();
    write!(output, "{}", PROMPT)?;
    output.flush()?;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        match session.execute(line) {
            Reply::Output(text) => write!(output, "{}", text)?,
            Reply::Quit => return Ok(()),
        }
        write!(output, "{}", PROMPT)?;
        output.flush()?;
    }

    writeln!(output)?;
    Ok(())
}
