//! Director commands.
//!
//! The dialogue layer drives agents with short text commands. They are
//! parsed here, once, into a [`DirectorCommand`]; the simulation only ever
//! sees the parsed form.
//!
//! Grammar (keywords are case-insensitive, agents are named):
//!
//! ```text
//! prioritize <agent> <behaviour>
//! stop <agent>
//! set <agent> <stat> <value>
//! ```
//!
//! `value` is in the stat's raw `[min, max]` range.

use std::str::FromStr;

use motive_types::{BehaviourId, StatId};
use serde::{Deserialize, Serialize};

/// Errors that can occur while parsing a director command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The input was blank.
    #[error("empty command")]
    Empty,

    /// The first word is not a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument is missing.
    #[error("{command}: missing {argument}")]
    MissingArgument {
        /// The command being parsed.
        command: &'static str,
        /// The missing argument's name.
        argument: &'static str,
    },

    /// The value is not a finite number.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// More words than the command takes.
    #[error("{command}: unexpected trailing input '{rest}'")]
    TrailingInput {
        /// The command being parsed.
        command: &'static str,
        /// The extra text.
        rest: String,
    },
}

/// A parsed director command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DirectorCommand {
    /// Make `behaviour` the agent's behaviour now.
    PrioritizeBehaviour {
        /// Agent name.
        agent: String,
        /// Behaviour to run.
        behaviour: BehaviourId,
    },
    /// Stop walking to the current target.
    StopMoving {
        /// Agent name.
        agent: String,
    },
    /// Overwrite a stat.
    SetStatValue {
        /// Agent name.
        agent: String,
        /// Stat to set.
        stat: StatId,
        /// Raw value.
        value: f64,
    },
}

impl DirectorCommand {
    /// Parse one command line.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] describing the first problem found.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let mut words = input.split_whitespace();
        let keyword = words.next().ok_or(CommandError::Empty)?;

        let (name, command) = match keyword.to_ascii_lowercase().as_str() {
            "prioritize" | "prioritise" => {
                let agent = required(&mut words, "prioritize", "agent")?;
                let behaviour = required(&mut words, "prioritize", "behaviour")?;
                (
                    "prioritize",
                    Self::PrioritizeBehaviour {
                        agent,
                        behaviour: BehaviourId::new(behaviour),
                    },
                )
            }
            "stop" => {
                let agent = required(&mut words, "stop", "agent")?;
                ("stop", Self::StopMoving { agent })
            }
            "set" => {
                let agent = required(&mut words, "set", "agent")?;
                let stat = required(&mut words, "set", "stat")?;
                let raw = required(&mut words, "set", "value")?;
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or(CommandError::InvalidValue(raw))?;
                (
                    "set",
                    Self::SetStatValue {
                        agent,
                        stat: StatId::new(stat),
                        value,
                    },
                )
            }
            _ => return Err(CommandError::UnknownCommand(keyword.to_owned())),
        };

        let rest: Vec<&str> = words.collect();
        if !rest.is_empty() {
            return Err(CommandError::TrailingInput {
                command: name,
                rest: rest.join(" "),
            });
        }
        Ok(command)
    }

    /// Name of the agent the command addresses.
    pub fn agent(&self) -> &str {
        match self {
            Self::PrioritizeBehaviour { agent, .. }
            | Self::StopMoving { agent }
            | Self::SetStatValue { agent, .. } => agent,
        }
    }
}

impl FromStr for DirectorCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn required<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<String, CommandError> {
    words
        .next()
        .map(str::to_owned)
        .ok_or(CommandError::MissingArgument { command, argument })
}
