// SPDX-License-Identifier: MPL-2.0
//! Messages and flags driving the terminal front end.

use crate::application::session::SessionEvent;
use std::fmt;
use std::str::FromStr;

/// Runtime flags parsed from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// Optional locale override in BCP-47 form (e.g. `fr`, `en-US`).
    pub lang: Option<String>,
    /// Optional data directory override (diagnostics exports).
    /// Takes precedence over `SNAPPY_DATA_DIR` environment variable.
    pub data_dir: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `SNAPPY_CONFIG_DIR` environment variable.
    pub config_dir: Option<String>,
    /// Wallet address whose uploads the gallery lists.
    /// Takes precedence over `[gallery] owner`.
    pub owner: Option<String>,
    /// Run against in-memory devices instead of the camera and network.
    pub simulate: bool,
}

/// A command typed at the prompt.
///
/// Each session command maps 1:1 to a session controller event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    EnableCamera,
    DisableCamera,
    SwitchFacing,
    Capture,
    CancelReview,
    Upload,
    OpenGallery,
    Back,
    OpenItem(String),
    DismissError,
    Status,
    ExportDiagnostics,
    Help,
    Quit,
}

impl Command {
    /// Returns the canonical word typed for this command.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::EnableCamera => "on",
            Command::DisableCamera => "off",
            Command::SwitchFacing => "switch",
            Command::Capture => "capture",
            Command::CancelReview => "cancel",
            Command::Upload => "upload",
            Command::OpenGallery => "gallery",
            Command::Back => "back",
            Command::OpenItem(_) => "open",
            Command::DismissError => "dismiss",
            Command::Status => "status",
            Command::ExportDiagnostics => "export-diagnostics",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::OpenItem(id) => write!(f, "open {id}"),
            other => f.write_str(other.keyword()),
        }
    }
}

/// Why a typed line is not a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
}

impl ParseCommandError {
    /// Returns the i18n message key for this error.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            ParseCommandError::Empty => "command-empty",
            ParseCommandError::Unknown(_) => "command-unknown",
            ParseCommandError::MissingArgument(_) => "command-missing-argument",
        }
    }
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCommandError::Empty => write!(f, "empty command"),
            ParseCommandError::Unknown(word) => write!(f, "unknown command: {word}"),
            ParseCommandError::MissingArgument(command) => {
                write!(f, "{command} needs an argument")
            }
        }
    }
}

impl std::error::Error for ParseCommandError {}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(ParseCommandError::Empty);
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "on" | "enable" => Command::EnableCamera,
            "off" | "disable" => Command::DisableCamera,
            "switch" | "flip" => Command::SwitchFacing,
            "capture" | "snap" => Command::Capture,
            "cancel" | "retake" => Command::CancelReview,
            "upload" => Command::Upload,
            "gallery" => Command::OpenGallery,
            "back" => Command::Back,
            "open" => {
                let id = words.next().ok_or(ParseCommandError::MissingArgument("open"))?;
                Command::OpenItem(id.to_string())
            }
            "dismiss" => Command::DismissError,
            "status" => Command::Status,
            "export-diagnostics" | "export" => Command::ExportDiagnostics,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Everything the command loop reacts to.
#[derive(Debug, Clone)]
pub enum Message {
    /// A line typed by the user.
    Input(Result<Command, ParseCommandError>),
    /// Standard input reached end of file.
    InputClosed,
    /// Broadcast from the session controller.
    Session(SessionEvent),
    /// A spawned session command finished; `accepted` is its return value.
    Completed { command: Command, accepted: bool },
    /// Periodic timer for notification expiry.
    Tick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_keyword() {
        for command in [
            Command::EnableCamera,
            Command::DisableCamera,
            Command::SwitchFacing,
            Command::Capture,
            Command::CancelReview,
            Command::Upload,
            Command::OpenGallery,
            Command::Back,
            Command::DismissError,
            Command::Status,
            Command::ExportDiagnostics,
            Command::Help,
            Command::Quit,
        ] {
            assert_eq!(command.keyword().parse::<Command>(), Ok(command));
        }
    }

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("  FLIP ".parse::<Command>(), Ok(Command::SwitchFacing));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("Snap".parse::<Command>(), Ok(Command::Capture));
    }

    #[test]
    fn open_takes_an_id() {
        assert_eq!(
            "open tx123".parse::<Command>(),
            Ok(Command::OpenItem("tx123".to_string()))
        );
        assert_eq!(
            "open".parse::<Command>(),
            Err(ParseCommandError::MissingArgument("open"))
        );
        assert_eq!(Command::OpenItem("tx1".into()).to_string(), "open tx1");
    }

    #[test]
    fn rejects_blank_and_unknown_lines() {
        assert_eq!("   ".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "zoom".parse::<Command>(),
            Err(ParseCommandError::Unknown("zoom".to_string()))
        );
        assert_eq!(
            ParseCommandError::Unknown("zoom".into()).i18n_key(),
            "command-unknown"
        );
    }
}
