//! Commands typed on stdin while `watch` runs.

use std::str::FromStr;

use thiserror::Error;

use crate::engine::EngineHandle;
use crate::types::NotificationId;

pub const HELP: &str = "\
Commands:
  r <id>    mark a notification read
  a         mark all notifications read
  l [page]  reload the list (page 1 by default)
  c         refresh the unread count
  d <id>    dismiss a pushed notification
  o <id>    open a pushed notification (dismiss and mark read)
  s         stop polling
  p         start polling
  h         show this help
  q         quit";

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MarkRead(NotificationId),
    MarkAllRead,
    Load(u32),
    RefreshCount,
    Dismiss(NotificationId),
    Open(NotificationId),
    StopPolling,
    StartPolling,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?} (h for help)")]
    Unknown(String),
    #[error("`{0}` needs a notification id")]
    MissingId(&'static str),
    #[error("invalid page {0:?}")]
    BadPage(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();
        let id = |name: &'static str| {
            arg.map(NotificationId::from)
                .ok_or(CommandError::MissingId(name))
        };

        match verb {
            "r" | "read" => id("read").map(Self::MarkRead),
            "a" | "read-all" => Ok(Self::MarkAllRead),
            "l" | "list" => match arg {
                None => Ok(Self::Load(1)),
                Some(raw) => raw
                    .parse()
                    .map(Self::Load)
                    .map_err(|_| CommandError::BadPage(raw.to_owned())),
            },
            "c" | "count" => Ok(Self::RefreshCount),
            "d" | "dismiss" => id("dismiss").map(Self::Dismiss),
            "o" | "open" => id("open").map(Self::Open),
            "s" | "stop" => Ok(Self::StopPolling),
            "p" | "poll" => Ok(Self::StartPolling),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_owned())),
        }
    }
}

impl Command {
    /// Forward the command to the engine. `Help` and `Quit` are handled by the
    /// caller and do nothing here.
    pub fn dispatch(self, engine: &EngineHandle) {
        match self {
            Self::MarkRead(id) => engine.mark_notification_read(id),
            Self::MarkAllRead => engine.mark_all_notifications_read(),
            Self::Load(page) => engine.load_notifications(page),
            Self::RefreshCount => engine.update_unread_count(),
            Self::Dismiss(id) => engine.dismiss_notification(id),
            Self::Open(id) => engine.activate_notification(id),
            Self::StopPolling => engine.stop_polling(),
            Self::StartPolling => engine.start_polling(),
            Self::Help | Self::Quit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, CommandError> {
        line.parse()
    }

    #[test]
    fn short_and_long_forms() {
        assert_eq!(parse("r 12"), Ok(Command::MarkRead("12".into())));
        assert_eq!(parse("read abc"), Ok(Command::MarkRead("abc".into())));
        assert_eq!(parse("a"), Ok(Command::MarkAllRead));
        assert_eq!(parse("  s  "), Ok(Command::StopPolling));
        assert_eq!(parse("p"), Ok(Command::StartPolling));
        assert_eq!(parse("o 3"), Ok(Command::Open("3".into())));
        assert_eq!(parse("d 3"), Ok(Command::Dismiss("3".into())));
        assert_eq!(parse("quit"), Ok(Command::Quit));
    }

    #[test]
    fn list_defaults_to_first_page() {
        assert_eq!(parse("l"), Ok(Command::Load(1)));
        assert_eq!(parse("l 4"), Ok(Command::Load(4)));
        assert_eq!(parse("l x"), Err(CommandError::BadPage("x".to_owned())));
    }

    #[test]
    fn errors() {
        assert_eq!(parse(""), Err(CommandError::Empty));
        assert_eq!(parse("r"), Err(CommandError::MissingId("read")));
        assert_eq!(parse("zap"), Err(CommandError::Unknown("zap".to_owned())));
    }
}
