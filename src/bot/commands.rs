//! Text command parsing.

use thiserror::Error;

/// Upper bound for `/last`, keeps one command from flooding the channel.
pub const MAX_LAST: u32 = 20;

pub const HELP_TEXT: &str = "\
/last [n] - post the n most recently added albums (default 1)
/post <id> - post one album by catalog id
/discography <id> - post an artist's classified discography
/s <query> - search artists
<artist>__<url> - download and unpack an archive into the library
Documents and grouped audio files are ingested as well.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Last(u32),
    Post(String),
    Discography(String),
    Search(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: /{0}")]
    Unknown(String),

    #[error("/{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid argument for /{command}: {value}")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

impl Command {
    /// Parse a message. `Ok(None)` when the text is not a command at all.
    ///
    /// Accepts the `/cmd@botname` form Telegram uses in groups.
    pub fn parse(text: &str) -> Result<Option<Self>, CommandError> {
        let text = text.trim();
        let Some(rest) = text.strip_prefix('/') else {
            return Ok(None);
        };

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);

        let command = match name {
            "start" | "help" => Command::Help,
            "last" => {
                if args.is_empty() {
                    Command::Last(1)
                } else {
                    let n: u32 = args.parse().map_err(|_| CommandError::InvalidArgument {
                        command: "last",
                        value: args.to_string(),
                    })?;
                    if n == 0 {
                        return Err(CommandError::InvalidArgument {
                            command: "last",
                            value: args.to_string(),
                        });
                    }
                    Command::Last(n.min(MAX_LAST))
                }
            }
            "post" => Command::Post(single_id("post", args)?),
            "discography" => Command::Discography(single_id("discography", args)?),
            "s" | "search" => {
                if args.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "s",
                        argument: "a query",
                    });
                }
                Command::Search(args.to_string())
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn single_id(command: &'static str, args: &str) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "an id",
        });
    }
    if args.contains(char::is_whitespace) || args.contains('|') {
        return Err(CommandError::InvalidArgument {
            command,
            value: args.to_string(),
        });
    }
    Ok(args.to_string())
}
