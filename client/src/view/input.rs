//! User input → view actions.

use crate::state::comment::CommentId;

/// A user action dispatched to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Send text to the relay.
    Submit(String),
    /// Increment one comment's favorite count.
    Favorite(CommentId),
    /// Increment every comment's favorite count.
    CheerAll,
    /// Remove every comment.
    ClearAll,
    /// Re-render the list.
    List,
    /// End the session.
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("usage: /fav <id>")]
    MissingId,
    #[error("not a comment id: {0}")]
    BadId(String),
    #[error("unknown command: {0} (try /fav, /cheer, /clear, /list, /quit)")]
    UnknownCommand(String),
}

/// Whether `text` may be submitted. Whitespace-only text is rejected.
#[must_use]
pub fn is_submittable(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Parse one input line.
///
/// Returns `Ok(None)` for a whitespace-only line; it is silently ignored.
/// Lines starting with `/` are commands, anything else is submitted as-is.
/// A leading `//` submits the rest of the line starting with a single `/`.
///
/// # Errors
///
/// Returns an [`InputError`] for an unknown command or a bad `/fav` id.
pub fn parse_line(line: &str) -> Result<Option<Action>, InputError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if !is_submittable(line) {
        return Ok(None);
    }

    let trimmed = line.trim();
    if trimmed.starts_with("//") {
        return Ok(Some(Action::Submit(trimmed[1..].to_string())));
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Ok(Some(Action::Submit(line.to_string())));
    };

    let (name, arg) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
    let action = match name {
        "fav" | "favorite" | "star" => {
            let arg = arg.trim();
            if arg.is_empty() {
                return Err(InputError::MissingId);
            }
            let id = arg.parse::<CommentId>().map_err(|_| InputError::BadId(arg.to_string()))?;
            Action::Favorite(id)
        }
        "cheer" => Action::CheerAll,
        "clear" => Action::ClearAll,
        "list" | "ls" => Action::List,
        "quit" | "exit" => Action::Quit,
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };
    Ok(Some(action))
}

#[cfg(test)]
#[path = "input_test.rs"]
mod tests;
