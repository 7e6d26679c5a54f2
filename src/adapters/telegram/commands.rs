//! Parsing of chat commands and button callbacks.

use super::channel::{DELETE_PREFIX, DONE_PREFIX};
use crate::services::admission::SubmitRequest;

pub const EVENING_HOUR: u8 = 18;

pub const ADD_USAGE: &str =
    "Please describe the task. Example: /add Clean room\nFlags: --urgent (-u), --after HH, --evening";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Add(AddArgs),
    List,
    /// `/done` with an optional id; without one a menu is shown.
    Done(Option<String>),
    Delete(Option<String>),
    Test,
    Help,
    /// A known command with unusable arguments; carries the reply.
    Invalid(String),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    pub text: String,
    pub urgent: bool,
    pub after_hour: Option<u8>,
}

impl From<AddArgs> for SubmitRequest {
    fn from(args: AddArgs) -> Self {
        let request = SubmitRequest::new(args.text).not_before(args.after_hour.unwrap_or(0));
        if args.urgent {
            request.urgent()
        } else {
            request
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Done(String),
    Delete(String),
}

/// Parse a message text. Returns `None` for anything that is not a command.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    // Group chats address commands as /cmd@BotName.
    let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
    let single_arg = || args.split_whitespace().next().map(str::to_string);

    Some(match name.as_str() {
        "start" => BotCommand::Start,
        "add" => parse_add(args),
        "list" => BotCommand::List,
        "done" => BotCommand::Done(single_arg()),
        "delete" => BotCommand::Delete(single_arg()),
        "test" => BotCommand::Test,
        "help" => BotCommand::Help,
        other => BotCommand::Unknown(other.to_string()),
    })
}

/// Flags are only read before the first word of the task; the rest of the
/// text is kept as typed.
fn parse_add(args: &str) -> BotCommand {
    let mut urgent = false;
    let mut after_hour = None;
    let mut rest = args.trim();

    loop {
        let (token, tail) = next_token(rest);
        match token {
            "--urgent" | "-u" => urgent = true,
            "--evening" => after_hour = Some(EVENING_HOUR),
            "--after" => {
                let (hour, tail) = next_token(tail);
                match hour.parse::<u8>() {
                    Ok(hour) if hour <= 23 => after_hour = Some(hour),
                    _ => return BotCommand::Invalid("--after expects an hour between 0 and 23".to_string()),
                }
                rest = tail;
                continue;
            }
            _ => break,
        }
        rest = tail;
    }

    if rest.is_empty() {
        return BotCommand::Invalid(ADD_USAGE.to_string());
    }
    BotCommand::Add(AddArgs {
        text: rest.to_string(),
        urgent,
        after_hour,
    })
}

/// Split off the first whitespace-separated token; the tail has its leading
/// whitespace removed.
fn next_token(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((token, tail)) => (token, tail.trim_start()),
        None => (text, ""),
    }
}

/// Parse inline-button callback data.
pub fn parse_callback(data: &str) -> Option<CallbackAction> {
    if let Some(id) = data.strip_prefix(DONE_PREFIX) {
        return (!id.is_empty()).then(|| CallbackAction::Done(id.to_string()));
    }
    if let Some(id) = data.strip_prefix(DELETE_PREFIX) {
        return (!id.is_empty()).then(|| CallbackAction::Delete(id.to_string()));
    }
    None
}
