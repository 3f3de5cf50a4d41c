/// Commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start [code]`, the payload of a `t.me/<bot>?start=<code>` deep link
    Start(Option<String>),
    /// `/link [code]`
    Link(Option<String>),
}

impl BotCommand {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Start(code) | Self::Link(code) => code.as_deref(),
        }
    }
}

/// Parses a message text as a bot command.
///
/// Commands may carry an `@botname` suffix; a suffix naming a different bot
/// means the command is not ours.
pub fn parse_command(text: &str, bot_username: &str) -> Option<BotCommand> {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let head = parts.next()?.strip_prefix('/')?;
    let argument = parts
        .next()
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .map(str::to_string);

    let name = match head.split_once('@') {
        Some((name, target)) if target.eq_ignore_ascii_case(bot_username) => name,
        Some(_) => return None,
        None => head,
    };

    match name.to_ascii_lowercase().as_str() {
        "start" => Some(BotCommand::Start(argument)),
        "link" => Some(BotCommand::Link(argument)),
        _ => None,
    }
}
