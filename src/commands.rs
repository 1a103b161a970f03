/// Prefix for text commands. A leading mention of the bot works too.
pub const COMMAND_PREFIX: char = '!';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `start_wz [-c]`: `-c` keeps the stats of the last session.
    StartSession { keep_stats: bool },
    EndSession,
    SessionStats,
    PlayerStats { username: Option<String> },
    Awards,
    ClearChannel,
}

impl Command {
    /// Parse a chat message into a command.
    ///
    /// Returns `None` for ordinary chatter and for unknown command names, which
    /// are ignored rather than answered.
    pub fn parse(content: &str, bot_id: u64) -> Option<Self> {
        let body = strip_prefix(content.trim(), bot_id)?;
        let mut words = body.split_whitespace();
        let name = words.next()?;
        let args: Vec<&str> = words.collect();

        let command = match name {
            "start_wz" => Command::StartSession {
                keep_stats: matches!(args.first(), Some(&"-c") | Some(&"--continue")),
            },
            "end_wz" => Command::EndSession,
            "session_stats" => Command::SessionStats,
            "player_stats" => Command::PlayerStats {
                username: (!args.is_empty()).then(|| args.join(" ")),
            },
            "awards" => Command::Awards,
            "clear_channel" => Command::ClearChannel,
            _ => return None,
        };
        Some(command)
    }

    /// Commands that may only run in the control channel.
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            Command::StartSession { .. } | Command::EndSession | Command::ClearChannel
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::StartSession { .. } => "start_wz",
            Command::EndSession => "end_wz",
            Command::SessionStats => "session_stats",
            Command::PlayerStats { .. } => "player_stats",
            Command::Awards => "awards",
            Command::ClearChannel => "clear_channel",
        }
    }
}

/// The mention forms Discord uses for a user: `<@id>` and the legacy nickname `<@!id>`.
pub fn mention_forms(user_id: u64) -> [String; 2] {
    [format!("<@{user_id}>"), format!("<@!{user_id}>")]
}

fn strip_prefix(content: &str, bot_id: u64) -> Option<&str> {
    if let Some(rest) = content.strip_prefix(COMMAND_PREFIX) {
        return Some(rest);
    }
    mention_forms(bot_id)
        .iter()
        .find_map(|mention| content.strip_prefix(mention.as_str()))
        .map(str::trim_start)
}
