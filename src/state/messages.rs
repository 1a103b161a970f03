use crate::commands::Command;
use tokio::sync::oneshot;

/// Work for the session worker. Commands carry a channel for their replies.
#[derive(Debug)]
pub enum SessionRequest {
    Command {
        command: Command,
        reply: oneshot::Sender<Vec<String>>,
    },
    Poll,
}

/// Something the poller found worth telling the squad about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub content: String,
    /// Attach a reaction image when one is available.
    pub salute: bool,
}

impl Announcement {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), salute: false }
    }

    pub fn with_salute(content: impl Into<String>) -> Self {
        Self { content: content.into(), salute: true }
    }
}
