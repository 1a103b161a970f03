use crate::chatter::{greeting_reply, mentions_trip, pick_salute, trip_reply};
use crate::commands::Command;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{Announcement, SessionRequest};
use log::{debug, error, info, warn};
use serenity::all::{ChannelId, CreateAttachment, CreateMessage, GetMessages, Http, Message, Ready};
use serenity::async_trait;
use serenity::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Discord's cap on a single message history fetch.
const HISTORY_PAGE: u8 = 100;

pub struct Handler {
    settings: Arc<AppSettings>,
    session_requests: mpsc::Sender<SessionRequest>,
}

impl Handler {
    pub fn new(settings: Arc<AppSettings>, session_requests: mpsc::Sender<SessionRequest>) -> Self {
        Self { settings, session_requests }
    }

    async fn dispatch(&self, ctx: &Context, msg: &Message, command: Command) {
        if command.is_privileged() && msg.channel_id.get() != self.settings.control_channel {
            info!("{} invoked outside the control channel, ignoring", command.name());
            say(&ctx.http, msg.channel_id, "That command only works in the control channel.").await;
            return;
        }

        if command == Command::ClearChannel {
            clear_channel(ctx, msg.channel_id).await;
            return;
        }

        let (reply, replied) = oneshot::channel();
        let request = SessionRequest::Command { command, reply };
        if self.session_requests.send(request).await.is_err() {
            error!("session worker is not running");
            return;
        }

        match replied.await {
            Ok(replies) => {
                for content in replies {
                    say(&ctx.http, msg.channel_id, content).await;
                }
            }
            Err(e) => error!("session worker dropped a command: {e}"),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} has connected to Discord", ready.user.name);
        info!(
            "debug mode {}, announcements go to channel {}",
            if self.settings.debug { "on" } else { "off" },
            self.settings.announce_channel()
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let bot_id = ctx.cache.current_user().id.get();
        let author_id = msg.author.id.get();

        let greeting = greeting_reply(&msg.content, bot_id, author_id, &mut rand::thread_rng());
        if let Some(greeting) = greeting {
            debug!("greeting {}", msg.author.name);
            say(&ctx.http, msg.channel_id, greeting).await;
        }

        if mentions_trip(&msg.content) {
            let salute_dir = self.settings.salute_directory.as_deref();
            send_with_salute(&ctx.http, msg.channel_id, trip_reply(author_id), salute_dir).await;
        }

        if let Some(command) = Command::parse(&msg.content, bot_id) {
            info!("{} ran {}", msg.author.name, command.name());
            self.dispatch(&ctx, &msg, command).await;
        }
    }
}

/// Posts what the session worker finds to the announcement channel.
pub struct Announcer {
    http: Arc<Http>,
    channel: ChannelId,
    salute_directory: Option<PathBuf>,
    announcements: mpsc::Receiver<Announcement>,
}

impl Announcer {
    pub fn new(
        http: Arc<Http>,
        channel: ChannelId,
        salute_directory: Option<PathBuf>,
        announcements: mpsc::Receiver<Announcement>,
    ) -> Self {
        Self { http, channel, salute_directory, announcements }
    }

    pub async fn run(mut self) {
        while let Some(announcement) = self.announcements.recv().await {
            let salute_dir = self.salute_directory.as_deref().filter(|_| announcement.salute);
            send_with_salute(&self.http, self.channel, announcement.content, salute_dir).await;
        }
    }
}

async fn say(http: &Http, channel: ChannelId, content: impl Into<String>) {
    if let Err(e) = channel.say(http, content).await {
        error!("Failed to send message to {channel}: {e}");
    }
}

/// Send `content`, with a random image from `salute_dir` attached when one is given.
async fn send_with_salute(http: &Http, channel: ChannelId, content: String, salute_dir: Option<&Path>) {
    let salute = salute_dir.and_then(|dir| pick_salute(dir, &mut rand::thread_rng()));

    let mut message = CreateMessage::new().content(content);
    if let Some(path) = salute {
        match CreateAttachment::path(&path).await {
            Ok(attachment) => message = message.add_file(attachment),
            Err(e) => warn!("could not attach {}: {e}", path.display()),
        }
    }

    if let Err(e) = channel.send_message(http, message).await {
        error!("Failed to send message to {channel}: {e}");
    }
}

/// Delete the channel history, a page at a time.
async fn clear_channel(ctx: &Context, channel: ChannelId) {
    info!("clearing channel {channel}");
    let mut deleted = 0;
    loop {
        let page = match channel.messages(ctx, GetMessages::new().limit(HISTORY_PAGE)).await {
            Ok(page) => page,
            Err(e) => {
                error!("could not fetch history of {channel}: {e}");
                break;
            }
        };

        for message in &page {
            if let Err(e) = message.delete(ctx).await {
                error!("could not delete message {}: {e}", message.id);
                return;
            }
            deleted += 1;
        }

        if page.len() < usize::from(HISTORY_PAGE) {
            break;
        }
    }
    info!("deleted {deleted} messages from {channel}");
}
