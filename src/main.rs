mod app;
mod bot;
mod chatter;
mod commands;
mod state;
mod stats;

use crate::app::App;
use crate::bot::{Announcer, Handler};
use crate::state::app_settings::AppSettings;
use crate::state::messages::{Announcement, SessionRequest};
use crate::state::poller::Poller;
use crate::state::session_worker::SessionWorker;
use anyhow::Context;
use log::{error, info};
use serenity::all::{ChannelId, Client, GatewayIntents};
use std::panic;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use warzone_api::WarzoneApi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let settings = AppSettings::load().context("Failed to load configuration")?;
    init_logging(&settings.log_level);
    setup_panic_hook();

    let client = WarzoneApi::new(&settings.atkn, &settings.sso, settings.http_timeout)?
        .with_auth_policy(settings.auth_policy);
    let poller = Poller::new(
        settings.cod_username.clone(),
        settings.initial_match_id.clone(),
        settings.high_kill_threshold,
    );

    let (session_req_tx, session_req_rx) = mpsc::channel::<SessionRequest>(100);
    let (announce_tx, announce_rx) = mpsc::channel::<Announcement>(100);

    // Session thread: commands and polls, one at a time
    let session_worker = SessionWorker::new(
        App::new(poller),
        client,
        session_req_rx,
        session_req_tx.clone(),
        announce_tx,
        settings.poll_interval,
    );
    let session_task = tokio::spawn(session_worker.run());

    let settings = Arc::new(settings);
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut discord = Client::builder(&settings.discord_token, intents)
        .event_handler(Handler::new(settings.clone(), session_req_tx))
        .await
        .context("Error creating Discord client")?;

    // Announcement thread
    let announcer = Announcer::new(
        discord.http.clone(),
        ChannelId::new(settings.announce_channel()),
        settings.salute_directory.clone(),
        announce_rx,
    );
    let announce_task = tokio::spawn(announcer.run());

    info!("tracking Warzone matches for {}", settings.cod_username);
    let result = discord.start().await;

    session_task.abort();
    announce_task.abort();

    result.context("Discord client error")
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("lumberbot {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "lumberbot - Warzone session stats for your Discord squad

Usage:
  lumberbot
  lumberbot --help
  lumberbot --version

Environment (a .env file in the working directory is read too):
  DISCORD_TOKEN           Discord bot token
  COD_USERNAME            Gamer tag whose matches are tracked
  ATKN, ACT_SSO_COOKIE    Call of Duty session cookies
  CONTROL_CHANNEL_ID      Channel allowed to start, end and clear
  ANNOUNCE_CHANNEL_ID     Channel for win and high-kill announcements
  DEBUG_CHANNEL_ID        Announcement channel in debug mode (default control channel)
  LUMBERBOT_DEBUG         Set to 1 to enable debug mode
  SALUTE_DIRECTORY        Directory of reaction images for wins
  POLL_INTERVAL_SECS      Seconds between polls (default 480)
  HTTP_TIMEOUT_SECS       Upstream request timeout (default 10)
  AUTH_RETRY_ATTEMPTS     Login attempts per poll (default 3)
  AUTH_RETRY_SPACING_SECS Seconds between login attempts (default 5)
  INITIAL_MATCH_ID        Newest match already reported
  HIGH_KILL_THRESHOLD     Kills for a high-kill shout-out (default 10)
  LUMBERBOT_LOG_LEVEL     Log filter when RUST_LOG is unset (default info)"
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        error!("lumberbot panicked: {panic_info}");
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
