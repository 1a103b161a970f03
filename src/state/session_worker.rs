use crate::app::App;
use crate::commands::Command;
use crate::state::messages::{Announcement, SessionRequest};
use crate::state::refresher::PeriodicRefresher;
use chrono::Local;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use warzone_api::WarzoneApi;

/// Owns the session and the upstream client. Requests are handled one at a
/// time, so a poll in flight always finishes before the next command runs.
pub struct SessionWorker {
    app: App,
    client: WarzoneApi,
    authenticated: bool,
    requests: mpsc::Receiver<SessionRequest>,
    /// Handed to the refresher so its polls queue up behind commands.
    requests_tx: mpsc::Sender<SessionRequest>,
    announcements: mpsc::Sender<Announcement>,
    poll_interval: Duration,
    refresher: Option<JoinHandle<()>>,
}

impl SessionWorker {
    pub fn new(
        app: App,
        client: WarzoneApi,
        requests: mpsc::Receiver<SessionRequest>,
        requests_tx: mpsc::Sender<SessionRequest>,
        announcements: mpsc::Sender<Announcement>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            app,
            client,
            authenticated: false,
            requests,
            requests_tx,
            announcements,
            poll_interval,
            refresher: None,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            match request {
                SessionRequest::Command { command, reply } => {
                    debug!("handling {}", command.name());
                    let replies = self.handle_command(command);
                    if reply.send(replies).is_err() {
                        warn!("command caller went away before the reply");
                    }
                }
                SessionRequest::Poll => self.handle_poll().await,
            }
        }
        self.stop_refresher();
    }

    fn handle_command(&mut self, command: Command) -> Vec<String> {
        match command {
            Command::StartSession { keep_stats } => {
                let was_active = self.app.is_active();
                let replies = self.app.start_session(keep_stats, Local::now());
                if !was_active && self.app.is_active() {
                    self.start_refresher();
                }
                replies
            }
            Command::EndSession => {
                self.stop_refresher();
                self.app.end_session(Local::now())
            }
            Command::SessionStats => self.app.session_stats(Local::now()),
            Command::PlayerStats { username } => self.app.player_stats(username.as_deref()),
            Command::Awards => self.app.awards(),
            // purged by the chat layer, which owns the channel
            Command::ClearChannel => Vec::new(),
        }
    }

    async fn handle_poll(&mut self) {
        if !self.app.is_active() {
            debug!("poll outside a session ignored");
            return;
        }

        if !self.authenticated {
            match self.client.authenticate().await {
                Ok(()) => self.authenticated = true,
                Err(e) => {
                    error!("skipping poll, could not authenticate: {e}");
                    return;
                }
            }
        }

        info!("checking for new matches");
        let announcements = match self.app.poll(&self.client).await {
            Ok(announcements) => announcements,
            Err(e) => {
                if e.is_unauthorized() {
                    self.authenticated = false;
                }
                error!("poll failed: {e}");
                return;
            }
        };

        debug!(
            "{} matches this session, watermark {:?}",
            self.app.session().match_count(),
            self.app.watermark()
        );
        for announcement in announcements {
            if let Err(e) = self.announcements.send(announcement).await {
                error!("Failed to queue announcement: {e}");
                break;
            }
        }
    }

    fn start_refresher(&mut self) {
        self.stop_refresher();
        let refresher = PeriodicRefresher::new(self.requests_tx.clone(), self.poll_interval);
        self.refresher = Some(tokio::spawn(refresher.run()));
        debug!("polling every {:?}", self.poll_interval);
    }

    fn stop_refresher(&mut self) {
        if let Some(task) = self.refresher.take() {
            task.abort();
            debug!("polling stopped");
        }
    }
}
