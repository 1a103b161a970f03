pub mod app_settings;
pub mod messages;
pub mod poller;
pub mod refresher;
pub mod session_worker;
