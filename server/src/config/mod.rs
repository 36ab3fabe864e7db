use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::{apply_security_headers, SecurityHeaders};

pub const DEFAULT_MAX_INVITEES: usize = 100;
pub const DEFAULT_VIDEO_QUALITY: &str = "720p";
pub const DEFAULT_AUDIO_QUALITY: &str = "mid";
pub const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),
}

/// Command-line configuration for the events server.
#[derive(Debug, Clone, Parser)]
#[command(name = "events-server", version, about = "HTTP service for creating and browsing events")]
pub struct Config {
    /// Maximum number of invitees permitted for an event
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_INVITEES)]
    pub max_invitees: usize,

    /// Default video quality served to clients
    #[arg(short = 'v', long, default_value = DEFAULT_VIDEO_QUALITY)]
    pub video_quality: String,

    /// Default audio quality served to clients
    #[arg(short = 'a', long, default_value = DEFAULT_AUDIO_QUALITY)]
    pub audio_quality: String,

    /// Address the server listens on; ":PORT" binds every interface
    #[arg(short = 'p', long, default_value = ":5555")]
    pub addr: String,

    /// SQLite database file, created on first start
    #[arg(long, env = "DATABASE_PATH", default_value = "sqlite.db")]
    pub database: PathBuf,

    /// Upper bound on the time spent persisting a single event
    #[arg(long, default_value_t = DEFAULT_CREATE_TIMEOUT_SECS)]
    pub create_timeout_secs: u64,
}

impl Config {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        resolve_listen_addr(&self.addr)
    }

    pub fn event_settings(&self) -> EventSettings {
        EventSettings {
            max_invitees: self.max_invitees,
            default_video_quality: self.video_quality.clone(),
            default_audio_quality: self.audio_quality.clone(),
            create_timeout: Duration::from_secs(self.create_timeout_secs),
        }
    }
}

/// Limits and defaults shared by validation, the repository and the handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSettings {
    pub max_invitees: usize,
    pub default_video_quality: String,
    pub default_audio_quality: String,
    pub create_timeout: Duration,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            max_invitees: DEFAULT_MAX_INVITEES,
            default_video_quality: DEFAULT_VIDEO_QUALITY.to_string(),
            default_audio_quality: DEFAULT_AUDIO_QUALITY.to_string(),
            create_timeout: Duration::from_secs(DEFAULT_CREATE_TIMEOUT_SECS),
        }
    }
}

/// Accepts `host:port` as well as the bare `:port` shorthand.
pub fn resolve_listen_addr(addr: &str) -> Result<SocketAddr, ConfigError> {
    let trimmed = addr.trim();
    let candidate = if trimmed.starts_with(':') {
        format!("0.0.0.0{}", trimmed)
    } else {
        trimmed.to_string()
    };

    candidate
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ConfigError::InvalidAddress(addr.to_string()))
}
