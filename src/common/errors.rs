use thiserror::Error;

use crate::common::types::ChannelId;

/// Failures while turning a track reference into a playable stream.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// The backend returned nothing for the query.
    #[error("no results found")]
    NotFound,

    /// The backend could not be reached or answered with an error.
    #[error("lookup failed: {0}")]
    Network(String),

    /// The backend answered, but none of the candidates carries a playable
    /// audio stream.
    #[error("no playable stream in result")]
    NoStream,
}

impl From<reqwest::Error> for ResolutionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Failures reported by the audio transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Building a playable source from the stream URL failed.
    #[error("failed to build audio source: {0}")]
    Construction(String),

    /// The transport holds no voice connection for this guild.
    #[error("not connected to a voice channel")]
    NotConnected,
}

/// User-facing command rejections. These never mutate session state.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid position {given}, pick a number from 1 to {len}")]
    InvalidPosition { given: usize, len: usize },

    #[error("nothing is playing")]
    NothingPlaying,

    #[error("the queue is empty")]
    EmptyQueue,

    #[error("commands for this session belong in channel {bound}")]
    WrongChannel { bound: ChannelId },

    /// The session worker is gone. Only possible during process shutdown.
    #[error("session is no longer available")]
    SessionClosed,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
