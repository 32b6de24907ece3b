pub mod commands;
pub mod common;
pub mod configs;
pub mod display;
pub mod session;
pub mod sources;
pub mod track;
pub mod transport;

pub use common::errors::{CommandError, ResolutionError, TransportError};
pub use session::registry::SessionRegistry;
pub use track::{LoopMode, Track, TrackRef};
