pub mod errors;
pub mod logger;
pub mod types;

pub use types::{ChannelId, GuildId, MessageId, UserId};
