pub mod actor;
pub mod registry;
pub mod state;

pub use actor::{PauseToggle, SessionHandle};
pub use registry::SessionRegistry;
pub use state::{GuildSession, QueueSnapshot, SessionOrigin};
