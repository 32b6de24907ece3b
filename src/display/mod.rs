pub mod panel;
pub mod queue_view;

pub use panel::{DisplaySnapshot, MessageSurface, PanelHandle, PanelView, SurfaceError};
pub use queue_view::{build_pages, PageAction, QueuePage, QueuePaginator, ViewError};
