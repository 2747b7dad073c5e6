//! Widget core for the visualization viewer.
//!
//! [`ViewerWidget`] owns the per-widget state (renderer, size, resize band,
//! image map, scene graph, stream cursor, in-flight token) and exposes the
//! operations a host calls: attach/update, gesture handlers, resize, and
//! response handling. It never performs I/O itself; every network round trip
//! is returned to the caller as a [`PendingRequest`] and answered through
//! [`ViewerWidget::handle_response`]. [`Session`] wires that loop to a
//! [`streaming::Transport`].

pub mod components;
pub mod config;
mod dispatch;
pub mod error;
pub mod events;
pub mod imagemap;
pub mod model;
pub mod pick;
pub mod resize;
pub mod session;
pub mod surface;
pub mod svg;
pub mod theme;
pub mod widget;

pub use components::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use imagemap::*;
pub use model::*;
pub use pick::*;
pub use resize::*;
pub use session::*;
pub use surface::*;
pub use svg::*;
pub use theme::*;
pub use widget::*;
