pub mod event_bus;
pub mod idle;
pub mod request;

pub use event_bus::*;
pub use idle::*;
pub use request::*;
