pub mod bounds;
pub mod math;
pub mod polygon;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use polygon::*;
pub use time::*;
