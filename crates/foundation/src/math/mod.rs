pub mod precision;
pub mod transform;
pub mod vec;

pub use precision::*;
pub use transform::*;
pub use vec::*;
