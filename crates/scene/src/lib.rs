pub mod graph;
pub mod memory;
pub mod pick;
pub mod picking;
pub mod selection;

pub use graph::*;
pub use memory::*;
pub use pick::*;
pub use selection::*;
