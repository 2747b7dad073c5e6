pub mod chunk;
pub mod encoding;
#[cfg(not(target_arch = "wasm32"))]
pub mod http;
pub mod protocol;
pub mod response;
pub mod server_error;
pub mod transport;

pub use chunk::*;
pub use encoding::*;
#[cfg(not(target_arch = "wasm32"))]
pub use http::*;
pub use protocol::*;
pub use response::*;
pub use server_error::*;
pub use transport::*;
