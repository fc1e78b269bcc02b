//! HTTP handlers for the extension-auth service.

pub mod bridge;
pub mod handshake;
pub mod session;

pub use bridge::*;
pub use handshake::*;
pub use session::*;
