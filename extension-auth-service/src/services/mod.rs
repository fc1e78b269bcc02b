//! Services layer: the handshake core and its collaborator seams.

pub mod auth;
pub mod handshake;
mod jwt;
pub mod registry;
pub mod state_token;
mod sweeper;
pub mod token_binding;
mod user_store;

pub use auth::{AuthService, TokenResponse};
pub use handshake::{HandoffRedirect, HandshakeService};
pub use jwt::{AccessTokenClaims, ExtensionTokenClaims, JwtService};
pub use registry::{PendingRequestRegistry, TokenCheck};
pub use sweeper::spawn_sweeper;
pub use user_store::{InMemoryUserStore, UserStore};
