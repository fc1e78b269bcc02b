pub mod pending_request;
pub mod user;

pub use pending_request::PendingAuthRequest;
pub use user::{SanitizedUser, User, UserRole};
