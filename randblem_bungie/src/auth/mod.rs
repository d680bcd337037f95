mod retry;
mod service;
mod types;

pub use retry::with_reauth;
pub use service::AuthService;
pub use types::{LoginRequest, Session};
