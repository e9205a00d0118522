//! Admin authentication: login throttling, password verification, token
//! issuance and rotation, and cookie session transport.

pub mod login;
pub mod password;
pub mod principal;
pub mod seed;
pub mod session;
pub mod state;
pub mod storage;
pub mod tokens;
pub mod types;

pub use self::state::{AuthConfig, AuthState};
