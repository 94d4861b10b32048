//! Authentication and authorization for the bulletproof API

pub mod authorization;
pub mod password;
pub mod session;

pub use authorization::{authorize, check_role, Authored, Gate, Policy, Role, Subject, UnknownPolicy};
pub use password::{hash_password, verify_credentials, verify_password, PasswordError};
pub use session::{IssuedSession, SessionClaims, SessionError, SessionKeys, SessionUser};
