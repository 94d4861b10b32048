//! API Middleware
//!
//! Session authentication and the request extractors used by handlers.

pub mod extract;
pub mod session;

pub use extract::{ApiQuery, PathId, ValidatedJson};
pub use session::{
    clear_session_cookie, require_session, session_cookie, session_user, CurrentUser,
    SESSION_COOKIE,
};
