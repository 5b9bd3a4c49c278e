//! Authentication module
//!
//! Provides bcrypt password hashing, signed session cookies and the
//! session stores behind them.

mod cookie;
mod middleware;
mod password;
pub mod session;

pub use cookie::{CookieSigner, SessionCookies};
pub use middleware::{resolve_session, SessionUser, WriteAccess};
pub use password::PasswordService;
pub use session::{
    MemorySessionStore, RedisSessionStore, SessionError, SessionRecord, SessionStore,
};
