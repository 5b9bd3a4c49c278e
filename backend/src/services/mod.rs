//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the session store.

pub mod auth;
pub mod post;

pub use auth::AuthService;
pub use post::PostService;
