//! Auth service for signup and login
//!
//! Password hashing and verification run on the blocking thread pool; a
//! successful login writes a session record and hands back the cookie.

use crate::auth::{session, PasswordService, SessionCookies, SessionRecord, SessionStore};
use crate::error::ApiError;
use crate::repositories::UserRepository;
use blog_shared::{LoginRequest, SignupRequest, UserProfile};
use tracing::{debug, info};
use validator::Validate;

/// Login failure for an unknown username
pub const USER_NOT_FOUND: &str = "user not found";

/// Login failure for a wrong password
pub const INCORRECT_CREDENTIALS: &str = "incorrect username or password";

/// Auth service for account operations
pub struct AuthService;

impl AuthService {
    /// Create an account
    ///
    /// When `validate` is set the request goes through its derive-based
    /// length checks first; otherwise any strings are accepted. A taken
    /// username surfaces as a conflict from the store's unique constraint.
    pub async fn sign_up(
        users: &dyn UserRepository,
        passwords: &PasswordService,
        req: SignupRequest,
        validate: bool,
    ) -> Result<UserProfile, ApiError> {
        if validate {
            req.validate()
                .map_err(|e| ApiError::Validation(e.to_string()))?;
        }

        let password_hash = passwords
            .hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        let user = users.create(&req.username, &password_hash).await?;
        info!(user_id = %user.id, "User signed up");

        Ok(user.profile())
    }

    /// Check credentials and open a session
    ///
    /// Returns the `Set-Cookie` header value for the new session.
    pub async fn login(
        users: &dyn UserRepository,
        sessions: &dyn SessionStore,
        cookies: &SessionCookies,
        req: LoginRequest,
    ) -> Result<String, ApiError> {
        let user = users
            .find_by_username(&req.username)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(USER_NOT_FOUND.to_string()))?;

        let is_correct = PasswordService::verify_async(req.password, user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;

        if !is_correct {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(ApiError::Unauthorized(INCORRECT_CREDENTIALS.to_string()));
        }

        let session_id = session::new_session_id();
        let record = SessionRecord::authenticated(user.id, user.username);
        sessions.save(&session_id, &record, cookies.ttl()).await?;
        info!(user_id = %user.id, "User logged in");

        Ok(cookies.issue(&session_id)?)
    }
}
