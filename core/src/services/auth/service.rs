//! Session lifecycle: login, refresh, rotation, revocation and account administration

use std::future::Future;
use std::sync::Arc;

use crate::domain::entities::session::Session;
use crate::domain::entities::token::{
    RefreshOutcome, RefreshVerification, TokenClaims, TokenPair, TokenType,
};
use crate::domain::entities::user::{truncate_to_seconds, NewUser, User};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{SessionRepository, UserRepository};
use crate::services::clock::Clock;
use crate::services::token::TokenCodec;

use super::config::AuthServiceConfig;
use super::credential_rules::{validate_password, validate_username};
use super::password_hasher::PasswordHasher;

/// Authentication service driving every refresh-session transition
///
/// A refresh token is usable only while its session row exists and has not
/// expired. The service never logs token strings or passwords.
pub struct AuthService<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    /// User repository for account data
    user_repository: Arc<U>,
    /// Session repository, the authority on refresh token validity
    session_repository: Arc<S>,
    /// Signs and verifies tokens
    token_codec: Arc<TokenCodec>,
    /// Derives stored password hashes
    password_hasher: Arc<dyn PasswordHasher>,
    /// Time source for every expiry decision
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<U, S> AuthService<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `user_repository` - Account persistence
    /// * `session_repository` - Session persistence
    /// * `token_codec` - JWT signing and verification
    /// * `password_hasher` - Password hash derivation
    /// * `clock` - Time source, shared with the codec
    /// * `config` - Renewal threshold and store timeout
    pub fn new(
        user_repository: Arc<U>,
        session_repository: Arc<S>,
        token_codec: Arc<TokenCodec>,
        password_hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            session_repository,
            token_codec,
            password_hasher,
            clock,
            config,
        }
    }

    /// Token codec shared with request middleware
    pub fn token_codec(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.token_codec)
    }

    /// Authenticate with a username and password and open a new session
    ///
    /// Sessions opened earlier stay valid. Expired sessions of the user are
    /// swept on the way; a failed sweep does not fail the login.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Fresh access and refresh tokens
    /// * `Err(AuthError::Unauthorized)` - Unknown user or wrong password
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<TokenPair> {
        let user = self
            .bounded("find user", self.user_repository.find_by_username(username))
            .await?
            .ok_or_else(|| {
                tracing::debug!(username = %username, "Login for unknown user");
                DomainError::unauthorized()
            })?;

        if !self.password_matches(&user, password) {
            tracing::debug!(username = %user.username, "Login with wrong password");
            return Err(DomainError::unauthorized());
        }

        let now = self.clock.now();
        match self
            .bounded(
                "sweep expired sessions",
                self.session_repository
                    .delete_expired_for_user(&user.username, now),
            )
            .await
        {
            Ok(swept) if swept > 0 => {
                tracing::debug!(username = %user.username, swept, "Removed expired sessions");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(username = %user.username, error = %e, "Expired session sweep failed");
            }
        }

        let access_claims = TokenClaims::access(&user.username, user.is_admin);
        let refresh_claims = access_claims.as_type(TokenType::Refresh);
        let access_token = self.issue(&access_claims)?;
        let refresh_token = self.issue(&refresh_claims)?;

        let refresh_ttl = self.token_codec.ttl(TokenType::Refresh);
        let session = Session::new(
            refresh_token.clone(),
            truncate_to_seconds(now + refresh_ttl),
            &user.username,
        );
        self.bounded("create session", self.session_repository.create(session))
            .await?;

        tracing::info!(username = %user.username, admin = user.is_admin, "User logged in");

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.token_codec.ttl(TokenType::Access).num_seconds(),
            refresh_ttl.num_seconds(),
        ))
    }

    /// Check an access token; the session store is not consulted
    pub fn verify_access(&self, token: &str) -> DomainResult<TokenClaims> {
        self.token_codec
            .verify(token, TokenType::Access)
            .map_err(|e| self.reject(e))
    }

    /// Check a refresh token against both its signature and its session
    ///
    /// # Returns
    ///
    /// * `Ok(RefreshVerification)` - Claims, plus whether the session is due for rotation
    /// * `Err(AuthError::Unauthorized)` - Bad token, no session, or session expired
    pub async fn verify_refresh(&self, token: &str) -> DomainResult<RefreshVerification> {
        let claims = self
            .token_codec
            .verify(token, TokenType::Refresh)
            .map_err(|e| self.reject(e))?;

        let session = self
            .bounded("find session", self.session_repository.find_by_token(token))
            .await?
            .ok_or_else(|| {
                tracing::debug!(username = %claims.username, "Refresh token has no session");
                DomainError::unauthorized()
            })?;

        let now = self.clock.now();
        if session.is_expired(now) {
            tracing::debug!(username = %claims.username, "Refresh session expired");
            return Err(DomainError::unauthorized());
        }
        if session.username != claims.username {
            tracing::warn!(username = %claims.username, "Session owner does not match token");
            return Err(DomainError::unauthorized());
        }

        Ok(RefreshVerification {
            need_renew: session.expires_within(now, self.config.renewal_threshold),
            claims,
        })
    }

    /// Replace the session of `old_token` with a freshly signed refresh token
    ///
    /// Of several concurrent rotations of the same token exactly one wins; the
    /// others get `Unauthorized`.
    pub async fn rotate(&self, old_token: &str, claims: &TokenClaims) -> DomainResult<String> {
        let refresh_claims = claims.as_type(TokenType::Refresh);
        let new_token = self.issue(&refresh_claims)?;
        let expires = truncate_to_seconds(self.clock.now() + self.token_codec.ttl(TokenType::Refresh));
        let replacement = Session::new(new_token.clone(), expires, &refresh_claims.username);

        let rotated = self
            .bounded(
                "rotate session",
                self.session_repository.rotate(old_token, replacement),
            )
            .await?;
        if !rotated {
            tracing::debug!(username = %refresh_claims.username, "Session already rotated or revoked");
            return Err(DomainError::unauthorized());
        }

        tracing::debug!(username = %refresh_claims.username, "Rotated refresh session");
        Ok(new_token)
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The admin flag is re-read from the account, so a demotion takes effect
    /// at the next refresh. When the session is due for renewal the refresh
    /// token is rotated as well.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<RefreshOutcome> {
        let verification = self.verify_refresh(refresh_token).await?;

        let user = self
            .bounded(
                "find user",
                self.user_repository
                    .find_by_username(&verification.claims.username),
            )
            .await?
            .ok_or_else(|| {
                tracing::debug!(username = %verification.claims.username, "Refresh for deleted user");
                DomainError::unauthorized()
            })?;

        let access_claims = TokenClaims::access(&user.username, user.is_admin);
        let access_token = self.issue(&access_claims)?;

        let rotated = if verification.need_renew {
            Some(
                self.rotate(refresh_token, &access_claims.as_type(TokenType::Refresh))
                    .await?,
            )
        } else {
            None
        };

        Ok(RefreshOutcome {
            access_token,
            access_expires_in: self.token_codec.ttl(TokenType::Access).num_seconds(),
            refresh_token: rotated,
            refresh_expires_in: self.token_codec.ttl(TokenType::Refresh).num_seconds(),
        })
    }

    /// End one session; ending an unknown session is not an error
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        let deleted = self
            .bounded(
                "delete session",
                self.session_repository.delete_by_token(refresh_token),
            )
            .await?;
        tracing::debug!(deleted, "Logout");
        Ok(())
    }

    /// End every session of `username` except the one keyed by `refresh_token`
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Number of sessions ended
    pub async fn logout_others(&self, refresh_token: &str, username: &str) -> DomainResult<u64> {
        let revoked = self
            .bounded(
                "delete other sessions",
                self.session_repository
                    .delete_all_for_user_except(username, refresh_token),
            )
            .await?;
        tracing::info!(username = %username, revoked, "Logged out other sessions");
        Ok(revoked)
    }

    /// Change a user's own password
    ///
    /// Every session of the user ends, including the one making the request.
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let user = self
            .bounded("find user", self.user_repository.find_by_username(username))
            .await?
            .ok_or_else(DomainError::unauthorized)?;

        if !self.password_matches(&user, current_password) {
            tracing::debug!(username = %user.username, "Password change with wrong current password");
            return Err(DomainError::unauthorized());
        }

        let revoked = self
            .replace_password(&user, new_password)
            .await
            .map_err(|e| match e {
                // account vanished between the read and the write
                DomainError::NotFound { .. } => DomainError::unauthorized(),
                other => other,
            })?;

        tracing::info!(username = %user.username, revoked, "Password changed");
        Ok(())
    }

    /// Create an account on behalf of an administrator
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The stored account
    /// * `Err(AuthError::Forbidden)` - Caller is not an administrator
    /// * `Err(AuthError::PolicyViolation)` - Username or password rejected
    /// * `Err(DomainError::Conflict)` - Username taken
    pub async fn create_user(&self, admin: &TokenClaims, new_user: NewUser) -> DomainResult<User> {
        self.require_admin(admin)?;

        if !validate_username(&new_user.username)
            || !validate_password(&new_user.username, &new_user.password)
        {
            return Err(AuthError::PolicyViolation.into());
        }

        let member_since = truncate_to_seconds(new_user.member_since.unwrap_or_else(|| self.clock.now()));
        let mut user = User::new(&new_user.username, String::new(), member_since, new_user.is_admin);
        user.password_hash =
            self.password_hasher
                .hash(&user.username, &user.member_since_iso(), &new_user.password);

        let created = self
            .bounded("create user", self.user_repository.create(user))
            .await?;

        tracing::info!(
            admin = %admin.username,
            username = %created.username,
            is_admin = created.is_admin,
            "User created"
        );
        Ok(created)
    }

    /// Delete an account and all of its sessions
    pub async fn delete_user(&self, admin: &TokenClaims, username: &str) -> DomainResult<()> {
        self.require_admin(admin)?;

        if !validate_username(username) {
            return Err(AuthError::PolicyViolation.into());
        }

        let deleted = self
            .bounded(
                "delete user",
                self.user_repository.delete_with_sessions(username),
            )
            .await?;
        if !deleted {
            return Err(DomainError::NotFound {
                resource: "user".to_string(),
            });
        }

        tracing::info!(admin = %admin.username, username = %username, "User deleted");
        Ok(())
    }

    /// Set a new password for any account, ending all of its sessions
    pub async fn reset_password(
        &self,
        admin: &TokenClaims,
        username: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        self.require_admin(admin)?;

        if !validate_username(username) {
            return Err(AuthError::PolicyViolation.into());
        }

        let user = self
            .bounded("find user", self.user_repository.find_by_username(username))
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: "user".to_string(),
            })?;

        let revoked = self.replace_password(&user, new_password).await?;

        tracing::info!(admin = %admin.username, username = %user.username, revoked, "Password reset");
        Ok(())
    }

    /// Readiness probe for the backing store
    pub async fn ping(&self) -> DomainResult<()> {
        self.bounded("ping", self.session_repository.ping()).await
    }

    async fn replace_password(&self, user: &User, new_password: &str) -> DomainResult<u64> {
        if !validate_password(&user.username, new_password) {
            return Err(AuthError::PolicyViolation.into());
        }

        let hash = self
            .password_hasher
            .hash(&user.username, &user.member_since_iso(), new_password);

        self.bounded(
            "update password",
            self.user_repository
                .update_password_and_revoke_sessions(&user.username, &hash),
        )
        .await
    }

    fn password_matches(&self, user: &User, password: &str) -> bool {
        self.password_hasher.verify(
            &user.username,
            &user.member_since_iso(),
            password,
            &user.password_hash,
        )
    }

    fn require_admin(&self, claims: &TokenClaims) -> DomainResult<()> {
        if claims.is_admin && claims.token_type == TokenType::Access {
            Ok(())
        } else {
            tracing::debug!(username = %claims.username, "Admin operation refused");
            Err(AuthError::Forbidden.into())
        }
    }

    fn issue(&self, claims: &TokenClaims) -> DomainResult<String> {
        self.token_codec.issue(claims).map_err(|e| DomainError::Internal {
            message: format!("Failed to issue {} token: {}", claims.token_type, e),
        })
    }

    fn reject(&self, error: TokenError) -> DomainError {
        tracing::debug!(reason = %error, "Token rejected");
        DomainError::unauthorized()
    }

    /// Run a store call under the configured timeout
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                if e.is_internal() {
                    tracing::error!(operation, error = %e, "Store call failed");
                }
                Err(e)
            }
            Err(_) => {
                tracing::error!(operation, timeout = ?self.config.store_timeout, "Store call timed out");
                Err(DomainError::Internal {
                    message: format!("{} timed out", operation),
                })
            }
        }
    }
}
