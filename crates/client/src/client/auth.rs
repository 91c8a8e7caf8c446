//! Account and session API methods

use super::ApiClient;
use super::error::ClientError;
use reqwest::Method;
use scribe_core::types::{
    AuthData, ChangePasswordRequest, LoginRequest, LogoutRequest, PasswordChange, RegisterRequest,
    UpdateProfileRequest, User, UserData,
};
use scribe_core::validation;
use tracing::{debug, warn};

impl ApiClient {
    /// Create an account and start its session
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        validation::validate_registration(request)?;
        let envelope = self
            .send_json(Method::POST, "/auth/register", request)
            .await?
            .require_success()?;
        let data: AuthData = envelope.data_as()?;
        self.session.install(&data.tokens, &data.user).await;
        Ok(data.user)
    }

    /// Exchange credentials for a session
    ///
    /// A rejected login leaves any existing session untouched.
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ClientError> {
        validation::validate_login(request)?;
        let envelope = self
            .send_json(Method::POST, "/auth/login", request)
            .await?
            .require_success()?;
        let data: AuthData = envelope.data_as()?;
        self.session.install(&data.tokens, &data.user).await;
        Ok(data.user)
    }

    /// End the session
    ///
    /// The server is told on a best-effort basis so it can revoke the
    /// refresh token; the local session is cleared regardless.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.session.refresh_token().await {
            let request = LogoutRequest { refresh_token };
            if let Err(err) = self.send_json(Method::POST, "/auth/logout", &request).await {
                warn!("Logout notification failed: {err}");
            }
        }
        self.session.clear().await;
    }

    /// Fetch the signed-in account
    ///
    /// A successful fetch replaces the cached snapshot. When the fetch
    /// fails and a snapshot exists, the snapshot is served instead.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        match self.fetch_current_user().await {
            Ok(user) => Ok(user),
            Err(err) => {
                if let Some(cached) = self.session.current_user().await {
                    debug!("Serving cached user snapshot, fetch failed: {err}");
                    return Ok(cached);
                }
                Err(err)
            }
        }
    }

    async fn fetch_current_user(&self) -> Result<User, ClientError> {
        let envelope = self
            .request(Method::GET, "/auth/me", None, &[])
            .await?
            .require_success()?;
        let data: UserData = envelope.data_as()?;
        self.session.set_user(&data.user).await;
        Ok(data.user)
    }

    /// Update name and bio, refreshing the cached snapshot
    pub async fn update_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> Result<User, ClientError> {
        validation::validate_profile_update(request)?;
        let envelope = self
            .send_json(Method::PUT, "/auth/me", request)
            .await?
            .require_success()?;
        let data: UserData = envelope.data_as()?;
        self.session.set_user(&data.user).await;
        Ok(data.user)
    }

    /// Change the account password; the session is left untouched
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ClientError> {
        validation::validate_password_change(change)?;
        let request = ChangePasswordRequest {
            current_password: change.current_password.clone(),
            new_password: change.new_password.clone(),
        };
        self.send_json(Method::PUT, "/auth/change-password", &request)
            .await?
            .require_success()?;
        Ok(())
    }

    /// True when an access token is held; the server is not consulted
    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Cached user snapshot, if any, without a network call
    pub async fn cached_user(&self) -> Option<User> {
        self.session.current_user().await
    }

    /// Drop the session locally without notifying the server
    pub async fn clear_session(&self) {
        self.session.clear().await;
    }
}
