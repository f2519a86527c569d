use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, Envelope};
use crate::models::UserProfile;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration payload. The password confirmation never leaves the form.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub edad: u32,
    pub peso: f64,
    pub estatura: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub nombre: String,
    pub edad: u32,
    pub peso: f64,
    pub estatura: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: UserProfile,
}

impl ApiClient {
    /// Log in and start a session
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthData> {
        tracing::debug!("Logging in as {}", request.email);

        let envelope: Envelope<AuthData> = self
            .post_json("/api/auth/login", request, "login")
            .await?;

        let auth = envelope
            .into_data("login")
            .map_err(|e| ApiError::AuthenticationFailed(e.to_string()))?;

        self.session()
            .login(auth.user.clone(), auth.token.clone())
            .context("Failed to persist session")?;

        Ok(auth)
    }

    /// Create an account and start a session with it
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthData> {
        tracing::debug!("Registering {}", request.email);

        let envelope: Envelope<AuthData> = self
            .post_json("/api/auth/register", request, "register")
            .await?;
        let auth = envelope.into_data("registration")?;

        self.session()
            .login(auth.user.clone(), auth.token.clone())
            .context("Failed to persist session")?;

        Ok(auth)
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        let envelope: Envelope<UserData> = self.get_json("/api/auth/profile", &[], "profile").await?;
        Ok(envelope.into_data("profile")?.user)
    }

    /// Update the own profile and refresh the stored user
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let envelope: Envelope<UserData> = self
            .put_json("/api/auth/profile", update, "profile update")
            .await?;
        let user = envelope.into_data("profile update")?.user;

        self.session()
            .update_user(user.clone())
            .context("Failed to refresh stored user")?;

        Ok(user)
    }
}
