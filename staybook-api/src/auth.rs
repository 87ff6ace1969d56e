//! Authentication endpoints and the seam the session manager depends on

use async_trait::async_trait;
use serde::de::IgnoredAny;
use staybook_core::{
    ApiResult, AuthResponse, Credentials, PasswordChange, ProfileUpdate, Registration, User,
};
use tracing::info;

use crate::client::{ApiClient, RequestOptions};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const ME_PATH: &str = "/auth/me";
pub const PROFILE_PATH: &str = "/auth/profile";
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

/// Authentication operations needed by the session manager
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Whether a persisted token exists
    fn has_token(&self) -> bool;

    /// Exchange credentials for a token and user; persists the token on success
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse>;

    /// Create an account; persists the token on success
    async fn register(&self, registration: &Registration) -> ApiResult<AuthResponse>;

    /// Identity belonging to the persisted token
    async fn current_user(&self) -> ApiResult<User>;

    /// Discard the persisted token
    fn logout(&self);
}

/// Auth endpoints of [`ApiClient`]
pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }
}

impl Auth<'_> {
    /// `POST /auth/login`
    ///
    /// The token is stored only after the whole response decoded, so a
    /// failure never leaves a token behind.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        let response: AuthResponse = self
            .client
            .request_json(LOGIN_PATH, RequestOptions::post(credentials)?)
            .await?;

        self.client.tokens().set_token(&response.access_token);
        info!(user_id = response.user.id, "Logged in");
        Ok(response)
    }

    /// `POST /auth/register`
    pub async fn register(&self, registration: &Registration) -> ApiResult<AuthResponse> {
        let response: AuthResponse = self
            .client
            .request_json(REGISTER_PATH, RequestOptions::post(registration)?)
            .await?;

        self.client.tokens().set_token(&response.access_token);
        info!(user_id = response.user.id, "Registered new account");
        Ok(response)
    }

    /// `GET /auth/me`
    pub async fn me(&self) -> ApiResult<User> {
        self.client.request_json(ME_PATH, RequestOptions::get()).await
    }

    /// `GET /auth/profile`
    pub async fn profile(&self) -> ApiResult<User> {
        self.client
            .request_json(PROFILE_PATH, RequestOptions::get())
            .await
    }

    /// `PUT /auth/profile`, returning the saved user when the backend
    /// echoes it
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Option<User>> {
        self.client
            .request_optional(PROFILE_PATH, RequestOptions::put(update)?)
            .await
    }

    /// `POST /auth/change-password`
    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        let _: IgnoredAny = self
            .client
            .request_json(CHANGE_PASSWORD_PATH, RequestOptions::post(change)?)
            .await?;
        Ok(())
    }

    /// Forget the stored token. Never fails.
    pub fn logout(&self) {
        self.client.tokens().remove_token();
        info!("Logged out");
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    fn has_token(&self) -> bool {
        ApiClient::has_token(self)
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        self.auth().login(credentials).await
    }

    async fn register(&self, registration: &Registration) -> ApiResult<AuthResponse> {
        self.auth().register(registration).await
    }

    async fn current_user(&self) -> ApiResult<User> {
        self.auth().me().await
    }

    fn logout(&self) {
        self.auth().logout()
    }
}
