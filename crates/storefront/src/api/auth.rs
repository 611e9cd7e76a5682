//! Authentication and profile endpoints.

use std::future::Future;
use std::sync::Arc;

use reqwest::Method;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::types::{ProfileUpdate, User};

/// Transport seam for login, registration, and token validation.
///
/// The session provider speaks this trait instead of [`ApiClient`] directly
/// so the token restore path can be exercised against an in-memory fake.
pub trait AuthTransport: Send + Sync {
    /// Log in with email and password.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthSuccess, ApiError>> + Send;

    /// Register a new account.
    fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthSuccess, ApiError>> + Send;

    /// Fetch the profile the current bearer token belongs to.
    fn profile(&self) -> impl Future<Output = Result<User, ApiError>> + Send;
}

impl<T: AuthTransport> AuthTransport for Arc<T> {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, ApiError> {
        (**self).login(email, password).await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSuccess, ApiError> {
        (**self).register(name, email, password).await
    }

    async fn profile(&self) -> Result<User, ApiError> {
        (**self).profile().await
    }
}

/// Response from the login and register endpoints.
#[derive(Debug, Deserialize)]
pub struct AuthSuccess {
    /// Bearer token for subsequent requests. Wrapped so it never leaks into
    /// debug output.
    pub token: SecretString,
    pub user: User,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordBody<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteAccountBody<'a> {
    password: &'a str,
}

impl AuthTransport for ApiClient {
    /// Returns [`ApiError::Unauthorized`] on bad credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, ApiError> {
        self.send_bare(Method::POST, "auth/login", &LoginBody { email, password })
            .await
    }

    /// Returns an error if the email is taken or the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSuccess, ApiError> {
        self.send_bare(
            Method::POST,
            "auth/register",
            &RegisterBody {
                name,
                email,
                password,
            },
        )
        .await
    }

    /// Returns [`ApiError::Unauthorized`] if the token is missing or expired.
    #[instrument(skip(self))]
    async fn profile(&self) -> Result<User, ApiError> {
        self.get_data("profile").await
    }
}

impl ApiClient {
    /// Update the current user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.send_data(Method::PUT, "profile", update).await
    }

    /// Change the current user's password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the current password is wrong.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        self.send_unit_with_body(
            Method::PUT,
            "profile/change-password",
            &ChangePasswordBody {
                current_password,
                new_password,
            },
        )
        .await
    }

    /// Delete the current user's account, confirming with their password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the password is wrong.
    #[instrument(skip(self, password))]
    pub async fn delete_account(&self, password: &str) -> Result<(), ApiError> {
        self.send_unit_with_body(Method::DELETE, "profile", &DeleteAccountBody { password })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_auth_success_decodes_and_redacts() {
        let success: AuthSuccess = serde_json::from_value(serde_json::json!({
            "token": "eyJhbGciOiJIUzI1NiJ9.token",
            "user": {
                "_id": "66f0a1b2c3d4e5f601234567",
                "name": "Ada",
                "email": "ada@example.com"
            }
        }))
        .expect("auth success");

        assert_eq!(success.token.expose_secret(), "eyJhbGciOiJIUzI1NiJ9.token");
        assert_eq!(success.user.name, "Ada");
        assert!(!success.user.is_admin);

        // The token must not appear in debug output
        let debug = format!("{success:?}");
        assert!(!debug.contains("eyJhbGciOiJIUzI1NiJ9.token"));
    }
}
