//! Account endpoints: sign in/up, password reset and change.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use super::ApiError;
use super::client::CommerceClient;
use super::types::{AuthResponse, MessageResponse, SignUp, TokenResponse};

impl CommerceClient {
    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for wrong credentials, or an error
    /// if the API request fails.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let url = self.url("auth/signin")?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }));
        self.execute(request).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the API's reason (e.g. "Account
    /// Already Exists"), or an error if the API request fails.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn sign_up(&self, form: &SignUp) -> Result<AuthResponse, ApiError> {
        let url = self.url("auth/signup")?;
        self.execute(self.request(Method::POST, url, None).json(form))
            .await
    }

    /// Email a password reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the email or the request fails.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let url = self.url("auth/forgotPasswords")?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "email": email }));
        self.execute(request).await
    }

    /// Check a reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or expired, or the request fails.
    #[instrument(skip(self, code))]
    pub async fn verify_reset_code(&self, code: &str) -> Result<MessageResponse, ApiError> {
        let url = self.url("auth/verifyResetCode")?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "resetCode": code }));
        self.execute(request).await
    }

    /// Set a new password after a verified reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the reset or the request fails.
    #[instrument(skip(self, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<TokenResponse, ApiError> {
        let url = self.url("auth/resetPassword")?;
        let request = self
            .request(Method::PUT, url, None)
            .json(&json!({ "email": email, "newPassword": new_password }));
        self.execute(request).await
    }

    /// Change the signed-in customer's password.
    ///
    /// The API invalidates the old token on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the current password is wrong or the request fails.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        token: &str,
        current_password: &str,
        password: &str,
        re_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let url = self.url("auth/changePassword")?;
        let request = self.request(Method::PUT, url, Some(token)).json(&json!({
            "currentPassword": current_password,
            "password": password,
            "rePassword": re_password,
        }));
        self.execute(request).await
    }
}
