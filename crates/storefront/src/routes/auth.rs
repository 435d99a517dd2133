//! Authentication route handlers.
//!
//! Sign in, sign up, sign out, the three-step password reset and password
//! change, all against the commerce API's auth endpoints.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use freshcart_core::{Email, Phone};

use crate::api::{SignUp, token};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    Nav, OptionalAuth, RequireAuth, clear_current_customer, set_current_customer, set_flash,
};
use crate::models::{CurrentCustomer, Flash, session_keys};
use crate::services::merge_guest_into_account;
use crate::state::AppState;

use super::{capitalize, redirect_back};

/// Shortest password the API accepts.
const MIN_PASSWORD_LEN: usize = 6;

/// Shortest display name the API accepts.
const MIN_NAME_LEN: usize = 3;

// =============================================================================
// Form Types
// =============================================================================

/// Login page query.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub return_to: Option<String>,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub return_to: Option<String>,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub re_password: String,
    #[serde(default)]
    pub phone: String,
}

impl RegisterForm {
    /// Check the form locally before it reaches the API.
    fn validate(&self) -> Result<SignUp, Vec<String>> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        if name.chars().count() < MIN_NAME_LEN {
            errors.push(format!("Name must be at least {MIN_NAME_LEN} characters"));
        }
        let email = Email::parse(&self.email).map_err(|e| errors.push(capitalize(&e.to_string())));
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if self.password != self.re_password {
            errors.push("Passwords don't match".to_string());
        }
        let phone = Phone::parse(&self.phone).map_err(|e| errors.push(capitalize(&e.to_string())));

        match (email, phone) {
            (Ok(email), Ok(phone)) if errors.is_empty() => Ok(SignUp {
                name: name.to_string(),
                email: email.into_inner(),
                password: self.password.clone(),
                re_password: self.re_password.clone(),
                phone: phone.into_inner(),
            }),
            _ => Err(errors),
        }
    }
}

/// Password reset step 1.
#[derive(Debug, Deserialize)]
pub struct SendCodeForm {
    pub email: String,
}

/// Password reset step 2.
#[derive(Debug, Deserialize)]
pub struct VerifyCodeForm {
    pub code: String,
}

/// Password reset step 3.
#[derive(Debug, Deserialize)]
pub struct NewPasswordForm {
    pub new_password: String,
}

/// Password reset page query.
#[derive(Debug, Default, Deserialize)]
pub struct ForgotPasswordQuery {
    /// Start the flow over from step 1.
    #[serde(default)]
    pub restart: bool,
}

/// Change password form data.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub password: String,
    pub re_password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub email: String,
    pub return_to: String,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub form: RegisterForm,
    pub errors: Vec<String>,
}

/// Where the visitor is in the reset flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    SendCode,
    VerifyCode,
    NewPassword,
}

impl ResetStep {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::SendCode => "Forgot Password",
            Self::VerifyCode => "Verify Reset Code",
            Self::NewPassword => "Reset Password",
        }
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::SendCode => 1,
            Self::VerifyCode => 2,
            Self::NewPassword => 3,
        }
    }
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub nav: Nav,
    pub step: ResetStep,
    pub email: String,
}

/// Change password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/change_password.html")]
pub struct ChangePasswordTemplate {
    pub nav: Nav,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(customer): OptionalAuth,
    nav: Nav,
    Query(query): Query<LoginQuery>,
) -> Response {
    if customer.is_some() {
        return redirect_back(query.return_to.as_deref(), "/").into_response();
    }
    LoginTemplate {
        nav,
        email: String::new(),
        return_to: query.return_to.unwrap_or_default(),
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
///
/// On success the guest cart and wishlist are merged into the account
/// before redirecting back.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    nav: Nav,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_string();
    let failed = |nav: Nav, status: StatusCode, message: String| {
        (
            status,
            LoginTemplate {
                nav,
                email: email.clone(),
                return_to: form.return_to.clone().unwrap_or_default(),
                error: Some(message),
            },
        )
            .into_response()
    };

    let response = match state.api().sign_in(&email, &form.password).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Login failed");
            let status = if e.is_unauthorized() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::OK
            };
            return failed(nav, status, e.user_message("Invalid email or password"));
        }
    };

    let claims = match token::claims(&response.token) {
        Ok(claims) => claims,
        Err(e) => {
            error!(error = %e, "Sign-in returned an unreadable token");
            return failed(nav, StatusCode::BAD_GATEWAY, "Something went wrong".to_string());
        }
    };

    let (name, account_email) = match response.user {
        Some(user) => (user.name, user.email),
        None => (claims.name.clone(), email.clone()),
    };
    let customer = CurrentCustomer {
        token: response.token,
        user_id: claims.id,
        name,
        email: account_email,
    };

    if let Err(e) = set_current_customer(&session, &customer).await {
        error!(error = %e, "Failed to store customer in session");
        return failed(
            nav,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong".to_string(),
        );
    }

    let report = merge_guest_into_account(state.api(), &session, &customer.token).await;
    set_sentry_user(&customer.user_id, Some(&customer.email));
    info!(user_id = %customer.user_id, ?report, "Customer signed in");

    let flash = if report.has_failures() {
        Flash::error("Logged in, but some saved items could not be moved to your account")
    } else {
        Flash::success("Logged in successfully!")
    };
    set_flash(&session, flash).await;

    redirect_back(form.return_to.as_deref(), "/").into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(nav: Nav) -> impl IntoResponse {
    RegisterTemplate {
        nav,
        form: RegisterForm::default(),
        errors: Vec::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    nav: Nav,
    Form(form): Form<RegisterForm>,
) -> Response {
    let sign_up = match form.validate() {
        Ok(sign_up) => sign_up,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                RegisterTemplate { nav, form, errors },
            )
                .into_response();
        }
    };

    match state.api().sign_up(&sign_up).await {
        Ok(_) => {
            info!("Account created");
            set_flash(&session, Flash::success("Account created!")).await;
            Redirect::to("/auth/login").into_response()
        }
        Err(e) => {
            warn!(error = %e, "Registration failed");
            let errors = vec![e.user_message("Something went wrong")];
            RegisterTemplate { nav, form, errors }.into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Guest data left over from a partial merge stays in the session.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_customer(&session).await {
        error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to("/")
}

// =============================================================================
// Password Reset Routes
// =============================================================================

async fn reset_state(session: &Session) -> (Option<String>, bool) {
    let email = session
        .get::<String>(session_keys::RESET_EMAIL)
        .await
        .ok()
        .flatten();
    let verified = session
        .get::<bool>(session_keys::RESET_VERIFIED)
        .await
        .ok()
        .flatten()
        .unwrap_or(false);
    (email, verified)
}

async fn forget_reset(session: &Session) {
    for key in [session_keys::RESET_EMAIL, session_keys::RESET_VERIFIED] {
        if let Err(e) = session.remove_value(key).await {
            warn!(error = %e, "Failed to clear password reset state");
        }
    }
}

/// Display the current step of the password reset flow.
pub async fn forgot_password_page(
    session: Session,
    nav: Nav,
    Query(query): Query<ForgotPasswordQuery>,
) -> impl IntoResponse {
    if query.restart {
        forget_reset(&session).await;
    }
    let (email, verified) = reset_state(&session).await;
    let step = match (&email, verified) {
        (None, _) => ResetStep::SendCode,
        (Some(_), false) => ResetStep::VerifyCode,
        (Some(_), true) => ResetStep::NewPassword,
    };
    ForgotPasswordTemplate {
        nav,
        step,
        email: email.unwrap_or_default(),
    }
}

/// Step 1: email a reset code.
#[instrument(skip_all)]
pub async fn send_reset_code(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SendCodeForm>,
) -> Redirect {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => {
            set_flash(&session, Flash::error(capitalize(&e.to_string()))).await;
            return Redirect::to("/auth/forgot-password");
        }
    };

    match state.api().forgot_password(email.as_str()).await {
        Ok(response) => {
            forget_reset(&session).await;
            if let Err(e) = session
                .insert(session_keys::RESET_EMAIL, email.as_str())
                .await
            {
                error!(error = %e, "Failed to store password reset email");
            }
            let message = response
                .message
                .unwrap_or_else(|| "Reset code sent to your email".to_string());
            set_flash(&session, Flash::success(message)).await;
        }
        Err(e) => {
            warn!(error = %e, "Failed to send reset code");
            set_flash(&session, Flash::error(e.user_message("Error occurred"))).await;
        }
    }
    Redirect::to("/auth/forgot-password")
}

/// Step 2: check the emailed code.
#[instrument(skip_all)]
pub async fn verify_reset_code(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<VerifyCodeForm>,
) -> Redirect {
    if reset_state(&session).await.0.is_none() {
        return Redirect::to("/auth/forgot-password");
    }

    match state.api().verify_reset_code(form.code.trim()).await {
        Ok(_) => {
            if let Err(e) = session.insert(session_keys::RESET_VERIFIED, true).await {
                error!(error = %e, "Failed to store reset verification");
            }
            set_flash(&session, Flash::success("Code verified!")).await;
        }
        Err(e) => {
            warn!(error = %e, "Reset code rejected");
            set_flash(&session, Flash::error(e.user_message("Invalid code"))).await;
        }
    }
    Redirect::to("/auth/forgot-password")
}

/// Step 3: set the new password.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewPasswordForm>,
) -> Redirect {
    let (Some(email), true) = reset_state(&session).await else {
        return Redirect::to("/auth/forgot-password");
    };
    if form.new_password.chars().count() < MIN_PASSWORD_LEN {
        let message = format!("Password must be at least {MIN_PASSWORD_LEN} characters");
        set_flash(&session, Flash::error(message)).await;
        return Redirect::to("/auth/forgot-password");
    }

    match state.api().reset_password(&email, &form.new_password).await {
        Ok(_) => {
            forget_reset(&session).await;
            info!("Password reset");
            set_flash(&session, Flash::success("Password updated!")).await;
            Redirect::to("/auth/login")
        }
        Err(e) => {
            warn!(error = %e, "Password reset failed");
            set_flash(
                &session,
                Flash::error(e.user_message("Error updating password")),
            )
            .await;
            Redirect::to("/auth/forgot-password")
        }
    }
}

// =============================================================================
// Change Password Routes
// =============================================================================

/// Display the change password page.
pub async fn change_password_page(_auth: RequireAuth, nav: Nav) -> impl IntoResponse {
    ChangePasswordTemplate { nav }
}

/// Change the password, then sign out so the customer signs in again.
#[instrument(skip_all, fields(user_id = %customer.user_id))]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Form(form): Form<ChangePasswordForm>,
) -> Redirect {
    let back = Redirect::to("/auth/change-password");
    if form.password != form.re_password {
        set_flash(&session, Flash::error("Passwords don't match")).await;
        return back;
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        let message = format!("Password must be at least {MIN_PASSWORD_LEN} characters");
        set_flash(&session, Flash::error(message)).await;
        return back;
    }

    match state
        .api()
        .change_password(
            &customer.token,
            &form.current_password,
            &form.password,
            &form.re_password,
        )
        .await
    {
        Ok(response) if response.message.as_deref() == Some("success") => {
            if let Err(e) = clear_current_customer(&session).await {
                error!(error = %e, "Failed to clear session after password change");
            }
            clear_sentry_user();
            info!("Password changed");
            set_flash(&session, Flash::success("Password changed!")).await;
            Redirect::to("/auth/login")
        }
        Ok(response) => {
            warn!(message = ?response.message, "Unexpected change password response");
            set_flash(&session, Flash::error("Failed to change password")).await;
            back
        }
        Err(e) => {
            warn!(error = %e, "Password change failed");
            set_flash(
                &session,
                Flash::error(e.user_message("Failed to change password")),
            )
            .await;
            back
        }
    }
}
