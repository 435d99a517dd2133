//! Newsletter sign-up.
//!
//! The commerce API has no mailing list; sign-ups are validated, logged and
//! acknowledged.

use axum::{Form, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use freshcart_core::Email;

use crate::middleware::set_flash;
use crate::models::Flash;

use super::redirect_back;

/// Newsletter subscription form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub email: String,
    pub return_to: Option<String>,
}

/// Subscribe to the newsletter and redirect back.
#[instrument(skip_all)]
pub async fn subscribe(session: Session, Form(form): Form<SubscribeForm>) -> Redirect {
    let flash = match Email::parse(&form.email) {
        Ok(email) => {
            info!(email = %email, "Newsletter subscription");
            Flash::success("You're subscribed!")
        }
        Err(_) => Flash::error("Please enter a valid email address."),
    };
    set_flash(&session, flash).await;
    redirect_back(form.return_to.as_deref(), "/")
}
