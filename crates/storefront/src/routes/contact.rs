//! Contact page: support details, FAQs and a contact form.
//!
//! The commerce API has no contact endpoint; submissions are validated,
//! logged and acknowledged.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use freshcart_core::Email;

use crate::filters;
use crate::middleware::{Nav, set_flash};
use crate::models::Flash;

use super::capitalize;

/// Support mailbox shown on the page.
pub const SUPPORT_EMAIL: &str = "support@freshcart.com";

/// Longest message accepted.
const MAX_MESSAGE_LEN: usize = 5000;

/// A frequently asked question.
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

static FAQS: [Faq; 5] = [
    Faq {
        question: "How long does delivery take?",
        answer: "Standard delivery takes 3-5 business days. Express delivery is available for same-day or next-day arrival in select areas.",
    },
    Faq {
        question: "Can I return a product?",
        answer: "Yes! We offer a 14-day return policy. Items must be unused and in original packaging. Contact us to initiate a return.",
    },
    Faq {
        question: "How do I track my order?",
        answer: "Once your order ships, you'll receive an email with a tracking link. You can also view your orders from your account.",
    },
    Faq {
        question: "What payment methods do you accept?",
        answer: "We accept card payments online and cash on delivery.",
    },
    Faq {
        question: "Is there a minimum order amount for free shipping?",
        answer: "Yes, orders over 500 EGP qualify for free standard shipping.",
    },
];

/// Contact form data.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    fn validate(&self) -> Result<Email, Vec<String>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        let email = Email::parse(&self.email).map_err(|e| errors.push(capitalize(&e.to_string())));
        if self.subject.trim().is_empty() {
            errors.push("Subject is required".to_string());
        }
        let message = self.message.trim();
        if message.is_empty() {
            errors.push("Message is required".to_string());
        } else if message.chars().count() > MAX_MESSAGE_LEN {
            errors.push(format!("Message must be at most {MAX_MESSAGE_LEN} characters"));
        }

        match email {
            Ok(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub nav: Nav,
    pub support_email: &'static str,
    pub faqs: &'static [Faq],
    pub form: ContactForm,
    pub errors: Vec<String>,
}

/// Display the contact page.
pub async fn show(nav: Nav) -> impl IntoResponse {
    ContactTemplate {
        nav,
        support_email: SUPPORT_EMAIL,
        faqs: &FAQS,
        form: ContactForm::default(),
        errors: Vec::new(),
    }
}

/// Handle a contact form submission.
#[instrument(skip_all)]
pub async fn submit(session: Session, nav: Nav, Form(form): Form<ContactForm>) -> Response {
    match form.validate() {
        Ok(email) => {
            info!(
                from = %email,
                subject = %form.subject.trim(),
                length = form.message.trim().len(),
                "Contact message received"
            );
            set_flash(
                &session,
                Flash::success("Message sent! We'll get back to you within 24 hours."),
            )
            .await;
            Redirect::to("/contact").into_response()
        }
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ContactTemplate {
                nav,
                support_email: SUPPORT_EMAIL,
                faqs: &FAQS,
                form,
                errors,
            },
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_form_validation() {
        let valid = ContactForm {
            name: "Omar".to_string(),
            email: "omar@example.com".to_string(),
            subject: "Order".to_string(),
            message: "Where is my order?".to_string(),
        };
        assert!(valid.validate().is_ok());

        let errors = ContactForm::default().validate().err().unwrap_or_default();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn faqs_mention_policies() {
        assert!(FAQS.iter().any(|f| f.answer.contains("14-day")));
        assert!(FAQS.iter().any(|f| f.answer.contains("500 EGP")));
    }
}
