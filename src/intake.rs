//! Demo-request intake: form validation and submission to the intake API.
//!
//! The endpoint is `api.base_url` from the site configuration. Rejections are
//! mapped to user-facing text here so callers only have to display it.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::config::ConfigResolver;
use crate::phone;

/// Fallback text for any failure without a more specific message.
pub const GENERIC_FAILURE: &str =
    "Sorry, there was an error submitting your request. Please try again later.";
pub const SUCCESS_MESSAGE: &str = "Thank you for your interest! Our team will call you shortly.";

/// Fields of the demo request form, serialised as the intake API expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Phone number as entered (usually already formatted `XXX-XXX-XXXX`).
    pub number: String,
    pub evaluation_type: String,
}

/// Why a form was refused before anything was sent. `Display` is the text
/// shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields.")]
    MissingField,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter a valid 10-digit phone number.")]
    InvalidPhone,
}

impl IntakeForm {
    /// Check the form, reporting only the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.number,
            &self.evaluation_type,
        ];
        if required.iter().any(|f| f.is_empty()) {
            return Err(ValidationError::MissingField);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if !phone::is_complete_phone(&self.number) {
            return Err(ValidationError::InvalidPhone);
        }
        Ok(())
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
        .is_match(email)
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("intake endpoint not configured (api.base_url)")]
    NotConfigured,
    #[error("intake request failed: {0}")]
    Transport(String),
    #[error("intake rejected with HTTP {status}: {message}")]
    Rejected { status: StatusCode, message: String },
}

impl IntakeError {
    /// Text to show the user for this failure.
    pub fn user_message(&self) -> &str {
        match self {
            IntakeError::Rejected { message, .. } => message,
            IntakeError::NotConfigured | IntakeError::Transport(_) => GENERIC_FAILURE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Default text for a non-2xx status.
fn status_message(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "Please check your information and try again.",
        429 => "Too many requests. Please wait a moment and try again.",
        500 => "Our server is experiencing issues. Please try again later.",
        _ => "Sorry, there was an error submitting your request.",
    }
}

/// A non-empty `message` field in a JSON error body replaces the default.
fn rejection_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status_message(status).to_string())
}

/// Posts intake forms to `api.base_url`. Cheap to clone.
#[derive(Clone)]
pub struct IntakeClient {
    client: Client,
    config: Arc<ConfigResolver>,
}

impl IntakeClient {
    pub fn new(config: Arc<ConfigResolver>) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: Arc<ConfigResolver>, client: Client) -> Self {
        Self { client, config }
    }

    /// Send a validated form. `api.timeout` (milliseconds), when configured,
    /// bounds the request.
    pub async fn submit(&self, form: &IntakeForm) -> Result<(), IntakeError> {
        let url = self
            .config
            .get_str("api.base_url")
            .ok_or(IntakeError::NotConfigured)?;

        debug!(%url, evaluation_type = %form.evaluation_type, "submitting intake form");
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(form)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "intake request payload");
        }

        let mut req = self.client.post(&url).json(form);
        if let Some(ms) = self.config.get_number("api.timeout").filter(|ms| ms.is_finite() && *ms > 0.0) {
            req = req.timeout(Duration::from_millis(ms as u64));
        }

        let response = req.send().await.map_err(|e| {
            error!(%url, error = %e, "intake request failed (transport)");
            IntakeError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        trace!(%status, body = %body, "intake response");

        if status.is_success() {
            info!(%status, "intake form accepted");
            return Ok(());
        }

        let message = rejection_message(status, &body);
        error!(%status, %message, "intake form rejected");
        Err(IntakeError::Rejected { status, message })
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::routing::post;
    use reqwest::Url;
    use serde_json::{Value, json};

    use super::*;
    use crate::env::EnvSnapshot;
    use crate::test_support::{client, loaded_resolver, serve};

    fn form() -> IntakeForm {
        IntakeForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            number: "555-123-4567".into(),
            evaluation_type: "adhd".into(),
        }
    }

    /// A resolver whose config resource points the intake URL at `addr`.
    async fn resolver_for(addr: std::net::SocketAddr) -> Arc<ConfigResolver> {
        loaded_resolver(&format!("api:\n  base_url: \"http://{addr}/register\"\n  timeout: 5000\n")).await
    }

    #[test]
    fn valid_form_passes() {
        assert_eq!(form().validate(), Ok(()));
    }

    #[test]
    fn first_problem_wins() {
        let f = IntakeForm { first_name: String::new(), email: "bad".into(), ..form() };
        assert_eq!(f.validate(), Err(ValidationError::MissingField));

        let f = IntakeForm { email: "bad".into(), number: "12".into(), ..form() };
        assert_eq!(f.validate(), Err(ValidationError::InvalidEmail));

        let f = IntakeForm { number: "555-1234".into(), ..form() };
        assert_eq!(f.validate(), Err(ValidationError::InvalidPhone));
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@@b.de"));
    }

    #[test]
    fn form_serialises_camel_case() {
        let v = serde_json::to_value(form()).unwrap();
        assert_eq!(v["firstName"], "Ada");
        assert_eq!(v["evaluationType"], "adhd");
        assert_eq!(v["number"], "555-123-4567");
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(
            rejection_message(StatusCode::BAD_REQUEST, ""),
            "Please check your information and try again."
        );
        assert_eq!(
            rejection_message(StatusCode::TOO_MANY_REQUESTS, "not json"),
            "Too many requests. Please wait a moment and try again."
        );
        assert_eq!(
            rejection_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":""}"#),
            "Our server is experiencing issues. Please try again later."
        );
        assert_eq!(
            rejection_message(StatusCode::BAD_GATEWAY, r#"{"message":"Duplicate email"}"#),
            "Duplicate email"
        );
        assert_eq!(
            rejection_message(StatusCode::NOT_FOUND, "{}"),
            "Sorry, there was an error submitting your request."
        );
    }

    #[tokio::test]
    async fn submit_posts_json_body() {
        let router = Router::new().route(
            "/register",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["lastName"], "Lovelace");
                assert_eq!(body["email"], "ada@example.com");
                Json(json!({"ok": true}))
            }),
        );
        let addr = serve(router).await;
        let intake = IntakeClient::with_client(resolver_for(addr).await, client());

        intake.submit(&form()).await.unwrap();
    }

    #[tokio::test]
    async fn submit_maps_rejection() {
        let router = Router::new().route(
            "/register",
            post(|| async {
                (axum::http::StatusCode::BAD_REQUEST, Json(json!({"message": "Email already registered"})))
            }),
        );
        let addr = serve(router).await;
        let intake = IntakeClient::with_client(resolver_for(addr).await, client());

        let err = intake.submit(&form()).await.unwrap_err();
        assert!(matches!(err, IntakeError::Rejected { status, .. } if status == StatusCode::BAD_REQUEST));
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[tokio::test]
    async fn configured_timeout_bounds_the_request() {
        let router = Router::new().route(
            "/register",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"ok": true}))
            }),
        );
        let addr = serve(router).await;
        let config =
            loaded_resolver(&format!("api:\n  base_url: \"http://{addr}/register\"\n  timeout: 50\n")).await;
        let intake = IntakeClient::with_client(config, client());

        let err = intake.submit(&form()).await.unwrap_err();
        assert!(matches!(err, IntakeError::Transport(_)));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn submit_without_loaded_config_is_not_configured() {
        let page = Url::parse("http://localhost/").unwrap();
        let resolver = Arc::new(ConfigResolver::with_client(&page, EnvSnapshot::empty(), client()).unwrap());
        let intake = IntakeClient::with_client(resolver, client());

        let err = intake.submit(&form()).await.unwrap_err();
        assert!(matches!(err, IntakeError::NotConfigured));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }
}
