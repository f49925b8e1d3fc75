//! Phone verification: the per-form state machine and the client for the
//! external verification API.
//!
//! The handshake is two POSTs against `twilio.verification_api_url`: one to
//! send a six-digit code by SMS, one (to the sibling `/verify-code` path) to
//! check what the user typed.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::ConfigResolver;
use crate::phone::{self, COUNTRY_CODE};

const SEND_PATH: &str = "/send-verification";
const VERIFY_PATH: &str = "/verify-code";

// ── State machine ─────────────────────────────────────────────────────────────

/// Where a form's phone number stands in the handshake.
///
/// Only [`Verified`](Self::Verified) makes the form eligible for submission.
/// Any edit to the phone number goes back to [`Unverified`](Self::Unverified).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerificationState {
    #[default]
    Unverified,
    /// A code was sent and the code entry field is showing.
    CodeSent,
    Verified,
}

impl VerificationState {
    /// The service accepted a send request. Re-sending is allowed.
    pub fn code_sent(self) -> Self {
        VerificationState::CodeSent
    }

    /// The service confirmed the code. Only meaningful after a send.
    pub fn confirmed(self) -> Self {
        match self {
            VerificationState::CodeSent => VerificationState::Verified,
            other => other,
        }
    }

    /// The service refused the code. The handshake stays where it was, so
    /// after a send the code entry remains open for another attempt.
    pub fn rejected(self) -> Self {
        self
    }

    pub fn reset(self) -> Self {
        VerificationState::Unverified
    }

    pub fn is_verified(self) -> bool {
        self == VerificationState::Verified
    }

    pub fn awaiting_code(self) -> bool {
        self == VerificationState::CodeSent
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("verification endpoint not configured (twilio.verification_api_url)")]
    NotConfigured,
    #[error("phone number must have {} digits", phone::PHONE_DIGITS)]
    InvalidPhone,
    #[error("verification request failed: {0}")]
    Transport(String),
    #[error("verification service returned HTTP {0}")]
    Rejected(StatusCode),
    #[error("unreadable verification response: {0}")]
    Body(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendCodeRequest<'a> {
    phone_number: &'a str,
    country_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCodeRequest<'a> {
    phone_number: &'a str,
    code: &'a str,
    country_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyCodeResponse {
    #[serde(default)]
    verified: bool,
}

/// The check endpoint sits next to the send endpoint.
pub fn verify_url(send_url: &str) -> String {
    send_url.replacen(SEND_PATH, VERIFY_PATH, 1)
}

#[derive(Clone)]
pub struct VerificationClient {
    client: Client,
    config: Arc<ConfigResolver>,
}

impl VerificationClient {
    pub fn new(config: Arc<ConfigResolver>) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: Arc<ConfigResolver>, client: Client) -> Self {
        Self { client, config }
    }

    fn send_url(&self) -> Result<String, VerificationError> {
        self.config
            .get_str("twilio.verification_api_url")
            .ok_or(VerificationError::NotConfigured)
    }

    /// Ask the service to text a code to `phone` (any punctuation allowed).
    pub async fn send_code(&self, phone: &str) -> Result<(), VerificationError> {
        let number = ten_digits(phone)?;
        let url = self.send_url()?;
        debug!(%url, "sending verification code");

        let body = SendCodeRequest { phone_number: &number, country_code: COUNTRY_CODE };
        let response = self.post(&url, &body).await?;
        let status = response.status();
        // Any JSON document acknowledges the send.
        response.json::<serde_json::Value>().await.map_err(|e| {
            error!(error = %e, "verification service acknowledged without a JSON body");
            VerificationError::Body(e.to_string())
        })?;
        info!(%status, "verification code sent");
        Ok(())
    }

    /// Check `code` for `phone`. `Ok(false)` means the service answered but
    /// did not accept the code.
    pub async fn verify_code(&self, phone: &str, code: &str) -> Result<bool, VerificationError> {
        let number = ten_digits(phone)?;
        let url = verify_url(&self.send_url()?);
        debug!(%url, "verifying code");

        let body = VerifyCodeRequest { phone_number: &number, code, country_code: COUNTRY_CODE };
        let response = self.post(&url, &body).await?;
        let parsed = response.json::<VerifyCodeResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize verification response");
            VerificationError::Body(e.to_string())
        })?;

        info!(verified = parsed.verified, "verification answered");
        Ok(parsed.verified)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response, VerificationError> {
        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            error!(%url, error = %e, "verification request failed (transport)");
            VerificationError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(%url, %status, "verification request rejected");
            return Err(VerificationError::Rejected(status));
        }
        Ok(response)
    }
}

fn ten_digits(phone: &str) -> Result<String, VerificationError> {
    let number = phone::digits(phone);
    if number.len() != phone::PHONE_DIGITS {
        return Err(VerificationError::InvalidPhone);
    }
    Ok(number)
}
