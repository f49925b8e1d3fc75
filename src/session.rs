//! The "request a demo" modal: phone entry, verification and submission.
//!
//! `DemoSession` holds what the page would keep in its form controls and
//! reports outcomes as [`Notice`]s plus the state of the two buttons. Every
//! failure path ends with the buttons usable again; the only control that
//! stays disabled is the verify button once the number is verified.
//!
//! [`ContactForm`] is the page's plain "send us a message" form, which has no
//! verification or backend of its own.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ConfigResolver;
use crate::intake::{IntakeClient, IntakeForm, SUCCESS_MESSAGE};
use crate::phone;
use crate::verification::{VerificationClient, VerificationState};

pub const VERIFY_LABEL: &str = "Verify";
pub const VERIFIED_LABEL: &str = "Verified ✓";
pub const SENDING_LABEL: &str = "Sending...";
pub const SUBMIT_LABEL: &str = "Submit";
pub const SUBMITTING_LABEL: &str = "Submitting...";

const INVALID_PHONE: &str = "Please enter a valid 10-digit phone number.";
const CODE_SENT: &str =
    "A 6-digit verification code has been sent to your phone. Please check your messages.";
const SEND_FAILED: &str =
    "Sorry, there was an error sending the verification code. Please try again.";
const VERIFIED: &str = "Phone number verified successfully!";
const INCORRECT_CODE: &str = "Incorrect code. Please try again.";
const VERIFY_FIRST: &str = "Please verify your phone number before submitting the form.";
pub const CONTACT_THANKS: &str = "Thank you for your message! Our team will contact you soon.";

/// A dismissable message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    fn info(text: &str) -> Self {
        Notice::Info(text.to_string())
    }

    fn error(text: impl Into<String>) -> Self {
        Notice::Error(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Info(t) | Notice::Error(t) => t,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub label: String,
    pub enabled: bool,
}

impl ButtonState {
    fn ready(label: &str) -> Self {
        Self { label: label.to_string(), enabled: true }
    }

    fn busy(label: &str) -> Self {
        Self { label: label.to_string(), enabled: false }
    }
}

pub struct DemoSession {
    intake: IntakeClient,
    verifier: VerificationClient,
    open: bool,
    phone: String,
    code: String,
    state: VerificationState,
    verify_button: ButtonState,
    submit_button: ButtonState,
}

impl DemoSession {
    pub fn new(config: Arc<ConfigResolver>) -> Self {
        Self::with_clients(
            IntakeClient::new(Arc::clone(&config)),
            VerificationClient::new(config),
        )
    }

    pub fn with_clients(intake: IntakeClient, verifier: VerificationClient) -> Self {
        Self {
            intake,
            verifier,
            open: false,
            phone: String::new(),
            code: String::new(),
            state: VerificationState::Unverified,
            verify_button: ButtonState::ready(VERIFY_LABEL),
            submit_button: ButtonState::ready(SUBMIT_LABEL),
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Formatted phone field value.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> VerificationState {
        self.state
    }

    /// Whether the code entry field is showing.
    pub fn shows_code_entry(&self) -> bool {
        self.state.awaiting_code()
    }

    pub fn verify_button(&self) -> &ButtonState {
        &self.verify_button
    }

    pub fn submit_button(&self) -> &ButtonState {
        &self.submit_button
    }

    /// The user typed in the phone field. Returns the reformatted value.
    ///
    /// Any edit throws away verification progress for the previous number.
    pub fn edit_phone(&mut self, raw: &str) -> &str {
        self.phone = phone::format_phone(raw);
        if self.state != VerificationState::Unverified {
            debug!(from = ?self.state, "phone edited; verification reset");
            self.reset_verification();
        }
        &self.phone
    }

    /// Verify button pressed. `None` when the button is disabled.
    pub async fn request_code(&mut self) -> Option<Notice> {
        if !self.verify_button.enabled {
            return None;
        }
        if !phone::is_complete_phone(&self.phone) {
            return Some(Notice::error(INVALID_PHONE));
        }

        let restore = std::mem::replace(&mut self.verify_button, ButtonState::busy(SENDING_LABEL));
        let result = self.verifier.send_code(&self.phone).await;
        self.verify_button = restore;

        Some(match result {
            Ok(()) => {
                self.state = self.state.code_sent();
                self.code.clear();
                Notice::info(CODE_SENT)
            }
            Err(e) => {
                warn!(error = %e, "sending verification code failed");
                Notice::error(SEND_FAILED)
            }
        })
    }

    /// The user typed in the code field. Checks the code once six digits are
    /// present; `None` until then, or when no code has been sent.
    pub async fn enter_code(&mut self, raw: &str) -> Option<Notice> {
        if !self.state.awaiting_code() {
            return None;
        }
        self.code = phone::sanitize_code(raw);
        if !phone::is_complete_code(&self.code) {
            return None;
        }

        match self.verifier.verify_code(&self.phone, &self.code).await {
            Ok(true) => {
                self.state = self.state.confirmed();
                self.verify_button = ButtonState::busy(VERIFIED_LABEL);
                info!("phone number verified");
                Some(Notice::info(VERIFIED))
            }
            Ok(false) => {
                self.state = self.state.rejected();
                self.code.clear();
                Some(Notice::error(INCORRECT_CODE))
            }
            Err(e) => {
                warn!(error = %e, "verifying code failed");
                self.state = self.state.rejected();
                self.code.clear();
                Some(Notice::error(INCORRECT_CODE))
            }
        }
    }

    /// Submit the form. The phone number always comes from the session's
    /// own phone field, whatever `details.number` holds.
    pub async fn submit(&mut self, details: IntakeForm) -> Notice {
        if !self.state.is_verified() {
            return Notice::error(VERIFY_FIRST);
        }

        let form = IntakeForm { number: self.phone.clone(), ..details };
        if let Err(e) = form.validate() {
            return Notice::error(e.to_string());
        }

        let restore = std::mem::replace(&mut self.submit_button, ButtonState::busy(SUBMITTING_LABEL));
        let result = self.intake.submit(&form).await;
        self.submit_button = restore;

        match result {
            Ok(()) => {
                self.phone.clear();
                self.reset_verification();
                self.close();
                Notice::info(SUCCESS_MESSAGE)
            }
            Err(e) => Notice::error(e.user_message()),
        }
    }

    fn reset_verification(&mut self) {
        self.state = self.state.reset();
        self.code.clear();
        self.verify_button = ButtonState::ready(VERIFY_LABEL);
    }
}

/// The general contact form. Submitting only acknowledges and clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn submit(&mut self) -> Notice {
        debug!(has_message = !self.message.is_empty(), "contact form submitted");
        *self = ContactForm::default();
        Notice::info(CONTACT_THANKS)
    }
}
