use thiserror::Error;

/// Credential creation failed at the identity provider. Carries the
/// provider-defined code (malformed email, weak password, email collision and
/// so on) alongside the message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct IdentityError {
    pub code: String,
    pub message: String,
}

impl IdentityError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Profile persistence failed after the credential was already created. The
/// credential is left in place; there is no compensating rollback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to write profile record: {message}")]
pub struct ProfileWriteError {
    pub message: String,
}

impl ProfileWriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Verification dispatch failed after both credential and profile record
/// exist. Non-critical: the user can request another verification later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to send verification email: {message}")]
pub struct VerificationSendError {
    pub message: String,
}

impl VerificationSendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure of the sign-up sequence, stored into the draft for display. All
/// variants surface through the same message region; the variant only matters
/// for the account-exists code rewrite applied to step-A failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignUpError {
    #[error("{0}")]
    Identity(#[from] IdentityError),
    #[error("{0}")]
    ProfileWrite(#[from] ProfileWriteError),
    #[error("{0}")]
    VerificationSend(#[from] VerificationSendError),
}

impl SignUpError {
    /// Provider code, when the failure came from credential creation.
    pub fn code(&self) -> Option<&str> {
        match self {
            SignUpError::Identity(err) => Some(&err.code),
            _ => None,
        }
    }
}
