//! Sign-up form state and the three-step account-creation sequence.
//!
//! Two pieces collaborate here. [`SignUpController`] owns the mutable
//! [`Draft`], applies field edits, and decides whether a submission may start.
//! [`run_submission`] executes the fixed sequence of dependent identity calls
//! (create credential, write profile record, send verification) with early
//! exit on the first failure and no compensation of completed steps.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{Role, RoleSet, Uid, UserRecord},
    error::{ERROR_CODE_ACCOUNT_EXISTS, ERROR_MSG_ACCOUNT_EXISTS},
    routes,
};
use tracing::{info, warn};

pub mod error;

pub use error::{IdentityError, ProfileWriteError, SignUpError, VerificationSendError};

/// Opaque handle returned by credential creation, with the minted uid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialHandle {
    pub uid: Uid,
}

/// External identity provider: credential creation, the profile record store,
/// and verification dispatch. Each operation fails independently.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn create_credential(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CredentialHandle, IdentityError>;

    async fn write_user_record(
        &self,
        uid: &Uid,
        record: &UserRecord,
    ) -> Result<(), ProfileWriteError>;

    /// Sends a verification message for the most recently created credential.
    async fn send_verification(&self) -> Result<(), VerificationSendError>;
}

pub struct MissingIdentityService;

#[async_trait]
impl IdentityService for MissingIdentityService {
    async fn create_credential(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<CredentialHandle, IdentityError> {
        Err(IdentityError::new(
            "auth/internal-error",
            "identity backend is unavailable",
        ))
    }

    async fn write_user_record(
        &self,
        uid: &Uid,
        _record: &UserRecord,
    ) -> Result<(), ProfileWriteError> {
        Err(ProfileWriteError::new(format!(
            "identity backend is unavailable for uid {uid}"
        )))
    }

    async fn send_verification(&self) -> Result<(), VerificationSendError> {
        Err(VerificationSendError::new(
            "identity backend is unavailable",
        ))
    }
}

/// Navigation collaborator, invoked fire-and-forget with the home route after
/// a fully successful submission.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, route: &str);
}

pub struct MissingNavigator;

impl Navigator for MissingNavigator {
    fn navigate_to(&self, route: &str) {
        warn!(route, "navigation requested but no navigator is attached");
    }
}

/// Text fields of the draft, addressed by name for single-field edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Username,
    Email,
    PasswordPrimary,
    PasswordConfirm,
}

/// The in-progress form state.
///
/// `submitting` is true strictly between submission start and the end of the
/// three-call sequence, and is cleared on every exit path. `error` is set only
/// by a failed submission and overwritten by the next failure; `submitting`
/// and "has error" are independent bits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub username: String,
    pub email: String,
    pub password_primary: String,
    pub password_confirm: String,
    pub role_admin: bool,
    pub role_teacher: bool,
    pub role_student: bool,
    pub error: Option<SignUpError>,
    pub submitting: bool,
}

impl Draft {
    /// True iff both passwords match and username, email and the primary
    /// password are non-empty. Pure predicate; gates submission both at the
    /// control and inside [`SignUpController::submit`].
    pub fn is_eligible(&self) -> bool {
        self.password_primary == self.password_confirm
            && !self.password_primary.is_empty()
            && !self.email.is_empty()
            && !self.username.is_empty()
    }

    /// Collapses the three role flags into the sparse set persisted with the
    /// profile record.
    pub fn role_set(&self) -> RoleSet {
        RoleSet::from_flags(self.role_admin, self.role_teacher, self.role_student)
    }
}

/// Result of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// All three steps succeeded; the draft was reset and navigation to the
    /// home route signaled.
    Completed,
    /// A step failed; the failure is stored in the draft, entered fields kept.
    Failed,
    /// Guard rejected the attempt: ineligible draft, or a submission already
    /// in flight. No identity call was made.
    Rejected,
}

/// Owns the draft and mediates edits and submission. Performs no I/O itself;
/// the identity calls go through the injected [`IdentityService`].
pub struct SignUpController {
    pub draft: Draft,
    identity: Arc<dyn IdentityService>,
    navigator: Arc<dyn Navigator>,
}

impl SignUpController {
    pub fn new(identity: Arc<dyn IdentityService>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            draft: Draft::default(),
            identity,
            navigator,
        }
    }

    /// Controller with no backend attached; every submission fails. Useful as
    /// a placeholder while the real service is being constructed.
    pub fn detached() -> Self {
        Self::new(Arc::new(MissingIdentityService), Arc::new(MissingNavigator))
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Replaces exactly one text field. No validation happens here; that is
    /// deferred to the eligibility predicate.
    pub fn set_field(&mut self, field: TextField, value: impl Into<String>) {
        let value = value.into();
        match field {
            TextField::Username => self.draft.username = value,
            TextField::Email => self.draft.email = value,
            TextField::PasswordPrimary => self.draft.password_primary = value,
            TextField::PasswordConfirm => self.draft.password_confirm = value,
        }
    }

    /// Flips one of the three independent role flags.
    pub fn toggle_role(&mut self, role: Role) {
        let flag = match role {
            Role::Admin => &mut self.draft.role_admin,
            Role::Teacher => &mut self.draft.role_teacher,
            Role::Student => &mut self.draft.role_student,
        };
        *flag = !*flag;
    }

    pub fn is_eligible(&self) -> bool {
        self.draft.is_eligible()
    }

    /// Restores the initial draft. Idempotent.
    pub fn reset(&mut self) {
        self.draft = Draft::default();
    }

    /// Runs the account-creation sequence for the current draft.
    ///
    /// A draft that fails the eligibility predicate, or a submission already
    /// in flight, is rejected without touching the identity service. The
    /// `submitting` flag is raised synchronously before the first await and
    /// lowered on every exit path.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.draft.submitting {
            warn!("sign-up submit ignored: a submission is already in flight");
            return SubmitOutcome::Rejected;
        }
        if !self.draft.is_eligible() {
            warn!("sign-up submit ignored: draft is not eligible");
            return SubmitOutcome::Rejected;
        }

        self.draft.submitting = true;

        let result = run_submission(self.identity.as_ref(), &self.draft).await;

        let outcome = match result {
            Ok(()) => {
                info!(route = routes::HOME, "sign-up sequence completed");
                self.draft = Draft::default();
                self.navigator.navigate_to(routes::HOME);
                SubmitOutcome::Completed
            }
            Err(err) => {
                warn!(error = %err, "sign-up sequence failed");
                self.draft.error = Some(err);
                SubmitOutcome::Failed
            }
        };

        // Unconditional; success, failure and the reset path all end here.
        self.draft.submitting = false;
        outcome
    }
}

/// Executes the three dependent identity calls strictly in order with early
/// exit on the first failure: create credential, write the profile record
/// keyed by the minted uid, send the verification message.
///
/// Completed steps are never compensated. A credential created in step A
/// survives a failed profile write, and a failed verification send leaves
/// both credential and record in place.
pub async fn run_submission(
    identity: &dyn IdentityService,
    draft: &Draft,
) -> Result<(), SignUpError> {
    let roles = draft.role_set();

    let handle = identity
        .create_credential(&draft.email, &draft.password_primary)
        .await
        .map_err(rewrite_account_exists)?;
    info!(uid = %handle.uid, "credential created");

    let record = UserRecord {
        username: draft.username.clone(),
        email: draft.email.clone(),
        roles,
    };
    identity.write_user_record(&handle.uid, &record).await?;
    info!(uid = %handle.uid, "profile record written");

    identity.send_verification().await?;
    info!(uid = %handle.uid, "verification email requested");

    Ok(())
}

/// Step-A failures carrying the account-exists code get a fixed explanatory
/// message in place of the raw provider text; everything else passes through.
fn rewrite_account_exists(err: IdentityError) -> SignUpError {
    if err.code == ERROR_CODE_ACCOUNT_EXISTS {
        SignUpError::Identity(IdentityError::new(err.code, ERROR_MSG_ACCOUNT_EXISTS))
    } else {
        SignUpError::Identity(err)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
