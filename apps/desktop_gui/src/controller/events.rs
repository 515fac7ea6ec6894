//! Events flowing from the backend worker to the UI thread.

use signup_core::{Draft, SubmitOutcome};

pub enum UiEvent {
    /// The submission sequence ended. The draft snapshot carries the folded
    /// outcome: reset to initial on success, stored error on failure, and the
    /// submitting flag lowered either way.
    SignUpFinished {
        outcome: SubmitOutcome,
        draft: Draft,
    },
    /// Fire-and-forget navigation signal raised after a full success.
    NavigateTo(String),
    /// The worker could not start; sign-up stays unavailable.
    BackendStartupFailed(String),
}
