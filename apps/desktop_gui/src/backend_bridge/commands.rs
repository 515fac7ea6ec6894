//! Backend commands queued from UI to the backend worker.

use signup_core::Draft;

pub enum BackendCommand {
    /// Runs the three-step sign-up sequence for a snapshot of the form draft.
    SubmitSignUp { draft: Draft },
}
