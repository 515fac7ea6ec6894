//! Command orchestration helpers from UI actions to the backend queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Returns whether the command was
/// accepted; when it was not, a user-facing status message is left behind.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut Option<String>,
) -> bool {
    let cmd_name = match &cmd {
        BackendCommand::SubmitSignUp { .. } => "submit_sign_up",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = Some("Backend command queue is full; please retry".to_string());
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = Some(
                "Backend worker disconnected (possible startup failure); restart the app"
                    .to_string(),
            );
            false
        }
    }
}
