//! Runtime bridge between the UI command queue and the sign-up backend.
//!
//! A dedicated thread owns a tokio runtime, the REST identity client and the
//! sign-up controller, and processes commands strictly one at a time, so at
//! most one submission sequence is ever in flight.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use identity_rest::RestIdentityClient;
use signup_core::{Navigator, SignUpController};
use tracing::{error, info};

use crate::{
    backend_bridge::commands::BackendCommand, config::Settings, controller::events::UiEvent,
};

/// Navigator that forwards the fire-and-forget navigation signal to the UI
/// thread.
struct ChannelNavigator {
    ui_tx: Sender<UiEvent>,
}

impl Navigator for ChannelNavigator {
    fn navigate_to(&self, route: &str) {
        let _ = self.ui_tx.try_send(UiEvent::NavigateTo(route.to_string()));
    }
}

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || run_worker(settings, cmd_rx, ui_tx));
}

fn run_worker(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to build backend runtime: {err}");
            let _ = ui_tx.try_send(UiEvent::BackendStartupFailed(format!(
                "failed to build backend runtime: {err}"
            )));
            return;
        }
    };

    let identity = match RestIdentityClient::new(
        &settings.auth_url,
        &settings.profile_url,
        settings.api_key.clone(),
    ) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!("failed to build identity client: {err:#}");
            let _ = ui_tx.try_send(UiEvent::BackendStartupFailed(format!(
                "failed to build identity client: {err:#}"
            )));
            return;
        }
    };

    let navigator = Arc::new(ChannelNavigator {
        ui_tx: ui_tx.clone(),
    });
    let mut controller = SignUpController::new(identity, navigator);
    info!(auth_url = %settings.auth_url, "sign-up backend worker ready");

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::SubmitSignUp { draft } => {
                controller.draft = draft;
                // The UI raises its own submitting flag for display; the
                // worker's sequence starts fresh.
                controller.draft.submitting = false;
                let outcome = runtime.block_on(controller.submit());
                let _ = ui_tx.try_send(UiEvent::SignUpFinished {
                    outcome,
                    draft: controller.draft.clone(),
                });
            }
        }
    }

    info!("sign-up backend worker stopped");
}
