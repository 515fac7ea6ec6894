use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use shared::{domain::Role, routes};
use signup_core::Draft;

/// Which screen the shell is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    SignUp,
    Home,
}

/// The eframe application: owns the live draft the user is editing, drains
/// backend events each frame, and forwards submissions to the worker thread.
pub struct SignUpApp {
    draft: Draft,
    screen: Screen,
    status: Option<String>,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
}

impl SignUpApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            draft: Draft::default(),
            screen: Screen::SignUp,
            status: None,
            cmd_tx,
            ui_rx,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::SignUpFinished { outcome, draft } => {
                    tracing::debug!(?outcome, "sign-up finished");
                    // The worker's draft snapshot carries the post-submission
                    // state: reset on success, error plus kept fields on
                    // failure. Either way it replaces what the user sees.
                    self.draft = draft;
                }
                UiEvent::NavigateTo(route) => {
                    if route == routes::HOME {
                        self.screen = Screen::Home;
                    } else {
                        tracing::warn!(route, "unknown navigation target ignored");
                    }
                }
                UiEvent::BackendStartupFailed(reason) => {
                    self.status = Some(format!("Backend unavailable: {reason}"));
                    self.draft.submitting = false;
                }
            }
        }
    }

    fn submit_sign_up(&mut self) {
        if self.draft.submitting || !self.draft.is_eligible() {
            return;
        }
        self.draft.submitting = true;
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::SubmitSignUp {
                draft: self.draft.clone(),
            },
            &mut self.status,
        );
        if !queued {
            self.draft.submitting = false;
        }
    }

    fn show_sign_up(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading("Sign Up");
            ui.add_space(12.0);

            let form_width = (ui.available_width() - 64.0).clamp(240.0, 360.0);
            ui.allocate_ui(egui::vec2(form_width, ui.available_height()), |ui| {
                let submitting = self.draft.submitting;
                ui.add_enabled_ui(!submitting, |ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.draft.username)
                            .hint_text("Full Name")
                            .desired_width(f32::INFINITY),
                    );
                    ui.add_space(6.0);
                    ui.add(
                        egui::TextEdit::singleline(&mut self.draft.email)
                            .hint_text("Email Address")
                            .desired_width(f32::INFINITY),
                    );
                    ui.add_space(6.0);
                    ui.add(
                        egui::TextEdit::singleline(&mut self.draft.password_primary)
                            .hint_text("Password")
                            .password(true)
                            .desired_width(f32::INFINITY),
                    );
                    ui.add_space(6.0);
                    ui.add(
                        egui::TextEdit::singleline(&mut self.draft.password_confirm)
                            .hint_text("Confirm Password")
                            .password(true)
                            .desired_width(f32::INFINITY),
                    );

                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        ui.checkbox(&mut self.draft.role_admin, Role::Admin.name());
                        ui.checkbox(&mut self.draft.role_teacher, Role::Teacher.name());
                        ui.checkbox(&mut self.draft.role_student, Role::Student.name());
                    });
                });

                ui.add_space(12.0);
                let can_submit = !submitting && self.draft.is_eligible();
                let label = if submitting { "Signing up..." } else { "Sign Up" };
                let btn = egui::Button::new(egui::RichText::new(label).strong())
                    .min_size(egui::vec2(ui.available_width(), 36.0));
                if ui.add_enabled(can_submit, btn).clicked() {
                    self.submit_sign_up();
                }

                if submitting {
                    ui.add_space(8.0);
                    ui.spinner();
                }

                if let Some(err) = &self.draft.error {
                    ui.add_space(10.0);
                    ui.colored_label(egui::Color32::LIGHT_RED, err.to_string());
                }
                if let Some(status) = &self.status {
                    ui.add_space(10.0);
                    ui.colored_label(egui::Color32::YELLOW, status);
                }
            });
        });
    }

    fn show_home(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.heading("Home");
            ui.add_space(12.0);
            ui.label("Your account was created. Check your inbox for the verification email.");
        });
    }
}

impl eframe::App for SignUpApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::SignUp => self.show_sign_up(ui),
            Screen::Home => self.show_home(ui),
        });

        // Backend events arrive on a plain channel; poll for them.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use signup_core::SubmitOutcome;

    fn app_with_channels() -> (
        SignUpApp,
        Receiver<BackendCommand>,
        Sender<UiEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(4);
        let (ui_tx, ui_rx) = bounded(4);
        (SignUpApp::new(cmd_tx, ui_rx), cmd_rx, ui_tx)
    }

    fn eligible_draft() -> Draft {
        Draft {
            username: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password_primary: "secret1".to_string(),
            password_confirm: "secret1".to_string(),
            ..Draft::default()
        }
    }

    #[test]
    fn ineligible_draft_queues_nothing() {
        let (mut app, cmd_rx, _ui_tx) = app_with_channels();
        app.draft.username = "Ann".to_string();

        app.submit_sign_up();

        assert!(!app.draft.submitting);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn eligible_draft_queues_one_command_and_raises_the_flag() {
        let (mut app, cmd_rx, _ui_tx) = app_with_channels();
        app.draft = eligible_draft();

        app.submit_sign_up();

        assert!(app.draft.submitting);
        let BackendCommand::SubmitSignUp { draft } = cmd_rx.try_recv().unwrap();
        assert_eq!(draft.email, "ann@example.com");
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn resubmit_while_in_flight_is_ignored() {
        let (mut app, cmd_rx, _ui_tx) = app_with_channels();
        app.draft = eligible_draft();

        app.submit_sign_up();
        app.submit_sign_up();

        assert!(cmd_rx.try_recv().is_ok());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn finished_event_replaces_the_draft_and_home_navigation_switches_screens() {
        let (mut app, _cmd_rx, ui_tx) = app_with_channels();
        app.draft = eligible_draft();
        app.draft.submitting = true;

        ui_tx
            .send(UiEvent::SignUpFinished {
                outcome: SubmitOutcome::Completed,
                draft: Draft::default(),
            })
            .unwrap();
        ui_tx
            .send(UiEvent::NavigateTo(routes::HOME.to_string()))
            .unwrap();
        app.process_ui_events();

        assert_eq!(app.draft, Draft::default());
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn startup_failure_surfaces_a_status_and_lowers_the_flag() {
        let (mut app, _cmd_rx, ui_tx) = app_with_channels();
        app.draft.submitting = true;

        ui_tx
            .send(UiEvent::BackendStartupFailed("no runtime".to_string()))
            .unwrap();
        app.process_ui_events();

        assert!(!app.draft.submitting);
        assert!(app.status.as_deref().unwrap().contains("no runtime"));
    }
}
