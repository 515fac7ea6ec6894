use std::path::PathBuf;

use clap::Parser;
use crossbeam_channel::bounded;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use config::load_settings;
use controller::events::UiEvent;
use ui::app::SignUpApp;

/// Desktop sign-up form for the classroom service.
#[derive(Debug, Parser)]
#[command(name = "signup-desktop", version)]
struct Args {
    /// Path to the TOML settings file.
    #[arg(long, default_value = "signup.toml")]
    config: PathBuf,
    /// Identity provider base URL, overriding file and environment.
    #[arg(long)]
    auth_url: Option<String>,
    /// Profile record store base URL, overriding file and environment.
    #[arg(long)]
    profile_url: Option<String>,
    /// Identity provider API key, overriding file and environment.
    #[arg(long)]
    api_key: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(auth_url) = args.auth_url {
        settings.auth_url = auth_url;
    }
    if let Some(profile_url) = args.profile_url {
        settings.profile_url = profile_url;
    }
    if let Some(api_key) = args.api_key {
        settings.api_key = api_key;
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(32);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Sign Up")
            .with_inner_size([520.0, 640.0])
            .with_min_inner_size([420.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Sign Up",
        options,
        Box::new(|_cc| Ok(Box::new(SignUpApp::new(cmd_tx, ui_rx)))),
    )
}
