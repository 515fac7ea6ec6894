//! UI layer for the desktop sign-up form: app shell and screens.

pub mod app;

pub use app::SignUpApp;
