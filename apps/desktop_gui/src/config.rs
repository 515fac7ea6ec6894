//! Settings for the sign-up desktop app: identity provider endpoints and the
//! API key, loaded from a TOML file and overridable via environment.

use std::{env, fs, path::Path};

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auth_url: String,
    pub profile_url: String,
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auth_url: "http://127.0.0.1:9099/".into(),
            profile_url: "http://127.0.0.1:9000/".into(),
            api_key: "dev-api-key".into(),
        }
    }
}

/// Missing keys in the file keep their defaults; an unreadable or invalid
/// file falls back to defaults entirely.
pub fn parse_settings(raw: &str) -> Settings {
    toml::from_str(raw).unwrap_or_else(|err| {
        tracing::warn!("invalid settings file, using defaults: {err}");
        Settings::default()
    })
}

pub fn load_settings(path: &Path) -> Settings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw),
        Err(_) => Settings::default(),
    };

    if let Ok(v) = env::var("SIGNUP_AUTH_URL") {
        settings.auth_url = v;
    }
    if let Ok(v) = env::var("APP__AUTH_URL") {
        settings.auth_url = v;
    }

    if let Ok(v) = env::var("SIGNUP_PROFILE_URL") {
        settings.profile_url = v;
    }
    if let Ok(v) = env::var("APP__PROFILE_URL") {
        settings.profile_url = v;
    }

    if let Ok(v) = env::var("SIGNUP_API_KEY") {
        settings.api_key = v;
    }
    if let Ok(v) = env::var("APP__API_KEY") {
        settings.api_key = v;
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
