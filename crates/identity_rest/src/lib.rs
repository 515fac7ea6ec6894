//! REST client for the identity provider.
//!
//! Implements [`IdentityService`] against a provider exposing a credential
//! sign-up endpoint, an out-of-band verification dispatch endpoint, and a
//! JSON profile record store. Provider failure payloads are mapped into the
//! `auth/*` code vocabulary the sign-up core understands.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Uid, UserRecord},
    error::{ERROR_CODE_ACCOUNT_EXISTS, ERROR_CODE_INVALID_EMAIL, ERROR_CODE_WEAK_PASSWORD},
};
use signup_core::{
    CredentialHandle, IdentityError, IdentityService, ProfileWriteError, VerificationSendError,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

const SIGN_UP_ENDPOINT: &str = "v1/accounts:signUp";
const SEND_OOB_CODE_ENDPOINT: &str = "v1/accounts:sendOobCode";
const VERIFY_EMAIL_REQUEST_TYPE: &str = "VERIFY_EMAIL";

/// Client holding the provider endpoints and, once a credential has been
/// created, the session token addressed by `send_verification`.
pub struct RestIdentityClient {
    http: Client,
    auth_url: Url,
    profile_url: Url,
    api_key: String,
    // Token minted with the last created credential; verification dispatch
    // is implicit on "the current credential" in the provider contract.
    current_token: Mutex<Option<String>>,
}

impl RestIdentityClient {
    pub fn new(
        auth_url: impl AsRef<str>,
        profile_url: impl AsRef<str>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let auth_url = Url::parse(auth_url.as_ref())
            .with_context(|| format!("invalid identity auth url '{}'", auth_url.as_ref()))?;
        let profile_url = Url::parse(profile_url.as_ref())
            .with_context(|| format!("invalid profile store url '{}'", profile_url.as_ref()))?;
        Ok(Self {
            http: Client::new(),
            auth_url,
            profile_url,
            api_key: api_key.into(),
            current_token: Mutex::new(None),
        })
    }

    fn auth_endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let mut url = self.auth_url.join(path)?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn record_endpoint(&self, uid: &Uid, token: Option<&str>) -> Result<Url, url::ParseError> {
        let mut url = self.profile_url.join(&format!("users/{uid}.json"))?;
        if let Some(token) = token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    id_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOobCodeRequest<'a> {
    request_type: &'a str,
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Maps a raw provider failure message (e.g. `EMAIL_EXISTS`,
/// `WEAK_PASSWORD : ...`) to the `auth/*` code vocabulary. Unknown messages
/// are lowercased into the same namespace so they stay distinguishable.
fn provider_code(raw: &str) -> String {
    let head = raw.split(&[' ', ':'][..]).next().unwrap_or(raw);
    match head {
        "EMAIL_EXISTS" => ERROR_CODE_ACCOUNT_EXISTS.to_string(),
        "INVALID_EMAIL" => ERROR_CODE_INVALID_EMAIL.to_string(),
        "WEAK_PASSWORD" => ERROR_CODE_WEAK_PASSWORD.to_string(),
        other => format!("auth/{}", other.to_ascii_lowercase().replace('_', "-")),
    }
}

async fn provider_failure(response: reqwest::Response) -> IdentityError {
    let status = response.status();
    match response.json::<ProviderErrorBody>().await {
        Ok(body) => IdentityError::new(provider_code(&body.error.message), body.error.message),
        Err(err) => {
            warn!(%status, "identity provider returned an unreadable error body: {err}");
            IdentityError::new(
                "auth/internal-error",
                format!("identity provider responded with status {status}"),
            )
        }
    }
}

#[async_trait]
impl IdentityService for RestIdentityClient {
    async fn create_credential(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CredentialHandle, IdentityError> {
        let url = self.auth_endpoint(SIGN_UP_ENDPOINT).map_err(|err| {
            IdentityError::new("auth/internal-error", format!("bad sign-up endpoint: {err}"))
        })?;

        let response = self
            .http
            .post(url)
            .json(&SignUpRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|err| IdentityError::new("auth/network-request-failed", err.to_string()))?;

        if !response.status().is_success() {
            return Err(provider_failure(response).await);
        }

        let body: SignUpResponse = response.json().await.map_err(|err| {
            IdentityError::new(
                "auth/internal-error",
                format!("malformed sign-up response: {err}"),
            )
        })?;

        debug!(uid = %body.local_id, "identity provider minted credential");
        *self.current_token.lock().await = Some(body.id_token);
        Ok(CredentialHandle {
            uid: Uid(body.local_id),
        })
    }

    async fn write_user_record(
        &self,
        uid: &Uid,
        record: &UserRecord,
    ) -> Result<(), ProfileWriteError> {
        let token = self.current_token.lock().await.clone();
        let url = self
            .record_endpoint(uid, token.as_deref())
            .map_err(|err| ProfileWriteError::new(format!("bad record endpoint: {err}")))?;

        let response = self
            .http
            .put(url)
            .json(record)
            .send()
            .await
            .map_err(|err| ProfileWriteError::new(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProfileWriteError::new(format!(
                "profile store responded with status {status}: {detail}"
            )));
        }

        debug!(%uid, "profile record written");
        Ok(())
    }

    async fn send_verification(&self) -> Result<(), VerificationSendError> {
        let token = self.current_token.lock().await.clone().ok_or_else(|| {
            VerificationSendError::new("no credential in session to verify")
        })?;

        let url = self.auth_endpoint(SEND_OOB_CODE_ENDPOINT).map_err(|err| {
            VerificationSendError::new(format!("bad verification endpoint: {err}"))
        })?;

        let response = self
            .http
            .post(url)
            .json(&SendOobCodeRequest {
                request_type: VERIFY_EMAIL_REQUEST_TYPE,
                id_token: &token,
            })
            .send()
            .await
            .map_err(|err| VerificationSendError::new(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerificationSendError::new(format!(
                "verification dispatch responded with status {status}"
            )));
        }

        debug!("verification email requested");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
