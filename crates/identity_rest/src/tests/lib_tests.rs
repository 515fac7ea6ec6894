use super::*;
use std::sync::{Arc, Mutex as StdMutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{Role, RoleSet};
use signup_core::{Navigator, SignUpController, SubmitOutcome, TextField};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockProvider {
    fail_sign_up_with: Arc<StdMutex<Option<&'static str>>>,
    sign_ups: Arc<StdMutex<Vec<Value>>>,
    oob_requests: Arc<StdMutex<Vec<Value>>>,
    records: Arc<StdMutex<Vec<(String, Value)>>>,
}

async fn auth_dispatch(
    Path(action): Path<String>,
    State(state): State<MockProvider>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    match action.as_str() {
        "accounts:signUp" => {
            state.sign_ups.lock().expect("sign_ups lock").push(body);
            if let Some(message) = *state.fail_sign_up_with.lock().expect("failure lock") {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": { "code": 400, "message": message } })),
                );
            }
            (
                StatusCode::OK,
                Json(json!({
                    "localId": "uid-123",
                    "idToken": "tok-1",
                    "email": "ann@x.com",
                })),
            )
        }
        "accounts:sendOobCode" => {
            state.oob_requests.lock().expect("oob lock").push(body);
            (StatusCode::OK, Json(json!({ "email": "ann@x.com" })))
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

async fn put_record(
    Path(record): Path<String>,
    State(state): State<MockProvider>,
    Json(body): Json<Value>,
) -> StatusCode {
    state
        .records
        .lock()
        .expect("records lock")
        .push((record, body));
    StatusCode::OK
}

async fn start_mock(state: MockProvider) -> String {
    let app = Router::new()
        .route("/v1/*action", post(auth_dispatch))
        .route("/users/:record", put(put_record))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock provider");
    let addr = listener.local_addr().expect("mock provider addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock provider");
    });
    format!("http://{addr}/")
}

fn client_for(base: &str) -> RestIdentityClient {
    RestIdentityClient::new(base, base, "test-api-key").expect("build rest client")
}

#[tokio::test]
async fn create_credential_mints_uid_and_enables_verification() {
    let mock = MockProvider::default();
    let base = start_mock(mock.clone()).await;
    let client = client_for(&base);

    let handle = client
        .create_credential("ann@x.com", "secret1")
        .await
        .expect("create credential");
    assert_eq!(handle.uid, Uid("uid-123".into()));

    let sign_ups = mock.sign_ups.lock().expect("sign_ups lock").clone();
    assert_eq!(
        sign_ups,
        vec![json!({
            "email": "ann@x.com",
            "password": "secret1",
            "returnSecureToken": true,
        })]
    );

    client.send_verification().await.expect("send verification");
    let oob = mock.oob_requests.lock().expect("oob lock").clone();
    assert_eq!(
        oob,
        vec![json!({
            "requestType": "VERIFY_EMAIL",
            "idToken": "tok-1",
        })]
    );
}

#[tokio::test]
async fn email_exists_is_mapped_to_the_account_exists_code() {
    let mock = MockProvider::default();
    *mock.fail_sign_up_with.lock().expect("failure lock") = Some("EMAIL_EXISTS");
    let base = start_mock(mock.clone()).await;
    let client = client_for(&base);

    let err = client
        .create_credential("ann@x.com", "secret1")
        .await
        .expect_err("sign-up should fail");

    assert_eq!(err.code, ERROR_CODE_ACCOUNT_EXISTS);
    assert_eq!(err.message, "EMAIL_EXISTS");
}

#[tokio::test]
async fn weak_password_detail_keeps_its_code_and_message() {
    let mock = MockProvider::default();
    *mock.fail_sign_up_with.lock().expect("failure lock") =
        Some("WEAK_PASSWORD : Password should be at least 6 characters");
    let base = start_mock(mock.clone()).await;
    let client = client_for(&base);

    let err = client
        .create_credential("ann@x.com", "short")
        .await
        .expect_err("sign-up should fail");

    assert_eq!(err.code, ERROR_CODE_WEAK_PASSWORD);
    assert_eq!(
        err.message,
        "WEAK_PASSWORD : Password should be at least 6 characters"
    );
}

#[test]
fn unknown_provider_messages_stay_distinguishable() {
    assert_eq!(
        provider_code("OPERATION_NOT_ALLOWED"),
        "auth/operation-not-allowed"
    );
    assert_eq!(provider_code("EMAIL_EXISTS"), ERROR_CODE_ACCOUNT_EXISTS);
    assert_eq!(provider_code("INVALID_EMAIL"), ERROR_CODE_INVALID_EMAIL);
}

#[tokio::test]
async fn write_user_record_puts_the_map_shaped_payload() {
    let mock = MockProvider::default();
    let base = start_mock(mock.clone()).await;
    let client = client_for(&base);

    let record = UserRecord {
        username: "Ann".into(),
        email: "ann@x.com".into(),
        roles: RoleSet::from_flags(false, true, false),
    };
    client
        .write_user_record(&Uid("uid-7".into()), &record)
        .await
        .expect("write record");

    let records = mock.records.lock().expect("records lock").clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "uid-7.json");
    assert_eq!(
        records[0].1,
        json!({
            "username": "Ann",
            "email": "ann@x.com",
            "roles": { "TEACHER": "TEACHER" },
        })
    );
}

#[tokio::test]
async fn verification_without_a_credential_fails_before_any_request() {
    let mock = MockProvider::default();
    let base = start_mock(mock.clone()).await;
    let client = client_for(&base);

    let err = client
        .send_verification()
        .await
        .expect_err("verification should fail");

    assert!(err.message.contains("no credential in session"));
    assert!(mock.oob_requests.lock().expect("oob lock").is_empty());
}

struct RecordingNavigator {
    routes: StdMutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, route: &str) {
        self.routes
            .lock()
            .expect("routes lock")
            .push(route.to_string());
    }
}

#[tokio::test]
async fn full_submission_against_the_rest_provider() {
    let mock = MockProvider::default();
    let base = start_mock(mock.clone()).await;
    let client = Arc::new(client_for(&base));
    let navigator = Arc::new(RecordingNavigator {
        routes: StdMutex::new(Vec::new()),
    });

    let mut controller =
        SignUpController::new(client, Arc::clone(&navigator) as Arc<dyn Navigator>);
    controller.set_field(TextField::Username, "Ann");
    controller.set_field(TextField::Email, "ann@x.com");
    controller.set_field(TextField::PasswordPrimary, "secret1");
    controller.set_field(TextField::PasswordConfirm, "secret1");
    controller.toggle_role(Role::Teacher);

    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    assert_eq!(mock.sign_ups.lock().expect("sign_ups lock").len(), 1);
    assert_eq!(mock.records.lock().expect("records lock").len(), 1);
    assert_eq!(mock.oob_requests.lock().expect("oob lock").len(), 1);
    assert_eq!(
        navigator.routes.lock().expect("routes lock").clone(),
        vec![shared::routes::HOME.to_string()]
    );
    assert!(controller.draft().username.is_empty());
    assert!(!controller.draft().submitting);
}
