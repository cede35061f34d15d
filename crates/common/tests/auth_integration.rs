//! Integration tests for auth module
//!
//! Drives the Implicit Grant flow end to end against a wiremock identity
//! provider: redirect parsing, state validation, user-info and account
//! lookup through the real reqwest client.

#![cfg(all(feature = "platform", feature = "test-utils"))]

use std::sync::Arc;

use quillsign_common::auth::{
    find_protocol_url, IdentityClient, IdentityError, ImplicitGrantConfig, ImplicitLoginService,
    LoginStart, NotificationLevel, RedirectOutcome, RejectReason, SDK_HEADER_NAME,
};
use quillsign_common::testing::{MockBrowserLauncher, RecordingNotifier};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLBACK_PREFIX: &str =
    "quillsign:/implicit-result#access_token=abc123&expires_in=28800&token_type=bearer&state=";

/// Identity client that talks to the local mock server directly, whatever
/// proxy the environment configures.
fn identity_client(config: &ImplicitGrantConfig) -> IdentityClient {
    let http = reqwest::Client::builder().no_proxy().build().expect("reqwest client");
    IdentityClient::with_client(http, config, "quillsign-test")
}

struct Flow {
    service: ImplicitLoginService<IdentityClient>,
    browser: Arc<MockBrowserLauncher>,
    notifier: Arc<RecordingNotifier>,
}

fn flow(server: &MockServer) -> Flow {
    let config =
        ImplicitGrantConfig::new(server.uri(), "client-123", "quillsign", "implicit-result");
    let identity = Arc::new(identity_client(&config));
    let browser = Arc::new(MockBrowserLauncher::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let service = ImplicitLoginService::new(config, identity, browser.clone(), notifier.clone());
    Flow { service, browser, notifier }
}

async fn start(flow: &Flow) -> String {
    let LoginStart::Browser { authorization_url } = flow.service.start_login().await.unwrap()
    else {
        panic!("expected browser login");
    };
    authorization_url.query_pairs().find(|(k, _)| k == "state").unwrap().1.into_owned()
}

fn user_info_body(base_uri: &str) -> serde_json::Value {
    json!({
        "sub": "4799e5e9-1559-4915-9862-cf4713bbcacc",
        "name": "Ada Lovelace",
        "given_name": "Ada",
        "email": "ada@example.com",
        "accounts": [
            {
                "account_id": "acc-secondary",
                "is_default": false,
                "account_name": "Side Project",
                "base_uri": base_uri
            },
            {
                "account_id": "acc-1",
                "is_default": true,
                "account_name": "Ada Co",
                "base_uri": base_uri
            }
        ]
    })
}

/// Validates the complete login round trip against a mock identity provider.
///
/// # Test Steps
/// 1. Start the login and capture the state from the authorization URL
/// 2. Deliver the callback URL carrying that state
/// 3. Verify user-info and the account lookup were called with the bearer
///    token and the client-identifier header
/// 4. Verify the credential fields
#[tokio::test(flavor = "multi_thread")]
async fn test_login_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/userinfo"))
        .and(header("Authorization", "Bearer abc123"))
        .and(header(SDK_HEADER_NAME, "quillsign-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_info_body(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/restapi/v2.1/accounts/acc-1"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accountName": "Ada Co", "externalAccountId": "9876543"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let flow = flow(&server);
    let state = start(&flow).await;
    assert_eq!(flow.browser.open_count(), 1);

    let outcome = flow.service.handle_redirect_url(&format!("{CALLBACK_PREFIX}{state}")).await;

    let RedirectOutcome::Authenticated(credential) = outcome else {
        panic!("expected credential, got {outcome:?}");
    };
    assert_eq!(credential.email, "ada@example.com");
    assert_eq!(credential.account_id, "acc-1");
    assert_eq!(credential.external_account_id.as_deref(), Some("9876543"));
    assert_eq!(credential.base_uri, server.uri());
    assert!(credential.is_usable());
    assert!(flow.notifier.visible().is_empty());
}

/// Validates that a forged callback never reaches the identity provider.
///
/// # Test Steps
/// 1. Mount a user-info mock that must not be called
/// 2. Start the login, deliver a callback with a different state
/// 3. Verify rejection and the security notification
#[tokio::test(flavor = "multi_thread")]
async fn test_forged_state_issues_no_identity_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_info_body(&server.uri())))
        .expect(0)
        .mount(&server)
        .await;

    let flow = flow(&server);
    start(&flow).await;

    let outcome = flow.service.handle_redirect_url(&format!("{CALLBACK_PREFIX}other")).await;

    assert_eq!(outcome, RedirectOutcome::Rejected(RejectReason::StateMismatch));
    assert_eq!(flow.notifier.messages_at(NotificationLevel::Error).len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_account_lookup_failure_keeps_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_info_body(&server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/restapi/v2.1/accounts/acc-1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let flow = flow(&server);
    let state = start(&flow).await;

    let outcome = flow.service.handle_redirect_url(&format!("{CALLBACK_PREFIX}{state}")).await;

    let credential = outcome.credential().cloned().unwrap();
    assert_eq!(credential.external_account_id, None);
}

/// Validates that an unexpected user-info shape aborts the login.
///
/// # Test Steps
/// 1. Answer user-info with a body lacking `accounts`
/// 2. Verify the outcome is an identity rejection with a parse error
#[tokio::test(flavor = "multi_thread")]
async fn test_unexpected_user_info_shape_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/userinfo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "Ada", "email": "a@b.co"})),
        )
        .mount(&server)
        .await;

    let flow = flow(&server);
    let state = start(&flow).await;

    let outcome = flow.service.handle_redirect_url(&format!("{CALLBACK_PREFIX}{state}")).await;

    let RedirectOutcome::Rejected(RejectReason::IdentityResolution(detail)) = outcome else {
        panic!("expected identity rejection");
    };
    assert!(detail.starts_with("Parse error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_identity_client_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/userinfo"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = ImplicitGrantConfig::new(server.uri(), "client", "quillsign", "implicit-result");
    let client = identity_client(&config);

    let err = client.fetch_user_info("expired").await.unwrap_err();
    assert!(matches!(err, IdentityError::Status { status: 401, .. }));
    assert_eq!(err.to_string(), "401 Unauthorized");
}

/// Validates that a URL extracted from launch arguments drives the same
/// flow as one delivered at runtime.
#[tokio::test(flavor = "multi_thread")]
async fn test_protocol_launch_argument_feeds_redirect_handler() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_info_body(&server.uri())))
        .mount(&server)
        .await;

    let flow = flow(&server);
    let state = start(&flow).await;
    let args = vec![
        "quillsign.exe".to_string(),
        "--protocol-launcher".to_string(),
        format!("{CALLBACK_PREFIX}{state}"),
    ];

    let url = find_protocol_url(&args, &[flow.service.config().scheme_prefix()]).unwrap();
    let outcome = flow.service.handle_redirect_url(&url).await;

    assert!(outcome.credential().is_some());
}
