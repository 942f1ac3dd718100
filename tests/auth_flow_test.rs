//! Momentum auth flow integration tests using wiremock
//!
//! Verifies the wire contract of `src/momentum/auth.rs`:
//!
//! - `login` issues exactly one POST to `{base_url}/auth` with an S256 PKCE
//!   challenge, independent `nonce`/`state` tokens, and the full password
//!   payload.
//! - `completed.accessToken` is extracted on success; any other JSON shape
//!   yields no token; a non-JSON body is a protocol error.
//! - Queue status parsing applies fallbacks for absent fields and requires
//!   the tenant headers plus the bearer token.
//! - Logout posts the structured payload and treats only HTTP 200 as
//!   success.

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use queuepilot::momentum::auth::{fetch_queue_status, login, logout};
use queuepilot::momentum::client::{MomentumClient, MOMENTUM_CLIENT};
use queuepilot::QueuePilotError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn success_login_body(token: &str) -> serde_json::Value {
    serde_json::json!({
        "completed": {
            "accessToken": token
        }
    })
}

/// Builds an authenticated client against the given mock server.
fn make_authenticated_client(base_url: &str, token: &str) -> MomentumClient {
    let mut client = MomentumClient::new(reqwest::Client::new(), base_url, "api-key-123")
        .expect("client construction must not fail");
    client.set_token(token).expect("valid token");
    client
}

fn is_base64url(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ---------------------------------------------------------------------------
// Login: request shape
// ---------------------------------------------------------------------------

/// The login POST carries the full password payload with an S256 challenge
/// and fresh `nonce`/`state` values, and is sent exactly once.
#[tokio::test]
async fn test_login_posts_expected_payload_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(body_partial_json(serde_json::json!({
            "method": "password",
            "identifier": "anna@example.se",
            "key": "pw1",
            "returnAddress": "https://minasidor.kbab.se/signin",
            "codeChallengeMethod": "S256",
            "requestRefreshToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_login_body("tok123")))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let token = login(&http, "anna@example.se", "pw1", "kbab", &server.uri())
        .await
        .expect("login must not error");
    assert_eq!(token.as_deref(), Some("tok123"));

    // Inspect the captured request for the random fields the partial-json
    // matcher cannot pin down.
    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1, "login must issue exactly one POST");

    let body: serde_json::Value =
        serde_json::from_slice(&requests[0].body).expect("login body must be JSON");

    let challenge = body["codeChallenge"].as_str().expect("challenge present");
    // base64url(SHA-256(verifier)) of a 32-byte digest is 43 unpadded chars.
    assert_eq!(challenge.len(), 43);
    assert!(is_base64url(challenge));

    let nonce = body["nonce"].as_str().expect("nonce present");
    let state = body["state"].as_str().expect("state present");
    assert!(is_base64url(nonce));
    assert!(is_base64url(state));
    // 16 bytes of entropy each, base64url-unpadded.
    assert_eq!(nonce.len(), 22);
    assert_eq!(state.len(), 22);
    assert_ne!(nonce, state, "nonce and state are drawn independently");

    // The verifier stays client-side in this flow.
    assert!(
        body.get("codeVerifier").is_none(),
        "verifier must never be transmitted"
    );
}

/// Two logins never reuse a PKCE challenge.
#[tokio::test]
async fn test_login_generates_fresh_challenge_per_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_login_body("tok")))
        .expect(2)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    for _ in 0..2 {
        login(&http, "anna@example.se", "pw1", "kbab", &server.uri())
            .await
            .expect("login must not error");
    }

    let requests = server.received_requests().await.expect("recording enabled");
    let challenge_of = |i: usize| -> String {
        let body: serde_json::Value = serde_json::from_slice(&requests[i].body).unwrap();
        body["codeChallenge"].as_str().unwrap().to_string()
    };
    assert_ne!(
        challenge_of(0),
        challenge_of(1),
        "PKCE challenge must be single-use"
    );
}

/// A trailing slash on the base URL does not produce a `//auth` path.
#[tokio::test]
async fn test_login_normalizes_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_login_body("tok")))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let base_url = format!("{}/", server.uri());
    let token = login(&http, "anna@example.se", "pw1", "kbab", &base_url)
        .await
        .expect("login must not error");
    assert_eq!(token.as_deref(), Some("tok"));
}

// ---------------------------------------------------------------------------
// Login: response interpretation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_extracts_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_login_body("tok123")))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let token = login(&http, "anna@example.se", "pw1", "kbab", &server.uri())
        .await
        .expect("login must not error");
    assert_eq!(token.as_deref(), Some("tok123"));
}

/// A well-formed error response yields no token rather than an error.
#[tokio::test]
async fn test_login_without_completed_key_returns_no_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"error": "invalid_credentials"})),
        )
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let token = login(&http, "anna@example.se", "wrong", "kbab", &server.uri())
        .await
        .expect("bad credentials are not a transport error");
    assert!(token.is_none());
}

/// An MFA continuation response is treated as a failed login; the flow does
/// not implement multi-step continuation.
#[tokio::test]
async fn test_login_challenge_continuation_returns_no_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "challenge": { "type": "otp", "reference": "abc" }
        })))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let token = login(&http, "anna@example.se", "pw1", "kbab", &server.uri())
        .await
        .expect("MFA continuation is not a transport error");
    assert!(token.is_none());
}

/// A non-JSON body is a hard protocol failure, distinguishable from bad
/// credentials.
#[tokio::test]
async fn test_login_non_json_body_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let err = login(&http, "anna@example.se", "pw1", "kbab", &server.uri())
        .await
        .unwrap_err();
    let kind = err
        .downcast_ref::<QueuePilotError>()
        .expect("typed error")
        .kind();
    assert_eq!(kind, "protocol");
}

/// An unreachable endpoint is a transport failure.
#[tokio::test]
async fn test_login_unreachable_endpoint_is_transport_error() {
    // Bind-then-drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let http = reqwest::Client::new();
    let base_url = format!("http://127.0.0.1:{port}");
    let err = login(&http, "anna@example.se", "pw1", "kbab", &base_url)
        .await
        .unwrap_err();
    let kind = err
        .downcast_ref::<QueuePilotError>()
        .expect("typed error")
        .kind();
    assert_eq!(kind, "transport");
}

// ---------------------------------------------------------------------------
// Queue status
// ---------------------------------------------------------------------------

/// The status GET carries the tenant headers and the bearer token, and the
/// response maps onto queue entries.
#[tokio::test]
async fn test_fetch_queue_status_parses_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/market/applicant/status"))
        .and(header("x-api-key", "api-key-123"))
        .and(header("x-momentum-client", MOMENTUM_CLIENT))
        .and(header("authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "queues": [
                {"displayName": "Kö A", "value": 120, "valueUnitDisplayName": "dagar"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_authenticated_client(&server.uri(), "tok123");
    let entries = fetch_queue_status(&client).await.expect("fetch must succeed");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_name, "Kö A");
    assert_eq!(entries[0].value, "120");
    assert_eq!(entries[0].unit, "dagar");
}

/// Entries missing optional fields fall back to defaults instead of failing.
#[tokio::test]
async fn test_fetch_queue_status_applies_fallbacks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/market/applicant/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "queues": [
                {"value": 12, "valueUnitDisplayName": "poäng"},
                {"displayName": "Kö B"}
            ]
        })))
        .mount(&server)
        .await;

    let client = make_authenticated_client(&server.uri(), "tok123");
    let entries = fetch_queue_status(&client).await.expect("fetch must succeed");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].display_name, "Unknown queue");
    assert_eq!(entries[0].value, "12");
    assert_eq!(entries[0].unit, "poäng");
    assert_eq!(entries[1].display_name, "Kö B");
    assert_eq!(entries[1].value, "unknown");
    assert_eq!(entries[1].unit, "");
}

#[tokio::test]
async fn test_fetch_queue_status_empty_queues_is_ok() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/market/applicant/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"queues": []})))
        .mount(&server)
        .await;

    let client = make_authenticated_client(&server.uri(), "tok123");
    let entries = fetch_queue_status(&client).await.expect("fetch must succeed");
    assert!(entries.is_empty());
}

/// Non-200 yields a status failure carrying the code and body.
#[tokio::test]
async fn test_fetch_queue_status_non_200_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/market/applicant/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = make_authenticated_client(&server.uri(), "tok123");
    let err = fetch_queue_status(&client).await.unwrap_err();
    let typed = err.downcast_ref::<QueuePilotError>().expect("typed error");
    assert_eq!(typed.kind(), "status");
    match typed {
        QueuePilotError::StatusFetch { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected StatusFetch, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// Logout posts the structured payload with the tenant headers and token.
#[tokio::test]
async fn test_logout_posts_structured_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer tok123"))
        .and(body_partial_json(serde_json::json!({
            "returnAddress": "https://minasidor.kbab.se/",
            "global": false,
            "keepSingleSignOn": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = make_authenticated_client(&server.uri(), "tok123");
    logout(&client, "kbab").await.expect("logout must succeed");
}

/// Any non-200 logout status is reported as a logout failure.
#[tokio::test]
async fn test_logout_non_200_is_logout_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = make_authenticated_client(&server.uri(), "tok123");
    let err = logout(&client, "kbab").await.unwrap_err();
    let kind = err
        .downcast_ref::<QueuePilotError>()
        .expect("typed error")
        .kind();
    assert_eq!(kind, "logout");
}
