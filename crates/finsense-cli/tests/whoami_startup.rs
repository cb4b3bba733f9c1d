//! Integration tests for the startup reconciliation via `whoami`.


use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::{profile_json, read_session, seed_session};

/// Without a stored token, whoami resolves signed-out with no profile call.
#[tokio::test]
async fn test_whoami_without_token_makes_no_request() {
    let mock_server = MockServer::start().await;
    let temp = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    Command::cargo_bin("finsense")
        .unwrap()
        .env("FINSENSE_HOME", temp.path())
        .env("FINSENSE_BASE_URL", mock_server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

/// A stored token is validated and the profile rendered.
#[tokio::test]
async fn test_whoami_resumes_stored_session() {
    let mock_server = MockServer::start().await;
    let temp = tempdir().unwrap();
    seed_session(temp.path(), "tok-123");

    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("alice")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Command::cargo_bin("finsense")
        .unwrap()
        .env("FINSENSE_HOME", temp.path())
        .env("FINSENSE_BASE_URL", mock_server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as alice"))
        .stdout(predicate::str::contains("alice@example.com"));

    let session = read_session(temp.path());
    assert!(
        session.contains("finsense_user"),
        "validated profile should be cached"
    );
}

/// A rejected stored token ends signed-out with both entries cleared.
#[tokio::test]
async fn test_whoami_clears_rejected_session() {
    let mock_server = MockServer::start().await;
    let temp = tempdir().unwrap();
    seed_session(temp.path(), "expired-tok");

    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "detail": "Could not validate credentials" })),
        )
        .mount(&mock_server)
        .await;

    Command::cargo_bin("finsense")
        .unwrap()
        .env("FINSENSE_HOME", temp.path())
        .env("FINSENSE_BASE_URL", mock_server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("no longer valid"))
        .stdout(predicate::str::contains("Could not validate credentials"))
        .stdout(predicate::str::contains("sign in again"));

    let session = read_session(temp.path());
    assert!(
        !session.contains("expired-tok"),
        "rejected token should be cleared"
    );
    assert!(
        !session.contains("finsense_user"),
        "profile entry should be cleared"
    );
}
