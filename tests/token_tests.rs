mod test_helpers;

use std::thread;
use stickerdiary::auth::{bearer_token, TokenAuthority};
use stickerdiary::errors::ErrorKind;
use stickerdiary::model::Role;
use test_helpers::{TestApp, TEST_SECRET};

fn authority() -> TokenAuthority {
    TokenAuthority::new(TEST_SECRET.as_bytes(), 3600, 604800)
}

#[test]
fn test_tampered_token_is_invalid() {
    let tokens = authority();
    let pair = tokens.issue("alice@example.com", Role::User).unwrap();

    let mut parts: Vec<String> = pair.access_token.split('.').map(str::to_string).collect();
    parts[1] = parts[1].chars().rev().collect();
    let tampered = parts.join(".");

    assert!(!tokens.validate(&tampered));
    assert_eq!(tokens.identity_of(&tampered).unwrap_err().kind(), ErrorKind::InvalidCredential);
}

#[test]
fn test_expired_tokens_are_rejected_everywhere() {
    let app = TestApp::with_token_ttls(-60, -30);
    app.alice();
    let (_, pair) = app.accounts.login("alice@example.com", "pw1").unwrap();

    assert!(!app.accounts.tokens().validate(&pair.access_token));
    assert_eq!(
        app.accounts.authenticate(&pair.access_token).unwrap_err().kind(),
        ErrorKind::InvalidCredential
    );
    assert_eq!(
        app.accounts.refresh_token(&pair.refresh_token).unwrap_err().kind(),
        ErrorKind::InvalidCredential
    );
}

#[test]
fn test_tokens_from_another_secret_are_rejected() {
    let app = TestApp::new();
    app.alice();

    let forger = TokenAuthority::new(b"some-other-secret-some-other-secret", 3600, 604800);
    let forged = forger.issue("alice@example.com", Role::Admin).unwrap();

    assert_eq!(
        app.accounts.authenticate(&forged.access_token).unwrap_err().kind(),
        ErrorKind::InvalidCredential
    );
}

#[test]
fn test_each_issue_is_unique() {
    let tokens = authority();
    let first = tokens.issue("alice@example.com", Role::User).unwrap();
    let second = tokens.issue("alice@example.com", Role::User).unwrap();
    assert_ne!(first.access_token, second.access_token);
    assert_ne!(first.refresh_token, second.refresh_token);
}

#[test]
fn test_validation_is_safe_across_threads() {
    let tokens = authority();
    let pair = tokens.issue("alice@example.com", Role::User).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let tokens = tokens.clone();
            let token = pair.access_token.clone();
            thread::spawn(move || {
                assert!(tokens.validate(&token));
                let own = tokens.issue(&format!("user{}@example.com", i), Role::User).unwrap();
                tokens.identity_of(&own.access_token).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("user{}@example.com", i));
    }
}

#[test]
fn test_bearer_header_forms() {
    let tokens = authority();
    let pair = tokens.issue("alice@example.com", Role::User).unwrap();
    let header = format!("Bearer {}", pair.access_token);
    assert!(tokens.validate(bearer_token(&header)));
}
