mod test_helpers;

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use test_helpers::stickerdiary_command;

fn run_json(db: &Path, args: &[&str]) -> Value {
    let output = stickerdiary_command(db).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stdout)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Signs up and logs in, returning an access token.
fn signed_in(db: &Path, email: &str, nickname: &str) -> String {
    run_json(db, &["signup", "--email", email, "--password", "pw1", "--nickname", nickname]);
    let login = run_json(db, &["login", "--email", email, "--password", "pw1"]);
    login["tokens"]["accessToken"].as_str().unwrap().to_string()
}

fn write_body(dir: &TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_signup_prints_user_without_hash() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");

    stickerdiary_command(&db)
        .args(["signup", "--email", "alice@example.com", "--password", "pw1", "--nickname", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"email\": \"alice@example.com\""))
        .stdout(predicate::str::contains("\"role\": \"USER\""))
        .stdout(predicate::str::contains("argon2").not());
}

#[test]
fn test_cli_duplicate_signup_is_conflict() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");
    signed_in(&db, "alice@example.com", "alice");

    stickerdiary_command(&db)
        .args(["signup", "--email", "alice@example.com", "--password", "pw1", "--nickname", "alice"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("DUPLICATE_EMAIL"))
        .stdout(predicate::str::contains("409"));
}

#[test]
fn test_cli_login_failures_look_the_same() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");
    signed_in(&db, "alice@example.com", "alice");

    let wrong_password = stickerdiary_command(&db)
        .args(["login", "--email", "alice@example.com", "--password", "nope"])
        .output()
        .unwrap();
    let unknown_email = stickerdiary_command(&db)
        .args(["login", "--email", "nobody@example.com", "--password", "pw1"])
        .output()
        .unwrap();

    assert!(!wrong_password.status.success());
    assert!(!unknown_email.status.success());
    assert_eq!(wrong_password.stdout, unknown_email.stdout);
    assert!(String::from_utf8_lossy(&unknown_email.stdout).contains("INVALID_CREDENTIALS"));
}

#[test]
fn test_cli_requires_token() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");

    stickerdiary_command(&db)
        .args(["diary", "list"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID_CREDENTIALS"));

    stickerdiary_command(&db)
        .args(["--token", "garbage", "me"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("UNAUTHORIZED"));
}

#[test]
fn test_cli_diary_round_trip() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");
    let token = signed_in(&db, "alice@example.com", "alice");

    let body = write_body(
        &dir,
        "create.json",
        r#"{"title": "Rofan night", "genre": "Fantasy", "date": "2026-01-25",
            "stickers": [{"type": "emoji", "src": "a.png", "zIndex": 1},
                         {"type": "emoji", "src": "b.png", "zIndex": 2}]}"#,
    );
    let created = run_json(&db, &["--token", &token, "diary", "create", "--file", &body]);
    let id = created["id"].as_i64().unwrap().to_string();
    assert_eq!(created["stickers"].as_array().unwrap().len(), 2);
    assert_eq!(created["isDeleted"], Value::Bool(false));

    let update = write_body(
        &dir,
        "update.json",
        r#"{"title": "Rofan night (edited)", "stickers": [{"type": "text", "src": "c.png", "zIndex": 5}]}"#,
    );
    run_json(&db, &["--token", &token, "diary", "update", &id, "--file", &update]);

    let stickers = run_json(&db, &["--token", &token, "diary", "stickers", &id]);
    let stickers = stickers.as_array().unwrap();
    assert_eq!(stickers.len(), 1);
    assert_eq!(stickers[0]["zIndex"], Value::from(5));

    let trashed = run_json(&db, &["--token", &token, "diary", "trash", &id]);
    assert_eq!(trashed["isDeleted"], Value::Bool(true));
    assert!(trashed["deletedAt"].is_string());

    let trash = run_json(&db, &["--token", &token, "diary", "trash-list"]);
    assert_eq!(trash.as_array().unwrap().len(), 1);

    run_json(&db, &["--token", &token, "diary", "restore", &id]);
    let found = run_json(&db, &["--token", &token, "diary", "search", "--keyword", "EDITED"]);
    assert_eq!(found.as_array().unwrap().len(), 1);

    run_json(&db, &["--token", &token, "diary", "delete", &id]);
    stickerdiary_command(&db)
        .args(["--token", token.as_str(), "diary", "get", id.as_str()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("DIARY_NOT_FOUND"));
}

#[test]
fn test_cli_other_users_diary_reads_as_missing() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");
    let alice = signed_in(&db, "alice@example.com", "alice");
    let bob = signed_in(&db, "bob@example.com", "bob");

    let body = write_body(&dir, "d.json", r#"{"title": "private thoughts"}"#);
    let created = run_json(&db, &["--token", &alice, "diary", "create", "--file", &body]);
    let id = created["id"].as_i64().unwrap().to_string();

    for action in ["get", "trash", "delete", "toggle-public", "like"] {
        stickerdiary_command(&db)
            .args(["--token", bob.as_str(), "diary", action, id.as_str()])
            .assert()
            .failure()
            .stdout(predicate::str::contains("DIARY_NOT_FOUND"));
    }

    run_json(&db, &["--token", &alice, "diary", "toggle-public", &id]);
    let liked = run_json(&db, &["--token", &bob, "diary", "like", &id]);
    assert_eq!(liked["likeCount"], Value::from(1));

    let public = run_json(&db, &["diary", "public", &id]);
    assert_eq!(public["title"], Value::from("private thoughts"));
}

#[test]
fn test_cli_invalid_body_lists_fields() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");
    let token = signed_in(&db, "alice@example.com", "alice");

    let body = write_body(
        &dir,
        "bad.json",
        r#"{"title": " ", "stickers": [{"type": "", "src": "a.png"}]}"#,
    );
    stickerdiary_command(&db)
        .args(["--token", token.as_str(), "diary", "create", "--file", body.as_str()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID_INPUT"))
        .stdout(predicate::str::contains("stickers[0].type"))
        .stdout(predicate::str::contains("\"title\""));
}

#[test]
fn test_cli_refresh_and_onboard() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");
    run_json(&db, &["signup", "--email", "alice@example.com", "--password", "pw1", "--nickname", "alice"]);
    let login = run_json(&db, &["login", "--email", "alice@example.com", "--password", "pw1"]);
    let refresh = login["tokens"]["refreshToken"].as_str().unwrap();

    let renewed = run_json(&db, &["refresh", "--refresh-token", refresh]);
    let access = renewed["accessToken"].as_str().unwrap();
    assert_eq!(renewed["tokenType"], Value::from("Bearer"));

    let me = run_json(&db, &["--token", &format!("Bearer {}", access), "onboard"]);
    assert_eq!(me["onboardingCompleted"], Value::Bool(true));
}

#[test]
fn test_cli_missing_secret_fails() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");

    stickerdiary_command(&db)
        .env_remove("STICKERDIARY_TOKEN_SECRET")
        .args(["diary", "feed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("STICKERDIARY_TOKEN_SECRET"));
}
