use assert_cmd::cargo;
use predicates::prelude::*;
use serde_json::json;
use serial_test::serial;
use std::process::Output;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn listing_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/charts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [
                { "id": "abc12", "title": "Prison population", "type": "d3-lines", "folderId": 7 },
                { "id": "def34", "title": "Pipes | and bars", "type": "d3-bars" }
            ],
            "total": 2
        })))
        .mount(&server)
        .await;
    server
}

async fn list(server: &MockServer, envs: &[(&str, &str)], args: &[&str]) -> Output {
    let base = format!("{}/v3", server.uri());
    let envs: Vec<(String, String)> = envs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();

    tokio::task::spawn_blocking(move || {
        let temp_dir = TempDir::new().unwrap();
        cargo::cargo_bin_cmd!("dwexport")
            .current_dir(temp_dir.path())
            .env("DATAWRAPPER_API_TOKEN", "test-token")
            .env("DATAWRAPPER_API_BASE", base)
            .env_remove("NO_COLOR")
            .env_remove("CLICOLOR")
            .env_remove("CLICOLOR_FORCE")
            .envs(envs)
            .arg("list")
            .args(args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_list_with_no_color() {
    let server = listing_server().await;

    let output = list(&server, &[("NO_COLOR", "1")], &[]).await;

    assert_cmd::assert::OutputAssertExt::assert(output)
        .success()
        .stdout(predicate::str::contains("**Total:** 2"))
        .stdout(predicate::str::contains("| `abc12` | Prison population | d3-lines | 7 |"))
        .stdout(predicate::str::contains("Pipes \\| and bars"))
        .stdout(predicate::str::contains("\u{1b}[").not());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_list_with_color_never() {
    let server = listing_server().await;

    let output = list(&server, &[("CLICOLOR_FORCE", "1")], &["--color", "never"]).await;

    assert_cmd::assert::OutputAssertExt::assert(output)
        .success()
        .stdout(predicate::str::contains("# Charts"))
        .stdout(predicate::str::contains("\u{1b}[").not());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_list_with_clicolor_force() {
    let server = listing_server().await;

    let output = list(&server, &[("CLICOLOR_FORCE", "1")], &[]).await;

    assert_cmd::assert::OutputAssertExt::assert(output)
        .success()
        .stdout(predicate::str::contains("abc12"))
        .stdout(predicate::str::contains("**Total:**").not());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_list_empty_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/charts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "list": [], "total": 0 })))
        .mount(&server)
        .await;

    let output = list(&server, &[("NO_COLOR", "1")], &[]).await;

    assert_cmd::assert::OutputAssertExt::assert(output)
        .success()
        .stdout(predicate::str::contains("No charts found."));
}
