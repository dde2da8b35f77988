//! End-to-end runs of the binary against a mock Datawrapper API

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo;
use calamine::{open_workbook_auto, Reader};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn chart_json(id: &str, title: &str, folder_id: u64) -> Value {
    json!({
        "id": id,
        "title": title,
        "type": "d3-bars",
        "folderId": folder_id,
        "lastModifiedAt": "2025-01-14T09:30:00.000Z",
        "publishedAt": "2025-01-15T10:00:00.000Z",
        "publicVersion": 2,
        "metadata": { "describe": { "byline": format!("Byline {}", id) } }
    })
}

fn three_charts() -> Vec<Value> {
    vec![
        chart_json("abc12", "Prison population", 7),
        chart_json("def34", "Staffing: officers per prisoner", 7),
        chart_json("ghi56", "Reoffending rate", 7),
    ]
}

/// Mount the listing, per-chart and embed-code endpoints for `charts`
async fn mount_charts(server: &MockServer, charts: &[Value]) {
    Mock::given(method("GET"))
        .and(path("/v3/charts"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": charts,
            "total": charts.len()
        })))
        .mount(server)
        .await;

    for chart in charts {
        let id = chart["id"].as_str().unwrap();
        Mock::given(method("GET"))
            .and(path(format!("/v3/charts/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart.clone()))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v3/charts/{}/embed-codes", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "responsive", "code": format!("<iframe id=\"{}\"></iframe>", id) }
            ])))
            .mount(server)
            .await;
    }
}

/// Every export succeeds with a small body tagged by format
async fn mount_exports(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/v3/charts/[^/]+/export/png$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/v3/charts/[^/]+/export/svg$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<svg/>"))
        .mount(server)
        .await;
}

/// Run the binary off the async runtime and capture its output
async fn run(server: &MockServer, dir: &Path, args: &[&str]) -> Output {
    let base = format!("{}/v3", server.uri());
    let dir = dir.to_path_buf();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();

    tokio::task::spawn_blocking(move || {
        cargo::cargo_bin_cmd!("dwexport")
            .current_dir(&dir)
            .env("DATAWRAPPER_API_TOKEN", TOKEN)
            .env("DATAWRAPPER_API_BASE", base)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .args(&args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    range
        .rows()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

async fn non_get_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() != "GET")
        .count()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_details_one_row_per_chart() {
    let server = MockServer::start().await;
    mount_charts(&server, &three_charts()).await;
    let temp = TempDir::new().unwrap();

    let output = run(
        &server,
        temp.path(),
        &["details", "--output", "charts.xlsx", "--field", "metadata.describe.byline"],
    )
    .await;

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully saved 3 charts"));

    let rows = read_rows(&temp.path().join("charts.xlsx"));
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][1], "Chart ID");
    assert_eq!(rows[1][1], "abc12");
    assert_eq!(rows[1][2], "Prison population");
    assert_eq!(rows[1][3], "d3-bars");
    assert_eq!(rows[1][4], "7");
    assert_eq!(rows[1][6], "2025-01-14 09:30:00");
    assert_eq!(rows[1][7], "2025-01-15 10:00:00");
    assert_eq!(rows[1][8], "<iframe id=\"abc12\"></iframe>");
    assert_eq!(rows[1][9], "Byline abc12");
    assert_eq!(rows[2][2], "Staffing: officers per prisoner");
    assert_eq!(rows[3][1], "ghi56");
    assert!(!temp.path().join("charts.xlsx.partial").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_details_follows_pagination() {
    let server = MockServer::start().await;
    let charts = three_charts();

    Mock::given(method("GET"))
        .and(path("/v3/charts"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": &charts[..2], "total": 3
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/charts"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": &charts[2..], "total": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("dwexport.toml"), "[api]\npage_size = 2\n").unwrap();

    let output = run(
        &server,
        temp.path(),
        &["details", "--output", "charts.xlsx", "--no-details", "--no-embed-codes"],
    )
    .await;

    output.assert().success();
    assert_eq!(read_rows(&temp.path().join("charts.xlsx")).len(), 4);
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_details_unknown_folder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/folders/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();

    let output = run(&server, temp.path(), &["details", "--folder", "99"]).await;

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found: folder 99"));
    assert!(!temp.path().join("charts.xlsx").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();

    let output = run(&server, temp.path(), &["export", "--output-dir", "out"]).await;

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
    assert!(!temp.path().join("out").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_one_file_per_chart_and_format() {
    let server = MockServer::start().await;
    mount_charts(&server, &three_charts()).await;
    mount_exports(&server).await;
    let temp = TempDir::new().unwrap();

    let output = run(
        &server,
        temp.path(),
        &["export", "--output-dir", "out", "--format", "png", "--format", "svg"],
    )
    .await;

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("| Files written | 6 |"));

    let out = temp.path().join("out");
    assert_eq!(
        sorted_file_names(&out),
        vec![
            "abc12-Prison population.png",
            "abc12-Prison population.svg",
            "def34-Staffing officers per prisoner.png",
            "def34-Staffing officers per prisoner.svg",
            "ghi56-Reoffending rate.png",
            "ghi56-Reoffending rate.svg",
        ]
    );
    assert_eq!(
        fs::read_to_string(out.join("ghi56-Reoffending rate.svg")).unwrap(),
        "<svg/>"
    );
    assert_eq!(non_get_requests(&server).await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_sends_render_options() {
    let server = MockServer::start().await;
    mount_charts(&server, &three_charts()[..1]).await;
    Mock::given(method("GET"))
        .and(path("/v3/charts/abc12/export/png"))
        .and(query_param("width", "853"))
        .and(query_param("height", "480"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();

    let output = run(
        &server,
        temp.path(),
        &[
            "export", "--output-dir", "out", "--format", "png", "--width", "853", "--height",
            "480", "--naming", "id",
        ],
    )
    .await;

    output.assert().success();
    assert!(temp.path().join("out/abc12.png").exists());
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_with_publish_publishes_each_chart() {
    let server = MockServer::start().await;
    mount_charts(&server, &three_charts()).await;
    mount_exports(&server).await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v3/charts/[^/]+/publish$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(3)
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();

    let output = run(
        &server,
        temp.path(),
        &["export", "--output-dir", "out", "--format", "svg", "--publish"],
    )
    .await;

    output.assert().success();
    assert_eq!(sorted_file_names(&temp.path().join("out")).len(), 3);
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_publish_without_scope_stops_run() {
    let server = MockServer::start().await;
    mount_charts(&server, &three_charts()).await;
    mount_exports(&server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficient scope"))
        .expect(1)
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();

    let output = run(
        &server,
        temp.path(),
        &["export", "--output-dir", "out", "--publish"],
    )
    .await;

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authorization failed"));
    assert!(sorted_file_names(&temp.path().join("out")).is_empty());
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_failure_skipped_by_default() {
    let server = MockServer::start().await;
    mount_charts(&server, &three_charts()).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v3/charts/def34/export/.+$"))
        .respond_with(ResponseTemplate::new(500).set_body_string("render failed"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_exports(&server).await;
    let temp = TempDir::new().unwrap();

    let output = run(
        &server,
        temp.path(),
        &["export", "--output-dir", "out", "--format", "png", "--naming", "id"],
    )
    .await;

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("| Failed | 1 |"))
        .stdout(predicate::str::contains("def34"));
    assert_eq!(
        sorted_file_names(&temp.path().join("out")),
        vec!["abc12.png", "ghi56.png"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_fail_fast_stops_at_failure() {
    let server = MockServer::start().await;
    mount_charts(&server, &three_charts()).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v3/charts/def34/export/.+$"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_exports(&server).await;
    let temp = TempDir::new().unwrap();

    let output = run(
        &server,
        temp.path(),
        &[
            "export", "--output-dir", "out", "--format", "png", "--naming", "id", "--fail-fast",
        ],
    )
    .await;

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Export of chart def34 failed"));
    assert_eq!(sorted_file_names(&temp.path().join("out")), vec!["abc12.png"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_recursive_mirrors_folders() {
    let server = MockServer::start().await;
    let root_chart = chart_json("abc12", "Prison population", 7);
    let child_chart = chart_json("def34", "Staffing", 8);
    mount_charts(&server, &[root_chart.clone(), child_chart.clone()]).await;
    mount_exports(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/folders/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "name": "Prisons", "charts": [root_chart], "children": [{ "id": 8 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/folders/8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 8, "name": "Staff", "charts": [child_chart], "children": []
        })))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();

    let output = run(
        &server,
        temp.path(),
        &[
            "export", "--output-dir", "out", "--folder", "7", "--recursive", "--format", "svg",
            "--naming", "id",
        ],
    )
    .await;

    output.assert().success();
    let out = temp.path().join("out");
    assert!(out.join("Prisons/abc12.svg").exists());
    assert!(out.join("Prisons/Staff/def34.svg").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_details_workbook_round_trips_into_export_names() {
    let server = MockServer::start().await;
    mount_charts(&server, &three_charts()).await;
    mount_exports(&server).await;
    let temp = TempDir::new().unwrap();

    run(&server, temp.path(), &["details", "--output", "charts.xlsx"])
        .await
        .assert()
        .success();

    // Ids and titles read back from the workbook match the API
    let rows = read_rows(&temp.path().join("charts.xlsx"));
    let ids_titles: Vec<(String, String)> = rows[1..]
        .iter()
        .map(|r| (r[1].clone(), r[2].clone()))
        .collect();
    let expected: Vec<(String, String)> = three_charts()
        .iter()
        .map(|c| {
            (
                c["id"].as_str().unwrap().to_string(),
                c["title"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(ids_titles, expected);

    // Fill in one chart number, as an editor would, and export with it
    let numbering = numbering_workbook(temp.path(), &[("abc12", "Figure 9.1")]);

    run(
        &server,
        temp.path(),
        &[
            "export",
            "--output-dir",
            "out",
            "--format",
            "png",
            "--naming",
            "id",
            "--numbering",
            numbering.to_str().unwrap(),
        ],
    )
    .await
    .assert()
    .success();

    assert_eq!(
        sorted_file_names(&temp.path().join("out")),
        vec!["Figure 9.1.png", "def34.png", "ghi56.png"]
    );
}

fn numbering_workbook(dir: &Path, numbers: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("numbering.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Chart number").unwrap();
    sheet.write_string(0, 1, "Chart ID").unwrap();
    for (idx, (id, number)) in numbers.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *number).unwrap();
        sheet.write_string(row, 1, *id).unwrap();
    }
    workbook.save(&path).unwrap();
    path
}
