use assert_cmd::Command;
use mockito::{Matcher, Server};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn command() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("stac-search")
}

fn page(ids: &[&str]) -> String {
    let features: Vec<Value> = ids
        .iter()
        .map(|id| json!({"type": "Feature", "id": id}))
        .collect();
    json!({"type": "FeatureCollection", "features": features, "links": []}).to_string()
}

#[rstest]
fn help(mut command: Command) {
    command.arg("--help").assert().success();
}

#[rstest]
fn dry_run_get(mut command: Command) {
    let output = command
        .arg("http://stac.test/search")
        .arg("--bbox=-73.21,43.99,-73.12,44.05")
        .arg("--collections=naip")
        .arg("--limit=10")
        .arg("--dry-run")
        .assert()
        .success();
    let request: Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(request["method"], "GET");
    assert_eq!(
        request["url"],
        "http://stac.test/search?bbox=-73.21%2C43.99%2C-73.12%2C44.05&collections=naip&limit=10"
    );
    assert!(request["body"].is_null());
}

#[rstest]
fn dry_run_post(mut command: Command) {
    let output = command
        .arg("http://stac.test/search")
        .arg("--intersects")
        .arg(r#"{"type":"Point","coordinates":[-105.1,41.1]}"#)
        .arg("--header")
        .arg("x-api-key=secret")
        .arg("--dry-run")
        .assert()
        .success();
    let request: Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(request["method"], "POST");
    assert_eq!(
        request["body"]["intersects"],
        json!({"type": "Point", "coordinates": [-105.1, 41.1]})
    );
    assert_eq!(request["headers"]["x-api-key"], "secret");
}

#[rstest]
#[case("--bbox=1,2,3")]
#[case("--datetime=../..")]
#[case("--intersects=not json")]
fn invalid_parameters(mut command: Command, #[case] arg: &str) {
    let _ = command
        .arg("http://stac.test/search")
        .arg(arg)
        .arg("--dry-run")
        .assert()
        .failure();
}

#[rstest]
fn items_as_ndjson(mut command: Command) {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("collections".into(), "naip".into()))
        .with_body(page(&["a", "b", "c"]))
        .create();
    let output = command
        .arg(format!("{}/search", server.url()))
        .arg("--collections=naip")
        .arg("--max-items=2")
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let ids: Vec<String> = stdout
        .lines()
        .map(|line| {
            let item: Value = serde_json::from_str(line).unwrap();
            item["id"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(ids, ["a", "b"]);
    mock.assert();
}

#[rstest]
fn item_collection(mut command: Command) {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/search")
        .with_body(page(&["a", "b"]))
        .create();
    let output = command
        .arg(format!("{}/search", server.url()))
        .arg("--item-collection")
        .assert()
        .success();
    let item_collection: Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(item_collection["type"], "FeatureCollection");
    assert_eq!(item_collection["features"].as_array().unwrap().len(), 2);
}

#[rstest]
fn server_error(mut command: Command) {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/search").with_status(500).create();
    let _ = command
        .arg(format!("{}/search", server.url()))
        .assert()
        .failure();
}
