//! Tests for the CLI module

use super::*;
use crate::http::{HttpClient, HttpClientConfig, ServiceClient};
use crate::types::JsonValue;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_client(server: &MockServer) -> ServiceClient {
    let config = HttpClientConfig::builder().max_retries(0).build();
    let http = HttpClient::with_config(config).unwrap();
    ServiceClient::new(Arc::new(http), server.uri())
}

fn list_options(strategy: Strategy) -> ListOptions {
    ListOptions {
        strategy,
        items_key: None,
        links_key: None,
        max_pages: None,
    }
}

async fn collect(client: ServiceClient, url: String, options: &ListOptions) -> Vec<JsonValue> {
    let mut items = Vec::new();
    walk_collection(client, url, options, &CancellationToken::new(), |item| {
        items.push(item);
    })
    .await
    .unwrap();
    items
}

// ============================================================================
// Argument Parsing Tests
// ============================================================================

#[test]
fn test_parse_get() {
    let cli = Cli::try_parse_from(["osclient", "--endpoint", "http://localhost/", "get", "servers"])
        .unwrap();
    assert_eq!(cli.endpoint.as_deref(), Some("http://localhost/"));
    assert_eq!(cli.format, OutputFormat::Json);
    assert!(matches!(cli.command, Commands::Get { ref path } if path == "servers"));
}

#[test]
fn test_parse_list_with_options() {
    let cli = Cli::try_parse_from([
        "osclient",
        "list",
        "servers/detail",
        "--strategy",
        "marker",
        "--items-key",
        "servers",
        "--max-pages",
        "2",
        "--format",
        "pretty",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Pretty);
    match cli.command {
        Commands::List {
            path,
            strategy,
            items_key,
            links_key,
            max_pages,
        } => {
            assert_eq!(path, "servers/detail");
            assert_eq!(strategy, Strategy::Marker);
            assert_eq!(items_key.as_deref(), Some("servers"));
            assert!(links_key.is_none());
            assert_eq!(max_pages, Some(2));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_list_default_strategy() {
    let cli = Cli::try_parse_from(["osclient", "list", "images"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::List {
            strategy: Strategy::Linked,
            ..
        }
    ));
}

#[test]
fn test_parse_unknown_strategy() {
    assert!(Cli::try_parse_from(["osclient", "list", "x", "--strategy", "cursor"]).is_err());
}

// ============================================================================
// Runner Config Tests
// ============================================================================

#[test]
fn test_client_config_overrides_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "endpoint: \"http://from-file/\"").unwrap();
    writeln!(file, "token: file-token").unwrap();
    writeln!(file, "service_type: compute").unwrap();

    let config_path = file.path().to_string_lossy().to_string();
    let cli = Cli::try_parse_from([
        "osclient",
        "-C",
        config_path.as_str(),
        "--token",
        "cli-token",
        "version",
    ])
    .unwrap();

    let config = Runner::new(cli).client_config().unwrap();
    assert_eq!(config.endpoint.as_deref(), Some("http://from-file/"));
    assert_eq!(config.token.as_deref(), Some("cli-token"));
    assert_eq!(config.service_type, "compute");
}

#[test]
fn test_client_config_rejects_bad_endpoint() {
    let cli = Cli::try_parse_from(["osclient", "--endpoint", "::nope", "version"]).unwrap();
    assert!(Runner::new(cli).client_config().is_err());
}

// ============================================================================
// Helper Tests
// ============================================================================

#[test]
fn test_page_items_object() {
    let body = json!({"servers": [{"id": "1"}, {"id": "2"}], "servers_links": []});
    let items = page_items(&body, None).unwrap();
    assert_eq!(items, vec![json!({"id": "1"}), json!({"id": "2"})]);
}

#[test]
fn test_page_items_text() {
    let body = json!("alpha\nbeta\n");
    assert_eq!(page_items(&body, None).unwrap(), vec![json!("alpha"), json!("beta")]);
}

#[test]
fn test_page_items_without_array() {
    let body = json!({"server": {"id": "1"}});
    assert!(page_items(&body, None).is_err());
    assert!(page_items(&JsonValue::Null, None).unwrap().is_empty());
}

#[tokio::test]
async fn test_resolve_url() {
    let server = MockServer::start().await;
    let client = service_client(&server);

    assert_eq!(
        resolve_url(&client, "/servers/detail"),
        format!("{}/servers/detail", server.uri())
    );
    assert_eq!(
        resolve_url(&client, "https://elsewhere/v2/images"),
        "https://elsewhere/v2/images"
    );
}

// ============================================================================
// Collection Walking Tests
// ============================================================================

#[tokio::test]
async fn test_walk_linked_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [{"id": "3"}],
            "servers_links": []
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [{"id": "1"}, {"id": "2"}],
            "servers_links": [{"rel": "next", "href": format!("{}/servers?page=2", server.uri())}]
        })))
        .mount(&server)
        .await;

    let client = service_client(&server);
    let url = client.service_url(&["servers"]);
    let mut options = list_options(Strategy::Linked);
    options.links_key = Some("servers_links".to_string());

    let items = collect(client, url, &options).await;
    let ids: Vec<&str> = items.iter().filter_map(|i| i["id"].as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_walk_linked_nested_link_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [{"id": 1}],
            "links": {"next": null}
        })))
        .mount(&server)
        .await;

    let client = service_client(&server);
    let url = client.service_url(&["events"]);
    let mut options = list_options(Strategy::Linked);
    options.links_key = Some("links.next".to_string());

    let items = collect(client, url, &options).await;
    assert_eq!(items, vec![json!({"id": 1})]);
}

#[tokio::test]
async fn test_walk_marker_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flavors"))
        .and(query_param("marker", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"flavors": []})))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flavors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "flavors": [{"id": "a"}, {"id": "b"}]
        })))
        .mount(&server)
        .await;

    let client = service_client(&server);
    let url = client.service_url(&["flavors"]);
    let mut options = list_options(Strategy::Marker);
    options.items_key = Some("flavors".to_string());

    let items = collect(client, url, &options).await;
    assert_eq!(items.len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_walk_offset_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"volumes": [{"id": "v3"}]})))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "volumes": [{"id": "v1"}, {"id": "v2"}]
        })))
        .mount(&server)
        .await;

    let client = service_client(&server);
    let url = format!("{}?limit=2", client.service_url(&["volumes"]));
    let items = collect(client, url, &list_options(Strategy::Offset)).await;

    assert_eq!(items.len(), 3);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_walk_max_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/containers"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("one\ntwo\n"),
        )
        .mount(&server)
        .await;

    let client = service_client(&server);
    let url = client.service_url(&["containers"]);
    let mut options = list_options(Strategy::Marker);
    options.max_pages = Some(1);

    let items = collect(client, url, &options).await;
    assert_eq!(items, vec![json!("one"), json!("two")]);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_walk_single_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/extensions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extensions": [{"alias": "os-a"}, {"alias": "os-b"}]
        })))
        .mount(&server)
        .await;

    let client = service_client(&server);
    let url = client.service_url(&["extensions"]);
    let items = collect(client, url, &list_options(Strategy::Single)).await;
    assert_eq!(items.len(), 2);
}
