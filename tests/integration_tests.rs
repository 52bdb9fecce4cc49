//! Integration tests using mock HTTP server
//!
//! Tests the full flow: options struct → request → paginated responses

use futures::StreamExt;
use osclient_core::catalog::{v3_endpoint_url, Availability, EndpointOpts, ServiceCatalogV3};
use osclient_core::decode::extract_into_slice;
use osclient_core::http::{HttpClient, HttpClientConfig, RequestOpts, ServiceClient};
use osclient_core::pagination::{
    LinkedPageBase, MarkerPage, MarkerPageBase, Page, PageResult, Pager, SinglePageBase,
};
use osclient_core::params::{build_query_string, build_request_body, Field, FieldSet, Options};
use osclient_core::types::BackoffType;
use osclient_core::{load_config_from_str, Error, Result};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Server {
    id: String,
    name: String,
}

#[derive(Default)]
struct ListServersOpts {
    name: String,
    limit: i64,
    marker: String,
}

impl Options for ListServersOpts {
    fn fields(&self) -> FieldSet {
        FieldSet::new()
            .field(Field::new("Name", &self.name).query("name"))
            .field(Field::new("Limit", self.limit).query("limit"))
            .field(Field::new("Marker", &self.marker).query("marker"))
    }
}

#[derive(Default)]
struct CreateServerOpts {
    name: String,
    flavor_ref: String,
    image_ref: String,
}

impl Options for CreateServerOpts {
    fn fields(&self) -> FieldSet {
        FieldSet::new()
            .field(Field::new("Name", &self.name).json("name").required())
            .field(Field::new("FlavorRef", &self.flavor_ref).json("flavorRef").required())
            .field(Field::new("ImageRef", &self.image_ref).json_omit_empty("imageRef"))
    }
}

/// A resource page wrapping the linked base, as resource packages define them
struct ServerPage(LinkedPageBase);

impl ServerPage {
    fn new(result: PageResult) -> Self {
        Self(LinkedPageBase::new(result).with_link_path(&["servers_links"]))
    }

    fn servers(&self) -> Result<Vec<Server>> {
        extract_into_slice(self.body(), "servers")
    }
}

impl Page for ServerPage {
    fn result(&self) -> &PageResult {
        self.0.result()
    }

    fn next_page_url(&self) -> Result<Option<String>> {
        self.0.next_page_url()
    }

    fn is_empty(&self) -> Result<bool> {
        self.0.is_empty()
    }
}

fn service_client(server: &MockServer) -> ServiceClient {
    let config = HttpClientConfig::builder()
        .token("test-token")
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(1),
            Duration::from_millis(1),
        )
        .build();
    let http = HttpClient::with_config(config).unwrap();
    ServiceClient::new(Arc::new(http), format!("{}/v2.1", server.uri())).with_service_type("compute")
}

async fn mount_server_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2.1/servers"))
        .and(query_param("marker", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [{"id": "3", "name": "gamma"}],
            "servers_links": []
        })))
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2.1/servers"))
        .and(header("X-Auth-Token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [{"id": "1", "name": "alpha"}, {"id": "2", "name": "beta"}],
            "servers_links": [{
                "rel": "next",
                "href": format!("{}/v2.1/servers?limit=2&marker=2", server.uri())
            }]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Marshaling + Pagination
// ============================================================================

#[tokio::test]
async fn test_list_servers_with_options() {
    let server = MockServer::start().await;
    mount_server_pages(&server).await;

    let client = service_client(&server);
    let opts = ListServersOpts {
        limit: 2,
        ..Default::default()
    };
    let query = build_query_string(&opts).unwrap();
    assert_eq!(query.to_string(), "?limit=2");

    let url = format!("{}{}", client.service_url(&["servers"]), query);
    let pager = Pager::new(client, url, ServerPage::new);

    let mut names = Vec::new();
    pager
        .each_page(&CancellationToken::new(), |page| {
            names.extend(page.servers()?.into_iter().map(|s| s.name));
            Ok(true)
        })
        .await
        .unwrap();

    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn test_all_pages_merges_servers() {
    let server = MockServer::start().await;
    mount_server_pages(&server).await;

    let client = service_client(&server);
    let url = client.service_url(&["servers"]);
    let pager = Pager::new(client, url, ServerPage::new);

    let all = pager.all_pages(&CancellationToken::new()).await.unwrap();
    let ids: Vec<String> = all.servers().unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert!(all.body().get("servers_links").is_none());
}

#[tokio::test]
async fn test_stream_of_pages() {
    let server = MockServer::start().await;
    mount_server_pages(&server).await;

    let client = service_client(&server);
    let url = client.service_url(&["servers"]);
    let pages: Vec<_> = Pager::new(client, url, ServerPage::new)
        .into_stream(CancellationToken::new())
        .collect()
        .await;

    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(std::result::Result::is_ok));
}

#[tokio::test]
async fn test_marker_pages_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/images"))
        .and(query_param("marker", "img-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"images": []})))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{"id": "img-1"}, {"id": "img-2"}]
        })))
        .mount(&server)
        .await;

    let client = ServiceClient::new(Arc::new(HttpClient::new().unwrap()), server.uri());
    let url = client.service_url(&["v2", "images"]);
    let pager = Pager::new(client, url, |r| MarkerPageBase::new(r).with_items_key("images"));

    let mut markers = Vec::new();
    pager
        .each_page(&CancellationToken::new(), |page| {
            markers.push(page.last_marker()?);
            Ok(true)
        })
        .await
        .unwrap();

    assert_eq!(markers, vec![Some("img-2".to_string())]);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_page_fetch_error_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.1/flavors"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = service_client(&server);
    let url = client.service_url(&["flavors"]);
    let pager = Pager::new(client, url, SinglePageBase::new);

    let mut calls = 0;
    let err = pager
        .each_page(&CancellationToken::new(), |_| {
            calls += 1;
            Ok(true)
        })
        .await
        .unwrap_err();

    assert_eq!(calls, 0);
    assert!(err.is_status(403));
    assert!(err.to_string().contains("forbidden"));
}

// ============================================================================
// Request Bodies
// ============================================================================

#[tokio::test]
async fn test_create_server_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2.1/servers"))
        .and(body_json(json!({"server": {"name": "web", "flavorRef": "m1.small"}})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"server": {"id": "new"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = service_client(&server);
    let opts = CreateServerOpts {
        name: "web".to_string(),
        flavor_ref: "m1.small".to_string(),
        ..Default::default()
    };
    let body = build_request_body(&opts, "server").unwrap();

    let response = client
        .post(&CancellationToken::new(), &client.service_url(&["servers"]), body)
        .await
        .unwrap();
    assert_eq!(response.status, 202);
}

#[tokio::test]
async fn test_missing_required_field_sends_nothing() {
    let server = MockServer::start().await;

    let opts = CreateServerOpts {
        name: "web".to_string(),
        ..Default::default()
    };
    let err = build_request_body(&opts, "server").unwrap_err();
    assert!(err.is_missing_input());
    assert!(matches!(err, Error::MissingInput { ref argument, .. } if argument == "FlavorRef"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_microversion_and_extra_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.1/os-hypervisors"))
        .and(header("X-OpenStack-Nova-API-Version", "2.53"))
        .and(header("OpenStack-API-Version", "compute 2.53"))
        .and(header("X-Request-Id", "req-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hypervisors": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = service_client(&server).with_microversion("2.53");
    let opts = RequestOpts::new().header("X-Request-Id", "req-1");
    client
        .get_with_opts(
            &CancellationToken::new(),
            &client.service_url(&["os-hypervisors"]),
            opts,
        )
        .await
        .unwrap();
}

// ============================================================================
// Catalog + Config
// ============================================================================

#[tokio::test]
async fn test_endpoint_from_catalog() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volume/v3/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"volumes": [{"id": "v1"}]})))
        .mount(&server)
        .await;

    let catalog: ServiceCatalogV3 = serde_json::from_value(json!({
        "catalog": [{
            "type": "volumev3",
            "name": "cinder",
            "endpoints": [
                {"interface": "admin", "region": "RegionOne", "url": "http://admin.invalid/"},
                {"interface": "public", "region": "RegionOne", "url": format!("{}/volume/v3", server.uri())}
            ]
        }]
    }))
    .unwrap();

    let opts = EndpointOpts::new("volumev3")
        .region("RegionOne")
        .availability(Availability::Public);
    let endpoint = v3_endpoint_url(&catalog, &opts).unwrap();
    assert_eq!(endpoint, format!("{}/volume/v3/", server.uri()));

    let client = ServiceClient::new(Arc::new(HttpClient::new().unwrap()), endpoint);
    let url = client.service_url(&["volumes"]);
    let page = Pager::new(client, url, SinglePageBase::new)
        .all_pages(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(page.body()["volumes"][0]["id"], "v1");
}

#[tokio::test]
async fn test_service_client_from_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.1/servers"))
        .and(header("X-Auth-Token", "yaml-token"))
        .and(header("X-OpenStack-Nova-API-Version", "2.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"servers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let yaml = format!(
        "endpoint: \"{}/v2.1\"\ntoken: yaml-token\nservice_type: compute\nmicroversion: \"2.1\"\nhttp:\n  timeout_seconds: 5\n",
        server.uri()
    );
    let config = load_config_from_str(&yaml).unwrap();
    let http = HttpClient::with_config(config.http_client_config()).unwrap();
    let client = config.service_client(Arc::new(http)).unwrap();

    client
        .get(&CancellationToken::new(), &client.service_url(&["servers"]))
        .await
        .unwrap();
}

// ============================================================================
// Transport behaviour
// ============================================================================

#[tokio::test]
async fn test_retry_on_service_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.1/limits"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2.1/limits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"limits": {}})))
        .mount(&server)
        .await;

    let client = service_client(&server);
    let response = client
        .get(&CancellationToken::new(), &client.service_url(&["limits"]))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cancel_aborts_pager() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.1/servers"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"servers": [{"id": "1", "name": "slow"}]}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = service_client(&server);
    let url = client.service_url(&["servers"]);
    let pager = Pager::new(client, url, ServerPage::new);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = pager.each_page(&cancel, |_| Ok(true)).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}
