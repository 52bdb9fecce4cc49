//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, Strategy};
use crate::config::{load_config, ClientConfig};
use crate::decode::text_lines;
use crate::error::{Error, Result};
use crate::http::{HttpClient, ServiceClient};
use crate::pagination::{
    collection_items, LinkedPageBase, MarkerPageBase, OffsetPageBase, Page, Pager,
    SinglePageBase,
};
use crate::types::JsonValue;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Get { path } => self.get(path).await,
            Commands::List {
                path,
                strategy,
                items_key,
                links_key,
                max_pages,
            } => {
                let options = ListOptions {
                    strategy: *strategy,
                    items_key: items_key.clone(),
                    links_key: links_key.clone(),
                    max_pages: *max_pages,
                };
                self.list(path, &options).await
            }
            Commands::Version => {
                println!("osclient {}", crate::VERSION);
                Ok(())
            }
        }
    }

    /// Config file merged with command-line overrides
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_config(path)?,
            None => ClientConfig::default(),
        };

        if let Some(endpoint) = &self.cli.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(token) = &self.cli.token {
            config.token = Some(token.clone());
        }

        config.validate()?;
        Ok(config)
    }

    fn service_client(&self) -> Result<ServiceClient> {
        let config = self.client_config()?;
        let http = HttpClient::with_config(config.http_client_config())?;
        config.service_client(Arc::new(http))
    }

    async fn get(&self, path: &str) -> Result<()> {
        let client = self.service_client()?;
        let url = resolve_url(&client, path);
        let cancel = cancel_on_ctrl_c();

        let response = client.get(&cancel, &url).await?;
        self.output_value(&response.body_value()?);
        Ok(())
    }

    async fn list(&self, path: &str, options: &ListOptions) -> Result<()> {
        let client = self.service_client()?;
        let url = resolve_url(&client, path);
        let cancel = cancel_on_ctrl_c();
        let start = Instant::now();

        let count = walk_collection(client, url, options, &cancel, |item| {
            self.output_value(&item);
        })
        .await?;

        info!(
            items = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Listed collection"
        );
        Ok(())
    }

    /// Output a value in the selected format; strings are printed as is
    fn output_value(&self, value: &JsonValue) {
        match (value, self.cli.format) {
            (JsonValue::String(text), _) => println!("{text}"),
            (_, OutputFormat::Json) => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            (_, OutputFormat::Pretty) => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

// ============================================================================
// Collection walking
// ============================================================================

/// Options for walking a collection
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub strategy: Strategy,
    pub items_key: Option<String>,
    pub links_key: Option<String>,
    pub max_pages: Option<usize>,
}

/// Walk the collection at `url`, handing every item to `sink`
///
/// Returns the number of items seen.
pub async fn walk_collection<F>(
    client: ServiceClient,
    url: String,
    options: &ListOptions,
    cancel: &CancellationToken,
    sink: F,
) -> Result<usize>
where
    F: FnMut(JsonValue),
{
    let items_key = options.items_key.clone();

    match options.strategy {
        Strategy::Single => {
            let pager = Pager::new(client, url, SinglePageBase::new);
            walk_pages(&pager, options, cancel, sink).await
        }
        Strategy::Linked => {
            let link_path: Vec<String> = options
                .links_key
                .as_deref()
                .unwrap_or("links")
                .split('.')
                .map(str::to_string)
                .collect();
            let pager = Pager::new(client, url, move |result| {
                let path: Vec<&str> = link_path.iter().map(String::as_str).collect();
                let page = LinkedPageBase::new(result).with_link_path(&path);
                match &items_key {
                    Some(key) => page.with_items_key(key.clone()),
                    None => page,
                }
            });
            walk_pages(&pager, options, cancel, sink).await
        }
        Strategy::Marker => {
            let pager = Pager::new(client, url, move |result| {
                let page = MarkerPageBase::new(result);
                match &items_key {
                    Some(key) => page.with_items_key(key.clone()),
                    None => page,
                }
            });
            walk_pages(&pager, options, cancel, sink).await
        }
        Strategy::Offset => {
            let pager = Pager::new(client, url, move |result| {
                let page = OffsetPageBase::new(result);
                match &items_key {
                    Some(key) => page.with_items_key(key.clone()),
                    None => page,
                }
            });
            walk_pages(&pager, options, cancel, sink).await
        }
    }
}

async fn walk_pages<P, F>(
    pager: &Pager<P>,
    options: &ListOptions,
    cancel: &CancellationToken,
    mut sink: F,
) -> Result<usize>
where
    P: Page,
    F: FnMut(JsonValue),
{
    let mut pages = 0usize;
    let mut items = 0usize;

    pager
        .each_page(cancel, |page| {
            pages += 1;
            for item in page_items(page.body(), options.items_key.as_deref())? {
                items += 1;
                sink(item);
            }
            debug!(page = pages, items, "Handled page");
            Ok(options.max_pages.map_or(true, |max| pages < max))
        })
        .await?;

    Ok(items)
}

/// Items of one page body: text lines, or the collection's array entries
pub fn page_items(body: &JsonValue, items_key: Option<&str>) -> Result<Vec<JsonValue>> {
    if body.is_string() {
        return Ok(text_lines(body)?
            .into_iter()
            .map(JsonValue::String)
            .collect());
    }

    match collection_items(body, items_key)? {
        Some(items) => Ok(items.clone()),
        None if body.is_null() => Ok(Vec::new()),
        None => Err(Error::decode("no item array found in page body")),
    }
}

/// Full URLs are used as given; anything else is joined onto the resource base
pub fn resolve_url(client: &ServiceClient, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        client.service_url(&[path.trim_start_matches('/')])
    }
}

/// A token cancelled when the user presses Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            guard.cancel();
        }
    });
    cancel
}
