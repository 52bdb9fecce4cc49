//! Page iteration over a paginated collection

use super::types::{Page, PageResult};
use crate::decode::json_kind;
use crate::error::{Error, Result};
use crate::http::{RequestOpts, ServiceClient};
use crate::types::{JsonObject, JsonValue, StringMap};
use futures::stream::{self, Stream};
use pin_project_lite::pin_project;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Status codes accepted for page fetches
const PAGE_OK_CODES: &[u16] = &[200, 204, 300];

type PageConstructor<P> = Arc<dyn Fn(PageResult) -> P + Send + Sync>;

/// Walks a paginated collection page by page
///
/// A pager holds no cursor: every call to [`each_page`](Self::each_page),
/// [`all_pages`](Self::all_pages) or [`into_stream`](Self::into_stream)
/// starts again from the initial URL.
pub struct Pager<P> {
    client: ServiceClient,
    initial_url: String,
    create_page: PageConstructor<P>,
    headers: StringMap,
}

impl<P> Clone for Pager<P> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            initial_url: self.initial_url.clone(),
            create_page: Arc::clone(&self.create_page),
            headers: self.headers.clone(),
        }
    }
}

impl<P> fmt::Debug for Pager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("initial_url", &self.initial_url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl<P: Page> Pager<P> {
    /// Create a pager starting at `initial_url`
    ///
    /// `create_page` wraps each fetched [`PageResult`] in the page type,
    /// which decides emptiness and where the next page is.
    pub fn new(
        client: ServiceClient,
        initial_url: impl Into<String>,
        create_page: impl Fn(PageResult) -> P + Send + Sync + 'static,
    ) -> Self {
        Self {
            client,
            initial_url: initial_url.into(),
            create_page: Arc::new(create_page),
            headers: StringMap::new(),
        }
    }

    /// Send extra headers with every page request
    #[must_use]
    pub fn with_headers(mut self, headers: StringMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn initial_url(&self) -> &str {
        &self.initial_url
    }

    async fn fetch_page(&self, cancel: &CancellationToken, url: &str) -> Result<P> {
        let opts = RequestOpts {
            ok_codes: PAGE_OK_CODES.to_vec(),
            more_headers: self.headers.clone(),
            ..Default::default()
        };
        let response = self.client.get_with_opts(cancel, url, opts).await?;
        let result = PageResult::from_response(url, &response)?;
        debug!(url = %url, status = result.status, "Fetched page");
        Ok((self.create_page)(result))
    }

    /// Hand each page to `handler` until it returns `false`
    ///
    /// Iteration also ends at the last page, or at the first empty page even
    /// if that page links to another. Any fetch, decode or handler error stops
    /// iteration and is returned.
    pub async fn each_page<F>(&self, cancel: &CancellationToken, handler: F) -> Result<()>
    where
        F: FnMut(P) -> Result<bool>,
    {
        self.walk(cancel, None, handler).await
    }

    async fn walk<F>(
        &self,
        cancel: &CancellationToken,
        first: Option<P>,
        mut handler: F,
    ) -> Result<()>
    where
        F: FnMut(P) -> Result<bool>,
    {
        let mut pending = first;
        let mut url = self.initial_url.clone();

        loop {
            let page = match pending.take() {
                Some(page) => page,
                None => self.fetch_page(cancel, &url).await?,
            };

            if page.is_empty()? {
                debug!(url = %url, "Empty page, stopping");
                return Ok(());
            }

            // Computed first since the handler takes the page
            let next = page.next_page_url();

            if !handler(page)? {
                return Ok(());
            }

            match next? {
                Some(next_url) if !next_url.is_empty() => url = next_url,
                _ => return Ok(()),
            }
        }
    }

    /// Fetch every page and merge them into one page
    ///
    /// A single page comes back as it was fetched. Otherwise bodies are
    /// merged by shape:
    /// - objects: each array field not ending in `links` is concatenated
    /// - arrays: concatenated
    /// - text: joined with newlines
    pub async fn all_pages(&self, cancel: &CancellationToken) -> Result<P> {
        let first = self.fetch_page(cancel, &self.initial_url).await?;
        let template = first.result().clone();
        let mut merged = Merged::for_body(&template.body)?;
        let mut count = 0usize;

        self.walk(cancel, Some(first), |page| {
            merged.push(page.body())?;
            count += 1;
            Ok(true)
        })
        .await?;

        debug!(pages = count, "Collected all pages");
        if count <= 1 {
            return Ok((self.create_page)(template));
        }

        Ok((self.create_page)(PageResult {
            body: merged.finish(),
            ..template
        }))
    }
}

impl<P: Page + 'static> Pager<P> {
    /// Turn the pager into a stream of pages
    ///
    /// Follows the same rules as [`each_page`](Self::each_page); the stream
    /// ends after the first error it yields.
    pub fn into_stream(self, cancel: CancellationToken) -> PageStream<P> {
        let pager = Arc::new(self);
        let start = Cursor::Fetch(pager.initial_url.clone());

        let inner = stream::unfold(start, move |cursor| {
            let pager = Arc::clone(&pager);
            let cancel = cancel.clone();
            async move {
                let url = match cursor {
                    Cursor::Fetch(url) => url,
                    Cursor::Fail(err) => return Some((Err(err), Cursor::Done)),
                    Cursor::Done => return None,
                };

                let page = match pager.fetch_page(&cancel, &url).await {
                    Ok(page) => page,
                    Err(err) => return Some((Err(err), Cursor::Done)),
                };

                match page.is_empty() {
                    Ok(true) => return None,
                    Ok(false) => {}
                    Err(err) => return Some((Err(err), Cursor::Done)),
                }

                let cursor = match page.next_page_url() {
                    Ok(Some(next)) if !next.is_empty() => Cursor::Fetch(next),
                    Ok(_) => Cursor::Done,
                    Err(err) => Cursor::Fail(err),
                };
                Some((Ok(page), cursor))
            }
        });

        PageStream {
            inner: Box::pin(inner),
        }
    }
}

enum Cursor {
    Fetch(String),
    Fail(Error),
    Done,
}

pin_project! {
    /// Stream of pages produced by [`Pager::into_stream`]
    pub struct PageStream<P> {
        #[pin]
        inner: Pin<Box<dyn Stream<Item = Result<P>> + Send>>,
    }
}

impl<P> Stream for PageStream<P> {
    type Item = Result<P>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

// ============================================================================
// Page merging
// ============================================================================

enum Merged {
    Object(JsonObject),
    Array(Vec<JsonValue>),
    Text(Vec<String>),
}

impl Merged {
    fn for_body(body: &JsonValue) -> Result<Self> {
        match body {
            JsonValue::Object(map) => Ok(Self::Object(
                map.iter()
                    .filter(|(key, value)| value.is_array() && !key.ends_with("links"))
                    .map(|(key, _)| (key.clone(), JsonValue::Array(Vec::new())))
                    .collect(),
            )),
            JsonValue::Array(_) | JsonValue::Null => Ok(Self::Array(Vec::new())),
            JsonValue::String(_) => Ok(Self::Text(Vec::new())),
            other => Err(Error::unexpected_type(
                "object, array or text page body",
                json_kind(other),
            )),
        }
    }

    fn push(&mut self, body: &JsonValue) -> Result<()> {
        match (self, body) {
            (_, JsonValue::Null) => {}
            (Self::Object(merged), JsonValue::Object(map)) => {
                for (key, value) in map {
                    if key.ends_with("links") {
                        continue;
                    }
                    if let JsonValue::Array(items) = value {
                        let entry = merged
                            .entry(key.clone())
                            .or_insert_with(|| JsonValue::Array(Vec::new()));
                        if let JsonValue::Array(existing) = entry {
                            existing.extend(items.iter().cloned());
                        }
                    }
                }
            }
            (Self::Array(merged), JsonValue::Array(items)) => merged.extend(items.iter().cloned()),
            (Self::Text(lines), JsonValue::String(text)) => {
                lines.push(text.trim_end_matches('\n').to_string());
            }
            (merged, other) => {
                return Err(Error::unexpected_type(merged.kind(), json_kind(other)));
            }
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Text(_) => "string",
        }
    }

    fn finish(self) -> JsonValue {
        match self {
            Self::Object(map) => JsonValue::Object(map),
            Self::Array(items) => JsonValue::Array(items),
            Self::Text(lines) => JsonValue::String(lines.join("\n")),
        }
    }
}
