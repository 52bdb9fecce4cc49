//! Pagination module
//!
//! Supports: single page, linked pages, marker pages, offset pages
//!
//! # Overview
//!
//! A [`Pager`] fetches the first page of a collection, wraps it in a page
//! type, and asks that page where the next one lives. Page types implement
//! [`Page`], usually by embedding one of the strategy bases:
//!
//! - [`SinglePageBase`]: the whole collection in one response
//! - [`LinkedPageBase`]: the next URL is embedded in the body
//! - [`MarkerPageBase`]: the next page is requested with the last item's marker
//! - [`OffsetPageBase`]: the next page is requested with an advanced offset
//!
//! ```rust,ignore
//! let pager = Pager::new(client, url, |r| {
//!     LinkedPageBase::new(r).with_link_path(&["servers_links"])
//! });
//! pager
//!     .each_page(&cancel, |page| {
//!         let servers: Vec<Server> = extract_into_slice(page.body(), "servers")?;
//!         Ok(true)
//!     })
//!     .await?;
//! ```

mod pager;
mod strategies;
mod types;

pub use pager::{PageStream, Pager};
pub use strategies::{
    marker_next_url, LinkedPageBase, MarkerPageBase, OffsetPageBase, SinglePageBase,
};
pub use types::{
    collection_items, extract_next_url, with_query_param, Link, MarkerPage, Page, PageResult,
};
