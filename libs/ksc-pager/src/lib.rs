#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! # `ksc-pager` - lazy pagination for marker-based collections
//!
//! Remote collections are served in bounded pages, each carrying an optional
//! continuation marker. This crate turns a page-fetching function into a
//! single logical [`Stream`](futures_core::Stream) of items (or of pages):
//!
//! - **Lazy** - nothing is fetched until the stream is first polled, and the
//!   next page is requested only once the current one is drained.
//! - **Ordered** - items come out in page fetch order; one fetch in flight at
//!   a time, because each request needs the previous page's marker.
//! - **Fail-fast** - a failed fetch ends the stream with a single error.
//!   Nothing is retried or skipped.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ksc_pager::{PagedSequence, PagedStreamExt};
//!
//! let users = PagedSequence::new(move |marker| {
//!     let api = api.clone();
//!     async move { api.list_users_page(marker).await }
//! });
//!
//! // Drain every page into a deduplicated set
//! let all = users.concat_to_set().await?;
//! ```

pub mod materialize;
pub mod page;
pub mod pager;

pub use materialize::PagedStreamExt;
pub use page::{Marker, Page, PageRequest};
pub use pager::{PageSequence, PagedSequence, PagerError};
