//! Marker-based pagination with the Stream API.
//!
//! [`PagedSequence`] yields individual items, [`PageSequence`] yields whole
//! pages. Both own only the current page buffer, the pending marker and the
//! fetch function; neither caches anything across traversals. To look at the
//! collection again, build a new sequence (for facades: call `list()` again).

use crate::page::{Marker, Page};
use futures_core::Stream;
use pin_project_lite::pin_project;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Error type for pagination.
///
/// Either the fetcher failed, or the server broke the marker protocol.
#[derive(Debug)]
pub enum PagerError<E> {
    /// Error from the fetcher function.
    Fetch(E),
    /// The server handed out a continuation marker that was already sent
    /// during this traversal; following it would loop forever.
    RepeatedMarker(Marker),
}

impl<E: fmt::Display> fmt::Display for PagerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::RepeatedMarker(marker) => {
                write!(f, "Server repeated continuation marker: {marker}")
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for PagerError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::RepeatedMarker(_) => None,
        }
    }
}

/// Outcome of handling one fetched page, shared by both pagers.
struct Advance {
    next_marker: Option<Marker>,
    repeated: Option<Marker>,
}

fn advance(sent: &HashSet<Marker>, next_marker: Option<Marker>) -> Advance {
    match next_marker {
        Some(next) if sent.contains(&next) => Advance {
            next_marker: None,
            repeated: Some(next),
        },
        next_marker => Advance {
            next_marker,
            repeated: None,
        },
    }
}

pin_project! {
    /// A lazy sequence of items spread over marker-linked pages.
    ///
    /// The first page is requested on the first poll, never at construction.
    /// Each following page is requested only after every item of the current
    /// page has been yielded and the caller polls again, so at most one page
    /// is buffered and stopping early saves the remaining fetches.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The item type
    /// * `E` - The fetch error type
    /// * `F` - The fetcher function type
    /// * `Fut` - The future returned by the fetcher
    pub struct PagedSequence<T, E, F, Fut>
    where
        F: FnMut(Option<Marker>) -> Fut,
        Fut: Future<Output = Result<Page<T>, E>>,
    {
        next_marker: Option<Marker>,
        sent: HashSet<Marker>,
        buffer: VecDeque<T>,
        done: bool,
        pending_error: Option<PagerError<E>>,
        pages_fetched: usize,
        fetcher: F,
        #[pin]
        current_fetch: Option<Fut>,
    }
}

impl<T, E, F, Fut> PagedSequence<T, E, F, Fut>
where
    F: FnMut(Option<Marker>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    /// Create a sequence over the whole collection.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let users = PagedSequence::new(|marker| async move {
    ///     api.list_users_page(marker).await
    /// });
    /// ```
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self::starting_at(None, fetcher)
    }

    /// Create a sequence that resumes from a marker obtained earlier.
    #[must_use]
    pub fn starting_at(marker: Option<Marker>, fetcher: F) -> Self {
        Self {
            next_marker: marker,
            sent: HashSet::new(),
            buffer: VecDeque::new(),
            done: false,
            pending_error: None,
            pages_fetched: 0,
            fetcher,
            current_fetch: None,
        }
    }

    /// Number of pages received so far.
    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }
}

impl<T, E, F, Fut> Stream for PagedSequence<T, E, F, Fut>
where
    F: FnMut(Option<Marker>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    type Item = Result<T, PagerError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(item) = this.buffer.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if *this.done {
                return Poll::Ready(this.pending_error.take().map(Err));
            }

            if let Some(fut) = this.current_fetch.as_mut().as_pin_mut() {
                match fut.poll(cx) {
                    Poll::Ready(Ok(page)) => {
                        this.current_fetch.set(None);
                        *this.pages_fetched += 1;

                        let Page { items, next_marker } = page;
                        tracing::trace!(
                            page = *this.pages_fetched,
                            items = items.len(),
                            has_next = next_marker.is_some(),
                            "received page"
                        );

                        let step = advance(this.sent, next_marker);
                        if let Some(marker) = step.repeated {
                            tracing::warn!(%marker, "server revisited continuation marker");
                            *this.pending_error = Some(PagerError::RepeatedMarker(marker));
                        }
                        *this.done = step.next_marker.is_none();
                        *this.next_marker = step.next_marker;

                        this.buffer.extend(items);

                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        this.current_fetch.set(None);
                        *this.done = true;
                        return Poll::Ready(Some(Err(PagerError::Fetch(e))));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            let marker = this.next_marker.take();
            if let Some(marker) = &marker {
                this.sent.insert(marker.clone());
            }
            let fut = (this.fetcher)(marker);
            this.current_fetch.set(Some(fut));

            // Loop around and poll the new future right away so it registers the waker.
        }
    }
}

pin_project! {
    /// A lazy sequence of whole pages.
    ///
    /// Same fetch discipline as [`PagedSequence`], but the page boundaries are
    /// kept visible to the caller.
    pub struct PageSequence<T, E, F, Fut>
    where
        F: FnMut(Option<Marker>) -> Fut,
        Fut: Future<Output = Result<Page<T>, E>>,
    {
        next_marker: Option<Marker>,
        sent: HashSet<Marker>,
        done: bool,
        pending_error: Option<PagerError<E>>,
        fetcher: F,
        #[pin]
        current_fetch: Option<Fut>,
    }
}

impl<T, E, F, Fut> PageSequence<T, E, F, Fut>
where
    F: FnMut(Option<Marker>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self {
            next_marker: None,
            sent: HashSet::new(),
            done: false,
            pending_error: None,
            fetcher,
            current_fetch: None,
        }
    }
}

impl<T, E, F, Fut> Stream for PageSequence<T, E, F, Fut>
where
    F: FnMut(Option<Marker>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    type Item = Result<Page<T>, PagerError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if *this.done {
                return Poll::Ready(this.pending_error.take().map(Err));
            }

            if let Some(fut) = this.current_fetch.as_mut().as_pin_mut() {
                match fut.poll(cx) {
                    Poll::Ready(Ok(mut page)) => {
                        this.current_fetch.set(None);

                        let step = advance(this.sent, page.next_marker.take());
                        if let Some(marker) = step.repeated {
                            tracing::warn!(%marker, "server revisited continuation marker");
                            *this.pending_error = Some(PagerError::RepeatedMarker(marker));
                        }
                        *this.done = step.next_marker.is_none();
                        page.next_marker.clone_from(&step.next_marker);
                        *this.next_marker = step.next_marker;

                        return Poll::Ready(Some(Ok(page)));
                    }
                    Poll::Ready(Err(e)) => {
                        this.current_fetch.set(None);
                        *this.done = true;
                        return Poll::Ready(Some(Err(PagerError::Fetch(e))));
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            let marker = this.next_marker.take();
            if let Some(marker) = &marker {
                this.sent.insert(marker.clone());
            }
            let fut = (this.fetcher)(marker);
            this.current_fetch.set(Some(fut));
        }
    }
}
