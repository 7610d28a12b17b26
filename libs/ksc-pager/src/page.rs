//! Page and continuation marker types.

use std::fmt;

/// Opaque continuation token handed out by the server.
///
/// A marker received with page N must be passed back unmodified to fetch
/// page N+1. The client never inspects or builds markers itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker(String);

impl Marker {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Marker {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Marker {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One bounded batch of items returned by a single remote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` marks the final page of the collection.
    pub next_marker: Option<Marker>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, next_marker: Option<Marker>) -> Self {
        Self { items, next_marker }
    }

    /// A page with no continuation.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next_marker.is_none()
    }

    /// Convert the items, keeping the marker.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_marker: self.next_marker,
        }
    }

    /// Convert the items with a fallible function, failing on the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            next_marker: self.next_marker,
        })
    }
}

/// Parameters for fetching one explicit page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Continuation marker from the previous page; `None` starts at the beginning.
    pub marker: Option<Marker>,
    /// Requested page size; `None` leaves it to the server.
    pub limit: Option<u32>,
}

impl PageRequest {
    #[must_use]
    pub fn first() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn after(marker: Marker) -> Self {
        Self {
            marker: Some(marker),
            limit: None,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}
