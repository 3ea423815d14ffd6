//! Pagination for Cloud Foundry V3 list responses.
//!
//! V3 list endpoints wrap results in an envelope:
//!
//! ```json
//! { "pagination": { "total_results": 3, "total_pages": 1,
//!                   "first": {"href": "..."}, "last": {"href": "..."},
//!                   "next": null, "previous": null },
//!   "resources": [ ... ] }
//! ```

use serde::{Deserialize, Serialize};

/// An `href` link as returned in pagination blocks and resource `links`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

/// The `pagination` block of a V3 list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub first: Option<Href>,
    #[serde(default)]
    pub last: Option<Href>,
    #[serde(default)]
    pub next: Option<Href>,
    #[serde(default)]
    pub previous: Option<Href>,
}

/// Raw list envelope as returned by the API.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: serde::de::DeserializeOwned")]
pub struct ListEnvelope<T> {
    #[serde(default)]
    pub pagination: Pagination,
    pub resources: Vec<T>,
}

/// A page of results from a V3 list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The resources on this page.
    pub resources: Vec<T>,
    /// Total number of results across all pages.
    pub total_results: u64,
    /// Total number of pages.
    pub total_pages: u32,
    /// Current page number (1-indexed).
    pub page: u32,
    /// Number of items requested per page.
    pub per_page: u32,
    /// Whether there are more pages after this one.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from the raw envelope plus the request's paging args.
    #[must_use]
    pub fn from_envelope(envelope: ListEnvelope<T>, page: u32, per_page: u32) -> Self
    where
        T: serde::de::DeserializeOwned,
    {
        let has_more = envelope.pagination.next.is_some();
        Self {
            resources: envelope.resources,
            total_results: envelope.pagination.total_results,
            total_pages: envelope.pagination.total_pages,
            page,
            per_page,
            has_more,
        }
    }

    /// Map the resources to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            resources: self.resources.into_iter().map(f).collect(),
            total_results: self.total_results,
            total_pages: self.total_pages,
            page: self.page,
            per_page: self.per_page,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Returns the number of resources on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns an iterator over the resources in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.resources.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

/// Paging arguments accepted by every list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Number of results per page (max 5000).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Paging args for a specific page.
    #[must_use]
    pub fn for_page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }
}

/// Serialize a list filter (`names`, `guids`, ...) as a comma-separated
/// value, omitting the parameter entirely when the list is empty.
pub(crate) fn comma_separated<S>(values: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&values.join(","))
}

/// Skip-serializing predicate paired with [`comma_separated`].
pub(crate) fn is_empty_filter(values: &[String]) -> bool {
    values.is_empty()
}
