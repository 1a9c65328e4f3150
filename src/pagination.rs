//! Pagination types for ETF2L API responses.
//!
//! The API paginates with two wire shapes: the Laravel pager
//! (`current_page`, `next_page_url`, ...) and the resource-collection shape
//! (`data`, `links.next`, `meta`). Both implement [`Paged`], the only thing
//! the pagination driver needs from a decoded page.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use url::Url;

use crate::error::{Etf2lError, Result};

/// Query parameter the API uses for the page number.
pub const PAGE_PARAM: &str = "page";

/// Base used to parse origin-relative paths.
const RELATIVE_BASE: &str = "http://relative.invalid";

/// Ordered query parameters.
///
/// List-valued parameters are written as repeated `key[]=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single parameter.
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a parameter if it is set.
    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append a list parameter as `key[]=a&key[]=b`.
    pub fn push_list<I, V>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let list_key = format!("{key}[]");
        for value in values {
            self.pairs.push((list_key.clone(), value.to_string()));
        }
        self
    }

    /// Look up the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// URL-encode the parameters, in insertion order.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Where one page fetch goes.
///
/// Never mutated. Following a cursor builds a new request whose path is
/// the cursor's path and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    path: String,
    query: Query,
    recursive: bool,
}

impl Request {
    /// A single-page request for an API-relative path (e.g. `/bans`).
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Query::default(),
            recursive: false,
        }
    }

    /// Attach filter parameters.
    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Follow next-page cursors until the last page.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Path plus encoded query string, ready to be joined onto the origin.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            let sep = if self.path.contains('?') { '&' } else { '?' };
            format!("{}{}{}", self.path, sep, self.query.encode())
        }
    }

    /// The request for `path`, which already carries its own query string.
    #[must_use]
    pub fn follow(&self, path: String) -> Self {
        Self {
            path,
            query: Query::default(),
            recursive: self.recursive,
        }
    }
}

/// What the cursor says about the page after this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Relative path and query of the next page.
    Path(String),
    /// Stop here.
    End,
}

/// Pager metadata common to both envelope shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// A decoded page the pagination driver can consume.
pub trait Paged: DeserializeOwned + Send {
    /// Record type carried by the page.
    type Item: Send;

    /// The envelope's own next-page pointer, if any.
    fn next_page_url(&self) -> Option<&str>;

    /// Pager metadata for this page.
    fn page_info(&self) -> PageInfo;

    /// This page's records, in wire order.
    fn into_items(self) -> Vec<Self::Item>;

    /// Relative path of the next page, or [`NextPage::End`].
    ///
    /// A non-recursive fetch always ends after its first page.
    fn next_path(&self, recursive: bool) -> Result<NextPage> {
        if !recursive {
            return Ok(NextPage::End);
        }
        match self.next_page_url() {
            None => Ok(NextPage::End),
            Some(url) => relative_path(url).map(NextPage::Path),
        }
    }
}

/// Strip scheme and host from an absolute URL, keeping path and query.
pub fn relative_path(raw: &str) -> Result<String> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) if raw.starts_with('/') => {
            return Ok(raw.to_string())
        }
        Err(e) => {
            return Err(Etf2lError::MalformedUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            })
        }
    };
    if url.cannot_be_a_base() {
        return Err(Etf2lError::MalformedUrl {
            url: raw.to_string(),
            reason: "not a hierarchical URL".to_string(),
        });
    }

    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

/// The path of the page after the one `path` points at.
///
/// Increments the `page` query parameter; a path without one is page 1.
pub fn skip_page(path: &str) -> Result<String> {
    let malformed = |reason: String| Etf2lError::MalformedUrl {
        url: path.to_string(),
        reason,
    };

    let base = Url::parse(RELATIVE_BASE).map_err(|e| malformed(e.to_string()))?;
    let url = base.join(path).map_err(|e| malformed(e.to_string()))?;

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    match pairs.iter_mut().find(|(k, _)| k == PAGE_PARAM) {
        Some((_, value)) => {
            let page: u32 = value
                .parse()
                .map_err(|_| malformed(format!("page number '{value}' is not an integer")))?;
            let next = page
                .checked_add(1)
                .ok_or_else(|| malformed(format!("page number {page} has no successor")))?;
            *value = next.to_string();
        }
        None => pairs.push((PAGE_PARAM.to_string(), "2".to_string())),
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();

    Ok(format!("{}?{}", url.path(), query))
}

/// One entry of a Laravel `links` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagerLink {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

/// Laravel length-aware pager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pager<T> {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current_page: u32,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub first_page_url: Option<String>,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub last_page: u32,
    #[serde(default)]
    pub last_page_url: Option<String>,
    #[serde(default = "Vec::new")]
    pub links: Vec<PagerLink>,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub per_page: u32,
    #[serde(default)]
    pub prev_page_url: Option<String>,
    #[serde(default)]
    pub to: Option<u64>,
    #[serde(default)]
    pub total: u64,
}

impl<T: DeserializeOwned + Send> Paged for Pager<T> {
    type Item = T;

    fn next_page_url(&self) -> Option<&str> {
        self.next_page_url.as_deref()
    }

    fn page_info(&self) -> PageInfo {
        PageInfo {
            current_page: self.current_page,
            last_page: self.last_page,
            per_page: self.per_page,
            total: self.total,
        }
    }

    fn into_items(self) -> Vec<T> {
        self.data
    }
}

/// `links` object of the resource-collection shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// `meta` object of the resource-collection shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub current_page: u32,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub last_page: u32,
    #[serde(default)]
    pub links: Vec<PagerLink>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub per_page: u32,
    #[serde(default)]
    pub to: Option<u64>,
    #[serde(default)]
    pub total: u64,
}

/// Resource collection: `{ data, links: { next, .. }, meta }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
    #[serde(default)]
    pub meta: PageMeta,
}

impl<T: DeserializeOwned + Send> Paged for LinkedPage<T> {
    type Item = T;

    fn next_page_url(&self) -> Option<&str> {
        self.links.next.as_deref()
    }

    fn page_info(&self) -> PageInfo {
        PageInfo {
            current_page: self.meta.current_page,
            last_page: self.meta.last_page,
            per_page: self.meta.per_page,
            total: self.meta.total,
        }
    }

    fn into_items(self) -> Vec<T> {
        self.data
    }
}

/// A single page of results with its pager metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number (1-indexed).
    pub page: u32,
    /// Last page number.
    pub last_page: u32,
    /// Number of items per page.
    pub per_page: u32,
    /// Whether there are more pages.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Take the records and metadata out of a decoded envelope.
    pub fn from_envelope<P: Paged<Item = T>>(envelope: P) -> Self {
        let info = envelope.page_info();
        let has_more = envelope.next_page_url().is_some();
        Self {
            items: envelope.into_items(),
            total: info.total,
            page: info.current_page,
            last_page: info.last_page,
            per_page: info.per_page,
            has_more,
        }
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            last_page: self.last_page,
            per_page: self.per_page,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Laravel echoes `per_page` back as a string when it came from the query.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> core::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u32),
        Str(String),
        Null(()),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(de::Error::custom),
        NumOrString::Null(()) => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pager(next: Option<&str>) -> Pager<u32> {
        serde_json::from_value(json!({
            "current_page": 1,
            "data": [1, 2, 3],
            "last_page": 2,
            "next_page_url": next,
            "per_page": 3,
            "total": 5
        }))
        .unwrap()
    }

    #[test]
    fn test_next_path_non_recursive_always_ends() {
        let page = pager(Some("https://api-v2.etf2l.org/bans?page=2"));
        assert_eq!(page.next_path(false).unwrap(), NextPage::End);
    }

    #[test]
    fn test_next_path_strips_origin() {
        let page = pager(Some("https://api-v2.etf2l.org/bans?page=2&status=active"));
        assert_eq!(
            page.next_path(true).unwrap(),
            NextPage::Path("/bans?page=2&status=active".to_string())
        );
    }

    #[test]
    fn test_next_path_null_ends() {
        let page = pager(None);
        assert_eq!(page.next_path(true).unwrap(), NextPage::End);
    }

    #[test]
    fn test_next_path_malformed() {
        let page = pager(Some("https://[not-a-host/bans?page=2"));
        assert!(matches!(
            page.next_path(true),
            Err(Etf2lError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_relative_path_passes_through_relative_input() {
        assert_eq!(relative_path("/bans?page=3").unwrap(), "/bans?page=3");
    }

    #[test]
    fn test_linked_page_uses_links_next() {
        let page: LinkedPage<u32> = serde_json::from_value(json!({
            "data": [7],
            "links": {
                "first": "https://api-v2.etf2l.org/team/2/transfers?page=1",
                "last": "https://api-v2.etf2l.org/team/2/transfers?page=4",
                "prev": null,
                "next": "https://api-v2.etf2l.org/team/2/transfers?page=2"
            },
            "meta": { "current_page": 1, "last_page": 4, "per_page": "20", "total": 70 }
        }))
        .unwrap();

        assert_eq!(
            page.next_path(true).unwrap(),
            NextPage::Path("/team/2/transfers?page=2".to_string())
        );
        let info = page.page_info();
        assert_eq!(info.per_page, 20);
        assert_eq!(info.last_page, 4);
        assert_eq!(page.into_items(), vec![7]);
    }

    #[test]
    fn test_skip_page_increments() {
        assert_eq!(
            skip_page("/bans?status=active&page=3").unwrap(),
            "/bans?status=active&page=4"
        );
    }

    #[test]
    fn test_skip_page_without_page_param_goes_to_two() {
        assert_eq!(skip_page("/bans").unwrap(), "/bans?page=2");
        assert_eq!(
            skip_page("/bans?reason=VAC").unwrap(),
            "/bans?reason=VAC&page=2"
        );
    }

    #[test]
    fn test_skip_page_rejects_garbage_page() {
        assert!(matches!(
            skip_page("/bans?page=abc"),
            Err(Etf2lError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_skip_page_rejects_last_representable_page() {
        assert!(matches!(
            skip_page("/bans?page=4294967295"),
            Err(Etf2lError::MalformedUrl { .. })
        ));
        assert_eq!(
            skip_page("/bans?page=4294967294").unwrap(),
            "/bans?page=4294967295"
        );
    }

    #[test]
    fn test_query_encoding_preserves_order_and_lists() {
        let mut query = Query::new();
        query
            .push("country", "Germany")
            .push_list("class", ["Scout", "Medic"])
            .push_opt::<u32>("user", None)
            .push_opt("type", Some("6v6"));

        assert_eq!(
            query.encode(),
            "country=Germany&class%5B%5D=Scout&class%5B%5D=Medic&type=6v6"
        );
        assert_eq!(query.get("type"), Some("6v6"));
        assert_eq!(query.len(), 4);
    }

    #[test]
    fn test_request_target_and_follow() {
        let mut query = Query::new();
        query.push("status", "active");
        let request = Request::new("/bans").with_query(query).recursive(true);

        assert_eq!(request.target(), "/bans?status=active");

        let next = request.follow("/bans?page=2&status=active".to_string());
        assert_eq!(next.target(), "/bans?page=2&status=active");
        assert!(next.is_recursive());
        assert!(next.query().is_empty());
    }

    #[test]
    fn test_page_from_envelope() {
        let page = Page::from_envelope(pager(Some("https://api-v2.etf2l.org/x?page=2")));
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total, 5);
        assert!(page.has_more);

        let doubled = page.map(|x| x * 2);
        assert_eq!(doubled.items, vec![2, 4, 6]);
        assert_eq!(doubled.page, 1);
    }
}
