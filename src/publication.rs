//! The publication collaborator: spine, identity, base URL and TOC.

use crate::error::NavigatorError;
use crate::link::{split_href_fragment, BaseUrl};
use crate::toc::{parse_nav_xhtml_with_limits, NavPoint, TocLimits};

/// One entry of the reading order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpineItem {
    /// Position in the spine (0-based).
    pub index: usize,
    /// Href relative to the publication base URL.
    pub href: String,
}

/// Loaded publication, immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Publication {
    identifier: String,
    base_url: BaseUrl,
    spine: Vec<SpineItem>,
    toc: Vec<NavPoint>,
}

impl Publication {
    /// Build a publication from its identifier, base URL and spine hrefs.
    ///
    /// # Errors
    ///
    /// Fails on an empty spine or a base URL that is not `scheme://host/...`.
    pub fn new<I, S>(
        identifier: impl Into<String>,
        base_url: &str,
        hrefs: I,
    ) -> Result<Self, NavigatorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let base_url =
            BaseUrl::parse(base_url).ok_or_else(|| NavigatorError::InvalidBaseUrl(base_url.into()))?;
        let spine: Vec<SpineItem> = hrefs
            .into_iter()
            .enumerate()
            .map(|(index, href)| SpineItem {
                index,
                href: href.into(),
            })
            .collect();
        if spine.is_empty() {
            return Err(NavigatorError::EmptySpine);
        }
        Ok(Self {
            identifier: identifier.into(),
            base_url,
            spine,
            toc: Vec::new(),
        })
    }

    /// Attach an already-built table of contents.
    pub fn with_toc(mut self, toc: Vec<NavPoint>) -> Self {
        self.toc = toc;
        self
    }

    /// Attach the table of contents parsed from an EPUB 3 nav document.
    ///
    /// # Errors
    ///
    /// Propagates nav parsing failures.
    pub fn with_nav_document(self, nav_xhtml: &[u8]) -> Result<Self, NavigatorError> {
        self.with_nav_document_limits(nav_xhtml, TocLimits::default())
    }

    /// Same as [`Publication::with_nav_document`] with explicit limits.
    ///
    /// # Errors
    ///
    /// Propagates nav parsing failures.
    pub fn with_nav_document_limits(
        self,
        nav_xhtml: &[u8],
        limits: TocLimits,
    ) -> Result<Self, NavigatorError> {
        let toc = parse_nav_xhtml_with_limits(nav_xhtml, limits)?;
        Ok(self.with_toc(toc))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn spine(&self) -> &[SpineItem] {
        &self.spine
    }

    pub fn table_of_contents(&self) -> &[NavPoint] {
        &self.toc
    }

    /// Number of spine items (always at least 1).
    pub fn len(&self) -> usize {
        self.spine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spine.is_empty()
    }

    /// Absolute URL of the spine item at `index`.
    pub fn url_for(&self, index: usize) -> Option<String> {
        self.spine
            .get(index)
            .map(|item| self.base_url.join(&item.href))
    }

    /// Resolve an href (with optional `#fragment`) to a spine index and the
    /// fragment to seek to.
    ///
    /// The first spine item whose href contains the fragment-less href wins.
    pub fn resolve_href<'a>(&self, href: &'a str) -> Option<(usize, Option<&'a str>)> {
        let (path, fragment) = split_href_fragment(href.trim());
        if path.is_empty() {
            return None;
        }
        self.spine
            .iter()
            .find(|item| item.href.contains(path))
            .map(|item| (item.index, fragment))
    }
}
