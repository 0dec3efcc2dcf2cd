//! Table of contents entries and EPUB 3 nav document parsing.
//!
//! Only the `epub:type="toc"` section of the XHTML nav document is read;
//! page lists and landmarks are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::NavigatorError;

/// Bounds applied while parsing a nav document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TocLimits {
    /// Maximum number of entries across the whole tree.
    pub max_points: usize,
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Maximum UTF-8 byte length of a label.
    pub max_label_bytes: usize,
    /// Maximum UTF-8 byte length of an href.
    pub max_href_bytes: usize,
}

impl Default for TocLimits {
    fn default() -> Self {
        Self {
            max_points: 4096,
            max_depth: 64,
            max_label_bytes: 4096,
            max_href_bytes: 4096,
        }
    }
}

/// One table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavPoint {
    /// Display label.
    pub label: String,
    /// Publication-relative href, possibly with a fragment.
    pub href: String,
    /// Nested entries.
    pub children: Vec<NavPoint>,
}

impl NavPoint {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            children: Vec::new(),
        }
    }
}

/// Count entries recursively.
pub fn toc_count(points: &[NavPoint]) -> usize {
    points.iter().map(|p| 1 + toc_count(&p.children)).sum()
}

/// Flatten entries into `(depth, point)` pairs in reading order.
pub fn toc_flat(points: &[NavPoint]) -> Vec<(usize, &NavPoint)> {
    fn walk<'a>(points: &'a [NavPoint], depth: usize, out: &mut Vec<(usize, &'a NavPoint)>) {
        for point in points {
            out.push((depth, point));
            walk(&point.children, depth + 1, out);
        }
    }
    let mut out = Vec::with_capacity(8);
    walk(points, 0, &mut out);
    out
}

#[derive(Default)]
struct OpenEntry {
    href: Option<String>,
    label: Option<String>,
    children: Vec<NavPoint>,
}

impl OpenEntry {
    fn close(self) -> Option<NavPoint> {
        match (self.href, self.label) {
            (Some(href), Some(label)) => Some(NavPoint {
                label,
                href,
                children: self.children,
            }),
            _ => None,
        }
    }
}

fn limit_error(what: &str, actual: usize, limit: usize) -> NavigatorError {
    NavigatorError::Toc(format!("{} exceeds limit ({} > {})", what, actual, limit))
}

fn is_toc_nav(reader: &Reader<&[u8]>, element: &BytesStart<'_>) -> bool {
    element.attributes().flatten().any(|attr| {
        let key = attr.key.as_ref();
        (key == b"epub:type" || key.ends_with(b":type"))
            && reader
                .decoder()
                .decode(attr.value.as_ref())
                .map(|value| value.split_whitespace().any(|token| token == "toc"))
                .unwrap_or(false)
    })
}

fn anchor_href(
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
    limits: &TocLimits,
) -> Result<Option<String>, NavigatorError> {
    for attr in element.attributes().flatten() {
        if attr.key.as_ref() == b"href" {
            let href = reader
                .decoder()
                .decode(attr.value.as_ref())
                .unwrap_or_default();
            if href.len() > limits.max_href_bytes {
                return Err(limit_error("href", href.len(), limits.max_href_bytes));
            }
            return Ok(Some(href.into_owned()));
        }
    }
    Ok(None)
}

/// Parse the TOC of an EPUB 3 XHTML nav document.
pub fn parse_nav_xhtml(content: &[u8]) -> Result<Vec<NavPoint>, NavigatorError> {
    parse_nav_xhtml_with_limits(content, TocLimits::default())
}

/// Parse the TOC of an EPUB 3 XHTML nav document with explicit limits.
pub fn parse_nav_xhtml_with_limits(
    content: &[u8],
    limits: TocLimits,
) -> Result<Vec<NavPoint>, NavigatorError> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::with_capacity(64);
    let mut toc = Vec::new();
    let mut in_toc = false;
    let mut nav_depth = 0usize;
    let mut stack: Vec<OpenEntry> = Vec::with_capacity(8);
    let mut in_anchor = false;
    let mut points = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"nav" => {
                    if in_toc {
                        nav_depth += 1;
                    } else if is_toc_nav(&reader, &e) {
                        in_toc = true;
                        nav_depth = 0;
                    }
                }
                b"li" if in_toc => {
                    if stack.len() >= limits.max_depth {
                        return Err(limit_error("depth", stack.len() + 1, limits.max_depth));
                    }
                    stack.push(OpenEntry::default());
                }
                b"a" if in_toc => {
                    in_anchor = true;
                    let href = anchor_href(&reader, &e, &limits)?;
                    if let (Some(href), Some(entry)) = (href, stack.last_mut()) {
                        entry.href = Some(href);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if in_toc && e.name().as_ref() == b"a" => {
                let href = anchor_href(&reader, &e, &limits)?;
                if let (Some(href), Some(entry)) = (href, stack.last_mut()) {
                    entry.href = Some(href);
                }
            }
            Ok(Event::Text(e)) if in_toc && in_anchor => {
                let text = reader.decoder().decode(&e).unwrap_or_default();
                if let Some(entry) = stack.last_mut() {
                    let label = entry.label.get_or_insert_with(String::new);
                    if !label.is_empty() && !label.ends_with(' ') && !text.starts_with(' ') {
                        label.push(' ');
                    }
                    label.push_str(text.as_ref());
                    if label.len() > limits.max_label_bytes {
                        return Err(limit_error("label", label.len(), limits.max_label_bytes));
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"a" => in_anchor = false,
                b"li" if in_toc => {
                    if let Some(point) = stack.pop().and_then(OpenEntry::close) {
                        points += 1;
                        if points > limits.max_points {
                            return Err(limit_error("entry count", points, limits.max_points));
                        }
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(point),
                            None => toc.push(point),
                        }
                    }
                }
                b"nav" if in_toc => {
                    if nav_depth == 0 {
                        in_toc = false;
                        stack.clear();
                    } else {
                        nav_depth -= 1;
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(NavigatorError::Toc(format!(
                    "nav XML parse error: {:?}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    log::debug!("parsed {} table of contents entries", points);
    Ok(toc)
}
