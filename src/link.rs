//! Link classification for taps inside the embedded renderer.

/// Where a tapped link should go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// Same host as the publication: an href relative to the base URL.
    Internal(String),
    /// Web link to hand to an external browser.
    External(String),
    /// Anything else; navigation is dropped.
    Unhandled,
}

/// Publication base URL used to resolve internal links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    raw: String,
    scheme: String,
    host: String,
}

impl BaseUrl {
    /// Parse an absolute `scheme://host/...` URL.
    pub fn parse(url: &str) -> Option<Self> {
        let (scheme, host, _) = split_url(url)?;
        if host.is_empty() {
            return None;
        }
        Some(Self {
            raw: url.into(),
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_ascii_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Absolute URL for an href relative to this base.
    pub fn join(&self, href: &str) -> String {
        if split_url(href).is_some() {
            return href.into();
        }
        let href = href.trim_start_matches('/');
        match self.raw.rfind('/') {
            Some(pos) if pos + 1 > self.scheme.len() + 3 => {
                let mut out = String::with_capacity(pos + 1 + href.len());
                out.push_str(&self.raw[..=pos]);
                out.push_str(href);
                out
            }
            _ => {
                let mut out = String::with_capacity(self.raw.len() + 1 + href.len());
                out.push_str(&self.raw);
                out.push('/');
                out.push_str(href);
                out
            }
        }
    }

    /// Classify a navigation target.
    pub fn classify(&self, url: &str) -> LinkTarget {
        let Some((scheme, host, rest)) = split_url(url) else {
            return LinkTarget::Unhandled;
        };
        if host.eq_ignore_ascii_case(&self.host) {
            let href = match url.strip_prefix(self.raw.as_str()) {
                Some(relative)
                    if self.raw.ends_with('/')
                        || relative.is_empty()
                        || relative.starts_with(['/', '?', '#']) =>
                {
                    relative
                }
                _ => rest,
            };
            let href = href.trim_start_matches('/');
            if href.is_empty() {
                return LinkTarget::Unhandled;
            }
            return LinkTarget::Internal(href.into());
        }
        if scheme.to_ascii_lowercase().contains("http") {
            return LinkTarget::External(url.into());
        }
        LinkTarget::Unhandled
    }
}

/// Split `scheme://host/rest` into its three parts.
fn split_url(url: &str) -> Option<(&str, &str, &str)> {
    let (scheme, after) = url.split_once("://")?;
    if scheme.is_empty()
        || !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    {
        return None;
    }
    let end = after.find(['/', '?', '#']).unwrap_or(after.len());
    let authority = &after[..end];
    let host = authority.rsplit('@').next().unwrap_or(authority);
    Some((scheme, host, &after[end..]))
}

/// Split an href into its path and optional non-empty fragment.
pub fn split_href_fragment(href: &str) -> (&str, Option<&str>) {
    let (base, fragment) = match href.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (href, None),
    };
    let fragment = fragment.filter(|value| !value.is_empty());
    (base, fragment)
}
