use chrono::NaiveDate;
use url::Url;

use af_core::{ExtractedArticle, ExtractionError};

pub mod dates;
pub mod generic;
pub mod jsonld;
pub(crate) mod rules;
pub mod socket;
pub mod substack;

pub use generic::GenericAdapter;
pub use socket::SocketAdapter;
pub use substack::SubstackAdapter;

/// Static description of an adapter, used for listing and selection traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterMetadata {
    pub name: &'static str,
    pub description: &'static str,
    /// Higher is more specific. Only informational: dispatch follows registration order.
    pub priority: u8,
    pub match_patterns: Vec<&'static str>,
}

/// Per-run knobs an adapter honours while extracting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractContext {
    /// Used in place of a date that cannot be found in the page.
    pub fallback_date: Option<NaiveDate>,
}

impl ExtractContext {
    pub fn with_fallback_date(date: NaiveDate) -> Self {
        Self {
            fallback_date: Some(date),
        }
    }
}

pub trait SourceAdapter: Send + Sync {
    fn metadata(&self) -> AdapterMetadata;

    fn name(&self) -> &'static str {
        self.metadata().name
    }

    /// Returns true if this adapter knows how to read pages from `url`
    fn can_handle(&self, url: &str) -> bool;

    fn extract_with(
        &self,
        url: &str,
        html: &str,
        ctx: &ExtractContext,
    ) -> std::result::Result<ExtractedArticle, ExtractionError>;

    fn extract(
        &self,
        url: &str,
        html: &str,
    ) -> std::result::Result<ExtractedArticle, ExtractionError> {
        self.extract_with(url, html, &ExtractContext::default())
    }
}

/// Every adapter the crate ships with.
#[derive(Debug, Clone)]
pub enum AdapterKind {
    Socket(SocketAdapter),
    Substack(SubstackAdapter),
    Generic(GenericAdapter),
}

impl AdapterKind {
    pub fn socket() -> Self {
        AdapterKind::Socket(SocketAdapter::new())
    }

    pub fn substack() -> Self {
        AdapterKind::Substack(SubstackAdapter::new())
    }

    pub fn generic() -> Self {
        AdapterKind::Generic(GenericAdapter::new())
    }

    /// The builtin set, most specific first.
    pub fn builtin() -> Vec<AdapterKind> {
        vec![Self::socket(), Self::substack(), Self::generic()]
    }
}

impl SourceAdapter for AdapterKind {
    fn metadata(&self) -> AdapterMetadata {
        match self {
            AdapterKind::Socket(a) => a.metadata(),
            AdapterKind::Substack(a) => a.metadata(),
            AdapterKind::Generic(a) => a.metadata(),
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        match self {
            AdapterKind::Socket(a) => a.can_handle(url),
            AdapterKind::Substack(a) => a.can_handle(url),
            AdapterKind::Generic(a) => a.can_handle(url),
        }
    }

    fn extract_with(
        &self,
        url: &str,
        html: &str,
        ctx: &ExtractContext,
    ) -> std::result::Result<ExtractedArticle, ExtractionError> {
        match self {
            AdapterKind::Socket(a) => a.extract_with(url, html, ctx),
            AdapterKind::Substack(a) => a.extract_with(url, html, ctx),
            AdapterKind::Generic(a) => a.extract_with(url, html, ctx),
        }
    }
}

/// Common utilities for adapters
pub(crate) mod utils {
    use super::*;
    use scraper::{ElementRef, Html, Selector};
    use tracing::warn;

    pub fn parse_url(url: &str) -> std::result::Result<Url, ExtractionError> {
        Url::parse(url.trim()).map_err(|e| ExtractionError::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// `url` with its fragment removed.
    pub fn canonical_url(url: &str) -> std::result::Result<String, ExtractionError> {
        let mut parsed = parse_url(url)?;
        parsed.set_fragment(None);
        Ok(parsed.to_string())
    }

    /// `url` trimmed and cut at its first `#`, for strings that are not URLs.
    pub fn strip_fragment(url: &str) -> String {
        let url = url.trim();
        url.split('#').next().unwrap_or(url).to_string()
    }

    pub fn host(url: &str) -> Option<String> {
        Url::parse(url.trim())
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    }

    pub fn selector(css: &str) -> Option<Selector> {
        match Selector::parse(css) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("Invalid selector {:?}: {:?}", css, e);
                None
            }
        }
    }

    pub fn element_text(element: ElementRef) -> String {
        collapse_whitespace(&element.text().collect::<String>())
    }

    pub fn first_text(document: &Html, css: &str) -> Option<String> {
        let selector = selector(css)?;
        document
            .select(&selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    }

    pub fn all_texts(document: &Html, css: &str) -> Vec<String> {
        let Some(selector) = selector(css) else {
            return Vec::new();
        };
        document
            .select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect()
    }

    pub fn all_attrs(document: &Html, css: &str, attr: &str) -> Vec<String> {
        let Some(selector) = selector(css) else {
            return Vec::new();
        };
        document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(collapse_whitespace)
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Contents of every `<meta>` whose `property`, `name` or `itemprop` equals
    /// `key`, compared case-insensitively.
    pub fn meta_contents(document: &Html, key: &str) -> Vec<String> {
        let Some(selector) = selector("meta[content]") else {
            return Vec::new();
        };
        document
            .select(&selector)
            .filter(|el| {
                ["property", "name", "itemprop"].iter().any(|attr| {
                    el.value()
                        .attr(attr)
                        .map_or(false, |v| v.trim().eq_ignore_ascii_case(key))
                })
            })
            .filter_map(|el| el.value().attr("content"))
            .map(collapse_whitespace)
            .filter(|value| !value.is_empty())
            .collect()
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Drops repeated values, keeping the first occurrence.
    pub fn dedupe(values: Vec<String>) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        values
            .into_iter()
            .filter(|v| seen.insert(v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::utils;
    use scraper::Html;

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(matches!(
            utils::parse_url("invalid-url"),
            Err(ExtractionError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_canonical_url_drops_fragment() {
        assert_eq!(
            utils::canonical_url("https://example.com/post?id=1#comments").unwrap(),
            "https://example.com/post?id=1"
        );
    }

    #[test]
    fn test_first_text() {
        let html = r#"
            <div class="title">  Test
                Title </div>
            <div class="content">Test Content</div>
        "#;
        let document = Html::parse_document(html);

        assert_eq!(utils::first_text(&document, ".title").as_deref(), Some("Test Title"));
        assert_eq!(utils::first_text(&document, ".invalid"), None);
        assert_eq!(utils::first_text(&document, "[[["), None);
    }

    #[test]
    fn test_all_texts() {
        let html = r#"
            <div class="item">Item 1</div>
            <div class="item"> </div>
            <div class="item">Item 2</div>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(utils::all_texts(&document, ".item"), vec!["Item 1", "Item 2"]);
    }

    #[test]
    fn test_meta_contents_matches_property_and_name() {
        let html = r#"
            <meta property="og:title" content="From OG">
            <meta name="DC.date" content="2024-05-01">
            <meta property="article:tag" content="npm">
            <meta property="article:tag" content="security">
        "#;
        let document = Html::parse_document(html);
        assert_eq!(utils::meta_contents(&document, "og:title"), vec!["From OG"]);
        assert_eq!(utils::meta_contents(&document, "dc.date"), vec!["2024-05-01"]);
        assert_eq!(
            utils::meta_contents(&document, "article:tag"),
            vec!["npm", "security"]
        );
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let values = vec!["b", "a", "b", "c", "a"].into_iter().map(String::from).collect();
        assert_eq!(utils::dedupe(values), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_builtin_order() {
        let names: Vec<_> = AdapterKind::builtin().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["socket", "substack", "generic"]);
    }
}
