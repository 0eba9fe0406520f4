use af_core::{ExtractedArticle, ExtractionError};
use tracing::debug;

use super::rules::{Boundary, ExtractionRules, Probe, SourceName};
use super::{AdapterMetadata, ExtractContext, SourceAdapter};
use crate::normalizer::ContentNormalizer;

/// Fallback for any page. Register it last.
#[derive(Debug, Clone, Default)]
pub struct GenericAdapter {
    normalizer: ContentNormalizer,
}

impl GenericAdapter {
    pub const NAME: &'static str = "generic";

    const RULES: ExtractionRules = ExtractionRules {
        adapter: Self::NAME,
        title: &[Probe::Meta("og:title"), Probe::Text("title"), Probe::Text("h1")],
        date: &[
            Probe::Meta("article:published_time"),
            Probe::Meta("date"),
            Probe::Meta("dc.date"),
            Probe::Meta("pubdate"),
            Probe::Attr("time[datetime]", "datetime"),
            Probe::JsonLd,
            Probe::BodyText,
        ],
        authors: &[Probe::JsonLd, Probe::Meta("author")],
        body: &[
            ("article", Boundary::Inner),
            ("main", Boundary::Inner),
            ("body", Boundary::Inner),
        ],
        source: SourceName::SiteNameOrHost,
        body_required: false,
        url_required: false,
    };

    pub fn new() -> Self {
        Self {
            normalizer: ContentNormalizer::default(),
        }
    }
}

impl SourceAdapter for GenericAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: Self::NAME,
            description: "Best-effort extraction for any page",
            priority: 10,
            match_patterns: vec!["*"],
        }
    }

    fn can_handle(&self, _url: &str) -> bool {
        true
    }

    fn extract_with(
        &self,
        url: &str,
        html: &str,
        ctx: &ExtractContext,
    ) -> std::result::Result<ExtractedArticle, ExtractionError> {
        debug!("Extracting generic page {}", url);
        Self::RULES.extract(&self.normalizer, url, html, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_handles_everything() {
        let adapter = GenericAdapter::new();
        assert!(adapter.can_handle("https://example.com/anything"));
        assert!(adapter.can_handle("not even a url"));
    }

    #[test]
    fn test_hello_world() {
        let adapter = GenericAdapter::new();
        let html = "<html><title>Hello</title><body><nav>skip</nav><p>World</p></body></html>";
        let article = adapter
            .extract_with(
                "https://example.com/hello",
                html,
                &ExtractContext::with_fallback_date(date()),
            )
            .unwrap();
        assert_eq!(article.title, "Hello");
        assert_eq!(article.date, date());
        assert_eq!(article.html, "<p>World</p>");
        assert_eq!(article.source, "example.com");
        assert!(article.authors.is_empty());
    }

    #[test]
    fn test_missing_date_is_the_only_failure() {
        let adapter = GenericAdapter::new();
        let html = "<html><title>Hello</title><body><p>World</p></body></html>";
        assert_eq!(
            adapter.extract("https://example.com/hello", html),
            Err(ExtractionError::MissingDate)
        );
    }

    #[test]
    fn test_empty_body_is_allowed() {
        let adapter = GenericAdapter::new();
        let html = r#"<html><head><title>Empty</title><meta name="date" content="2022-10-10"></head><body></body></html>"#;
        let article = adapter.extract("https://example.com/e", html).unwrap();
        assert_eq!(article.html, "");
        assert_eq!(article.date, NaiveDate::from_ymd_opt(2022, 10, 10).unwrap());
    }

    #[test]
    fn test_metadata_sources() {
        let adapter = GenericAdapter::new();
        let html = r#"<html><head>
            <title>Doc title</title>
            <meta property="og:title" content="Social title">
            <meta property="og:site_name" content="Example News">
            <meta name="author" content="Jo Writer">
            <meta property="article:tag" content="rust">
            <script type="application/ld+json">{"keywords": "supply chain, rust"}</script>
        </head><body>
            <nav>Menu</nav>
            <article><p>Published on 12 May 2021 by Jo.</p></article>
        </body></html>"#;
        let article = adapter.extract("https://www.example.com/story", html).unwrap();
        assert_eq!(article.title, "Social title");
        assert_eq!(article.source, "Example News");
        assert_eq!(article.authors, vec!["Jo Writer"]);
        assert_eq!(article.date, NaiveDate::from_ymd_opt(2021, 5, 12).unwrap());
        assert_eq!(
            article.tags.into_iter().collect::<Vec<_>>(),
            vec!["rust", "supply chain"]
        );
        assert_eq!(article.html, "<p>Published on 12 May 2021 by Jo.</p>");
    }

    #[test]
    fn test_script_dates_are_not_publication_dates() {
        let html = r#"<html><title>Build notes</title><body>
            <script>window.build="2019-12-31";</script>
            <nav>Archive 2020-02-02</nav>
            <p>Posted on June 7, 2023</p>
        </body></html>"#;
        let article = GenericAdapter::new().extract("https://example.com/notes", html).unwrap();
        assert_eq!(article.date, NaiveDate::from_ymd_opt(2023, 6, 7).unwrap());
        assert_eq!(article.html, "<p>Posted on June 7, 2023</p>");
    }

    #[test]
    fn test_relative_url_still_extracts() {
        let html = "<html><title>Hello</title><body><p>World</p></body></html>";
        let article = GenericAdapter::new()
            .extract_with("notes/hello.html", html, &ExtractContext::with_fallback_date(date()))
            .unwrap();
        assert_eq!(article.title, "Hello");
        assert_eq!(article.canonical_url, "notes/hello.html");
        assert_eq!(article.source, "generic");
    }

    #[test]
    fn test_title_inside_body_is_not_kept_in_html() {
        let html = "<html><body><title>Hello</title><p>World</p></body></html>";
        let article = GenericAdapter::new()
            .extract_with("https://example.com/", html, &ExtractContext::with_fallback_date(date()))
            .unwrap();
        assert_eq!(article.title, "Hello");
        assert_eq!(article.html, "<p>World</p>");
    }

    #[test]
    fn test_host_without_www() {
        let adapter = GenericAdapter::new();
        let html = "<html><title>T</title><body><time datetime='2020-02-02'>x</time><p>B</p></body></html>";
        let article = adapter.extract("https://www.blog.example/t", html).unwrap();
        assert_eq!(article.source, "blog.example");
    }
}
