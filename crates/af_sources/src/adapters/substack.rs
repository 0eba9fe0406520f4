use af_core::{ExtractedArticle, ExtractionError};
use tracing::debug;

use super::rules::{Boundary, ExtractionRules, Probe, SourceName};
use super::{utils, AdapterMetadata, ExtractContext, SourceAdapter};
use crate::normalizer::{BoilerplateRules, ContentNormalizer};

/// Posts on any `<publication>.substack.com`.
#[derive(Debug, Clone)]
pub struct SubstackAdapter {
    normalizer: ContentNormalizer,
}

impl Default for SubstackAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SubstackAdapter {
    pub const NAME: &'static str = "substack";
    const HOST_SUFFIX: &'static str = ".substack.com";
    const POST_PREFIX: &'static str = "/p/";

    const RULES: ExtractionRules = ExtractionRules {
        adapter: Self::NAME,
        title: &[Probe::Text("h1.post-title"), Probe::Meta("og:title")],
        date: &[
            Probe::Attr("time[datetime]", "datetime"),
            Probe::JsonLd,
            Probe::Meta("article:published_time"),
        ],
        authors: &[Probe::JsonLd, Probe::Text(".byline-names a")],
        body: &[
            ("div.available-content", Boundary::Inner),
            ("div.body.markup", Boundary::Inner),
        ],
        source: SourceName::SiteNameOr("Substack"),
        body_required: true,
        url_required: true,
    };

    const EXTRA_BOILERPLATE: &'static [&'static str] = &[
        ".subscription-widget-wrap",
        ".subscribe-widget",
        ".post-footer",
        ".captioned-button-wrap",
    ];

    pub fn new() -> Self {
        let rules = BoilerplateRules::default().extend(Self::EXTRA_BOILERPLATE);
        Self {
            normalizer: ContentNormalizer::new(rules),
        }
    }
}

impl SourceAdapter for SubstackAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: Self::NAME,
            description: "Substack newsletter posts",
            priority: 60,
            match_patterns: vec!["*.substack.com/p/*"],
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        let Ok(parsed) = utils::parse_url(url) else {
            return false;
        };
        let Some(host) = parsed.host_str().map(|h| h.to_ascii_lowercase()) else {
            return false;
        };
        host.len() > Self::HOST_SUFFIX.len()
            && host.ends_with(Self::HOST_SUFFIX)
            && parsed.path().starts_with(Self::POST_PREFIX)
            && parsed.path().len() > Self::POST_PREFIX.len()
    }

    fn extract_with(
        &self,
        url: &str,
        html: &str,
        ctx: &ExtractContext,
    ) -> std::result::Result<ExtractedArticle, ExtractionError> {
        debug!("Extracting Substack post {}", url);
        Self::RULES.extract(&self.normalizer, url, html, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const POST: &str = r#"<html>
<head>
  <meta property="og:site_name" content="Risky Bulletin">
  <meta property="og:title" content="OG fallback title">
</head>
<body>
  <div class="post-header">
    <h1 class="post-title">Weekly   Roundup</h1>
    <div class="byline-names"><a href="/u/1">Catalin</a>, <a href="/u/2">Nick</a></div>
    <time datetime="2024-02-09T12:00:00+00:00">Feb 9</time>
  </div>
  <div class="available-content">
    <div class="body markup">
      <p>This week in security.</p>
      <div class="subscription-widget-wrap"><p>Subscribe now</p></div>
      <p>More news.</p>
    </div>
  </div>
  <div class="post-footer"><p>Share this post</p></div>
</body>
</html>"#;

    #[test]
    fn test_can_handle() {
        let adapter = SubstackAdapter::new();
        assert!(adapter.can_handle("https://riskybiznews.substack.com/p/weekly-roundup"));
        assert!(!adapter.can_handle("https://substack.com/p/weekly"));
        assert!(!adapter.can_handle("https://riskybiznews.substack.com/archive"));
        assert!(!adapter.can_handle("https://example.com/p/post"));
    }

    #[test]
    fn test_extract_post() {
        let adapter = SubstackAdapter::new();
        let article = adapter
            .extract("https://riskybiznews.substack.com/p/weekly-roundup", POST)
            .unwrap();

        assert_eq!(article.title, "Weekly Roundup");
        assert_eq!(article.date, NaiveDate::from_ymd_opt(2024, 2, 9).unwrap());
        assert_eq!(article.source, "Risky Bulletin");
        assert_eq!(article.authors, vec!["Catalin", "Nick"]);
        assert!(article.tags.is_empty());
        assert_eq!(
            article.html,
            r#"<div class="body markup"><p>This week in security.</p><p>More news.</p></div>"#
        );
    }

    #[test]
    fn test_source_defaults_to_substack() {
        let adapter = SubstackAdapter::new();
        let html = r#"<html><body><h1 class="post-title">T</h1><time datetime="2024-01-01"></time>
            <div class="available-content"><p>Body</p></div></body></html>"#;
        let article = adapter.extract("https://x.substack.com/p/t", html).unwrap();
        assert_eq!(article.source, "Substack");
    }
}
