use af_core::{ExtractedArticle, ExtractionError};
use tracing::debug;

use super::rules::{Boundary, ExtractionRules, Probe, SourceName};
use super::{utils, AdapterMetadata, ExtractContext, SourceAdapter};
use crate::normalizer::{BoilerplateRules, ContentNormalizer};

/// Posts from the Socket security blog (`socket.dev/blog/...`).
#[derive(Debug, Clone)]
pub struct SocketAdapter {
    normalizer: ContentNormalizer,
}

impl Default for SocketAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketAdapter {
    pub const NAME: &'static str = "socket";
    const HOSTS: &'static [&'static str] = &["socket.dev", "www.socket.dev"];
    const BLOG_PREFIX: &'static str = "/blog/";

    const RULES: ExtractionRules = ExtractionRules {
        adapter: Self::NAME,
        title: &[Probe::Meta("og:title"), Probe::Text("h1")],
        date: &[
            Probe::Meta("article:published_time"),
            Probe::Attr("time[datetime]", "datetime"),
            Probe::JsonLd,
        ],
        authors: &[
            Probe::JsonLd,
            Probe::Meta("author"),
            Probe::Text(".author-name"),
        ],
        body: &[
            ("div.prose", Boundary::Outer),
            ("article", Boundary::Inner),
            ("main", Boundary::Inner),
        ],
        source: SourceName::Fixed("Socket"),
        body_required: true,
        url_required: true,
    };

    const EXTRA_BOILERPLATE: &'static [&'static str] = &[
        ".related-posts",
        "[data-testid='related-posts']",
        ".newsletter-cta",
        ".author-card",
    ];

    pub fn new() -> Self {
        let rules = BoilerplateRules::default().extend(Self::EXTRA_BOILERPLATE);
        Self {
            normalizer: ContentNormalizer::new(rules),
        }
    }
}

impl SourceAdapter for SocketAdapter {
    fn metadata(&self) -> AdapterMetadata {
        AdapterMetadata {
            name: Self::NAME,
            description: "Socket security blog posts",
            priority: 80,
            match_patterns: vec!["socket.dev/blog/*"],
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        let Ok(parsed) = utils::parse_url(url) else {
            return false;
        };
        let host_matches = parsed
            .host_str()
            .map_or(false, |h| Self::HOSTS.iter().any(|known| h.eq_ignore_ascii_case(known)));
        host_matches
            && parsed.path().starts_with(Self::BLOG_PREFIX)
            && parsed.path().len() > Self::BLOG_PREFIX.len()
    }

    fn extract_with(
        &self,
        url: &str,
        html: &str,
        ctx: &ExtractContext,
    ) -> std::result::Result<ExtractedArticle, ExtractionError> {
        debug!("Extracting Socket post {}", url);
        Self::RULES.extract(&self.normalizer, url, html, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const POST: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta property="og:title" content="Malicious npm Packages Target Developers">
  <meta property="article:published_time" content="2024-06-12T14:00:00.000Z">
  <meta property="article:tag" content="npm">
  <meta property="article:tag" content="Malware">
  <script type="application/ld+json">
    {"@type": "BlogPosting", "author": [{"name": "Kirill Boychenko"}, {"name": "Socket Research Team"}]}
  </script>
</head>
<body>
  <header><a href="/">Socket</a></header>
  <main>
    <h1>Malicious npm Packages Target Developers</h1>
    <div class="prose">
      <p>Socket's threat research team found   several packages.</p>
      <div class="newsletter-cta"><p>Subscribe</p></div>
      <p>Indicators of compromise follow.</p>
    </div>
    <section class="related-posts"><a href="/blog/other">Other</a></section>
  </main>
  <footer>© Socket</footer>
</body>
</html>"#;

    #[test]
    fn test_can_handle() {
        let adapter = SocketAdapter::new();
        assert!(adapter.can_handle("https://socket.dev/blog/malicious-npm-packages"));
        assert!(adapter.can_handle("https://www.socket.dev/blog/post?ref=x"));
        assert!(!adapter.can_handle("https://socket.dev/blog/"));
        assert!(!adapter.can_handle("https://socket.dev/npm/package/left-pad"));
        assert!(!adapter.can_handle("https://notsocket.dev/blog/post"));
        assert!(!adapter.can_handle("not a url"));
    }

    #[test]
    fn test_extract_post() {
        let adapter = SocketAdapter::new();
        let article = adapter
            .extract("https://socket.dev/blog/malicious-npm-packages", POST)
            .unwrap();

        assert_eq!(article.title, "Malicious npm Packages Target Developers");
        assert_eq!(article.date, NaiveDate::from_ymd_opt(2024, 6, 12).unwrap());
        assert_eq!(article.source, "Socket");
        assert_eq!(article.authors, vec!["Kirill Boychenko", "Socket Research Team"]);
        assert_eq!(
            article.tags.iter().cloned().collect::<Vec<_>>(),
            vec!["Malware", "npm"]
        );
        assert_eq!(
            article.html,
            r#"<div class="prose"><p>Socket's threat research team found several packages.</p><p>Indicators of compromise follow.</p></div>"#
        );
    }

    #[test]
    fn test_missing_body_fails() {
        let adapter = SocketAdapter::new();
        let html = r#"<html><head><meta property="og:title" content="T">
            <meta property="article:published_time" content="2024-01-01"></head><body></body></html>"#;
        assert_eq!(
            adapter.extract("https://socket.dev/blog/t", html),
            Err(ExtractionError::EmptyBody)
        );
    }
}
