use af_core::{Article, RenderError};
use serde::Serialize;

const DELIMITER: &str = "---\n";

/// Metadata block. Field order here is the order keys appear in output.
#[derive(Debug, Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    date: String,
    slug: &'a str,
    canonical_url: &'a str,
    source: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authors: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<&'a str>,
}

impl<'a> FrontMatter<'a> {
    fn from_article(article: &'a Article) -> Self {
        Self {
            title: article.title(),
            date: article.date_string(),
            slug: article.slug(),
            canonical_url: article.canonical_url(),
            source: article.source(),
            authors: article.authors().iter().map(String::as_str).collect(),
            tags: article.tags().iter().map(String::as_str).collect(),
        }
    }
}

/// Renders articles as Jekyll posts: a YAML front matter block followed by
/// the body markup. Output only depends on the article.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRenderer;

impl DocumentRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, article: &Article) -> Result<Vec<u8>, RenderError> {
        self.render_to_string(article).map(String::into_bytes)
    }

    pub fn render_to_string(&self, article: &Article) -> Result<String, RenderError> {
        check_encodable(article)?;

        let front_matter = serde_yaml::to_string(&FrontMatter::from_article(article))
            .map_err(|e| RenderError::Serialization(e.to_string()))?;
        let front_matter = normalize_newlines(&front_matter);
        let body = normalize_newlines(article.html());
        let body = body.trim_end_matches('\n');

        let mut out = String::with_capacity(front_matter.len() + body.len() + 16);
        out.push_str(DELIMITER);
        out.push_str(&front_matter);
        if !front_matter.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push_str(body);
        out.push('\n');
        Ok(out)
    }

    pub fn filename(&self, article: &Article) -> String {
        article.filename()
    }
}

fn check_encodable(article: &Article) -> Result<(), RenderError> {
    let fields: [(&'static str, &str); 5] = [
        ("title", article.title()),
        ("slug", article.slug()),
        ("canonical_url", article.canonical_url()),
        ("source", article.source()),
        ("html", article.html()),
    ];
    for (field, value) in fields {
        if has_control_chars(value) {
            return Err(RenderError::Unencodable { field });
        }
    }
    if article.authors().iter().any(|a| has_control_chars(a)) {
        return Err(RenderError::Unencodable { field: "authors" });
    }
    if article.tags().iter().any(|t| has_control_chars(t)) {
        return Err(RenderError::Unencodable { field: "tags" });
    }
    Ok(())
}

fn has_control_chars(value: &str) -> bool {
    value
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\t' | '\r'))
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::ExtractedArticle;
    use chrono::NaiveDate;
    use serde_yaml::{Mapping, Value};

    fn article(html: &str, authors: &[&str], tags: &[&str]) -> Article {
        ExtractedArticle {
            title: "Hello".to_string(),
            date: chrono_date(),
            canonical_url: "https://example.com/hello".to_string(),
            source: "example.com".to_string(),
            html: html.to_string(),
            authors: authors.iter().map(|s| s.to_string()).collect(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
        }
        .into_article("2024-01-01-hello".to_string())
    }

    fn chrono_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn split(rendered: &str) -> (Mapping, String) {
        let rest = rendered.strip_prefix("---\n").expect("opening delimiter");
        let end = rest.find("\n---\n").expect("closing delimiter");
        let meta: Mapping = serde_yaml::from_str(&rest[..end]).unwrap();
        (meta, rest[end + 5..].to_string())
    }

    fn keys(meta: &Mapping) -> Vec<String> {
        meta.keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_render_structure() {
        let renderer = DocumentRenderer::new();
        let rendered = renderer
            .render_to_string(&article("<p>World</p>", &["Ann", "Bob"], &["rust", "npm"]))
            .unwrap();

        assert!(rendered.starts_with("---\ntitle: Hello\n"));
        let (meta, body) = split(&rendered);
        assert_eq!(
            keys(&meta),
            vec!["title", "date", "slug", "canonical_url", "source", "authors", "tags"]
        );
        assert_eq!(meta.get("date").unwrap(), &Value::String("2024-01-01".to_string()));
        assert_eq!(meta.get("slug").unwrap(), &Value::String("2024-01-01-hello".to_string()));
        assert_eq!(
            meta.get("tags").unwrap(),
            &Value::Sequence(vec![Value::from("npm"), Value::from("rust")])
        );
        assert_eq!(body, "<p>World</p>\n");
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let rendered = DocumentRenderer::new()
            .render_to_string(&article("<p>World</p>", &[], &[]))
            .unwrap();
        let (meta, _) = split(&rendered);
        assert_eq!(keys(&meta), vec!["title", "date", "slug", "canonical_url", "source"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = DocumentRenderer::new();
        let article = article("<p>World</p>", &["Ann"], &["b", "a"]);
        let first = renderer.render(&article).unwrap();
        for _ in 0..10 {
            assert_eq!(renderer.render(&article).unwrap(), first);
        }
    }

    #[test]
    fn test_newlines_are_normalized() {
        let rendered = DocumentRenderer::new()
            .render_to_string(&article("<p>a</p>\r\n<p>b</p>\r<p>c</p>\n\n", &[], &[]))
            .unwrap();
        assert!(!rendered.contains('\r'));
        assert!(rendered.ends_with("---\n<p>a</p>\n<p>b</p>\n<p>c</p>\n"));
    }

    #[test]
    fn test_control_characters_are_rejected() {
        let err = DocumentRenderer::new()
            .render(&article("<p>bad\u{0}</p>", &[], &[]))
            .unwrap_err();
        assert_eq!(err, RenderError::Unencodable { field: "html" });

        let err = DocumentRenderer::new()
            .render(&article("<p>ok</p>", &["A\u{7}"], &[]))
            .unwrap_err();
        assert_eq!(err, RenderError::Unencodable { field: "authors" });
    }

    #[test]
    fn test_filename() {
        let renderer = DocumentRenderer::new();
        assert_eq!(
            renderer.filename(&article("<p>x</p>", &[], &[])),
            "2024-01-01-hello.html"
        );
    }
}
