use scraper::{Html, Selector};
use serde_json::Value;

/// The JSON-LD objects embedded in a page, with top level arrays and `@graph`
/// containers flattened. Scripts that fail to parse are ignored.
#[derive(Debug, Clone, Default)]
pub struct JsonLd {
    objects: Vec<Value>,
}

impl JsonLd {
    pub fn from_document(document: &Html) -> Self {
        let mut objects = Vec::new();

        if let Ok(script_selector) = Selector::parse("script[type='application/ld+json']") {
            for script in document.select(&script_selector) {
                let text = script.text().collect::<String>();
                if let Ok(json) = serde_json::from_str::<Value>(text.trim()) {
                    flatten(json, &mut objects);
                }
            }
        }

        Self { objects }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn headline(&self) -> Option<String> {
        self.first_string("headline")
    }

    pub fn date_published(&self) -> Option<String> {
        self.first_string("datePublished")
            .or_else(|| self.first_string("dateCreated"))
    }

    /// Author names in declaration order from the first object that has any.
    pub fn authors(&self) -> Vec<String> {
        for object in &self.objects {
            let mut authors = Vec::new();
            if let Some(author) = object.get("author") {
                collect_names(author, &mut authors);
            }
            if !authors.is_empty() {
                return authors;
            }
        }
        Vec::new()
    }

    /// `keywords` may be a comma separated string or an array of strings.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords = Vec::new();
        for object in &self.objects {
            match object.get("keywords") {
                Some(Value::String(s)) => keywords.extend(split_keywords(s)),
                Some(Value::Array(arr)) => {
                    for item in arr {
                        if let Some(s) = item.as_str() {
                            keywords.extend(split_keywords(s));
                        }
                    }
                }
                _ => {}
            }
        }
        keywords
    }

    fn first_string(&self, field: &str) -> Option<String> {
        self.objects
            .iter()
            .filter_map(|o| o.get(field).and_then(|v| v.as_str()))
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
    }
}

fn flatten(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten(graph, out);
            }
            if !map.is_empty() {
                out.push(Value::Object(map));
            }
        }
        _ => {}
    }
}

fn collect_names(author: &Value, out: &mut Vec<String>) {
    match author {
        Value::Array(arr) => {
            for author_obj in arr {
                collect_names(author_obj, out);
            }
        }
        Value::Object(obj) => {
            if let Some(name) = obj.get("name").and_then(|n| n.as_str()) {
                push_name(name, out);
            }
        }
        Value::String(s) => push_name(s, out),
        _ => {}
    }
}

fn push_name(name: &str, out: &mut Vec<String>) {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if !name.is_empty() {
        out.push(name);
    }
}

fn split_keywords(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jsonld(body: &str) -> JsonLd {
        let html = format!(
            r#"<html><head><script type="application/ld+json">{}</script></head><body></body></html>"#,
            body
        );
        JsonLd::from_document(&Html::parse_document(&html))
    }

    #[test]
    fn test_authors_shapes() {
        let single = jsonld(r#"{"@type": "Article", "author": {"name": "Ada Lovelace"}}"#);
        assert_eq!(single.authors(), vec!["Ada Lovelace"]);

        let many = jsonld(r#"{"author": [{"name": "A"}, "B", {"@type": "Person"}]}"#);
        assert_eq!(many.authors(), vec!["A", "B"]);

        let plain = jsonld(r#"{"author": "  Grace   Hopper "}"#);
        assert_eq!(plain.authors(), vec!["Grace Hopper"]);
    }

    #[test]
    fn test_graph_is_flattened() {
        let data = jsonld(
            r#"{"@context": "https://schema.org", "@graph": [
                {"@type": "WebSite", "name": "Blog"},
                {"@type": "BlogPosting", "headline": "Inside", "datePublished": "2024-03-01T10:00:00Z", "keywords": "a, b"}
            ]}"#,
        );
        assert_eq!(data.headline().as_deref(), Some("Inside"));
        assert_eq!(data.date_published().as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(data.keywords(), vec!["a", "b"]);
    }

    #[test]
    fn test_keywords_array() {
        let data = jsonld(r#"{"keywords": ["supply chain", "npm, security", 3]}"#);
        assert_eq!(data.keywords(), vec!["supply chain", "npm", "security"]);
    }

    #[test]
    fn test_invalid_json_is_ignored() {
        let data = jsonld("{not json");
        assert!(data.is_empty());
        assert!(data.authors().is_empty());
        assert_eq!(data.date_published(), None);
    }
}
