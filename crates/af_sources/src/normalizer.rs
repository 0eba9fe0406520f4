//! Boilerplate removal and whitespace normalization for article bodies.
//!
//! What counts as boilerplate is plain data ([`BoilerplateRules`]): tag names,
//! ARIA roles, class/id marker words and optional CSS selectors. Nothing here
//! knows about any particular site; adapters that need more pass their own
//! selectors through [`BoilerplateRules::extend`].

use ego_tree::NodeId;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

const DEFAULT_TAGS: &[&str] = &[
    "nav", "footer", "header", "aside", "script", "style", "noscript", "iframe", "form",
    "template", "svg", "button", "title", "meta", "link", "base",
];

const DEFAULT_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "complementary", "search"];

const DEFAULT_MARKERS: &[&str] = &[
    "newsletter",
    "subscribe",
    "subscription",
    "advert",
    "ad-slot",
    "ads",
    "sponsor",
    "promo",
    "cookie",
    "share",
    "social",
    "breadcrumb",
    "sidebar",
    "paywall",
];

/// Whitespace inside these is kept verbatim.
const PRESERVE_WHITESPACE: &[&str] = &["pre", "code", "textarea"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "details", "div", "dl", "dt", "figcaption",
    "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Blocks dropped when they end up with no text and no media.
const BLANKABLE_TAGS: &[&str] = &[
    "p", "div", "section", "span", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol",
    "blockquote", "figure",
];

const MEDIA_TAGS: &[&str] = &[
    "img", "video", "audio", "picture", "source", "iframe", "hr", "br", "table",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoilerplateRules {
    pub tags: Vec<String>,
    pub roles: Vec<String>,
    pub markers: Vec<String>,
    pub selectors: Vec<String>,
}

impl Default for BoilerplateRules {
    fn default() -> Self {
        Self {
            tags: to_owned(DEFAULT_TAGS),
            roles: to_owned(DEFAULT_ROLES),
            markers: to_owned(DEFAULT_MARKERS),
            selectors: Vec::new(),
        }
    }
}

impl BoilerplateRules {
    /// Adds extra CSS selectors on top of the current rules.
    pub fn extend(mut self, selectors: &[&str]) -> Self {
        for selector in selectors {
            if !self.selectors.iter().any(|s| s == selector) {
                self.selectors.push(selector.to_string());
            }
        }
        self
    }

    pub fn matches(&self, element: &Element) -> bool {
        let name = element.name();
        if self.tags.iter().any(|t| t == name) {
            return true;
        }

        if let Some(role) = element.attr("role") {
            let role = role.trim().to_ascii_lowercase();
            if self.roles.iter().any(|r| *r == role) {
                return true;
            }
        }

        element.classes().any(|class| self.is_marked(class))
            || element.id().map_or(false, |id| self.is_marked(id))
    }

    /// A class or id is marked when a marker is one of its hyphen/underscore
    /// separated words, or, for multi-word markers, a substring of it.
    fn is_marked(&self, token: &str) -> bool {
        let token = token.to_ascii_lowercase();
        self.markers.iter().any(|marker| {
            if marker.contains('-') {
                token.contains(marker.as_str())
            } else {
                token
                    .split(|c: char| c == '-' || c == '_')
                    .any(|word| word == marker)
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct ContentNormalizer {
    rules: BoilerplateRules,
    selectors: Vec<Selector>,
}

impl Default for ContentNormalizer {
    fn default() -> Self {
        Self::new(BoilerplateRules::default())
    }
}

impl ContentNormalizer {
    pub fn new(rules: BoilerplateRules) -> Self {
        let selectors = rules
            .selectors
            .iter()
            .filter_map(|css| match Selector::parse(css) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    warn!("Ignoring invalid boilerplate selector {:?}: {:?}", css, e);
                    None
                }
            })
            .collect();
        Self { rules, selectors }
    }

    /// Strips boilerplate from `raw_html` and returns the surviving markup.
    ///
    /// Malformed markup is parsed best-effort; the result may be empty.
    pub fn normalize(&self, raw_html: &str) -> String {
        let mut fragment = Html::parse_fragment(raw_html);
        self.strip_boilerplate(&mut fragment);
        merge_adjacent_text(&mut fragment);
        collapse_whitespace(&mut fragment);
        drop_blank_blocks(&mut fragment);
        fragment.root_element().inner_html().trim().to_string()
    }

    fn strip_boilerplate(&self, fragment: &mut Html) {
        let mut doomed: Vec<NodeId> = fragment
            .tree
            .root()
            .descendants()
            .filter(|node| match node.value() {
                Node::Comment(_) => true,
                Node::Element(element) => self.rules.matches(element),
                _ => false,
            })
            .map(|node| node.id())
            .collect();

        for selector in &self.selectors {
            doomed.extend(fragment.select(selector).map(|el| el.id()));
        }

        for id in doomed {
            if let Some(mut node) = fragment.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Joins text nodes left side by side once the elements between them are gone.
fn merge_adjacent_text(fragment: &mut Html) {
    let mut merges: Vec<(NodeId, NodeId)> = Vec::new();

    for node in fragment.tree.root().descendants() {
        if !node.value().is_text() {
            continue;
        }
        let mut first = None;
        let mut prev = node.prev_sibling();
        while let Some(sibling) = prev {
            if !sibling.value().is_text() {
                break;
            }
            first = Some(sibling.id());
            prev = sibling.prev_sibling();
        }
        if let Some(first) = first {
            merges.push((first, node.id()));
        }
    }

    for (target, source) in merges {
        let Some(extra) = fragment
            .tree
            .get(source)
            .and_then(|n| n.value().as_text())
            .map(|t| t.to_string())
        else {
            continue;
        };
        if let Some(mut node) = fragment.tree.get_mut(target) {
            if let Node::Text(text) = node.value() {
                let joined = format!("{}{}", &**text, extra);
                text.text = joined.as_str().into();
            }
        }
        if let Some(mut node) = fragment.tree.get_mut(source) {
            node.detach();
        }
    }
}

enum TextEdit {
    Drop,
    Replace(String),
}

fn collapse_whitespace(fragment: &mut Html) {
    let mut edits: Vec<(NodeId, TextEdit)> = Vec::new();

    for node in fragment.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let preserved = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map_or(false, |e| PRESERVE_WHITESPACE.contains(&e.name()))
        });
        if preserved {
            continue;
        }

        let original: &str = text;
        let in_block = node.parent().map_or(true, |p| is_block_or_root(p.value()));
        let at_start = node.prev_sibling().map_or(true, |s| is_block(s.value()));
        let at_end = node.next_sibling().map_or(true, |s| is_block(s.value()));

        let mut collapsed = collapse(original);
        if collapsed.trim().is_empty() {
            if in_block && (at_start || at_end) {
                edits.push((node.id(), TextEdit::Drop));
                continue;
            }
            collapsed = " ".to_string();
        } else if in_block {
            if at_start {
                collapsed = collapsed.trim_start().to_string();
            }
            if at_end {
                collapsed = collapsed.trim_end().to_string();
            }
        }

        if collapsed != original {
            edits.push((node.id(), TextEdit::Replace(collapsed)));
        }
    }

    for (id, edit) in edits {
        let Some(mut node) = fragment.tree.get_mut(id) else {
            continue;
        };
        match edit {
            TextEdit::Drop => node.detach(),
            TextEdit::Replace(new_text) => {
                if let Node::Text(text) = node.value() {
                    text.text = new_text.as_str().into();
                }
            }
        }
    }
}

fn drop_blank_blocks(fragment: &mut Html) {
    let candidates: Vec<NodeId> = fragment
        .tree
        .root()
        .descendants()
        .filter(|node| {
            node.value()
                .as_element()
                .map_or(false, |e| BLANKABLE_TAGS.contains(&e.name()))
        })
        .map(|node| node.id())
        .collect();

    // Deepest first, so a parent sees its children's removal.
    for id in candidates.into_iter().rev() {
        let blank = fragment
            .tree
            .get(id)
            .and_then(ElementRef::wrap)
            .map_or(false, |el| {
                let has_text = el.text().any(|t| !t.trim().is_empty());
                let has_media = el.descendants().any(|d| {
                    d.value()
                        .as_element()
                        .map_or(false, |e| MEDIA_TAGS.contains(&e.name()))
                });
                !has_text && !has_media
            });
        if blank {
            if let Some(mut node) = fragment.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn is_block(node: &Node) -> bool {
    node.as_element()
        .map_or(false, |e| BLOCK_TAGS.contains(&e.name()))
}

fn is_block_or_root(node: &Node) -> bool {
    match node {
        Node::Element(e) => BLOCK_TAGS.contains(&e.name()) || e.name() == "html" || e.name() == "body",
        Node::Document | Node::Fragment => true,
        _ => false,
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(html: &str) -> String {
        ContentNormalizer::default().normalize(html)
    }

    #[test]
    fn test_removes_navigation() {
        assert_eq!(normalize("<nav>skip</nav><p>World</p>"), "<p>World</p>");
    }

    #[test]
    fn test_removes_structural_boilerplate() {
        let html = r#"
            <header><a href="/">Home</a></header>
            <p>Keep me</p>
            <script>track()</script>
            <style>p { color: red }</style>
            <footer>Copyright</footer>
            <div role="navigation">Menu</div>
            <aside>Related</aside>
        "#;
        assert_eq!(normalize(html), "<p>Keep me</p>");
    }

    #[test]
    fn test_removes_marked_classes_and_ids() {
        let html = r#"
            <div class="newsletter-signup">Subscribe to our newsletter</div>
            <div id="top-ads">Buy now</div>
            <div class="content"><p>Body</p></div>
            <div class="share_buttons">Share</div>
        "#;
        assert_eq!(normalize(html), r#"<div class="content"><p>Body</p></div>"#);
    }

    #[test]
    fn test_marker_words_do_not_match_inside_other_words() {
        let html = r#"<p class="downloads">Get the files</p><p class="shared-memory">Shared memory</p>"#;
        assert_eq!(normalize(html), html);
    }

    #[test]
    fn test_extra_selectors() {
        let rules = BoilerplateRules::default().extend(&[".related-posts", "section[data-kind='teaser']"]);
        let normalizer = ContentNormalizer::new(rules);
        let html = r#"<p>Main</p><div class="related-posts"><p>Other</p></div><section data-kind="teaser"><p>T</p></section>"#;
        assert_eq!(normalizer.normalize(html), "<p>Main</p>");
    }

    #[test]
    fn test_invalid_selector_is_ignored() {
        let normalizer = ContentNormalizer::new(BoilerplateRules::default().extend(&["[[["]));
        assert_eq!(normalizer.normalize("<p>Still works</p>"), "<p>Still works</p>");
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<div>\n   <p>  Hello \n\n  <em>big</em>   world  </p>\n\n   <p>Second</p>\n</div>";
        assert_eq!(
            normalize(html),
            "<div><p>Hello <em>big</em> world</p><p>Second</p></div>"
        );
    }

    #[test]
    fn test_collapses_across_removed_elements() {
        assert_eq!(
            normalize("<p>alpha <span class=\"ad-slot\">buy</span> beta</p>"),
            "<p>alpha beta</p>"
        );
        assert_eq!(
            normalize("<p>one <script>x()</script> <!-- c --> two</p>"),
            "<p>one two</p>"
        );
    }

    #[test]
    fn test_removes_head_elements_left_in_body() {
        let html = r#"<title>Hello</title><meta name="x" content="y"><link rel="stylesheet" href="a.css"><base href="/"><p>World</p>"#;
        assert_eq!(normalize(html), "<p>World</p>");
    }

    #[test]
    fn test_preserves_preformatted_whitespace() {
        let html = "<pre><code>fn main() {\n    println!(\"hi\");\n}</code></pre>";
        assert_eq!(normalize(html), html);
    }

    #[test]
    fn test_drops_blank_blocks() {
        let html = "<p>Text</p><p>   </p><div><span></span><p></p></div><p><img src=\"a.png\"></p>";
        assert_eq!(normalize(html), "<p>Text</p><p><img src=\"a.png\"></p>");
    }

    #[test]
    fn test_removes_comments() {
        assert_eq!(normalize("<p>A<!-- hidden --></p>"), "<p>A</p>");
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        assert_eq!(normalize("<p>Unclosed <b>bold"), "<p>Unclosed <b>bold</b></p>");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("<nav>only boilerplate</nav>"), "");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let html = r#"<div class="prose" id="main" data-x="1"><p>One</p></div>"#;
        let first = normalize(html);
        for _ in 0..5 {
            assert_eq!(normalize(html), first);
        }
        assert_eq!(first, html);
    }
}
