//! Declarative extraction rules shared by every adapter.
//!
//! An adapter is mostly a [`ExtractionRules`] value: ordered probes for each
//! field, where the first probe that yields something wins.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use scraper::Html;

use af_core::{ExtractedArticle, ExtractionError};

use super::dates::{find_date_in_text, parse_date};
use super::jsonld::JsonLd;
use super::utils;
use super::ExtractContext;
use crate::normalizer::ContentNormalizer;

/// One place to look for a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    /// `<meta property|name|itemprop="..." content>`
    Meta(&'static str),
    /// Text of matching elements
    Text(&'static str),
    /// An attribute of matching elements
    Attr(&'static str, &'static str),
    /// The field's JSON-LD counterpart (`headline`, `datePublished`, `author`)
    JsonLd,
    /// First date-like text in the page body once boilerplate is stripped.
    /// Only meaningful for dates.
    BodyText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// Keep the matched element itself
    Outer,
    /// Keep only its children
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceName {
    Fixed(&'static str),
    /// `og:site_name`, else the given name
    SiteNameOr(&'static str),
    /// `og:site_name`, else the URL host without `www.`
    SiteNameOrHost,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ExtractionRules {
    pub adapter: &'static str,
    pub title: &'static [Probe],
    pub date: &'static [Probe],
    pub authors: &'static [Probe],
    pub body: &'static [(&'static str, Boundary)],
    pub source: SourceName,
    /// When false an empty body is returned as is instead of failing.
    pub body_required: bool,
    /// When false a URL that does not parse is kept, trimmed and without its
    /// fragment, as the canonical URL.
    pub url_required: bool,
}

const TAG_META: &str = "article:tag";

impl ExtractionRules {
    pub fn extract(
        &self,
        normalizer: &ContentNormalizer,
        url: &str,
        html: &str,
        ctx: &ExtractContext,
    ) -> std::result::Result<ExtractedArticle, ExtractionError> {
        let canonical_url = match utils::canonical_url(url) {
            Ok(canonical) => canonical,
            Err(_) if !self.url_required => utils::strip_fragment(url),
            Err(e) => return Err(e),
        };
        let document = Html::parse_document(html);
        let jsonld = JsonLd::from_document(&document);

        let title = self
            .find_title(&document, &jsonld)
            .ok_or(ExtractionError::MissingTitle)?;

        let date = self
            .find_date(normalizer, &document, &jsonld)
            .or(ctx.fallback_date)
            .ok_or(ExtractionError::MissingDate)?;

        let body = self.find_body(normalizer, &document);
        if body.is_empty() && self.body_required {
            return Err(ExtractionError::EmptyBody);
        }

        Ok(ExtractedArticle {
            title,
            date,
            source: self.find_source(&document, &canonical_url),
            canonical_url,
            html: body,
            authors: self.find_authors(&document, &jsonld),
            tags: find_tags(&document, &jsonld),
        })
    }

    fn find_title(&self, document: &Html, jsonld: &JsonLd) -> Option<String> {
        self.title.iter().find_map(|probe| {
            let value = match *probe {
                Probe::Meta(key) => utils::meta_contents(document, key).into_iter().next(),
                Probe::Text(css) => utils::first_text(document, css),
                Probe::Attr(css, attr) => utils::all_attrs(document, css, attr).into_iter().next(),
                Probe::JsonLd => jsonld.headline().map(|h| utils::collapse_whitespace(&h)),
                Probe::BodyText => None,
            };
            value.filter(|v| !v.is_empty())
        })
    }

    fn find_date(
        &self,
        normalizer: &ContentNormalizer,
        document: &Html,
        jsonld: &JsonLd,
    ) -> Option<NaiveDate> {
        self.date.iter().find_map(|probe| match *probe {
            Probe::Meta(key) => utils::meta_contents(document, key)
                .iter()
                .find_map(|v| parse_date(v)),
            Probe::Text(css) => utils::all_texts(document, css)
                .iter()
                .find_map(|v| parse_date(v)),
            Probe::Attr(css, attr) => utils::all_attrs(document, css, attr)
                .iter()
                .find_map(|v| parse_date(v)),
            Probe::JsonLd => jsonld.date_published().and_then(|v| parse_date(&v)),
            Probe::BodyText => body_text_date(normalizer, document),
        })
    }

    fn find_authors(&self, document: &Html, jsonld: &JsonLd) -> Vec<String> {
        for probe in self.authors {
            let authors = match *probe {
                Probe::Meta(key) => utils::meta_contents(document, key),
                Probe::Text(css) => utils::all_texts(document, css),
                Probe::Attr(css, attr) => utils::all_attrs(document, css, attr),
                Probe::JsonLd => jsonld.authors(),
                Probe::BodyText => Vec::new(),
            };
            if !authors.is_empty() {
                return utils::dedupe(authors);
            }
        }
        Vec::new()
    }

    /// The first boundary that exists and survives normalization.
    fn find_body(&self, normalizer: &ContentNormalizer, document: &Html) -> String {
        for (css, boundary) in self.body {
            let Some(selector) = utils::selector(css) else {
                continue;
            };
            let Some(element) = document.select(&selector).next() else {
                continue;
            };
            let raw = match boundary {
                Boundary::Outer => element.html(),
                Boundary::Inner => element.inner_html(),
            };
            let clean = normalizer.normalize(&raw);
            if !clean.is_empty() {
                return clean;
            }
        }
        String::new()
    }

    fn find_source(&self, document: &Html, canonical_url: &str) -> String {
        let site_name = || utils::meta_contents(document, "og:site_name").into_iter().next();
        match self.source {
            SourceName::Fixed(name) => name.to_string(),
            SourceName::SiteNameOr(name) => site_name().unwrap_or_else(|| name.to_string()),
            SourceName::SiteNameOrHost => site_name().unwrap_or_else(|| {
                utils::host(canonical_url)
                    .map(|h| h.trim_start_matches("www.").to_string())
                    .unwrap_or_else(|| self.adapter.to_string())
            }),
        }
    }
}

fn body_text_date(normalizer: &ContentNormalizer, document: &Html) -> Option<NaiveDate> {
    let selector = utils::selector("body")?;
    let body = document.select(&selector).next()?;
    let clean = Html::parse_fragment(&normalizer.normalize(&body.inner_html()));
    let text = clean.root_element().text().collect::<Vec<_>>().join(" ");
    find_date_in_text(&text)
}

fn find_tags(document: &Html, jsonld: &JsonLd) -> BTreeSet<String> {
    utils::meta_contents(document, TAG_META)
        .into_iter()
        .chain(jsonld.keywords())
        .map(|t| utils::collapse_whitespace(&t))
        .filter(|t| !t.is_empty())
        .collect()
}
