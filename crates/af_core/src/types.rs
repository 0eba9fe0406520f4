use std::collections::BTreeSet;
use std::convert::TryFrom;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::slug::{SlugGenerator, SlugSet};
use crate::Error;

/// The one textual date format used in slugs, file names and metadata.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What an adapter pulls out of a page: everything but the slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: String,
    pub date: NaiveDate,
    pub canonical_url: String,
    pub source: String,
    pub html: String,
    pub authors: Vec<String>,
    pub tags: BTreeSet<String>,
}

impl ExtractedArticle {
    pub fn into_article(self, slug: String) -> Article {
        Article {
            title: self.title,
            date: self.date,
            slug,
            canonical_url: self.canonical_url,
            source: self.source,
            html: self.html,
            authors: self.authors,
            tags: self.tags,
        }
    }
}

/// A fully extracted, slugged article. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ArticleRecord", into = "ArticleRecord")]
pub struct Article {
    title: String,
    date: NaiveDate,
    slug: String,
    canonical_url: String,
    source: String,
    html: String,
    authors: Vec<String>,
    tags: BTreeSet<String>,
}

impl Article {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// `<date>-<stem>.html`. Generated slugs already start with the date, so
    /// only hand-written ones get it prepended.
    pub fn filename(&self) -> String {
        let date = self.date_string();
        if self.slug.starts_with(&format!("{}-", date)) {
            format!("{}.html", self.slug)
        } else {
            format!("{}-{}.html", date, self.slug)
        }
    }
}

/// Wire shape of an article, as found in scaffold fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArticleRecord {
    title: String,
    date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
    canonical_url: String,
    source: String,
    html: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<ArticleRecord> for Article {
    type Error = Error;

    fn try_from(record: ArticleRecord) -> Result<Self, Self::Error> {
        let title = record.title.split_whitespace().collect::<Vec<_>>().join(" ");
        if title.is_empty() {
            return Err(Error::InvalidArticle("title must not be empty".to_string()));
        }

        let date = NaiveDate::parse_from_str(record.date.trim(), DATE_FORMAT).map_err(|e| {
            Error::InvalidArticle(format!("date `{}` is not YYYY-MM-DD: {}", record.date, e))
        })?;

        let slug = match record.slug.map(|s| s.trim().to_string()) {
            Some(slug) if !slug.is_empty() => {
                if !is_url_safe(&slug) {
                    return Err(Error::InvalidArticle(format!(
                        "slug `{}` must contain only lowercase ASCII letters, digits and hyphens",
                        slug
                    )));
                }
                slug
            }
            _ => SlugGenerator::new().generate(&title, date, &SlugSet::new()),
        };

        Ok(Article {
            title,
            date,
            slug,
            canonical_url: record.canonical_url,
            source: record.source,
            html: record.html,
            authors: record.authors,
            tags: record.tags.into_iter().collect(),
        })
    }
}

impl From<Article> for ArticleRecord {
    fn from(article: Article) -> Self {
        let date = article.date_string();
        ArticleRecord {
            title: article.title,
            date,
            slug: Some(article.slug),
            canonical_url: article.canonical_url,
            source: article.source,
            html: article.html,
            authors: article.authors,
            tags: article.tags.into_iter().collect(),
        }
    }
}

fn is_url_safe(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
