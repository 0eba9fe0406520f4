use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::types::DATE_FORMAT;

/// Slugs already claimed within one batch.
pub type SlugSet = BTreeSet<String>;

/// Builds `YYYY-MM-DD-<stem>` slugs.
///
/// The stem is the title folded to ASCII, lowercased and hyphen separated. A slug
/// that is already in the batch gets `-2`, `-3`, ... appended, the first free
/// counter winning, so the output only depends on the inputs.
#[derive(Debug, Clone)]
pub struct SlugGenerator {
    max_stem_len: usize,
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlugGenerator {
    pub const DEFAULT_MAX_STEM_LEN: usize = 80;
    const EMPTY_STEM: &'static str = "untitled";

    pub fn new() -> Self {
        Self {
            max_stem_len: Self::DEFAULT_MAX_STEM_LEN,
        }
    }

    pub fn with_max_stem_len(mut self, max_stem_len: usize) -> Self {
        self.max_stem_len = max_stem_len.max(1);
        self
    }

    pub fn generate(&self, title: &str, date: NaiveDate, existing: &SlugSet) -> String {
        let base = format!("{}-{}", date.format(DATE_FORMAT), self.stem(title));
        if !existing.contains(&base) {
            return base;
        }

        let mut counter = 2usize;
        loop {
            let candidate = format!("{}-{}", base, counter);
            if !existing.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    pub fn stem(&self, title: &str) -> String {
        let stem = slugify(title);
        let stem = truncate_at_boundary(&stem, self.max_stem_len);
        if stem.is_empty() {
            Self::EMPTY_STEM.to_string()
        } else {
            stem
        }
    }
}

/// Lowercase ASCII token with single hyphens between alphanumeric runs.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c);
            } else {
                pending_hyphen = true;
            }
            continue;
        }

        let folded = fold_char(c);
        if folded.is_empty() {
            // Unmapped letters and combining marks vanish; anything else separates words.
            if !c.is_alphanumeric() && !is_combining_mark(c) {
                pending_hyphen = true;
            }
            continue;
        }
        if pending_hyphen && !out.is_empty() {
            out.push('-');
        }
        pending_hyphen = false;
        out.push_str(folded);
    }

    out
}

fn truncate_at_boundary(stem: &str, max_len: usize) -> String {
    if stem.len() <= max_len {
        return stem.to_string();
    }
    // The stem is pure ASCII, so byte slicing is char slicing.
    let cut = &stem[..max_len];
    let cut = if stem.as_bytes()[max_len] == b'-' {
        cut
    } else {
        match cut.rfind('-') {
            Some(idx) if idx > 0 => &cut[..idx],
            _ => cut,
        }
    };
    cut.trim_matches('-').to_string()
}

fn is_combining_mark(c: char) -> bool {
    ('\u{300}'..='\u{36f}').contains(&c)
}

fn fold_char(c: char) -> &'static str {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' | 'ĝ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => "",
    }
}
