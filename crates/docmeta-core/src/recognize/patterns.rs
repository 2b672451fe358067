use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::metadata::MetadataFields;

const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

/// An optional `+cc` prefix and parenthesized area code, then at most four
/// digit groups joined by a single space, dot or dash on one line.
const PHONE_PATTERN: &str = r"(?:(?P<cc>\+\d{1,3})[ -]?(?:\(\d{2,5}\)[ -]?)?|\(\d{2,5}\)[ -]?|\b)\d{2,10}(?:[ .-]\d{2,5}){0,3}\b";

const DATE_PATTERN: &str =
    r"\b(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}/\d{1,2}/\d{4}|\d{1,2}-\d{1,2}-\d{4})\b";

const PHONE_LOCAL_DIGITS: std::ops::RangeInclusive<usize> = 6..=10;

/// Country prefix applied to unambiguous ten-digit local numbers.
const DEFAULT_COUNTRY_PREFIX: &str = "+91-";

/// Deduplicated, normalized pattern candidates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatches {
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub dates: BTreeSet<String>,
}

impl PatternMatches {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty() && self.dates.is_empty()
    }
}

impl MetadataFields for PatternMatches {
    fn into_fields(self) -> Vec<(&'static str, BTreeSet<String>)> {
        vec![
            ("emails", self.emails),
            ("phones", self.phones),
            ("dates", self.dates),
        ]
    }
}

/// Regex-based candidate extraction for emails, phone numbers and dates.
pub struct PatternRecognizer {
    email: Regex,
    phone: Regex,
    date: Regex,
    date_exact: Regex,
}

impl PatternRecognizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            date: Regex::new(DATE_PATTERN)?,
            date_exact: Regex::new(&format!("^(?:{DATE_PATTERN})$"))?,
        })
    }

    pub fn recognize(&self, text: &str) -> PatternMatches {
        PatternMatches {
            emails: self.emails(text),
            phones: self.phones(text),
            dates: self.dates(text),
        }
    }

    fn emails(&self, text: &str) -> BTreeSet<String> {
        self.email
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn phones(&self, text: &str) -> BTreeSet<String> {
        let mut phones = BTreeSet::new();

        for caps in self.phone.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let candidate = whole.as_str();
            if touches_email(text, whole.start(), whole.end()) {
                continue;
            }

            let prefix_digits = caps.name("cc").map_or(0, |m| count_digits(m.as_str()));
            let local_digits = count_digits(candidate) - prefix_digits;
            if !PHONE_LOCAL_DIGITS.contains(&local_digits) {
                continue;
            }
            // Left to the date pass.
            if self.date_exact.is_match(candidate) {
                continue;
            }

            phones.insert(normalize_phone(candidate));
        }

        phones
    }

    fn dates(&self, text: &str) -> BTreeSet<String> {
        self.date
            .find_iter(text)
            .map(|m| normalize_date(m.as_str()))
            .collect()
    }
}

/// Digits glued to an `@` belong to an email address.
fn touches_email(text: &str, start: usize, end: usize) -> bool {
    text[..start].ends_with('@') || text[end..].starts_with('@')
}

fn count_digits(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

/// Reformat a ten-digit local number as `+91-XXXXXXXXXX`.
///
/// Any other digit count is returned unchanged, which keeps the function
/// idempotent: a reformatted number carries twelve digits.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("{DEFAULT_COUNTRY_PREFIX}{digits}")
    } else {
        phone.to_string()
    }
}

/// Reorder `DD/MM/YYYY` and `DD-MM-YYYY` into `YYYY-MM-DD`.
///
/// A dash-separated value whose first component already has four digits is
/// treated as ISO and left alone. Values that fail to parse pass through.
pub fn normalize_date(date: &str) -> String {
    let format = if date.contains('/') {
        "%d/%m/%Y"
    } else if date.contains('-') {
        let first = date.split('-').next().unwrap_or_default();
        if first.len() == 4 {
            return date.to_string();
        }
        "%d-%m-%Y"
    } else {
        return date.to_string();
    };

    match NaiveDate::parse_from_str(date, format) {
        Ok(parsed) => parsed.format("%Y-%m-%d").to_string(),
        Err(e) => {
            tracing::debug!("Keeping unparseable date '{}': {}", date, e);
            date.to_string()
        }
    }
}
