use crate::config::{ABSENCE_MARKER, DEFAULT_COMMISSION};
use serde::Serialize;
use std::fmt;

/// Who a category belongs to and what the gallery keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerIdentity {
    /// Display name as first seen
    pub name: String,
    pub short_code: String,
    /// Gallery commission in whole percent, 0-100
    pub commission: u8,
}

impl SellerIdentity {
    /// Key used to decide that two categories name the same seller.
    pub fn key(&self) -> String {
        name_key(&self.name)
    }
}

pub fn name_key(name: &str) -> String {
    normalize(name).to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingCategory,
    EmptyNameAfterParsing,
    InvalidCommissionValue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::MissingCategory => "missing category",
            SkipReason::EmptyNameAfterParsing => "empty name after parsing",
            SkipReason::InvalidCommissionValue => "invalid commission value",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Classified(SellerIdentity),
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
pub struct CategoryParser {
    pub default_commission: u8,
    pub absence_marker: String,
}

impl Default for CategoryParser {
    fn default() -> Self {
        CategoryParser {
            default_commission: DEFAULT_COMMISSION,
            absence_marker: ABSENCE_MARKER.to_owned(),
        }
    }
}

/// Parses with the stock defaults.
pub fn parse(raw: &str) -> ParseOutcome {
    CategoryParser::default().parse(raw)
}

impl CategoryParser {
    pub fn new(default_commission: u8, absence_marker: &str) -> Self {
        CategoryParser {
            default_commission,
            absence_marker: absence_marker.to_owned(),
        }
    }

    pub fn parse(&self, raw: &str) -> ParseOutcome {
        use ParseOutcome::*;

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(self.absence_marker.trim()) {
            return Skipped(SkipReason::MissingCategory);
        }
        let unmarked = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let (name, commission) = match split_commission(unmarked) {
            Commission::Absent => (unmarked, Some(self.default_commission)),
            Commission::Valid(name, pct) => (name, Some(pct)),
            Commission::OutOfRange(name) => (name, None),
        };
        let name = normalize(name);
        if name.is_empty() {
            return Skipped(SkipReason::EmptyNameAfterParsing);
        }
        let Some(commission) = commission else {
            return Skipped(SkipReason::InvalidCommissionValue);
        };
        let (name, short_code) = strip_code_prefix(name);
        Classified(SellerIdentity {
            name,
            short_code,
            commission,
        })
    }
}

enum Commission<'a> {
    Absent,
    Valid(&'a str, u8),
    OutOfRange(&'a str),
}

/// Splits a trailing `(NN)` off the category. A parenthesised segment that is not an
/// integer belongs to the name.
fn split_commission(s: &str) -> Commission<'_> {
    let s = s.trim_end();
    let Some(body) = s.strip_suffix(')') else {
        return Commission::Absent;
    };
    let Some(open) = body.rfind('(') else {
        return Commission::Absent;
    };
    let digits = body[open + 1..].trim();
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_ascii_digit()) {
        return Commission::Absent;
    }
    let name = body[..open].trim_end();
    match digits.parse::<i64>() {
        Ok(pct @ 0..=100) => Commission::Valid(name, pct as u8),
        // negative, above 100, or too many digits to fit
        _ => Commission::OutOfRange(name),
    }
}

/// Trims and collapses internal whitespace runs to one space.
fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Initials of the first two words, or the first two characters of a one-word name.
pub fn short_code(name: &str) -> String {
    let initials: Vec<char> = name
        .split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .take(2)
        .collect();
    let chars: Vec<char> = if initials.len() == 2 {
        initials
    } else {
        name.chars().filter(|c| c.is_alphanumeric()).take(2).collect()
    };
    if chars.is_empty() {
        return "XX".to_owned();
    }
    chars.into_iter().flat_map(char::to_uppercase).collect()
}

/// `"KB Kate Billingsley"` carries its own code in front of the name. The leading word is
/// only treated as a code when it is upper case and matches the rest of the name.
fn strip_code_prefix(name: String) -> (String, String) {
    if let Some((first, rest)) = name.split_once(' ') {
        let is_code = first.chars().all(|c| c.is_uppercase() || c.is_ascii_digit())
            && first.chars().any(char::is_alphabetic);
        if is_code && short_code(rest) == first {
            return (rest.to_owned(), first.to_owned());
        }
    }
    let code = short_code(&name);
    (name, code)
}

#[cfg(test)]
mod category_tests {
    use super::ParseOutcome::*;
    use super::*;

    fn identity(name: &str, short_code: &str, commission: u8) -> ParseOutcome {
        Classified(SellerIdentity {
            name: name.to_owned(),
            short_code: short_code.to_owned(),
            commission,
        })
    }

    #[test]
    fn name_and_commission() {
        assert_eq!(parse("Ann Emerton (25)"), identity("Ann Emerton", "AE", 25));
        assert_eq!(parse("#Ann Emerton(0)"), identity("Ann Emerton", "AE", 0));
        assert_eq!(parse("  Ann Emerton  (100)  "), identity("Ann Emerton", "AE", 100));
        assert_eq!(parse("Ann Emerton"), identity("Ann Emerton", "AE", 30));
    }

    #[test]
    fn code_prefixed_category() {
        assert_eq!(
            parse("KB Kate Billingsley (20)"),
            identity("Kate Billingsley", "KB", 20)
        );
        // leading word that is not the matching code stays part of the name
        assert_eq!(parse("AB Gallery"), identity("AB Gallery", "AG", 30));
        assert_eq!(parse("JD Kate Billingsley"), identity("JD Kate Billingsley", "JK", 30));
    }

    #[test]
    fn hash_marker() {
        assert_eq!(
            parse("#Paddy Wenborn Archives"),
            identity("Paddy Wenborn Archives", "PW", 30)
        );
        // only one marker is removed
        assert_eq!(parse("##Twins (10)"), identity("#Twins", "TW", 10));
    }

    #[test]
    fn missing_category() {
        assert_eq!(parse(""), Skipped(SkipReason::MissingCategory));
        assert_eq!(parse("   "), Skipped(SkipReason::MissingCategory));
        assert_eq!(parse("None"), Skipped(SkipReason::MissingCategory));
        assert_eq!(parse(" none "), Skipped(SkipReason::MissingCategory));

        let parser = CategoryParser::new(30, "N/A");
        assert_eq!(parser.parse("n/a"), Skipped(SkipReason::MissingCategory));
        assert_eq!(parser.parse("None"), identity("None", "NO", 30));
    }

    #[test]
    fn empty_name() {
        assert_eq!(parse("(20)"), Skipped(SkipReason::EmptyNameAfterParsing));
        assert_eq!(parse("#  (20)"), Skipped(SkipReason::EmptyNameAfterParsing));
        assert_eq!(parse("#"), Skipped(SkipReason::EmptyNameAfterParsing));
        // the name is checked before the rate
        assert_eq!(parse("(150)"), Skipped(SkipReason::EmptyNameAfterParsing));
        assert_eq!(parse("#(101)"), Skipped(SkipReason::EmptyNameAfterParsing));
        assert_eq!(parse("  (-5)"), Skipped(SkipReason::EmptyNameAfterParsing));
    }

    #[test]
    fn invalid_commission() {
        assert_eq!(parse("Ann Emerton (101)"), Skipped(SkipReason::InvalidCommissionValue));
        assert_eq!(parse("Ann Emerton (-5)"), Skipped(SkipReason::InvalidCommissionValue));
        assert_eq!(
            parse("Ann Emerton (99999999999999999999999)"),
            Skipped(SkipReason::InvalidCommissionValue)
        );
    }

    #[test]
    fn non_numeric_parens_are_name() {
        assert_eq!(parse("Ann Emerton (Prints)"), identity("Ann Emerton (Prints)", "AE", 30));
        assert_eq!(parse("Ann Emerton ()"), identity("Ann Emerton ()", "AE", 30));
        assert_eq!(
            parse("Ann Emerton (Prints) (15)"),
            identity("Ann Emerton (Prints)", "AE", 15)
        );
    }

    #[test]
    fn configured_default() {
        let parser = CategoryParser::new(40, "None");
        assert_eq!(parser.parse("Ann Emerton"), identity("Ann Emerton", "AE", 40));
        assert_eq!(parser.parse("Ann Emerton (10)"), identity("Ann Emerton", "AE", 10));
    }

    #[test]
    fn short_codes() {
        assert_eq!(short_code("Ann Emerton"), "AE");
        assert_eq!(short_code("paddy wenborn archives"), "PW");
        assert_eq!(short_code("Cher"), "CH");
        assert_eq!(short_code("X"), "X");
        assert_eq!(short_code("& Co"), "CO");
        assert_eq!(short_code("!!!"), "XX");
    }

    #[test]
    fn whitespace_normalized() {
        assert_eq!(parse("Ann   Emerton\t(20)"), identity("Ann Emerton", "AE", 20));
        let Classified(a) = parse("ann emerton") else {
            panic!("expected classified")
        };
        let Classified(b) = parse("Ann  Emerton (10)") else {
            panic!("expected classified")
        };
        assert_eq!(a.key(), b.key());
    }
}
