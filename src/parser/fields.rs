//! Field-level cleanup shared by every table: trimming, loose integer and
//! identifier parsing, and the canonical name form used to join files.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const NBSP: char = '\u{a0}';

/// Trim a raw cell, treating non-breaking spaces as ordinary whitespace.
///
/// Returns `None` when nothing is left, so "no value" and "empty string"
/// collapse to the same thing.
pub fn trim_text(raw: &str) -> Option<String> {
    let cleaned = raw.replace(NBSP, " ");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Trim and lowercase, used for free-text evolution attributes.
pub fn lower_text(raw: &str) -> Option<String> {
    trim_text(raw).map(|s| s.to_lowercase())
}

/// Parse a base-10 integer from the leading digits of a cell (`" 45 "`, `"12cm"`).
pub fn parse_integer(raw: &str) -> Option<i64> {
    trim_text(raw).and_then(|s| parse_int_prefix(&s))
}

/// Parse an identifier that may carry a `#` marker, e.g. `#0001`.
pub fn parse_identifier(raw: &str) -> Option<i64> {
    let cleaned = trim_text(raw)?;
    let digits = cleaned.strip_prefix('#').unwrap_or(&cleaned);
    parse_int_prefix(digits.trim_start())
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Canonical lookup form of a display name.
///
/// Spells out the gender signs (`Nidoran♀` → `nidoran f`), strips accents
/// through compatibility decomposition, lowercases and drops every
/// character outside `[a-z0-9 ]`. Never fails and is idempotent.
pub fn normalize_name(raw: &str) -> String {
    let Some(trimmed) = trim_text(raw) else {
        return String::new();
    };
    let spelled = trimmed.replace('♀', " f").replace('♂', " m");

    let mut out = String::with_capacity(spelled.len());
    let letters = spelled
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase);
    for ch in letters {
        match ch {
            'a'..='z' | '0'..='9' | ' ' => out.push(ch),
            _ => {
                if let Some(base) = fold_letter(ch) {
                    out.push_str(base);
                }
            }
        }
    }

    out.trim().to_string()
}

/// Latin letters that have no decomposition into base letter plus mark
fn fold_letter(ch: char) -> Option<&'static str> {
    let base = match ch {
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'ø' => "o",
        'ł' => "l",
        'đ' | 'ð' => "d",
        'þ' => "th",
        'ı' => "i",
        _ => return None,
    };
    Some(base)
}
