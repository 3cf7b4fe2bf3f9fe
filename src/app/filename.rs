//! Filename parsing for article dates and sequence numbers.
//!
//! Archive filenames carry their ordering information in a handful of loose
//! shapes. Two independent extractors pull it out:
//!
//! - [`parse_date`] searches anywhere in the name for one of five date shapes,
//!   tried in a fixed priority order:
//!   `YYYY.M.D`, `YYYY-M-D`, `YYYYMMDD`, `M.D.YYYY`, `M-D-YYYY`.
//!   `2025.9.9-note.md` → 2025-09-09, `20250909.md` → 2025-09-09.
//! - [`parse_sequence_number`] looks only at the start of the name, for one of
//!   four prefixes, also in a fixed order:
//!   `01. intro.md` → 1, `第3期.md` → 3, `No.12.md` → 12, `#7 notes.md` → 7.
//!
//! The order is part of the contract: a name may fit several shapes and the
//! earliest pattern decides. Date shapes are never consulted for sequence
//! numbers and vice versa.
//!
//! ## Trailing-year shapes
//!
//! `M.D.YYYY` and `M-D-YYYY` are read month first: `9.10.2025` is
//! 10 September 2025. Day-first names are not recognised. `10.9.2025` reads
//! as 9 October, and `13.1.2025` is not a date at all, so it yields `None`.
//!
//! ## Invalid dates
//!
//! Patterns match digit shapes only. When the first shape that matches does
//! not form a real calendar date (`2025.13.40`), the result is `None`; later
//! patterns are not tried.

use chrono::NaiveDate;

/// One element of a date shape.
#[derive(Debug, Clone, Copy)]
enum Token {
    /// A run of ASCII digits, matched greedily with backtracking.
    Digits { min: usize, max: usize },
    /// A single literal ASCII byte.
    Literal(u8),
}

/// Which captured group holds which date component.
#[derive(Debug, Clone, Copy)]
enum FieldOrder {
    YearMonthDay,
    MonthDayYear,
}

#[derive(Debug)]
struct DatePattern {
    tokens: &'static [Token],
    order: FieldOrder,
}

const fn digits(min: usize, max: usize) -> Token {
    Token::Digits { min, max }
}

const DATE_PATTERNS: [DatePattern; 5] = [
    // 2025.9.9, 2025.09.09
    DatePattern {
        tokens: &[digits(4, 4), Token::Literal(b'.'), digits(1, 2), Token::Literal(b'.'), digits(1, 2)],
        order: FieldOrder::YearMonthDay,
    },
    // 2025-9-9, 2025-09-09
    DatePattern {
        tokens: &[digits(4, 4), Token::Literal(b'-'), digits(1, 2), Token::Literal(b'-'), digits(1, 2)],
        order: FieldOrder::YearMonthDay,
    },
    // 20250909
    DatePattern {
        tokens: &[digits(4, 4), digits(2, 2), digits(2, 2)],
        order: FieldOrder::YearMonthDay,
    },
    // 9.9.2025
    DatePattern {
        tokens: &[digits(1, 2), Token::Literal(b'.'), digits(1, 2), Token::Literal(b'.'), digits(4, 4)],
        order: FieldOrder::MonthDayYear,
    },
    // 9-9-2025
    DatePattern {
        tokens: &[digits(1, 2), Token::Literal(b'-'), digits(1, 2), Token::Literal(b'-'), digits(4, 4)],
        order: FieldOrder::MonthDayYear,
    },
];

/// Extract a calendar date from a filename.
///
/// Returns `None` when no date shape occurs, or when the first shape that
/// occurs is not a valid date.
pub fn parse_date(filename: &str) -> Option<NaiveDate> {
    let haystack = filename.as_bytes();

    let (pattern, captures) = DATE_PATTERNS
        .iter()
        .find_map(|pattern| find_leftmost(haystack, pattern.tokens).map(|caps| (pattern, caps)))?;

    let field = |index: usize| -> Option<u32> {
        let (start, end) = captures[index];
        // Captures only ever span ASCII digits
        std::str::from_utf8(&haystack[start..end]).ok()?.parse().ok()
    };

    let (year, month, day) = match pattern.order {
        FieldOrder::YearMonthDay => (field(0)?, field(1)?, field(2)?),
        FieldOrder::MonthDayYear => (field(2)?, field(0)?, field(1)?),
    };

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Find the leftmost position where `tokens` match, returning the byte range
/// of every digit group.
fn find_leftmost(haystack: &[u8], tokens: &[Token]) -> Option<Vec<(usize, usize)>> {
    (0..=haystack.len()).find_map(|start| {
        let mut captures = Vec::with_capacity(tokens.len());
        match_tokens(haystack, start, tokens, &mut captures).then_some(captures)
    })
}

fn match_tokens(
    haystack: &[u8],
    pos: usize,
    tokens: &[Token],
    captures: &mut Vec<(usize, usize)>,
) -> bool {
    let Some((first, rest)) = tokens.split_first() else {
        return true;
    };

    match *first {
        Token::Literal(byte) => {
            haystack.get(pos) == Some(&byte) && match_tokens(haystack, pos + 1, rest, captures)
        }
        Token::Digits { min, max } => {
            let run = haystack[pos..]
                .iter()
                .take(max)
                .take_while(|b| b.is_ascii_digit())
                .count();
            for len in (min..=run).rev() {
                captures.push((pos, pos + len));
                if match_tokens(haystack, pos + len, rest, captures) {
                    return true;
                }
                captures.pop();
            }
            false
        }
    }
}

/// Sequence prefix extractors, in priority order. Each returns the digit text.
const SEQUENCE_PATTERNS: [fn(&str) -> Option<&str>; 4] = [
    leading_number,
    chinese_ordinal,
    no_prefix,
    hash_prefix,
];

/// Extract a sequence number from the start of a filename.
///
/// A digit run too large to represent counts as no match for that pattern,
/// and the next pattern is tried.
pub fn parse_sequence_number(filename: &str) -> Option<u32> {
    SEQUENCE_PATTERNS
        .iter()
        .find_map(|pattern| pattern(filename).and_then(|digits| digits.parse().ok()))
}

/// Split off the leading run of ASCII digits.
fn split_digits(s: &str) -> (&str, &str) {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    s.split_at(len)
}

/// `01. `, `01-`, `01_`, `01 `
fn leading_number(name: &str) -> Option<&str> {
    let (number, rest) = split_digits(name);
    let next = rest.chars().next()?;
    let separated = matches!(next, '.' | '-' | '_') || next.is_whitespace();
    (!number.is_empty() && separated).then_some(number)
}

/// `第01期`, `第2章`, `第3节`
fn chinese_ordinal(name: &str) -> Option<&str> {
    let (number, rest) = split_digits(name.strip_prefix('第')?);
    let unit = matches!(rest.chars().next()?, '期' | '章' | '节');
    (!number.is_empty() && unit).then_some(number)
}

/// `No.01`, `NO01`, `no.3`
fn no_prefix(name: &str) -> Option<&str> {
    let prefix = name.get(..2)?;
    if !prefix.eq_ignore_ascii_case("no") {
        return None;
    }
    let rest = &name[2..];
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    let (number, _) = split_digits(rest);
    (!number.is_empty()).then_some(number)
}

/// `#01`
fn hash_prefix(name: &str) -> Option<&str> {
    let (number, _) = split_digits(name.strip_prefix('#')?);
    (!number.is_empty()).then_some(number)
}

/// Human-friendly title for an article filename.
///
/// Drops a trailing `.md`, turns underscores into spaces and capitalises the
/// first ASCII letter of every word:
/// - `"weekly_digest.md"` → `"Weekly Digest"`
/// - `"2025.9.9-note.md"` → `"2025.9.9-Note"`
pub fn display_title(filename: &str) -> String {
    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    let mut title = String::with_capacity(stem.len());
    let mut prev_is_word = false;

    for c in stem.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !prev_is_word {
            title.push(c.to_ascii_uppercase());
        } else {
            title.push(c);
        }
        prev_is_word = is_word;
    }

    title
}
