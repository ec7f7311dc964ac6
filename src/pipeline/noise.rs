//! Page-number noise: running headers and footers that carry only a page
//! number.
//!
//! Text extractors return page numbers as ordinary lines, usually sitting
//! between the last paragraph of one page and the first of the next. Left in
//! place they end up as one-word paragraphs, or worse, glued to a numbered
//! heading by the lookahead rules in [`super::reflow`]. This classifier runs
//! before every other rule and is a hard filter.
//!
//! Numbered headings such as `1.` or `1.1.` and decimals such as `1.2` never
//! match: every pattern below requires the digits to stand alone or be framed
//! by dashes, a slash, or the word for "page".

use once_cell::sync::Lazy;
use regex::Regex;

// `12`, `202`
static RE_BARE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,4}$").unwrap());

// `- 1 -`, `—2—`, `-- 3 --`; the leftover dashes are checked separately.
static RE_DASHED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\-–—\s]*\d{1,4}[\-–—\s]*$").unwrap());

// `3/24`, `10 / 120`
static RE_RATIO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,4}\s*/\s*\d{1,4}$").unwrap());

// `第3页`, `第 10 / 120 页`
static RE_CJK_PAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第\s*\d{1,4}(\s*/\s*\d{1,4})?\s*页$").unwrap());

// `Page 3`, `page 3 of 24`
static RE_EN_PAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^page\s*\d{1,4}(\s*of\s*\d{1,4})?$").unwrap());

static RE_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());

/// Dash residues allowed around a dashed page number.
const DASH_FRAMES: [&str; 5] = ["", "-", "–", "—", "--"];

/// Return `true` when `raw_line` is a standalone page number that should be
/// dropped from the output.
pub fn is_page_number_line(raw_line: &str) -> bool {
    let line = raw_line.trim();
    if line.is_empty() {
        return false;
    }

    if RE_BARE_DIGITS.is_match(line) {
        return true;
    }

    if RE_DASHED.is_match(line) && is_short_dash_frame(line) {
        return true;
    }

    RE_RATIO.is_match(line) || RE_CJK_PAGE.is_match(line) || RE_EN_PAGE.is_match(line)
}

/// The dashed form only counts when the whole line is short and whatever is
/// left after removing the digits is a single dash run, so `- 项目 -` and
/// `-- 12 -- 34 --` stay as text.
fn is_short_dash_frame(line: &str) -> bool {
    let digit_count = RE_DIGIT.find_iter(line).count();
    if !(1..=4).contains(&digit_count) || line.chars().count() > 10 {
        return false;
    }
    let residue = RE_DIGIT.replace_all(line, "");
    DASH_FRAMES.contains(&residue.trim())
}
