//! Document titles from source file names.
//!
//! Source PDFs are typically named like `12.《年度总结》（终稿）_V20230101.pdf`:
//! a chapter numeral, a description with full-width punctuation, and a
//! version stamp. The cleaned name doubles as the Markdown title, the output
//! file stem and the prefix of every extracted image, so it must be safe on
//! any file system.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"_V\d{8}").unwrap());
static RE_PDF_EXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.pdf$").unwrap());
static RE_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());
static RE_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\-_()]").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean a PDF file name (with or without extension) into a document title.
///
/// Version stamps (`_V` + 8 digits) and a trailing `.pdf` are always removed.
/// Names that start with a numeral such as `12.` additionally get their
/// description sanitised; other names are returned as-is after that.
pub fn clean_filename(filename: &str) -> String {
    let name = RE_VERSION.replace_all(filename, "");
    let name = RE_PDF_EXT.replace(&name, "").into_owned();

    let Some(numeral) = RE_NUMERAL.find(&name) else {
        return name;
    };
    let numeral = numeral.as_str();
    let description = clean_description(&name[numeral.len()..]);

    if description.is_empty() {
        numeral.to_string()
    } else {
        format!("{numeral}{description}")
    }
}

fn clean_description(raw: &str) -> String {
    let text = raw
        .trim()
        .replace('：', "_")
        .replace('（', "(")
        .replace('）', ")")
        .replace(['《', '》'], "");
    let text = RE_UNSAFE.replace_all(&text, "");
    let text = RE_WHITESPACE.replace_all(&text, "_");
    text.trim_matches('_').to_string()
}
