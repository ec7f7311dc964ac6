//! Page text cleanup before it enters the marked text stream.
//!
//! pdfium reports line breaks as `\r\n` and keeps the invisible formatting
//! characters of the source document. Both would leak into the re-flowed
//! Markdown: a stray `\r` survives `split('\n')` until trimming, and a
//! zero-width space makes `3.` fail to match as a bare numeral.

/// Characters dropped from page text.
const INVISIBLE: [char; 6] = [
    '\u{200B}', // zero-width space
    '\u{FEFF}', // BOM
    '\u{00AD}', // soft hyphen
    '\u{200C}', // ZWNJ
    '\u{200D}', // ZWJ
    '\u{2060}', // word joiner
];

/// Apply every cleanup rule, in order.
pub fn normalise_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    remove_invisible_chars(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(INVISIBLE, "")
}
