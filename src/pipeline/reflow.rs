//! Line re-flow: the heuristic state machine that turns extracted text lines
//! into headings, list items and paragraphs.
//!
//! ## Why a state machine?
//!
//! PDF text extraction loses structure. A heading numbered `3.` often comes
//! out as two physical lines (`3.` then `市场分析`), a bullet and its
//! description land on separate lines, and page numbers are interleaved with
//! body text. Without a layout model the only signal left is the sequence of
//! lines itself, so the scan looks at each line with one line of lookahead
//! and keeps a single pending line that a later numeral may still claim.
//!
//! ## Rule order
//!
//! The rules in [`RULES`] overlap (a bare `3.` also looks like the start of a
//! `3. title` heading), so they run in a fixed order and the first one that
//! handles a line wins. Plain text is the last rule and handles everything.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use super::blocks::Block;
use super::noise::is_page_number_line;

/// Start of a page marker line.
pub const PAGE_MARKER_PREFIX: &str = "--- 第";
/// End of a page marker line.
pub const PAGE_MARKER_SUFFIX: &str = "页 ---";

static RE_MARKER_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"第 (\d+) 页").unwrap());
static RE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[•\-·*]\s*(\S[^。！？；;:]*)\s*$").unwrap());
static RE_BULLET_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-·*]\s+").unwrap());
static RE_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.$").unwrap());
static RE_NUMERAL_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+(.+)$").unwrap());
static RE_SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[。！？]").unwrap());
static RE_SUBNUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.$").unwrap());
static RE_SUBNUMERAL_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\s+.+$").unwrap());

/// Longest remainder, in characters, that `N. remainder` may have to count
/// as a heading.
const MAX_INLINE_TITLE_CHARS: usize = 10;

/// Format the marker line that introduces page `page` in the text stream.
pub fn page_marker(page: usize) -> String {
    format!("--- 第 {page} 页 ---")
}

/// Parse a page marker line, returning its page number.
///
/// A line with the marker prefix and suffix but no readable number is not a
/// marker and is handled as ordinary text.
pub fn parse_page_marker(line: &str) -> Option<usize> {
    if !line.starts_with(PAGE_MARKER_PREFIX) || !line.ends_with(PAGE_MARKER_SUFFIX) {
        return None;
    }
    RE_MARKER_PAGE.captures(line)?.get(1)?.as_str().parse().ok()
}

/// Supplies the blocks inserted when the scan reaches a page marker.
pub trait PageAssetSource {
    /// Blocks (images, tables, rules) that open page `page`.
    fn page_blocks(&self, page: usize) -> Vec<Block>;
}

/// No assets: text-only documents.
impl PageAssetSource for () {
    fn page_blocks(&self, _page: usize) -> Vec<Block> {
        Vec::new()
    }
}

/// Re-flow a page-marked text stream into Markdown blocks.
///
/// `assets` is asked for the blocks of each page as its marker is reached.
pub fn reflow(text: &str, assets: &dyn PageAssetSource) -> Vec<Block> {
    let raw_lines: Vec<&str> = text.split('\n').collect();
    let mut scanner = Scanner::new(assets);

    for (index, raw) in raw_lines.iter().enumerate() {
        if std::mem::take(&mut scanner.state.skip_next) {
            continue;
        }

        let text = raw.trim();
        if text.is_empty() || is_page_number_line(text) {
            continue;
        }

        let line = Line {
            index,
            text,
            next: raw_lines.get(index + 1).map(|n| n.trim()),
        };

        for (name, rule) in RULES {
            if let Step::Done = rule(&mut scanner, &line) {
                trace!(
                    page = scanner.state.current_page,
                    line = line.index,
                    rule = name,
                    "line classified"
                );
                break;
            }
        }
    }

    scanner.finish()
}

// ── Scan state ───────────────────────────────────────────────────────────────

/// Everything carried from one line to the next.
#[derive(Debug)]
struct ScanState {
    /// Last plain-text line, not yet emitted.
    pending: Option<String>,
    /// Page of the most recent marker.
    current_page: usize,
    /// The next raw line was merged into the current one.
    skip_next: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            pending: None,
            current_page: 1,
            skip_next: false,
        }
    }
}

struct Scanner<'a> {
    state: ScanState,
    blocks: Vec<Block>,
    assets: &'a dyn PageAssetSource,
}

impl<'a> Scanner<'a> {
    fn new(assets: &'a dyn PageAssetSource) -> Self {
        Self {
            state: ScanState::default(),
            blocks: Vec::new(),
            assets,
        }
    }

    /// Emit the pending line as a paragraph.
    fn flush(&mut self) {
        if let Some(line) = self.state.pending.take() {
            self.blocks.push(Block::Paragraph(line));
        }
    }

    /// Emit `block` after flushing the pending line.
    fn emit(&mut self, block: Block) {
        self.flush();
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// A trimmed, non-empty line together with the trimmed raw line after it.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    index: usize,
    text: &'a str,
    /// May be blank: lookahead never skips over empty lines.
    next: Option<&'a str>,
}

impl<'a> Line<'a> {
    /// The following line, when it can be merged into this one.
    fn continuation(&self) -> Option<&'a str> {
        self.next.filter(|next| {
            !next.is_empty()
                && !is_page_number_line(next)
                && !next.starts_with(PAGE_MARKER_PREFIX)
        })
    }
}

// ── Rules ────────────────────────────────────────────────────────────────────

enum Step {
    /// The line was consumed.
    Done,
    /// Try the next rule.
    Pass,
}

type Rule = fn(&mut Scanner<'_>, &Line<'_>) -> Step;

const RULES: [(&str, Rule); 7] = [
    ("page_marker", page_marker_rule),
    ("bullet_merge", bullet_merge),
    ("bare_numeral", bare_numeral),
    ("inline_numeral", inline_numeral),
    ("bare_subnumeral", bare_subnumeral),
    ("inline_subnumeral", inline_subnumeral),
    ("plain_text", plain_text),
];

/// `--- 第 N 页 ---`: open page N. A pending line from the previous page is
/// dropped, never carried across the boundary.
fn page_marker_rule(s: &mut Scanner<'_>, line: &Line<'_>) -> Step {
    let Some(page) = parse_page_marker(line.text) else {
        return Step::Pass;
    };

    s.state.current_page = page;
    let assets = s.assets.page_blocks(page);
    s.blocks.extend(assets);

    if let Some(dropped) = s.state.pending.take() {
        debug!(page, dropped = %dropped, "pending line discarded at page boundary");
    }
    Step::Done
}

/// `• 目标` followed by `完成度高` becomes `- 目标 完成度高`.
fn bullet_merge(s: &mut Scanner<'_>, line: &Line<'_>) -> Step {
    let Some(caps) = RE_BULLET.captures(line.text) else {
        return Step::Pass;
    };
    let Some(next) = line
        .continuation()
        .filter(|next| !RE_BULLET_START.is_match(next))
    else {
        return Step::Pass;
    };

    let item = caps[1].trim();
    s.emit(Block::ListItem(format!("{item} {next}")));
    s.state.skip_next = true;
    Step::Done
}

/// `3.` followed by `市场分析` becomes `## 3. 市场分析`.
fn bare_numeral(s: &mut Scanner<'_>, line: &Line<'_>) -> Step {
    if !RE_NUMERAL.is_match(line.text) {
        return Step::Pass;
    }
    let Some(next) = line.continuation() else {
        return Step::Pass;
    };

    s.emit(Block::heading(2, format!("{} {next}", line.text)));
    s.state.skip_next = true;
    Step::Done
}

/// `3. 市场分析` is a heading only when the title part is short and does not
/// read like a sentence.
fn inline_numeral(s: &mut Scanner<'_>, line: &Line<'_>) -> Step {
    let Some(caps) = RE_NUMERAL_TITLE.captures(line.text) else {
        return Step::Pass;
    };
    if !is_title_like(caps[1].trim()) {
        return Step::Pass;
    }

    s.emit(Block::heading(2, line.text));
    Step::Done
}

fn is_title_like(title: &str) -> bool {
    title.chars().count() <= MAX_INLINE_TITLE_CHARS
        && !RE_SENTENCE_END.is_match(title)
        && !title.ends_with('.')
}

/// `3.1.` takes its title from the next line, else from the pending line,
/// else stands alone.
fn bare_subnumeral(s: &mut Scanner<'_>, line: &Line<'_>) -> Step {
    if !RE_SUBNUMERAL.is_match(line.text) {
        return Step::Pass;
    }

    if let Some(next) = line.continuation() {
        s.emit(Block::heading(3, format!("{} {next}", line.text)));
        s.state.skip_next = true;
    } else if let Some(previous) = s.state.pending.take() {
        s.blocks
            .push(Block::heading(3, format!("{} {previous}", line.text)));
    } else {
        s.blocks.push(Block::heading(3, line.text));
    }
    Step::Done
}

/// `3.1. 规模` is always a heading.
fn inline_subnumeral(s: &mut Scanner<'_>, line: &Line<'_>) -> Step {
    if !RE_SUBNUMERAL_TITLE.is_match(line.text) {
        return Step::Pass;
    }
    s.emit(Block::heading(3, line.text));
    Step::Done
}

/// Anything else: emit the previous pending line and hold this one.
fn plain_text(s: &mut Scanner<'_>, line: &Line<'_>) -> Step {
    s.flush();
    s.state.pending = Some(line.text.to_string());
    Step::Done
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Block> {
        reflow(text, &())
    }

    fn para(s: &str) -> Block {
        Block::Paragraph(s.into())
    }

    /// Inserts a `Table` block naming the page, so tests can see where
    /// assets land.
    struct PageTags;

    impl PageAssetSource for PageTags {
        fn page_blocks(&self, page: usize) -> Vec<Block> {
            vec![Block::Table(format!("<assets {page}>"))]
        }
    }

    #[test]
    fn marker_round_trip() {
        assert_eq!(parse_page_marker(&page_marker(12)), Some(12));
        assert_eq!(parse_page_marker("--- 第 x 页 ---"), None);
        assert_eq!(parse_page_marker("第 3 页"), None);
    }

    #[test]
    fn bare_numeral_merges_with_next_line() {
        assert_eq!(run("3.\n市场分析"), vec![Block::heading(2, "3. 市场分析")]);
    }

    #[test]
    fn bare_numeral_without_continuation_is_text() {
        assert_eq!(run("3."), vec![para("3.")]);
        // Lookahead sees the blank line, not the text after it.
        assert_eq!(run("3.\n\n市场分析"), vec![para("3."), para("市场分析")]);
    }

    #[test]
    fn bare_numeral_does_not_swallow_page_numbers() {
        assert_eq!(run("3.\n12\n市场分析"), vec![para("3."), para("市场分析")]);
    }

    #[test]
    fn bullet_merges_with_description() {
        for glyph in ['•', '-', '·', '*'] {
            assert_eq!(
                run(&format!("{glyph} 目标\n完成度高")),
                vec![Block::ListItem("目标 完成度高".into())],
                "{glyph}"
            );
        }
    }

    #[test]
    fn bullet_followed_by_bullet_is_text() {
        assert_eq!(
            run("• 目标\n• 范围"),
            vec![para("• 目标"), para("• 范围")]
        );
    }

    #[test]
    fn bullet_with_sentence_punctuation_is_text() {
        assert_eq!(
            run("• 目标如下；\n完成度高"),
            vec![para("• 目标如下；"), para("完成度高")]
        );
    }

    #[test]
    fn bullet_merge_flushes_pending_first() {
        assert_eq!(
            run("引言\n- 目标\n完成度高\n结尾"),
            vec![
                para("引言"),
                Block::ListItem("目标 完成度高".into()),
                para("结尾"),
            ]
        );
    }

    #[test]
    fn short_inline_heading() {
        assert_eq!(run("2. 背景"), vec![Block::heading(2, "2. 背景")]);
    }

    #[test]
    fn long_or_sentence_inline_numeral_is_text() {
        assert_eq!(
            run("1. 本项目旨在提升支付成功率并降低成本"),
            vec![para("1. 本项目旨在提升支付成功率并降低成本")]
        );
        assert_eq!(run("1. 已完成。"), vec![para("1. 已完成。")]);
        assert_eq!(run("1. Done."), vec![para("1. Done.")]);
    }

    #[test]
    fn bare_subnumeral_prefers_next_line() {
        assert_eq!(
            run("前文\n3.1.\n市场规模"),
            vec![para("前文"), Block::heading(3, "3.1. 市场规模")]
        );
    }

    #[test]
    fn bare_subnumeral_falls_back_to_pending_line() {
        assert_eq!(
            run("市场规模\n3.1."),
            vec![Block::heading(3, "3.1. 市场规模")]
        );
    }

    #[test]
    fn bare_subnumeral_alone() {
        assert_eq!(run("3.1."), vec![Block::heading(3, "3.1.")]);
    }

    #[test]
    fn inline_subnumeral_has_no_length_limit() {
        let line = "3.1. 市场规模与增长趋势的详细分析。";
        assert_eq!(run(line), vec![Block::heading(3, line)]);
    }

    #[test]
    fn plain_lines_become_paragraphs() {
        assert_eq!(
            run("第一段\n第二段\n\n第三段"),
            vec![para("第一段"), para("第二段"), para("第三段")]
        );
    }

    #[test]
    fn page_marker_inserts_assets_and_drops_pending_line() {
        let text = "\n\n--- 第 1 页 ---\n\n正文一\n末行\n\n--- 第 2 页 ---\n\n正文二";
        let blocks = reflow(text, &PageTags);
        assert_eq!(
            blocks,
            vec![
                Block::Table("<assets 1>".into()),
                para("正文一"),
                Block::Table("<assets 2>".into()),
                para("正文二"),
            ]
        );
    }

    #[test]
    fn numeral_never_merges_across_a_page_marker() {
        let blocks = reflow("3.\n--- 第 2 页 ---\n市场分析", &PageTags);
        assert_eq!(
            blocks,
            vec![
                Block::Table("<assets 2>".into()),
                para("市场分析"),
            ]
        );
    }

    #[test]
    fn page_numbers_are_dropped() {
        assert_eq!(
            run("正文\n- 3 -\n第 3 / 24 页\nPage 3 of 24\n下文"),
            vec![para("正文"), para("- 3 -"), para("下文")]
        );
    }

    #[test]
    fn merged_line_is_not_processed_again() {
        // `3.1.` is consumed by the `3.` merge and must not become a heading.
        assert_eq!(run("3.\n3.1.\n正文"), vec![Block::heading(2, "3. 3.1."), para("正文")]);
    }
}
