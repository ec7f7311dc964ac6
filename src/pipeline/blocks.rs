//! Markdown blocks: the output document as an ordered list.
//!
//! The engine never concatenates strings directly. Each stage pushes typed
//! blocks and [`render_document`] turns them into text in one place, so the
//! spacing rule (every block followed by exactly one blank line) lives here
//! and nowhere else.

/// Alt text prefix for embedded images: `![图片1](...)`.
pub const IMAGE_ALT_PREFIX: &str = "图片";

/// One unit of the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `# title`, the first line of every document.
    Title(String),
    /// `##` or `###` numbered heading. `text` already holds the numeral.
    Heading { level: u8, text: String },
    /// A plain line of body text.
    Paragraph(String),
    /// `- item`, produced by bullet merging.
    ListItem(String),
    /// `![图片{index}](./{dir}/{filename})`.
    Image {
        index: usize,
        dir: String,
        filename: String,
    },
    /// A pre-rendered pipe table, see [`super::table::render_table`].
    Table(String),
    /// `---` between a page's assets and its text.
    Rule,
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            text: text.into(),
        }
    }

    /// Append this block, including its trailing blank line, to `out`.
    pub fn write_to(&self, out: &mut String) {
        match self {
            Block::Title(t) => {
                out.push_str("# ");
                out.push_str(t);
                out.push_str("\n\n");
            }
            Block::Heading { level, text } => {
                for _ in 0..*level {
                    out.push('#');
                }
                out.push(' ');
                out.push_str(text);
                out.push_str("\n\n");
            }
            Block::Paragraph(text) => {
                out.push_str(text);
                out.push_str("\n\n");
            }
            Block::ListItem(text) => {
                out.push_str("- ");
                out.push_str(text);
                out.push_str("\n\n");
            }
            Block::Image {
                index,
                dir,
                filename,
            } => {
                out.push_str(&format!(
                    "![{IMAGE_ALT_PREFIX}{index}](./{dir}/{filename})\n\n"
                ));
            }
            // Rendered tables carry their own trailing blank line.
            Block::Table(md) => out.push_str(md),
            Block::Rule => out.push_str("---\n\n"),
        }
    }
}

/// Render a block sequence into the final Markdown text.
pub fn render_document(blocks: &[Block]) -> String {
    let mut out = String::with_capacity(blocks.len() * 64);
    for block in blocks {
        block.write_to(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels() {
        assert_eq!(
            render_document(&[Block::heading(2, "3. 市场分析")]),
            "## 3. 市场分析\n\n"
        );
        assert_eq!(
            render_document(&[Block::heading(3, "3.1. 规模")]),
            "### 3.1. 规模\n\n"
        );
    }

    #[test]
    fn image_embed_uses_relative_dir() {
        let block = Block::Image {
            index: 2,
            dir: "images".into(),
            filename: "doc_page_1_img_2.png".into(),
        };
        assert_eq!(
            render_document(&[block]),
            "![图片2](./images/doc_page_1_img_2.png)\n\n"
        );
    }

    #[test]
    fn blocks_are_separated_by_one_blank_line() {
        let md = render_document(&[
            Block::Title("报告".into()),
            Block::Paragraph("正文".into()),
            Block::ListItem("目标 完成度高".into()),
            Block::Rule,
        ]);
        assert_eq!(md, "# 报告\n\n正文\n\n- 目标 完成度高\n\n---\n\n");
    }

    #[test]
    fn table_block_is_written_verbatim() {
        let md = render_document(&[Block::Table("| a |\n| --- |\n\n".into())]);
        assert_eq!(md, "| a |\n| --- |\n\n");
    }
}
