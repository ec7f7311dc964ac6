//! Which embedded images are kept, and what they are called on disk.
//!
//! The last two pages of the source documents are typically a sign-off and a
//! back cover whose logos and stamps add nothing to the text. When exclusion
//! is enabled an image is kept only if `page + 1 < max_page`, where
//! `max_page` is the highest page that holds any image candidate (not the
//! document page count).

/// An image object found on a page, not yet decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCandidate {
    /// 1-indexed page number.
    pub page: usize,
    /// 1-indexed position among the image objects of that page.
    pub index: usize,
    /// Position of the object in the page's object list, used to find it again
    /// when decoding.
    pub object_index: usize,
}

/// Split candidates into `(kept, skipped_count)`, preserving order.
pub fn select_images(
    candidates: Vec<ImageCandidate>,
    exclude_last_two: bool,
) -> (Vec<ImageCandidate>, usize) {
    if !exclude_last_two {
        return (candidates, 0);
    }

    let Some(max_page) = candidates.iter().map(|c| c.page).max() else {
        return (candidates, 0);
    };

    let total = candidates.len();
    let kept: Vec<ImageCandidate> = candidates
        .into_iter()
        .filter(|c| c.page + 1 < max_page)
        .collect();
    let skipped = total - kept.len();
    (kept, skipped)
}

/// `{stem}_page_{page}_img_{index}.png`
pub fn image_filename(stem: &str, page: usize, index: usize) -> String {
    format!("{stem}_page_{page}_img_{index}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_pages(pages: &[usize]) -> Vec<ImageCandidate> {
        pages
            .iter()
            .enumerate()
            .map(|(i, &page)| ImageCandidate {
                page,
                index: 1,
                object_index: i,
            })
            .collect()
    }

    fn pages_of(kept: &[ImageCandidate]) -> Vec<usize> {
        kept.iter().map(|c| c.page).collect()
    }

    #[test]
    fn last_two_image_pages_are_dropped() {
        let (kept, skipped) = select_images(on_pages(&[1, 2, 3, 4, 5]), true);
        assert_eq!(pages_of(&kept), vec![1, 2, 3]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn max_page_comes_from_candidates() {
        // Images on pages 1 and 3 of a long document: max_page is 3, so only
        // page 1 survives.
        let (kept, skipped) = select_images(on_pages(&[1, 3, 3]), true);
        assert_eq!(pages_of(&kept), vec![1]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn single_page_document_keeps_nothing() {
        let (kept, skipped) = select_images(on_pages(&[1, 1]), true);
        assert!(kept.is_empty());
        assert_eq!(skipped, 2);
    }

    #[test]
    fn exclusion_disabled_keeps_everything() {
        let (kept, skipped) = select_images(on_pages(&[1, 2, 3]), false);
        assert_eq!(kept.len(), 3);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn no_candidates() {
        let (kept, skipped) = select_images(Vec::new(), true);
        assert!(kept.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn filename_format() {
        assert_eq!(image_filename("12.年度总结", 3, 2), "12.年度总结_page_3_img_2.png");
    }
}
