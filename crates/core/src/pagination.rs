//! Client-side paging over an already fetched result set.

use serde::Serialize;

/// Grid size of one catalog page.
pub const ITEMS_PER_PAGE: usize = 24;

/// Upstream refuses pages past 500, so the pager never offers them.
pub const MAX_PAGER_PAGES: u32 = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: usize,
}

/// Slice `items` into fixed-size pages and return the requested one.
///
/// `page` is 1-based and clamped into range; an empty input yields page 1 of 0.
pub fn paginate<T: Clone>(items: &[T], page: u32, per_page: usize) -> Paged<T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page) as u32;
    let page = page.clamp(1, total_pages.max(1));

    let start = (page as usize - 1) * per_page;
    let end = (start + per_page).min(items.len());
    let slice = items.get(start..end).unwrap_or_default();

    Paged {
        items: slice.to_vec(),
        page,
        total_pages,
        total_items: items.len(),
    }
}

/// One slot in the pager under a grid.
///
/// Serializes as the page number, or `"..."` for a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerEntry {
    Page(u32),
    Ellipsis,
}

impl Serialize for PagerEntry {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Page(n) => s.serialize_u32(*n),
            Self::Ellipsis => s.serialize_str("..."),
        }
    }
}

/// Page numbers to show: everything up to 7 pages, otherwise the first and
/// last page around a window of `current ± 1`, with gaps marked by ellipses.
pub fn page_window(current: u32, total_pages: u32) -> Vec<PagerEntry> {
    let last = total_pages.min(MAX_PAGER_PAGES);
    if last <= 7 {
        return (1..=last).map(PagerEntry::Page).collect();
    }

    let mut entries = vec![PagerEntry::Page(1)];
    if current > 3 {
        entries.push(PagerEntry::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(last - 1);
    entries.extend((start..=end).map(PagerEntry::Page));

    if current + 2 < last {
        entries.push(PagerEntry::Ellipsis);
    }
    entries.push(PagerEntry::Page(last));
    entries
}
