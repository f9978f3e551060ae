use crate::error::ToolError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start_page: u32, // 1-based inclusive
    pub end_page: u32,   // 1-based inclusive
}

impl PageRange {
    pub fn single(page: u32) -> Self {
        Self {
            start_page: page,
            end_page: page,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_page, self.end_page)
    }
}

/// A `start[-end]` argument as typed, before it is fitted to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: i64,
    pub end: i64,
}

impl RangeSpec {
    /// Splits on `-`. A missing end means a single page; parts past the
    /// second are ignored.
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        let mut parts = raw.split('-');
        let start = parse_part(raw, parts.next(), "start")?;
        let end = match parts.next() {
            Some(p) => parse_part(raw, Some(p), "end")?,
            None => start,
        };
        Ok(Self { start, end })
    }

    /// Clamps to the document, swapping reversed bounds. The result always
    /// names existing pages; `None` when the document has no pages.
    pub fn normalize(&self, total_pages: u32) -> Option<PageRange> {
        if total_pages == 0 {
            return None;
        }
        let total = i64::from(total_pages);
        let mut start = self.start.max(1);
        let mut end = self.end.min(total);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        let start = start.clamp(1, total);
        let end = end.clamp(1, total);
        Some(PageRange {
            start_page: start as u32,
            end_page: end as u32,
        })
    }
}

fn parse_part(raw: &str, part: Option<&str>, which: &str) -> Result<i64, ToolError> {
    let invalid = |reason: String| ToolError::InvalidRange {
        spec: raw.to_string(),
        reason,
    };
    let part = part.map(str::trim).unwrap_or_default();
    if part.is_empty() {
        return Err(invalid(format!("missing {which} page")));
    }
    part.parse::<i64>()
        .map_err(|e| invalid(format!("{which} page '{part}': {e}")))
}
