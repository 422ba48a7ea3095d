use crate::{ config::PaginatorConfig, repositories::{ Criteria, ReportQuery } };

/// A concrete page: zero-based `page` and a positive `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl PageRequest {
    /// `None` when `size` is zero.
    pub fn of(page: u64, size: u64) -> Option<Self> {
        if size == 0 {
            return None;
        }
        Some(Self { page, size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of documents before this page. Saturates instead of overflowing.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pageable {
    Paged(PageRequest),
    Unpaged,
}

impl Pageable {
    /// Resolves caller-supplied `page`/`size` against the paginator defaults.
    ///
    /// A negative page becomes `default_page`; any other page is taken as-is, however
    /// large. A size inside `(0, max_size]` is kept, everything else (zero, negative,
    /// above the maximum, the `-1` sentinel) becomes `default_size`. Never fails.
    pub fn resolve(page: i64, size: i64, config: &PaginatorConfig) -> Self {
        let page = resolve_page(page, config);
        let size = resolve_size(size, config);

        match PageRequest::of(page, size) {
            Some(request) => Pageable::Paged(request),
            None => Pageable::Unpaged,
        }
    }

    pub fn is_paged(&self) -> bool {
        matches!(self, Pageable::Paged(_))
    }
}

pub fn resolve_page(requested: i64, config: &PaginatorConfig) -> u64 {
    u64::try_from(requested).unwrap_or(u64::from(config.default_page))
}

pub fn resolve_size(requested: i64, config: &PaginatorConfig) -> u64 {
    if requested > 0 && requested <= i64::from(config.max_size) {
        requested as u64
    } else {
        u64::from(config.default_size)
    }
}

/// Builds the store query for a listing: enabled reports only, optionally narrowed to
/// one group, bounded by skip/limit when paged. Blank groups are ignored.
pub fn build_query(group: Option<&str>, pageable: Pageable) -> ReportQuery {
    let mut query = ReportQuery::new();

    if let Pageable::Paged(request) = pageable {
        query.skip(request.offset());
        query.limit(request.size());
    }

    query.add_criteria(Criteria::Enabled(true));

    if let Some(group) = group.filter(|group| !group.trim().is_empty()) {
        query.add_criteria(Criteria::Group(group.to_string()));
    }

    query
}
