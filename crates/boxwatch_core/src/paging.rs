use std::fmt;
use std::ops::RangeInclusive;

use url::form_urlencoded;

use crate::UnitId;

pub const PAGE_SIZE: u32 = 100;
/// Unit count assumed until the service reports one.
pub const DEFAULT_UNIT_COUNT: u32 = 10;
/// Number of page-number links shown around the current page.
const PAGE_WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    current_page: u32,
    page_size: u32,
    total_units: u32,
    total_pages: u32,
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new(DEFAULT_UNIT_COUNT, 1)
    }
}

impl PageContext {
    /// Builds the context for `total_units`, clamping `requested_page` into range.
    pub fn new(total_units: u32, requested_page: u32) -> Self {
        let total_pages = total_units.div_ceil(PAGE_SIZE);
        let mut context = Self {
            current_page: 1,
            page_size: PAGE_SIZE,
            total_units,
            total_pages,
        };
        context.current_page = context.clamp_page(requested_page);
        context
    }

    pub fn with_page(self, page: u32) -> Self {
        Self {
            current_page: self.clamp_page(page),
            ..self
        }
    }

    /// Highest selectable page. An empty unit set still has one (empty) page.
    pub fn last_page(&self) -> u32 {
        self.total_pages.max(1)
    }

    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.last_page())
    }

    pub fn is_valid_page(&self, page: u32) -> bool {
        (1..=self.last_page()).contains(&page)
    }

    /// Unit ids shown on the current page. Empty when there are no units.
    pub fn visible_range(&self) -> RangeInclusive<UnitId> {
        let page = u64::from(self.current_page);
        let size = u64::from(self.page_size);
        let start = (page - 1) * size + 1;
        let end = (page * size).min(u64::from(self.total_units));
        // Both bounds are at most the total, except `start` on an empty set.
        let clamp = |id: u64| UnitId::try_from(id).unwrap_or(UnitId::MAX);
        clamp(start)..=clamp(end)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_units(&self) -> u32 {
        self.total_units
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn needs_pagination(&self) -> bool {
        self.total_units > self.page_size
    }
}

/// The dashboard's address: a query string carrying the page parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    page: u32,
}

impl Default for Location {
    fn default() -> Self {
        Self::for_page(1)
    }
}

impl Location {
    pub fn for_page(page: u32) -> Self {
        Self { page: page.max(1) }
    }

    /// Parses `?page=N`. A missing, unparsable or non-positive page means page 1.
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let page = form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| *key == "page")
            .and_then(|(_, value)| value.trim().parse::<u32>().ok())
            .unwrap_or(1);
        Self::for_page(page)
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &self.page.to_string())
            .finish();
        write!(f, "?{query}")
    }
}

/// Back/forward history of visited locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavHistory {
    entries: Vec<Location>,
    index: usize,
}

impl Default for NavHistory {
    fn default() -> Self {
        Self::new(Location::default())
    }
}

impl NavHistory {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> Location {
        self.entries[self.index]
    }

    /// Pushes a new entry, discarding any forward entries.
    pub fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }

    pub fn replace(&mut self, location: Location) {
        self.entries[self.index] = location;
    }

    pub fn back(&mut self) -> Option<Location> {
        self.index = self.index.checked_sub(1)?;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<Location> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Prev,
    Next,
    First,
    Last,
    Page(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Prev { target: u32, enabled: bool },
    Page { number: u32, active: bool },
    Ellipsis,
    Next { target: u32, enabled: bool },
}

/// Pagination controls for the current page, empty when everything fits on one page.
pub fn pagination_links(context: &PageContext) -> Vec<PageLink> {
    if !context.needs_pagination() {
        return Vec::new();
    }
    let current = context.current_page();
    let total = context.total_pages();
    let window_start = current.saturating_sub(2).max(1);
    let window_end = (window_start + PAGE_WINDOW - 1).min(total);

    let mut links = vec![PageLink::Prev {
        target: current.saturating_sub(1).max(1),
        enabled: current > 1,
    }];
    if window_start > 1 {
        links.push(PageLink::Page {
            number: 1,
            active: false,
        });
        if window_start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }
    for number in window_start..=window_end {
        links.push(PageLink::Page {
            number,
            active: number == current,
        });
    }
    if window_end < total {
        if window_end + 1 < total {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page {
            number: total,
            active: false,
        });
    }
    links.push(PageLink::Next {
        target: (current + 1).min(total),
        enabled: current < total,
    });
    links
}
