use std::collections::HashMap;

pub const PAGE_SIZE: usize = 9;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub num_pages: usize,
    pub total: usize,
    /// Index of the first item on this page.
    pub offset: usize,
    pub len: usize,
}

impl Page {
    /// Resolves the `page` query value against `total` items.
    ///
    /// Missing means the first page and `last` the final one. Anything else
    /// must be a number within range, except that an empty listing still has
    /// an empty first page. `None` means the page does not exist.
    pub fn resolve(requested: Option<&str>, total: usize, per_page: usize) -> Option<Page> {
        let num_pages = total.div_ceil(per_page).max(1);
        let number = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw.parse::<usize>().ok()?,
        };
        if number == 0 || number > num_pages {
            return None;
        }
        let offset = (number - 1) * per_page;
        Some(Page {
            number,
            num_pages,
            total,
            offset,
            len: per_page.min(total.saturating_sub(offset)),
        })
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.offset..self.offset + self.len]
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> usize {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_number(&self) -> usize {
        (self.number + 1).min(self.num_pages)
    }

    pub fn numbers(&self) -> Vec<usize> {
        (1..=self.num_pages).collect()
    }
}

/// The current query string without `page`, for building page links.
pub fn querystring_without_page(query: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&str, &str)> = query
        .iter()
        .filter(|(k, v)| k.as_str() != "page" && !v.is_empty())
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort();
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}
