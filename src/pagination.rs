use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::{json::Json, Serialize};

/// A resolved page window over a result set of known size.
///
/// The raw `page` query value is never rejected: anything that is not a
/// positive integer serves the first page, and a number past the end serves
/// the last one. An empty set still has one (empty) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
}

/// Digits-only values that overflow `i64` are still past the end.
fn requested_number(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        Some(s.parse::<i64>().unwrap_or(i64::MAX))
    } else {
        s.parse::<i64>().ok()
    }
}

impl Page {
    pub fn resolve(raw: Option<&str>, count: i64, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = ((count.max(0) + per_page - 1) / per_page).max(1);
        let number = raw
            .and_then(requested_number)
            .filter(|n| *n > 0)
            .unwrap_or(1)
            .min(num_pages);
        Page {
            number,
            num_pages,
            per_page,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Wraps items already fetched with `offset()`/`limit()`.
    pub fn wrap<T>(self, items: Vec<T>) -> Paginated<T> {
        Paginated {
            items,
            has_previous: self.has_previous(),
            has_next: self.has_next(),
        }
    }
}

#[cfg(test)]
impl Page {
    /// Cuts this page out of a fully loaded, ordered sequence.
    pub fn slice<T>(self, items: Vec<T>) -> Paginated<T> {
        let window = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect();
        self.wrap(window)
    }
}

#[cfg(test)]
pub fn paginate<T>(items: Vec<T>, raw: Option<&str>, per_page: i64) -> Paginated<T> {
    Page::resolve(raw, items.len() as i64, per_page).slice(items)
}

#[derive(Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for Paginated<T> {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        Response::build_from(Json(self.items).respond_to(req)?)
            .raw_header("X-Has-Previous", self.has_previous.to_string())
            .raw_header("X-Has-Next", self.has_next.to_string())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_page_serves_first() {
        let p = Page::resolve(Some("abc"), 30, 10);
        assert_eq!(p.number, 1);
        assert!(!p.has_previous());
        assert!(p.has_next());

        assert_eq!(Page::resolve(None, 30, 10).number, 1);
        assert_eq!(Page::resolve(Some("0"), 30, 10).number, 1);
        assert_eq!(Page::resolve(Some("-4"), 30, 10).number, 1);
        assert_eq!(Page::resolve(Some("2.5"), 30, 10).number, 1);
    }

    #[test]
    fn overflow_serves_last() {
        let p = Page::resolve(Some("9999"), 30, 10);
        assert_eq!(p.num_pages, 3);
        assert_eq!(p.number, 3);
        assert_eq!(p.offset(), 20);
        assert!(p.has_previous());
        assert!(!p.has_next());
    }

    #[test]
    fn huge_page_number_serves_last() {
        let p = Page::resolve(Some("99999999999999999999"), 30, 10);
        assert_eq!(p.number, 3);
        assert!(!p.has_next());
        assert_eq!(Page::resolve(Some(" 9223372036854775808 "), 5, 10).number, 1);
        assert_eq!(Page::resolve(Some("-99999999999999999999"), 30, 10).number, 1);
        assert_eq!(Page::resolve(Some("0000"), 30, 10).number, 1);
    }

    #[test]
    fn has_next_false_only_on_last_page() {
        for n in 1..=3 {
            let p = Page::resolve(Some(&n.to_string()), 25, 10);
            assert_eq!(p.has_next(), n != 3);
            assert_eq!(p.has_previous(), n != 1);
        }
    }

    #[test]
    fn empty_set_has_one_page() {
        let p = Page::resolve(Some("5"), 0, 10);
        assert_eq!(p.number, 1);
        assert_eq!(p.num_pages, 1);
        assert!(!p.has_previous());
        assert!(!p.has_next());
        assert!(p.slice(Vec::<i32>::new()).items.is_empty());
    }

    #[test]
    fn slices_in_memory_sequences() {
        let last = paginate((1..=25).collect::<Vec<i32>>(), Some("9999"), 10);
        assert_eq!(last.items, (21..=25).collect::<Vec<_>>());
        assert!(last.has_previous);
        assert!(!last.has_next);

        let single = paginate(vec!["a", "b", "c"], Some("2"), 1);
        assert_eq!(single.items, vec!["b"]);
        assert!(single.has_previous && single.has_next);
    }
}
