//! In-memory collection answering page requests like the backend does.
//!
//! Filter first (`contains` is a case-insensitive substring match, `is` is
//! equality), then sort with digit-aware ordering, then slice
//! `[(page-1)*size, page*size)`. `total` is the filtered count.

use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use authz_console_core::{
    ApiResult, FilterOperator, FilterSpec, PageFetcher, PageRequest, PageResult, SortOrder,
};

/// Exposes named fields to filtering and sorting.
pub trait Filterable {
    /// Value of `field`, or `None` if the row has no such field.
    fn field(&self, field: &str) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct InMemoryCollection<T> {
    items: Mutex<Vec<T>>,
}

impl<T> InMemoryCollection<T>
where
    T: Filterable + Clone,
{
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn push(&self, item: T) {
        self.lock().push(item);
    }

    /// Removes every row whose `field` equals `value`; returns whether any matched.
    pub fn remove(&self, field: &str, value: &str) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|item| item.field(field).as_deref() != Some(value));
        items.len() != before
    }

    pub fn page(&self, request: &PageRequest) -> PageResult<T> {
        let mut rows: Vec<T> = match &request.filter {
            Some(filter) => self.lock().iter().filter(|r| matches(*r, filter)).cloned().collect(),
            None => self.lock().clone(),
        };

        if let Some(sort) = &request.sort {
            rows.sort_by(|a, b| {
                let ord = cmp_optional(a.field(&sort.field), b.field(&sort.field));
                match sort.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let total = rows.len() as u64;
        let data = rows
            .into_iter()
            .skip(request.offset())
            .take(request.size as usize)
            .collect();

        PageResult {
            total,
            page: request.page.into(),
            size: request.size.into(),
            data,
        }
    }
}

#[async_trait]
impl<T> PageFetcher<T> for InMemoryCollection<T>
where
    T: Filterable + Clone + Send + Sync + 'static,
{
    async fn fetch_page(&self, request: &PageRequest) -> ApiResult<PageResult<T>> {
        Ok(self.page(request))
    }
}

fn matches<T: Filterable>(row: &T, filter: &FilterSpec) -> bool {
    let Some(value) = row.field(&filter.field) else {
        return false;
    };

    match filter.operator {
        FilterOperator::Contains => value.to_lowercase().contains(&filter.value.to_lowercase()),
        FilterOperator::Is => value == filter.value,
    }
}

fn cmp_optional(a: Option<String>, b: Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => natural_cmp(&a, &b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// Orders strings with embedded numbers by value: `item-2 < item-10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (chunks(a), chunks(b));

    for (x, y) in a.iter().zip(&b) {
        let ord = cmp_chunk(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Splits into alternating runs of ASCII digits and other characters.
fn chunks(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        if prev.is_some_and(|p| p != digit) {
            out.push(&s[start..i]);
            start = i;
        }
        prev = Some(digit);
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

fn cmp_chunk(a: &str, b: &str) -> Ordering {
    let is_digits = |s: &str| s.starts_with(|c: char| c.is_ascii_digit());

    if is_digits(a) && is_digits(b) {
        let (ta, tb) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
        ta.len()
            .cmp(&tb.len())
            .then_with(|| ta.cmp(tb))
            .then_with(|| a.len().cmp(&b.len()))
    } else {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authz_console_core::SortSpec;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        kind: String,
    }

    impl Filterable for Row {
        fn field(&self, field: &str) -> Option<String> {
            match field {
                "name" => Some(self.name.clone()),
                "kind" => Some(self.kind.clone()),
                _ => None,
            }
        }
    }

    fn row(name: &str, kind: &str) -> Row {
        Row {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn natural_order_compares_numbers_by_value() {
        assert_eq!(natural_cmp("item-2", "item-10"), Ordering::Less);
        assert_eq!(natural_cmp("item-10", "item-9"), Ordering::Greater);
        assert_eq!(natural_cmp("a", "a1"), Ordering::Less);
        assert_eq!(natural_cmp("v007", "v7"), Ordering::Greater);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn filter_then_sort_then_slice() {
        let collection = InMemoryCollection::new(vec![
            row("Post-2", "post"),
            row("user-1", "user"),
            row("post-10", "post"),
            row("post-1", "post"),
        ]);

        let request = PageRequest::new(1, 2)
            .with_filter(Some(FilterSpec::contains("name", "POST")))
            .with_sort(Some(SortSpec::desc("name")));
        let page = collection.page(&request);

        assert_eq!(page.total, 3);
        assert_eq!(names(&page.data), vec!["post-10", "post-1"]);

        let exact = collection.page(&PageRequest::new(1, 10).with_filter(Some(FilterSpec::is("kind", "user"))));
        assert_eq!(names(&exact.data), vec!["user-1"]);
    }

    #[test]
    fn unknown_filter_field_matches_nothing() {
        let collection = InMemoryCollection::new(vec![row("a", "x")]);
        let page = collection.page(&PageRequest::new(1, 10).with_filter(Some(FilterSpec::is("owner", "a"))));

        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn remove_drops_matching_rows() {
        let collection = InMemoryCollection::new(vec![row("a", "x"), row("b", "x")]);

        assert!(collection.remove("name", "a"));
        assert!(!collection.remove("name", "a"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn page_zero_reads_as_first_page() {
        let collection = InMemoryCollection::new(vec![row("a", "x"), row("b", "x"), row("c", "x")]);
        let request = PageRequest {
            page: 0,
            ..PageRequest::new(1, 2)
        };

        let page = collection.page(&request);
        assert_eq!(page.total, 3);
        assert_eq!(names(&page.data), vec!["a", "b"]);
    }

    proptest! {
        #[test]
        fn pages_are_contiguous_slices(count in 0usize..40, page in 1u32..8, size in 1u32..12, desc in any::<bool>()) {
            let rows: Vec<Row> = (1..=count).map(|i| row(&format!("item-{i}"), "item")).collect();
            let collection = InMemoryCollection::new(rows);
            let sort = if desc { SortSpec::desc("name") } else { SortSpec::asc("name") };

            let full = collection.page(&PageRequest::new(1, 1000).with_sort(Some(sort.clone())));
            let result = collection.page(&PageRequest::new(page, size).with_sort(Some(sort)));

            let start = ((page - 1) * size) as usize;
            let expected: Vec<Row> = full.data.iter().skip(start).take(size as usize).cloned().collect();

            prop_assert!(result.data.len() <= size as usize);
            prop_assert_eq!(result.total, count as u64);
            prop_assert_eq!(result.data, expected);
        }
    }
}
