//! Paginated collection contract: request parameters and page results.
//!
//! The backend understands one sort clause (`sort=<field>:<asc|desc>`) and one
//! filter clause (`filter=<field>:<operator>:<value>`). Grid widgets emit
//! multi-item models; [`SortModel`] and [`FilterModel`] collapse them to the
//! single clause the backend accepts.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filter comparison understood by the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Substring match.
    Contains,
    /// Exact match.
    Is,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Is => "is",
        }
    }
}

/// Failure to parse a sort or filter clause from its wire form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClauseParseError {
    #[error("expected `field:asc|desc`, got `{0}`")]
    Sort(String),
    #[error("expected `field:contains|is:value`, got `{0}`")]
    Filter(String),
    #[error("unknown sort order `{0}`")]
    Order(String),
    #[error("unknown filter operator `{0}`")]
    Operator(String),
}

impl FromStr for SortOrder {
    type Err = ClauseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ClauseParseError::Order(other.to_string())),
        }
    }
}

impl FromStr for FilterOperator {
    type Err = ClauseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contains" => Ok(FilterOperator::Contains),
            "is" => Ok(FilterOperator::Is),
            other => Err(ClauseParseError::Operator(other.to_string())),
        }
    }
}

/// Single-column sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.order.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = ClauseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = s
            .split_once(':')
            .filter(|(field, _)| !field.is_empty())
            .ok_or_else(|| ClauseParseError::Sort(s.to_string()))?;

        Ok(Self::new(field, order.parse()?))
    }
}

/// Single-clause filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterSpec {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    pub fn is(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Is, value)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.field, self.operator.as_str(), self.value)
    }
}

impl FromStr for FilterSpec {
    type Err = ClauseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(field), Some(operator), Some(value)) if !field.is_empty() => {
                Ok(Self::new(field, operator.parse()?, value))
            }
            _ => Err(ClauseParseError::Filter(s.to_string())),
        }
    }
}

/// Parameters of one paginated fetch.
///
/// `page` is 1-based. Both `page` and `size` are normalised to at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
            sort: None,
            filter: None,
        }
    }

    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filter(mut self, filter: Option<FilterSpec>) -> Self {
        self.filter = filter;
        self
    }

    /// Index of the first row of this page in the full ordered collection.
    ///
    /// A deserialized `page` of 0 is read as the first page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.size as usize
    }

    /// Query string pairs; `filter` and `sort` are omitted when unset.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("size", self.size.to_string())];

        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.to_string()));
        }

        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.to_string()));
        }

        pairs
    }
}

/// One page of a remote collection.
///
/// `total` is the filtered count, independent of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PageResult<T> {
    pub total: u64,
    pub page: u64,
    pub size: u64,
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub data: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn empty(request: &PageRequest) -> Self {
        Self {
            total: 0,
            page: request.page.into(),
            size: request.size.into(),
            data: Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            total: self.total,
            page: self.page,
            size: self.size,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// One entry of a grid sort model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub field: String,
    pub order: Option<SortOrder>,
}

/// Sort model as emitted by a grid (possibly several columns).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortModel {
    pub items: Vec<SortItem>,
}

impl SortModel {
    pub fn single(field: impl Into<String>, order: Option<SortOrder>) -> Self {
        Self {
            items: vec![SortItem {
                field: field.into(),
                order,
            }],
        }
    }

    /// Collapses the model to one clause.
    ///
    /// Anything other than exactly one item means "no sort"; a missing
    /// direction defaults to ascending.
    pub fn collapse(&self) -> Option<SortSpec> {
        match self.items.as_slice() {
            [item] => Some(SortSpec::new(item.field.clone(), item.order.unwrap_or_default())),
            _ => None,
        }
    }
}

/// One entry of a grid filter model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterItem {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Option<String>,
}

/// Filter model as emitted by a grid (possibly several clauses).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterModel {
    pub items: Vec<FilterItem>,
}

/// What a [`FilterModel`] means for the current filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// Replace the current filter (`None` clears it).
    Set(Option<FilterSpec>),
    /// The single clause has no value yet; keep the current filter.
    Keep,
}

impl FilterModel {
    pub fn single(field: impl Into<String>, operator: FilterOperator, value: Option<String>) -> Self {
        Self {
            items: vec![FilterItem {
                field: field.into(),
                operator,
                value,
            }],
        }
    }

    /// Collapses the model to one clause.
    ///
    /// Multi-clause models collapse to "no filter" rather than erroring.
    pub fn collapse(&self) -> FilterChange {
        match self.items.as_slice() {
            [item] => match &item.value {
                Some(value) => FilterChange::Set(Some(FilterSpec::new(
                    item.field.clone(),
                    item.operator,
                    value.clone(),
                ))),
                None => FilterChange::Keep,
            },
            _ => FilterChange::Set(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_omits_unset_clauses() {
        let request = PageRequest::new(2, 25);

        assert_eq!(
            request.query_pairs(),
            vec![("page", "2".to_string()), ("size", "25".to_string())]
        );
    }

    #[test]
    fn query_carries_filter_and_sort_wire_forms() {
        let request = PageRequest::new(1, 10)
            .with_filter(Some(FilterSpec::contains("id", "admin")))
            .with_sort(Some(SortSpec::desc("created_at")));

        let pairs = request.query_pairs();
        assert!(pairs.contains(&("filter", "id:contains:admin".to_string())));
        assert!(pairs.contains(&("sort", "created_at:desc".to_string())));
    }

    #[test]
    fn page_and_size_are_normalised_to_one() {
        let request = PageRequest::new(0, 0);
        assert_eq!((request.page, request.size), (1, 1));
        assert_eq!(request.offset(), 0);
        assert_eq!(PageRequest::new(3, 5).offset(), 10);
    }

    #[test]
    fn deserialized_page_zero_starts_at_first_row() {
        let request: PageRequest = serde_json::from_str(r#"{"page":0,"size":5}"#).unwrap();
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn clauses_parse_from_wire_form() {
        assert_eq!("name:desc".parse::<SortSpec>().unwrap(), SortSpec::desc("name"));
        assert_eq!(
            "value:is:post:123".parse::<FilterSpec>().unwrap(),
            FilterSpec::is("value", "post:123")
        );
        assert!("name".parse::<SortSpec>().is_err());
        assert!("name:sideways".parse::<SortSpec>().is_err());
        assert!("id:like:x".parse::<FilterSpec>().is_err());
        assert!(":is:x".parse::<FilterSpec>().is_err());
    }

    #[test]
    fn sort_model_collapses_to_single_column() {
        assert_eq!(SortModel::default().collapse(), None);
        assert_eq!(SortModel::single("id", None).collapse(), Some(SortSpec::asc("id")));

        let multi = SortModel {
            items: vec![
                SortItem { field: "id".into(), order: Some(SortOrder::Asc) },
                SortItem { field: "name".into(), order: Some(SortOrder::Desc) },
            ],
        };
        assert_eq!(multi.collapse(), None);
    }

    #[test]
    fn filter_model_collapses_to_single_clause() {
        let single = FilterModel::single("id", FilterOperator::Contains, Some("adm".into()));
        assert_eq!(
            single.collapse(),
            FilterChange::Set(Some(FilterSpec::contains("id", "adm")))
        );

        let pending = FilterModel::single("id", FilterOperator::Is, None);
        assert_eq!(pending.collapse(), FilterChange::Keep);

        let multi = FilterModel {
            items: vec![
                FilterItem { field: "id".into(), operator: FilterOperator::Is, value: Some("a".into()) },
                FilterItem { field: "kind".into(), operator: FilterOperator::Is, value: Some("b".into()) },
            ],
        };
        assert_eq!(multi.collapse(), FilterChange::Set(None));
        assert_eq!(FilterModel::default().collapse(), FilterChange::Set(None));
    }

    #[test]
    fn page_result_decodes_backend_body() {
        let page: PageResult<String> = serde_json::from_value(serde_json::json!({
            "total": 12, "page": 1, "size": 5, "data": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.data, vec!["a", "b"]);

        let empty: PageResult<String> = serde_json::from_value(serde_json::json!({
            "total": 0, "page": 1, "size": 5, "data": null
        }))
        .unwrap();
        assert!(empty.data.is_empty());
    }
}
