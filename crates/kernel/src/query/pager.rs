//! Pagination executor.
//!
//! Runs the windowed fetch and the count for one filtered listing request
//! and assembles a [`Page`].

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use sqlx::{PgPool, Postgres};

use super::builder::IdeasQueryBuilder;
use super::filter::{self, Predicate};
use super::sort::ResolvedSort;
use crate::db::StoreError;
use crate::models::idea::Idea;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 500;

/// Page size bounds, taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }
}

/// A normalized `LIMIT` / `OFFSET` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

impl PageWindow {
    /// Normalize raw parameters.
    ///
    /// Non-numeric values use the default, negative values become zero and
    /// the limit is capped at `limits.max_limit`.
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>, limits: PageLimits) -> Self {
        let limit = parse_non_negative(limit).unwrap_or(limits.default_limit);
        let offset = parse_non_negative(offset).unwrap_or(0);
        Self {
            limit: limit.min(limits.max_limit),
            offset,
        }
    }
}

fn parse_non_negative(raw: Option<&str>) -> Option<u64> {
    let value: i64 = raw?.trim().parse().ok()?;
    Some(u64::try_from(value).unwrap_or(0))
}

/// One window of results plus the size of the full matching set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub returned_count: u64,
    pub total_count: u64,
    pub window: PageWindow,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, total_count: u64, window: PageWindow) -> Self {
        let returned_count = rows.len() as u64;
        Self {
            rows,
            returned_count,
            total_count,
            window,
            has_more: window.offset.saturating_add(returned_count) < total_count,
        }
    }
}

/// A fully resolved filtered listing request.
#[derive(Debug, Clone)]
pub struct IdeaQuery {
    pub predicate: Predicate,
    pub sort: ResolvedSort,
    pub window: PageWindow,
    /// Recognized filter parameters as received, for echoing back.
    pub given_filters: BTreeMap<&'static str, String>,
}

impl IdeaQuery {
    /// Resolve raw query-string parameters. Never fails: bad input falls
    /// back to defaults.
    pub fn from_params(params: &HashMap<String, String>, limits: PageLimits) -> Self {
        Self {
            predicate: Predicate::from_params(params),
            sort: ResolvedSort::resolve(
                params.get("sortBy").map(String::as_str),
                params.get("sortOrder").map(String::as_str),
            ),
            window: PageWindow::from_raw(
                params.get("limit").map(String::as_str),
                params.get("offset").map(String::as_str),
                limits,
            ),
            given_filters: filter::given_filters(params),
        }
    }
}

/// Execute the count and the windowed fetch in one read-only snapshot.
pub async fn execute(pool: &PgPool, query: &IdeaQuery) -> Result<Page<Idea>, StoreError> {
    let builder = IdeasQueryBuilder::new(&query.predicate, query.sort);
    let count = builder.build_count();
    let select = builder.build(query.window);

    let mut tx = pool.begin().await?;

    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;

    let total = sqlx::query_scalar_with::<Postgres, i64, _>(&count.sql, count.arguments()?)
        .fetch_one(&mut *tx)
        .await?;

    let rows = sqlx::query_as_with::<Postgres, Idea, _>(&select.sql, select.arguments()?)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(
        filters = query.predicate.bindings().len(),
        sort = query.sort.label(),
        direction = query.sort.direction.as_str(),
        limit = query.window.limit,
        offset = query.window.offset,
        returned = rows.len(),
        total,
        "filtered ideas query"
    );

    Ok(Page::new(rows, u64::try_from(total).unwrap_or(0), query.window))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::query::columns::Column;
    use crate::query::sort::SortDirection;

    fn window(limit: Option<&str>, offset: Option<&str>) -> PageWindow {
        PageWindow::from_raw(limit, offset, PageLimits::default())
    }

    #[test]
    fn window_defaults() {
        assert_eq!(window(None, None), PageWindow { limit: 50, offset: 0 });
    }

    #[test]
    fn non_numeric_uses_default() {
        assert_eq!(
            window(Some("abc"), Some("1.5")),
            PageWindow { limit: 50, offset: 0 }
        );
        assert_eq!(window(Some(""), None).limit, 50);
    }

    #[test]
    fn negative_becomes_zero() {
        assert_eq!(
            window(Some("-5"), Some("-10")),
            PageWindow { limit: 0, offset: 0 }
        );
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(window(Some("100000"), None).limit, 500);
        assert_eq!(window(Some("500"), None).limit, 500);

        let limits = PageLimits {
            default_limit: 10,
            max_limit: 20,
        };
        assert_eq!(PageWindow::from_raw(None, None, limits).limit, 10);
        assert_eq!(PageWindow::from_raw(Some("25"), None, limits).limit, 20);
    }

    #[test]
    fn offset_is_not_capped() {
        assert_eq!(window(None, Some("100000")).offset, 100_000);
    }

    #[test]
    fn has_more_arithmetic() {
        let page = Page::new(vec![1, 2], 5, PageWindow { limit: 2, offset: 0 });
        assert_eq!(page.returned_count, 2);
        assert!(page.has_more);

        let page = Page::new(vec![5], 5, PageWindow { limit: 2, offset: 4 });
        assert!(!page.has_more);

        let page: Page<i32> = Page::new(vec![], 0, PageWindow { limit: 50, offset: 0 });
        assert_eq!(page.returned_count, 0);
        assert!(!page.has_more);

        // Offset past the end.
        let page: Page<i32> = Page::new(vec![], 3, PageWindow { limit: 50, offset: 10 });
        assert!(!page.has_more);
    }

    #[test]
    fn has_more_with_zero_limit() {
        let page: Page<i32> = Page::new(vec![], 3, PageWindow { limit: 0, offset: 0 });
        assert!(page.has_more);
    }

    #[test]
    fn query_from_params() {
        let params: HashMap<String, String> = [
            ("team", "Finance"),
            ("closed", "true"),
            ("sortBy", "Title"),
            ("sortOrder", "asc"),
            ("limit", "2"),
            ("offset", "4"),
            ("unknown", "x"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let query = IdeaQuery::from_params(&params, PageLimits::default());
        assert_eq!(query.predicate.bindings().len(), 2);
        assert_eq!(query.sort.column, Column::Title);
        assert_eq!(query.sort.direction, SortDirection::Asc);
        assert_eq!(query.window, PageWindow { limit: 2, offset: 4 });
        assert_eq!(query.given_filters.len(), 2);
        assert_eq!(query.given_filters["closed"], "true");
    }
}
