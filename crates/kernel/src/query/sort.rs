//! Sort resolver.
//!
//! Validates the requested sort column against the registry and produces a
//! total, deterministic ordering: missing values sort as the earliest
//! possible value and ties are broken by descending id.

use sea_query::{Alias, Expr, Order, SimpleExpr};
use serde::{Deserialize, Serialize};

use super::columns::{self, Column, ColumnType, IdeasTable};

/// Column used when `sortBy` is absent or not sortable.
pub const DEFAULT_SORT_COLUMN: Column = Column::SubmissionDate;

/// Stand-in for a missing submission date when ordering.
pub const NULL_DATE_SENTINEL: &str = "1900-01-01 00:00:00+00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Anything other than a case-insensitive `ASC` is descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn order(self) -> Order {
        match self {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// A validated sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSort {
    pub column: Column,
    pub direction: SortDirection,
}

impl Default for ResolvedSort {
    fn default() -> Self {
        Self {
            column: DEFAULT_SORT_COLUMN,
            direction: SortDirection::Desc,
        }
    }
}

impl ResolvedSort {
    /// Resolve raw `sortBy` / `sortOrder` parameters.
    pub fn resolve(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        let column = match sort_by {
            Some(requested) => columns::sort_column(requested).unwrap_or_else(|| {
                tracing::debug!(sort_by = requested, "unknown sort column, using default");
                DEFAULT_SORT_COLUMN
            }),
            None => DEFAULT_SORT_COLUMN,
        };

        Self {
            column,
            direction: SortDirection::parse(sort_order),
        }
    }

    /// Canonical `sortBy` label of the resolved column.
    pub fn label(&self) -> &'static str {
        self.column.sort_label().unwrap_or("Date")
    }

    /// ORDER BY terms: the primary key with null substitution, then `id DESC`.
    pub(crate) fn order_terms(&self) -> Vec<(SimpleExpr, Order)> {
        let mut terms = vec![(sort_expr(self.column), self.direction.order())];
        if self.column != Column::Id {
            terms.push((
                Expr::col((IdeasTable, Alias::new(Column::Id.name()))).into(),
                Order::Desc,
            ));
        }
        terms
    }
}

fn sort_expr(column: Column) -> SimpleExpr {
    let name = column.name();
    match column.column_type() {
        ColumnType::Timestamp => Expr::cust(format!(
            "COALESCE(\"ideas_list\".\"{name}\", TIMESTAMPTZ '{NULL_DATE_SENTINEL}')"
        )),
        ColumnType::Text => Expr::cust(format!("COALESCE(\"ideas_list\".\"{name}\", '')")),
        ColumnType::Integer | ColumnType::Boolean => {
            Expr::col((IdeasTable, Alias::new(name))).into()
        }
    }
}
