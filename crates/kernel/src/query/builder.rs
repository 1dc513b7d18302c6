//! Ideas query builder using SeaQuery.
//!
//! Renders a predicate, a resolved sort and a page window into two
//! PostgreSQL statements that share the same WHERE clause:
//! - a windowed SELECT (ORDER BY, OFFSET, LIMIT)
//! - a COUNT(*) over the full matching set
//!
//! Statements are rendered with placeholders; values travel alongside in
//! [`Statement::values`] and are bound through [`Statement::arguments`].

use sea_query::{
    Alias, Asterisk, Expr, PostgresQueryBuilder, Query, SelectStatement, Value, Values,
};
use sqlx::Arguments;
use sqlx::postgres::PgArguments;

use super::columns::IdeasTable;
use super::filter::Predicate;
use super::pager::PageWindow;
use super::sort::ResolvedSort;
use crate::db::StoreError;
use crate::models::idea::IDEA_COLUMNS;

/// SQL text plus its positional values.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub values: Values,
}

impl Statement {
    fn render(query: &SelectStatement) -> Self {
        let (sql, values) = query.build(PostgresQueryBuilder);
        Self { sql, values }
    }

    /// Convert the collected values into sqlx arguments, in placeholder order.
    pub fn arguments(&self) -> Result<PgArguments, StoreError> {
        let mut args = PgArguments::default();
        for value in &self.values.0 {
            let added = match value {
                Value::Bool(v) => args.add(*v),
                Value::Int(v) => args.add(*v),
                Value::BigInt(v) => args.add(*v),
                Value::BigUnsigned(v) => {
                    let v = v
                        .map(i64::try_from)
                        .transpose()
                        .map_err(|e| StoreError::Bind(e.to_string()))?;
                    args.add(v)
                }
                Value::String(v) => args.add(v.as_deref().cloned()),
                other => {
                    return Err(StoreError::Bind(format!(
                        "unsupported parameter type: {other:?}"
                    )));
                }
            };
            added.map_err(|e| StoreError::Bind(e.to_string()))?;
        }
        Ok(args)
    }
}

/// Query builder for the filtered ideas listing.
pub struct IdeasQueryBuilder<'a> {
    predicate: &'a Predicate,
    sort: ResolvedSort,
}

impl<'a> IdeasQueryBuilder<'a> {
    pub fn new(predicate: &'a Predicate, sort: ResolvedSort) -> Self {
        Self { predicate, sort }
    }

    /// Build the windowed SELECT.
    pub fn build(&self, window: PageWindow) -> Statement {
        let mut query = Query::select();

        query.columns(
            IDEA_COLUMNS
                .iter()
                .map(|name| (IdeasTable, Alias::new(*name))),
        );
        query.from(IdeasTable);

        self.add_filters(&mut query);
        self.add_sorts(&mut query);

        query.offset(window.offset);
        query.limit(window.limit);

        Statement::render(&query)
    }

    /// Build the COUNT over the same predicate, without window or ordering.
    pub fn build_count(&self) -> Statement {
        let mut query = Query::select();

        query.expr(Expr::col(Asterisk).count());
        query.from(IdeasTable);

        self.add_filters(&mut query);

        Statement::render(&query)
    }

    fn add_filters(&self, query: &mut SelectStatement) {
        for condition in self.predicate.conditions() {
            query.and_where(condition);
        }
    }

    fn add_sorts(&self, query: &mut SelectStatement) {
        for (expr, order) in self.sort.order_terms() {
            query.order_by_expr(expr, order);
        }
    }
}
