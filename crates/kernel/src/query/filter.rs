//! Predicate builder.
//!
//! Turns raw filter parameters into equality conditions over registered
//! columns. Values are carried separately from the column identifiers and
//! are only ever rendered as bound parameters.

use std::collections::{BTreeMap, HashMap};

use sea_query::{Alias, Expr, ExprTrait, SimpleExpr};
use serde::Serialize;

use super::columns::{self, Column, ColumnType, IdeasTable};

/// A typed value bound to a filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Boolean(bool),
}

impl FilterValue {
    /// Coerce a raw parameter into a value of the column's type.
    ///
    /// Boolean columns accept exactly `"true"` as true; every other string
    /// is false.
    pub fn coerce(column_type: ColumnType, raw: &str) -> Self {
        match column_type {
            ColumnType::Boolean => FilterValue::Boolean(raw == "true"),
            _ => FilterValue::Text(raw.to_string()),
        }
    }
}

/// One `column = value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub column: Column,
    pub value: FilterValue,
}

impl Binding {
    pub fn column_type(&self) -> ColumnType {
        self.column.column_type()
    }

    fn condition(&self) -> SimpleExpr {
        let column = Expr::col((IdeasTable, Alias::new(self.column.name())));
        match &self.value {
            FilterValue::Text(s) => column.eq(s.as_str()),
            FilterValue::Boolean(b) => column.eq(*b),
        }
    }
}

/// Conjunction of equality conditions. Empty means every row matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    bindings: Vec<Binding>,
}

impl Predicate {
    /// The trivially true predicate.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a predicate from request parameters.
    ///
    /// Only registered filter parameters are consulted, in registry order, so
    /// unknown keys have no effect on the result. Empty values count as absent.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut predicate = Self::all();
        for column in columns::FILTERABLE {
            let Some(param) = column.filter_param() else {
                continue;
            };
            if let Some(raw) = params.get(param) {
                predicate.push(column, raw);
            }
        }
        predicate
    }

    /// Add a condition on `column`. Ignored if the column is not filterable
    /// or the value is empty.
    pub fn push(&mut self, column: Column, raw: &str) {
        if !column.is_filterable() || raw.is_empty() {
            return;
        }
        self.bindings.retain(|b| b.column != column);
        self.bindings.push(Binding {
            column,
            value: FilterValue::coerce(column.column_type(), raw),
        });
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// SQL conditions, one per binding, to be AND-ed together.
    pub fn conditions(&self) -> impl Iterator<Item = SimpleExpr> + '_ {
        self.bindings.iter().map(Binding::condition)
    }
}

/// Recognized filter parameters exactly as the caller sent them.
pub fn given_filters(params: &HashMap<String, String>) -> BTreeMap<&'static str, String> {
    columns::FILTERABLE
        .iter()
        .filter_map(|column| column.filter_param())
        .filter_map(|param| params.get(param).map(|raw| (param, raw.clone())))
        .collect()
}
