//! Column registry for the `ideas_list` table.
//!
//! The closed set of columns that request input may filter or sort on.
//! Request parameters are looked up here; a name that is not registered
//! resolves to `None` and can never reach SQL text. Column identifiers in
//! generated SQL always come from [`Column::name`].

use sea_query::Iden;
use serde::Serialize;

/// Table identifier for `ideas_list`.
#[derive(Iden)]
#[iden = "ideas_list"]
pub struct IdeasTable;

/// Semantic type of a registered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Text,
    Boolean,
    Timestamp,
}

/// A column reachable from request input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    SubmissionDate,
    Title,
    SubmittedBy,
    Team,
    State,
    PriorityLevel,
    IsOperational,
    IsClosed,
}

/// Filterable columns, in the order predicates are emitted.
pub const FILTERABLE: [Column; 5] = [
    Column::Team,
    Column::State,
    Column::PriorityLevel,
    Column::IsOperational,
    Column::IsClosed,
];

/// Sortable columns.
pub const SORTABLE: [Column; 7] = [
    Column::Id,
    Column::SubmissionDate,
    Column::Title,
    Column::State,
    Column::PriorityLevel,
    Column::Team,
    Column::SubmittedBy,
];

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Id,
        Column::SubmissionDate,
        Column::Title,
        Column::SubmittedBy,
        Column::Team,
        Column::State,
        Column::PriorityLevel,
        Column::IsOperational,
        Column::IsClosed,
    ];

    /// Database column name.
    pub const fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::SubmissionDate => "submission_date",
            Column::Title => "title",
            Column::SubmittedBy => "submitted_by",
            Column::Team => "team",
            Column::State => "state",
            Column::PriorityLevel => "priority_level",
            Column::IsOperational => "is_operational",
            Column::IsClosed => "is_closed",
        }
    }

    pub const fn column_type(self) -> ColumnType {
        match self {
            Column::Id => ColumnType::Integer,
            Column::SubmissionDate => ColumnType::Timestamp,
            Column::IsOperational | Column::IsClosed => ColumnType::Boolean,
            Column::Title
            | Column::SubmittedBy
            | Column::Team
            | Column::State
            | Column::PriorityLevel => ColumnType::Text,
        }
    }

    /// Query parameter that filters on this column.
    pub const fn filter_param(self) -> Option<&'static str> {
        match self {
            Column::Team => Some("team"),
            Column::State => Some("state"),
            Column::PriorityLevel => Some("priority"),
            Column::IsOperational => Some("operational"),
            Column::IsClosed => Some("closed"),
            _ => None,
        }
    }

    /// Names accepted in `sortBy`. The first entry is the canonical label.
    pub const fn sort_names(self) -> &'static [&'static str] {
        match self {
            Column::Id => &["ID"],
            Column::SubmissionDate => &["Date", "SubmissionDate", "Submission_Date"],
            Column::Title => &["Title"],
            Column::State => &["State"],
            Column::PriorityLevel => &["Priority_Level", "PriorityLevel"],
            Column::Team => &["Team"],
            Column::SubmittedBy => &["SubmittedBy", "Submitted_By"],
            Column::IsOperational | Column::IsClosed => &[],
        }
    }

    /// Canonical `sortBy` label, if the column is sortable.
    pub fn sort_label(self) -> Option<&'static str> {
        self.sort_names().first().copied()
    }

    pub fn is_filterable(self) -> bool {
        self.filter_param().is_some()
    }

    pub fn is_sortable(self) -> bool {
        !self.sort_names().is_empty()
    }
}

/// Look up a filterable column by its query parameter name (exact match).
pub fn filter_column(param: &str) -> Option<Column> {
    FILTERABLE
        .iter()
        .copied()
        .find(|column| column.filter_param() == Some(param))
}

/// Look up a sortable column by any accepted `sortBy` name, ignoring ASCII case.
pub fn sort_column(name: &str) -> Option<Column> {
    let name = name.trim();
    SORTABLE.iter().copied().find(|column| {
        column
            .sort_names()
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(name))
    })
}

pub fn is_filterable(name: &str) -> bool {
    filter_column(name).is_some()
}

pub fn is_sortable(name: &str) -> bool {
    sort_column(name).is_some()
}

/// Semantic type of a filter parameter or sort name.
pub fn type_of(name: &str) -> Option<ColumnType> {
    filter_column(name)
        .or_else(|| sort_column(name))
        .map(Column::column_type)
}

/// Public description of one registered column.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub filterable: bool,
    pub sortable: bool,
    pub filter_param: Option<&'static str>,
    pub sort_names: &'static [&'static str],
}

/// Describe every registered column.
pub fn schema() -> Vec<ColumnInfo> {
    Column::ALL
        .iter()
        .map(|&column| ColumnInfo {
            name: column.name(),
            column_type: column.column_type(),
            filterable: column.is_filterable(),
            sortable: column.is_sortable(),
            filter_param: column.filter_param(),
            sort_names: column.sort_names(),
        })
        .collect()
}
