//! Idea model and store operations.
//!
//! One row of `ideas_list`. Ideas are created through a restricted input
//! type; workflow flags always start from fixed values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use crate::db::StoreError;
use crate::query::{Column, ColumnType};

/// Every column of `ideas_list`, in [`Idea`] field order.
pub const IDEA_COLUMNS: [&str; 16] = [
    "id",
    "title",
    "description",
    "submission_date",
    "submitted_by",
    "team",
    "state",
    "priority_level",
    "is_new",
    "is_operational",
    "is_closed",
    "closed_date",
    "notes",
    "created_by",
    "item_type",
    "attachments",
];

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 255;

pub const INITIAL_STATE: &str = "New";
pub const IDEA_ITEM_TYPE: &str = "Idea";

/// Idea record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Store-assigned identifier.
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub submission_date: Option<DateTime<Utc>>,
    pub submitted_by: String,
    pub team: String,
    /// Workflow state.
    pub state: String,
    pub priority_level: Option<String>,
    pub is_new: bool,
    pub is_operational: bool,
    pub is_closed: bool,
    pub closed_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub item_type: String,
    pub attachments: Option<serde_json::Value>,
}

/// Abbreviated idea used by the status probe.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IdeaSummary {
    pub id: i64,
    pub title: String,
    pub state: String,
    pub team: String,
    pub submission_date: Option<DateTime<Utc>>,
}

/// Input for creating an idea.
///
/// Fields that the server controls (`state`, `isNew`, `itemType`, ...) are
/// not accepted here and are dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIdea {
    pub title: Option<String>,
    pub description: Option<String>,
    pub submitted_by: Option<String>,
    pub team: Option<String>,
    pub priority_level: Option<String>,
    pub notes: Option<String>,
    pub attachments: Option<serde_json::Value>,
}

/// Creation input that passed validation.
#[derive(Debug, Clone)]
pub struct ValidIdea {
    pub title: String,
    pub description: Option<String>,
    pub submitted_by: String,
    pub team: String,
    pub priority_level: Option<String>,
    pub notes: Option<String>,
    pub attachments: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

impl ValidationError {
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            ValidationError::MissingFields(fields) => fields,
            ValidationError::TooLong { .. } => &[],
        }
    }
}

fn required(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl NewIdea {
    /// Check required fields and limits.
    ///
    /// Missing fields are reported together, in the order
    /// `title`, `submittedBy`, `team`. Blank strings count as missing.
    pub fn validate(self) -> Result<ValidIdea, ValidationError> {
        let title = required(self.title.as_deref());
        let submitted_by = required(self.submitted_by.as_deref());
        let team = required(self.team.as_deref());

        let (Some(title), Some(submitted_by), Some(team)) = (title, submitted_by, team) else {
            let missing = [
                ("title", &self.title),
                ("submittedBy", &self.submitted_by),
                ("team", &self.team),
            ]
            .into_iter()
            .filter(|(_, value)| required(value.as_deref()).is_none())
            .map(|(name, _)| name)
            .collect();
            return Err(ValidationError::MissingFields(missing));
        };

        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "title",
                max: TITLE_MAX_CHARS,
            });
        }

        Ok(ValidIdea {
            title,
            description: self.description,
            submitted_by,
            team,
            priority_level: self.priority_level,
            notes: self.notes,
            attachments: self.attachments,
        })
    }
}

fn select_all() -> String {
    IDEA_COLUMNS.join(", ")
}

impl Idea {
    /// Insert a new idea with server-controlled defaults.
    pub async fn create(pool: &PgPool, input: ValidIdea) -> Result<Self, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO ideas_list (
                title, description, submission_date, submitted_by, team, state,
                priority_level, is_new, is_operational, is_closed, closed_date,
                notes, created_by, item_type, attachments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, FALSE, FALSE, NULL, $8, $4, $9, $10)
            RETURNING {}
            "#,
            select_all()
        );

        let idea = sqlx::query_as::<_, Idea>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(Utc::now())
            .bind(&input.submitted_by)
            .bind(&input.team)
            .bind(INITIAL_STATE)
            .bind(&input.priority_level)
            .bind(&input.notes)
            .bind(IDEA_ITEM_TYPE)
            .bind(&input.attachments)
            .fetch_one(pool)
            .await?;

        tracing::info!(id = idea.id, team = %idea.team, "idea created");

        Ok(idea)
    }

    /// Every idea, newest id first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, StoreError> {
        let sql = format!("SELECT {} FROM ideas_list ORDER BY id DESC", select_all());
        let ideas = sqlx::query_as::<_, Idea>(&sql).fetch_all(pool).await?;
        Ok(ideas)
    }

    pub async fn count_all(pool: &PgPool) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ideas_list")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// The `n` most recent ideas by id.
    pub async fn recent(pool: &PgPool, n: i64) -> Result<Vec<IdeaSummary>, StoreError> {
        let ideas = sqlx::query_as::<_, IdeaSummary>(
            "SELECT id, title, state, team, submission_date FROM ideas_list ORDER BY id DESC LIMIT $1",
        )
        .bind(n)
        .fetch_all(pool)
        .await?;
        Ok(ideas)
    }

    /// Distinct non-empty values of a filterable text column, ascending.
    ///
    /// Returns an empty list for columns that are not filterable text.
    pub async fn distinct_values(pool: &PgPool, column: Column) -> Result<Vec<String>, StoreError> {
        if !column.is_filterable() || column.column_type() != ColumnType::Text {
            return Ok(Vec::new());
        }

        let name = column.name();
        let sql = format!(
            "SELECT DISTINCT {name} FROM ideas_list WHERE {name} IS NOT NULL AND {name} <> '' ORDER BY {name} ASC"
        );
        let values = sqlx::query_scalar::<_, String>(&sql).fetch_all(pool).await?;
        Ok(values)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn input(title: Option<&str>, submitted_by: Option<&str>, team: Option<&str>) -> NewIdea {
        NewIdea {
            title: title.map(String::from),
            submitted_by: submitted_by.map(String::from),
            team: team.map(String::from),
            ..NewIdea::default()
        }
    }

    #[test]
    fn valid_input_passes() {
        let valid = input(Some(" Faster builds "), Some("ana"), Some("Ops"))
            .validate()
            .unwrap();
        assert_eq!(valid.title, "Faster builds");
        assert_eq!(valid.submitted_by, "ana");
        assert_eq!(valid.team, "Ops");
    }

    #[test]
    fn missing_fields_are_listed_in_order() {
        let err = input(None, None, None).validate().unwrap_err();
        assert_eq!(err.missing_fields(), ["title", "submittedBy", "team"]);

        let err = input(Some("t"), None, Some("Ops")).validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["submittedBy"]));
        assert_eq!(err.to_string(), "Missing required fields: submittedBy");
    }

    #[test]
    fn blank_counts_as_missing() {
        let err = input(Some("   "), Some(""), Some("Ops")).validate().unwrap_err();
        assert_eq!(err.missing_fields(), ["title", "submittedBy"]);
    }

    #[test]
    fn title_length_is_limited() {
        let at_limit = "x".repeat(TITLE_MAX_CHARS);
        assert!(input(Some(&at_limit), Some("a"), Some("b")).validate().is_ok());

        let too_long = "é".repeat(TITLE_MAX_CHARS + 1);
        let err = input(Some(&too_long), Some("a"), Some("b"))
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "title",
                max: TITLE_MAX_CHARS
            }
        );
        assert!(err.missing_fields().is_empty());
    }

    #[test]
    fn server_controlled_fields_are_not_accepted() {
        let body = serde_json::json!({
            "title": "t",
            "submittedBy": "s",
            "team": "Ops",
            "priorityLevel": "High",
            "state": "Closed",
            "isNew": false,
            "isClosed": true,
            "itemType": "Bug",
        });
        let parsed: NewIdea = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.priority_level.as_deref(), Some("High"));
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn idea_serializes_camel_case() {
        let idea = Idea {
            id: 7,
            title: "t".to_string(),
            description: None,
            submission_date: None,
            submitted_by: "s".to_string(),
            team: "Ops".to_string(),
            state: INITIAL_STATE.to_string(),
            priority_level: None,
            is_new: true,
            is_operational: false,
            is_closed: false,
            closed_date: None,
            notes: None,
            created_by: Some("s".to_string()),
            item_type: IDEA_ITEM_TYPE.to_string(),
            attachments: None,
        };
        let json = serde_json::to_value(&idea).unwrap();
        assert_eq!(json["submittedBy"], "s");
        assert_eq!(json["isNew"], true);
        assert_eq!(json["itemType"], "Idea");
        assert!(json["submissionDate"].is_null());
        assert_eq!(json.as_object().unwrap().len(), IDEA_COLUMNS.len());
    }
}
