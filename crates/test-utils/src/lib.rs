//! Ideaboard test utilities.
//!
//! Fixtures for integration tests: an idea row builder that inserts
//! directly into `ideas_list`, unique team names for isolating tests that
//! share a database, and JSON assertion helpers.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A team name no other test run will use.
///
/// Tests share one table, so each scenario filters on its own team.
pub fn unique_team(prefix: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{nanos}-{seq}", std::process::id())
}

/// Fixed UTC timestamp for deterministic ordering tests.
pub fn at(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single()
}

/// Create a test idea with default values.
pub fn test_idea(title: &str, team: &str) -> TestIdea {
    TestIdea {
        title: title.to_string(),
        description: None,
        submission_date: Some(Utc::now()),
        submitted_by: "tester".to_string(),
        team: team.to_string(),
        state: "New".to_string(),
        priority_level: None,
        is_operational: false,
        is_closed: false,
    }
}

/// A test idea builder for creating fixtures.
#[derive(Debug, Clone)]
pub struct TestIdea {
    pub title: String,
    pub description: Option<String>,
    pub submission_date: Option<DateTime<Utc>>,
    pub submitted_by: String,
    pub team: String,
    pub state: String,
    pub priority_level: Option<String>,
    pub is_operational: bool,
    pub is_closed: bool,
}

impl TestIdea {
    /// Set the submission date; `None` stores NULL.
    pub fn submitted_at(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.submission_date = date;
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = state.to_string();
        self
    }

    pub fn with_priority(mut self, priority: &str) -> Self {
        self.priority_level = Some(priority.to_string());
        self
    }

    pub fn with_submitter(mut self, submitted_by: &str) -> Self {
        self.submitted_by = submitted_by.to_string();
        self
    }

    pub fn operational(mut self) -> Self {
        self.is_operational = true;
        self
    }

    pub fn closed(mut self) -> Self {
        self.is_closed = true;
        self
    }

    /// Insert the row and return its id.
    pub async fn insert(&self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO ideas_list (
                title, description, submission_date, submitted_by, team, state,
                priority_level, is_new, is_operational, is_closed, created_by, item_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $9, $4, 'Idea')
            RETURNING id
            "#,
        )
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.submission_date)
        .bind(&self.submitted_by)
        .bind(&self.team)
        .bind(&self.state)
        .bind(&self.priority_level)
        .bind(self.is_operational)
        .bind(self.is_closed)
        .fetch_one(pool)
        .await
    }
}

/// Remove every row belonging to `team`.
pub async fn delete_team(pool: &PgPool, team: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM ideas_list WHERE team = $1")
        .bind(team)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert the `{success: false, error, timestamp}` envelope.
    pub fn failure(value: &Value) {
        assert_eq!(value["success"], false, "expected failure, got: {value:#}");
        assert!(value["error"].is_string(), "missing error: {value:#}");
        assert!(value["timestamp"].is_string(), "missing timestamp: {value:#}");
    }

    /// Ids of the ideas in a `data` array, in response order.
    pub fn ids(value: &Value) -> Vec<i64> {
        value["data"]
            .as_array()
            .map(|rows| rows.iter().filter_map(|row| row["id"].as_i64()).collect())
            .unwrap_or_default()
    }
}

/// Convenience accessor for tests that inspect JSON bodies.
pub fn field<'a>(value: &'a JsonValue, path: &[&str]) -> &'a JsonValue {
    path.iter().fold(value, |v, key| &v[*key])
}
