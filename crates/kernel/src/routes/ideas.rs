//! Ideas API routes.
//!
//! JSON endpoints for the filtered listing, the full listing, creation,
//! dropdown values and the column registry description.

use std::collections::{BTreeMap, HashMap};

use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{Idea, NewIdea};
use crate::query::columns::{self, ColumnInfo, ColumnType, IdeasTable};
use crate::query::{IdeaQuery, ResolvedSort, pager};
use crate::routes::helpers::iso_timestamp;
use crate::state::AppState;

/// Create the ideas router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ideas", get(list_ideas).post(create_idea))
        .route("/api/ideas/filtered", get(filtered_ideas))
        .route("/api/ideas/distinct/{field}", get(distinct_values))
        .route("/api/ideas/schema", get(schema))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    limit: u64,
    offset: u64,
    has_more: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Sorting {
    sort_by: &'static str,
    sort_order: &'static str,
}

impl From<ResolvedSort> for Sorting {
    fn from(sort: ResolvedSort) -> Self {
        Self {
            sort_by: sort.label(),
            sort_order: sort.direction.as_str(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilteredResponse {
    success: bool,
    data: Vec<Idea>,
    count: u64,
    total_count: u64,
    pagination: Pagination,
    filters: BTreeMap<&'static str, String>,
    sorting: Sorting,
    timestamp: String,
}

#[derive(Serialize)]
struct ListResponse<T> {
    success: bool,
    data: Vec<T>,
    count: usize,
    timestamp: String,
}

#[derive(Serialize)]
struct CreatedResponse {
    success: bool,
    data: Idea,
    timestamp: String,
}

#[derive(Serialize)]
struct DistinctResponse {
    success: bool,
    field: String,
    data: Vec<String>,
    count: usize,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageSizes {
    default_limit: u64,
    max_limit: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemaResponse {
    success: bool,
    table: String,
    columns: Vec<ColumnInfo>,
    default_sort: Sorting,
    pagination: PageSizes,
    timestamp: String,
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

/// Filtered, sorted and paginated listing.
///
/// Unknown parameters are ignored and malformed values fall back to
/// defaults, so this only fails when the store does.
async fn filtered_ideas(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<FilteredResponse>> {
    let query = IdeaQuery::from_params(&params, state.page_limits());

    let page = state
        .timed("filtered", async {
            let pool = state.db().await?;
            pager::execute(pool, &query).await
        })
        .await?;

    Ok(Json(FilteredResponse {
        success: true,
        count: page.returned_count,
        total_count: page.total_count,
        pagination: Pagination {
            limit: page.window.limit,
            offset: page.window.offset,
            has_more: page.has_more,
        },
        data: page.rows,
        filters: query.given_filters,
        sorting: query.sort.into(),
        timestamp: iso_timestamp(),
    }))
}

/// Every idea, newest id first.
async fn list_ideas(State(state): State<AppState>) -> AppResult<Json<ListResponse<Idea>>> {
    let ideas = state
        .timed("list_all", async {
            let pool = state.db().await?;
            Idea::list_all(pool).await
        })
        .await?;

    Ok(Json(ListResponse {
        success: true,
        count: ideas.len(),
        data: ideas,
        timestamp: iso_timestamp(),
    }))
}

/// Create an idea from the submission form.
async fn create_idea(
    State(state): State<AppState>,
    payload: Result<Json<NewIdea>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let Json(input) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected idea payload");
        AppError::BadRequest(rejection.body_text())
    })?;

    let valid = input.validate()?;

    let idea = state
        .timed("create", async {
            let pool = state.db().await?;
            Idea::create(pool, valid).await
        })
        .await?;

    state.metrics().record_idea_created();

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            data: idea,
            timestamp: iso_timestamp(),
        }),
    ))
}

/// Distinct values of a text filter column, for dropdowns.
async fn distinct_values(
    State(state): State<AppState>,
    Path(field): Path<String>,
) -> AppResult<Json<DistinctResponse>> {
    let column = columns::filter_column(&field)
        .filter(|column| column.column_type() == ColumnType::Text)
        .ok_or(AppError::NotFound)?;

    let values = state
        .timed("distinct", async {
            let pool = state.db().await?;
            Idea::distinct_values(pool, column).await
        })
        .await?;

    Ok(Json(DistinctResponse {
        success: true,
        field,
        count: values.len(),
        data: values,
        timestamp: iso_timestamp(),
    }))
}

/// Describe the filterable and sortable columns.
async fn schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    let limits = state.page_limits();

    Json(SchemaResponse {
        success: true,
        table: sea_query::Iden::to_string(&IdeasTable),
        columns: columns::schema(),
        default_sort: ResolvedSort::default().into(),
        pagination: PageSizes {
            default_limit: limits.default_limit,
            max_limit: limits.max_limit,
        },
        timestamp: iso_timestamp(),
    })
}
