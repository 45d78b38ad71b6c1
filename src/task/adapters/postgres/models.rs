//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: i64,
    pub user_input: String,
    pub extracted_document_text: Option<String>,
    pub status: String,
    pub planning_result: Option<String>,
    pub execution_result: Option<String>,
    pub review_result: Option<String>,
    pub final_result: Option<String>,
    pub template: Option<String>,
    pub retry_count: i32,
    pub provisional: bool,
    pub fail_reason: Option<String>,
    pub fail_step: Option<String>,
    pub planning_duration_ms: i64,
    pub execution_duration_ms: i64,
    pub review_duration_ms: i64,
    pub finalizing_duration_ms: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records; the identifier comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    pub user_input: String,
    pub extracted_document_text: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full-row changeset written after a patch has been applied in memory.
///
/// `None` fields are written as `NULL` so the row mirrors the aggregate.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    pub status: String,
    pub planning_result: Option<String>,
    pub execution_result: Option<String>,
    pub review_result: Option<String>,
    pub final_result: Option<String>,
    pub template: Option<String>,
    pub retry_count: i32,
    pub provisional: bool,
    pub fail_reason: Option<String>,
    pub fail_step: Option<String>,
    pub planning_duration_ms: i64,
    pub execution_duration_ms: i64,
    pub review_duration_ms: i64,
    pub finalizing_duration_ms: i64,
    pub updated_at: DateTime<Utc>,
}
