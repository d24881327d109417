//! Diesel row models for HIT synchronization persistence.

use super::schema::{assignments, hits, key_values, results, workers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;

/// Query result and write model for HIT records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = hits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct HitRow {
    /// Local HIT identifier.
    pub id: uuid::Uuid,
    /// Marketplace HIT identifier.
    pub remote_id: Option<String>,
    /// Marketplace HIT type identifier.
    pub hit_type_id: Option<String>,
    /// Marketplace creation time.
    pub creation_time: Option<DateTime<Utc>>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Comma-separated keywords.
    pub keywords: String,
    /// Reward per assignment.
    pub reward: Decimal,
    /// Lifetime in seconds.
    pub lifetime_in_seconds: Option<i32>,
    /// Assignment duration in seconds.
    pub assignment_duration_in_seconds: Option<i32>,
    /// Maximum assignments.
    pub max_assignments: i32,
    /// Auto-approval delay in seconds.
    pub auto_approval_delay_in_seconds: Option<i32>,
    /// Requester annotation.
    pub requester_annotation: Option<String>,
    /// Number of similar HITs.
    pub number_of_similar_hits: Option<i32>,
    /// Lifecycle status code.
    pub status: Option<String>,
    /// Review status code.
    pub review_status: Option<String>,
    /// Pending assignment count.
    pub assignments_pending: Option<i32>,
    /// Available assignment count.
    pub assignments_available: Option<i32>,
    /// Completed assignment count.
    pub assignments_completed: Option<i32>,
    /// Last marketplace sync.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for worker records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workers)]
pub struct NewWorkerRow {
    /// Marketplace worker identifier.
    pub id: String,
    /// First reference time.
    pub created_at: DateTime<Utc>,
}

/// Query result and write model for assignment records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct AssignmentRow {
    /// Marketplace assignment identifier.
    pub id: String,
    /// Owning HIT.
    pub hit_id: uuid::Uuid,
    /// Worker, once known.
    pub worker_id: Option<String>,
    /// Status code.
    pub status: Option<String>,
    /// Accept time.
    pub accepted_at: Option<DateTime<Utc>>,
    /// Submit time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Auto-approval time.
    pub auto_approval_at: Option<DateTime<Utc>>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Rejection time.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Requester feedback.
    pub requester_feedback: Option<String>,
    /// Local completion flag.
    pub completed: bool,
    /// Last marketplace sync.
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Query result and insert model for answer records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = key_values)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct KeyValueRow {
    /// Answer identifier.
    pub id: uuid::Uuid,
    /// Owning assignment.
    pub assignment_id: String,
    /// Answer key.
    pub key: String,
    /// Answer value.
    pub value: Option<String>,
}

/// Query result and write model for completion results.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct ResultRow {
    /// Result identifier.
    pub id: uuid::Uuid,
    /// Worker.
    pub worker_id: String,
    /// Template.
    pub template_id: String,
    /// Battery.
    pub battery_id: String,
    /// Assignment.
    pub assignment_id: String,
    /// Free-form task data.
    pub task_data: Option<Value>,
    /// Browser-reported date-time.
    pub datetime: Option<String>,
    /// Current trial number.
    pub current_trial: Option<i32>,
    /// Browser language.
    pub language: Option<String>,
    /// Browser name.
    pub browser: Option<String>,
    /// Platform.
    pub platform: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Credit flag.
    pub credit_granted: bool,
}
