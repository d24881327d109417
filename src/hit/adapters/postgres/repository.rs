//! `PostgreSQL` repository implementation for HIT synchronization storage.

use super::{
    models::{AssignmentRow, HitRow, KeyValueRow, NewWorkerRow, ResultRow},
    schema::{assignments, hits, key_values, results, workers},
};
use crate::hit::{
    domain::{
        AnswerId, AnswerRecord, Assignment, AssignmentCounts, AssignmentStatus, AssignmentTimes,
        BatteryId, CompletionResult, CompletionResultId, CompletionResultKey, Hit, HitId,
        HitReviewStatus, HitStatus, HitTypeId, PersistedAssignmentData, PersistedHitData,
        RemoteAssignmentId, RemoteHitId, SubmissionMetadata, TemplateId, WorkerId, join_keywords,
        split_keywords,
    },
    ports::{GetOrCreated, HitRepository, HitRepositoryError, HitRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by HIT adapters.
pub type HitPgPool = Pool<ConnectionManager<PgConnection>>;

const REMOTE_ID_UNIQUE_INDEX: &str = "idx_hits_remote_id_unique";
const ANSWER_KEY_UNIQUE_INDEX: &str = "idx_key_values_assignment_key";
const RESULT_UNIQUE_INDEX: &str = "idx_results_unique_submission";
const RESULT_WORKER_FOREIGN_KEY: &str = "fk_results_worker";
const RESULT_ASSIGNMENT_FOREIGN_KEY: &str = "fk_results_assignment";

/// `PostgreSQL`-backed HIT repository.
#[derive(Debug, Clone)]
pub struct PostgresHitRepository {
    pool: HitPgPool,
}

impl PostgresHitRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: HitPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> HitRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> HitRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(HitRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(HitRepositoryError::persistence)?
    }
}

#[async_trait]
impl HitRepository for PostgresHitRepository {
    async fn store_hit(&self, hit: &Hit) -> HitRepositoryResult<()> {
        let hit_id = hit.id();
        let remote_id = hit.remote_id().cloned();
        let row = hit_to_row(hit)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(hits::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_violation_of(info.as_ref(), REMOTE_ID_UNIQUE_INDEX) =>
                    {
                        remote_id.clone().map_or_else(
                            || HitRepositoryError::DuplicateHit(hit_id),
                            HitRepositoryError::DuplicateRemoteHit,
                        )
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        HitRepositoryError::DuplicateHit(hit_id)
                    }
                    _ => HitRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_hit(&self, hit: &Hit) -> HitRepositoryResult<()> {
        let hit_id = hit.id();
        let remote_id = hit.remote_id().cloned();
        let row = hit_to_row(hit)?;
        self.run_blocking(move |connection| {
            let updated = diesel::update(hits::table.filter(hits::id.eq(hit_id.into_inner())))
                .set(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_violation_of(info.as_ref(), REMOTE_ID_UNIQUE_INDEX)
                            && remote_id.is_some() =>
                    {
                        remote_id.clone().map_or_else(
                            || HitRepositoryError::HitNotFound(hit_id),
                            HitRepositoryError::DuplicateRemoteHit,
                        )
                    }
                    _ => HitRepositoryError::persistence(err),
                })?;
            if updated == 0 {
                return Err(HitRepositoryError::HitNotFound(hit_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_hit(&self, id: HitId) -> HitRepositoryResult<Option<Hit>> {
        self.run_blocking(move |connection| {
            let row = hits::table
                .filter(hits::id.eq(id.into_inner()))
                .select(HitRow::as_select())
                .first::<HitRow>(connection)
                .optional()
                .map_err(HitRepositoryError::persistence)?;
            row.map(row_to_hit).transpose()
        })
        .await
    }

    async fn find_hit_by_remote_id(
        &self,
        remote_id: &RemoteHitId,
    ) -> HitRepositoryResult<Option<Hit>> {
        let lookup = remote_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = hits::table
                .filter(hits::remote_id.eq(lookup))
                .select(HitRow::as_select())
                .first::<HitRow>(connection)
                .optional()
                .map_err(HitRepositoryError::persistence)?;
            row.map(row_to_hit).transpose()
        })
        .await
    }

    async fn list_hits(&self) -> HitRepositoryResult<Vec<Hit>> {
        self.run_blocking(move |connection| {
            let rows = hits::table
                .order(hits::created_at.asc())
                .select(HitRow::as_select())
                .load::<HitRow>(connection)
                .map_err(HitRepositoryError::persistence)?;
            rows.into_iter().map(row_to_hit).collect()
        })
        .await
    }

    async fn get_or_create_assignment(
        &self,
        id: &RemoteAssignmentId,
        hit_id: HitId,
    ) -> HitRepositoryResult<GetOrCreated<Assignment>> {
        let assignment_id = id.clone();
        let new_row = assignment_to_row(&Assignment::new(id.clone(), hit_id));
        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(assignments::table)
                .values(&new_row)
                .on_conflict(assignments::id)
                .do_nothing()
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        HitRepositoryError::HitNotFound(hit_id)
                    }
                    _ => HitRepositoryError::persistence(err),
                })?;

            let row = assignments::table
                .filter(assignments::id.eq(assignment_id.as_str()))
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .map_err(HitRepositoryError::persistence)?;
            let assignment = row_to_assignment(row)?;
            if assignment.hit_id() != hit_id {
                return Err(HitRepositoryError::AssignmentHitMismatch {
                    assignment: assignment_id,
                    owner: assignment.hit_id(),
                    requested: hit_id,
                });
            }
            if inserted == 0 {
                Ok(GetOrCreated::existing(assignment))
            } else {
                Ok(GetOrCreated::created(assignment))
            }
        })
        .await
    }

    async fn update_assignment(&self, assignment: &Assignment) -> HitRepositoryResult<()> {
        let assignment_id = assignment.id().clone();
        let row = assignment_to_row(assignment);
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                assignments::table.filter(assignments::id.eq(assignment_id.as_str())),
            )
            .set(&row)
            .execute(connection)
            .map_err(HitRepositoryError::persistence)?;
            if updated == 0 {
                return Err(HitRepositoryError::AssignmentNotFound(assignment_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_assignment(
        &self,
        id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Option<Assignment>> {
        let lookup = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = assignments::table
                .filter(assignments::id.eq(lookup))
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .optional()
                .map_err(HitRepositoryError::persistence)?;
            row.map(row_to_assignment).transpose()
        })
        .await
    }

    async fn list_assignments_for_hit(
        &self,
        hit_id: HitId,
    ) -> HitRepositoryResult<Vec<Assignment>> {
        self.run_blocking(move |connection| {
            let rows = assignments::table
                .filter(assignments::hit_id.eq(hit_id.into_inner()))
                .order(assignments::id.asc())
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(HitRepositoryError::persistence)?;
            rows.into_iter().map(row_to_assignment).collect()
        })
        .await
    }

    async fn get_or_create_worker(
        &self,
        id: &WorkerId,
        first_seen_at: DateTime<Utc>,
    ) -> HitRepositoryResult<GetOrCreated<WorkerId>> {
        let worker_id = id.clone();
        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(workers::table)
                .values(&NewWorkerRow {
                    id: worker_id.as_str().to_owned(),
                    created_at: first_seen_at,
                })
                .on_conflict(workers::id)
                .do_nothing()
                .execute(connection)
                .map_err(HitRepositoryError::persistence)?;
            if inserted == 0 {
                Ok(GetOrCreated::existing(worker_id))
            } else {
                Ok(GetOrCreated::created(worker_id))
            }
        })
        .await
    }

    async fn find_answer(
        &self,
        assignment_id: &RemoteAssignmentId,
        key: &str,
    ) -> HitRepositoryResult<Option<AnswerRecord>> {
        let lookup_assignment = assignment_id.as_str().to_owned();
        let lookup_key = key.to_owned();
        self.run_blocking(move |connection| {
            let row = key_values::table
                .filter(key_values::assignment_id.eq(lookup_assignment))
                .filter(key_values::key.eq(lookup_key))
                .select(KeyValueRow::as_select())
                .first::<KeyValueRow>(connection)
                .optional()
                .map_err(HitRepositoryError::persistence)?;
            row.map(row_to_answer).transpose()
        })
        .await
    }

    async fn store_answer(&self, answer: &AnswerRecord) -> HitRepositoryResult<()> {
        let assignment_id = answer.assignment_id().clone();
        let key = answer.key().to_owned();
        let row = answer_to_row(answer);
        self.run_blocking(move |connection| {
            diesel::insert_into(key_values::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        HitRepositoryError::AssignmentNotFound(assignment_id.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_violation_of(info.as_ref(), ANSWER_KEY_UNIQUE_INDEX) =>
                    {
                        HitRepositoryError::DuplicateAnswer {
                            assignment: assignment_id.clone(),
                            key: key.clone(),
                        }
                    }
                    _ => HitRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_answer(&self, answer: &AnswerRecord) -> HitRepositoryResult<()> {
        let answer_id = answer.id();
        let value = answer.value().map(str::to_owned);
        self.run_blocking(move |connection| {
            let updated =
                diesel::update(key_values::table.filter(key_values::id.eq(answer_id.into_inner())))
                    .set(key_values::value.eq(value))
                    .execute(connection)
                    .map_err(HitRepositoryError::persistence)?;
            if updated == 0 {
                return Err(HitRepositoryError::AnswerNotFound(answer_id));
            }
            Ok(())
        })
        .await
    }

    async fn list_answers(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Vec<AnswerRecord>> {
        let lookup = assignment_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = key_values::table
                .filter(key_values::assignment_id.eq(lookup))
                .order(key_values::key.asc())
                .select(KeyValueRow::as_select())
                .load::<KeyValueRow>(connection)
                .map_err(HitRepositoryError::persistence)?;
            rows.into_iter().map(row_to_answer).collect()
        })
        .await
    }

    async fn store_result(&self, result: &CompletionResult) -> HitRepositoryResult<()> {
        let key = result.key();
        let row = result_to_row(result)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(results::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_result_write_error(err, &key))?;
            Ok(())
        })
        .await
    }

    async fn update_result(&self, result: &CompletionResult) -> HitRepositoryResult<()> {
        let result_id = result.id;
        let key = result.key();
        let row = result_to_row(result)?;
        self.run_blocking(move |connection| {
            let updated =
                diesel::update(results::table.filter(results::id.eq(result_id.into_inner())))
                    .set(&row)
                    .execute(connection)
                    .map_err(|err| map_result_write_error(err, &key))?;
            if updated == 0 {
                return Err(HitRepositoryError::ResultNotFound(result_id));
            }
            Ok(())
        })
        .await
    }

    async fn list_results_for_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Vec<CompletionResult>> {
        let lookup = assignment_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = results::table
                .filter(results::assignment_id.eq(lookup))
                .select(ResultRow::as_select())
                .load::<ResultRow>(connection)
                .map_err(HitRepositoryError::persistence)?;
            rows.into_iter().map(row_to_result).collect()
        })
        .await
    }
}

fn is_violation_of(info: &dyn DatabaseErrorInformation, index: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == index)
}

fn map_result_write_error(
    err: DieselError,
    key: &CompletionResultKey,
) -> HitRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_violation_of(info.as_ref(), RESULT_UNIQUE_INDEX) =>
        {
            HitRepositoryError::DuplicateResult(key.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info)
            if is_violation_of(info.as_ref(), RESULT_WORKER_FOREIGN_KEY) =>
        {
            HitRepositoryError::WorkerNotFound(key.worker_id.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info)
            if is_violation_of(info.as_ref(), RESULT_ASSIGNMENT_FOREIGN_KEY) =>
        {
            HitRepositoryError::AssignmentNotFound(key.assignment_id.clone())
        }
        _ => HitRepositoryError::persistence(err),
    }
}

fn to_db_int(value: u32) -> HitRepositoryResult<i32> {
    i32::try_from(value).map_err(HitRepositoryError::persistence)
}

fn to_db_opt(value: Option<u32>) -> HitRepositoryResult<Option<i32>> {
    value.map(to_db_int).transpose()
}

fn from_db_int(value: i32) -> HitRepositoryResult<u32> {
    u32::try_from(value).map_err(HitRepositoryError::invalid_persisted_data)
}

fn from_db_opt(value: Option<i32>) -> HitRepositoryResult<Option<u32>> {
    value.map(from_db_int).transpose()
}

/// Decodes a single-character status column.
fn decode_code<T, E>(
    raw: Option<String>,
    from_code: fn(char) -> Result<T, E>,
) -> HitRepositoryResult<Option<T>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    raw.map(|value| {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => from_code(code).map_err(HitRepositoryError::invalid_persisted_data),
            _ => Err(HitRepositoryError::invalid_persisted_data(
                std::io::Error::other(format!("invalid status code '{value}'")),
            )),
        }
    })
    .transpose()
}

fn hit_to_row(hit: &Hit) -> HitRepositoryResult<HitRow> {
    let counts = hit.assignment_counts();
    Ok(HitRow {
        id: hit.id().into_inner(),
        remote_id: hit.remote_id().map(|id| id.as_str().to_owned()),
        hit_type_id: hit.hit_type_id().map(|id| id.as_str().to_owned()),
        creation_time: hit.creation_time(),
        title: hit.title().to_owned(),
        description: hit.description().to_owned(),
        keywords: join_keywords(hit.keywords()),
        reward: hit.reward(),
        lifetime_in_seconds: to_db_opt(hit.lifetime_in_seconds())?,
        assignment_duration_in_seconds: to_db_opt(hit.assignment_duration_in_seconds())?,
        max_assignments: to_db_int(hit.max_assignments())?,
        auto_approval_delay_in_seconds: to_db_opt(hit.auto_approval_delay_in_seconds())?,
        requester_annotation: hit.requester_annotation().map(str::to_owned),
        number_of_similar_hits: to_db_opt(hit.number_of_similar_hits())?,
        status: hit.status().map(|status| status.code().to_string()),
        review_status: hit.review_status().map(|status| status.code().to_string()),
        assignments_pending: to_db_opt(counts.pending)?,
        assignments_available: to_db_opt(counts.available)?,
        assignments_completed: to_db_opt(counts.completed)?,
        last_synced_at: hit.last_synced_at(),
        created_at: hit.created_at(),
        updated_at: hit.updated_at(),
    })
}

fn row_to_hit(row: HitRow) -> HitRepositoryResult<Hit> {
    let HitRow {
        id,
        remote_id,
        hit_type_id,
        creation_time,
        title,
        description,
        keywords,
        reward,
        lifetime_in_seconds,
        assignment_duration_in_seconds,
        max_assignments,
        auto_approval_delay_in_seconds,
        requester_annotation,
        number_of_similar_hits,
        status,
        review_status,
        assignments_pending,
        assignments_available,
        assignments_completed,
        last_synced_at,
        created_at,
        updated_at,
    } = row;

    let data = PersistedHitData {
        id: HitId::from_uuid(id),
        remote_id: remote_id
            .map(RemoteHitId::new)
            .transpose()
            .map_err(HitRepositoryError::invalid_persisted_data)?,
        hit_type_id: hit_type_id
            .map(HitTypeId::new)
            .transpose()
            .map_err(HitRepositoryError::invalid_persisted_data)?,
        creation_time,
        title,
        description,
        keywords: split_keywords(&keywords),
        reward,
        lifetime_in_seconds: from_db_opt(lifetime_in_seconds)?,
        assignment_duration_in_seconds: from_db_opt(assignment_duration_in_seconds)?,
        max_assignments: from_db_int(max_assignments)?,
        auto_approval_delay_in_seconds: from_db_opt(auto_approval_delay_in_seconds)?,
        requester_annotation,
        number_of_similar_hits: from_db_opt(number_of_similar_hits)?,
        status: decode_code(status, HitStatus::from_code)?,
        review_status: decode_code(review_status, HitReviewStatus::from_code)?,
        assignment_counts: AssignmentCounts {
            pending: from_db_opt(assignments_pending)?,
            available: from_db_opt(assignments_available)?,
            completed: from_db_opt(assignments_completed)?,
        },
        last_synced_at,
        created_at,
        updated_at,
    };
    Ok(Hit::from_persisted(data))
}

fn assignment_to_row(assignment: &Assignment) -> AssignmentRow {
    let times = assignment.times();
    AssignmentRow {
        id: assignment.id().as_str().to_owned(),
        hit_id: assignment.hit_id().into_inner(),
        worker_id: assignment.worker_id().map(|id| id.as_str().to_owned()),
        status: assignment.status().map(|status| status.code().to_string()),
        accepted_at: times.accepted_at,
        submitted_at: times.submitted_at,
        auto_approval_at: times.auto_approval_at,
        approved_at: times.approved_at,
        rejected_at: times.rejected_at,
        deadline: times.deadline,
        requester_feedback: assignment.requester_feedback().map(str::to_owned),
        completed: assignment.completed(),
        last_synced_at: assignment.last_synced_at(),
    }
}

fn row_to_assignment(row: AssignmentRow) -> HitRepositoryResult<Assignment> {
    let AssignmentRow {
        id,
        hit_id,
        worker_id,
        status,
        accepted_at,
        submitted_at,
        auto_approval_at,
        approved_at,
        rejected_at,
        deadline,
        requester_feedback,
        completed,
        last_synced_at,
    } = row;

    let data = PersistedAssignmentData {
        id: RemoteAssignmentId::new(id).map_err(HitRepositoryError::invalid_persisted_data)?,
        hit_id: HitId::from_uuid(hit_id),
        worker_id: worker_id
            .map(WorkerId::new)
            .transpose()
            .map_err(HitRepositoryError::invalid_persisted_data)?,
        status: decode_code(status, AssignmentStatus::from_code)?,
        times: AssignmentTimes {
            accepted_at,
            submitted_at,
            auto_approval_at,
            approved_at,
            rejected_at,
            deadline,
        },
        requester_feedback,
        completed,
        last_synced_at,
    };
    Ok(Assignment::from_persisted(data))
}

fn answer_to_row(answer: &AnswerRecord) -> KeyValueRow {
    KeyValueRow {
        id: answer.id().into_inner(),
        assignment_id: answer.assignment_id().as_str().to_owned(),
        key: answer.key().to_owned(),
        value: answer.value().map(str::to_owned),
    }
}

fn row_to_answer(row: KeyValueRow) -> HitRepositoryResult<AnswerRecord> {
    let assignment_id = RemoteAssignmentId::new(row.assignment_id)
        .map_err(HitRepositoryError::invalid_persisted_data)?;
    Ok(AnswerRecord::from_persisted(
        AnswerId::from_uuid(row.id),
        assignment_id,
        row.key,
        row.value,
    ))
}

fn result_to_row(result: &CompletionResult) -> HitRepositoryResult<ResultRow> {
    Ok(ResultRow {
        id: result.id.into_inner(),
        worker_id: result.worker_id.as_str().to_owned(),
        template_id: result.template_id.as_str().to_owned(),
        battery_id: result.battery_id.as_str().to_owned(),
        assignment_id: result.assignment_id.as_str().to_owned(),
        task_data: result.task_data.clone(),
        datetime: result.metadata.datetime.clone(),
        current_trial: to_db_opt(result.metadata.current_trial)?,
        language: result.metadata.language.clone(),
        browser: result.metadata.browser.clone(),
        platform: result.metadata.platform.clone(),
        completed: result.completed,
        credit_granted: result.credit_granted,
    })
}

fn row_to_result(row: ResultRow) -> HitRepositoryResult<CompletionResult> {
    let ResultRow {
        id,
        worker_id,
        template_id,
        battery_id,
        assignment_id,
        task_data,
        datetime,
        current_trial,
        language,
        browser,
        platform,
        completed,
        credit_granted,
    } = row;

    Ok(CompletionResult {
        id: CompletionResultId::from_uuid(id),
        worker_id: WorkerId::new(worker_id).map_err(HitRepositoryError::invalid_persisted_data)?,
        template_id: TemplateId::new(template_id)
            .map_err(HitRepositoryError::invalid_persisted_data)?,
        battery_id: BatteryId::new(battery_id)
            .map_err(HitRepositoryError::invalid_persisted_data)?,
        assignment_id: RemoteAssignmentId::new(assignment_id)
            .map_err(HitRepositoryError::invalid_persisted_data)?,
        task_data,
        metadata: SubmissionMetadata {
            datetime,
            current_trial: from_db_opt(current_trial)?,
            language,
            browser,
            platform,
        },
        completed,
        credit_granted,
    })
}
