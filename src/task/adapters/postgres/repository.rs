//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        NewTask, PersistedTaskData, PipelineStage, Task, TaskId, TaskPatch, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

const TASKS_SCHEMA: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_tasks/up.sql");

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// Updates lock the row with `SELECT ... FOR UPDATE`, apply the patch to the
/// rebuilt aggregate and write the result back inside one transaction.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    /// Creates the `tasks` table and its index when they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the statements fail.
    pub async fn ensure_schema(&self) -> TaskRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection.batch_execute(TASKS_SCHEMA)?;
            Ok(())
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, new_task: &NewTask) -> TaskRepositoryResult<Task> {
        let new_row = NewTaskRow {
            user_input: new_task.user_input().to_owned(),
            extracted_document_text: new_task.extracted_document_text().map(str::to_owned),
            status: TaskStatus::Pending.as_str().to_owned(),
            created_at: new_task.created_at(),
            updated_at: new_task.created_at(),
        };

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)?;
            row_to_task(row)
        })
        .await
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> TaskRepositoryResult<Task> {
        let patch = patch.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let row = tasks::table
                    .filter(tasks::id.eq(id.value()))
                    .select(TaskRow::as_select())
                    .for_update()
                    .first::<TaskRow>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::NotFound(id))?;

                let mut task = row_to_task(row)?;
                task.apply_patch(&patch)?;

                diesel::update(tasks::table.filter(tasks::id.eq(id.value())))
                    .set(&to_changeset(&task)?)
                    .execute(tx)?;
                Ok(task)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.value()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_unfinished(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let terminal = vec![TaskStatus::Completed.as_str(), TaskStatus::Failed.as_str()];
            tasks::table
                .filter(tasks::status.ne_all(terminal))
                .order(tasks::id.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }
}

fn to_changeset(task: &Task) -> TaskRepositoryResult<TaskChangeset> {
    let retry_count =
        i32::try_from(task.retry_count()).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskChangeset {
        status: task.status().as_str().to_owned(),
        planning_result: task.planning_result().map(str::to_owned),
        execution_result: task.execution_result().map(str::to_owned),
        review_result: task.review_result().map(str::to_owned),
        final_result: task.final_result().map(str::to_owned),
        template: task.template().map(str::to_owned),
        retry_count,
        provisional: task.provisional(),
        fail_reason: task.fail_reason().map(str::to_owned),
        fail_step: task.fail_step().map(|step| step.as_str().to_owned()),
        planning_duration_ms: task.planning_duration_ms(),
        execution_duration_ms: task.execution_duration_ms(),
        review_duration_ms: task.review_duration_ms(),
        finalizing_duration_ms: task.finalizing_duration_ms(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let fail_step = row
        .fail_step
        .as_deref()
        .map(PipelineStage::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;
    let retry_count = u32::try_from(row.retry_count).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(row.id),
        user_input: row.user_input,
        extracted_document_text: row.extracted_document_text,
        status,
        planning_result: row.planning_result,
        execution_result: row.execution_result,
        review_result: row.review_result,
        final_result: row.final_result,
        template: row.template,
        retry_count,
        provisional: row.provisional,
        fail_reason: row.fail_reason,
        fail_step,
        planning_duration_ms: row.planning_duration_ms,
        execution_duration_ms: row.execution_duration_ms,
        review_duration_ms: row.review_duration_ms,
        finalizing_duration_ms: row.finalizing_duration_ms,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
