//! Repositories for database operations

use anyhow::{Context, Result};
use async_trait::async_trait;
use common::error::DatabaseError;
use session_core::{Feedback, Session, SessionFilter, SessionStatus, SessionStore};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

pub mod user;

pub use user::UserRepository;

const SESSION_COLUMNS: &str = "id, title, description, time_start, time_end, \
    maximum_participants, status, created_by, participants, feedbacks, created_at, updated_at";

/// Session repository for database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Start a SELECT over sessions with `filter` compiled into the WHERE clause
    fn select<'a>(filter: &'a SessionFilter) -> QueryBuilder<'a, Postgres> {
        let mut query = QueryBuilder::new(format!("SELECT {} FROM sessions WHERE TRUE", SESSION_COLUMNS));

        if let Some(statuses) = &filter.statuses {
            query
                .push(" AND status = ANY(")
                .push_bind(status_names(statuses))
                .push(")");
        }
        if !filter.excluded_statuses.is_empty() {
            query
                .push(" AND NOT (status = ANY(")
                .push_bind(status_names(&filter.excluded_statuses))
                .push("))");
        }
        if let Some(created_by) = filter.created_by {
            query.push(" AND created_by = ").push_bind(created_by);
        }
        if let Some(participant) = filter.participant {
            query
                .push(" AND ")
                .push_bind(participant)
                .push(" = ANY(participants)");
        }
        // Inclusive on both ends: touching intervals overlap
        if let Some(range) = filter.overlapping {
            query
                .push(" AND time_start <= ")
                .push_bind(range.end)
                .push(" AND time_end >= ")
                .push_bind(range.start);
        }
        if let Some(id) = filter.exclude_id {
            query.push(" AND id <> ").push_bind(id);
        }

        query.push(" ORDER BY time_start, created_at");
        query
    }
}

fn status_names(statuses: &[SessionStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn capacity_column(session: &Session) -> Result<i32> {
    i32::try_from(session.maximum_participants).context("maximum_participants out of range")
}

fn session_from_row(row: &PgRow) -> Result<Session> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<SessionStatus>()
        .map_err(|message| DatabaseError::Decode {
            table: "sessions",
            message,
        })?;

    let maximum_participants: i32 = row.try_get("maximum_participants")?;
    let maximum_participants =
        u32::try_from(maximum_participants).map_err(|_| DatabaseError::Decode {
            table: "sessions",
            message: format!("negative maximum_participants {}", maximum_participants),
        })?;

    let Json(feedbacks): Json<Vec<Feedback>> = row.try_get("feedbacks")?;

    Ok(Session {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        time_start: row.try_get("time_start")?,
        time_end: row.try_get("time_end")?,
        maximum_participants,
        status,
        created_by: row.try_get("created_by")?,
        participants: row.try_get("participants")?,
        feedbacks,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>> {
        let row = sqlx::query(&format!("SELECT {} FROM sessions WHERE id = $1", SESSION_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn find_one(&self, filter: &SessionFilter) -> Result<Option<Session>> {
        let mut query = Self::select(filter);
        query.push(" LIMIT 1");

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn find_many(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        let rows = Self::select(filter)
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        rows.iter().map(session_from_row).collect()
    }

    async fn insert(&self, session: &Session) -> Result<Session> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO sessions (id, title, description, time_start, time_end,
                maximum_participants, status, created_by, participants, feedbacks,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(session.id)
        .bind(&session.title)
        .bind(&session.description)
        .bind(session.time_start)
        .bind(session.time_end)
        .bind(capacity_column(session)?)
        .bind(session.status.as_str())
        .bind(session.created_by)
        .bind(&session.participants)
        .bind(Json(&session.feedbacks))
        .bind(session.created_at)
        .bind(session.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        session_from_row(&row)
    }

    async fn save(&self, session: &Session) -> Result<Option<Session>> {
        // participants is written only by append_participant
        let row = sqlx::query(&format!(
            r#"
            UPDATE sessions
            SET title = $2, description = $3, time_start = $4, time_end = $5,
                maximum_participants = $6, status = $7, feedbacks = $8, updated_at = NOW()
            WHERE id = $1 AND cardinality(participants) <= $6
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(session.id)
        .bind(&session.title)
        .bind(&session.description)
        .bind(session.time_start)
        .bind(session.time_end)
        .bind(capacity_column(session)?)
        .bind(session.status.as_str())
        .bind(Json(&session.feedbacks))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_participant(&self, id: Uuid, user_id: Uuid) -> Result<Option<Session>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE sessions
            SET participants = array_append(participants, $2), updated_at = NOW()
            WHERE id = $1
              AND status = 'upcoming'
              AND cardinality(participants) < maximum_participants
              AND NOT ($2 = ANY(participants))
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(session_from_row).transpose()
    }
}
