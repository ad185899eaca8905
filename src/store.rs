//! Read access to the `exercise` table through a shared sqlx pool.

use std::str::FromStr;

use chrono::NaiveDate;
use log::debug;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{ReportError, Result};
use crate::model::{ExerciseRecord, SeriesRow, WorkoutSpan};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS exercise (
    exercise_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    exercise_name TEXT    NOT NULL,
    weight        REAL,
    date          TEXT    NOT NULL,
    user_id       TEXT
)";

// Whole numbers in NUMERIC or INTEGER columns are stored as INTEGER and must widen to REAL.
const SELECT_EXERCISES: &str = "SELECT exercise_id, exercise_name,
       CASE WHEN typeof(weight) = 'integer' THEN CAST(weight AS REAL) ELSE weight END AS weight,
       date
  FROM exercise";

const SELECT_USER_EXERCISES: &str = "SELECT exercise_id, exercise_name,
       CASE WHEN typeof(weight) = 'integer' THEN CAST(weight AS REAL) ELSE weight END AS weight,
       date
  FROM exercise
 WHERE user_id = ?";

const SELECT_WORKOUT_SPAN: &str = "SELECT MIN(date) AS first_day, MAX(date) AS last_day
  FROM exercise";

const SELECT_SERIES: &str = "SELECT exercise_name,
       GROUP_CONCAT(weight, ',' ORDER BY date) AS weights,
       GROUP_CONCAT(date, ',' ORDER BY date) AS dates
  FROM exercise
 GROUP BY exercise_name";

const SELECT_USER_SERIES: &str = "SELECT exercise_name,
       GROUP_CONCAT(weight, ',' ORDER BY date) AS weights,
       GROUP_CONCAT(date, ',' ORDER BY date) AS dates
  FROM exercise
 WHERE user_id = ?
 GROUP BY exercise_name";

/// A new row for the `exercise` table.
#[derive(Clone, Debug, PartialEq)]
pub struct NewExercise {
    pub name: String,
    pub weight: f64,
    pub date: NaiveDate,
    pub user_id: Option<String>,
}

/// Handle to the exercise store. Cloning shares the underlying pool.
#[derive(Clone, Debug)]
pub struct ExerciseStore {
    pool: SqlitePool,
}

impl ExerciseStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url` with at most `max_connections` connections.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Opens a private in-memory database backed by a single long-lived connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the `exercise` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts a row and returns its generated id.
    pub async fn insert(&self, exercise: &NewExercise) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO exercise (exercise_name, weight, date, user_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&exercise.name)
        .bind(exercise.weight)
        .bind(exercise.date)
        .bind(exercise.user_id.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Exercise rows in store order, restricted to `user_id` when one is given.
    pub async fn exercises(&self, user_id: Option<&str>) -> Result<Vec<ExerciseRecord>> {
        let query = match user_id {
            Some(user_id) => sqlx::query_as(SELECT_USER_EXERCISES).bind(user_id),
            None => sqlx::query_as(SELECT_EXERCISES),
        };
        let records: Vec<ExerciseRecord> = query
            .fetch_all(&self.pool)
            .await
            .map_err(|err| ReportError::from_query(err, "exercise rows"))?;
        debug!(
            "Fetched {} exercise rows (user filter: {})",
            records.len(),
            user_id.unwrap_or("<none>")
        );
        Ok(records)
    }

    /// First and last workout dates across every user, as stored.
    ///
    /// The values are compared and returned as text, so another user's malformed date never
    /// fails the request. Returns `None` when the aggregate yields no row or only NULLs (an
    /// empty table).
    pub async fn workout_span(&self) -> Result<Option<WorkoutSpan>> {
        let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(SELECT_WORKOUT_SPAN)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| ReportError::from_query(err, "workout span"))?;

        Ok(match row {
            Some((Some(first_day), Some(last_day))) => Some(WorkoutSpan {
                first_day,
                last_day,
            }),
            _ => None,
        })
    }

    /// One row per exercise name with weights and dates concatenated in date order,
    /// restricted to `user_id` when one is given.
    pub async fn series(&self, user_id: Option<&str>) -> Result<Vec<SeriesRow>> {
        let query = match user_id {
            Some(user_id) => sqlx::query_as(SELECT_USER_SERIES).bind(user_id),
            None => sqlx::query_as(SELECT_SERIES),
        };
        let rows: Vec<SeriesRow> = query
            .fetch_all(&self.pool)
            .await
            .map_err(|err| ReportError::from_query(err, "exercise series"))?;
        debug!("Fetched {} series rows", rows.len());
        Ok(rows)
    }
}
