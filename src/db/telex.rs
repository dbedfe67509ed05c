//! Telex row storage: insert, fetch, list, read-modify-write, delete.

use crate::error::{Error, Result};
use crate::model::{self, Status, TelexId, TelexRecord};
use chrono::{DateTime, Utc};

const SELECT_COLUMNS: &str = "SELECT id, telex_number, status, assignee_widebody, assignee_narrowbody, remark, created_at, completed_at FROM telex";

impl super::Db {
    /// Insert a new PENDING telex. Returns the assigned id.
    pub async fn create_telex(&self, telex_number: &str, now: DateTime<Utc>) -> Result<TelexId> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO telex (telex_number, status, created_at)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(telex_number)
        .bind(Status::Pending.as_str())
        .bind(model::format_stored(now))
        .fetch_one(&self.pool)
        .await?;
        Ok(TelexId(id))
    }

    /// Get a telex by id.
    pub async fn get_telex(&self, id: TelexId) -> Result<TelexRecord> {
        let row: Option<TelexRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(Error::NotFound(id.0))?.try_into_record()
    }

    /// All telexes, newest first. Ties on `created_at` fall back to id.
    pub async fn list_telexes(&self) -> Result<Vec<TelexRecord>> {
        let rows: Vec<TelexRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TelexRow::try_into_record).collect()
    }

    /// Load, mutate, and write back one telex inside a transaction.
    ///
    /// The transaction opens with a no-op write on the row, so it holds the
    /// write lock (SQLite) or row lock (Postgres) before reading. Concurrent
    /// updates to the same telex queue behind each other and each one
    /// mutates the state the previous one committed.
    pub async fn update_telex<F>(&self, id: TelexId, mutate: F) -> Result<TelexRecord>
    where
        F: FnOnce(&mut TelexRecord),
    {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("UPDATE telex SET status = status WHERE id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if locked == 0 {
            return Err(Error::NotFound(id.0));
        }

        let row: Option<TelexRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await?;
        let mut record = row.ok_or(Error::NotFound(id.0))?.try_into_record()?;

        mutate(&mut record);

        sqlx::query(
            "UPDATE telex SET status = $1, assignee_widebody = $2, assignee_narrowbody = $3, remark = $4, completed_at = $5
             WHERE id = $6",
        )
        .bind(record.status.as_str())
        .bind(record.assignee_widebody.clone())
        .bind(record.assignee_narrowbody.clone())
        .bind(record.remark.clone())
        .bind(record.completed_at.map(model::format_stored))
        .bind(id.0)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Permanently remove a telex.
    pub async fn delete_telex(&self, id: TelexId) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM telex WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(Error::NotFound(id.0));
        }
        Ok(())
    }

    pub async fn count_telexes(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM telex")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
struct TelexRow {
    id: i64,
    telex_number: String,
    status: String,
    assignee_widebody: Option<String>,
    assignee_narrowbody: Option<String>,
    remark: Option<String>,
    created_at: String,
    completed_at: Option<String>,
}

impl TelexRow {
    fn try_into_record(self) -> Result<TelexRecord> {
        Ok(TelexRecord {
            id: TelexId(self.id),
            telex_number: self.telex_number,
            status: self.status.parse()?,
            assignee_widebody: self.assignee_widebody,
            assignee_narrowbody: self.assignee_narrowbody,
            remark: self.remark,
            created_at: model::parse_stored(&self.created_at)?,
            completed_at: self
                .completed_at
                .as_deref()
                .map(model::parse_stored)
                .transpose()?,
        })
    }
}
