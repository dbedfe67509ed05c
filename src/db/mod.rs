//! Database connection pool, schema setup, and health check.
//!
//! Goes through sqlx's `Any` driver so one code path serves both Postgres
//! (hosted deployments) and a local SQLite file (the default).

pub mod telex;

use crate::error::{Error, Result};
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

/// Which concrete database sits behind the `Any` pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Pick the backend from the connection string's scheme.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or_default();
        match scheme {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(Error::Config(format!(
                "unsupported database scheme {other:?} (expected postgresql or sqlite)"
            ))),
        }
    }

    /// DDL for the telex table. Only the identity column differs; SQLite
    /// needs AUTOINCREMENT to keep deleted ids from being handed out again.
    fn create_telex_table(self) -> &'static str {
        match self {
            Backend::Postgres => {
                "CREATE TABLE IF NOT EXISTS telex (
                    id BIGSERIAL PRIMARY KEY,
                    telex_number TEXT NOT NULL,
                    status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
                    assignee_widebody VARCHAR(100),
                    assignee_narrowbody VARCHAR(100),
                    remark TEXT,
                    created_at TEXT NOT NULL,
                    completed_at TEXT
                )"
            }
            Backend::Sqlite => {
                "CREATE TABLE IF NOT EXISTS telex (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    telex_number TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'PENDING',
                    assignee_widebody TEXT,
                    assignee_narrowbody TEXT,
                    remark TEXT,
                    created_at TEXT NOT NULL,
                    completed_at TEXT
                )"
            }
        }
    }
}

/// Database handle. Owns the connection pool.
#[derive(Clone)]
pub struct Db {
    pool: AnyPool,
    backend: Backend,
}

impl Db {
    /// Connect and create a connection pool.
    ///
    /// An in-memory SQLite database lives only as long as its connection,
    /// so those get a single connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let backend = Backend::from_url(url)?;

        let options = if url.contains(":memory:") {
            AnyPoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            AnyPoolOptions::new().max_connections(10)
        };
        let pool = options.connect(url).await?;

        tracing::debug!(?backend, "database pool ready");
        Ok(Self { pool, backend })
    }

    /// Create the schema if it does not exist. Idempotent; run once before
    /// serving.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(self.backend.create_telex_table())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Other(format!("migration failed: {e}")))?;
        sqlx::query("CREATE INDEX IF NOT EXISTS telex_created_at_idx ON telex (created_at)")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Other(format!("migration failed: {e}")))?;
        tracing::info!(backend = ?self.backend, "schema ready");
        Ok(())
    }

    /// Simple health check: run a SELECT 1.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_follows_scheme() {
        assert_eq!(
            Backend::from_url("postgresql://u@h/db").unwrap(),
            Backend::Postgres
        );
        assert_eq!(Backend::from_url("postgres://u@h/db").unwrap(), Backend::Postgres);
        assert_eq!(Backend::from_url("sqlite::memory:").unwrap(), Backend::Sqlite);
        assert_eq!(
            Backend::from_url("sqlite://telex_tracker.db?mode=rwc").unwrap(),
            Backend::Sqlite
        );
        assert!(matches!(
            Backend::from_url("mysql://u@h/db"),
            Err(Error::Config(_))
        ));
    }
}
