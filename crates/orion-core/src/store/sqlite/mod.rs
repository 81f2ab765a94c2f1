//! SQLite-backed plan store.
//!
//! Every operation opens its own connection on a blocking thread, so the
//! store holds nothing but the database path and is cheap to share.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::task;

use super::{newest_first, validate_plan, PlanStore};
use crate::error::{DatabaseResultExt, OrionError, Result};
use crate::models::{Plan, PlanSummary};

mod plan_queries;
mod schema;

/// Database connection and operations handler.
pub(crate) struct Database {
    connection: Connection,
}

impl Database {
    /// Opens a connection and initializes the schema.
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

/// Plans persisted in a SQLite file.
#[derive(Debug, Clone)]
pub struct SqlitePlanStore {
    db_path: PathBuf,
}

impl SqlitePlanStore {
    /// Opens (creating if needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns `OrionError::FileSystem` if the parent directory cannot be
    /// created, `OrionError::Database` if schema initialization fails.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| OrionError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let init_path = db_path.clone();
        run_blocking(move || Database::new(&init_path).map(drop)).await?;

        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| OrionError::Configuration {
            message: format!("Task join error: {e}"),
        })?
}

#[async_trait]
impl PlanStore for SqlitePlanStore {
    async fn put(&self, plan: Plan) -> Result<()> {
        validate_plan(&plan)?;
        let db_path = self.db_path.clone();

        run_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.insert_plan(&plan)
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<Plan>> {
        let db_path = self.db_path.clone();
        let id = id.to_string();

        run_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_plan(&id)
        })
        .await
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let db_path = self.db_path.clone();
        let id = id.to_string();

        run_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_plan(&id)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<PlanSummary>> {
        let db_path = self.db_path.clone();

        let mut summaries = run_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_plans()
        })
        .await?;
        newest_first(&mut summaries);
        Ok(summaries)
    }
}
