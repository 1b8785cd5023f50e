//! Snapshot stored as a document in an embedded SurrealDB.
//!
//! Each project is one record in the `project_document` table, keyed by
//! the project id. The encoded snapshot is kept as a string payload so the
//! document layout stays identical to the file store.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, SurrealKv};
use tracing::{debug, warn};

use super::SnapshotStore;
use crate::error::{GanttError, GanttResult};
use crate::snapshot::Snapshot;

/// Table holding one record per project
pub const DOCUMENT_TABLE: &str = "project_document";

/// SQL statements for the document store
mod sql {
    /// Define the document table
    pub const DEFINE_DOCUMENT_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS project_document SCHEMAFULL;

        DEFINE FIELD payload ON project_document TYPE string;

        DEFINE FIELD version ON project_document TYPE string;

        DEFINE FIELD saved_at ON project_document TYPE datetime DEFAULT time::now();
    "#;

    /// Insert or replace a project's document
    pub const UPSERT_DOCUMENT: &str = r#"
        UPSERT type::thing('project_document', $project) SET
            payload = $payload,
            version = $version,
            saved_at = time::now();
    "#;

    /// Fetch a project's document payload
    pub const SELECT_DOCUMENT: &str =
        "SELECT payload FROM type::thing('project_document', $project);";
}

#[derive(Debug, Deserialize)]
struct PayloadRow {
    payload: String,
}

/// SurrealDB-backed store for one project.
pub struct DocumentStore {
    client: Surreal<Db>,
    path: PathBuf,
    project: String,
}

impl DocumentStore {
    /// Open the store at `path` for `project`.
    ///
    /// Creates the directory if needed and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns `GanttError::CreateDirectory` if the directory cannot be
    /// created, `GanttError::Connection` if the database cannot be opened
    /// (for example when another process holds it), and
    /// `GanttError::Store` if the schema cannot be defined.
    pub async fn connect(path: &Path, project: &str) -> GanttResult<Self> {
        let path = prepare_path(path)?;

        let client =
            Surreal::new::<SurrealKv>(path.clone())
                .await
                .map_err(|e| GanttError::Connection {
                    path: path.clone(),
                    source: Box::new(e),
                })?;

        client.use_ns("gantt").use_db("timeline").await?;
        init_schema(&client).await?;

        debug!("Opened document store at {} for project {}", path.display(), project);
        Ok(Self {
            client,
            path,
            project: project.to_string(),
        })
    }

    /// Path where the database is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project key of the stored document.
    pub fn project(&self) -> &str {
        &self.project
    }
}

static_assertions::assert_impl_all!(DocumentStore: Send, Sync);

impl SnapshotStore for DocumentStore {
    fn name(&self) -> &str {
        "document"
    }

    async fn probe(&self) -> bool {
        match self.client.health().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Document store health check failed: {}", e);
                false
            }
        }
    }

    async fn load(&self) -> GanttResult<Option<Snapshot>> {
        debug!("Fetching document: {}", self.project);
        let mut response = self
            .client
            .query(sql::SELECT_DOCUMENT)
            .bind(("project", self.project.clone()))
            .await?;
        let rows: Vec<PayloadRow> = response.take(0)?;

        match rows.into_iter().next() {
            Some(row) => Snapshot::from_json(&row.payload).map(Some),
            None => {
                debug!("Document not found: {}", self.project);
                Ok(None)
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> GanttResult<()> {
        let payload = serde_json::to_string(snapshot)?;
        debug!("Saving document: {} ({} bytes)", self.project, payload.len());
        self.client
            .query(sql::UPSERT_DOCUMENT)
            .bind(("project", self.project.clone()))
            .bind(("payload", payload))
            .bind(("version", snapshot.version.clone()))
            .await?
            .check()?;
        Ok(())
    }
}

/// Define the document table. Idempotent.
async fn init_schema(client: &Surreal<Db>) -> GanttResult<()> {
    client.query(sql::DEFINE_DOCUMENT_TABLE).await?.check()?;
    Ok(())
}

fn prepare_path(path: &Path) -> GanttResult<PathBuf> {
    let path = path.to_path_buf();
    if !path.exists() {
        std::fs::create_dir_all(&path).map_err(|e| GanttError::CreateDirectory {
            path: path.clone(),
            source: e,
        })?;
    }
    Ok(path)
}
