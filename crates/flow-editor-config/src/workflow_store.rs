/// Local workflow repository backed by redb.
///
/// Mirrors the backend's workflow endpoints (list, get, create, update,
/// delete) so an editor session can load and save without a server.
/// Uses a single redb database file with two tables:
/// - `workflow_docs`: full workflow as JSON text, keyed by `"{group_id}/{workflow_id}"`
/// - `workflow_meta`: bincode-serialized listing data under the same key
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use flow_editor_model::{Workflow, WorkflowInfo};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

/// Workflow documents: key → JSON text.
///
/// Block configs hold arbitrary JSON values, which bincode cannot decode,
/// so documents are stored as JSON.
const WORKFLOW_DOCS: TableDefinition<&str, &str> = TableDefinition::new("workflow_docs");

/// Listing metadata: key → bincode(`StoredMeta`).
const WORKFLOW_META: TableDefinition<&str, &[u8]> = TableDefinition::new("workflow_meta");

/// File name of the repository inside the data directory.
pub const DATABASE_FILE: &str = "workflows.redb";

/// Per-workflow listing data, kept apart from the document so listing
/// does not parse every workflow.
#[derive(Debug, Serialize, Deserialize)]
struct StoredMeta {
    name: String,
    description: String,
    block_count: usize,
    updated_at_ms: i64,
}

/// One row of `WorkflowStore::list`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowListing {
    /// Listing fields. `metadata` is always `None` here; load the
    /// workflow to read it.
    pub info: WorkflowInfo,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Create,
    Update,
    Upsert,
}

/// Formats the table key for a workflow.
fn workflow_key(group_id: &str, workflow_id: &str) -> String {
    format!("{group_id}/{workflow_id}")
}

/// Rejects ids that would produce an ambiguous key or REST path.
fn check_ids(group_id: &str, workflow_id: &str) -> Result<()> {
    if group_id.is_empty() || workflow_id.is_empty() {
        bail!("Workflow group and id must not be empty");
    }
    if group_id.contains('/') {
        bail!("Workflow group '{group_id}' must not contain '/'");
    }
    if workflow_id.contains('/') {
        bail!("Workflow id '{workflow_id}' must not contain '/'");
    }
    Ok(())
}

/// Persistent store of workflows, shared by every editing session of a process.
pub struct WorkflowStore {
    db: Database,
}

impl std::fmt::Debug for WorkflowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowStore").finish()
    }
}

impl WorkflowStore {
    /// Returns the database path inside `data_dir`.
    pub fn database_path(data_dir: &Path) -> PathBuf {
        data_dir.join(DATABASE_FILE)
    }

    /// Opens or creates the repository in `data_dir`.
    ///
    /// Creates the directory, the database file and both tables on first use.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = Self::database_path(data_dir);
        let db = Database::create(&db_path)
            .with_context(|| format!("Failed to open workflow database: {}", db_path.display()))?;

        // Ensure tables exist
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(WORKFLOW_DOCS)
                .context("Failed to create workflow_docs table")?;
            let _ = write_txn
                .open_table(WORKFLOW_META)
                .context("Failed to create workflow_meta table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        tracing::debug!("Opened workflow database at {}", db_path.display());
        Ok(Self { db })
    }

    /// Stores a new workflow. Fails if one already exists under the same key.
    pub fn create(&self, workflow: &Workflow) -> Result<()> {
        self.write(workflow, WriteMode::Create)
    }

    /// Replaces an existing workflow. Fails if there is none to replace.
    pub fn update(&self, workflow: &Workflow) -> Result<()> {
        self.write(workflow, WriteMode::Update)
    }

    /// Stores a workflow, replacing any existing one.
    pub fn save(&self, workflow: &Workflow) -> Result<()> {
        self.write(workflow, WriteMode::Upsert)
    }

    /// Loads a workflow, or `None` if it does not exist.
    pub fn get(&self, group_id: &str, workflow_id: &str) -> Result<Option<Workflow>> {
        check_ids(group_id, workflow_id)?;
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(WORKFLOW_DOCS)
            .context("Failed to open workflow_docs table")?;

        let key = workflow_key(group_id, workflow_id);
        match table.get(key.as_str()).context("Failed to read workflow")? {
            Some(guard) => {
                let workflow: Workflow = serde_json::from_str(guard.value())
                    .with_context(|| format!("Failed to parse stored workflow {key}"))?;
                Ok(Some(workflow))
            }
            None => Ok(None),
        }
    }

    /// Whether a workflow exists under the given ids.
    pub fn contains(&self, group_id: &str, workflow_id: &str) -> Result<bool> {
        check_ids(group_id, workflow_id)?;
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(WORKFLOW_META)
            .context("Failed to open workflow_meta table")?;
        let key = workflow_key(group_id, workflow_id);
        let found = table
            .get(key.as_str())
            .context("Failed to read workflow metadata")?
            .is_some();
        Ok(found)
    }

    /// Lists all stored workflows ordered by group, then id.
    pub fn list(&self) -> Result<Vec<WorkflowListing>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(WORKFLOW_META)
            .context("Failed to open workflow_meta table")?;

        let mut listings = Vec::new();
        for entry in table.iter().context("Failed to iterate workflow_meta table")? {
            let (key_guard, value_guard) = entry.context("Failed to read workflow_meta entry")?;
            let key = key_guard.value();
            let Some((group_id, workflow_id)) = key.split_once('/') else {
                tracing::warn!("Skipping malformed workflow key: {key}");
                continue;
            };
            let meta: StoredMeta = bincode::deserialize(value_guard.value())
                .with_context(|| format!("Failed to deserialize metadata for {key}"))?;
            let updated_at = Utc
                .timestamp_millis_opt(meta.updated_at_ms)
                .single()
                .unwrap_or_default();
            listings.push(WorkflowListing {
                info: WorkflowInfo {
                    group_id: group_id.to_string(),
                    workflow_id: workflow_id.to_string(),
                    name: meta.name,
                    description: meta.description,
                    block_count: meta.block_count,
                    metadata: None,
                },
                updated_at,
            });
        }
        Ok(listings)
    }

    /// Removes a workflow. Returns whether it existed.
    pub fn delete(&self, group_id: &str, workflow_id: &str) -> Result<bool> {
        check_ids(group_id, workflow_id)?;
        let key = workflow_key(group_id, workflow_id);
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        let existed;
        {
            let mut docs = write_txn
                .open_table(WORKFLOW_DOCS)
                .context("Failed to open workflow_docs table")?;
            existed = docs
                .remove(key.as_str())
                .context("Failed to remove workflow")?
                .is_some();
        }
        {
            let mut meta = write_txn
                .open_table(WORKFLOW_META)
                .context("Failed to open workflow_meta table")?;
            meta.remove(key.as_str())
                .context("Failed to remove workflow metadata")?;
        }
        write_txn.commit().context("Failed to commit deletion")?;

        if existed {
            tracing::info!("Deleted workflow {key}");
        }
        Ok(existed)
    }

    fn write(&self, workflow: &Workflow, mode: WriteMode) -> Result<()> {
        check_ids(&workflow.group_id, &workflow.workflow_id)?;
        let key = workflow_key(&workflow.group_id, &workflow.workflow_id);

        let json = serde_json::to_string(workflow).context("Failed to serialize workflow")?;
        let meta = StoredMeta {
            name: workflow.name.clone(),
            description: workflow.description.clone(),
            block_count: workflow.blocks.len(),
            updated_at_ms: Utc::now().timestamp_millis(),
        };
        let meta_bytes = bincode::serialize(&meta).context("Failed to serialize workflow metadata")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut docs = write_txn
                .open_table(WORKFLOW_DOCS)
                .context("Failed to open workflow_docs table")?;
            let exists = docs
                .get(key.as_str())
                .context("Failed to read workflow")?
                .is_some();
            match mode {
                WriteMode::Create if exists => bail!("Workflow {key} already exists"),
                WriteMode::Update if !exists => bail!("Workflow {key} not found"),
                _ => {}
            }
            docs.insert(key.as_str(), json.as_str())
                .context("Failed to insert workflow")?;
        }
        {
            let mut table = write_txn
                .open_table(WORKFLOW_META)
                .context("Failed to open workflow_meta table")?;
            table
                .insert(key.as_str(), meta_bytes.as_slice())
                .context("Failed to insert workflow metadata")?;
        }
        write_txn.commit().context("Failed to commit workflow")?;

        tracing::debug!(blocks = workflow.blocks.len(), "Stored workflow {key}");
        Ok(())
    }
}
