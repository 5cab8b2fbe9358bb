/// Scripted edit sessions.
///
/// An edit script is a JSON array of commands, each tagged by `op`, that is
/// replayed against an `EditorHistoryStore` exactly as an interactive
/// editor would issue the same intents.
use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use flow_editor_config::WorkflowStore;
use flow_editor_mod_history::{EditorHistoryStore, EditorSeed, HistoryConfig};
use flow_editor_model::{BlockInstance, BlockType, Position, Wire, Workflow};
use serde::Deserialize;
use serde_json::Value;

/// One step of an edit script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddBlock { block: BlockInstance },
    RemoveBlock { block_id: String },
    MoveBlock { block_id: String, x: f64, y: f64 },
    Connect { wire: Wire },
    Disconnect { wire: Wire },
    Rename { name: String },
    Describe { description: String },
    SetConfig { block_id: String, key: String, value: Value },
    Reset,
    Undo,
    Redo,
}

/// Outcome of replaying a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptReport {
    /// Commands that changed the document or moved through history.
    pub applied: usize,
    /// Commands that had nothing to do (unknown or duplicate block, unchanged
    /// value, empty stack, ...).
    pub skipped: usize,
}

/// Result of running a script against a stored workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub report: ScriptReport,
    pub undo_depth: usize,
    pub redo_depth: usize,
    /// The edited workflow, with the stored metadata carried over.
    pub workflow: Workflow,
    /// Whether the edited document differs from the stored one.
    pub changed: bool,
    /// Whether the edited workflow was written back.
    pub saved: bool,
}

impl fmt::Display for EditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} applied, {} skipped; undo depth {}, redo depth {}",
            self.report.applied, self.report.skipped, self.undo_depth, self.redo_depth
        )
    }
}

/// Block type files come either as the backend's listing response or as a
/// bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BlockTypesFile {
    Listing { types: Vec<BlockType> },
    Plain(Vec<BlockType>),
}

/// Reads an edit script from a JSON file.
pub fn load_script(path: &Path) -> Result<Vec<EditCommand>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read edit script: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse edit script: {}", path.display()))
}

/// Reads a block type catalog from a JSON file.
pub fn load_block_types(path: &Path) -> Result<Vec<BlockType>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read block types: {}", path.display()))?;
    let file: BlockTypesFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse block types: {}", path.display()))?;
    Ok(match file {
        BlockTypesFile::Listing { types } => types,
        BlockTypesFile::Plain(types) => types,
    })
}

/// Applies a single command. Returns whether it had any effect.
pub fn apply(store: &mut EditorHistoryStore, command: &EditCommand) -> bool {
    match command {
        EditCommand::AddBlock { block } => store.add_block(block.clone()),
        EditCommand::RemoveBlock { block_id } => store.remove_block(block_id),
        EditCommand::MoveBlock { block_id, x, y } => {
            store.move_blocks([(block_id.as_str(), Position::new(*x, *y))]) > 0
        }
        EditCommand::Connect { wire } => store.connect(wire.clone()),
        EditCommand::Disconnect { wire } => store.disconnect(wire),
        EditCommand::Rename { name } => store.rename(name.as_str()),
        EditCommand::Describe { description } => store.describe(description.as_str()),
        EditCommand::SetConfig {
            block_id,
            key,
            value,
        } => store.update_block_config(block_id, key, value.clone()),
        EditCommand::Reset => {
            store.reset();
            true
        }
        EditCommand::Undo => store.undo(),
        EditCommand::Redo => store.redo(),
    }
}

/// Replays `commands` in order.
pub fn apply_script(store: &mut EditorHistoryStore, commands: &[EditCommand]) -> ScriptReport {
    let mut report = ScriptReport::default();
    for (index, command) in commands.iter().enumerate() {
        if apply(store, command) {
            report.applied += 1;
        } else {
            tracing::warn!("Edit step {index} had no effect: {command:?}");
            report.skipped += 1;
        }
    }
    report
}

/// Loads `group_id/workflow_id`, replays `commands` in a fresh editing
/// session and writes the result back unless `dry_run` is set or nothing
/// changed.
///
/// With a non-empty `block_types` the result is validated and every issue
/// is logged; issues do not prevent saving.
pub fn edit_stored_workflow(
    repo: &WorkflowStore,
    group_id: &str,
    workflow_id: &str,
    commands: &[EditCommand],
    block_types: Vec<BlockType>,
    history: HistoryConfig,
    dry_run: bool,
) -> Result<EditOutcome> {
    let stored = repo
        .get(group_id, workflow_id)?
        .ok_or_else(|| anyhow!("Workflow {group_id}/{workflow_id} not found"))?;
    let original = stored.to_document();

    let mut session = EditorHistoryStore::new(history);
    session.initialize(EditorSeed::from_document(original.clone(), block_types));
    let report = apply_script(&mut session, commands);

    if !session.catalog().is_empty() {
        for issue in session.catalog().validate(session.document()) {
            tracing::warn!("{group_id}/{workflow_id}: {issue}");
        }
    }

    let changed = session.document() != &original;
    let mut workflow = Workflow::from_document(group_id, session.document().clone());
    workflow.metadata = stored.metadata;

    let saved = changed && !dry_run;
    if saved {
        repo.update(&workflow)?;
    }

    Ok(EditOutcome {
        report,
        undo_depth: session.undo_depth(),
        redo_depth: session.redo_depth(),
        workflow,
        changed,
        saved,
    })
}
