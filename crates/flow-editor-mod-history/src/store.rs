/// Editor state holder with snapshot-based undo/redo.
///
/// The store owns the live workflow document and two stacks of snapshots.
/// `save_to_history` is the only operation that moves history forward and
/// the only one that discards redo entries; `undo` and `redo` shuttle
/// snapshots between the stacks, swapping in the document they hold.
use std::ops::{Deref, DerefMut};

use flow_editor_model::{BlockInstance, BlockType, BlockTypeCatalog, Wire, WorkflowDocument};

use crate::config::HistoryConfig;
use crate::snapshot::Snapshot;
use crate::view::EditorView;

/// Data used to seed an editing session.
///
/// Missing metadata fields start out as empty strings.
#[derive(Debug, Clone, Default)]
pub struct EditorSeed {
    pub blocks: Vec<BlockInstance>,
    pub wires: Vec<Wire>,
    pub block_types: Vec<BlockType>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub workflow_id: Option<String>,
}

impl EditorSeed {
    /// Seeds a session from an existing document and the available block types.
    pub fn from_document(document: WorkflowDocument, block_types: Vec<BlockType>) -> Self {
        Self {
            blocks: document.blocks,
            wires: document.wires,
            block_types,
            name: Some(document.name),
            description: Some(document.description),
            workflow_id: Some(document.workflow_id),
        }
    }
}

/// Owns the document being edited and its undo/redo history.
///
/// One store per editing session. All operations are total: undo and redo
/// on an empty stack do nothing, and suppression is always released by the
/// scope that acquired it.
pub struct EditorHistoryStore {
    /// The live document.
    document: WorkflowDocument,
    /// Block types available to the editor. Never modified after `initialize`.
    catalog: BlockTypeCatalog,
    /// Snapshots to go back to, most recent on top.
    undo_stack: Vec<Snapshot>,
    /// Snapshots undone so far, most recently undone on top.
    redo_stack: Vec<Snapshot>,
    /// Next sequence number to assign to a snapshot.
    next_seq: u64,
    /// Number of active suppression scopes. History is captured only at zero.
    suppress_depth: usize,
    /// Copy/paste buffer. No operation on this store fills it.
    clipboard: Option<Vec<BlockInstance>>,
    config: HistoryConfig,
}

impl std::fmt::Debug for EditorHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHistoryStore")
            .field("workflow_id", &self.document.workflow_id)
            .field("blocks", &self.document.blocks.len())
            .field("wires", &self.document.wires.len())
            .field("undo_len", &self.undo_stack.len())
            .field("redo_len", &self.redo_stack.len())
            .field("next_seq", &self.next_seq)
            .field("suppress_depth", &self.suppress_depth)
            .finish()
    }
}

impl Default for EditorHistoryStore {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl EditorHistoryStore {
    /// Creates a store holding an empty document and no history.
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            document: WorkflowDocument::default(),
            catalog: BlockTypeCatalog::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_seq: 0,
            suppress_depth: 0,
            clipboard: None,
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Replaces the whole document and the block type catalog.
    ///
    /// Runs with history suppressed, so loading never produces an undo
    /// entry. Existing stacks are left as they are; a fresh store has none.
    pub fn initialize(&mut self, seed: EditorSeed) {
        self.perform_action_without_history(|store| {
            store.document = WorkflowDocument {
                blocks: seed.blocks,
                wires: seed.wires,
                name: seed.name.unwrap_or_default(),
                description: seed.description.unwrap_or_default(),
                workflow_id: seed.workflow_id.unwrap_or_default(),
            };
            store.catalog = BlockTypeCatalog::new(seed.block_types);
        });
        tracing::debug!(
            workflow_id = %self.document.workflow_id,
            blocks = self.document.blocks.len(),
            wires = self.document.wires.len(),
            block_types = self.catalog.len(),
            "Initialized editor document"
        );
    }

    // ── Field setters (no history) ─────────────────────────────────────

    pub fn update_blocks(&mut self, blocks: Vec<BlockInstance>) {
        self.document.blocks = blocks;
    }

    pub fn update_wires(&mut self, wires: Vec<Wire>) {
        self.document.wires = wires;
    }

    pub fn update_name(&mut self, name: impl Into<String>) {
        self.document.name = name.into();
    }

    pub fn update_description(&mut self, description: impl Into<String>) {
        self.document.description = description.into();
    }

    pub fn update_workflow_id(&mut self, workflow_id: impl Into<String>) {
        self.document.workflow_id = workflow_id.into();
    }

    /// In-place access to the live blocks, e.g. while dragging.
    pub fn blocks_mut(&mut self) -> &mut Vec<BlockInstance> {
        &mut self.document.blocks
    }

    pub fn wires_mut(&mut self) -> &mut Vec<Wire> {
        &mut self.document.wires
    }

    // ── History ────────────────────────────────────────────────────────

    /// Pushes a snapshot of the live document and clears the redo stack.
    ///
    /// Does nothing while history is suppressed.
    pub fn save_to_history(&mut self) {
        if self.skip_saving_history() {
            tracing::trace!("History suppressed, checkpoint skipped");
            return;
        }
        self.push_undo();
        self.redo_stack.clear();
        tracing::debug!(undo_len = self.undo_stack.len(), "Saved history checkpoint");
    }

    /// Restores the state captured by the most recent checkpoint.
    ///
    /// The state being replaced becomes redoable. Returns `false` without
    /// touching anything if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.capture();
        self.redo_stack.push(current);
        self.document = previous.into_document();
        tracing::debug!(
            undo_len = self.undo_stack.len(),
            redo_len = self.redo_stack.len(),
            "Undo"
        );
        true
    }

    /// Re-applies the most recently undone state.
    ///
    /// The state being replaced goes back on the undo stack. Unlike a
    /// checkpoint this keeps the remaining redo entries. Returns `false`
    /// without touching anything if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.push_undo();
        self.document = next.into_document();
        tracing::debug!(
            undo_len = self.undo_stack.len(),
            redo_len = self.redo_stack.len(),
            "Redo"
        );
        true
    }

    /// Checkpoints, then empties the graph. Name, description and id stay.
    pub fn reset(&mut self) {
        self.save_to_history();
        self.document.blocks.clear();
        self.document.wires.clear();
    }

    /// Drops both stacks, making the current document the new baseline.
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Whether the document has changed since it was loaded.
    pub fn is_dirty(&self) -> bool {
        self.can_undo()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo entries, oldest first.
    pub fn undo_stack(&self) -> &[Snapshot] {
        &self.undo_stack
    }

    /// Redo entries, the next one to redo last.
    pub fn redo_stack(&self) -> &[Snapshot] {
        &self.redo_stack
    }

    // ── Suppression ────────────────────────────────────────────────────

    /// Suppresses history capture until the returned guard is dropped.
    ///
    /// Scopes nest: capture resumes only when the outermost guard is gone.
    /// The guard derefs to the store, so edits go through it.
    pub fn suppress_history(&mut self) -> HistorySuppression<'_> {
        self.suppress_depth += 1;
        HistorySuppression { store: self }
    }

    /// Runs `action` with history capture suppressed.
    ///
    /// Whatever `action` returns, including an `Err`, is handed back
    /// untouched. Suppression ends when `action` returns or unwinds.
    pub fn perform_action_without_history<R>(&mut self, action: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = self.suppress_history();
        action(&mut guard)
    }

    pub fn skip_saving_history(&self) -> bool {
        self.suppress_depth > 0
    }

    // ── Views ──────────────────────────────────────────────────────────

    /// Derived state for the UI, computed from the current fields.
    pub fn view(&self) -> EditorView<'_> {
        EditorView {
            blocks: &self.document.blocks,
            wires: &self.document.wires,
            block_types: self.catalog.as_slice(),
            name: &self.document.name,
            description: &self.document.description,
            workflow_id: &self.document.workflow_id,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            has_clipboard: self.has_clipboard(),
            skip_saving_history: self.skip_saving_history(),
        }
    }

    /// The live document, e.g. for handing to a persistence layer.
    pub fn document(&self) -> &WorkflowDocument {
        &self.document
    }

    pub fn catalog(&self) -> &BlockTypeCatalog {
        &self.catalog
    }

    pub fn blocks(&self) -> &[BlockInstance] {
        &self.document.blocks
    }

    pub fn wires(&self) -> &[Wire] {
        &self.document.wires
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn description(&self) -> &str {
        &self.document.description
    }

    pub fn workflow_id(&self) -> &str {
        &self.document.workflow_id
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    fn capture(&mut self) -> Snapshot {
        let snapshot = Snapshot::capture(&self.document, self.next_seq);
        self.next_seq += 1;
        snapshot
    }

    /// Pushes the live document onto the undo stack, evicting the oldest
    /// entries beyond the configured depth. Leaves the redo stack alone.
    fn push_undo(&mut self) {
        let snapshot = self.capture();
        self.undo_stack.push(snapshot);

        let depth = self.config.effective_depth();
        if self.undo_stack.len() > depth {
            let excess = self.undo_stack.len() - depth;
            self.undo_stack.drain(..excess);
            tracing::trace!(evicted = excess, "Evicted oldest history entries");
        }
    }
}

/// Scope during which history capture is suppressed.
///
/// Returned by `EditorHistoryStore::suppress_history`. Dereferences to the
/// store; dropping it (including during unwinding) ends the scope.
#[must_use = "history is only suppressed while the guard is alive"]
#[derive(Debug)]
pub struct HistorySuppression<'a> {
    store: &'a mut EditorHistoryStore,
}

impl Deref for HistorySuppression<'_> {
    type Target = EditorHistoryStore;

    fn deref(&self) -> &Self::Target {
        self.store
    }
}

impl DerefMut for HistorySuppression<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.store
    }
}

impl Drop for HistorySuppression<'_> {
    fn drop(&mut self) {
        self.store.suppress_depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_editor_model::Position;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn block(id: &str) -> BlockInstance {
        BlockInstance::new(id, "internal:text_block", id, Position::default())
    }

    fn wire(from: &str, to: &str) -> Wire {
        Wire::new(from, "text", to, "text")
    }

    fn seeded_store() -> EditorHistoryStore {
        let mut store = EditorHistoryStore::default();
        store.initialize(EditorSeed {
            blocks: vec![block("b1"), block("b2")],
            wires: vec![wire("b1", "b2")],
            block_types: Vec::new(),
            name: Some("draft".to_string()),
            description: Some("first draft".to_string()),
            workflow_id: Some("wf-1".to_string()),
        });
        store
    }

    // --- Initialize ---

    #[test]
    fn test_initialize_records_no_history() {
        let store = seeded_store();
        assert!(!store.can_undo());
        assert!(!store.can_redo());
        assert!(!store.is_dirty());
        assert!(!store.skip_saving_history());
        assert_eq!(store.blocks().len(), 2);
        assert_eq!(store.name(), "draft");
    }

    #[test]
    fn test_initialize_defaults_missing_metadata() {
        let mut store = EditorHistoryStore::default();
        store.initialize(EditorSeed {
            blocks: vec![block("b1")],
            ..Default::default()
        });
        assert_eq!(store.name(), "");
        assert_eq!(store.description(), "");
        assert_eq!(store.workflow_id(), "");
        assert!(!store.can_undo());
    }

    #[test]
    fn test_initialize_from_document() {
        let doc = WorkflowDocument {
            blocks: vec![block("x")],
            wires: Vec::new(),
            name: "n".to_string(),
            description: "d".to_string(),
            workflow_id: "id".to_string(),
        };
        let mut store = EditorHistoryStore::default();
        store.initialize(EditorSeed::from_document(doc.clone(), Vec::new()));
        assert_eq!(store.document(), &doc);
    }

    // --- Save / undo / redo ---

    #[test]
    fn test_save_then_undo_restores_previous_state() {
        let mut store = seeded_store();
        let before = store.document().clone();

        store.save_to_history();
        store.update_blocks(vec![block("b3")]);
        store.update_wires(Vec::new());
        store.update_name("renamed");
        store.update_description("changed");
        store.update_workflow_id("wf-2");

        assert!(store.undo());
        assert_eq!(store.document(), &before);
        assert!(store.can_redo());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_undo_then_redo_restores_edited_state() {
        let mut store = seeded_store();
        store.save_to_history();
        store.update_blocks(vec![block("b3")]);
        store.update_name("renamed");
        let edited = store.document().clone();

        store.undo();
        assert!(store.redo());
        assert_eq!(store.document(), &edited);
        assert!(store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_new_checkpoint_clears_redo() {
        let mut store = seeded_store();
        store.save_to_history();
        store.update_name("one");
        store.undo();
        assert!(store.can_redo());

        store.save_to_history();
        store.update_name("two");
        assert!(!store.can_redo());
    }

    #[test]
    fn test_redo_keeps_remaining_redo_entries() {
        let mut store = seeded_store();
        for name in ["a", "b", "c"] {
            store.save_to_history();
            store.update_name(name);
        }

        store.undo();
        store.undo();
        store.undo();
        assert_eq!(store.name(), "draft");
        assert_eq!(store.redo_depth(), 3);

        store.redo();
        assert_eq!(store.name(), "a");
        assert_eq!(store.redo_depth(), 2);
        store.redo();
        assert_eq!(store.name(), "b");
        store.redo();
        assert_eq!(store.name(), "c");
        assert!(!store.can_redo());
        assert_eq!(store.undo_depth(), 3);
    }

    #[test]
    fn test_undo_never_crosses_initial_baseline() {
        let mut store = seeded_store();
        let baseline = store.document().clone();
        store.save_to_history();
        store.update_name("edited");

        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(store.document(), &baseline);
    }

    #[test]
    fn test_empty_stack_undo_redo_change_nothing() {
        let mut store = seeded_store();
        let doc = store.document().clone();

        assert!(!store.undo());
        assert!(!store.redo());
        assert_eq!(store.document(), &doc);
        assert!(store.undo_stack().is_empty());
        assert!(store.redo_stack().is_empty());

        // Redo stack empty while undo stack is not.
        store.save_to_history();
        store.update_name("x");
        let doc = store.document().clone();
        let undo = store.undo_stack().to_vec();
        assert!(!store.redo());
        assert_eq!(store.document(), &doc);
        assert_eq!(store.undo_stack(), undo.as_slice());
    }

    #[test]
    fn test_undo_assigns_fresh_sequence_numbers() {
        let mut store = seeded_store();
        store.save_to_history();
        store.save_to_history();
        let seqs: Vec<u64> = store.undo_stack().iter().map(Snapshot::seq).collect();
        assert_eq!(seqs, vec![0, 1]);

        store.undo();
        assert_eq!(store.redo_stack()[0].seq(), 2);
    }

    // --- Reset ---

    #[test]
    fn test_reset_records_history() {
        let mut store = seeded_store();
        store.reset();
        assert!(store.blocks().is_empty());
        assert!(store.wires().is_empty());
        assert_eq!(store.name(), "draft");
        assert_eq!(store.workflow_id(), "wf-1");

        assert!(store.undo());
        assert_eq!(store.blocks(), &[block("b1"), block("b2")]);
        assert_eq!(store.wires(), &[wire("b1", "b2")]);
    }

    // --- Suppression ---

    #[test]
    fn test_suppressed_action_records_nothing() {
        let mut store = seeded_store();
        store.save_to_history();
        let depth = store.undo_depth();

        store.perform_action_without_history(|s| {
            assert!(s.skip_saving_history());
            s.save_to_history();
            s.update_blocks(Vec::new());
            s.save_to_history();
        });

        assert_eq!(store.undo_depth(), depth);
        assert!(store.blocks().is_empty());
        assert!(!store.skip_saving_history());
    }

    #[test]
    fn test_suppression_released_after_panic() {
        let mut store = seeded_store();
        let result = catch_unwind(AssertUnwindSafe(|| {
            store.perform_action_without_history(|_| panic!("action failed"));
        }));
        assert!(result.is_err());
        assert!(!store.skip_saving_history());

        store.save_to_history();
        assert_eq!(store.undo_depth(), 1);
    }

    #[test]
    fn test_action_error_is_passed_through() {
        let mut store = seeded_store();
        let result: Result<(), String> = store.perform_action_without_history(|s| {
            s.update_name("partial");
            Err("invalid workflow".to_string())
        });
        assert_eq!(result, Err("invalid workflow".to_string()));
        assert!(!store.skip_saving_history());
        assert_eq!(store.name(), "partial");
    }

    #[test]
    fn test_nested_suppression_holds_until_outer_scope_ends() {
        let mut store = seeded_store();
        store.perform_action_without_history(|outer| {
            outer.perform_action_without_history(|inner| {
                inner.update_name("inner");
            });
            assert!(outer.skip_saving_history());
            outer.save_to_history();
        });
        assert!(!store.can_undo());
        assert!(!store.skip_saving_history());
    }

    #[test]
    fn test_suppression_guard_scope() {
        let mut store = seeded_store();
        {
            let mut guard = store.suppress_history();
            guard.save_to_history();
            guard.update_name("quiet");
            assert!(guard.view().skip_saving_history);
        }
        assert!(!store.can_undo());
        assert_eq!(store.name(), "quiet");
        assert!(!store.view().skip_saving_history);
    }

    // --- Depth bound ---

    #[test]
    fn test_depth_bound_evicts_oldest() {
        let mut store = EditorHistoryStore::new(HistoryConfig::with_depth(3));
        for i in 0..5 {
            store.save_to_history();
            store.update_name(format!("v{}", i));
        }
        assert_eq!(store.undo_depth(), 3);

        let mut names = Vec::new();
        while store.undo() {
            names.push(store.name().to_string());
        }
        assert_eq!(names, vec!["v3", "v2", "v1"]);
    }

    #[test]
    fn test_redo_respects_depth_bound() {
        let mut store = EditorHistoryStore::new(HistoryConfig::with_depth(2));
        store.save_to_history();
        store.update_name("a");
        store.save_to_history();
        store.update_name("b");
        store.undo();
        store.redo();
        assert_eq!(store.undo_depth(), 2);
        assert_eq!(store.name(), "b");
    }

    // --- Snapshot isolation ---

    #[test]
    fn test_in_place_edit_does_not_touch_snapshot() {
        let mut store = seeded_store();
        store.save_to_history();

        store.blocks_mut()[0].position = Position::new(50.0, 50.0);
        store.blocks_mut().push(block("b9"));
        store.wires_mut().clear();

        let snap = &store.undo_stack()[0];
        assert_eq!(snap.blocks(), &[block("b1"), block("b2")]);
        assert_eq!(snap.wires().len(), 1);
    }

    // --- View ---

    #[test]
    fn test_view_tracks_every_change() {
        let mut store = seeded_store();
        let view = store.view();
        assert_eq!(view.blocks.len(), 2);
        assert_eq!(view.workflow_id, "wf-1");
        assert!(!view.can_undo);
        assert!(!view.has_clipboard);

        store.save_to_history();
        store.update_description("updated");
        let view = store.view();
        assert!(view.can_undo);
        assert!(!view.can_redo);
        assert_eq!(view.description, "updated");

        store.undo();
        let view = store.view();
        assert!(!view.can_undo);
        assert!(view.can_redo);
        assert_eq!(view.description, "first draft");
    }

    #[test]
    fn test_clear_history() {
        let mut store = seeded_store();
        store.save_to_history();
        store.save_to_history();
        store.undo();
        store.clear_history();
        assert!(!store.can_undo());
        assert!(!store.can_redo());
    }
}
