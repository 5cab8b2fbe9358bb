/// Read-only view of the editor state handed to the UI layer.
use flow_editor_model::{BlockInstance, BlockType, Wire};

/// Derived editor state.
///
/// Built fresh by `EditorHistoryStore::view` on every call, so it always
/// reflects the last completed operation. Borrowing the store keeps it from
/// outliving the next mutation.
#[derive(Debug, Clone, Copy)]
pub struct EditorView<'a> {
    pub blocks: &'a [BlockInstance],
    pub wires: &'a [Wire],
    pub block_types: &'a [BlockType],
    pub name: &'a str,
    pub description: &'a str,
    pub workflow_id: &'a str,
    pub can_undo: bool,
    pub can_redo: bool,
    pub has_clipboard: bool,
    /// Diagnostic only: whether history capture is currently suppressed.
    pub skip_saving_history: bool,
}
