/// History entries: frozen copies of the editable document.
use flow_editor_model::{BlockInstance, Wire, WorkflowDocument};

/// An immutable copy of the document taken at one point in time.
///
/// A snapshot owns its data, so later edits to the live document can never
/// reach back into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    document: WorkflowDocument,
    /// Monotonic sequence number assigned by the `EditorHistoryStore`.
    seq: u64,
}

impl Snapshot {
    pub(crate) fn capture(document: &WorkflowDocument, seq: u64) -> Self {
        Self {
            document: document.clone(),
            seq,
        }
    }

    pub(crate) fn into_document(self) -> WorkflowDocument {
        self.document
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn document(&self) -> &WorkflowDocument {
        &self.document
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
}
