/// Undo/redo history for the workflow editor.
///
/// Provides an `EditorHistoryStore` that owns the live workflow document
/// being edited together with two snapshot stacks. Low-level field setters
/// never record history on their own; callers take a checkpoint with
/// `save_to_history` before a coherent edit, or use the graph edit intents
/// which do so for them. History capture can be suppressed for a scope.
pub mod config;
pub mod edit;
pub mod snapshot;
pub mod store;
pub mod view;

pub use config::HistoryConfig;
pub use snapshot::Snapshot;
pub use store::{EditorHistoryStore, EditorSeed, HistorySuppression};
pub use view::EditorView;
