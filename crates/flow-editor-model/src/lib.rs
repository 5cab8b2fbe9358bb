/// Shared data model for the workflow editor.
///
/// Mirrors the JSON shapes exchanged with the workflow backend: placed
/// block instances, the wires between their ports, the block types that
/// describe those ports, and the persisted workflow envelope.
pub mod block;
pub mod catalog;
pub mod palette;
pub mod workflow;

pub use block::{BlockConfig, BlockInput, BlockInstance, BlockOutput, BlockType, Position, Wire};
pub use catalog::{BlockTypeCatalog, ValidationError};
pub use palette::{port_colors, HexColor, PortColors};
pub use workflow::{Workflow, WorkflowDocument, WorkflowInfo};
