/// Block instances, wires and block type descriptors.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canvas position of a placed block.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One placed node in a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    /// Unique id of the block within its workflow.
    #[serde(default)]
    pub block_id: String,
    /// Name of the `BlockType` this block instantiates.
    pub type_name: String,
    /// Display name shown on the canvas.
    #[serde(default)]
    pub name: String,
    /// Per-instance configuration values keyed by config name.
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub position: Position,
}

impl BlockInstance {
    /// Creates a block with an empty configuration.
    pub fn new(
        block_id: impl Into<String>,
        type_name: impl Into<String>,
        name: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            block_id: block_id.into(),
            type_name: type_name.into(),
            name: name.into(),
            config: Map::new(),
            position,
        }
    }
}

/// Directed connection from one block's output port to another block's input port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wire {
    pub source_block: String,
    pub source_output: String,
    pub target_block: String,
    pub target_input: String,
}

impl Wire {
    pub fn new(
        source_block: impl Into<String>,
        source_output: impl Into<String>,
        target_block: impl Into<String>,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            source_block: source_block.into(),
            source_output: source_output.into(),
            target_block: target_block.into(),
            target_input: target_input.into(),
        }
    }

    /// Whether either end of the wire is attached to `block_id`.
    pub fn touches(&self, block_id: &str) -> bool {
        self.source_block == block_id || self.target_block == block_id
    }
}

/// Declared input port of a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub port_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Declared output port of a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockOutput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub port_type: String,
}

/// Declared configuration entry of a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub config_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Descriptor of an available block kind, as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    pub type_name: String,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<BlockInput>,
    #[serde(default)]
    pub outputs: Vec<BlockOutput>,
    #[serde(default)]
    pub configs: Vec<BlockConfig>,
}

impl BlockType {
    pub fn input(&self, name: &str) -> Option<&BlockInput> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&BlockOutput> {
        self.outputs.iter().find(|o| o.name == name)
    }
}
