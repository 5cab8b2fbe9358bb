/// Workflow documents and their persisted envelopes.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::block::{BlockInstance, Wire};

/// The editable part of a workflow: graph plus free-text metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub blocks: Vec<BlockInstance>,
    pub wires: Vec<Wire>,
    pub name: String,
    pub description: String,
    /// Empty for a workflow that has never been saved.
    pub workflow_id: String,
}

impl WorkflowDocument {
    pub fn block(&self, block_id: &str) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| b.block_id == block_id)
    }

    pub fn contains_block(&self, block_id: &str) -> bool {
        self.block(block_id).is_some()
    }
}

/// A workflow as stored by the backend, addressed by `group_id/workflow_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub group_id: String,
    pub workflow_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub blocks: Vec<BlockInstance>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Workflow {
    /// Wraps an editor document for storage under `group_id`.
    pub fn from_document(group_id: impl Into<String>, document: WorkflowDocument) -> Self {
        Self {
            group_id: group_id.into(),
            workflow_id: document.workflow_id,
            name: document.name,
            description: document.description,
            blocks: document.blocks,
            wires: document.wires,
            metadata: None,
        }
    }

    /// Extracts the editable document, dropping group and metadata.
    pub fn to_document(&self) -> WorkflowDocument {
        WorkflowDocument {
            blocks: self.blocks.clone(),
            wires: self.wires.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            workflow_id: self.workflow_id.clone(),
        }
    }

    pub fn info(&self) -> WorkflowInfo {
        WorkflowInfo {
            group_id: self.group_id.clone(),
            workflow_id: self.workflow_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            block_count: self.blocks.len(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Listing entry for a stored workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInfo {
    pub group_id: String,
    pub workflow_id: String,
    pub name: String,
    pub description: String,
    pub block_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}
