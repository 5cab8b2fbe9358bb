/// Read-only catalog of block types and structural validation of documents.
use std::collections::HashSet;

use thiserror::Error;

use crate::block::{BlockType, Wire};
use crate::workflow::WorkflowDocument;

/// Structural problems found in a workflow document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Block id '{0}' is used by more than one block")]
    DuplicateBlockId(String),

    #[error("Block '{block_id}' has an unknown type: '{type_name}'")]
    UnknownBlockType { block_id: String, type_name: String },

    #[error(
        "Block '{missing_block}' not found, which is required by the wire {}.{} -> {}.{}",
        .wire.source_block,
        .wire.source_output,
        .wire.target_block,
        .wire.target_input
    )]
    WireEndpointNotFound { missing_block: String, wire: Wire },

    #[error("Block '{block_id}' has no output named '{output}'")]
    UnknownOutput { block_id: String, output: String },

    #[error("Block '{block_id}' has no input named '{input}'")]
    UnknownInput { block_id: String, input: String },

    #[error("Required input '{input}' of block '{block_id}' is not connected")]
    MissingRequiredInput { block_id: String, input: String },
}

/// The set of block types available to the editor.
///
/// Supplied by the backend and never modified by the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockTypeCatalog {
    types: Vec<BlockType>,
}

impl From<Vec<BlockType>> for BlockTypeCatalog {
    fn from(types: Vec<BlockType>) -> Self {
        Self { types }
    }
}

impl BlockTypeCatalog {
    pub fn new(types: Vec<BlockType>) -> Self {
        Self { types }
    }

    /// Finds a block type by its `type_name`.
    pub fn get(&self, type_name: &str) -> Option<&BlockType> {
        self.types.iter().find(|t| t.type_name == type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }

    pub fn as_slice(&self) -> &[BlockType] {
        &self.types
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Checks a document against this catalog.
    ///
    /// Problems are reported in document order: block checks first, then
    /// wires, then unconnected required inputs. Ports of blocks with an
    /// unknown type are not checked.
    pub fn validate(&self, document: &WorkflowDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for block in &document.blocks {
            if !seen.insert(block.block_id.as_str()) {
                errors.push(ValidationError::DuplicateBlockId(block.block_id.clone()));
            }
            if !self.contains(&block.type_name) {
                errors.push(ValidationError::UnknownBlockType {
                    block_id: block.block_id.clone(),
                    type_name: block.type_name.clone(),
                });
            }
        }

        for wire in &document.wires {
            self.check_wire(document, wire, &mut errors);
        }

        for block in &document.blocks {
            let Some(block_type) = self.get(&block.type_name) else {
                continue;
            };
            for input in block_type.inputs.iter().filter(|i| i.required && i.default.is_none()) {
                let connected = document
                    .wires
                    .iter()
                    .any(|w| w.target_block == block.block_id && w.target_input == input.name);
                if !connected {
                    errors.push(ValidationError::MissingRequiredInput {
                        block_id: block.block_id.clone(),
                        input: input.name.clone(),
                    });
                }
            }
        }

        errors
    }

    fn check_wire(
        &self,
        document: &WorkflowDocument,
        wire: &Wire,
        errors: &mut Vec<ValidationError>,
    ) {
        let source = document.block(&wire.source_block);
        let target = document.block(&wire.target_block);

        for (block, id) in [(source, &wire.source_block), (target, &wire.target_block)] {
            if block.is_none() {
                errors.push(ValidationError::WireEndpointNotFound {
                    missing_block: id.clone(),
                    wire: wire.clone(),
                });
            }
        }

        if let Some(block_type) = source.and_then(|b| self.get(&b.type_name)) {
            if block_type.output(&wire.source_output).is_none() {
                errors.push(ValidationError::UnknownOutput {
                    block_id: wire.source_block.clone(),
                    output: wire.source_output.clone(),
                });
            }
        }
        if let Some(block_type) = target.and_then(|b| self.get(&b.type_name)) {
            if block_type.input(&wire.target_input).is_none() {
                errors.push(ValidationError::UnknownInput {
                    block_id: wire.target_block.clone(),
                    input: wire.target_input.clone(),
                });
            }
        }
    }
}
