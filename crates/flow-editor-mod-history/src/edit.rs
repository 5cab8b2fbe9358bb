/// Undoable graph edits built on the field setters.
///
/// Each intent takes exactly one checkpoint before it mutates, so one user
/// action is one undo step. Intents that would change nothing return
/// `false` (or `0`) and leave the history untouched.
use flow_editor_model::{BlockInstance, Position, Wire};
use serde_json::Value;

use crate::store::EditorHistoryStore;

impl EditorHistoryStore {
    /// Places a new block on the canvas.
    ///
    /// Returns `false` if a block with the same id is already placed.
    pub fn add_block(&mut self, block: BlockInstance) -> bool {
        if self.document().contains_block(&block.block_id) {
            return false;
        }
        self.save_to_history();
        tracing::debug!(block_id = %block.block_id, type_name = %block.type_name, "Add block");
        self.blocks_mut().push(block);
        true
    }

    /// Removes a block together with every wire attached to it.
    pub fn remove_block(&mut self, block_id: &str) -> bool {
        if !self.document().contains_block(block_id) {
            return false;
        }
        self.save_to_history();
        self.blocks_mut().retain(|b| b.block_id != block_id);
        self.wires_mut().retain(|w| !w.touches(block_id));
        tracing::debug!(block_id, "Remove block");
        true
    }

    /// Moves several blocks as one undo step.
    ///
    /// Unknown ids are skipped. Returns how many blocks were moved.
    pub fn move_blocks<I, S>(&mut self, moves: I) -> usize
    where
        I: IntoIterator<Item = (S, Position)>,
        S: AsRef<str>,
    {
        let moves: Vec<(S, Position)> = moves
            .into_iter()
            .filter(|(id, _)| self.document().contains_block(id.as_ref()))
            .collect();
        if moves.is_empty() {
            return 0;
        }

        self.save_to_history();
        for (id, position) in &moves {
            if let Some(block) = self
                .blocks_mut()
                .iter_mut()
                .find(|b| b.block_id == id.as_ref())
            {
                block.position = *position;
            }
        }
        moves.len()
    }

    /// Adds a wire unless an identical one already exists.
    pub fn connect(&mut self, wire: Wire) -> bool {
        if self.wires().contains(&wire) {
            return false;
        }
        self.save_to_history();
        self.wires_mut().push(wire);
        true
    }

    /// Removes a wire if present.
    pub fn disconnect(&mut self, wire: &Wire) -> bool {
        if !self.wires().contains(wire) {
            return false;
        }
        self.save_to_history();
        self.wires_mut().retain(|w| w != wire);
        true
    }

    /// Returns `false` if the workflow already has this name.
    pub fn rename(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.name() == name {
            return false;
        }
        self.save_to_history();
        self.update_name(name);
        true
    }

    pub fn describe(&mut self, description: impl Into<String>) -> bool {
        let description = description.into();
        if self.description() == description {
            return false;
        }
        self.save_to_history();
        self.update_description(description);
        true
    }

    /// Sets one configuration value of a block.
    ///
    /// Returns `false` if the block does not exist or already holds `value`.
    pub fn update_block_config(&mut self, block_id: &str, key: &str, value: Value) -> bool {
        let Some(block) = self.document().block(block_id) else {
            return false;
        };
        if block.config.get(key) == Some(&value) {
            return false;
        }

        self.save_to_history();
        if let Some(block) = self.blocks_mut().iter_mut().find(|b| b.block_id == block_id) {
            block.config.insert(key.to_string(), value);
        }
        true
    }
}
