use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::block::Block;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),
}

/// A parsed script: an ordered list of blocks addressed by index.
///
/// Block 0 is the entry point. A program is immutable once built and may
/// be shared between any number of engines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    pub blocks: Vec<Block>,
}

impl Program {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of lines across all blocks.
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(Block::len).sum()
    }

    /// Save the program as pretty-printed RON.
    pub fn save_to_ron(&self, path: &Path) -> Result<(), ProgramError> {
        let serialized = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a program previously written by [`Program::save_to_ron`].
    pub fn load_from_ron(path: &Path) -> Result<Program, ProgramError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Program, ProgramError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::line::Line;

    fn sample() -> Program {
        Program::new(vec![
            Block::new(
                vec![Line::spoken("Alice", "Hi"), Line::command("wait", "2")],
                "Stay[0];Leave[-1]",
            ),
            Block::new(vec![Line::spoken("Narrator", "Silence.")], ""),
        ])
    }

    #[test]
    fn block_lookup() {
        let program = sample();
        assert_eq!(program.len(), 2);
        assert!(program.block(1).is_some());
        assert!(program.block(2).is_none());
        assert_eq!(program.line_count(), 3);
    }

    #[test]
    fn ron_round_trip() {
        let program = sample();
        let serialized = ron::to_string(&program).unwrap();
        let restored = Program::parse_ron(&serialized).unwrap();
        assert_eq!(restored, program);
    }

    #[test]
    fn parse_ron_rejects_garbage() {
        assert!(Program::parse_ron("not ron at all (").is_err());
    }
}
