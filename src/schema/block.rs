use serde::{Deserialize, Serialize};

use super::line::Line;

/// One segment of dialogue, terminated in the script by a branch line.
///
/// `branch_spec` is kept as raw (cleaned) text and resolved only when the
/// block's lines are exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub lines: Vec<Line>,
    pub branch_spec: String,
}

impl Block {
    pub fn new(lines: Vec<Line>, branch_spec: impl Into<String>) -> Self {
        Self {
            lines,
            branch_spec: branch_spec.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Speaker of the last spoken line, used to pick the menu layout.
    pub fn last_speaker(&self) -> Option<&str> {
        self.lines.iter().rev().find_map(Line::speaker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_speaker_skips_trailing_commands() {
        let block = Block::new(
            vec![
                Line::spoken("Alice", "Hi"),
                Line::spoken("Narrator", "The door creaks."),
                Line::command("playSound", "creak"),
            ],
            "",
        );
        assert_eq!(block.last_speaker(), Some("Narrator"));
        assert_eq!(block.len(), 3);
    }

    #[test]
    fn last_speaker_of_command_only_block() {
        let block = Block::new(vec![Line::command("wait", "1")], "[0]");
        assert_eq!(block.last_speaker(), None);
        assert!(!block.is_empty());
    }
}
