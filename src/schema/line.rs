use serde::{Deserialize, Serialize};

/// Prefix marking a command line in script text.
pub const COMMAND_SIGIL: char = '/';

/// A single entry of a dialogue block.
///
/// Spoken lines carry a speaker name (a character or the narrator).
/// Command lines carry the command name without its sigil and a single
/// literal argument; the name is resolved against the command table only
/// when the engine reaches the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Line {
    Spoken { speaker: String, content: String },
    Command { name: String, argument: String },
}

impl Line {
    pub fn spoken(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Spoken {
            speaker: speaker.into(),
            content: content.into(),
        }
    }

    pub fn command(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::Command {
            name: name.into(),
            argument: argument.into(),
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command { .. })
    }

    /// The speaker of a spoken line, or `None` for commands.
    pub fn speaker(&self) -> Option<&str> {
        match self {
            Self::Spoken { speaker, .. } => Some(speaker),
            Self::Command { .. } => None,
        }
    }
}
