/// Inline commands — the tagged `Command` union and its synonym table.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unrecognized command {0:?}")]
    Unknown(String),
    #[error("command '{command}' cannot take argument {argument:?}")]
    InvalidArgument {
        command: &'static str,
        argument: String,
    },
    #[error("alias {alias:?} refers to unknown command {target:?}")]
    UnknownAliasTarget { alias: String, target: String },
}

/// Canonical command identities, independent of spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Wait,
    ChangeBackground,
    PlaySound,
    PlayMusic,
    SetImages,
    FadeIn,
    FadeOut,
    Blackout,
    ClearOut,
    HideHud,
    ShowHud,
}

impl CommandKind {
    pub const ALL: [CommandKind; 11] = [
        Self::Wait,
        Self::ChangeBackground,
        Self::PlaySound,
        Self::PlayMusic,
        Self::SetImages,
        Self::FadeIn,
        Self::FadeOut,
        Self::Blackout,
        Self::ClearOut,
        Self::HideHud,
        Self::ShowHud,
    ];

    /// The spelling used in diagnostics and alias configuration.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::ChangeBackground => "changeBackground",
            Self::PlaySound => "playSound",
            Self::PlayMusic => "playMusic",
            Self::SetImages => "setImages",
            Self::FadeIn => "fadeIn",
            Self::FadeOut => "fadeOut",
            Self::Blackout => "blackout",
            Self::ClearOut => "clearout",
            Self::HideHud => "hideHud",
            Self::ShowHud => "showHud",
        }
    }

    /// Built-in spellings, the canonical one included.
    fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::Wait => &["wait", "w"],
            Self::ChangeBackground => &["changeBackground", "changebackground", "bg"],
            Self::PlaySound => &["playSound", "playsound", "ps"],
            Self::PlayMusic => &["playMusic", "playmusic", "pm"],
            Self::SetImages => &["setImages", "setimages", "img"],
            Self::FadeIn => &["fadeIn", "fadein", "fi"],
            Self::FadeOut => &["fadeOut", "fadeout", "fo"],
            Self::Blackout => &["blackout", "blackOut", "bo"],
            Self::ClearOut => &["clearout", "clearOut", "co"],
            Self::HideHud => &["hideHud", "hidehud", "hh"],
            Self::ShowHud => &["showHud", "showhud", "sh"],
        }
    }

    /// Suspending commands hold the cursor until a timer fires.
    pub fn is_suspending(&self) -> bool {
        matches!(self, Self::Wait)
    }
}

/// A resolved inline command with its typed argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Suspend for this many host time units.
    Wait(u64),
    ChangeBackground(String),
    PlaySound(String),
    /// `None` stops the current track.
    PlayMusic(Option<String>),
    SetImages(String),
    FadeIn,
    FadeOut,
    Blackout,
    ClearOut,
    HideHud,
    ShowHud,
}

impl Command {
    /// Build a command of `kind` from its literal script argument.
    pub fn from_argument(kind: CommandKind, argument: &str) -> Result<Command, CommandError> {
        let command = match kind {
            CommandKind::Wait => {
                let units = argument.trim().parse::<u64>().map_err(|_| {
                    CommandError::InvalidArgument {
                        command: kind.canonical_name(),
                        argument: argument.to_string(),
                    }
                })?;
                Command::Wait(units)
            }
            CommandKind::ChangeBackground => Command::ChangeBackground(argument.to_string()),
            CommandKind::PlaySound => Command::PlaySound(argument.to_string()),
            CommandKind::PlayMusic => {
                if argument.is_empty() {
                    Command::PlayMusic(None)
                } else {
                    Command::PlayMusic(Some(argument.to_string()))
                }
            }
            CommandKind::SetImages => Command::SetImages(argument.to_string()),
            CommandKind::FadeIn => Command::FadeIn,
            CommandKind::FadeOut => Command::FadeOut,
            CommandKind::Blackout => Command::Blackout,
            CommandKind::ClearOut => Command::ClearOut,
            CommandKind::HideHud => Command::HideHud,
            CommandKind::ShowHud => Command::ShowHud,
        };
        Ok(command)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Wait(_) => CommandKind::Wait,
            Self::ChangeBackground(_) => CommandKind::ChangeBackground,
            Self::PlaySound(_) => CommandKind::PlaySound,
            Self::PlayMusic(_) => CommandKind::PlayMusic,
            Self::SetImages(_) => CommandKind::SetImages,
            Self::FadeIn => CommandKind::FadeIn,
            Self::FadeOut => CommandKind::FadeOut,
            Self::Blackout => CommandKind::Blackout,
            Self::ClearOut => CommandKind::ClearOut,
            Self::HideHud => CommandKind::HideHud,
            Self::ShowHud => CommandKind::ShowHud,
        }
    }
}

/// Case-sensitive lookup from script spelling to canonical command.
#[derive(Debug, Clone)]
pub struct CommandTable {
    names: FxHashMap<String, CommandKind>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CommandTable {
    /// The built-in synonym table.
    pub fn standard() -> Self {
        let mut names = FxHashMap::default();
        for kind in CommandKind::ALL {
            for name in kind.synonyms() {
                names.insert(name.to_string(), kind);
            }
        }
        Self { names }
    }

    /// The built-in table extended with `alias -> existing name` entries.
    pub fn with_aliases(aliases: &HashMap<String, String>) -> Result<Self, CommandError> {
        let mut table = Self::standard();
        for (alias, target) in aliases {
            table.add_alias(alias, target)?;
        }
        Ok(table)
    }

    /// Add a spelling for the command currently known as `target`.
    pub fn add_alias(&mut self, alias: &str, target: &str) -> Result<(), CommandError> {
        let kind = self
            .lookup(target)
            .ok_or_else(|| CommandError::UnknownAliasTarget {
                alias: alias.to_string(),
                target: target.to_string(),
            })?;
        self.names.insert(alias.to_string(), kind);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<CommandKind> {
        self.names.get(name).copied()
    }

    /// Resolve a command line's name and argument.
    pub fn resolve(&self, name: &str, argument: &str) -> Result<Command, CommandError> {
        let kind = self
            .lookup(name)
            .ok_or_else(|| CommandError::Unknown(name.to_string()))?;
        Command::from_argument(kind, argument)
    }
}
