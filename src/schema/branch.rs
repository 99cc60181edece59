use serde::{Deserialize, Serialize};

/// Most choices a menu can present; later segments are ignored.
pub const MAX_MENU_OPTIONS: usize = 3;

/// Where a branch sends the cursor.
///
/// Scripts write targets as integers. Any negative integer is the exit
/// sentinel: leave the dialogue session and return to the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpTarget {
    Block(usize),
    ExitToMenu,
}

impl JumpTarget {
    /// Indices past `usize::MAX` saturate, so they still fail the engine's
    /// range check instead of wrapping onto a real block.
    pub fn from_index(index: i64) -> Self {
        if index < 0 {
            Self::ExitToMenu
        } else {
            Self::Block(usize::try_from(index).unwrap_or(usize::MAX))
        }
    }
}

/// A labelled choice in a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub label: String,
    pub target: JumpTarget,
}

/// What happens once a block's lines are exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchSpec {
    /// No choices; the dialogue idles.
    Empty,
    /// Move straight to the target with no menu and no player input.
    DirectJump(JumpTarget),
    /// One to three options, in slot order.
    Menu(Vec<MenuOption>),
}
