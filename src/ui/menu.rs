//! Menu tree and navigation state machine.
//!
//! ```text
//! MAIN MENU
//! ├── PLAY GAME ── END GAME ── GAME OVER
//! ├── GAME SETTINGS
//! │   ├── DIFFICULTY ── EASY / MEDIUM / HARD
//! │   └── PLAYER MODE ── SINGLE PLAYER / MULTIPLAYER
//! └── HIGHSCORES ── (blank)
//! ```
//!
//! The tree is a static table indexed by [`NodeId`]. Siblings run
//! top-to-bottom, so UP moves to the left sibling and DOWN to the right.

use crate::bus::payload::Difficulty;
use crate::input::joystick::Direction;

/// Every node of the menu tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeId {
    MainMenu,
    PlayGame,
    GameSettings,
    Highscores,
    Difficulty,
    PlayerMode,
    SinglePlayer,
    Multiplayer,
    Easy,
    Medium,
    Hard,
    EndGame,
    GameOver,
    HighscoreList,
}

/// Static description of one node.
#[derive(Debug)]
pub struct MenuNode {
    pub title: &'static str,
    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

const fn node(
    title: &'static str,
    parent: Option<NodeId>,
    child: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> MenuNode {
    MenuNode {
        title,
        parent,
        child,
        left,
        right,
    }
}

use NodeId as N;

/// Indexed by `NodeId as usize`; order must match the enum.
static TREE: [MenuNode; NodeId::ALL.len()] = [
    node("MAIN MENU", None, Some(N::PlayGame), None, None),
    node("PLAY GAME", Some(N::MainMenu), Some(N::EndGame), None, Some(N::GameSettings)),
    node("GAME SETTINGS", Some(N::MainMenu), Some(N::Difficulty), Some(N::PlayGame), Some(N::Highscores)),
    node("HIGHSCORES", Some(N::MainMenu), Some(N::HighscoreList), Some(N::GameSettings), None),
    node("DIFFICULTY", Some(N::GameSettings), Some(N::Easy), None, Some(N::PlayerMode)),
    node("PLAYER MODE", Some(N::GameSettings), Some(N::SinglePlayer), Some(N::Difficulty), None),
    node("SINGLE PLAYER", Some(N::PlayerMode), None, None, Some(N::Multiplayer)),
    node("MULTIPLAYER", Some(N::PlayerMode), None, Some(N::SinglePlayer), None),
    node("EASY", Some(N::Difficulty), None, None, Some(N::Medium)),
    node("MEDIUM", Some(N::Difficulty), None, Some(N::Easy), Some(N::Hard)),
    node("HARD", Some(N::Difficulty), None, Some(N::Medium), None),
    node("END GAME", Some(N::PlayGame), Some(N::GameOver), None, None),
    node("GAME OVER", Some(N::EndGame), None, None, None),
    node(" ", Some(N::Highscores), None, None, None),
];

impl NodeId {
    pub const ALL: [NodeId; 14] = [
        N::MainMenu,
        N::PlayGame,
        N::GameSettings,
        N::Highscores,
        N::Difficulty,
        N::PlayerMode,
        N::SinglePlayer,
        N::Multiplayer,
        N::Easy,
        N::Medium,
        N::Hard,
        N::EndGame,
        N::GameOver,
        N::HighscoreList,
    ];

    pub fn node(self) -> &'static MenuNode {
        &TREE[self as usize]
    }

    pub fn title(self) -> &'static str {
        self.node().title
    }

    pub fn parent(self) -> Option<NodeId> {
        self.node().parent
    }

    pub fn child(self) -> Option<NodeId> {
        self.node().child
    }

    pub fn left(self) -> Option<NodeId> {
        self.node().left
    }

    pub fn right(self) -> Option<NodeId> {
        self.node().right
    }

    /// Difficulty chosen by a difficulty leaf.
    fn difficulty(self) -> Option<Difficulty> {
        match self {
            N::Easy => Some(Difficulty::Easy),
            N::Medium => Some(Difficulty::Medium),
            N::Hard => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Flags the menu owns and the snapshot carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameFlags {
    pub play: bool,
    pub difficulty: Difficulty,
}

/// Side effect of a confirmed selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    GameStarted,
    DifficultySelected(Difficulty),
    /// The player confirmed GAME OVER; the banner should be shown.
    GameEnded,
}

/// Cursor plus game flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Menu {
    cursor: NodeId,
    flags: GameFlags,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Menu {
    /// Start on PLAY GAME, the first entry under the root.
    pub const fn new() -> Self {
        Self {
            cursor: NodeId::PlayGame,
            flags: GameFlags {
                play: false,
                difficulty: Difficulty::Easy,
            },
        }
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn flags(&self) -> GameFlags {
        self.flags
    }

    /// Apply one joystick direction, then the confirm press if any.
    pub fn navigate(&mut self, direction: Direction, confirm: bool) -> Option<MenuAction> {
        match direction {
            Direction::Neutral => {}
            Direction::Up => {
                if let Some(left) = self.cursor.left() {
                    self.cursor = left;
                }
            }
            Direction::Down => {
                if let Some(right) = self.cursor.right() {
                    self.cursor = right;
                }
            }
            Direction::Left => {
                if self.flags.play {
                    return None;
                }
                if let Some(parent) = self.cursor.parent() {
                    if parent != NodeId::MainMenu {
                        self.cursor = parent;
                    }
                }
            }
            Direction::Right => return None,
        }

        if confirm {
            self.confirm()
        } else {
            None
        }
    }

    fn confirm(&mut self) -> Option<MenuAction> {
        match self.cursor {
            N::PlayGame => {
                self.cursor = N::EndGame;
                self.flags.play = true;
                info!("Game started");
                Some(MenuAction::GameStarted)
            }
            N::GameOver => {
                self.return_to_play_game();
                Some(MenuAction::GameEnded)
            }
            leaf @ (N::Easy | N::Medium | N::Hard) => {
                let difficulty = leaf.difficulty()?;
                self.flags.difficulty = difficulty;
                self.cursor = N::GameSettings;
                info!("Difficulty set to {}", difficulty);
                Some(MenuAction::DifficultySelected(difficulty))
            }
            other => {
                if let Some(child) = other.child() {
                    self.cursor = child;
                }
                None
            }
        }
    }

    /// Remote game over: same end state as confirming GAME OVER.
    pub fn force_game_over(&mut self) {
        self.return_to_play_game();
    }

    fn return_to_play_game(&mut self) {
        self.cursor = N::PlayGame;
        self.flags = GameFlags::default();
        info!("Game over, back to PLAY GAME");
    }
}
