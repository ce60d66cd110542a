//! User interface of the interface node - character display + menu.
//!
//! ## Components
//!
//! - **Menu**: static tree and navigation state machine
//! - **Display**: menu / game-over rendering over a text display
//! - **Console**: the node's per-cycle loop body tying inputs, menu,
//!   display and bus together

pub mod console;
pub mod display;
pub mod menu;

pub use console::Console;
pub use display::CharacterDisplay;
pub use menu::{GameFlags, Menu, MenuAction, NodeId};
