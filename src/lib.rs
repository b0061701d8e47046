//! Contextual popup menus bound to observable properties.
//!
//! All menu work runs on a single-threaded UI queue: trigger gestures,
//! selections and property changes only schedule tasks, and the queue owner
//! drains them.

pub mod attach;
pub mod config;
pub mod gesture;
pub mod menu;
pub mod present;
pub mod preview;
pub mod property;
pub mod queue;

pub use attach::{ContextMenus, OwnerId};
pub use menu::{ContextMenu, ItemPath, MenuItem, MenuSpec};
pub use property::{BooleanProperty, ChoiceProperty, EnumProperty, ObservableProperty};
pub use queue::{Scheduler, UiQueue};
