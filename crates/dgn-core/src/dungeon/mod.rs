//! Level structure and the room-and-corridor builder
//!
//! Cells, rooms and the free-space pool, plus the generation stages that
//! operate on a [`GenerationContext`].

mod cell;
mod context;
mod corridor;
mod create;
mod engrave;
mod fill;
mod generation;
mod grid;
mod level;
mod niche;
mod rect;
mod room;
mod special_rooms;
mod wallify;

pub use cell::{Alignment, Cell, CellFlags, CellType, DoorState, Feature, TrapId};
pub use context::{BuildState, GenerationContext};
pub use create::{Placement, RoomRequest, ALIGN_CENTER, ALIGN_LEFT, ALIGN_RIGHT};
pub use engrave::{random_engraving, random_epitaph, wipe_engraving, EPITAPHS, RANDOM_ENGRAVINGS};
pub use grid::Grid;
pub use level::{Engraving, EngravingKind, Level, LevelFlags, LevelTimer, Stairway, TimerAction, Trap, TrapKind};
pub use rect::{Rect, RectPool};
pub use room::{Lighting, Room, RoomArena, RoomId, RoomKind, ShopKind};
pub use wallify::{wallify, wallify_region};

#[cfg(test)]
pub(crate) use context::test_support;
