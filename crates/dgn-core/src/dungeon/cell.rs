//! Map cell types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::RoomId;

/// Cell/terrain type
///
/// Declaration order matters: everything from `Door` onward is accessible,
/// and `VWall..=TRWall` are the wall variants wallification chooses from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum CellType {
    #[default]
    Stone = 0,
    VWall = 1,
    HWall = 2,
    TLCorner = 3,
    TRCorner = 4,
    BLCorner = 5,
    BRCorner = 6,
    CrossWall = 7,
    TUWall = 8,  // T-wall up
    TDWall = 9,  // T-wall down
    TLWall = 10, // T-wall left
    TRWall = 11, // T-wall right
    Tree = 12,
    SecretDoor = 13,
    SecretCorridor = 14,
    Pool = 15,
    Moat = 16,
    Lava = 17,
    IronBars = 18,
    Door = 19,
    Corridor = 20,
    Room = 21,
    Stairs = 22,
    Ladder = 23,
    Fountain = 24,
    Throne = 25,
    Sink = 26,
    Grave = 27,
    Altar = 28,
    Ice = 29,
}

impl CellType {
    /// Any wall variant
    pub const fn is_wall(&self) -> bool {
        (*self as u8) >= CellType::VWall as u8 && (*self as u8) <= CellType::TRWall as u8
    }

    /// Walkable terrain (doors and everything ordered after them)
    pub const fn is_accessible(&self) -> bool {
        (*self as u8) >= CellType::Door as u8
    }

    pub const fn is_door(&self) -> bool {
        matches!(self, CellType::Door | CellType::SecretDoor)
    }

    /// Terrain that hides a passage until searched
    pub const fn is_secret(&self) -> bool {
        matches!(self, CellType::SecretDoor | CellType::SecretCorridor)
    }

    pub const fn is_liquid(&self) -> bool {
        matches!(self, CellType::Pool | CellType::Moat | CellType::Lava)
    }

    /// Floor-like terrain a room feature may be placed on
    pub const fn is_room_floor(&self) -> bool {
        matches!(self, CellType::Room | CellType::Ice)
    }

    /// ASCII glyph for map dumps
    pub const fn symbol(&self) -> char {
        match self {
            CellType::Stone => ' ',
            CellType::VWall => '|',
            CellType::HWall => '-',
            CellType::TLCorner
            | CellType::TRCorner
            | CellType::BLCorner
            | CellType::BRCorner
            | CellType::CrossWall
            | CellType::TUWall
            | CellType::TDWall => '-',
            CellType::TLWall | CellType::TRWall => '|',
            CellType::Tree => '#',
            CellType::SecretDoor => '+',
            CellType::SecretCorridor => ' ',
            CellType::Pool | CellType::Moat => '}',
            CellType::Lava => '}',
            CellType::IronBars => '#',
            CellType::Door => '+',
            CellType::Corridor => '#',
            CellType::Room => '.',
            CellType::Stairs => '>',
            CellType::Ladder => '>',
            CellType::Fountain => '{',
            CellType::Throne => '\\',
            CellType::Sink => '#',
            CellType::Grave => '|',
            CellType::Altar => '_',
            CellType::Ice => '.',
        }
    }
}

bitflags! {
    /// Door state flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DoorState: u8 {
        const NO_DOOR = 0x00;
        const BROKEN = 0x01;
        const OPEN = 0x02;
        const CLOSED = 0x04;
        const LOCKED = 0x08;
        const TRAPPED = 0x10;
    }
}

impl Serialize for DoorState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DoorState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(DoorState::from_bits_truncate(bits))
    }
}

bitflags! {
    /// Structural bits carried by a cell
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        /// Written by a map fragment or terrain override
        const TOUCHED = 0x01;
        /// Wall runs horizontally (doors placed here open sideways)
        const HORIZONTAL = 0x02;
        /// On the boundary of a room
        const EDGE = 0x04;
    }
}

impl Serialize for CellFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(CellFlags::from_bits_truncate(bits))
    }
}

/// Altar alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Alignment {
    Lawful,
    Neutral,
    Chaotic,
    Unaligned,
}

/// Index into the level's trap list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrapId(pub u32);

/// Extra payload attached to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Feature {
    #[default]
    None,
    Door(DoorState),
    Altar(Alignment),
    Trap(TrapId),
}

/// A single map cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub typ: CellType,
    pub lit: bool,
    /// Room whose interior this cell belongs to
    pub room: Option<RoomId>,
    pub flags: CellFlags,
    pub feature: Feature,
}

impl Cell {
    pub const fn stone() -> Self {
        Self {
            typ: CellType::Stone,
            lit: false,
            room: None,
            flags: CellFlags::empty(),
            feature: Feature::None,
        }
    }

    pub fn door_state(&self) -> DoorState {
        match self.feature {
            Feature::Door(state) => state,
            _ => DoorState::NO_DOOR,
        }
    }

    pub fn set_door_state(&mut self, state: DoorState) {
        self.feature = Feature::Door(state);
    }

    pub fn is_edge(&self) -> bool {
        self.flags.contains(CellFlags::EDGE)
    }

    /// Glyph for map dumps, showing door states the way the map would
    pub fn symbol(&self) -> char {
        match self.typ {
            CellType::Door => {
                let state = self.door_state();
                if state.contains(DoorState::OPEN) {
                    if self.flags.contains(CellFlags::HORIZONTAL) { '|' } else { '-' }
                } else if state.intersects(DoorState::CLOSED | DoorState::LOCKED) {
                    '+'
                } else {
                    '.'
                }
            }
            CellType::SecretDoor => {
                if self.flags.contains(CellFlags::HORIZONTAL) { '-' } else { '|' }
            }
            typ => typ.symbol(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_wall_range() {
        let walls: Vec<_> = CellType::iter().filter(|t| t.is_wall()).collect();
        assert_eq!(walls.len(), 11);
        assert!(walls.iter().all(|t| !t.is_accessible()));
    }

    #[test]
    fn test_accessible_from_door_on() {
        assert!(CellType::Door.is_accessible());
        assert!(CellType::Ice.is_accessible());
        assert!(CellType::Fountain.is_accessible());
        assert!(!CellType::SecretDoor.is_accessible());
        assert!(!CellType::SecretCorridor.is_accessible());
        assert!(!CellType::Tree.is_accessible());
        assert!(!CellType::Stone.is_accessible());
    }

    #[test]
    fn test_door_symbols() {
        let mut cell = Cell::stone();
        cell.typ = CellType::Door;
        cell.set_door_state(DoorState::LOCKED);
        assert_eq!(cell.symbol(), '+');
        cell.set_door_state(DoorState::NO_DOOR);
        assert_eq!(cell.symbol(), '.');
        cell.set_door_state(DoorState::OPEN);
        cell.flags |= CellFlags::HORIZONTAL;
        assert_eq!(cell.symbol(), '|');
    }

    #[test]
    fn test_door_state_serde() {
        let state = DoorState::LOCKED | DoorState::TRAPPED;
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "24");
        let back: DoorState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
