//! The finished level

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::cell::Cell;
use super::grid::Grid;
use super::room::{Room, RoomArena, RoomId};
use crate::services::{Monster, Object};

/// Trap kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[repr(u8)]
pub enum TrapKind {
    Arrow = 1,
    Dart = 2,
    FallingRock = 3,
    SqueakyBoard = 4,
    BearTrap = 5,
    LandMine = 6,
    RollingBoulder = 7,
    SleepingGas = 8,
    Rust = 9,
    Fire = 10,
    Pit = 11,
    SpikedPit = 12,
    Hole = 13,
    TrapDoor = 14,
    Teleport = 15,
    LevelTeleport = 16,
    MagicPortal = 17,
    Web = 18,
    Statue = 19,
    Magic = 20,
    AntiMagic = 21,
    Polymorph = 22,
    VibratingSquare = 23,
}

impl TrapKind {
    /// Highest trap number; random picks roll `rnd(COUNT)`
    pub const COUNT: u32 = 23;

    pub fn from_index(i: u32) -> Option<Self> {
        use strum::IntoEnumIterator;
        TrapKind::iter().find(|k| *k as u32 == i)
    }

    pub const fn is_hole(self) -> bool {
        matches!(self, TrapKind::Hole | TrapKind::TrapDoor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub kind: TrapKind,
    pub x: i32,
    pub y: i32,
    pub seen: bool,
    /// Disappears after one use
    pub once: bool,
}

impl Trap {
    pub fn new(kind: TrapKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            seen: false,
            once: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairway {
    pub x: i32,
    pub y: i32,
    pub up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EngravingKind {
    #[default]
    Dust,
    Engrave,
    Burn,
    Mark,
    Headstone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engraving {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub kind: EngravingKind,
}

/// What a level timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TimerAction {
    /// Ice at the spot melts into water
    MeltIce,
    /// A buried corpse at the spot rises as a zombie
    Zombify,
}

/// A timer scheduled at generation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTimer {
    pub x: i32,
    pub y: i32,
    /// Turn on which the timer fires
    pub turn: u32,
    pub action: TimerAction,
}

/// Summary flags for the finished level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelFlags {
    pub fountain_count: u32,
    pub sink_count: u32,
    pub has_shop: bool,
    pub has_vault: bool,
    pub has_court: bool,
    pub has_zoo: bool,
    pub has_morgue: bool,
    pub has_beehive: bool,
    pub has_barracks: bool,
    pub has_temple: bool,
    pub has_swamp: bool,
    pub graveyard: bool,
}

/// A generated level. Built once by the generator, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    depth: i32,
    grid: Grid,
    rooms: RoomArena,
    doors: Vec<(i32, i32)>,
    stairs: Vec<Stairway>,
    traps: Vec<Trap>,
    objects: Vec<Object>,
    monsters: Vec<Monster>,
    engravings: Vec<Engraving>,
    timers: Vec<LevelTimer>,
    flags: LevelFlags,
}

/// Parts a finished generation run hands over
#[derive(Debug)]
pub(crate) struct LevelParts {
    pub depth: i32,
    pub grid: Grid,
    pub rooms: RoomArena,
    pub doors: Vec<(i32, i32)>,
    pub stairs: Vec<Stairway>,
    pub traps: Vec<Trap>,
    pub objects: Vec<Object>,
    pub monsters: Vec<Monster>,
    pub engravings: Vec<Engraving>,
    pub timers: Vec<LevelTimer>,
    pub flags: LevelFlags,
}

impl Level {
    pub(crate) fn from_parts(parts: LevelParts) -> Self {
        Self {
            depth: parts.depth,
            grid: parts.grid,
            rooms: parts.rooms,
            doors: parts.doors,
            stairs: parts.stairs,
            traps: parts.traps,
            objects: parts.objects,
            monsters: parts.monsters,
            engravings: parts.engravings,
            timers: parts.timers,
            flags: parts.flags,
        }
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.grid.get(x, y)
    }

    pub fn rooms(&self) -> &RoomArena {
        &self.rooms
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Top-level rooms in level order
    pub fn top_level_rooms(&self) -> impl Iterator<Item = (RoomId, &Room)> {
        self.rooms.iter().filter(|(_, r)| r.parent.is_none())
    }

    pub fn doors(&self) -> &[(i32, i32)] {
        &self.doors
    }

    pub fn stairs(&self) -> &[Stairway] {
        &self.stairs
    }

    pub fn upstairs(&self) -> Option<(i32, i32)> {
        self.stairs.iter().find(|s| s.up).map(|s| (s.x, s.y))
    }

    pub fn downstairs(&self) -> Option<(i32, i32)> {
        self.stairs.iter().find(|s| !s.up).map(|s| (s.x, s.y))
    }

    pub fn traps(&self) -> &[Trap] {
        &self.traps
    }

    pub fn trap_at(&self, x: i32, y: i32) -> Option<&Trap> {
        self.traps.iter().find(|t| t.x == x && t.y == y)
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn objects_at(&self, x: i32, y: i32) -> impl Iterator<Item = &Object> {
        self.objects.iter().filter(move |o| o.x == x && o.y == y)
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn engravings(&self) -> &[Engraving] {
        &self.engravings
    }

    pub fn timers(&self) -> &[LevelTimer] {
        &self.timers
    }

    pub fn flags(&self) -> &LevelFlags {
        &self.flags
    }

    /// ASCII map: terrain, then visible objects, stairs and monsters on top
    pub fn render(&self) -> String {
        let w = self.width() as usize;
        let mut rows: Vec<Vec<char>> = self
            .grid
            .render()
            .lines()
            .map(|l| l.chars().collect())
            .collect();
        let mut put = |x: i32, y: i32, ch: char| {
            if let Some(cell) = rows.get_mut(y as usize).and_then(|r| r.get_mut(x as usize)) {
                *cell = ch;
            }
        };
        for o in self.objects.iter().filter(|o| !o.buried) {
            let ch = match o.name.as_str() {
                "boulder" => '0',
                "gold piece" => '$',
                "statue" => '\'',
                _ => '*',
            };
            put(o.x, o.y, ch);
        }
        for s in &self.stairs {
            put(s.x, s.y, if s.up { '<' } else { '>' });
        }
        for m in &self.monsters {
            put(m.x, m.y, m.symbol);
        }
        let mut out = String::with_capacity((w + 1) * rows.len());
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_level() -> Level {
        Level::from_parts(LevelParts {
            depth: 3,
            grid: Grid::new(20, 10),
            rooms: RoomArena::new(),
            doors: Vec::new(),
            stairs: vec![
                Stairway { x: 2, y: 2, up: true },
                Stairway { x: 5, y: 5, up: false },
            ],
            traps: Vec::new(),
            objects: Vec::new(),
            monsters: Vec::new(),
            engravings: Vec::new(),
            timers: Vec::new(),
            flags: LevelFlags::default(),
        })
    }

    #[test]
    fn test_trap_kind_index() {
        assert_eq!(TrapKind::from_index(1), Some(TrapKind::Arrow));
        assert_eq!(TrapKind::from_index(23), Some(TrapKind::VibratingSquare));
        assert_eq!(TrapKind::from_index(0), None);
        assert!(TrapKind::TrapDoor.is_hole());
    }

    #[test]
    fn test_stairs_lookup_and_render() {
        let level = empty_level();
        assert_eq!(level.upstairs(), Some((2, 2)));
        assert_eq!(level.downstairs(), Some((5, 5)));
        let map = level.render();
        let lines: Vec<&str> = map.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[2].chars().nth(2), Some('<'));
        assert_eq!(lines[5].chars().nth(5), Some('>'));
    }

    #[test]
    fn test_json_snapshot_roundtrips() {
        let level = empty_level();
        let json = level.to_json().unwrap();
        let back: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(back, level);
    }
}
