//! Generation context
//!
//! Everything one generation run mutates lives here and is passed by `&mut`
//! through every stage. Nothing is global, so independent runs only share
//! state if the caller hands them the same [`RandomStream`].

use strum::Display;

use super::cell::{CellFlags, CellType, Feature, TrapId};
use super::grid::Grid;
use super::level::{Engraving, EngravingKind, Level, LevelFlags, LevelParts, Stairway, LevelTimer, Trap, TrapKind};
use super::rect::RectPool;
use super::room::{Room, RoomArena, RoomId};
use crate::consts::DOORMAX;
use crate::options::GenOptions;
use crate::postprocess::PostprocessQueue;
use crate::rng::RandomStream;
use crate::services::{Monster, MonsterSpec, Object, ObjectRequest, Services};

/// Room builder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BuildState {
    Idle,
    AttemptingPlacement,
    Committed,
    Rejected,
    /// Terminal: no more rooms will be placed
    Converged,
}

pub struct GenerationContext<'a> {
    pub rng: &'a mut RandomStream,
    pub options: &'a GenOptions,
    pub services: Services<'a>,
    pub depth: i32,
    pub grid: Grid,
    pub pool: RectPool,
    pub rooms: RoomArena,
    /// Connectivity class per top-level room
    pub smeq: Vec<usize>,
    pub doors: Vec<(i32, i32)>,
    pub stairs: Vec<Stairway>,
    pub traps: Vec<Trap>,
    pub objects: Vec<Object>,
    pub monsters: Vec<Monster>,
    pub engravings: Vec<Engraving>,
    pub timers: Vec<LevelTimer>,
    pub flags: LevelFlags,
    pub postprocess: PostprocessQueue,
    /// Set while a theme generator runs; placement collisions fail outright
    pub in_themerooms: bool,
    /// Set by a theme generator that could not place its room
    pub themeroom_failed: bool,
    /// Reserved top-left floor cell of the pending vault
    pub vault_pos: Option<(i32, i32)>,
    state: BuildState,
}

impl core::fmt::Debug for GenerationContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GenerationContext")
            .field("depth", &self.depth)
            .field("rooms", &self.rooms.len())
            .field("state", &self.state)
            .field("rng_steps", &self.rng.call_count())
            .finish_non_exhaustive()
    }
}

impl<'a> GenerationContext<'a> {
    pub fn new(rng: &'a mut RandomStream, depth: i32, options: &'a GenOptions, services: Services<'a>) -> Self {
        Self {
            rng,
            options,
            services,
            depth,
            grid: Grid::new(options.width, options.height),
            pool: RectPool::new(options.width, options.height),
            rooms: RoomArena::new(),
            smeq: Vec::new(),
            doors: Vec::new(),
            stairs: Vec::new(),
            traps: Vec::new(),
            objects: Vec::new(),
            monsters: Vec::new(),
            engravings: Vec::new(),
            timers: Vec::new(),
            flags: LevelFlags::default(),
            postprocess: PostprocessQueue::default(),
            in_themerooms: false,
            themeroom_failed: false,
            vault_pos: None,
            state: BuildState::Idle,
        }
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    /// Difficulty used for monster and object generation
    pub fn difficulty(&self) -> i32 {
        self.depth.max(1)
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn transition(&mut self, next: BuildState) {
        tracing::trace!(from = %self.state, to = %next, rooms = self.rooms.len(), "builder state");
        self.state = next;
    }

    /// Number of top-level rooms placed so far
    pub fn nroom(&self) -> usize {
        self.rooms.top_level_count()
    }

    /// The `i`th top-level room in level order
    pub fn top_room(&self, i: usize) -> Option<RoomId> {
        self.rooms.top_level().get(i).copied()
    }

    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id]
    }

    pub fn doors_full(&self) -> bool {
        self.doors.len() >= DOORMAX
    }

    pub fn make_object(&mut self, request: ObjectRequest) -> usize {
        let obj = self.services.objects.create_object(self.rng, &request);
        self.objects.push(obj);
        self.objects.len() - 1
    }

    /// Gold pile; `amount == 0` rolls a depth-scaled amount.
    pub fn make_gold(&mut self, amount: u32, x: i32, y: i32) -> usize {
        let amount = if amount == 0 {
            let mul = self.rng.rnd((30 / (12 - self.depth).max(2)) as u32);
            1 + self.rng.rnd(self.difficulty() as u32 + 2) * mul
        } else {
            amount
        };
        self.make_object(ObjectRequest::gold(amount, x, y))
    }

    /// Create a monster, shifting it to a nearby free cell when its spot is
    /// taken. Returns `None` when nothing was created.
    pub fn make_monster(&mut self, spec: MonsterSpec) -> Option<usize> {
        let mut monster = self.services.monsters.create_monster(self.rng, &spec)?;
        if self.monster_at(monster.x, monster.y) {
            let (x, y) = self.services.monsters.find_nearby_free_cell(
                &self.grid,
                &self.monsters,
                monster.x,
                monster.y,
                2,
            )?;
            monster.x = x;
            monster.y = y;
        }
        self.monsters.push(monster);
        Some(self.monsters.len() - 1)
    }

    pub fn monster_at(&self, x: i32, y: i32) -> bool {
        self.monsters.iter().any(|m| m.x == x && m.y == y)
    }

    pub fn object_at(&self, x: i32, y: i32) -> bool {
        self.objects.iter().any(|o| o.x == x && o.y == y && !o.buried)
    }

    pub fn trap_at(&self, x: i32, y: i32) -> Option<TrapId> {
        self.traps
            .iter()
            .position(|t| t.x == x && t.y == y)
            .map(|i| TrapId(i as u32))
    }

    /// Place a trap; an existing trap at the spot is kept and returned.
    pub fn make_trap(&mut self, kind: TrapKind, x: i32, y: i32) -> Option<TrapId> {
        if !self.grid.in_bounds(x, y) {
            return None;
        }
        if let Some(id) = self.trap_at(x, y) {
            return Some(id);
        }
        let id = TrapId(self.traps.len() as u32);
        self.traps.push(Trap::new(kind, x, y));
        self.grid[(x, y)].feature = Feature::Trap(id);
        Some(id)
    }

    pub fn engrave(&mut self, x: i32, y: i32, text: impl Into<String>, kind: EngravingKind) {
        self.engravings.retain(|e| e.x != x || e.y != y);
        self.engravings.push(Engraving {
            x,
            y,
            text: text.into(),
            kind,
        });
    }

    /// Trap, furniture, or liquid already at the spot
    pub fn occupied(&self, x: i32, y: i32) -> bool {
        let typ = self.grid.typ(x, y);
        self.trap_at(x, y).is_some()
            || matches!(
                typ,
                CellType::Fountain
                    | CellType::Sink
                    | CellType::Altar
                    | CellType::Grave
                    | CellType::Throne
                    | CellType::Stairs
                    | CellType::Ladder
            )
            || typ.is_liquid()
    }

    /// A door (real or secret) orthogonally next to the spot
    pub fn bydoor(&self, x: i32, y: i32) -> bool {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .iter()
            .any(|(dx, dy)| self.grid.typ(x + dx, y + dy).is_door())
    }

    /// A door in any of the eight neighbours
    pub fn nexttodoor(&self, x: i32, y: i32) -> bool {
        (-1..=1).any(|dx| (-1..=1).any(|dy| (dx, dy) != (0, 0) && self.grid.typ(x + dx, y + dy).is_door()))
    }

    /// Plain straight wall with no door beside it
    pub fn okdoor(&self, x: i32, y: i32) -> bool {
        matches!(self.grid.typ(x, y), CellType::HWall | CellType::VWall)
            && !self.doors_full()
            && !self.bydoor(x, y)
    }

    /// Record a door on the level and on its room
    pub fn add_door(&mut self, x: i32, y: i32, room: RoomId) {
        self.doors.push((x, y));
        if let Some(r) = self.rooms.get_mut(room) {
            r.doors.push((x, y));
        }
    }

    /// Random floor position in a room, avoiding subrooms and walls.
    pub fn somexy(&mut self, id: RoomId) -> Option<(i32, i32)> {
        let room = self.rooms[id].clone();
        if room.irregular {
            for _ in 0..100 {
                let (x, y) = (room.somex(self.rng), room.somey(self.rng));
                let cell = &self.grid[(x, y)];
                if !cell.is_edge() && cell.room == Some(id) {
                    return Some((x, y));
                }
            }
            return (room.lx..=room.hx)
                .flat_map(|x| (room.ly..=room.hy).map(move |y| (x, y)))
                .find(|&(x, y)| {
                    let cell = &self.grid[(x, y)];
                    !cell.is_edge() && cell.room == Some(id)
                });
        }
        if room.subrooms.is_empty() {
            return Some((room.somex(self.rng), room.somey(self.rng)));
        }
        for _ in 0..100 {
            let (x, y) = (room.somex(self.rng), room.somey(self.rng));
            if self.grid.typ(x, y).is_wall() {
                continue;
            }
            if room
                .subrooms
                .iter()
                .any(|s| self.rooms[*s].contains_with_walls(x, y))
            {
                continue;
            }
            return Some((x, y));
        }
        None
    }

    /// Floor spot suitable for furniture: room floor, free, not beside a door.
    pub fn find_okay_roompos(&mut self, id: RoomId) -> Option<(i32, i32)> {
        for _ in 0..200 {
            let (x, y) = self.somexy(id)?;
            if self.grid.typ(x, y) == CellType::Room && !self.occupied(x, y) && !self.bydoor(x, y) {
                return Some((x, y));
            }
        }
        None
    }

    /// Mark a room's cells with its id and its boundary as edge.
    /// Boundary cells already claimed by another room keep that claim.
    pub fn topologize(&mut self, id: RoomId) {
        let room = &self.rooms[id];
        if room.irregular {
            return;
        }
        let (lx, ly, hx, hy) = (room.lx, room.ly, room.hx, room.hy);
        let subrooms = room.subrooms.clone();
        for x in lx - 1..=hx + 1 {
            for y in ly - 1..=hy + 1 {
                let Some(cell) = self.grid.get_mut(x, y) else { continue };
                let boundary = x == lx - 1 || x == hx + 1 || y == ly - 1 || y == hy + 1;
                if boundary {
                    cell.flags |= CellFlags::EDGE;
                    if cell.room.is_none() {
                        cell.room = Some(id);
                    }
                } else {
                    cell.room = Some(id);
                }
            }
        }
        for sub in subrooms {
            self.topologize(sub);
        }
    }

    /// Rewrite every stored room id after the arena was reordered.
    pub fn remap_rooms(&mut self, remap: &[RoomId]) {
        for (x, y) in self.grid.positions() {
            let cell = &mut self.grid[(x, y)];
            if let Some(old) = cell.room {
                cell.room = remap.get(old.index()).copied();
            }
        }
    }

    pub(crate) fn into_level(self) -> Level {
        Level::from_parts(LevelParts {
            depth: self.depth,
            grid: self.grid,
            rooms: self.rooms,
            doors: self.doors,
            stairs: self.stairs,
            traps: self.traps,
            objects: self.objects,
            monsters: self.monsters,
            engravings: self.engravings,
            timers: self.timers,
            flags: self.flags,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::services::{BasicMonsters, BasicObjects};

    /// Run `f` against a fresh context on the default 80x21 grid.
    pub fn with_context<R>(seed: u64, depth: i32, f: impl FnOnce(&mut GenerationContext<'_>) -> R) -> R {
        let mut rng = RandomStream::new(seed);
        let options = GenOptions::default();
        let mut objects = BasicObjects;
        let mut monsters = BasicMonsters;
        let services = Services {
            objects: &mut objects,
            monsters: &mut monsters,
        };
        let mut ctx = GenerationContext::new(&mut rng, depth, &options, services);
        f(&mut ctx)
    }

    /// Stamp a walled rectangular room directly, bypassing placement.
    pub fn stamp_room(ctx: &mut GenerationContext<'_>, lx: i32, ly: i32, hx: i32, hy: i32) -> RoomId {
        ctx.add_room(lx, ly, hx, hy, true, super::super::room::RoomKind::Ordinary, false)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_topologize_marks_edges() {
        with_context(1, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 14, 8);
            assert_eq!(ctx.grid[(12, 6)].room, Some(id));
            assert!(!ctx.grid[(12, 6)].is_edge());
            assert!(ctx.grid[(9, 4)].is_edge());
            assert_eq!(ctx.grid[(15, 9)].room, Some(id));
            assert_eq!(ctx.grid[(16, 9)].room, None);
        });
    }

    #[test]
    fn test_okdoor_and_bydoor() {
        with_context(1, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 14, 8);
            assert!(ctx.okdoor(12, 4));
            assert!(!ctx.okdoor(9, 4), "corners are not plain walls");
            assert!(!ctx.okdoor(12, 6), "floor is not a wall");
            ctx.grid.set_typ(12, 4, CellType::Door);
            ctx.add_door(12, 4, id);
            assert!(ctx.bydoor(13, 4));
            assert!(!ctx.okdoor(13, 4));
            assert!(ctx.nexttodoor(13, 5));
            assert_eq!(ctx.room(id).door_count(), 1);
        });
    }

    #[test]
    fn test_somexy_avoids_subrooms() {
        with_context(4, 1, |ctx| {
            let parent = stamp_room(ctx, 10, 3, 25, 12);
            let sub = ctx.add_subroom(parent, 11, 4, 18, 10, true, super::super::room::RoomKind::Ordinary);
            for _ in 0..50 {
                let (x, y) = ctx.somexy(parent).unwrap();
                assert!(ctx.room(parent).contains(x, y));
                assert!(!ctx.room(sub).contains_with_walls(x, y));
            }
        });
    }

    #[test]
    fn test_make_trap_keeps_existing() {
        with_context(1, 1, |ctx| {
            let a = ctx.make_trap(TrapKind::Arrow, 5, 5);
            let b = ctx.make_trap(TrapKind::Web, 5, 5);
            assert_eq!(a, b);
            assert_eq!(ctx.traps.len(), 1);
            assert!(ctx.occupied(5, 5));
        });
    }

    #[test]
    fn test_make_monster_moves_off_occupied_spot() {
        with_context(1, 1, |ctx| {
            stamp_room(ctx, 10, 5, 14, 8);
            ctx.make_monster(MonsterSpec::named("newt", 12, 6, 1)).unwrap();
            ctx.make_monster(MonsterSpec::named("jackal", 12, 6, 1)).unwrap();
            assert_eq!(ctx.monsters.len(), 2);
            assert_ne!((ctx.monsters[1].x, ctx.monsters[1].y), (12, 6));
        });
    }
}
