//! Rooms and the room arena
//!
//! All rooms of a level, top-level and subrooms alike, live in one
//! [`RoomArena`] and refer to each other by [`RoomId`]. Top-level rooms come
//! first in arena order once the level is sorted; corridor joining and stair
//! placement index them by that order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::rect::Rect;
use crate::rng::RandomStream;

/// Index of a room in its level's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub u32);

impl RoomId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shop specialties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum ShopKind {
    General,
    Armor,
    Scroll,
    Potion,
    Weapon,
    Food,
    Ring,
    Wand,
    Tool,
    Book,
    HealthFood,
    Candle,
}

impl ShopKind {
    /// Selection weight out of 100 for randomly stocked shops
    pub const fn probability(self) -> u32 {
        match self {
            ShopKind::General => 42,
            ShopKind::Armor => 14,
            ShopKind::Scroll => 10,
            ShopKind::Potion => 10,
            ShopKind::Weapon => 5,
            ShopKind::Food => 5,
            ShopKind::Ring => 3,
            ShopKind::Wand => 3,
            ShopKind::Tool => 3,
            ShopKind::Book => 3,
            ShopKind::HealthFood => 2,
            ShopKind::Candle => 0,
        }
    }
}

/// Room kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum RoomKind {
    #[default]
    Ordinary,
    /// Shaped or filled by a theme generator
    Themed,
    Vault,
    Court,
    Swamp,
    Beehive,
    Morgue,
    Barracks,
    Zoo,
    Delphi,
    Temple,
    LeprechaunHall,
    CockatriceNest,
    Anthole,
    Shop(ShopKind),
}

impl RoomKind {
    pub fn is_shop(self) -> bool {
        matches!(self, RoomKind::Shop(_))
    }

    /// Kinds whose contents are placed by the ordinary fill pass
    pub fn takes_ordinary_fill(self) -> bool {
        matches!(self, RoomKind::Ordinary | RoomKind::Themed)
    }

    /// Special kinds whose occupants are generated asleep
    pub fn monsters_sleep(self) -> bool {
        matches!(
            self,
            RoomKind::Court
                | RoomKind::Beehive
                | RoomKind::Morgue
                | RoomKind::Barracks
                | RoomKind::Zoo
                | RoomKind::LeprechaunHall
                | RoomKind::CockatriceNest
                | RoomKind::Anthole
        )
    }
}

/// Lighting request for a new room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lighting {
    Random,
    Lit,
    Unlit,
}

impl Lighting {
    /// Resolve random lighting: deeper levels are darker.
    pub fn resolve(self, rng: &mut RandomStream, depth: i32) -> bool {
        match self {
            Lighting::Lit => true,
            Lighting::Unlit => false,
            Lighting::Random => rng.rnd((1 + depth.max(0)) as u32) < 11 && rng.rn2(77) != 0,
        }
    }
}

/// A placed room. Bounds are the floor area; walls sit one cell outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub lx: i32,
    pub ly: i32,
    pub hx: i32,
    pub hy: i32,
    pub kind: RoomKind,
    pub lit: bool,
    /// Contents still to be generated
    pub needs_fill: bool,
    /// Participates in corridor joining
    pub needs_joining: bool,
    /// Floor is not the full bounding box
    pub irregular: bool,
    /// Door positions, in the order they were made
    pub doors: Vec<(i32, i32)>,
    pub parent: Option<RoomId>,
    pub subrooms: Vec<RoomId>,
}

impl Room {
    pub fn new(lx: i32, ly: i32, hx: i32, hy: i32, kind: RoomKind, lit: bool) -> Self {
        Self {
            lx,
            ly,
            hx,
            hy,
            kind,
            lit,
            needs_fill: true,
            needs_joining: true,
            irregular: false,
            doors: Vec::new(),
            parent: None,
            subrooms: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.hx - self.lx + 1
    }

    pub fn height(&self) -> i32 {
        self.hy - self.ly + 1
    }

    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.lx, self.ly, self.hx, self.hy)
    }

    /// Bounds including the surrounding walls
    pub fn outer_bounds(&self) -> Rect {
        Rect::new(self.lx - 1, self.ly - 1, self.hx + 1, self.hy + 1)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.lx && x <= self.hx && y >= self.ly && y <= self.hy
    }

    /// Contains the point, walls included
    pub fn contains_with_walls(&self, x: i32, y: i32) -> bool {
        self.outer_bounds().contains_point(x, y)
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.lx + self.hx) / 2, (self.ly + self.hy) / 2)
    }

    pub fn door_count(&self) -> usize {
        self.doors.len()
    }

    pub fn is_subroom(&self) -> bool {
        self.parent.is_some()
    }

    /// Random x inside the floor area; one draw
    pub fn somex(&self, rng: &mut RandomStream) -> i32 {
        rng.rn1((self.hx - self.lx + 1) as u32, self.lx)
    }

    /// Random y inside the floor area; one draw
    pub fn somey(&self, rng: &mut RandomStream) -> i32 {
        rng.rn1((self.hy - self.ly + 1) as u32, self.ly)
    }
}

/// Every room of one level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomArena {
    rooms: Vec<Room>,
}

impl RoomArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn push(&mut self, room: Room) -> RoomId {
        let id = RoomId(self.rooms.len() as u32);
        self.rooms.push(room);
        id
    }

    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub fn get_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id.index())
    }

    /// Add `child` as a subroom of `parent`
    pub fn push_subroom(&mut self, parent: RoomId, mut child: Room) -> RoomId {
        child.parent = Some(parent);
        let id = self.push(child);
        if let Some(p) = self.get_mut(parent) {
            p.subrooms.push(id);
        }
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (RoomId, &Room)> {
        self.rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (RoomId(i as u32), r))
    }

    /// Top-level rooms in arena order
    pub fn top_level(&self) -> Vec<RoomId> {
        self.iter()
            .filter(|(_, r)| r.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of top-level rooms
    pub fn top_level_count(&self) -> usize {
        self.rooms.iter().filter(|r| r.parent.is_none()).count()
    }

    /// Reorder so top-level rooms come first, sorted by left edge, followed
    /// by subrooms in creation order. Returns the old-to-new id map so
    /// callers can rewrite ids stored elsewhere.
    pub fn sort_by_left_edge(&mut self) -> Vec<RoomId> {
        let mut order: Vec<usize> = (0..self.rooms.len())
            .filter(|&i| self.rooms[i].parent.is_none())
            .collect();
        order.sort_by_key(|&i| self.rooms[i].lx);
        order.extend((0..self.rooms.len()).filter(|&i| self.rooms[i].parent.is_some()));

        let mut remap = vec![RoomId(0); self.rooms.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = RoomId(new as u32);
        }

        let mut old_rooms: Vec<Option<Room>> = self.rooms.drain(..).map(Some).collect();
        for &old in &order {
            if let Some(mut room) = old_rooms[old].take() {
                room.parent = room.parent.map(|p| remap[p.index()]);
                for sub in &mut room.subrooms {
                    *sub = remap[sub.index()];
                }
                self.rooms.push(room);
            }
        }
        remap
    }
}

impl core::ops::Index<RoomId> for RoomArena {
    type Output = Room;

    fn index(&self, id: RoomId) -> &Room {
        &self.rooms[id.index()]
    }
}

impl core::ops::IndexMut<RoomId> for RoomArena {
    fn index_mut(&mut self, id: RoomId) -> &mut Room {
        &mut self.rooms[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(lx: i32, ly: i32, hx: i32, hy: i32) -> Room {
        Room::new(lx, ly, hx, hy, RoomKind::Ordinary, true)
    }

    #[test]
    fn test_room_geometry() {
        let r = room(10, 5, 14, 8);
        assert_eq!(r.width(), 5);
        assert_eq!(r.height(), 4);
        assert_eq!(r.area(), 20);
        assert_eq!(r.center(), (12, 6));
        assert!(r.contains(10, 5));
        assert!(!r.contains(9, 5));
        assert!(r.contains_with_walls(9, 4));
        assert!(!r.contains_with_walls(8, 4));
    }

    #[test]
    fn test_somexy_stays_inside() {
        let r = room(10, 5, 14, 8);
        let mut rng = RandomStream::new(3);
        for _ in 0..200 {
            let (x, y) = (r.somex(&mut rng), r.somey(&mut rng));
            assert!(r.contains(x, y));
        }
        assert_eq!(rng.call_count(), 400);
    }

    #[test]
    fn test_subroom_links() {
        let mut arena = RoomArena::new();
        let parent = arena.push(room(10, 5, 20, 12));
        let child = arena.push_subroom(parent, room(12, 7, 14, 9));
        assert_eq!(arena[child].parent, Some(parent));
        assert_eq!(arena[parent].subrooms, vec![child]);
        assert_eq!(arena.top_level(), vec![parent]);
    }

    #[test]
    fn test_sort_remaps_ids() {
        let mut arena = RoomArena::new();
        let a = arena.push(room(40, 5, 45, 8));
        let _sub = arena.push_subroom(a, room(41, 6, 42, 7));
        let _b = arena.push(room(3, 5, 8, 8));
        let remap = arena.sort_by_left_edge();

        assert_eq!(remap, vec![RoomId(1), RoomId(2), RoomId(0)]);
        assert_eq!(arena[RoomId(0)].lx, 3);
        assert_eq!(arena[RoomId(1)].lx, 40);
        assert_eq!(arena[RoomId(1)].subrooms, vec![RoomId(2)]);
        assert_eq!(arena[RoomId(2)].parent, Some(RoomId(1)));
    }

    #[test]
    fn test_random_lighting_draws() {
        let mut rng = RandomStream::new(9);
        Lighting::Random.resolve(&mut rng, 1);
        // rnd(2) is always < 11, so rn2(77) is rolled too
        assert_eq!(rng.call_count(), 2);

        let mut rng = RandomStream::new(9);
        assert!(Lighting::Lit.resolve(&mut rng, 30));
        assert_eq!(rng.call_count(), 0);
    }
}
