//! Special room conversion: shops, temples, throne rooms, zoos and the rest
//!
//! At most one ordinary room per level is converted. Which kind is tried
//! depends on depth; each kind past the shop costs one roll.

use strum::IntoEnumIterator;

use super::cell::{CellType, DoorState, Feature};
use super::context::GenerationContext;
use super::engrave::random_epitaph;
use super::fill::random_alignment;
use super::level::EngravingKind;
use super::room::{RoomId, RoomKind, ShopKind};
use crate::rng::RandomStream;
use crate::services::{MonsterSpec, ObjectClass, ObjectRequest};

/// Shops stop appearing from this depth on
const MEDUSA_DEPTH: i32 = 21;

/// Throne room court, strongest first
fn court_monster(rng: &mut RandomStream, difficulty: i32) -> char {
    let i = rng.rn2(60) + rng.rn2((3 * difficulty).max(0) as u32);
    match i {
        i if i > 100 => 'D',
        i if i > 95 => 'H',
        i if i > 85 => 'T',
        i if i > 75 => 'C',
        i if i > 60 => 'o',
        i if i > 45 => 'h',
        i if i > 30 => 'o',
        i if i > 15 => 'G',
        _ => 'k',
    }
}

/// `(name, weight)`; weights sum to 100
const SQUAD: &[(&str, u32)] = &[("soldier", 80), ("sergeant", 15), ("lieutenant", 4), ("captain", 1)];

fn squad_monster(rng: &mut RandomStream, difficulty: i32) -> &'static str {
    let sel = rng.rnd(80 + difficulty.max(0) as u32);
    let mut cumulative = 0;
    for &(name, prob) in SQUAD {
        cumulative += prob;
        if cumulative > sel {
            return name;
        }
    }
    SQUAD[rng.rn2(SQUAD.len() as u32) as usize].0
}

fn morgue_monster(rng: &mut RandomStream, difficulty: i32) -> MonsterSpec {
    let i = rng.rn2(100);
    let hd = rng.rn2(difficulty.max(0) as u32);
    if hd > 8 && i > 85 {
        MonsterSpec::of_class('V', 0, 0, difficulty)
    } else if i < 20 {
        MonsterSpec::named("ghost", 0, 0, difficulty)
    } else if i < 40 {
        MonsterSpec::named("wraith", 0, 0, difficulty)
    } else {
        MonsterSpec::of_class('Z', 0, 0, difficulty)
    }
}

/// Same ant species for the whole level
fn anthole_monster(difficulty: i32) -> &'static str {
    match difficulty.rem_euclid(3) {
        0 => "soldier ant",
        1 => "fire ant",
        _ => "giant ant",
    }
}

/// What a shop of this kind stocks; `None` is anything
fn shop_stock(kind: ShopKind) -> Option<ObjectClass> {
    match kind {
        ShopKind::General => None,
        ShopKind::Armor => Some(ObjectClass::Armor),
        ShopKind::Scroll => Some(ObjectClass::Scroll),
        ShopKind::Potion => Some(ObjectClass::Potion),
        ShopKind::Weapon => Some(ObjectClass::Weapon),
        ShopKind::Food | ShopKind::HealthFood => Some(ObjectClass::Food),
        ShopKind::Ring => Some(ObjectClass::Ring),
        ShopKind::Wand => Some(ObjectClass::Wand),
        ShopKind::Tool | ShopKind::Candle => Some(ObjectClass::Tool),
        ShopKind::Book => Some(ObjectClass::Spellbook),
    }
}

/// Chebyshev distance
fn distmin(x0: i32, y0: i32, x1: i32, y1: i32) -> i32 {
    (x0 - x1).abs().max((y0 - y1).abs())
}

fn dist2(x0: i32, y0: i32, x1: i32, y1: i32) -> i32 {
    (x0 - x1) * (x0 - x1) + (y0 - y1) * (y0 - y1)
}

impl GenerationContext<'_> {
    /// Maybe convert one room into a special room. `room_threshold` is the
    /// number of rooms a level needs before it may hold a shop.
    pub fn make_special_rooms(&mut self, room_threshold: usize) {
        let depth = self.depth;
        if depth > 1 && depth < MEDUSA_DEPTH && self.nroom() >= room_threshold && self.rng.rn2(depth as u32) < 3 {
            self.make_shop();
        } else if depth > 4 && self.rng.one_in(6) {
            self.make_zoo(RoomKind::Court);
        } else if depth > 5 && self.rng.one_in(8) {
            self.make_zoo(RoomKind::LeprechaunHall);
        } else if depth > 6 && self.rng.one_in(7) {
            self.make_zoo(RoomKind::Zoo);
        } else if depth > 8 && self.rng.one_in(5) {
            self.make_temple();
        } else if depth > 9 && self.rng.one_in(5) {
            self.make_zoo(RoomKind::Beehive);
        } else if depth > 11 && self.rng.one_in(6) {
            self.make_zoo(RoomKind::Morgue);
        } else if depth > 12 && self.rng.one_in(8) {
            self.make_zoo(RoomKind::Anthole);
        } else if depth > 14 && self.rng.one_in(4) {
            self.make_zoo(RoomKind::Barracks);
        } else if depth > 15 && self.rng.one_in(6) {
            self.make_swamp();
        } else if depth > 16 && self.rng.one_in(8) {
            self.make_zoo(RoomKind::CockatriceNest);
        }
    }

    /// Stairs of the given direction inside the room
    pub fn has_stairs(&self, id: RoomId, up: bool) -> bool {
        let room = &self.rooms[id];
        self.stairs.iter().any(|s| s.up == up && room.contains(s.x, s.y))
    }

    /// Pick an ordinary room to convert, starting at a random room and
    /// wrapping around. Strict picks avoid both staircases; loose picks
    /// avoid the up stairs and usually the down stairs.
    pub fn pick_room(&mut self, strict: bool) -> Option<RoomId> {
        let n = self.nroom();
        if n == 0 {
            return None;
        }
        let start = self.rng.rn2(n as u32) as usize;
        for i in 0..n {
            let Some(id) = self.top_room((start + i) % n) else {
                continue;
            };
            if self.rooms[id].kind != RoomKind::Ordinary {
                continue;
            }
            let (up, down) = (self.has_stairs(id, true), self.has_stairs(id, false));
            if strict {
                if up || down {
                    continue;
                }
            } else if up || (down && self.rng.rn2(3) != 0) {
                continue;
            }
            if self.rooms[id].door_count() == 1 || self.rng.rn2(5) == 0 {
                return Some(id);
            }
        }
        None
    }

    /// Turn the first one-door ordinary room without stairs into a shop.
    pub fn make_shop(&mut self) -> Option<RoomId> {
        let id = self.rooms.top_level().into_iter().find(|&id| {
            let r = &self.rooms[id];
            r.kind == RoomKind::Ordinary
                && !r.irregular
                && r.subrooms.is_empty()
                && r.door_count() == 1
                && !self.has_stairs(id, true)
                && !self.has_stairs(id, false)
        })?;

        if !self.rooms[id].lit {
            let outer = self.rooms[id].outer_bounds();
            for x in outer.lx..=outer.hx {
                for y in outer.ly..=outer.hy {
                    if let Some(c) = self.grid.get_mut(x, y) {
                        c.lit = true;
                    }
                }
            }
            self.rooms[id].lit = true;
        }

        let mut roll = self.rng.rnd(100) as i32;
        let mut kind = ShopKind::General;
        for k in ShopKind::iter() {
            kind = k;
            roll -= k.probability() as i32;
            if roll <= 0 {
                break;
            }
        }
        if self.rooms[id].area() > 20 && matches!(kind, ShopKind::Wand | ShopKind::Book) {
            kind = ShopKind::General;
        }
        let room = &mut self.rooms[id];
        room.kind = RoomKind::Shop(kind);
        room.needs_fill = false;
        self.flags.has_shop = true;
        tracing::debug!(room = id.0, shop = %kind, "shop created");
        self.stock_shop(id, kind);
        Some(id)
    }

    /// Shopkeeper inside the door, a proper door, and goods on every other
    /// floor cell.
    fn stock_shop(&mut self, id: RoomId, kind: ShopKind) {
        let room = self.rooms[id].clone();
        let Some(&(dx, dy)) = room.doors.first() else {
            return;
        };
        let (mut sx, mut sy) = (dx, dy);
        if sx == room.lx - 1 {
            sx += 1;
        } else if sx == room.hx + 1 {
            sx -= 1;
        } else if sy == room.ly - 1 {
            sy += 1;
        } else if sy == room.hy + 1 {
            sy -= 1;
        }
        let diff = self.difficulty();
        self.make_monster(MonsterSpec::named("shopkeeper", sx, sy, diff));

        let door = &mut self.grid[(dx, dy)];
        if door.typ == CellType::SecretDoor {
            door.typ = CellType::Door;
        }
        let mut state = door.door_state();
        if state == DoorState::NO_DOOR {
            state = DoorState::OPEN;
        }
        if state.contains(DoorState::TRAPPED) {
            state = DoorState::NO_DOOR;
        }
        door.set_door_state(state);
        if state == DoorState::LOCKED {
            let (ox, oy) = (dx + (dx - sx), dy + (dy - sy));
            self.engrave(ox, oy, "Closed for inventory", EngravingKind::Dust);
        }

        // the row or column just inside the door stays clear
        for x in room.lx..=room.hx {
            for y in room.ly..=room.hy {
                let in_front = (x == room.lx && dx == x - 1)
                    || (x == room.hx && dx == x + 1)
                    || (y == room.ly && dy == y - 1)
                    || (y == room.hy && dy == y + 1);
                if in_front {
                    continue;
                }
                if (self.rng.rn2(100) as i32) < self.depth && !self.monster_at(x, y) {
                    self.make_monster(MonsterSpec::of_class('m', x, y, diff));
                } else {
                    self.rng.rnd(100);
                    self.make_object(ObjectRequest::of_class(shop_stock(kind), x, y));
                }
            }
        }
    }

    /// Convert a room into a monster lair of the given kind and fill it.
    pub fn make_zoo(&mut self, kind: RoomKind) -> Option<RoomId> {
        let id = self.pick_room(false)?;
        self.rooms[id].kind = kind;
        self.fill_zoo(id);
        Some(id)
    }

    /// Sleeping occupants on every free floor cell plus the kind's loot.
    pub fn fill_zoo(&mut self, id: RoomId) {
        let room = self.rooms[id].clone();
        let kind = room.kind;
        let diff = self.difficulty();
        let door = room.doors.first().copied();
        let mut goldlim = 0;
        let (mut tx, mut ty) = (0, 0);

        match kind {
            RoomKind::Court => {
                for _ in 0..100 {
                    let Some((x, y)) = self.somexy(id) else { break };
                    (tx, ty) = (x, y);
                    if !self.occupied(x, y) {
                        break;
                    }
                }
            }
            RoomKind::Beehive => {
                tx = room.lx + (room.hx - room.lx + 1) / 2;
                ty = room.ly + (room.hy - room.ly + 1) / 2;
            }
            RoomKind::Zoo | RoomKind::LeprechaunHall => goldlim = 500 * diff,
            _ => {}
        }

        for x in room.lx..=room.hx {
            for y in room.ly..=room.hy {
                let cell = &self.grid[(x, y)];
                let near_door = door.is_some_and(|(dx, dy)| distmin(x, y, dx, dy) <= 1);
                let usable = if room.irregular {
                    cell.room == Some(id) && !cell.is_edge()
                } else {
                    cell.typ > CellType::Door
                };
                if !usable || near_door {
                    continue;
                }

                let spec = match kind {
                    RoomKind::Court => MonsterSpec::of_class(court_monster(self.rng, diff), x, y, diff),
                    RoomKind::Barracks => MonsterSpec::named(squad_monster(self.rng, diff), x, y, diff),
                    RoomKind::Morgue => {
                        let mut spec = morgue_monster(self.rng, diff);
                        (spec.x, spec.y) = (x, y);
                        spec
                    }
                    RoomKind::Beehive if (x, y) == (tx, ty) => MonsterSpec::named("queen bee", x, y, diff),
                    RoomKind::Beehive => MonsterSpec::named("killer bee", x, y, diff),
                    RoomKind::LeprechaunHall => MonsterSpec::named("leprechaun", x, y, diff),
                    RoomKind::CockatriceNest => MonsterSpec::named("cockatrice", x, y, diff),
                    RoomKind::Anthole => MonsterSpec::named(anthole_monster(diff), x, y, diff),
                    _ => MonsterSpec::random(x, y, diff),
                };
                self.make_monster(spec.asleep());

                match kind {
                    RoomKind::Zoo | RoomKind::LeprechaunHall => {
                        let mut i = match door {
                            Some((dx, dy)) => {
                                let d = dist2(x, y, dx, dy);
                                d * d
                            }
                            None => goldlim,
                        };
                        if i >= goldlim {
                            i = 5 * diff;
                        }
                        goldlim -= i;
                        let amount = self.rng.rn1(i.max(0) as u32, 10);
                        self.make_gold(amount as u32, x, y);
                    }
                    RoomKind::Morgue => {
                        if self.rng.one_in(5) {
                            self.make_object(ObjectRequest::named("corpse", x, y));
                        }
                        if self.rng.one_in(10) {
                            let name = if self.rng.rn2(3) != 0 { "large box" } else { "chest" };
                            self.make_object(ObjectRequest::named(name, x, y));
                        }
                        if self.rng.one_in(5) {
                            self.make_grave(x, y, None);
                        }
                    }
                    RoomKind::Beehive => {
                        if self.rng.one_in(3) {
                            self.make_object(ObjectRequest::named("lump of royal jelly", x, y));
                        }
                    }
                    RoomKind::Barracks => {
                        if self.rng.one_in(20) {
                            let name = if self.rng.rn2(3) != 0 { "large box" } else { "chest" };
                            self.make_object(ObjectRequest::named(name, x, y));
                        }
                    }
                    RoomKind::CockatriceNest => {
                        if self.rng.one_in(3) {
                            self.make_object(ObjectRequest::named("statue", x, y));
                        }
                    }
                    RoomKind::Anthole => {
                        if self.rng.one_in(3) {
                            self.make_object(ObjectRequest::of_class(Some(ObjectClass::Food), x, y));
                        }
                    }
                    _ => {}
                }
            }
        }

        match kind {
            RoomKind::Court => {
                if self.grid.in_bounds(tx, ty) && room.contains(tx, ty) {
                    self.grid.set_typ(tx, ty, CellType::Throne);
                }
                if let Some((x, y)) = self.somexy(id) {
                    let amount = self.rng.rn1((50 * diff).max(0) as u32, 10);
                    let mut chest = self
                        .services
                        .objects
                        .create_object(self.rng, &ObjectRequest::named("chest", x, y));
                    let gold = self
                        .services
                        .objects
                        .create_object(self.rng, &ObjectRequest::gold(amount as u32, x, y));
                    chest.contents.push(gold);
                    self.objects.push(chest);
                }
                self.flags.has_court = true;
            }
            RoomKind::Barracks => self.flags.has_barracks = true,
            RoomKind::Zoo => self.flags.has_zoo = true,
            RoomKind::Morgue => self.flags.has_morgue = true,
            RoomKind::Beehive => self.flags.has_beehive = true,
            _ => {}
        }
        self.rooms[id].needs_fill = false;
        tracing::debug!(room = id.0, kind = %kind, monsters = self.monsters.len(), "special room filled");
    }

    /// A grave with an inscription, or a bell-saved one.
    pub fn make_grave(&mut self, x: i32, y: i32, text: Option<&str>) {
        if !matches!(self.grid.typ(x, y), CellType::Room | CellType::Grave) || self.trap_at(x, y).is_some() {
            return;
        }
        self.grid.set_typ(x, y, CellType::Grave);
        let text = match text {
            Some(t) => t.to_string(),
            None => random_epitaph(self.rng),
        };
        self.engrave(x, y, text, EngravingKind::Headstone);
    }

    /// An altar with an attending priest.
    pub fn make_temple(&mut self) -> Option<RoomId> {
        let id = self.pick_room(true)?;
        let room = &mut self.rooms[id];
        room.kind = RoomKind::Temple;
        room.needs_fill = false;
        let x = room.lx + (room.hx - room.lx) / 2;
        let y = room.ly + (room.hy - room.ly) / 2;
        let align = random_alignment(self.rng.rn2(3));
        let cell = &mut self.grid[(x, y)];
        cell.typ = CellType::Altar;
        cell.feature = Feature::Altar(align);
        let diff = self.difficulty();
        self.make_monster(MonsterSpec::named("aligned priest", x + 1, y, diff));
        self.flags.has_temple = true;
        Some(id)
    }

    /// Up to five rooms become checkerboards of water with eels and molds.
    pub fn make_swamp(&mut self) {
        let n = self.nroom();
        if n == 0 {
            return;
        }
        let diff = self.difficulty();
        let mut eels = 0;
        for _ in 0..5 {
            let pick = self.rng.rn2(n as u32) as usize;
            let Some(id) = self.top_room(pick) else { continue };
            let room = self.rooms[id].clone();
            if room.kind != RoomKind::Ordinary || self.has_stairs(id, true) || self.has_stairs(id, false) {
                continue;
            }
            self.rooms[id].kind = RoomKind::Swamp;
            self.rooms[id].needs_fill = false;
            for x in room.lx..=room.hx {
                for y in room.ly..=room.hy {
                    if self.object_at(x, y) || self.monster_at(x, y) || self.trap_at(x, y).is_some() || self.nexttodoor(x, y) {
                        continue;
                    }
                    if (x + y) % 2 != 0 {
                        self.grid.set_typ(x, y, CellType::Pool);
                        if eels == 0 || self.rng.one_in(4) {
                            let name = if self.rng.rn2(5) != 0 {
                                "giant eel"
                            } else if self.rng.rn2(2) != 0 {
                                "piranha"
                            } else {
                                "electric eel"
                            };
                            self.make_monster(MonsterSpec::named(name, x, y, diff));
                            eels += 1;
                        }
                    } else if self.rng.one_in(4) {
                        self.make_monster(MonsterSpec::of_class('F', x, y, diff));
                    }
                }
            }
            self.flags.has_swamp = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::test_support::*;
    use super::*;
    use crate::dungeon::Stairway;

    #[test]
    fn test_pick_room_strict_skips_stairs() {
        with_context(3, 10, |ctx| {
            let a = stamp_room(ctx, 5, 5, 9, 8);
            let b = stamp_room(ctx, 30, 5, 34, 8);
            ctx.stairs.push(Stairway { x: 6, y: 6, up: true });
            for _ in 0..20 {
                if let Some(id) = ctx.pick_room(true) {
                    assert_eq!(id, b);
                }
            }
            assert_ne!(ctx.pick_room(true), Some(a));
        });
    }

    #[test]
    fn test_shop_needs_single_door() {
        with_context(3, 5, |ctx| {
            stamp_room(ctx, 5, 5, 9, 8);
            assert!(ctx.make_shop().is_none());
        });
    }

    #[test]
    fn test_shop_is_stocked() {
        with_context(3, 5, |ctx| {
            let id = stamp_room(ctx, 5, 5, 9, 8);
            ctx.grid.set_typ(4, 6, CellType::Door);
            ctx.grid[(4, 6)].set_door_state(DoorState::NO_DOOR);
            ctx.add_door(4, 6, id);
            assert_eq!(ctx.make_shop(), Some(id));
            assert!(ctx.room(id).kind.is_shop());
            assert!(ctx.room(id).lit);
            assert!(ctx.flags.has_shop);
            assert!(ctx.monsters.iter().any(|m| m.name == "shopkeeper" && (m.x, m.y) == (5, 6)));
            assert_eq!(ctx.grid[(4, 6)].door_state(), DoorState::OPEN);
            // the column inside the door stays clear, the rest is stocked
            let stocked = ctx.objects.len() + ctx.monsters.iter().filter(|m| m.symbol == 'm').count();
            assert_eq!(stocked, 4 * 4);
            assert!(ctx.objects.iter().all(|o| o.x > 5));
        });
    }

    #[test]
    fn test_beehive_has_queen_at_center() {
        with_context(9, 12, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            ctx.rooms[id].kind = RoomKind::Beehive;
            ctx.fill_zoo(id);
            let queen = ctx.monsters.iter().find(|m| m.name == "queen bee").unwrap();
            assert_eq!((queen.x, queen.y), (13, 7));
            assert!(ctx.monsters.iter().all(|m| m.asleep));
            assert_eq!(ctx.monsters.len(), 35);
            assert!(ctx.flags.has_beehive);
        });
    }

    #[test]
    fn test_court_has_throne_and_coffers() {
        with_context(4, 8, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            ctx.rooms[id].kind = RoomKind::Court;
            ctx.fill_zoo(id);
            assert_eq!(ctx.grid.count_typ(CellType::Throne), 1);
            let chest = ctx.objects.iter().find(|o| o.name == "chest").unwrap();
            assert_eq!(chest.contents.len(), 1);
            assert!(ctx.flags.has_court);
        });
    }

    #[test]
    fn test_zoo_gold_everywhere() {
        with_context(4, 8, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            ctx.rooms[id].kind = RoomKind::Zoo;
            ctx.fill_zoo(id);
            assert_eq!(ctx.objects.iter().filter(|o| o.name == "gold piece").count(), 35);
            assert!(ctx.objects.iter().all(|o| o.quantity >= 10));
        });
    }

    #[test]
    fn test_squad_weights() {
        assert_eq!(SQUAD.iter().map(|(_, p)| p).sum::<u32>(), 100);
        let mut rng = RandomStream::new(1);
        for _ in 0..50 {
            let name = squad_monster(&mut rng, 1);
            assert!(SQUAD.iter().any(|(n, _)| *n == name));
        }
    }
}
