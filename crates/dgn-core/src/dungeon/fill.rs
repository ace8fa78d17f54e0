//! Ordinary room contents
//!
//! Every ordinary or themed room still marked `needs_fill` gets the same
//! sequence of rolls: a monster, traps, gold, furniture, a grave, a statue,
//! a box, graffiti and loose objects. Each roll is made whether or not the
//! thing it creates ends up fitting.

use super::cell::{Alignment, CellType, Feature};
use super::context::GenerationContext;
use super::engrave::random_engraving;
use super::level::{EngravingKind, TrapKind};
use super::room::{RoomId, RoomKind};
use crate::services::{MonsterSpec, ObjectRequest};

const SAVED_BY_THE_BELL: &str = "Saved by the bell!";

/// Whether a trap kind may be generated at this difficulty.
fn trap_allowed(kind: TrapKind, difficulty: i32) -> bool {
    match kind {
        TrapKind::MagicPortal | TrapKind::VibratingSquare | TrapKind::Fire => false,
        TrapKind::RollingBoulder | TrapKind::SleepingGas => difficulty >= 2,
        TrapKind::LevelTeleport | TrapKind::SpikedPit => difficulty >= 5,
        TrapKind::LandMine => difficulty >= 6,
        TrapKind::Web => difficulty >= 7,
        TrapKind::Statue | TrapKind::Polymorph => difficulty >= 8,
        _ => true,
    }
}

pub(super) fn random_alignment(roll: u32) -> Alignment {
    match roll {
        0 => Alignment::Chaotic,
        1 => Alignment::Neutral,
        _ => Alignment::Lawful,
    }
}

impl GenerationContext<'_> {
    /// Fill every room that still needs contents, subrooms after their
    /// parent.
    pub fn fill_rooms(&mut self) {
        for id in self.rooms.top_level() {
            self.fill_room_tree(id);
        }
    }

    fn fill_room_tree(&mut self, id: RoomId) {
        let room = &self.rooms[id];
        if room.kind.takes_ordinary_fill() && room.needs_fill {
            self.fill_ordinary_room(id);
        }
        for sub in self.rooms[id].subrooms.clone() {
            self.fill_room_tree(sub);
        }
    }

    pub fn fill_ordinary_room(&mut self, id: RoomId) {
        let diff = self.difficulty();

        if self.rng.one_in(3)
            && let Some((x, y)) = self.somexy(id)
        {
            if let Some(i) = self.make_monster(MonsterSpec::random(x, y, diff))
                && self.monsters[i].name == "giant spider"
                && !self.occupied(x, y)
            {
                self.make_trap(TrapKind::Web, x, y);
            }
        }

        let chance = (8 - diff / 6).max(2);
        let mut tries = 0;
        while self.rng.rn2(chance as u32) == 0 && tries < 1000 {
            tries += 1;
            self.make_random_trap(id);
        }

        if self.rng.one_in(3)
            && let Some((x, y)) = self.somexy(id)
        {
            self.make_gold(0, x, y);
        }
        if self.rng.one_in(10) {
            self.make_fountain(id);
        }
        if self.rng.one_in(60) {
            self.make_sink(id);
        }
        if self.rng.one_in(60) {
            self.make_altar(id);
        }
        let grave_chance = (80 - self.depth * 2).max(2);
        if self.rng.one_in(grave_chance as u32) {
            self.make_room_grave(id);
        }
        if self.rng.one_in(20)
            && let Some((x, y)) = self.somexy(id)
        {
            self.make_object(ObjectRequest::named("statue", x, y));
        }
        let box_chance = (self.nroom() * 5 / 2) as u32;
        if self.rng.rn2(box_chance) == 0 {
            let name = if self.rng.rn2(3) != 0 { "large box" } else { "chest" };
            if let Some((x, y)) = self.somexy(id) {
                self.make_object(ObjectRequest::named(name, x, y));
            }
        }
        if self.rng.one_in((27 + 3 * self.depth.abs()) as u32) {
            let text = random_engraving(self.rng);
            let mut spot = None;
            while let Some((x, y)) = self.somexy(id) {
                spot = Some((x, y));
                if self.grid.typ(x, y) == CellType::Room || self.rng.rn2(40) != 0 {
                    break;
                }
            }
            if let Some((x, y)) = spot {
                self.engrave_graffiti(x, y, text);
            }
        }
        if self.rng.one_in(3) {
            if let Some((x, y)) = self.somexy(id) {
                self.make_object(ObjectRequest::of_class(None, x, y));
            }
            let mut extra = 0;
            while self.rng.one_in(5) && extra < 100 {
                extra += 1;
                if let Some((x, y)) = self.somexy(id) {
                    self.make_object(ObjectRequest::of_class(None, x, y));
                }
            }
        }
        self.rooms[id].needs_fill = false;
    }

    /// Scratch graffiti on `(x, y)` unless it is liquid or furniture.
    fn engrave_graffiti(&mut self, x: i32, y: i32, text: String) {
        let typ = self.grid.typ(x, y);
        let furniture = matches!(
            typ,
            CellType::Stairs
                | CellType::Ladder
                | CellType::Fountain
                | CellType::Throne
                | CellType::Sink
                | CellType::Grave
                | CellType::Altar
        );
        if !typ.is_liquid() && !furniture {
            self.engrave(x, y, text, EngravingKind::Mark);
        }
    }

    /// Roll a trap kind for this level's difficulty.
    pub fn random_trap_kind(&mut self) -> TrapKind {
        let diff = self.difficulty();
        loop {
            let roll = self.rng.rnd(TrapKind::COUNT);
            let Some(kind) = TrapKind::from_index(roll) else {
                continue;
            };
            if !trap_allowed(kind, diff) {
                continue;
            }
            // holes are rare
            if kind == TrapKind::Hole && self.rng.rn2(7) != 0 {
                continue;
            }
            return kind;
        }
    }

    /// A random trap on a free spot in the room; webs come with their
    /// spider.
    pub fn make_random_trap(&mut self, id: RoomId) -> Option<(i32, i32)> {
        let kind = self.random_trap_kind();
        let mut spot = None;
        for _ in 0..200 {
            let (x, y) = self.somexy(id)?;
            if !self.occupied(x, y) {
                spot = Some((x, y));
                break;
            }
        }
        let (x, y) = spot?;
        self.make_trap(kind, x, y)?;
        if kind == TrapKind::Web {
            let diff = self.difficulty();
            self.make_monster(MonsterSpec::named("giant spider", x, y, diff));
        }
        Some((x, y))
    }

    pub fn make_fountain(&mut self, id: RoomId) -> Option<(i32, i32)> {
        let (x, y) = self.find_okay_roompos(id)?;
        self.grid.set_typ(x, y, CellType::Fountain);
        // blessed fountains are not modelled; the roll is kept
        self.rng.rn2(7);
        self.flags.fountain_count += 1;
        Some((x, y))
    }

    pub fn make_sink(&mut self, id: RoomId) -> Option<(i32, i32)> {
        let (x, y) = self.find_okay_roompos(id)?;
        self.grid.set_typ(x, y, CellType::Sink);
        self.flags.sink_count += 1;
        Some((x, y))
    }

    pub fn make_altar(&mut self, id: RoomId) -> Option<(i32, i32)> {
        if self.rooms[id].kind != RoomKind::Ordinary {
            return None;
        }
        let (x, y) = self.find_okay_roompos(id)?;
        let align = random_alignment(self.rng.rn2(3));
        let cell = &mut self.grid[(x, y)];
        cell.typ = CellType::Altar;
        cell.feature = Feature::Altar(align);
        Some((x, y))
    }

    /// A grave in an ordinary room, sometimes with buried loot and rarely
    /// with a bell left on top.
    pub fn make_room_grave(&mut self, id: RoomId) -> Option<(i32, i32)> {
        if self.rooms[id].kind != RoomKind::Ordinary {
            return None;
        }
        let bell = self.rng.one_in(10);
        let (x, y) = self.find_okay_roompos(id)?;
        self.make_grave(x, y, bell.then_some(SAVED_BY_THE_BELL));
        if self.rng.one_in(3) {
            let amount = self.rng.rnd(20) + self.difficulty() as u32 * self.rng.rnd(5);
            self.make_object(ObjectRequest::gold(amount, x, y).buried());
            for _ in 0..self.rng.rn2(5) {
                self.make_object(ObjectRequest::of_class(None, x, y).buried());
            }
        }
        if bell {
            self.make_object(ObjectRequest::named("bell", x, y));
        }
        Some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::test_support::*;
    use super::*;

    #[test]
    fn test_shallow_levels_skip_nasty_traps() {
        with_context(3, 1, |ctx| {
            for _ in 0..300 {
                let kind = ctx.random_trap_kind();
                assert!(trap_allowed(kind, 1), "{kind:?} at depth 1");
                assert!(!matches!(kind, TrapKind::LandMine | TrapKind::Web | TrapKind::Polymorph));
            }
        });
    }

    #[test]
    fn test_deep_levels_allow_webs() {
        assert!(trap_allowed(TrapKind::Web, 7));
        assert!(!trap_allowed(TrapKind::Web, 6));
        assert!(!trap_allowed(TrapKind::MagicPortal, 50));
    }

    #[test]
    fn test_web_trap_brings_spider() {
        with_context(11, 10, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            for _ in 0..10 {
                ctx.make_random_trap(id);
            }
            for trap in ctx.traps.iter().filter(|t| t.kind == TrapKind::Web) {
                assert!(ctx.monsters.iter().any(|m| m.name == "giant spider"
                    && (m.x - trap.x).abs() <= 2
                    && (m.y - trap.y).abs() <= 2));
            }
            assert!(ctx.traps.iter().all(|t| ctx.room(id).contains(t.x, t.y)));
        });
    }

    #[test]
    fn test_furniture_counts() {
        with_context(5, 3, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            assert!(ctx.make_fountain(id).is_some());
            assert!(ctx.make_sink(id).is_some());
            let (ax, ay) = ctx.make_altar(id).unwrap();
            assert_eq!(ctx.flags.fountain_count, 1);
            assert_eq!(ctx.flags.sink_count, 1);
            assert!(matches!(ctx.grid[(ax, ay)].feature, Feature::Altar(_)));
            assert_eq!(ctx.grid.count_typ(CellType::Fountain), 1);
        });
    }

    #[test]
    fn test_altar_only_in_ordinary_rooms() {
        with_context(5, 3, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            ctx.rooms[id].kind = RoomKind::Themed;
            assert!(ctx.make_altar(id).is_none());
            assert_eq!(ctx.rng.call_count(), 0);
        });
    }

    #[test]
    fn test_grave_has_headstone() {
        for seed in 0..20 {
            with_context(seed, 5, |ctx| {
                let id = stamp_room(ctx, 10, 5, 16, 9);
                let (x, y) = ctx.make_room_grave(id).unwrap();
                assert_eq!(ctx.grid.typ(x, y), CellType::Grave);
                let stone = ctx.engravings.iter().find(|e| (e.x, e.y) == (x, y)).unwrap();
                assert_eq!(stone.kind, EngravingKind::Headstone);
                let bell = ctx.objects.iter().any(|o| o.name == "bell");
                assert_eq!(bell, stone.text == SAVED_BY_THE_BELL);
                assert!(ctx.objects.iter().filter(|o| o.name != "bell").all(|o| o.buried));
            });
        }
    }

    #[test]
    fn test_fill_clears_needs_fill_and_stays_inside() {
        for seed in 0..20 {
            with_context(seed, 4, |ctx| {
                let id = stamp_room(ctx, 10, 5, 20, 9);
                ctx.fill_rooms();
                assert!(!ctx.room(id).needs_fill);
                let room = ctx.room(id).clone();
                assert!(ctx.objects.iter().all(|o| room.contains(o.x, o.y)));
                assert!(ctx.traps.iter().all(|t| room.contains(t.x, t.y)));
            });
        }
    }

    #[test]
    fn test_parent_fill_stays_out_of_subrooms() {
        for seed in 0..40 {
            with_context(seed, 8, |ctx| {
                let parent = stamp_room(ctx, 10, 4, 30, 14);
                let sub = ctx.add_subroom(parent, 14, 7, 17, 9, true, RoomKind::Ordinary);
                ctx.rooms[sub].needs_fill = false;
                ctx.fill_ordinary_room(parent);
                let sub = ctx.room(sub).clone();
                for o in &ctx.objects {
                    assert!(!sub.contains_with_walls(o.x, o.y), "seed {seed}: {} at ({},{})", o.name, o.x, o.y);
                }
                for m in &ctx.monsters {
                    assert!(!sub.contains_with_walls(m.x, m.y), "seed {seed}: {} at ({},{})", m.name, m.x, m.y);
                }
                for e in &ctx.engravings {
                    assert!(!sub.contains_with_walls(e.x, e.y), "seed {seed}: engraving at ({},{})", e.x, e.y);
                }
            });
        }
    }

    #[test]
    fn test_vaults_are_not_filled() {
        with_context(1, 4, |ctx| {
            let id = stamp_room(ctx, 10, 5, 11, 6);
            ctx.rooms[id].kind = RoomKind::Vault;
            ctx.fill_rooms();
            assert!(ctx.room(id).needs_fill);
            assert!(ctx.objects.is_empty());
        });
    }
}
