//! Theme fills and their deferred handlers
//!
//! Every fill works on the room's floor selection: cells owned by the room
//! that are not on its edge, visited row by row.

use crate::dungeon::{Alignment, CellType, EngravingKind, Feature, GenerationContext, LevelTimer, TimerAction, TrapKind, RoomId};
use crate::postprocess::PostprocessData;
use crate::services::{MonsterSpec, ObjectRequest};

/// Floor cells of a room, row by row
fn room_cells(ctx: &GenerationContext<'_>, id: RoomId) -> Vec<(i32, i32)> {
    let room = ctx.room(id);
    let (lx, ly, hx, hy) = (room.lx, room.ly, room.hx, room.hy);
    (ly..=hy)
        .flat_map(|y| (lx..=hx).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let cell = &ctx.grid[(x, y)];
            cell.room == Some(id) && !cell.is_edge() && cell.typ.is_room_floor()
        })
        .collect()
}

/// Keep each cell with probability `p`%; one draw per cell, all up front.
fn percentage(ctx: &mut GenerationContext<'_>, cells: &[(i32, i32)], p: u32) -> Vec<(i32, i32)> {
    cells.iter().copied().filter(|_| ctx.rng.percent(p)).collect()
}

pub fn ice_room(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let cells = room_cells(ctx, room);
    for &(x, y) in &cells {
        ctx.grid.set_typ(x, y, CellType::Ice);
    }
    if ctx.rng.percent(25) {
        let mintime = 1000 - ctx.difficulty() * 100;
        for &(x, y) in &cells {
            let turn = (mintime + ctx.rng.rn2(1000) as i32).max(1) as u32;
            ctx.timers.push(LevelTimer {
                x,
                y,
                turn,
                action: TimerAction::MeltIce,
            });
        }
    }
}

pub fn boulder_room(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let cells = room_cells(ctx, room);
    for (x, y) in percentage(ctx, &cells, 30) {
        if ctx.rng.percent(50) {
            ctx.make_object(ObjectRequest::named("boulder", x, y));
        } else {
            ctx.make_trap(TrapKind::RollingBoulder, x, y);
        }
    }
}

pub fn spider_nest(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let spiders = ctx.difficulty() > 8;
    let cells = room_cells(ctx, room);
    for (x, y) in percentage(ctx, &cells, 30) {
        ctx.make_trap(TrapKind::Web, x, y);
        if spiders && ctx.rng.percent(80) {
            let diff = ctx.difficulty();
            ctx.make_monster(MonsterSpec::named("giant spider", x, y, diff));
        }
    }
}

/// One trap kind, scattered over the floor
pub fn trap_room(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let mut kinds = [
        TrapKind::Arrow,
        TrapKind::Dart,
        TrapKind::FallingRock,
        TrapKind::BearTrap,
        TrapKind::LandMine,
        TrapKind::SleepingGas,
        TrapKind::Rust,
        TrapKind::AntiMagic,
    ];
    ctx.rng.shuffle(&mut kinds);
    let cells = room_cells(ctx, room);
    for (x, y) in percentage(ctx, &cells, 30) {
        ctx.make_trap(kinds[0], x, y);
    }
}

pub fn garden(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let npts = room_cells(ctx, room).len() / 6;
    let diff = ctx.difficulty();
    for _ in 0..npts {
        if let Some((x, y)) = ctx.somexy(room) {
            ctx.make_monster(MonsterSpec::named("wood nymph", x, y, diff).asleep());
        }
        if ctx.rng.percent(30)
            && let Some((x, y)) = ctx.somexy(room)
            && ctx.grid.typ(x, y) == CellType::Room
        {
            ctx.grid.set_typ(x, y, CellType::Fountain);
            ctx.flags.fountain_count += 1;
        }
    }
    let region = ctx.room(room).bounds();
    ctx.postprocess.push(garden_walls, PostprocessData::GardenWalls { region });
}

/// A buried chest and a burned hint somewhere on the level pointing at it
pub fn buried_treasure(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let Some((x, y)) = ctx.somexy(room) else {
        return;
    };
    let mut chest = ctx
        .services
        .objects
        .create_object(ctx.rng, &ObjectRequest::named("chest", x, y).buried());
    let count = ctx.rng.dice(3, 4);
    for _ in 0..count {
        let item = ctx
            .services
            .objects
            .create_object(ctx.rng, &ObjectRequest::of_class(None, x, y).buried());
        chest.contents.push(item);
    }
    ctx.objects.push(chest);
    ctx.postprocess.push(dig_engraving, PostprocessData::DigEngraving { x, y });
}

pub fn buried_zombies(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let diff = ctx.difficulty();
    let mut kinds = vec!["kobold", "gnome", "orc", "dwarf"];
    if diff > 3 {
        kinds.extend(["elf", "human"]);
        if diff > 6 {
            kinds.extend(["ettin", "giant"]);
        }
    }
    let r = ctx.room(room);
    let count = r.width() * r.height() / 2;
    for _ in 0..count {
        ctx.rng.shuffle(&mut kinds);
        let Some((x, y)) = ctx.somexy(room) else {
            continue;
        };
        ctx.make_object(ObjectRequest::named("corpse", x, y).buried().depicting(kinds[0]));
        let turn = ctx.rng.rn1(21, 990) as u32;
        ctx.timers.push(LevelTimer {
            x,
            y,
            turn,
            action: TimerAction::Zombify,
        });
    }
}

const ADVENTURERS: &[&str] = &[
    "apprentice",
    "warrior",
    "ninja",
    "thug",
    "hunter",
    "acolyte",
    "abbot",
    "page",
    "attendant",
    "neanderthal",
    "chieftain",
    "student",
    "wizard",
    "valkyrie",
    "tourist",
    "samurai",
    "rogue",
    "ranger",
    "priestess",
    "priest",
    "monk",
    "knight",
    "healer",
    "cavewoman",
    "caveman",
    "barbarian",
    "archeologist",
];

/// A pile of adventurer corpses, mostly of one kind
pub fn massacre(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let n = ADVENTURERS.len() as u32;
    let mut idx = ctx.rng.rn2(n) as usize;
    let count = ctx.rng.dice(5, 5);
    for _ in 0..count {
        if ctx.rng.percent(10) {
            idx = ctx.rng.rn2(n) as usize;
        }
        if let Some((x, y)) = ctx.somexy(room) {
            ctx.make_object(ObjectRequest::named("corpse", x, y).depicting(ADVENTURERS[idx]));
        }
    }
}

pub fn statuary(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let statues = ctx.rng.dice(5, 5);
    for _ in 0..statues {
        if let Some((x, y)) = ctx.somexy(room) {
            ctx.make_object(ObjectRequest::named("statue", x, y));
        }
    }
    let traps = ctx.rng.dice(1, 3);
    for _ in 0..traps {
        if let Some((x, y)) = ctx.somexy(room) {
            ctx.make_trap(TrapKind::Statue, x, y);
        }
    }
}

pub fn light_source(ctx: &mut GenerationContext<'_>, room: RoomId) {
    if let Some((x, y)) = ctx.somexy(room) {
        let mut lamp = ObjectRequest::named("oil lamp", x, y);
        lamp.lit = true;
        ctx.make_object(lamp);
    }
}

/// One altar to each of the three alignments
pub fn temple_of_the_gods(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let mut gods = [Alignment::Lawful, Alignment::Neutral, Alignment::Chaotic];
    ctx.rng.shuffle(&mut gods);
    for align in gods {
        if let Some((x, y)) = ctx.find_okay_roompos(room) {
            let cell = &mut ctx.grid[(x, y)];
            cell.typ = CellType::Altar;
            cell.feature = Feature::Altar(align);
        }
    }
}

/// Chests, some of which are mimics
pub fn storeroom(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let cells = room_cells(ctx, room);
    let diff = ctx.difficulty();
    for (x, y) in percentage(ctx, &cells, 30) {
        if ctx.rng.percent(25) {
            ctx.make_object(ObjectRequest::named("chest", x, y));
        } else {
            ctx.make_monster(MonsterSpec::of_class('m', x, y, diff));
        }
    }
}

/// Two to four visible teleporters on distinct floor cells
pub fn teleportation_hub(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let mut cells: Vec<_> = room_cells(ctx, room)
        .into_iter()
        .filter(|&(x, y)| ctx.grid.typ(x, y) == CellType::Room)
        .collect();
    let count = 2 + ctx.rng.rn2(3);
    for _ in 0..count {
        if cells.is_empty() {
            break;
        }
        let i = ctx.rng.rn2(cells.len() as u32) as usize;
        let (x, y) = cells.remove(i);
        ctx.postprocess.push(teleport_trap, PostprocessData::TeleportTrap { x, y });
    }
}

/// Burn "Dig ..." into a random floor cell, with directions to `(x, y)`.
pub fn dig_engraving(ctx: &mut GenerationContext<'_>, data: &PostprocessData) {
    let &PostprocessData::DigEngraving { x, y } = data else {
        return;
    };
    let (w, h) = (ctx.width(), ctx.height());
    let floors: Vec<(i32, i32)> = (0..h)
        .flat_map(|py| (0..w).map(move |px| (px, py)))
        .filter(|&(px, py)| ctx.grid.typ(px, py) == CellType::Room)
        .collect();
    if floors.is_empty() {
        return;
    }
    let (px, py) = floors[ctx.rng.rn2(floors.len() as u32) as usize];
    ctx.engrave(px, py, dig_directions(x - px, y - py), EngravingKind::Burn);
}

fn dig_directions(tx: i32, ty: i32) -> String {
    let mut text = String::from("Dig");
    if tx == 0 && ty == 0 {
        text.push_str(" here");
        return text;
    }
    if tx != 0 {
        let dir = if tx > 0 { "east" } else { "west" };
        text.push_str(&format!(" {} {dir}", tx.abs()));
    }
    if ty != 0 {
        let dir = if ty > 0 { "south" } else { "north" };
        text.push_str(&format!(" {} {dir}", ty.abs()));
    }
    text
}

/// Walls around the garden grow into trees.
pub fn garden_walls(ctx: &mut GenerationContext<'_>, data: &PostprocessData) {
    let &PostprocessData::GardenWalls { region } = data else {
        return;
    };
    for x in region.lx - 1..=region.hx + 1 {
        for y in region.ly - 1..=region.hy + 1 {
            if ctx.grid.typ(x, y).is_wall() {
                ctx.grid.set_typ(x, y, CellType::Tree);
            }
        }
    }
}

pub fn teleport_trap(ctx: &mut GenerationContext<'_>, data: &PostprocessData) {
    let &PostprocessData::TeleportTrap { x, y } = data else {
        return;
    };
    if let Some(id) = ctx.make_trap(TrapKind::Teleport, x, y) {
        ctx.traps[id.0 as usize].seen = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::test_support::{stamp_room, with_context};
    use crate::postprocess;

    #[test]
    fn test_ice_room_freezes_floor() {
        for seed in 0..8 {
            with_context(seed, 3, |ctx| {
                let id = stamp_room(ctx, 10, 5, 16, 9);
                ice_room(ctx, id);
                assert_eq!(ctx.grid.count_typ(CellType::Ice), 35);
                assert_eq!(ctx.grid.count_typ(CellType::Room), 0);
                assert!(ctx.timers.is_empty() || ctx.timers.len() == 35);
                assert!(ctx.timers.iter().all(|t| t.action == TimerAction::MeltIce && t.turn >= 700));
            });
        }
    }

    #[test]
    fn test_trap_room_uses_one_kind() {
        with_context(5, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            trap_room(ctx, id);
            assert!(!ctx.traps.is_empty());
            let kind = ctx.traps[0].kind;
            assert!(ctx.traps.iter().all(|t| t.kind == kind && ctx.room(id).contains(t.x, t.y)));
        });
    }

    #[test]
    fn test_temple_has_three_gods() {
        with_context(8, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            temple_of_the_gods(ctx, id);
            let mut found: Vec<Alignment> = ctx
                .grid
                .positions()
                .filter_map(|p| match ctx.grid[p].feature {
                    Feature::Altar(a) => Some(a),
                    _ => None,
                })
                .collect();
            found.sort_by_key(|a| *a as u8);
            assert_eq!(found, vec![Alignment::Lawful, Alignment::Neutral, Alignment::Chaotic]);
        });
    }

    #[test]
    fn test_teleportation_hub_pads() {
        with_context(11, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            teleportation_hub(ctx, id);
            let queued = ctx.postprocess.len();
            assert!((2..=4).contains(&queued));
            postprocess::drain(ctx);
            assert_eq!(ctx.traps.len(), queued);
            assert!(ctx.traps.iter().all(|t| t.kind == TrapKind::Teleport && t.seen));
        });
    }

    #[test]
    fn test_buried_treasure_points_at_chest() {
        with_context(2, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            buried_treasure(ctx, id);
            let chest = ctx.objects.last().unwrap();
            assert_eq!(chest.name, "chest");
            assert!(chest.buried);
            assert!((3..=12).contains(&chest.contents.len()));
            assert_eq!(ctx.postprocess.len(), 1);
            postprocess::drain(ctx);
            assert_eq!(ctx.engravings.len(), 1);
            assert!(ctx.engravings[0].text.starts_with("Dig"));
            assert_eq!(ctx.engravings[0].kind, EngravingKind::Burn);
        });
    }

    #[test]
    fn test_dig_engraving_offsets() {
        with_context(2, 1, |ctx| {
            // a single floor cell forces the engraving spot
            stamp_room(ctx, 10, 5, 10, 5);
            dig_engraving(ctx, &PostprocessData::DigEngraving { x: 13, y: 3 });
            assert_eq!(ctx.engravings[0].text, "Dig 3 east 2 north");
            assert_eq!((ctx.engravings[0].x, ctx.engravings[0].y), (10, 5));
            dig_engraving(ctx, &PostprocessData::DigEngraving { x: 10, y: 5 });
            assert_eq!(ctx.engravings[0].text, "Dig here");
        });
    }

    #[test]
    fn test_dig_directions() {
        assert_eq!(dig_directions(-4, 0), "Dig 4 west");
        assert_eq!(dig_directions(0, 7), "Dig 7 south");
    }

    #[test]
    fn test_garden_walls_become_trees() {
        with_context(2, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            garden(ctx, id);
            assert_eq!(ctx.monsters.len(), 5);
            assert!(ctx.monsters.iter().all(|m| m.asleep && m.name == "wood nymph"));
            postprocess::drain(ctx);
            let outer = ctx.room(id).outer_bounds();
            for x in outer.lx..=outer.hx {
                assert_eq!(ctx.grid.typ(x, outer.ly), CellType::Tree);
                assert_eq!(ctx.grid.typ(x, outer.hy), CellType::Tree);
            }
            assert_eq!(ctx.grid.typ(outer.lx, 7), CellType::Tree);
        });
    }

    #[test]
    fn test_buried_zombies_by_difficulty() {
        with_context(4, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            buried_zombies(ctx, id);
            assert_eq!(ctx.objects.len(), 17);
            for o in &ctx.objects {
                assert!(o.buried);
                let kind = o.depicts.as_deref().unwrap();
                assert!(["kobold", "gnome", "orc", "dwarf"].contains(&kind));
            }
            assert_eq!(ctx.timers.len(), 17);
            assert!(ctx.timers.iter().all(|t| (990..=1010).contains(&t.turn)));
        });
    }

    #[test]
    fn test_massacre_and_statuary_counts() {
        with_context(6, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            massacre(ctx, id);
            let corpses = ctx.objects.len();
            assert!((5..=25).contains(&corpses));
            assert!(ctx.objects.iter().all(|o| o.depicts.is_some()));
            statuary(ctx, id);
            let statues = ctx.objects.len() - corpses;
            assert!((5..=25).contains(&statues));
            assert!((1..=3).contains(&ctx.traps.len()));
        });
    }

    #[test]
    fn test_light_source_is_lit() {
        with_context(6, 1, |ctx| {
            let id = stamp_room(ctx, 10, 5, 16, 9);
            light_source(ctx, id);
            assert_eq!(ctx.objects.len(), 1);
            assert!(ctx.objects[0].lit);
            assert_eq!(ctx.objects[0].name, "oil lamp");
        });
    }
}
