//! Theme rooms
//!
//! Shapes decide how a room is laid out; fills decide what goes in it.
//! Both are static registries of plain data plus a function pointer, and
//! both are sampled the same way: one pass over the eligible entries,
//! keeping each with probability `frequency / running_total`. The first
//! eligible entry is always kept, so a non-empty candidate list always
//! yields a pick.

mod fills;
mod fragments;
mod shapes;

use crate::dungeon::{GenerationContext, Room, RoomId};
use crate::rng::RandomStream;

pub use fills::{dig_engraving, garden_walls, teleport_trap};

pub type ShapeFn = fn(&mut GenerationContext<'_>);
pub type FillFn = fn(&mut GenerationContext<'_>, RoomId);

/// One registry record
#[derive(Debug, Clone, Copy)]
pub struct ThemeEntry<F> {
    pub name: &'static str,
    pub frequency: u32,
    pub min_depth: i32,
    pub max_depth: i32,
    /// Extra check against the room being filled; ignored when there is none
    pub eligible: Option<fn(&Room) -> bool>,
    pub run: F,
}

pub type ThemeShape = ThemeEntry<ShapeFn>;
pub type ThemeFill = ThemeEntry<FillFn>;

impl<F> ThemeEntry<F> {
    const fn new(name: &'static str, frequency: u32, run: F) -> Self {
        Self {
            name,
            frequency,
            min_depth: 0,
            max_depth: i32::MAX,
            eligible: None,
            run,
        }
    }

    const fn min_depth(mut self, depth: i32) -> Self {
        self.min_depth = depth;
        self
    }

    const fn only_if(mut self, check: fn(&Room) -> bool) -> Self {
        self.eligible = Some(check);
        self
    }

    /// Eligibility never touches the random stream.
    pub fn is_eligible(&self, depth: i32, room: Option<&Room>) -> bool {
        self.frequency > 0
            && depth >= self.min_depth
            && depth <= self.max_depth
            && match (self.eligible, room) {
                (Some(check), Some(room)) => check(room),
                _ => true,
            }
    }
}

/// Reservoir-sample one entry: `rn2(total)` per eligible entry, in order.
pub fn select<'r, F>(
    entries: &'r [ThemeEntry<F>],
    rng: &mut RandomStream,
    depth: i32,
    room: Option<&Room>,
) -> Option<&'r ThemeEntry<F>> {
    let mut total = 0;
    let mut pick = None;
    for entry in entries.iter().filter(|e| e.is_eligible(depth, room)) {
        total += entry.frequency;
        if rng.rn2(total) < entry.frequency {
            pick = Some(entry);
        }
    }
    pick
}

const fn shape(name: &'static str, frequency: u32, run: ShapeFn) -> ThemeShape {
    ThemeEntry::new(name, frequency, run)
}

const fn fill(name: &'static str, frequency: u32, run: FillFn) -> ThemeFill {
    ThemeEntry::new(name, frequency, run)
}

fn by_name<'r, F>(entries: &'r [ThemeEntry<F>], name: &str) -> Option<&'r ThemeEntry<F>> {
    entries.iter().find(|e| e.name == name)
}

fn is_lit(room: &Room) -> bool {
    room.lit
}

fn is_unlit(room: &Room) -> bool {
    !room.lit
}

pub static SHAPES: &[ThemeShape] = &[
    shape("default", 1000, shapes::default_room),
    shape("Fake Delphi", 1, shapes::fake_delphi),
    shape("Room in a room", 1, shapes::room_in_room),
    shape("Huge room", 1, shapes::huge_room),
    shape("Themed room", 6, shapes::themed_room),
    shape("Unlit themed room", 2, shapes::unlit_themed_room),
    shape("L-shaped", 1, fragments::l_shaped),
    shape("T-shaped", 1, fragments::t_shaped),
    shape("S-shaped", 1, fragments::s_shaped),
    shape("Cross", 1, fragments::cross),
];

pub static FILLS: &[ThemeFill] = &[
    fill("Ice room", 1, fills::ice_room),
    fill("Boulder room", 1, fills::boulder_room).min_depth(4),
    fill("Spider nest", 1, fills::spider_nest).min_depth(10),
    fill("Trap room", 1, fills::trap_room),
    fill("Garden", 1, fills::garden).only_if(is_lit),
    fill("Buried treasure", 1, fills::buried_treasure),
    fill("Buried zombies", 1, fills::buried_zombies),
    fill("Massacre", 1, fills::massacre),
    fill("Statuary", 1, fills::statuary),
    fill("Light source", 1, fills::light_source).only_if(is_unlit),
    fill("Temple of the gods", 1, fills::temple_of_the_gods),
    fill("Storeroom", 1, fills::storeroom),
    fill("Teleportation hub", 1, fills::teleportation_hub),
];

/// Build one theme room. Sets `themeroom_failed` when nothing could be
/// placed.
pub fn make_theme_room(ctx: &mut GenerationContext<'_>) {
    let options = ctx.options;
    let shape = match options.theme_override.as_deref() {
        Some(name) => by_name(SHAPES, name),
        None => select(SHAPES, ctx.rng, ctx.depth, None),
    };
    let shape = shape.unwrap_or_else(|| {
        tracing::warn!(depth = ctx.depth, "no eligible theme shape, using the default room");
        &SHAPES[0]
    });
    tracing::debug!(shape = shape.name, "theme shape selected");
    ctx.in_themerooms = true;
    ctx.themeroom_failed = false;
    (shape.run)(ctx);
    ctx.in_themerooms = false;
}

/// Give a themed room its contents. No eligible fill leaves it empty.
pub fn fill_theme_room(ctx: &mut GenerationContext<'_>, room: RoomId) {
    let options = ctx.options;
    let fill = match options.fill_override.as_deref() {
        Some(name) => by_name(FILLS, name),
        None => {
            let target = ctx.rooms[room].clone();
            select(FILLS, ctx.rng, ctx.difficulty(), Some(&target))
        }
    };
    let Some(fill) = fill else {
        tracing::warn!(room = room.0, "no eligible theme fill, leaving the room empty");
        return;
    };
    tracing::debug!(room = room.0, fill = fill.name, "theme fill selected");
    (fill.run)(ctx, room);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::RoomKind;

    fn noop(_: &mut GenerationContext<'_>) {}

    fn stub(freqs: &[u32]) -> Vec<ThemeShape> {
        const NAMES: [&str; 4] = ["A", "B", "C", "D"];
        freqs
            .iter()
            .zip(NAMES)
            .map(|(&f, name)| ThemeEntry::new(name, f, noop as ShapeFn))
            .collect()
    }

    #[test]
    fn test_reservoir_keeps_first_when_later_rolls_miss() {
        let entries = stub(&[1, 2, 7]);
        // rn2(1) = 0 keeps A, rn2(3) = 2 misses B, rn2(10) = 8 misses C
        let mut rng = RandomStream::scripted(vec![0, 2, 8]);
        let pick = select(&entries, &mut rng, 1, None).unwrap();
        assert_eq!(pick.name, "A");
        assert_eq!(rng.call_count(), 3);
    }

    #[test]
    fn test_reservoir_later_entries_replace() {
        let entries = stub(&[1, 2, 7]);
        let mut rng = RandomStream::scripted(vec![0, 1, 3]);
        assert_eq!(select(&entries, &mut rng, 1, None).unwrap().name, "C");
        let mut rng = RandomStream::scripted(vec![0, 0, 9]);
        assert_eq!(select(&entries, &mut rng, 1, None).unwrap().name, "B");
    }

    #[test]
    fn test_ineligible_entries_cost_nothing() {
        let mut entries = stub(&[1, 0, 7]);
        entries[2].min_depth = 5;
        let mut rng = RandomStream::scripted(vec![0]);
        assert_eq!(select(&entries, &mut rng, 1, None).unwrap().name, "A");
        assert_eq!(rng.call_count(), 1);
    }

    #[test]
    fn test_empty_candidates() {
        let entries = stub(&[0, 0]);
        let mut rng = RandomStream::new(1);
        assert!(select(&entries, &mut rng, 1, None).is_none());
        assert_eq!(rng.call_count(), 0);
    }

    #[test]
    fn test_predicate_only_with_room() {
        let garden = FILLS.iter().find(|f| f.name == "Garden").unwrap();
        let dark = Room::new(5, 5, 8, 8, RoomKind::Themed, false);
        let bright = Room::new(5, 5, 8, 8, RoomKind::Themed, true);
        assert!(garden.is_eligible(1, None));
        assert!(!garden.is_eligible(1, Some(&dark)));
        assert!(garden.is_eligible(1, Some(&bright)));
    }

    #[test]
    fn test_depth_limits() {
        let nest = FILLS.iter().find(|f| f.name == "Spider nest").unwrap();
        assert!(!nest.is_eligible(9, None));
        assert!(nest.is_eligible(10, None));
    }

    #[test]
    fn test_registry_names_unique() {
        for (i, a) in SHAPES.iter().enumerate() {
            assert!(SHAPES[i + 1..].iter().all(|b| b.name != a.name));
        }
        for (i, a) in FILLS.iter().enumerate() {
            assert!(FILLS[i + 1..].iter().all(|b| b.name != a.name));
        }
        assert_eq!(SHAPES[0].name, "default");
    }
}
