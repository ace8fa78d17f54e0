//! Irregular theme rooms stamped from small ASCII maps
//!
//! `-` and `|` are walls, `.` is floor, `x` leaves the cell untouched.

use crate::consts::{XLIM, YLIM};
use crate::dungeon::{wallify_region, CellFlags, CellType, GenerationContext, Lighting, Rect, RoomKind};

const L_SHAPED: &[&str] = &[
    "-----xxx",
    "|...|xxx",
    "|...|xxx",
    "|...----",
    "|......|",
    "|......|",
    "|......|",
    "--------",
];

const T_SHAPED: &[&str] = &[
    "xxx-----xxx",
    "xxx|...|xxx",
    "xxx|...|xxx",
    "----...----",
    "|.........|",
    "|.........|",
    "|.........|",
    "-----------",
];

const S_SHAPED: &[&str] = &[
    "-----xxx",
    "|...|xxx",
    "|...|xxx",
    "|...----",
    "|......|",
    "|......|",
    "|......|",
    "----...|",
    "xxx|...|",
    "xxx|...|",
    "xxx-----",
];

const CROSS: &[&str] = &[
    "xxx-----xxx",
    "xxx|...|xxx",
    "xxx|...|xxx",
    "----...----",
    "|.........|",
    "|.........|",
    "|.........|",
    "----...----",
    "xxx|...|xxx",
    "xxx|...|xxx",
    "xxx-----xxx",
];

pub fn l_shaped(ctx: &mut GenerationContext<'_>) {
    stamp_fragment(ctx, L_SHAPED);
}

pub fn t_shaped(ctx: &mut GenerationContext<'_>) {
    stamp_fragment(ctx, T_SHAPED);
}

pub fn s_shaped(ctx: &mut GenerationContext<'_>) {
    stamp_fragment(ctx, S_SHAPED);
}

pub fn cross(ctx: &mut GenerationContext<'_>) {
    stamp_fragment(ctx, CROSS);
}

/// Find a free spot for the map, stamp it, and turn its floor into a room.
fn stamp_fragment(ctx: &mut GenerationContext<'_>, map: &[&str]) {
    let Some((x0, y0)) = place_fragment(ctx, map) else {
        ctx.themeroom_failed = true;
        return;
    };
    for (dy, row) in map.iter().enumerate() {
        for (dx, ch) in row.chars().enumerate() {
            let (x, y) = (x0 + dx as i32, y0 + dy as i32);
            let typ = match ch {
                '-' => CellType::HWall,
                '|' => CellType::VWall,
                '.' => CellType::Room,
                _ => continue,
            };
            let cell = &mut ctx.grid[(x, y)];
            cell.typ = typ;
            cell.flags.insert(CellFlags::TOUCHED);
            if typ == CellType::HWall {
                cell.flags.insert(CellFlags::HORIZONTAL);
            }
        }
    }
    let (w, h) = fragment_size(map);
    wallify_region(&mut ctx.grid, Rect::new(x0, y0, x0 + w - 1, y0 + h - 1));

    let (kind, themed) = if ctx.rng.percent(30) {
        (RoomKind::Themed, true)
    } else {
        (RoomKind::Ordinary, false)
    };
    let lit = Lighting::Random.resolve(ctx.rng, ctx.depth);
    let Some(id) = ctx.flood_fill_room(x0 + 1, y0 + 1, kind, lit) else {
        ctx.themeroom_failed = true;
        return;
    };
    if themed {
        ctx.rooms[id].needs_fill = false;
        super::fill_theme_room(ctx, id);
    }
}

fn fragment_size(map: &[&str]) -> (i32, i32) {
    let w = map.iter().map(|r| r.len()).max().unwrap_or(0) as i32;
    (w, map.len() as i32)
}

/// Top-left corner for the map inside a random free rectangle, or `None`
/// when it does not fit with clearance. Claims the space on success.
fn place_fragment(ctx: &mut GenerationContext<'_>, map: &[&str]) -> Option<(i32, i32)> {
    let (fw, fh) = fragment_size(map);
    let (gw, gh) = (ctx.width(), ctx.height());
    let r1 = ctx.pool.pick_random(ctx.rng)?;
    let xborder = if r1.lx > 0 && r1.hx < gw - 1 { 2 * XLIM } else { XLIM + 1 };
    let yborder = if r1.ly > 0 && r1.hy < gh - 1 { 2 * YLIM } else { YLIM + 1 };
    let xspan = r1.hx - r1.lx - fw - xborder + 1;
    let yspan = r1.hy - r1.ly - fh - yborder + 1;
    if xspan <= 0 || yspan <= 0 {
        return None;
    }
    let x0 = r1.lx + if r1.lx > 0 { XLIM } else { 1 } + ctx.rng.rn2(xspan as u32) as i32;
    let y0 = r1.ly + if r1.ly > 0 { YLIM } else { 1 } + ctx.rng.rn2(yspan as u32) as i32;
    if x0 < 1 || y0 < 1 || x0 + fw > gw - 1 || y0 + fh > gh - 1 {
        return None;
    }
    let footprint = Rect::new(x0, y0, x0 + fw - 1, y0 + fh - 1);
    let clear = (footprint.lx - 1..=footprint.hx + 1)
        .all(|x| (footprint.ly - 1..=footprint.hy + 1).all(|y| ctx.grid.typ(x, y) == CellType::Stone));
    if !clear {
        return None;
    }
    let parent = ctx.pool.find_containing(&footprint)?;
    ctx.pool.split(parent, footprint);
    Some((x0, y0))
}
