//! Room placement and stamping
//!
//! `create_room` looks for space for one room, claims it from the rectangle
//! pool and stamps walls and floor onto the grid. Vaults only reserve their
//! spot here; they are built after corridors are dug.

use super::cell::{CellFlags, CellType, DoorState};
use super::context::{BuildState, GenerationContext};
use super::rect::Rect;
use super::room::{Lighting, Room, RoomId, RoomKind};
use super::wallify::wallify_region;
use crate::consts::{ROOM_PLACEMENT_TRIES, XLIM, YLIM};

/// Horizontal/vertical alignment inside a grid-fifth cell
pub const ALIGN_LEFT: i32 = 1;
pub const ALIGN_CENTER: i32 = 3;
pub const ALIGN_RIGHT: i32 = 5;

/// What a caller wants placed. `None` fields are rolled at placement time;
/// a request with no position, size or alignment takes the fully random
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomRequest {
    pub kind: RoomKind,
    pub lighting: Lighting,
    /// Grid-fifth cell, each coordinate in `1..=5`
    pub pos: Option<(i32, i32)>,
    /// Floor width and height
    pub size: Option<(i32, i32)>,
    /// Alignment inside the grid-fifth cell
    pub align: Option<(i32, i32)>,
    pub filled: bool,
}

impl RoomRequest {
    pub fn random(kind: RoomKind) -> Self {
        Self {
            kind,
            lighting: Lighting::Random,
            pos: None,
            size: None,
            align: None,
            filled: true,
        }
    }

    pub fn vault() -> Self {
        Self {
            filled: false,
            ..Self::random(RoomKind::Vault)
        }
    }

    pub fn sized(kind: RoomKind, w: i32, h: i32) -> Self {
        Self {
            size: Some((w, h)),
            ..Self::random(kind)
        }
    }

    pub fn lit(mut self, lighting: Lighting) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn unfilled(mut self) -> Self {
        self.filled = false;
        self
    }
}

/// Outcome of a successful `create_room`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Room(RoomId),
    /// Vault spot reserved; floor top-left corner
    VaultSite { x: i32, y: i32 },
    /// Space was claimed but the build roll failed
    Discarded,
}

const fn limits(vault: bool) -> (i32, i32) {
    if vault { (XLIM + 1, YLIM + 1) } else { (XLIM, YLIM) }
}

impl GenerationContext<'_> {
    /// Check the clearance around a candidate floor box, shrinking it away
    /// from anything already built. Each collision costs one `rn2(3)`, and
    /// one time in three gives up outright. Returns the adjusted
    /// `(lowx, ddx, lowy, ddy)`.
    pub fn check_room(&mut self, lowx: i32, ddx: i32, lowy: i32, ddy: i32, vault: bool) -> Option<(i32, i32, i32, i32)> {
        let (xlim, ylim) = limits(vault);
        let (w, h) = (self.width(), self.height());
        let mut hix = lowx + ddx;
        let mut hiy = lowy + ddy;
        let mut lowx = lowx.max(3);
        let mut lowy = lowy.max(2);
        hix = hix.min(w - 3);
        hiy = hiy.min(h - 3);

        'chk: loop {
            if hix <= lowx || hiy <= lowy {
                return None;
            }
            for x in lowx - xlim..=hix + xlim {
                if x <= 0 || x >= w {
                    continue;
                }
                let ymin = (lowy - ylim).max(0);
                let ymax = (hiy + ylim).min(h - 1);
                for y in ymin..=ymax {
                    if self.grid.typ(x, y) == CellType::Stone {
                        continue;
                    }
                    if self.rng.rn2(3) == 0 || self.in_themerooms {
                        return None;
                    }
                    if x < lowx {
                        lowx = x + xlim + 1;
                    } else {
                        hix = x - xlim - 1;
                    }
                    if y < lowy {
                        lowy = y + ylim + 1;
                    } else {
                        hiy = y - ylim - 1;
                    }
                    continue 'chk;
                }
            }
            return Some((lowx, hix - lowx, lowy, hiy - lowy));
        }
    }

    /// Place one top-level room (or reserve the vault spot).
    pub fn create_room(&mut self, req: RoomRequest) -> Option<Placement> {
        let vault = req.kind == RoomKind::Vault;
        let (xlim, ylim) = limits(vault);
        let (gw, gh) = (self.width(), self.height());
        let lit = req.lighting.resolve(self.rng, self.depth);
        let fully_random = vault || (req.pos.is_none() && req.size.is_none() && req.align.is_none());

        let mut found = None;
        for _ in 0..=ROOM_PLACEMENT_TRIES {
            self.transition(BuildState::AttemptingPlacement);
            let (xabs, yabs, wtmp, htmp, r2) = if fully_random {
                let r1 = self.pool.pick_random(self.rng)?;
                let (lx, ly, hx, hy) = (r1.lx, r1.ly, r1.hx, r1.hy);
                let (dx, mut dy) = if vault {
                    (1, 1)
                } else {
                    let dx = 2 + self.rng.rn2(if hx - lx > 28 { 12 } else { 8 }) as i32;
                    let mut dy = 2 + self.rng.rn2(4) as i32;
                    if dx * dy > 50 {
                        dy = 50 / dx;
                    }
                    (dx, dy)
                };
                let xborder = if lx > 0 && hx < gw - 1 { 2 * xlim } else { xlim + 1 };
                let yborder = if ly > 0 && hy < gh - 1 { 2 * ylim } else { ylim + 1 };
                if hx - lx < dx + 3 + xborder || hy - ly < dy + 3 + yborder {
                    continue;
                }
                let xoff = if lx > 0 { xlim } else { 3 };
                let xspan = hx - if lx > 0 { lx } else { 3 } - dx - xborder + 1;
                let xabs = lx + xoff + self.rng.rn2(xspan.max(0) as u32) as i32;
                let yoff = if ly > 0 { ylim } else { 2 };
                let yspan = hy - if ly > 0 { ly } else { 2 } - dy - yborder + 1;
                let mut yabs = ly + yoff + self.rng.rn2(yspan.max(0) as u32) as i32;
                let nroom = self.nroom();
                if ly == 0 && hy >= gh - 1 && (nroom == 0 || self.rng.rn2(nroom as u32) == 0) && yabs + dy > gh / 2 {
                    yabs = self.rng.rn1(3, 2);
                    if nroom < 4 && dy > 1 {
                        dy -= 1;
                    }
                }
                let Some((xabs, dx, yabs, dy)) = self.check_room(xabs, dx, yabs, dy, vault) else {
                    continue;
                };
                if !vault && (dx < 2 || dy < 2) {
                    continue;
                }
                let (wtmp, htmp) = (dx + 1, dy + 1);
                let r2 = Rect::new(xabs - 1, yabs - 1, xabs + wtmp, yabs + htmp);
                (xabs, yabs, wtmp, htmp, r2)
            } else {
                let rndpos = req.pos.is_none();
                let (xtmp, ytmp) = match req.pos {
                    Some(p) => p,
                    None => (self.rng.rnd(5) as i32, self.rng.rnd(5) as i32),
                };
                let (wtmp, htmp) = match req.size {
                    Some(s) => s,
                    None => (self.rng.rn1(15, 3), self.rng.rn1(8, 2)),
                };
                let xal = req.align.map_or_else(|| self.rng.rnd(3) as i32, |a| a.0);
                let yal = req.align.map_or_else(|| self.rng.rnd(3) as i32, |a| a.1);
                let mut xabs = ((xtmp - 1) * gw) / 5 + 1;
                let mut yabs = ((ytmp - 1) * gh) / 5 + 1;
                match xal {
                    ALIGN_RIGHT => xabs += gw / 5 - wtmp,
                    ALIGN_CENTER => xabs += (gw / 5 - wtmp) / 2,
                    _ => {}
                }
                match yal {
                    ALIGN_RIGHT => yabs += gh / 5 - htmp,
                    ALIGN_CENTER => yabs += (gh / 5 - htmp) / 2,
                    _ => {}
                }
                if xabs + wtmp - 1 > gw - 2 {
                    xabs = gw - wtmp - 3;
                }
                if xabs < 2 {
                    xabs = 2;
                }
                if yabs + htmp - 1 > gh - 2 {
                    yabs = gh - htmp - 3;
                }
                if yabs < 2 {
                    yabs = 2;
                }
                let extra = i32::from(rndpos);
                let r2 = Rect::new(xabs - 1, yabs - 1, xabs + wtmp + extra, yabs + htmp + extra);
                (xabs, yabs, wtmp, htmp, r2)
            };
            if let Some(r1) = self.pool.find_containing(&r2) {
                found = Some((r1, r2, xabs, yabs, wtmp, htmp));
                break;
            }
        }

        let Some((r1, r2, xabs, yabs, wtmp, htmp)) = found else {
            tracing::debug!(kind = %req.kind, tries = ROOM_PLACEMENT_TRIES + 1, "no space for room");
            self.transition(BuildState::Rejected);
            return None;
        };
        self.pool.split(r1, r2);

        if vault {
            self.vault_pos = Some((xabs, yabs));
            return Some(Placement::VaultSite { x: xabs, y: yabs });
        }
        if req.kind == RoomKind::Ordinary && self.rng.rn2(100) >= self.options.ordinary_room_chance {
            tracing::debug!(x = xabs, y = yabs, "room discarded by build roll");
            self.transition(BuildState::Rejected);
            return Some(Placement::Discarded);
        }
        let id = self.add_room(xabs, yabs, xabs + wtmp - 1, yabs + htmp - 1, lit, req.kind, false);
        self.rooms[id].needs_fill = req.filled;
        Some(Placement::Room(id))
    }

    /// Reserve a vault spot.
    pub fn create_vault(&mut self) -> bool {
        matches!(self.create_room(RoomRequest::vault()), Some(Placement::VaultSite { .. }))
    }

    /// Stamp and register a top-level room.
    #[allow(clippy::too_many_arguments)]
    pub fn add_room(&mut self, lx: i32, ly: i32, hx: i32, hy: i32, lit: bool, kind: RoomKind, special: bool) -> RoomId {
        let id = self.rooms.push(Room::new(lx, ly, hx, hy, kind, lit));
        self.smeq.push(self.smeq.len());
        self.do_room_or_subroom(id, special);
        self.topologize(id);
        self.transition(BuildState::Committed);
        let r = &self.rooms[id];
        tracing::debug!(room = id.0, kind = %kind, lx = r.lx, ly = r.ly, hx = r.hx, hy = r.hy, lit, "room committed");
        id
    }

    /// Stamp and register a subroom inside `parent`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_subroom(&mut self, parent: RoomId, lx: i32, ly: i32, hx: i32, hy: i32, lit: bool, kind: RoomKind) -> RoomId {
        let id = self.rooms.push_subroom(parent, Room::new(lx, ly, hx, hy, kind, lit));
        self.rooms[id].needs_joining = false;
        self.do_room_or_subroom(id, false);
        self.topologize(id);
        id
    }

    fn do_room_or_subroom(&mut self, id: RoomId, special: bool) {
        let (w, h) = (self.width(), self.height());
        let room = &mut self.rooms[id];
        room.lx = room.lx.max(1);
        room.ly = room.ly.max(1);
        room.hx = room.hx.min(w - 2);
        room.hy = room.hy.min(h - 2);
        let (lowx, lowy, hix, hiy, lit) = (room.lx, room.ly, room.hx, room.hy, room.lit);
        let is_subroom = room.is_subroom();

        if lit {
            for x in lowx - 1..=hix + 1 {
                for y in (lowy - 1).max(0)..=hiy + 1 {
                    if let Some(c) = self.grid.get_mut(x, y) {
                        c.lit = true;
                    }
                }
            }
        }
        if special {
            return;
        }
        for x in lowx - 1..=hix + 1 {
            for y in [lowy - 1, hiy + 1] {
                if let Some(c) = self.grid.get_mut(x, y) {
                    c.typ = CellType::HWall;
                    c.flags.insert(CellFlags::HORIZONTAL);
                }
            }
        }
        for x in [lowx - 1, hix + 1] {
            for y in lowy..=hiy {
                if let Some(c) = self.grid.get_mut(x, y) {
                    c.typ = CellType::VWall;
                    c.flags.remove(CellFlags::HORIZONTAL);
                }
            }
        }
        for x in lowx..=hix {
            for y in lowy..=hiy {
                self.grid.set_typ(x, y, CellType::Room);
            }
        }
        if is_subroom {
            wallify_region(&mut self.grid, Rect::new(lowx - 1, lowy - 1, hix + 1, hiy + 1));
        } else {
            self.grid.set_typ(lowx - 1, lowy - 1, CellType::TLCorner);
            self.grid.set_typ(hix + 1, lowy - 1, CellType::TRCorner);
            self.grid.set_typ(lowx - 1, hiy + 1, CellType::BLCorner);
            self.grid.set_typ(hix + 1, hiy + 1, CellType::BRCorner);
        }
    }

    /// Place a subroom inside `parent`. Offsets are relative to the
    /// parent's floor; `None` values are rolled.
    pub fn create_subroom(
        &mut self,
        parent: RoomId,
        pos: Option<(i32, i32)>,
        size: Option<(i32, i32)>,
        kind: RoomKind,
        lighting: Lighting,
        filled: bool,
    ) -> Option<RoomId> {
        let proom = &self.rooms[parent];
        let (plx, ply) = (proom.lx, proom.ly);
        let width = proom.width();
        let height = proom.height();
        if width < 4 || height < 4 {
            return None;
        }
        let (w, h) = match size {
            Some(s) => s,
            None => (self.rng.rnd((width - 3) as u32) as i32, self.rng.rnd((height - 3) as u32) as i32),
        };
        let (mut x, mut y) = match pos {
            Some(p) => p,
            None => (
                self.rng.rnd((width - w - 1).max(0) as u32) as i32 - 1,
                self.rng.rnd((height - h - 1).max(0) as u32) as i32 - 1,
            ),
        };
        if x == 1 {
            x = 0;
        }
        if y == 1 {
            y = 0;
        }
        if x + w + 1 == width {
            x += 1;
        }
        if y + h + 1 == height {
            y += 1;
        }
        x = x.max(0);
        y = y.max(0);
        if x + w - 1 >= width || y + h - 1 >= height {
            return None;
        }
        let lit = lighting.resolve(self.rng, self.depth);
        let id = self.add_subroom(parent, plx + x, ply + y, plx + x + w - 1, ply + y + h - 1, lit, kind);
        self.rooms[id].needs_fill = filled;
        Some(id)
    }

    /// Random door state as authored doors roll it
    pub fn random_door_state(&mut self) -> DoorState {
        match self.rng.rn2(5) {
            0 => DoorState::NO_DOOR,
            1 => DoorState::BROKEN,
            2 => DoorState::OPEN,
            3 => DoorState::CLOSED,
            _ => DoorState::LOCKED,
        }
    }

    /// Put a door with a random state on a random wall of `room`.
    pub fn create_door(&mut self, room: RoomId) -> Option<(i32, i32)> {
        let state = self.random_door_state();
        let r = self.rooms[room].clone();
        let mut spot = None;
        for _ in 0..20 {
            let (x, y) = match self.rng.rn2(4) {
                0 => (r.somex(self.rng), r.ly - 1),
                1 => (r.somex(self.rng), r.hy + 1),
                2 => (r.lx - 1, r.somey(self.rng)),
                _ => (r.hx + 1, r.somey(self.rng)),
            };
            spot = Some((x, y));
            if self.okdoor(x, y) {
                break;
            }
        }
        let (x, y) = spot?;
        if !matches!(self.grid.typ(x, y), CellType::HWall | CellType::VWall | CellType::Door) {
            return None;
        }
        let cell = &mut self.grid[(x, y)];
        cell.typ = CellType::Door;
        cell.set_door_state(state);
        self.add_door(x, y, room);
        Some((x, y))
    }

    /// Flood-fill the floor reachable from `(x, y)` into a new irregular
    /// room. Walls touching the floor become its edge. Returns `None` when
    /// the seed is not floor.
    pub fn flood_fill_room(&mut self, x: i32, y: i32, kind: RoomKind, lit: bool) -> Option<RoomId> {
        if !self.grid.typ(x, y).is_room_floor() {
            return None;
        }
        let id = self.rooms.push(Room::new(x, y, x, y, kind, lit));
        let mut stack = vec![(x, y)];
        let (mut lx, mut ly, mut hx, mut hy) = (x, y, x, y);
        while let Some((cx, cy)) = stack.pop() {
            let Some(cell) = self.grid.get_mut(cx, cy) else { continue };
            if cell.room == Some(id) || !cell.typ.is_room_floor() {
                continue;
            }
            cell.room = Some(id);
            cell.lit = lit;
            (lx, ly, hx, hy) = (lx.min(cx), ly.min(cy), hx.max(cx), hy.max(cy));
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let (nx, ny) = (cx + dx, cy + dy);
                    let Some(n) = self.grid.get_mut(nx, ny) else { continue };
                    if n.typ.is_wall() || n.typ.is_door() {
                        n.flags.insert(CellFlags::EDGE);
                        n.lit = lit;
                        if n.room.is_none() {
                            n.room = Some(id);
                        }
                    } else if n.typ.is_room_floor() && n.room != Some(id) && dx * dy == 0 {
                        stack.push((nx, ny));
                    }
                }
            }
        }
        let room = &mut self.rooms[id];
        (room.lx, room.ly, room.hx, room.hy) = (lx, ly, hx, hy);
        room.irregular = true;
        self.smeq.push(self.smeq.len());
        self.transition(BuildState::Committed);
        tracing::debug!(room = id.0, kind = %kind, lx, ly, hx, hy, "irregular room committed");
        Some(id)
    }
}
