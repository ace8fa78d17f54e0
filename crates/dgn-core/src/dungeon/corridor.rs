//! Corridor router
//!
//! Rooms are joined in four passes: neighbours in level order, every other
//! room, anything still disconnected, then a handful of optional extra
//! corridors ("nxcor") that may stop short and dead-end. `smeq` tracks which
//! rooms are already connected.

use super::cell::{CellType, DoorState};
use super::context::GenerationContext;
use super::room::RoomId;
use crate::services::{MonsterSpec, ObjectRequest};

/// Terrain a corridor may be dug through or reuse
fn diggable(typ: CellType) -> bool {
    matches!(typ, CellType::Stone | CellType::Corridor | CellType::SecretCorridor)
}

impl GenerationContext<'_> {
    /// Join all top-level rooms with corridors.
    pub fn make_corridors(&mut self) {
        let n = self.nroom();
        for a in 0..n.saturating_sub(1) {
            self.join(a, a + 1, false);
            if self.rng.rn2(50) == 0 {
                break;
            }
        }
        for a in 0..n.saturating_sub(2) {
            if self.smeq[a] != self.smeq[a + 2] {
                self.join(a, a + 2, false);
            }
        }
        let mut any = true;
        let mut a = 0;
        while any && a < n {
            any = false;
            for b in 0..n {
                if self.smeq[a] != self.smeq[b] {
                    self.join(a, b, false);
                    any = true;
                }
            }
            a += 1;
        }
        if n > 2 {
            let extra = self.rng.rn2(n as u32) + 4;
            for _ in 0..extra {
                let a = self.rng.rn2(n as u32) as usize;
                let mut b = self.rng.rn2(n as u32 - 2) as usize;
                if b >= a {
                    b += 2;
                }
                self.join(a, b, true);
            }
        }
        tracing::debug!(rooms = n, doors = self.doors.len(), "corridors dug");
    }

    /// Dig a corridor from top-level room `a` to room `b`.
    fn join(&mut self, a: usize, b: usize, nxcor: bool) {
        let (Some(ca), Some(cb)) = (self.top_room(a), self.top_room(b)) else {
            return;
        };
        let croom = self.rooms[ca].clone();
        let troom = self.rooms[cb].clone();
        if !croom.needs_joining || !troom.needs_joining || self.doors_full() {
            return;
        }

        let (dx, dy, dd, tt);
        if troom.lx > croom.hx {
            (dx, dy) = (1, 0);
            dd = self.finddpos(croom.hx + 1, croom.ly, croom.hx + 1, croom.hy);
            tt = self.finddpos(troom.lx - 1, troom.ly, troom.lx - 1, troom.hy);
        } else if troom.hy < croom.ly {
            (dx, dy) = (0, -1);
            dd = self.finddpos(croom.lx, croom.ly - 1, croom.hx, croom.ly - 1);
            tt = self.finddpos(troom.lx, troom.hy + 1, troom.hx, troom.hy + 1);
        } else if troom.hx < croom.lx {
            (dx, dy) = (-1, 0);
            dd = self.finddpos(croom.lx - 1, croom.ly, croom.lx - 1, croom.hy);
            tt = self.finddpos(troom.hx + 1, troom.ly, troom.hx + 1, troom.hy);
        } else {
            (dx, dy) = (0, 1);
            dd = self.finddpos(croom.lx, croom.hy + 1, croom.hx, croom.hy + 1);
            tt = self.finddpos(troom.lx, troom.ly - 1, troom.hx, troom.ly - 1);
        }

        let (xx, yy) = dd;
        let (tx, ty) = (tt.0 - dx, tt.1 - dy);
        if nxcor && self.grid.typ(xx + dx, yy + dy) != CellType::Stone {
            return;
        }
        if self.okdoor(xx, yy) || !nxcor {
            self.dodoor(xx, yy, ca);
        }
        if !self.dig_corridor((xx + dx, yy + dy), (tx, ty), nxcor) {
            return;
        }
        if self.okdoor(tt.0, tt.1) || !nxcor {
            self.dodoor(tt.0, tt.1, cb);
        }

        if self.smeq[a] < self.smeq[b] {
            self.smeq[b] = self.smeq[a];
        } else {
            self.smeq[a] = self.smeq[b];
        }
    }

    /// Pick a door position on the wall segment `(xl, yl)-(xh, yh)`: a
    /// random spot if it takes a door, else the first spot that does, else
    /// an existing door, else the segment's bottom-left end.
    pub fn finddpos(&mut self, xl: i32, yl: i32, xh: i32, yh: i32) -> (i32, i32) {
        let x = self.rng.rn1((xh - xl + 1).max(0) as u32, xl);
        let y = self.rng.rn1((yh - yl + 1).max(0) as u32, yl);
        if self.okdoor(x, y) {
            return (x, y);
        }
        for x in xl..=xh {
            for y in yl..=yh {
                if self.okdoor(x, y) {
                    return (x, y);
                }
            }
        }
        for x in xl..=xh {
            for y in yl..=yh {
                if self.grid.typ(x, y).is_door() {
                    return (x, y);
                }
            }
        }
        (xl, yh)
    }

    /// A door that is secret one time in eight
    pub fn dodoor(&mut self, x: i32, y: i32, room: RoomId) {
        if self.doors_full() {
            tracing::debug!(x, y, "door limit reached");
            return;
        }
        let typ = if self.rng.rn2(8) != 0 { CellType::Door } else { CellType::SecretDoor };
        self.dosdoor(x, y, room, typ);
    }

    /// Turn `(x, y)` into a door of `typ` and roll its state.
    pub fn dosdoor(&mut self, x: i32, y: i32, room: RoomId, typ: CellType) {
        let shop_door = self.rooms[room].kind.is_shop();
        let difficulty = self.difficulty();
        let typ = if self.grid.typ(x, y).is_wall() { typ } else { CellType::Door };

        let mut state;
        if typ == CellType::Door {
            if self.rng.rn2(3) == 0 {
                state = if self.rng.rn2(5) == 0 {
                    DoorState::OPEN
                } else if self.rng.rn2(6) == 0 {
                    DoorState::LOCKED
                } else {
                    DoorState::CLOSED
                };
                if state != DoorState::OPEN && !shop_door && difficulty >= 5 && self.rng.rn2(25) == 0 {
                    state |= DoorState::TRAPPED;
                }
            } else {
                state = if shop_door { DoorState::OPEN } else { DoorState::NO_DOOR };
            }
            if state.contains(DoorState::TRAPPED) && difficulty >= 9 && self.rng.rn2(5) == 0 {
                state = DoorState::NO_DOOR;
                self.make_monster(MonsterSpec::of_class('m', x, y, difficulty));
            }
        } else {
            state = if shop_door || self.rng.rn2(5) == 0 {
                DoorState::LOCKED
            } else {
                DoorState::CLOSED
            };
            if !shop_door && difficulty >= 4 && self.rng.rn2(20) == 0 {
                state |= DoorState::TRAPPED;
            }
        }

        let cell = &mut self.grid[(x, y)];
        cell.typ = typ;
        cell.set_door_state(state);
        self.add_door(x, y, room);
    }

    /// Dig from `org` towards `dest`, jogging at random so corridors are not
    /// straight lines. Returns `false` if the walk hits something it cannot
    /// dig through, leaves the map, runs too long, or (for optional
    /// corridors) gives up early; cells dug so far stay dug.
    pub fn dig_corridor(&mut self, org: (i32, i32), dest: (i32, i32), nxcor: bool) -> bool {
        let (w, h) = (self.width(), self.height());
        let opts = self.options.corridor.clone();
        let (mut xx, mut yy) = org;
        let (tx, ty) = dest;
        if xx <= 0 || yy <= 0 || tx <= 0 || ty <= 0 || xx > w - 1 || tx > w - 1 || yy > h - 1 || ty > h - 1 {
            tracing::debug!(?org, ?dest, "corridor endpoints off the map");
            return false;
        }

        let (mut dx, mut dy) = if tx > xx {
            (1, 0)
        } else if ty > yy {
            (0, 1)
        } else if tx < xx {
            (-1, 0)
        } else {
            (0, -1)
        };
        xx -= dx;
        yy -= dy;

        let mut steps = 0;
        while xx != tx || yy != ty {
            steps += 1;
            if steps > opts.max_steps + 1 || (nxcor && self.rng.rn2(opts.nxcor_abort_chance) == 0) {
                return false;
            }
            xx += dx;
            yy += dy;
            if xx >= w - 1 || xx <= 0 || yy <= 0 || yy >= h - 1 {
                return false;
            }

            match self.grid.typ(xx, yy) {
                CellType::Stone => {
                    if self.rng.rn2(opts.secret_corridor_chance) != 0 {
                        self.grid.set_typ(xx, yy, CellType::Corridor);
                        if nxcor && self.rng.rn2(opts.boulder_chance) == 0 {
                            self.make_object(ObjectRequest::named("boulder", xx, yy));
                        }
                    } else {
                        self.grid.set_typ(xx, yy, CellType::SecretCorridor);
                    }
                }
                CellType::Corridor | CellType::SecretCorridor => {}
                _ => return false,
            }

            let mut dix = (xx - tx).abs();
            let mut diy = (yy - ty).abs();
            if dix > diy && diy != 0 && self.rng.rn2((dix - diy + 1) as u32) == 0 {
                dix = 0;
            } else if diy > dix && dix != 0 && self.rng.rn2((diy - dix + 1) as u32) == 0 {
                diy = 0;
            }

            if dy != 0 && dix > diy {
                let ddx = if xx > tx { -1 } else { 1 };
                if diggable(self.grid.typ(xx + ddx, yy)) {
                    (dx, dy) = (ddx, 0);
                    continue;
                }
            } else if dx != 0 && diy > dix {
                let ddy = if yy > ty { -1 } else { 1 };
                if diggable(self.grid.typ(xx, yy + ddy)) {
                    (dx, dy) = (0, ddy);
                    continue;
                }
            }

            if diggable(self.grid.typ(xx + dx, yy + dy)) {
                continue;
            }
            if dx != 0 {
                (dx, dy) = (0, if ty < yy { -1 } else { 1 });
            } else {
                (dx, dy) = (if tx < xx { -1 } else { 1 }, 0);
            }
            if diggable(self.grid.typ(xx + dx, yy + dy)) {
                continue;
            }
            (dx, dy) = (-dx, -dy);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::test_support::*;
    use super::*;

    #[test]
    fn test_dig_straight_corridor() {
        with_context(2, 1, |ctx| {
            assert!(ctx.dig_corridor((5, 5), (15, 5), false));
            for x in 5..=15 {
                assert!(matches!(ctx.grid.typ(x, 5), CellType::Corridor | CellType::SecretCorridor));
            }
        });
    }

    #[test]
    fn test_dig_reaches_diagonal_target() {
        for seed in 0..10 {
            with_context(seed, 1, |ctx| {
                assert!(ctx.dig_corridor((3, 3), (30, 15), false));
                assert!(diggable(ctx.grid.typ(30, 15)));
                assert_ne!(ctx.grid.typ(30, 15), CellType::Stone);
            });
        }
    }

    #[test]
    fn test_dig_rejects_off_map() {
        with_context(2, 1, |ctx| {
            assert!(!ctx.dig_corridor((0, 5), (10, 5), false));
            assert!(!ctx.dig_corridor((5, 5), (80, 5), false));
        });
    }

    #[test]
    fn test_dig_never_breaks_walls() {
        with_context(2, 1, |ctx| {
            stamp_room(ctx, 10, 3, 12, 7);
            let ok = ctx.dig_corridor((5, 5), (11, 5), false);
            assert!(!ok, "the target is inside a walled room");
            assert_eq!(ctx.grid.typ(9, 5), CellType::VWall);
            assert_eq!(ctx.grid.typ(11, 5), CellType::Room);
        });
    }

    #[test]
    fn test_finddpos_prefers_ok_spots() {
        with_context(5, 1, |ctx| {
            stamp_room(ctx, 10, 5, 14, 8);
            let (x, y) = ctx.finddpos(10, 4, 14, 4);
            assert_eq!(y, 4);
            assert!((10..=14).contains(&x));
            assert!(ctx.okdoor(x, y));
        });
    }

    #[test]
    fn test_finddpos_fallback() {
        with_context(5, 1, |ctx| {
            // nothing but stone: bottom-left end
            assert_eq!(ctx.finddpos(3, 3, 3, 6), (3, 6));
        });
    }

    #[test]
    fn test_join_two_rooms() {
        with_context(8, 1, |ctx| {
            stamp_room(ctx, 5, 5, 9, 8);
            stamp_room(ctx, 30, 6, 35, 9);
            ctx.join(0, 1, false);
            assert_eq!(ctx.room(RoomId(0)).door_count(), 1);
            let (x, y) = ctx.room(RoomId(0)).doors[0];
            assert_eq!(x, 10);
            assert!(ctx.grid.typ(x, y).is_door());
            if ctx.room(RoomId(1)).door_count() == 1 {
                assert_eq!(ctx.smeq[0], ctx.smeq[1]);
            }
        });
    }

    #[test]
    fn test_make_corridors_connects_everything() {
        with_context(21, 1, |ctx| {
            stamp_room(ctx, 3, 3, 8, 6);
            stamp_room(ctx, 20, 10, 26, 14);
            stamp_room(ctx, 40, 2, 45, 5);
            stamp_room(ctx, 60, 12, 70, 16);
            ctx.make_corridors();
            assert!(ctx.smeq.iter().all(|&s| s == ctx.smeq[0]));
            assert!(ctx.grid.count_typ(CellType::Corridor) > 0);
        });
    }

    #[test]
    fn test_secret_door_state() {
        with_context(4, 5, |ctx| {
            let id = stamp_room(ctx, 10, 5, 14, 8);
            ctx.dosdoor(12, 4, id, CellType::SecretDoor);
            assert_eq!(ctx.grid.typ(12, 4), CellType::SecretDoor);
            let state = ctx.grid[(12, 4)].door_state();
            assert!(state.intersects(DoorState::LOCKED | DoorState::CLOSED));
            // an existing door stays a regular door
            ctx.dosdoor(12, 4, id, CellType::SecretDoor);
            assert_eq!(ctx.grid.typ(12, 4), CellType::Door);
        });
    }
}
