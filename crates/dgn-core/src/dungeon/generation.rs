//! Level generation pipeline
//!
//! Rooms are placed until the target count is reached, the free-space pool
//! runs dry, or theme placement keeps failing. The rest of the level is then
//! built around them in a fixed order: stairs, corridors, niches, the vault,
//! special rooms, room contents, wallification and deferred callbacks.

use super::cell::CellType;
use super::context::{BuildState, GenerationContext};
use super::create::RoomRequest;
use super::level::{Stairway, TrapKind};
use super::room::{RoomId, RoomKind};
use super::wallify::wallify;
use crate::consts::VAULT_MIN_ROOMS;
use crate::error::{GenError, Result};
use crate::postprocess;
use crate::themes;

/// Rooms a level needs before it may hold a shop
const SHOP_ROOM_THRESHOLD: usize = 3;

impl GenerationContext<'_> {
    /// Run the whole pipeline on a fresh context.
    pub fn generate(&mut self) -> Result<()> {
        self.make_rooms();

        let remap = self.rooms.sort_by_left_edge();
        self.remap_rooms(&remap);
        self.smeq = (0..self.nroom()).collect();
        tracing::debug!(rooms = self.nroom(), rng_steps = self.rng.call_count(), "rooms placed");

        self.make_stairs();
        self.make_corridors();
        if self.options.allow_niches {
            self.make_niches();
        }

        let mut room_threshold = SHOP_ROOM_THRESHOLD;
        if self.make_vault() {
            room_threshold += 1;
        }
        if self.options.allow_special_rooms {
            self.make_special_rooms(room_threshold);
        }
        self.fill_rooms();

        let passes = wallify(&mut self.grid);
        tracing::debug!(passes, "level wallified");
        postprocess::drain(self);

        self.pool.validate()?;
        self.validate_rooms()?;
        tracing::debug!(
            rooms = self.rooms.len(),
            doors = self.doors.len(),
            objects = self.objects.len(),
            monsters = self.monsters.len(),
            rng_steps = self.rng.call_count(),
            "level generated"
        );
        Ok(())
    }

    /// Place rooms until the target is met or no more fit.
    pub fn make_rooms(&mut self) {
        let options = self.options;
        let mut tried_vault = false;
        let mut failed_themes = 0;
        self.transition(BuildState::Idle);

        // A reserved vault site counts toward the target
        while self.nroom() + usize::from(self.vault_pos.is_some()) < options.target_rooms {
            if self.pool.pick_random(self.rng).is_none() {
                tracing::debug!(rooms = self.nroom(), "free space exhausted");
                break;
            }
            if options.allow_vaults && self.nroom() >= VAULT_MIN_ROOMS && self.rng.rn2(2) != 0 && !tried_vault {
                tried_vault = true;
                if self.create_vault() {
                    tracing::debug!(pos = ?self.vault_pos, "vault site reserved");
                }
            } else if options.allow_themes {
                themes::make_theme_room(self);
                if self.themeroom_failed {
                    let previous = failed_themes;
                    failed_themes += 1;
                    if previous > options.max_failed_attempts || self.nroom() >= VAULT_MIN_ROOMS {
                        tracing::debug!(failed_themes, rooms = self.nroom(), "theme placement gave up");
                        break;
                    }
                }
            } else if self.create_room(RoomRequest::random(RoomKind::Ordinary)).is_none() {
                break;
            }
        }
        self.transition(BuildState::Converged);
    }

    /// Rooms stairs may go in: joined to the rest of the level
    fn stair_rooms(&self) -> Vec<RoomId> {
        self.rooms
            .top_level()
            .into_iter()
            .filter(|&id| {
                let r = &self.rooms[id];
                r.needs_joining && r.kind != RoomKind::Vault
            })
            .collect()
    }

    fn free_spot(&mut self, id: RoomId) -> Option<(i32, i32)> {
        for _ in 0..100 {
            let (x, y) = self.somexy(id)?;
            if !self.occupied(x, y) {
                return Some((x, y));
            }
        }
        None
    }

    fn make_staircase(&mut self, x: i32, y: i32, up: bool) {
        self.grid.set_typ(x, y, CellType::Stairs);
        self.stairs.push(Stairway { x, y, up });
    }

    /// Down stairs in a random room, up stairs in a different one when
    /// there is more than one.
    pub fn make_stairs(&mut self) {
        let rooms = self.stair_rooms();
        let n = rooms.len();
        if n == 0 {
            tracing::warn!("no room to hold stairs");
            return;
        }
        let down = self.rng.rn2(n as u32) as usize;
        if let Some((x, y)) = self.free_spot(rooms[down]) {
            self.make_staircase(x, y, false);
        }
        let mut up = down;
        if n > 1 {
            up = self.rng.rn2(n as u32 - 1) as usize;
            if up == down {
                up += 1;
            }
        }
        if let Some((x, y)) = self.free_spot(rooms[up]) {
            self.make_staircase(x, y, true);
        }
    }

    /// Turn the reserved vault site into a closed, gold-filled 2x2 room.
    /// Returns whether a vault was built.
    pub fn make_vault(&mut self) -> bool {
        let Some((mut vx, mut vy)) = self.vault_pos else {
            return false;
        };
        let mut site = self.check_room(vx, 1, vy, 1, true);
        if site.is_none()
            && self.pool.pick_random(self.rng).is_some()
            && self.create_vault()
            && let Some(pos) = self.vault_pos
        {
            (vx, vy) = pos;
            site = self.check_room(vx, 1, vy, 1, true);
        }
        let Some((lx, w, ly, h)) = site else {
            tracing::debug!(x = vx, y = vy, "vault site blocked");
            self.vault_pos = None;
            return false;
        };

        let id = self.add_room(lx, ly, lx + w, ly + h, true, RoomKind::Vault, false);
        let vault = &mut self.rooms[id];
        vault.needs_joining = false;
        vault.needs_fill = false;
        let vault = vault.clone();
        self.flags.has_vault = true;

        let per_cell = (self.depth.unsigned_abs() * 100).max(1);
        for x in vault.lx..=vault.hx {
            for y in vault.ly..=vault.hy {
                let amount = self.rng.rn1(per_cell, 51);
                self.make_gold(amount as u32, x, y);
            }
        }
        if self.rng.one_in(3) {
            self.make_niche(Some(TrapKind::Teleport));
        }
        tracing::debug!(room = id.0, lx = vault.lx, ly = vault.ly, "vault built");
        true
    }

    /// Every room must leave a wall margin inside the grid.
    pub fn validate_rooms(&self) -> Result<()> {
        let (w, h) = (self.width(), self.height());
        for (id, r) in self.rooms.iter() {
            if r.lx < 1 || r.ly < 1 || r.hx > w - 2 || r.hy > h - 2 {
                return Err(GenError::RoomOutOfBounds {
                    room: id,
                    lx: r.lx,
                    ly: r.ly,
                    hx: r.hx,
                    hy: r.hy,
                    width: w,
                    height: h,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::test_support::*;
    use super::*;

    #[test]
    fn test_make_rooms_converges() {
        with_context(42, 1, |ctx| {
            ctx.make_rooms();
            assert_eq!(ctx.state(), BuildState::Converged);
            assert!((1..=10).contains(&ctx.nroom()));
        });
    }

    #[test]
    fn test_reserved_vault_counts_toward_target() {
        for seed in 0..200 {
            with_context(seed, 10, |ctx| {
                ctx.make_rooms();
                let reserved = usize::from(ctx.vault_pos.is_some());
                assert!(ctx.nroom() + reserved <= ctx.options.target_rooms, "seed {seed}");
                if ctx.make_vault() {
                    assert!(ctx.rooms.top_level().len() <= ctx.options.target_rooms, "seed {seed}");
                }
            });
        }
    }

    #[test]
    fn test_stairs_in_distinct_rooms() {
        with_context(7, 3, |ctx| {
            let a = stamp_room(ctx, 5, 5, 9, 8);
            let b = stamp_room(ctx, 30, 5, 34, 8);
            ctx.make_stairs();
            assert_eq!(ctx.stairs.len(), 2);
            let down = ctx.stairs.iter().find(|s| !s.up).unwrap();
            let up = ctx.stairs.iter().find(|s| s.up).unwrap();
            let room_of = |x, y| if ctx.room(a).contains(x, y) { a } else { b };
            assert_ne!(room_of(down.x, down.y), room_of(up.x, up.y));
            assert_eq!(ctx.grid.count_typ(CellType::Stairs), 2);
        });
    }

    #[test]
    fn test_single_room_gets_both_stairs() {
        with_context(7, 3, |ctx| {
            stamp_room(ctx, 5, 5, 9, 8);
            ctx.make_stairs();
            assert_eq!(ctx.stairs.len(), 2);
            assert_ne!((ctx.stairs[0].x, ctx.stairs[0].y), (ctx.stairs[1].x, ctx.stairs[1].y));
        });
    }

    #[test]
    fn test_vault_is_sealed_and_golden() {
        with_context(3, 4, |ctx| {
            ctx.vault_pos = Some((40, 10));
            assert!(ctx.make_vault());
            let (id, vault) = ctx.rooms.iter().find(|(_, r)| r.kind == RoomKind::Vault).unwrap();
            assert_eq!((vault.width(), vault.height()), (2, 2));
            assert!(!vault.needs_joining);
            assert!(vault.lit);
            assert!(ctx.flags.has_vault);
            let gold: Vec<_> = ctx.objects.iter().filter(|o| vault.contains(o.x, o.y)).collect();
            assert_eq!(gold.len(), 4);
            assert!(gold.iter().all(|o| (51..451).contains(&o.quantity)));
            assert_eq!(ctx.room(id).door_count(), 0);
        });
    }

    #[test]
    fn test_validate_rooms_rejects_edge_rooms() {
        with_context(1, 1, |ctx| {
            let id = stamp_room(ctx, 5, 5, 9, 8);
            assert!(ctx.validate_rooms().is_ok());
            ctx.rooms[id].hx = ctx.width() - 1;
            assert!(matches!(ctx.validate_rooms(), Err(GenError::RoomOutOfBounds { .. })));
        });
    }
}
