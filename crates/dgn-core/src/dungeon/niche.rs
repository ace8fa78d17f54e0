//! Niches: one-cell closets behind a room's top or bottom wall

use super::cell::CellType;
use super::context::GenerationContext;
use super::engrave::wipe_engraving;
use super::level::{EngravingKind, TrapKind};
use super::room::RoomKind;
use crate::services::{MonsterSpec, ObjectRequest};

/// Floor message left in front of a trapped niche
fn trap_engraving(kind: TrapKind) -> Option<&'static str> {
    match kind {
        TrapKind::TrapDoor => Some("Vlad was here"),
        TrapKind::Teleport | TrapKind::LevelTeleport => Some("ad aerarium"),
        _ => None,
    }
}

impl GenerationContext<'_> {
    /// Scatter a few niches over the level; deep levels may hide a level
    /// teleporter or a trap door in one.
    pub fn make_niches(&mut self) {
        let n = self.nroom();
        if n == 0 {
            return;
        }
        let count = self.rng.rnd((n / 2 + 1) as u32);
        let mut ltptr = self.depth > 15;
        let mut vamp = self.depth > 5 && self.depth < 25;
        for _ in 0..count {
            if ltptr && self.rng.rn2(6) == 0 {
                ltptr = false;
                self.make_niche(Some(TrapKind::LevelTeleport));
            } else if vamp && self.rng.rn2(6) == 0 {
                vamp = false;
                self.make_niche(Some(TrapKind::TrapDoor));
            } else {
                self.make_niche(None);
            }
        }
    }

    /// Try up to eight times to carve one niche off an ordinary room.
    pub fn make_niche(&mut self, trap: Option<TrapKind>) -> bool {
        if self.doors_full() {
            return false;
        }
        let n = self.nroom();
        if n == 0 {
            return false;
        }
        for _ in 0..8 {
            let pick = self.rng.rn2(n as u32) as usize;
            let Some(id) = self.top_room(pick) else {
                continue;
            };
            let room = self.rooms[id].clone();
            if room.kind != RoomKind::Ordinary || room.irregular {
                continue;
            }
            if room.door_count() == 1 && self.rng.rn2(5) != 0 {
                continue;
            }
            let (dy, (xx, yy)) = if self.rng.rn2(2) != 0 {
                (1, self.finddpos(room.lx, room.hy + 1, room.hx, room.hy + 1))
            } else {
                (-1, self.finddpos(room.lx, room.ly - 1, room.hx, room.ly - 1))
            };
            if !self.grid.in_bounds(xx, yy + dy) || self.grid.typ(xx, yy + dy) != CellType::Stone {
                continue;
            }

            if trap.is_some() || self.rng.rn2(4) == 0 {
                self.grid.set_typ(xx, yy + dy, CellType::Corridor);
                if let Some(kind) = trap
                    && let Some(tid) = self.make_trap(kind, xx, yy + dy)
                {
                    self.traps[tid.0 as usize].once = true;
                    if let Some(text) = trap_engraving(kind)
                        && let Some(worn) = wipe_engraving(self.rng, text, 5)
                    {
                        self.engrave(xx, yy - dy, worn, EngravingKind::Dust);
                    }
                }
                let typ = if self.rng.rn2(5) != 0 { CellType::SecretDoor } else { CellType::Door };
                self.dosdoor(xx, yy, id, typ);
            } else {
                self.grid.set_typ(xx, yy + dy, CellType::Corridor);
                if self.rng.rn2(7) != 0 {
                    let typ = if self.rng.rn2(5) != 0 { CellType::SecretDoor } else { CellType::Door };
                    self.dosdoor(xx, yy, id, typ);
                } else {
                    if self.rng.rn2(5) == 0 && self.grid.typ(xx, yy).is_wall() {
                        self.grid.set_typ(xx, yy, CellType::IronBars);
                        if self.rng.rn2(3) != 0 {
                            let victim = self.random_monster_name('@');
                            let corpse = ObjectRequest::named("corpse", xx, yy + dy);
                            let corpse = match victim {
                                Some(name) => corpse.depicting(&name),
                                None => corpse,
                            };
                            self.make_object(corpse);
                        }
                    }
                    self.make_object(ObjectRequest::named("scroll of teleportation", xx, yy + dy));
                    if self.rng.rn2(3) == 0 {
                        self.make_object(ObjectRequest::of_class(None, xx, yy + dy));
                    }
                }
            }
            tracing::debug!(x = xx, y = yy + dy, ?trap, "niche carved");
            return true;
        }
        false
    }

    /// Name of a random monster of `class`, without placing it
    pub fn random_monster_name(&mut self, class: char) -> Option<String> {
        let spec = MonsterSpec::of_class(class, 0, 0, self.difficulty());
        self.services
            .monsters
            .create_monster(self.rng, &spec)
            .map(|m| m.name)
    }
}
