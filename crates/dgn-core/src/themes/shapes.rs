//! Rectangular theme shapes

use crate::dungeon::{GenerationContext, Lighting, Placement, RoomId, RoomKind, RoomRequest};

/// Place a top-level room, flagging the theme as failed when it does not fit.
fn place(ctx: &mut GenerationContext<'_>, req: RoomRequest) -> Option<RoomId> {
    match ctx.create_room(req) {
        Some(Placement::Room(id)) => Some(id),
        Some(Placement::Discarded) => None,
        _ => {
            ctx.themeroom_failed = true;
            None
        }
    }
}

pub fn default_room(ctx: &mut GenerationContext<'_>) {
    place(ctx, RoomRequest::random(RoomKind::Ordinary));
}

/// An 11x9 room with a small closet in the middle
pub fn fake_delphi(ctx: &mut GenerationContext<'_>) {
    let Some(id) = place(ctx, RoomRequest::sized(RoomKind::Ordinary, 11, 9)) else {
        return;
    };
    if let Some(sub) = ctx.create_subroom(id, Some((4, 3)), Some((3, 3)), RoomKind::Ordinary, Lighting::Random, true) {
        ctx.create_door(sub);
    }
}

pub fn room_in_room(ctx: &mut GenerationContext<'_>) {
    let Some(id) = place(ctx, RoomRequest::random(RoomKind::Ordinary)) else {
        return;
    };
    if let Some(sub) = ctx.create_subroom(id, None, None, RoomKind::Ordinary, Lighting::Random, false) {
        ctx.create_door(sub);
    }
}

/// A big room that usually hides a smaller one with one or two doors
pub fn huge_room(ctx: &mut GenerationContext<'_>) {
    let w = ctx.rng.rn2(10) as i32 + 11;
    let h = ctx.rng.rn2(5) as i32 + 8;
    let Some(id) = place(ctx, RoomRequest::sized(RoomKind::Ordinary, w, h)) else {
        return;
    };
    if ctx.rng.percent(90)
        && let Some(sub) = ctx.create_subroom(id, None, None, RoomKind::Ordinary, Lighting::Random, true)
    {
        ctx.create_door(sub);
        if ctx.rng.percent(50) {
            ctx.create_door(sub);
        }
    }
}

fn themed(ctx: &mut GenerationContext<'_>, lighting: Lighting) {
    let req = RoomRequest::random(RoomKind::Themed).lit(lighting).unfilled();
    if let Some(id) = place(ctx, req) {
        super::fill_theme_room(ctx, id);
    }
}

pub fn themed_room(ctx: &mut GenerationContext<'_>) {
    themed(ctx, Lighting::Random);
}

pub fn unlit_themed_room(ctx: &mut GenerationContext<'_>) {
    themed(ctx, Lighting::Unlit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::test_support::with_context;

    #[test]
    fn test_fake_delphi_layout() {
        for seed in 0..10 {
            with_context(seed, 1, |ctx| {
                ctx.in_themerooms = true;
                fake_delphi(ctx);
                if ctx.themeroom_failed {
                    return;
                }
                let (outer, _) = ctx.rooms.iter().find(|(_, r)| r.parent.is_none()).unwrap();
                let r = ctx.room(outer);
                assert_eq!((r.width(), r.height()), (11, 9));
                assert_eq!(r.subrooms.len(), 1);
                let sub = ctx.room(r.subrooms[0]);
                assert_eq!((sub.lx - r.lx, sub.ly - r.ly), (4, 3));
                assert_eq!(sub.door_count(), 1);
            });
        }
    }

    #[test]
    fn test_huge_room_size() {
        with_context(17, 1, |ctx| {
            ctx.in_themerooms = true;
            huge_room(ctx);
            if let Some((_, r)) = ctx.rooms.iter().find(|(_, r)| r.parent.is_none()) {
                assert!((11..=20).contains(&r.width()));
                assert!((8..=12).contains(&r.height()));
            }
        });
    }

    #[test]
    fn test_themed_room_kind() {
        with_context(23, 1, |ctx| {
            ctx.in_themerooms = true;
            unlit_themed_room(ctx);
            if let Some((_, r)) = ctx.rooms.iter().find(|(_, r)| r.parent.is_none()) {
                assert_eq!(r.kind, RoomKind::Themed);
                assert!(!r.lit);
                assert!(!r.needs_fill);
            }
        });
    }
}
