//! Deferred theme callbacks
//!
//! Some theme fills can only finish once the level is complete: wall
//! rewrites need wallification to have run, and markers that point at a
//! spot need the final floor layout. Fills queue a callback together with
//! the data it needs; the queue is drained exactly once at the end of
//! generation, in insertion order.

use serde::{Deserialize, Serialize};

use crate::dungeon::{GenerationContext, Rect};

/// Data handed back to a deferred callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostprocessData {
    /// Something buried at `(x, y)`; engrave directions to it
    DigEngraving { x: i32, y: i32 },
    /// Floor region whose surrounding walls turn into trees
    GardenWalls { region: Rect },
    /// Floor cell of a teleportation hub that gets a visible teleporter
    TeleportTrap { x: i32, y: i32 },
}

pub type PostprocessFn = fn(&mut GenerationContext<'_>, &PostprocessData);

#[derive(Default)]
pub struct PostprocessQueue {
    entries: Vec<(PostprocessFn, PostprocessData)>,
}

impl core::fmt::Debug for PostprocessQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|(_, d)| d)).finish()
    }
}

impl PostprocessQueue {
    pub fn push(&mut self, callback: PostprocessFn, data: PostprocessData) {
        self.entries.push((callback, data));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run every queued callback once. Callbacks queued while draining are
/// dropped.
pub fn drain(ctx: &mut GenerationContext<'_>) {
    let entries = core::mem::take(&mut ctx.postprocess.entries);
    tracing::debug!(count = entries.len(), "running postprocess callbacks");
    for (callback, data) in entries {
        callback(ctx, &data);
    }
    if !ctx.postprocess.is_empty() {
        tracing::debug!(dropped = ctx.postprocess.len(), "callbacks queued during drain were dropped");
        ctx.postprocess.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::test_support::with_context;
    use crate::dungeon::EngravingKind;

    fn mark(ctx: &mut GenerationContext<'_>, data: &PostprocessData) {
        if let PostprocessData::DigEngraving { x, y } = data {
            let n = ctx.engravings.len();
            ctx.engrave(*x, *y, format!("mark {n}"), EngravingKind::Mark);
        }
    }

    fn requeue(ctx: &mut GenerationContext<'_>, data: &PostprocessData) {
        ctx.postprocess.push(mark, data.clone());
    }

    #[test]
    fn test_drain_runs_in_order_once() {
        with_context(1, 1, |ctx| {
            ctx.postprocess.push(mark, PostprocessData::DigEngraving { x: 1, y: 1 });
            ctx.postprocess.push(mark, PostprocessData::DigEngraving { x: 2, y: 1 });
            drain(ctx);
            assert_eq!(ctx.engravings.len(), 2);
            assert_eq!(ctx.engravings[0].text, "mark 0");
            assert_eq!(ctx.engravings[1].x, 2);
            assert!(ctx.postprocess.is_empty());
            drain(ctx);
            assert_eq!(ctx.engravings.len(), 2);
        });
    }

    #[test]
    fn test_callbacks_queued_during_drain_are_dropped() {
        with_context(1, 1, |ctx| {
            ctx.postprocess.push(requeue, PostprocessData::DigEngraving { x: 3, y: 3 });
            drain(ctx);
            assert!(ctx.engravings.is_empty());
            assert!(ctx.postprocess.is_empty());
        });
    }
}
