//! dgn-core: deterministic room-and-corridor level generation
//!
//! A level is built from a caller-owned [`RandomStream`], a depth and a set
//! of [`GenOptions`]. The same stream state, depth and options always give
//! the same level, draw for draw. Object and monster details are delegated
//! to [`services`] so callers can plug in their own tables.
//!
//! ```no_run
//! use dgn_core::{generate_level, GenOptions, RandomStream};
//!
//! let mut rng = RandomStream::new(42);
//! let level = generate_level(&mut rng, 1, &GenOptions::default()).unwrap();
//! println!("{}", level.render());
//! ```

pub mod consts;
pub mod dungeon;
pub mod error;
pub mod options;
pub mod postprocess;
pub mod rng;
pub mod services;
pub mod themes;

use consts::{MAX_DEPTH, MIN_DEPTH};

pub use dungeon::{GenerationContext, Level};
pub use error::{GenError, Result};
pub use options::{CorridorOptions, GenOptions};
pub use rng::{RandomStream, RngBackend, RngSink, RngTraceEntry};
pub use services::{BasicMonsters, BasicObjects, MonsterFactory, ObjectFactory, Services};

/// Generate one level with the built-in object and monster tables.
pub fn generate_level(rng: &mut RandomStream, depth: i32, options: &GenOptions) -> Result<Level> {
    let mut objects = BasicObjects;
    let mut monsters = BasicMonsters;
    let services = Services {
        objects: &mut objects,
        monsters: &mut monsters,
    };
    generate_level_with(rng, depth, options, services)
}

/// Generate one level, creating objects and monsters through `services`.
pub fn generate_level_with<'a>(
    rng: &'a mut RandomStream,
    depth: i32,
    options: &'a GenOptions,
    services: Services<'a>,
) -> Result<Level> {
    options.validate()?;
    if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
        return Err(GenError::DepthOutOfRange {
            depth,
            min: MIN_DEPTH,
            max: MAX_DEPTH,
        });
    }
    let span = tracing::info_span!("generate_level", depth, seed = rng.seed(), backend = %rng.backend());
    let _enter = span.enter();

    let mut ctx = GenerationContext::new(rng, depth, options, services);
    ctx.generate()?;
    Ok(ctx.into_level())
}
