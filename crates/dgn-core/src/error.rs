//! Generation errors
//!
//! Only structural problems and bad caller input are errors. Running out of
//! space, finding no eligible theme, or hitting the wallification iteration
//! cap are ordinary outcomes and never surface here.

use thiserror::Error;

use crate::dungeon::RoomId;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("room {room:?} bounds ({lx},{ly})-({hx},{hy}) leave no wall margin inside the {width}x{height} grid")]
    RoomOutOfBounds {
        room: RoomId,
        lx: i32,
        ly: i32,
        hx: i32,
        hy: i32,
        width: i32,
        height: i32,
    },

    #[error("free rectangle ({lx},{ly})-({hx},{hy}) lies outside the {width}x{height} grid")]
    RectOutOfBounds {
        lx: i32,
        ly: i32,
        hx: i32,
        hy: i32,
        width: i32,
        height: i32,
    },

    #[error("no theme {kind} named '{name}'")]
    UnknownThemeOverride { kind: &'static str, name: String },

    #[error("depth {depth} is outside {min}..={max}")]
    DepthOutOfRange { depth: i32, min: i32, max: i32 },

    #[error("invalid generation options: {0}")]
    InvalidOptions(String),

    #[error("could not parse generation options: {0}")]
    OptionsParse(#[from] serde_json::Error),

    #[error("could not read options file '{path}': {source}")]
    OptionsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = core::result::Result<T, GenError>;
