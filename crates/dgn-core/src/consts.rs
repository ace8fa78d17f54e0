//! Generation constants

/// Default map dimensions
pub const COLNO: i32 = 80;
pub const ROWNO: i32 = 21;

/// Room limits
pub const MAXNROFROOMS: usize = 40;
pub const MAX_SUBROOMS: usize = 24;

/// Rooms needed on the level before a vault may be attempted
pub const VAULT_MIN_ROOMS: usize = MAXNROFROOMS / 6;

/// Maximum number of doors on one level
pub const DOORMAX: usize = 120;

/// Minimum horizontal separation between rooms
pub const XLIM: i32 = 4;

/// Minimum vertical separation between rooms
pub const YLIM: i32 = 3;

/// Retries `create_room` makes after its first placement attempt
pub const ROOM_PLACEMENT_TRIES: u32 = 100;

/// Depths a level may be generated for; negative depths are the planes
pub const MIN_DEPTH: i32 = -5;
pub const MAX_DEPTH: i32 = 127;

/// Map symbols used by the ASCII dump
pub const S_STONE: char = ' ';
pub const S_VWALL: char = '|';
pub const S_HWALL: char = '-';
pub const S_ROOM: char = '.';
pub const S_CORR: char = '#';
pub const S_DOOR_OPEN: char = '|';
pub const S_DOOR_CLOSED: char = '+';
pub const S_NO_DOOR: char = '.';
pub const S_UPSTAIR: char = '<';
pub const S_DNSTAIR: char = '>';
