//! Generation options
//!
//! Options are plain serde data so tooling can keep them in JSON files.
//! Missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{COLNO, MAXNROFROOMS, ROWNO};
use crate::error::{GenError, Result};
use crate::themes::{FILLS, SHAPES};

/// Corridor digging parameters. Each `*_chance` is a `1 in N` denominator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorOptions {
    /// Optional extra corridors stop early with probability `1/N` per step
    pub nxcor_abort_chance: u32,
    /// A dug cell becomes a secret corridor with probability `1/N`
    pub secret_corridor_chance: u32,
    /// Optional extra corridors drop a boulder with probability `1/N` per cell
    pub boulder_chance: u32,
    /// Steps after which a corridor gives up
    pub max_steps: u32,
}

impl Default for CorridorOptions {
    fn default() -> Self {
        Self {
            nxcor_abort_chance: 35,
            secret_corridor_chance: 100,
            boulder_chance: 50,
            max_steps: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenOptions {
    pub width: i32,
    pub height: i32,
    /// Stop placing rooms once this many top-level rooms exist
    pub target_rooms: usize,
    /// Theme placements that may fail before room placement stops
    pub max_failed_attempts: u32,
    pub allow_vaults: bool,
    pub allow_themes: bool,
    /// Shops, zoos, temples and the other depth-gated room conversions
    pub allow_special_rooms: bool,
    pub allow_niches: bool,
    /// Percent chance an ordinary room survives its build roll
    pub ordinary_room_chance: u32,
    pub corridor: CorridorOptions,
    /// Force this theme shape instead of sampling
    pub theme_override: Option<String>,
    /// Force this theme fill instead of sampling
    pub fill_override: Option<String>,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            width: COLNO,
            height: ROWNO,
            target_rooms: 10,
            max_failed_attempts: 10,
            allow_vaults: true,
            allow_themes: true,
            allow_special_rooms: true,
            allow_niches: true,
            ordinary_room_chance: 100,
            corridor: CorridorOptions::default(),
            theme_override: None,
            fill_override: None,
        }
    }
}

impl GenOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: GenOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GenError::OptionsIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width < 20 || self.height < 10 {
            return Err(GenError::InvalidOptions(format!(
                "grid {}x{} is smaller than the 20x10 minimum",
                self.width, self.height
            )));
        }
        if self.width > 255 || self.height > 255 {
            return Err(GenError::InvalidOptions(format!(
                "grid {}x{} exceeds 255 in one dimension",
                self.width, self.height
            )));
        }
        if self.target_rooms == 0 || self.target_rooms >= MAXNROFROOMS {
            return Err(GenError::InvalidOptions(format!(
                "target_rooms must be in 1..{MAXNROFROOMS}, got {}",
                self.target_rooms
            )));
        }
        if self.ordinary_room_chance > 100 {
            return Err(GenError::InvalidOptions(format!(
                "ordinary_room_chance is a percentage, got {}",
                self.ordinary_room_chance
            )));
        }
        let c = &self.corridor;
        if c.nxcor_abort_chance == 0 || c.secret_corridor_chance == 0 || c.boulder_chance == 0 {
            return Err(GenError::InvalidOptions(
                "corridor chances are 1-in-N denominators and must be positive".into(),
            ));
        }
        if let Some(name) = &self.theme_override
            && !SHAPES.iter().any(|s| s.name == name.as_str())
        {
            return Err(GenError::UnknownThemeOverride {
                kind: "shape",
                name: name.clone(),
            });
        }
        if let Some(name) = &self.fill_override
            && !FILLS.iter().any(|f| f.name == name.as_str())
        {
            return Err(GenError::UnknownThemeOverride {
                kind: "fill",
                name: name.clone(),
            });
        }
        Ok(())
    }
}
