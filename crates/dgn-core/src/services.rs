//! Object and monster creation services
//!
//! Level generation decides *where* things go; what exactly gets created is
//! delegated through [`ObjectFactory`] and [`MonsterFactory`]. Factories may
//! draw from the same random stream the generator uses. The `Basic*`
//! implementations pick from small built-in tables and are what
//! [`crate::generate_level`] uses by default.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::dungeon::Grid;
use crate::rng::RandomStream;

/// Object classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ObjectClass {
    Weapon,
    Armor,
    Ring,
    Amulet,
    Tool,
    Food,
    Potion,
    Scroll,
    Spellbook,
    Wand,
    Coin,
    Gem,
    Rock,
}

impl ObjectClass {
    /// Weight out of 100 when a random class is requested
    pub const fn random_weight(self) -> u32 {
        match self {
            ObjectClass::Weapon => 10,
            ObjectClass::Armor => 10,
            ObjectClass::Food => 20,
            ObjectClass::Tool => 8,
            ObjectClass::Gem => 8,
            ObjectClass::Potion => 16,
            ObjectClass::Scroll => 16,
            ObjectClass::Spellbook => 4,
            ObjectClass::Wand => 4,
            ObjectClass::Ring => 3,
            ObjectClass::Amulet => 1,
            ObjectClass::Coin | ObjectClass::Rock => 0,
        }
    }
}

/// What the generator asks an [`ObjectFactory`] for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectRequest {
    /// `None` means any class
    pub class: Option<ObjectClass>,
    /// A specific object ("chest", "boulder", ...)
    pub name: Option<&'static str>,
    pub x: i32,
    pub y: i32,
    pub quantity: Option<u32>,
    pub buried: bool,
    /// Monster the corpse or statue depicts
    pub depicts: Option<String>,
    pub lit: bool,
}

impl ObjectRequest {
    pub fn named(name: &'static str, x: i32, y: i32) -> Self {
        Self {
            name: Some(name),
            x,
            y,
            ..Default::default()
        }
    }

    pub fn of_class(class: Option<ObjectClass>, x: i32, y: i32) -> Self {
        Self {
            class,
            x,
            y,
            ..Default::default()
        }
    }

    pub fn gold(amount: u32, x: i32, y: i32) -> Self {
        Self {
            class: Some(ObjectClass::Coin),
            name: Some("gold piece"),
            x,
            y,
            quantity: Some(amount),
            ..Default::default()
        }
    }

    pub fn buried(mut self) -> Self {
        self.buried = true;
        self
    }

    pub fn depicting(mut self, monster: &str) -> Self {
        self.depicts = Some(monster.to_string());
        self
    }
}

/// A created object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub class: ObjectClass,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub quantity: u32,
    pub buried: bool,
    pub lit: bool,
    pub depicts: Option<String>,
    pub contents: Vec<Object>,
}

/// What the generator asks a [`MonsterFactory`] for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonsterSpec {
    pub name: Option<&'static str>,
    /// Display class, e.g. `'m'` for mimics
    pub class: Option<char>,
    pub x: i32,
    pub y: i32,
    pub asleep: bool,
    /// Level difficulty used to bound random picks
    pub difficulty: i32,
}

impl MonsterSpec {
    pub fn random(x: i32, y: i32, difficulty: i32) -> Self {
        Self {
            x,
            y,
            difficulty,
            ..Default::default()
        }
    }

    pub fn named(name: &'static str, x: i32, y: i32, difficulty: i32) -> Self {
        Self {
            name: Some(name),
            x,
            y,
            difficulty,
            ..Default::default()
        }
    }

    pub fn of_class(class: char, x: i32, y: i32, difficulty: i32) -> Self {
        Self {
            class: Some(class),
            x,
            y,
            difficulty,
            ..Default::default()
        }
    }

    pub fn asleep(mut self) -> Self {
        self.asleep = true;
        self
    }
}

/// A created monster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub symbol: char,
    pub x: i32,
    pub y: i32,
    pub asleep: bool,
}

pub trait ObjectFactory {
    fn create_object(&mut self, rng: &mut RandomStream, request: &ObjectRequest) -> Object;
}

pub trait MonsterFactory {
    /// Create a monster; `None` when nothing suitable exists.
    fn create_monster(&mut self, rng: &mut RandomStream, spec: &MonsterSpec) -> Option<Monster>;

    /// Nearest accessible, unoccupied cell within `radius` of `(x, y)`,
    /// searching outward ring by ring.
    fn find_nearby_free_cell(
        &self,
        grid: &Grid,
        monsters: &[Monster],
        x: i32,
        y: i32,
        radius: i32,
    ) -> Option<(i32, i32)> {
        for r in 0..=radius {
            for dx in -r..=r {
                for dy in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let (cx, cy) = (x + dx, y + dy);
                    let free = grid.get(cx, cy).is_some_and(|c| c.typ.is_accessible())
                        && !monsters.iter().any(|m| m.x == cx && m.y == cy);
                    if free {
                        return Some((cx, cy));
                    }
                }
            }
        }
        None
    }
}

const WEAPONS: &[&str] = &["dagger", "short sword", "mace", "spear", "crossbow bolt", "arrow", "axe"];
const ARMOR: &[&str] = &["leather armor", "ring mail", "helmet", "leather gloves", "low boots", "small shield"];
const RINGS: &[&str] = &["ring of adornment", "ring of protection", "ring of searching", "ring of stealth"];
const AMULETS: &[&str] = &["amulet of ESP", "amulet of life saving", "amulet of strangulation"];
const TOOLS: &[&str] = &["large box", "chest", "oil lamp", "pick-axe", "blindfold", "tin opener", "whistle"];
const FOOD: &[&str] = &["food ration", "apple", "carrot", "cram ration", "egg", "tin", "fortune cookie"];
const POTIONS: &[&str] = &["potion of water", "potion of healing", "potion of sleeping", "potion of see invisible"];
const SCROLLS: &[&str] = &["scroll of identify", "scroll of light", "scroll of teleportation", "scroll of enchant weapon"];
const SPELLBOOKS: &[&str] = &["spellbook of force bolt", "spellbook of healing", "spellbook of detect monsters"];
const WANDS: &[&str] = &["wand of light", "wand of striking", "wand of digging", "wand of sleep"];
const GEMS: &[&str] = &["worthless piece of glass", "flint stone", "luckstone", "ruby"];
const ROCKS: &[&str] = &["rock", "boulder", "statue"];

fn names_for(class: ObjectClass) -> &'static [&'static str] {
    match class {
        ObjectClass::Weapon => WEAPONS,
        ObjectClass::Armor => ARMOR,
        ObjectClass::Ring => RINGS,
        ObjectClass::Amulet => AMULETS,
        ObjectClass::Tool => TOOLS,
        ObjectClass::Food => FOOD,
        ObjectClass::Potion => POTIONS,
        ObjectClass::Scroll => SCROLLS,
        ObjectClass::Spellbook => SPELLBOOKS,
        ObjectClass::Wand => WANDS,
        ObjectClass::Coin => &["gold piece"],
        ObjectClass::Gem => GEMS,
        ObjectClass::Rock => ROCKS,
    }
}

fn class_of_named(name: &str) -> ObjectClass {
    match name {
        "boulder" | "statue" | "rock" => ObjectClass::Rock,
        "gold piece" => ObjectClass::Coin,
        "corpse" | "lump of royal jelly" => ObjectClass::Food,
        "scroll of teleportation" => ObjectClass::Scroll,
        "bell" | "chest" | "large box" | "oil lamp" => ObjectClass::Tool,
        other => [
            ObjectClass::Weapon,
            ObjectClass::Armor,
            ObjectClass::Ring,
            ObjectClass::Amulet,
            ObjectClass::Tool,
            ObjectClass::Food,
            ObjectClass::Potion,
            ObjectClass::Scroll,
            ObjectClass::Spellbook,
            ObjectClass::Wand,
            ObjectClass::Gem,
        ]
        .into_iter()
        .find(|c| names_for(*c).contains(&other))
        .unwrap_or(ObjectClass::Tool),
    }
}

/// Table-driven object factory
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicObjects;

impl BasicObjects {
    /// Random class by weight; one `rnd(100)` draw.
    fn random_class(rng: &mut RandomStream) -> ObjectClass {
        use strum::IntoEnumIterator;

        let mut roll = rng.rnd(100) as i32;
        for class in ObjectClass::iter() {
            roll -= class.random_weight() as i32;
            if roll <= 0 {
                return class;
            }
        }
        ObjectClass::Food
    }
}

impl ObjectFactory for BasicObjects {
    fn create_object(&mut self, rng: &mut RandomStream, request: &ObjectRequest) -> Object {
        let (class, name) = match (request.name, request.class) {
            (Some(name), class) => (class.unwrap_or_else(|| class_of_named(name)), name.to_string()),
            (None, class) => {
                let class = class.unwrap_or_else(|| Self::random_class(rng));
                let names = names_for(class);
                let name = names[rng.rn2(names.len() as u32) as usize];
                (class, name.to_string())
            }
        };
        Object {
            class,
            name,
            x: request.x,
            y: request.y,
            quantity: request.quantity.unwrap_or(1),
            buried: request.buried,
            lit: request.lit,
            depicts: request.depicts.clone(),
            contents: Vec::new(),
        }
    }
}

/// `(name, symbol, difficulty)`
const MONSTERS: &[(&str, char, i32)] = &[
    ("newt", ':', 1),
    ("jackal", 'd', 1),
    ("grid bug", 'x', 1),
    ("sewer rat", 'r', 1),
    ("kobold", 'k', 1),
    ("lichen", 'F', 1),
    ("gnome", 'G', 2),
    ("hill orc", 'o', 3),
    ("giant ant", 'a', 4),
    ("dwarf", 'h', 4),
    ("small mimic", 'm', 8),
    ("large mimic", 'm', 9),
    ("giant mimic", 'm', 11),
    ("wood nymph", 'n', 5),
    ("brown mold", 'F', 2),
    ("yellow mold", 'F', 3),
    ("giant eel", ';', 7),
    ("piranha", ';', 6),
    ("electric eel", ';', 10),
    ("killer bee", 'a', 5),
    ("queen bee", 'a', 12),
    ("soldier ant", 'a', 6),
    ("fire ant", 'a', 6),
    ("leprechaun", 'l', 5),
    ("cockatrice", 'c', 7),
    ("soldier", '@', 8),
    ("sergeant", '@', 10),
    ("gnome lord", 'G', 3),
    ("bugbear", 'h', 5),
    ("ogre", 'O', 7),
    ("ghost", ' ', 12),
    ("wraith", 'W', 8),
    ("zombie", 'Z', 4),
    ("mummy", 'M', 8),
    ("aligned priest", '@', 15),
    ("shopkeeper", '@', 15),
    ("giant spider", 's', 7),
    ("hobgoblin", 'o', 3),
    ("forest centaur", 'C', 10),
    ("hill giant", 'H', 10),
    ("troll", 'T', 13),
    ("red dragon", 'D', 20),
    ("lieutenant", '@', 12),
    ("captain", '@', 14),
    ("vampire", 'V', 12),
    ("kobold zombie", 'Z', 1),
    ("gnome zombie", 'Z', 2),
];

/// Table-driven monster factory
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicMonsters;

impl MonsterFactory for BasicMonsters {
    fn create_monster(&mut self, rng: &mut RandomStream, spec: &MonsterSpec) -> Option<Monster> {
        let (name, symbol) = match (spec.name, spec.class) {
            (Some(name), _) => {
                let symbol = MONSTERS
                    .iter()
                    .find(|(n, _, _)| *n == name)
                    .map_or('@', |(_, s, _)| *s);
                (name, symbol)
            }
            (None, class) => {
                let maxdiff = (spec.difficulty + 1) / 2 + 2;
                let pool: Vec<_> = MONSTERS
                    .iter()
                    .filter(|(_, s, d)| class.map_or(*d <= maxdiff, |c| *s == c))
                    .collect();
                if pool.is_empty() {
                    return None;
                }
                let (name, symbol, _) = pool[rng.rn2(pool.len() as u32) as usize];
                (*name, *symbol)
            }
        };
        Some(Monster {
            name: name.to_string(),
            symbol,
            x: spec.x,
            y: spec.y,
            asleep: spec.asleep,
        })
    }
}

/// The pair of factories a generation run calls out to
pub struct Services<'s> {
    pub objects: &'s mut dyn ObjectFactory,
    pub monsters: &'s mut dyn MonsterFactory,
}

impl core::fmt::Debug for Services<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
