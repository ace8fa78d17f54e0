//! Engraving texts and weathering

use crate::rng::RandomStream;

/// Messages scratched into the floor of ordinary rooms
pub const RANDOM_ENGRAVINGS: &[&str] = &[
    "Elbereth",
    "Vlad was here",
    "ad aerarium",
    "Owlbreath",
    "Galadriel",
    "Kilroy was here",
    "A.S. ->",
    "<- A.S.",
    "You won't get it up the steps",
    "Lasciate ogni speranza o voi ch'entrate.",
    "Well Come",
    "We apologize for the inconvenience.",
    "See you next Wednesday",
    "notary sojak",
    "For a good time call 8?7-5309",
    "Please don't feed the animals.",
    "Madam, in Eden, I'm Adam.",
    "Two thumbs up!",
    "Hello, World!",
    "You've got mail!",
    "As if!",
    "X marks the spot",
];

/// Headstone inscriptions
pub const EPITAPHS: &[&str] = &[
    "Rest in peace",
    "R.I.P.",
    "Rest In Pieces",
    "Note -- there are NO valuable items in this grave",
    "1994-1995. The Longest-Lived Hacker Ever",
    "The Grave of the Unknown Hacker",
    "We weren't sure who this was, but we buried him here anyway",
    "Sparky -- he was a very good dog",
    "Beware of Electric Third Rail",
    "Made in Taiwan",
    "Og friend. Og good dude. Og died. Og now food",
    "Beetlejuice Beetlejuice Beetlejuice",
    "Look out below!",
    "Please don't dig me up. I'm perfectly happy down here. -- Resident",
    "Postman, please note forwarding address: Gehennom, Asmodeus's Fortress, fifth lemure on the left",
    "Mary had a little lamb/Its fleece was white as snow/When Mary was in trouble/The lamb was first to go",
    "Be careful, or this could happen to you!",
    "Soon you'll join this fellow in hell! -- the Wizard of Yendor",
    "Caution! This grave contains toxic waste",
    "Sum quod eris",
    "Here lies an Atheist, all dressed up and no place to go",
    "Here lies Ezekiel, age 102.  The good die young.",
];

/// Characters and what they wear down to
const RUBOUTS: &[(char, &str)] = &[
    ('A', "^"),
    ('B', "Pb["),
    ('C', "("),
    ('D', "|)["),
    ('E', "|FL[_"),
    ('F', "|-"),
    ('G', "C("),
    ('H', "|-"),
    ('I', "|"),
    ('K', "|<"),
    ('L', "|_"),
    ('M', "|"),
    ('N', "|\\"),
    ('O', "C("),
    ('P', "F"),
    ('Q', "C("),
    ('R', "PF"),
    ('T', "|"),
    ('U', "J"),
    ('V', "/\\"),
    ('W', "V/\\"),
    ('Z', "/"),
    ('b', "|"),
    ('d', "c|"),
    ('e', "c"),
    ('g', "c"),
    ('h', "n"),
    ('j', "i"),
    ('k', "|"),
    ('l', "|"),
    ('m', "nr"),
    ('n', "r"),
    ('o', "c"),
    ('q', "c"),
    ('w', "v"),
    ('y', "v"),
    (':', "."),
    (';', ",:"),
    (',', "."),
    ('=', "-"),
    ('+', "-|"),
    ('*', "+"),
    ('@', "0"),
    ('0', "C("),
    ('1', "|"),
    ('6', "o"),
    ('7', "/"),
    ('8', "3o"),
];

/// Wear down `cnt` random characters of `text`. Each pick draws
/// `rn2(len)` and `rn2(4)`, plus `rn2(choices)` when a rubout applies.
pub fn wipeout_text(rng: &mut RandomStream, text: &str, cnt: usize) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    for _ in 0..cnt {
        let nxt = rng.rn2(chars.len() as u32) as usize;
        let use_rubout = rng.rn2(4) != 0;
        let ch = chars[nxt];
        if ch == ' ' {
            continue;
        }
        if "?.,'`-|_".contains(ch) {
            chars[nxt] = ' ';
            continue;
        }
        let rubout = if use_rubout {
            RUBOUTS.iter().find(|(from, _)| *from == ch)
        } else {
            None
        };
        chars[nxt] = match rubout {
            Some((_, to)) => {
                let to: Vec<char> = to.chars().collect();
                to[rng.rn2(to.len() as u32) as usize]
            }
            None => '?',
        };
    }
    chars.into_iter().collect::<String>().trim_end().to_string()
}

/// Weather an engraving the way a few turns of foot traffic would.
/// Leading blanks are dropped; `None` means nothing legible is left.
pub fn wipe_engraving(rng: &mut RandomStream, text: &str, cnt: usize) -> Option<String> {
    let worn = wipeout_text(rng, text, cnt);
    let worn = worn.trim_start();
    (!worn.is_empty()).then(|| worn.to_string())
}

/// A random floor message, partly worn away
pub fn random_engraving(rng: &mut RandomStream) -> String {
    let text = RANDOM_ENGRAVINGS[rng.rn2(RANDOM_ENGRAVINGS.len() as u32) as usize];
    wipeout_text(rng, text, text.len() / 4)
}

pub fn random_epitaph(rng: &mut RandomStream) -> String {
    EPITAPHS[rng.rn2(EPITAPHS.len() as u32) as usize].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wipeout_keeps_length_until_trailing_trim() {
        let mut rng = RandomStream::new(3);
        let worn = wipeout_text(&mut rng, "Vlad was here", 5);
        assert!(worn.len() <= "Vlad was here".len());
        let changed = worn.chars().zip("Vlad was here".chars()).filter(|(a, b)| a != b).count();
        assert!(changed <= 5);
    }

    #[test]
    fn test_wipeout_zero_count_is_identity() {
        let mut rng = RandomStream::new(3);
        assert_eq!(wipeout_text(&mut rng, "ad aerarium", 0), "ad aerarium");
        assert_eq!(rng.call_count(), 0);
    }

    #[test]
    fn test_punctuation_rubs_out() {
        // every pick lands on index 0 and skips the rubout table
        let mut rng = RandomStream::scripted(vec![0]);
        assert_eq!(wipeout_text(&mut rng, ".x", 1), " x");
        let mut rng = RandomStream::scripted(vec![0]);
        assert_eq!(wipeout_text(&mut rng, "Ax", 1), "?x");
    }

    #[test]
    fn test_fully_worn_engraving_disappears() {
        let mut rng = RandomStream::scripted(vec![0]);
        assert_eq!(wipe_engraving(&mut rng, ".", 1), None);
    }

    #[test]
    fn test_random_texts_deterministic() {
        let mut a = RandomStream::new(9);
        let mut b = RandomStream::new(9);
        assert_eq!(random_engraving(&mut a), random_engraving(&mut b));
        assert_eq!(random_epitaph(&mut a), random_epitaph(&mut b));
    }
}
