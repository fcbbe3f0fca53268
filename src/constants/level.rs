use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Dimension, WebsiteConstant};

const HIGHEST_LEVEL: u8 = 15;
/// Levels from here on are split into a base and a "+" group.
const FIRST_SPLIT_LEVEL: u8 = 7;

/// Level group of the level search page: `L1`..`L6`, then `L7`, `L7+` .. `L15+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelGroup {
    level: u8,
    plus: bool,
}

impl LevelGroup {
    /// Creates a level group; returns `None` for levels the site does not list.
    #[must_use]
    pub fn new(level: u8, plus: bool) -> Option<Self> {
        let valid = (1..=HIGHEST_LEVEL).contains(&level) && (!plus || level >= FIRST_SPLIT_LEVEL);
        valid.then_some(Self { level, plus })
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.level
    }

    #[must_use]
    pub fn is_plus(self) -> bool {
        self.plus
    }
}

impl WebsiteConstant for LevelGroup {
    const DIMENSION: Dimension = Dimension::Level;

    fn web_id(self) -> u32 {
        let level = u32::from(self.level);
        let split = u32::from(FIRST_SPLIT_LEVEL);
        if level < split {
            level
        } else {
            split + (level - split) * 2 + u32::from(self.plus)
        }
    }

    fn key(self) -> String {
        self.to_string()
    }

    fn all() -> Vec<Self> {
        (1..=HIGHEST_LEVEL)
            .flat_map(|level| {
                let plus = (level >= FIRST_SPLIT_LEVEL).then_some(Self { level, plus: true });
                std::iter::once(Self { level, plus: false }).chain(plus)
            })
            .collect()
    }

    /// Accepts `L13+`, `l13+`, `13+` and `13`.
    fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        let key = key
            .strip_prefix('L')
            .or_else(|| key.strip_prefix('l'))
            .unwrap_or(key);
        let (digits, plus) = match key.strip_suffix('+') {
            Some(digits) => (digits, true),
            None => (key, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::new(digits.parse().ok()?, plus)
    }
}

impl fmt::Display for LevelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}{}", self.level, if self.plus { "+" } else { "" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_group_ids_are_contiguous() {
        let ids: Vec<u32> = LevelGroup::all().into_iter().map(LevelGroup::web_id).collect();
        assert_eq!(ids, (1..=24).collect::<Vec<_>>());
    }

    #[test]
    fn test_level_group_keys() {
        assert_eq!(LevelGroup::from_key("L13+").map(LevelGroup::web_id), Some(20));
        assert_eq!(LevelGroup::from_key("13").map(LevelGroup::web_id), Some(19));
        assert_eq!(LevelGroup::from_key("l6").map(LevelGroup::web_id), Some(6));
        assert_eq!(LevelGroup::from_key("L6+"), None);
        assert_eq!(LevelGroup::from_key("L16"), None);
        assert_eq!(LevelGroup::from_key("L+"), None);
        assert_eq!(LevelGroup::from_web_id(24).map(LevelGroup::key).as_deref(), Some("L15+"));
    }
}
