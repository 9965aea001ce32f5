use serde::{Deserialize, Serialize};

use crate::team::TeamSide;

/// Number of kill-feed rows the game UI can show at once.
pub const KILLFEED_SLOTS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KillfeedActor {
    pub hero: String,
    pub side: TeamSide,
}

/// One kill event as displayed in the feed.
///
/// Equality is structural over the event content. The row an entry was read
/// from is deliberately absent: the same event moves down the feed as newer
/// kills arrive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KillfeedEntry {
    /// `None` for environmental deaths and suicides.
    pub killer: Option<KillfeedActor>,
    pub victim: KillfeedActor,
    pub ability: Option<String>,
    pub assists: Vec<String>,
    pub critical: bool,
}

impl KillfeedEntry {
    pub fn new(killer: Option<KillfeedActor>, victim: KillfeedActor) -> Self {
        Self {
            killer,
            victim,
            ability: None,
            assists: Vec::new(),
            critical: false,
        }
    }

    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.ability = Some(ability.into());
        self
    }

    pub fn is_environmental(&self) -> bool {
        self.killer.is_none()
    }
}
