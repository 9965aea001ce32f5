use serde::{Deserialize, Serialize};

use crate::{Result, SpectraError};

pub const PLAYERS_PER_TEAM: usize = 6;
pub const PLAYER_SLOTS: usize = PLAYERS_PER_TEAM * 2;

/// Which half of the scoreboard a player slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Left,
    Right,
}

impl TeamSide {
    /// Slots 0-5 are the left team, 6-11 the right team.
    pub fn of_slot(slot: usize) -> Self {
        if slot < PLAYERS_PER_TEAM {
            TeamSide::Left
        } else {
            TeamSide::Right
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamPair<T> {
    pub left: T,
    pub right: T,
}

impl<T> TeamPair<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn get(&self, side: TeamSide) -> &T {
        match side {
            TeamSide::Left => &self.left,
            TeamSide::Right => &self.right,
        }
    }
}

/// Team identity and roster for one recorded match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub team_names: TeamPair<String>,
    pub players: TeamPair<Vec<String>>,
}

impl MatchSetup {
    pub fn validate(&self) -> Result<()> {
        for side in [TeamSide::Left, TeamSide::Right] {
            let roster = self.players.get(side);
            if roster.len() != PLAYERS_PER_TEAM {
                return Err(SpectraError::Configuration(format!(
                    "{side:?} roster must list {PLAYERS_PER_TEAM} players, got {}",
                    roster.len()
                )));
            }
            if self.team_names.get(side).trim().is_empty() {
                return Err(SpectraError::Configuration(format!(
                    "{side:?} team name must not be empty"
                )));
            }
        }
        Ok(())
    }

    pub fn team_name(&self, side: TeamSide) -> &str {
        self.team_names.get(side)
    }

    /// Player name shown in `slot`, or an empty string for an unknown slot.
    pub fn player_name(&self, slot: usize) -> &str {
        let side = TeamSide::of_slot(slot);
        let index = match side {
            TeamSide::Left => slot,
            TeamSide::Right => slot - PLAYERS_PER_TEAM,
        };
        self.players
            .get(side)
            .get(index)
            .map(String::as_str)
            .unwrap_or_default()
    }
}
