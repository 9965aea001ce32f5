use serde::{Deserialize, Serialize};

use crate::team::TeamSide;

/// Per-player state read from one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub slot: usize,
    pub side: TeamSide,
    pub player_name: String,
    pub team_name: String,
    pub hero: Option<String>,
    pub is_dead: bool,
    /// Ultimate charge percentage, `None` when unreadable.
    pub ult_charge: Option<u8>,
}

impl PlayerState {
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }
}
