//! Seams for the per-player and per-row classifiers that live outside this
//! crate.

use std::sync::Arc;

use image::RgbImage;
use spectra_types::{
    game_type::GameType, killfeed::KillfeedEntry, player::PlayerState, team::TeamSide, Result,
};
use spectra_vision::ReferenceTemplates;

use crate::{avatars::SlotAvatars, context::MatchContext};

/// Everything one player extraction needs. All inputs are shared read-only.
#[derive(Debug, Clone)]
pub struct PlayerRequest {
    pub slot: usize,
    pub side: TeamSide,
    pub game_type: GameType,
    pub player_name: String,
    pub team_name: String,
    pub avatars: SlotAvatars,
    pub frame: Arc<RgbImage>,
    pub references: Arc<ReferenceTemplates>,
}

impl PlayerRequest {
    pub fn ult_charge_digits(&self) -> &[RgbImage] {
        self.references.ult_charge_digits()
    }
}

/// Classifies one player slot of a frame.
///
/// Runs on the analyzer's worker pool, one call per slot in parallel. The
/// returned state must carry the requested slot and side.
pub trait PlayerExtractor: Send + Sync {
    fn extract(&self, request: &PlayerRequest) -> Result<PlayerState>;
}

/// Reads one row of the kill feed, row 0 being the newest.
pub trait KillfeedExtractor: Send + Sync {
    /// `Ok(None)` when the row shows no kill event.
    fn extract(
        &self,
        frame: &RgbImage,
        slot: usize,
        ctx: &MatchContext,
    ) -> Result<Option<KillfeedEntry>>;
}
