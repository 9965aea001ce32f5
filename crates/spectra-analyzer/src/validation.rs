//! Validity gates, cheapest first. Each gate either rejects the frame or
//! hands it on to the next one.
//!
//! Known gap: the residual overlay left on screen just after a replay ends
//! is not recognised and such frames pass as valid.

use image::RgbImage;
use spectra_types::{
    game_type::{ReplayProfile, ValidationProfile},
    player::PlayerState,
    validity::{FrameValidity, InvalidReason},
    Result,
};
use spectra_vision::{crop, structural_similarity, ChannelStats};
use tracing::debug;

use crate::context::MatchContext;

/// Run all gates against one frame.
pub fn evaluate(
    players: &[PlayerState],
    frame: &RgbImage,
    ctx: &MatchContext,
) -> Result<FrameValidity> {
    if let Some(reason) = liveness_gate(players) {
        return Ok(FrameValidity::invalid(reason));
    }

    let profile = ctx.profile();
    let stats = ChannelStats::of(&crop(frame, profile.validation.region));
    if let Some(reason) = corner_gate(&stats, &profile.validation) {
        debug!(
            "Corner gate rejected frame: max std {:.2}, mean {:.2}",
            stats.max_std_dev(),
            stats.combined_mean()
        );
        return Ok(FrameValidity::invalid(reason));
    }

    let similarity = replay_similarity(frame, &profile.replay, ctx.references().replay_icon())?;
    if is_replay(similarity, profile.replay.threshold) {
        debug!("Replay banner matched with similarity {:.3}", similarity);
        return Ok(FrameValidity::Replay { similarity });
    }

    Ok(FrameValidity::Valid)
}

/// At least one player must be alive during live play.
pub fn liveness_gate(players: &[PlayerState]) -> Option<InvalidReason> {
    if players.iter().any(PlayerState::is_alive) {
        None
    } else {
        Some(InvalidReason::NoLivePlayers)
    }
}

/// The validation region must be flat and bright.
pub fn corner_gate(stats: &ChannelStats, profile: &ValidationProfile) -> Option<InvalidReason> {
    let max_std_dev = stats.max_std_dev();
    if max_std_dev >= profile.max_std_dev {
        return Some(InvalidReason::CornerNotUniform { max_std_dev });
    }
    let mean = stats.combined_mean();
    if mean <= profile.min_mean {
        return Some(InvalidReason::CornerTooDark { mean });
    }
    None
}

/// Best similarity of either replay banner layout to the reference icon.
pub fn replay_similarity(
    frame: &RgbImage,
    profile: &ReplayProfile,
    replay_icon: &RgbImage,
) -> Result<f64> {
    let regular = structural_similarity(&crop(frame, profile.icon_region), replay_icon)?;
    let preseason =
        structural_similarity(&crop(frame, profile.preseason_icon_region), replay_icon)?;
    Ok(regular.max(preseason))
}

/// A frame stays live only while similarity is strictly below the threshold.
pub fn is_replay(similarity: f64, threshold: f64) -> bool {
    similarity >= threshold
}
