//! Per-variant screen layout and decision thresholds.
//!
//! Each [`GameType`] resolves to a single [`GameTypeProfile`] at match start so
//! that regions and thresholds for one variant always travel together.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Point, Region, Size},
    team::TeamPair,
    Result, SpectraError,
};

/// Broadcast layouts the analyzer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// League broadcast HUD.
    Owl,
    /// Custom-game spectator HUD.
    Custom,
}

impl GameType {
    pub fn profile(self) -> GameTypeProfile {
        GameTypeProfile::for_game_type(self)
    }
}

/// Frame validation gate settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationProfile {
    /// Near-uniform HUD element only drawn during live play.
    pub region: Region,
    /// Frames whose largest channel std-dev reaches this are rejected.
    pub max_std_dev: f64,
    /// Frames whose mean of channel means is at or below this are rejected.
    pub min_mean: f64,
}

/// Replay banner detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayProfile {
    pub icon_region: Region,
    pub preseason_icon_region: Region,
    /// Similarity at or above this marks the frame as a replay.
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameTypeProfile {
    pub game_type: GameType,
    /// Resolution every sampled frame is normalised to before analysis.
    pub frame_size: Size,
    pub validation: ValidationProfile,
    pub replay: ReplayProfile,
    /// Pixels sampled once per match to learn each team's color.
    pub team_color_pick: TeamPair<Point>,
    pub avatar_size: Size,
    pub avatar_small_size: Size,
}

const FRAME_SIZE: Size = Size::new(1280, 720);
const AVATAR_SIZE: Size = Size::new(45, 35);
const AVATAR_SMALL_SIZE: Size = Size::new(33, 26);

impl GameTypeProfile {
    pub fn for_game_type(game_type: GameType) -> Self {
        match game_type {
            GameType::Owl => Self {
                game_type,
                frame_size: FRAME_SIZE,
                validation: ValidationProfile {
                    region: Region::new(1236, 16, 24, 8),
                    max_std_dev: 15.0,
                    min_mean: 200.0,
                },
                replay: ReplayProfile {
                    icon_region: Region::new(90, 98, 48, 48),
                    preseason_icon_region: Region::new(90, 118, 48, 48),
                    threshold: 0.5,
                },
                team_color_pick: TeamPair::new(Point::new(30, 104), Point::new(1250, 104)),
                avatar_size: AVATAR_SIZE,
                avatar_small_size: AVATAR_SMALL_SIZE,
            },
            GameType::Custom => Self {
                game_type,
                frame_size: FRAME_SIZE,
                validation: ValidationProfile {
                    region: Region::new(1240, 20, 20, 6),
                    max_std_dev: 20.0,
                    min_mean: 180.0,
                },
                replay: ReplayProfile {
                    icon_region: Region::new(84, 92, 48, 48),
                    preseason_icon_region: Region::new(84, 112, 48, 48),
                    threshold: 0.55,
                },
                team_color_pick: TeamPair::new(Point::new(36, 96), Point::new(1244, 96)),
                avatar_size: AVATAR_SIZE,
                avatar_small_size: AVATAR_SMALL_SIZE,
            },
        }
    }

    /// Check that every region and pick point lies inside the frame.
    pub fn validate(&self) -> Result<()> {
        let frame = self.frame_size;
        let regions = [
            ("validation.region", self.validation.region),
            ("replay.icon_region", self.replay.icon_region),
            (
                "replay.preseason_icon_region",
                self.replay.preseason_icon_region,
            ),
        ];
        for (name, region) in regions {
            if !region.fits_within(frame) {
                return Err(SpectraError::Configuration(format!(
                    "{:?} profile: {name} {region:?} lies outside {}x{} frame",
                    self.game_type, frame.width, frame.height
                )));
            }
        }
        if self.replay.icon_region.size() != self.replay.preseason_icon_region.size() {
            return Err(SpectraError::Configuration(format!(
                "{:?} profile: replay icon regions must share one size",
                self.game_type
            )));
        }
        for point in [self.team_color_pick.left, self.team_color_pick.right] {
            if !point.fits_within(frame) {
                return Err(SpectraError::Configuration(format!(
                    "{:?} profile: team color pick {point:?} lies outside frame",
                    self.game_type
                )));
            }
        }
        if self.avatar_size.area() == 0 || self.avatar_small_size.area() == 0 {
            return Err(SpectraError::Configuration(format!(
                "{:?} profile: avatar sizes must be non-empty",
                self.game_type
            )));
        }
        if !(self.replay.threshold > 0.0 && self.replay.threshold <= 1.0) {
            return Err(SpectraError::Configuration(format!(
                "{:?} profile: replay threshold must be in (0, 1]",
                self.game_type
            )));
        }
        Ok(())
    }
}
