use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use spectra_types::{
    killfeed::{KillfeedEntry, KILLFEED_SLOTS},
    player::PlayerState,
    team::{TeamSide, PLAYER_SLOTS},
    validity::FrameValidity,
    Result,
};

use crate::{analysis_error, extraction_error, killfeed::KillfeedScan};

/// One decoded frame handed to the analyzer.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// Seconds into the source video.
    pub timestamp: f64,
    pub image: RgbImage,
}

impl SampledFrame {
    pub fn new(timestamp: f64, image: RgbImage) -> Self {
        Self { timestamp, image }
    }

    /// Wrap a tightly packed RGB8 buffer.
    pub fn from_raw_rgb(timestamp: f64, width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = data.len();
        let image = RgbImage::from_raw(width, height, data).ok_or_else(|| {
            analysis_error(format!(
                "{len} bytes do not form a {width}x{height} RGB frame"
            ))
        })?;
        Ok(Self::new(timestamp, image))
    }
}

/// Analysis result for one sampled timestamp.
///
/// The decoded frame is only held while the analyzer works on it; a snapshot
/// returned from [`crate::FrameAnalyzer::analyze`] never carries pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    timestamp: f64,
    validity: FrameValidity,
    players: Vec<PlayerState>,
    killfeed: Vec<KillfeedEntry>,
    killfeed_head: Option<KillfeedEntry>,
    #[serde(skip)]
    frame: Option<Arc<RgbImage>>,
}

impl FrameSnapshot {
    pub(crate) fn new(timestamp: f64, frame: RgbImage) -> Self {
        Self {
            timestamp,
            validity: FrameValidity::Pending,
            players: Vec::with_capacity(PLAYER_SLOTS),
            killfeed: Vec::new(),
            killfeed_head: None,
            frame: Some(Arc::new(frame)),
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn validity(&self) -> FrameValidity {
        self.validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    pub fn is_replay(&self) -> bool {
        self.validity.is_replay()
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn team(&self, side: TeamSide) -> impl Iterator<Item = &PlayerState> {
        self.players.iter().filter(move |player| player.side == side)
    }

    pub fn live_players(&self) -> usize {
        self.players.iter().filter(|player| player.is_alive()).count()
    }

    /// New kill events in chronological order, oldest first.
    pub fn killfeed(&self) -> &[KillfeedEntry] {
        &self.killfeed
    }

    /// Newest kill event visible on screen, including one already counted
    /// by an earlier frame.
    pub fn killfeed_head(&self) -> Option<&KillfeedEntry> {
        self.killfeed_head.as_ref()
    }

    pub fn frame(&self) -> Option<&RgbImage> {
        self.frame.as_deref()
    }

    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub(crate) fn frame_handle(&self) -> Result<Arc<RgbImage>> {
        self.frame
            .clone()
            .ok_or_else(|| analysis_error("frame buffer already released"))
    }

    pub(crate) fn set_players(&mut self, players: Vec<PlayerState>) -> Result<()> {
        if players.len() != PLAYER_SLOTS {
            return Err(extraction_error(format!(
                "expected {PLAYER_SLOTS} player states, got {}",
                players.len()
            )));
        }
        if let Some((index, player)) = players
            .iter()
            .enumerate()
            .find(|(index, player)| player.slot != *index || player.side != TeamSide::of_slot(*index))
        {
            return Err(extraction_error(format!(
                "player state at index {index} reports slot {} on the {:?} side",
                player.slot, player.side
            )));
        }
        self.players = players;
        Ok(())
    }

    pub(crate) fn set_killfeed(&mut self, scan: KillfeedScan) {
        debug_assert!(scan.entries.len() <= KILLFEED_SLOTS);
        self.killfeed = scan.entries;
        self.killfeed_head = scan.head;
    }

    pub(crate) fn set_validity(&mut self, validity: FrameValidity) -> Result<()> {
        if self.validity.is_terminal() {
            return Err(analysis_error(format!(
                "frame at {}s already classified as {}",
                self.timestamp,
                self.validity.label()
            )));
        }
        if !validity.is_terminal() {
            return Err(analysis_error("validity must move to a terminal state"));
        }
        self.validity = validity;
        Ok(())
    }

    pub(crate) fn release_frame(&mut self) {
        self.frame = None;
    }
}
