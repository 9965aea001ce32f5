//! Small synthetic match used across the crate's tests.
//!
//! Frames are 64x48 with a white validation corner, a gray body and one
//! solid team color at each pick point.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, Weak},
    thread,
    time::Duration,
};

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use spectra_types::{
    config::AnalyzerConfig,
    game_type::{GameType, GameTypeProfile, ReplayProfile, ValidationProfile},
    geometry::{Point, Region, Size},
    killfeed::{KillfeedActor, KillfeedEntry},
    player::PlayerState,
    progress::{FrameReport, ProgressReporter},
    team::{MatchSetup, TeamPair, TeamSide, PLAYER_SLOTS},
    validity::FrameValidity,
    Result, SpectraError,
};
use spectra_vision::{templates::ULT_CHARGE_DIGITS, ReferenceTemplates};

use crate::{
    avatars::AvatarTemplates,
    context::MatchContext,
    extraction_error,
    extractors::{KillfeedExtractor, PlayerExtractor, PlayerRequest},
    killfeed::KillfeedScan,
    snapshot::FrameSnapshot,
};

pub const LEFT_COLOR: Rgb<u8> = Rgb([200, 30, 30]);
pub const RIGHT_COLOR: Rgb<u8> = Rgb([30, 30, 200]);

const BODY: Rgb<u8> = Rgb([60, 60, 60]);

pub fn test_profile() -> GameTypeProfile {
    GameTypeProfile {
        game_type: GameType::Owl,
        frame_size: Size::new(64, 48),
        validation: ValidationProfile {
            region: Region::new(52, 2, 8, 4),
            max_std_dev: 15.0,
            min_mean: 200.0,
        },
        replay: ReplayProfile {
            icon_region: Region::new(4, 4, 12, 12),
            preseason_icon_region: Region::new(4, 20, 12, 12),
            threshold: 0.95,
        },
        team_color_pick: TeamPair::new(Point::new(1, 40), Point::new(62, 40)),
        avatar_size: Size::new(6, 5),
        avatar_small_size: Size::new(3, 2),
    }
}

pub fn replay_icon() -> RgbImage {
    RgbImage::from_fn(12, 12, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

fn hero_icon(tint: u8) -> RgbaImage {
    RgbaImage::from_fn(6, 5, |x, y| {
        if x == 0 && y == 0 {
            Rgba([0, 0, 0, 0])
        } else if x < 2 {
            Rgba([tint, tint, tint, 128])
        } else {
            Rgba([tint, 255 - tint, tint / 2, 255])
        }
    })
}

pub fn references() -> ReferenceTemplates {
    let avatars = BTreeMap::from([
        ("ana".to_string(), hero_icon(90)),
        ("genji".to_string(), hero_icon(180)),
    ]);
    let digits = (0..ULT_CHARGE_DIGITS)
        .map(|digit| RgbImage::from_pixel(4, 6, Rgb([(digit * 20) as u8; 3])))
        .collect();
    ReferenceTemplates::new(replay_icon(), avatars, digits)
}

pub fn setup() -> MatchSetup {
    let roster = |prefix: &str| (1..=6).map(|n| format!("{prefix}{n}")).collect::<Vec<_>>();
    MatchSetup {
        team_names: TeamPair::new("Shock".to_string(), "Fuel".to_string()),
        players: TeamPair::new(roster("sf"), roster("dal")),
    }
}

pub fn match_context() -> MatchContext {
    MatchContext::with_profile(test_profile(), setup(), references()).expect("test match context")
}

pub fn analyzer_config() -> AnalyzerConfig {
    AnalyzerConfig {
        game_type: GameType::Owl,
        template_dir: "templates".to_string(),
        worker_threads: Some(4),
        worker_timeout_ms: 5_000,
    }
}

fn paint(frame: &mut RgbImage, region: Region, mut color: impl FnMut(u32, u32) -> Rgb<u8>) {
    for y in 0..region.height {
        for x in 0..region.width {
            frame.put_pixel(region.x + x, region.y + y, color(x, y));
        }
    }
}

pub fn live_frame_with_colors(left: Rgb<u8>, right: Rgb<u8>) -> RgbImage {
    let profile = test_profile();
    let mut frame = RgbImage::from_pixel(profile.frame_size.width, profile.frame_size.height, BODY);
    paint(&mut frame, profile.validation.region, |_, _| Rgb([255, 255, 255]));
    let picks = profile.team_color_pick;
    frame.put_pixel(picks.left.x, picks.left.y, left);
    frame.put_pixel(picks.right.x, picks.right.y, right);
    frame
}

pub fn live_frame() -> RgbImage {
    live_frame_with_colors(LEFT_COLOR, RIGHT_COLOR)
}

/// Live frame with the replay banner in the regular or preseason position.
pub fn replay_frame(preseason: bool) -> RgbImage {
    let profile = test_profile();
    let region = if preseason {
        profile.replay.preseason_icon_region
    } else {
        profile.replay.icon_region
    };
    let icon = replay_icon();
    let mut frame = live_frame();
    paint(&mut frame, region, |x, y| *icon.get_pixel(x, y));
    frame
}

/// Live frame whose validation corner alternates `mean - spread` and
/// `mean + spread`, giving that mean and a std-dev of `spread`.
pub fn corner_frame(mean: u8, spread: u8) -> RgbImage {
    let mut frame = live_frame();
    paint(&mut frame, test_profile().validation.region, |x, y| {
        let value = if (x + y) % 2 == 0 {
            mean - spread
        } else {
            mean + spread
        };
        Rgb([value; 3])
    });
    frame
}

pub fn player_state(slot: usize, dead: bool) -> PlayerState {
    let setup = setup();
    let side = TeamSide::of_slot(slot);
    PlayerState {
        slot,
        side,
        player_name: setup.player_name(slot).to_string(),
        team_name: setup.team_name(side).to_string(),
        hero: Some("ana".to_string()),
        is_dead: dead,
        ult_charge: Some(40),
    }
}

pub fn sample_entry(killer_hero: &str, victim_hero: &str) -> KillfeedEntry {
    KillfeedEntry::new(
        Some(KillfeedActor {
            hero: killer_hero.to_string(),
            side: TeamSide::Left,
        }),
        KillfeedActor {
            hero: victim_hero.to_string(),
            side: TeamSide::Right,
        },
    )
}

/// Append an already analysed frame showing `entries` as new kills.
pub fn record_feed(
    ctx: &mut MatchContext,
    timestamp: f64,
    entries: Vec<KillfeedEntry>,
    head: Option<KillfeedEntry>,
) {
    let mut snapshot = FrameSnapshot::new(timestamp, RgbImage::new(1, 1));
    snapshot.set_killfeed(KillfeedScan { entries, head });
    snapshot.release_frame();
    snapshot
        .set_validity(FrameValidity::Valid)
        .expect("fresh snapshot");
    ctx.record_frame(snapshot);
}

/// Player extractor answering from the request alone.
#[derive(Default)]
pub struct ScriptedPlayers {
    dead: bool,
    delay: Option<fn(usize) -> Duration>,
    failing: Option<usize>,
    panicking: Option<usize>,
    mislabelled: Option<usize>,
    frames: Mutex<Vec<Weak<RgbImage>>>,
    frame_sizes: Mutex<Vec<(u32, u32)>>,
    templates: Mutex<Vec<Arc<AvatarTemplates>>>,
}

impl ScriptedPlayers {
    pub fn alive() -> Self {
        Self::default()
    }

    pub fn dead() -> Self {
        Self {
            dead: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: fn(usize) -> Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_at(mut self, slot: usize) -> Self {
        self.failing = Some(slot);
        self
    }

    pub fn panicking_at(mut self, slot: usize) -> Self {
        self.panicking = Some(slot);
        self
    }

    pub fn mislabelling(mut self, slot: usize) -> Self {
        self.mislabelled = Some(slot);
        self
    }

    pub fn frames_seen(&self) -> Vec<Weak<RgbImage>> {
        self.frames.lock().expect("frames lock").clone()
    }

    pub fn frame_sizes(&self) -> Vec<(u32, u32)> {
        self.frame_sizes.lock().expect("sizes lock").clone()
    }

    pub fn templates_seen(&self) -> Vec<Arc<AvatarTemplates>> {
        self.templates.lock().expect("templates lock").clone()
    }
}

impl PlayerExtractor for ScriptedPlayers {
    fn extract(&self, request: &PlayerRequest) -> Result<PlayerState> {
        self.frames
            .lock()
            .expect("frames lock")
            .push(Arc::downgrade(&request.frame));
        self.frame_sizes
            .lock()
            .expect("sizes lock")
            .push(request.frame.dimensions());
        self.templates
            .lock()
            .expect("templates lock")
            .push(Arc::clone(request.avatars.templates()));

        if let Some(delay) = self.delay {
            thread::sleep(delay(request.slot));
        }
        if self.failing == Some(request.slot) {
            return Err(extraction_error(format!(
                "slot {} scoreboard unreadable",
                request.slot
            )));
        }
        if self.panicking == Some(request.slot) {
            panic!("slot {} classifier crashed", request.slot);
        }

        let slot = if self.mislabelled == Some(request.slot) {
            (request.slot + 1) % PLAYER_SLOTS
        } else {
            request.slot
        };
        Ok(PlayerState {
            slot,
            side: request.side,
            player_name: request.player_name.clone(),
            team_name: request.team_name.clone(),
            hero: request.avatars.normal().keys().next().cloned(),
            is_dead: self.dead,
            ult_charge: Some(0),
        })
    }
}

/// Kill-feed extractor reading rows from a scripted screen.
#[derive(Default)]
pub struct ScriptedKillfeed {
    rows: Mutex<Vec<Option<KillfeedEntry>>>,
    reads: Mutex<Vec<usize>>,
    failing: Mutex<Option<usize>>,
}

impl ScriptedKillfeed {
    pub fn showing(rows: Vec<Option<KillfeedEntry>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn set_screen(&self, rows: Vec<Option<KillfeedEntry>>) {
        *self.rows.lock().expect("rows lock") = rows;
        self.reads.lock().expect("reads lock").clear();
    }

    pub fn fail_at(&self, slot: usize) {
        *self.failing.lock().expect("failing lock") = Some(slot);
    }

    /// Rows read since the screen was last set, in read order.
    pub fn reads(&self) -> Vec<usize> {
        self.reads.lock().expect("reads lock").clone()
    }
}

impl KillfeedExtractor for ScriptedKillfeed {
    fn extract(
        &self,
        _frame: &RgbImage,
        slot: usize,
        _ctx: &MatchContext,
    ) -> Result<Option<KillfeedEntry>> {
        self.reads.lock().expect("reads lock").push(slot);
        if *self.failing.lock().expect("failing lock") == Some(slot) {
            return Err(extraction_error(format!("kill-feed row {slot} unreadable")));
        }
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .get(slot)
            .cloned()
            .flatten())
    }
}

/// Progress reporter that keeps every notification.
#[derive(Default)]
pub struct RecordingProgress {
    started: Mutex<Vec<f64>>,
    reports: Mutex<Vec<FrameReport>>,
    failed: Mutex<Vec<f64>>,
}

impl RecordingProgress {
    pub fn started(&self) -> Vec<f64> {
        self.started.lock().expect("started lock").clone()
    }

    pub fn reports(&self) -> Vec<FrameReport> {
        self.reports.lock().expect("reports lock").clone()
    }

    pub fn failed(&self) -> Vec<f64> {
        self.failed.lock().expect("failed lock").clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn frame_started(&self, timestamp: f64) {
        self.started.lock().expect("started lock").push(timestamp);
    }

    fn frame_analyzed(&self, report: &FrameReport) {
        self.reports.lock().expect("reports lock").push(report.clone());
    }

    fn frame_failed(&self, timestamp: f64, _error: &SpectraError) {
        self.failed.lock().expect("failed lock").push(timestamp);
    }
}
