//! Frame analyzer tying player dispatch, kill-feed dedup and validity gates
//! together for one sampled timestamp at a time.

use std::{sync::Arc, time::Instant};

use spectra_types::{
    config::AnalyzerConfig,
    progress::{FrameReport, ProgressReporter},
    Result,
};
use spectra_vision::resize;
use tracing::{debug, info};

use crate::{
    analysis_error,
    avatars::{self, AvatarSource},
    context::MatchContext,
    dispatch::{player_requests, PlayerDispatcher},
    extractors::{KillfeedExtractor, PlayerExtractor},
    killfeed,
    snapshot::{FrameSnapshot, SampledFrame},
    validation,
};

pub struct FrameAnalyzer {
    dispatcher: PlayerDispatcher,
    players: Arc<dyn PlayerExtractor>,
    killfeed: Arc<dyn KillfeedExtractor>,
    progress: Arc<dyn ProgressReporter>,
}

impl FrameAnalyzer {
    pub fn new(
        config: &AnalyzerConfig,
        players: Arc<dyn PlayerExtractor>,
        killfeed: Arc<dyn KillfeedExtractor>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<Self> {
        config.validate()?;
        let dispatcher = PlayerDispatcher::new(config.worker_threads, config.worker_timeout())?;
        Ok(Self {
            dispatcher,
            players,
            killfeed,
            progress,
        })
    }

    pub fn worker_threads(&self) -> usize {
        self.dispatcher.threads()
    }

    /// Analyse one frame against the match state.
    ///
    /// Invalid and replay frames are regular results. An `Err` means the
    /// frame could not be classified at all. In every case the decoded frame
    /// has been dropped by the time this returns.
    ///
    /// Player extraction runs on the analyzer's worker pool, but avatar
    /// synthesis, the kill-feed scan and the validity gates run on the
    /// calling task and block it. Callers on a shared runtime should drive
    /// this from `spawn_blocking` or a dedicated runtime thread.
    pub async fn analyze(&self, ctx: &MatchContext, sample: SampledFrame) -> Result<FrameSnapshot> {
        let started = Instant::now();
        let timestamp = sample.timestamp;
        self.progress.frame_started(timestamp);

        match self.analyze_frame(ctx, sample).await {
            Ok(snapshot) => {
                self.progress.frame_analyzed(&FrameReport {
                    timestamp,
                    validity: snapshot.validity(),
                    live_players: snapshot.live_players(),
                    killfeed_entries: snapshot.killfeed().len(),
                    elapsed: started.elapsed(),
                });
                Ok(snapshot)
            }
            Err(err) => {
                self.progress.frame_failed(timestamp, &err);
                Err(err)
            }
        }
    }

    /// Analyse one frame and append it to the match history.
    pub async fn process<'a>(
        &self,
        ctx: &'a mut MatchContext,
        sample: SampledFrame,
    ) -> Result<&'a FrameSnapshot> {
        let snapshot = self.analyze(ctx, sample).await?;
        Ok(ctx.record_frame(snapshot))
    }

    async fn analyze_frame(&self, ctx: &MatchContext, sample: SampledFrame) -> Result<FrameSnapshot> {
        let SampledFrame { timestamp, image } = sample;
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(analysis_error(format!("invalid frame timestamp {timestamp}")));
        }

        let frame_size = ctx.profile().frame_size;
        let image = if image.dimensions() == (frame_size.width, frame_size.height) {
            image
        } else {
            debug!(
                "Normalising {:?} frame to {}x{}",
                image.dimensions(),
                frame_size.width,
                frame_size.height
            );
            resize(&image, frame_size)
        };

        let mut snapshot = FrameSnapshot::new(timestamp, image);
        let outcome = self.run_pipeline(ctx, &mut snapshot).await;
        snapshot.release_frame();
        outcome.map(|()| snapshot)
    }

    async fn run_pipeline(&self, ctx: &MatchContext, snapshot: &mut FrameSnapshot) -> Result<()> {
        let frame = snapshot.frame_handle()?;
        let resolved = avatars::resolve(ctx, &frame)?;

        let requests = player_requests(ctx, &frame, &resolved.templates);
        let players = self.dispatcher.dispatch(&self.players, requests).await?;
        snapshot.set_players(players)?;

        let scan = killfeed::collect(self.killfeed.as_ref(), &frame, ctx)?;
        snapshot.set_killfeed(scan);

        let validity = validation::evaluate(snapshot.players(), &frame, ctx)?;
        if validity.is_valid() && resolved.source == AvatarSource::Provisional {
            ctx.lock_appearance(resolved.templates);
            info!(
                "Match {} appearance learned from frame at {:.2}s",
                ctx.id(),
                snapshot.timestamp()
            );
        }
        snapshot.set_validity(validity)
    }
}
