//! Parallel player extraction on a long-lived worker pool.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread,
    time::Duration,
};

use futures::future::{self, try_join_all};
use image::RgbImage;
use rayon::{ThreadPool, ThreadPoolBuilder};
use spectra_types::{
    player::PlayerState,
    team::{TeamSide, PLAYER_SLOTS},
    Result, SpectraError,
};
use tokio::{sync::oneshot, time::timeout};
use tracing::{debug, info};

use crate::{
    analysis_error,
    avatars::{AvatarTemplates, SlotAvatars},
    context::MatchContext,
    extraction_error,
    extractors::{PlayerExtractor, PlayerRequest},
};

pub struct PlayerDispatcher {
    pool: ThreadPool,
    worker_timeout: Duration,
}

impl PlayerDispatcher {
    /// `threads` defaults to the number of available execution units.
    pub fn new(threads: Option<usize>, worker_timeout: Duration) -> Result<Self> {
        let threads = threads.unwrap_or_else(default_parallelism);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("spectra-player-{index}"))
            .build()
            .map_err(|err| analysis_error(format!("failed to start player pool: {err}")))?;
        info!(
            "Player extraction pool ready: {} threads, {}ms worker timeout",
            threads,
            worker_timeout.as_millis()
        );
        Ok(Self {
            pool,
            worker_timeout,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every request on the pool and collect states in submission order.
    ///
    /// Each slot's timeout starts when a pool thread picks it up, so time
    /// spent queued behind other slots does not count. The first failure,
    /// panic or timeout fails the whole batch; slots not yet started are
    /// then withdrawn and never see the frame.
    pub async fn dispatch(
        &self,
        extractor: &Arc<dyn PlayerExtractor>,
        requests: Vec<PlayerRequest>,
    ) -> Result<Vec<PlayerState>> {
        let limit = self.worker_timeout;
        let timeout_ms = limit.as_millis() as u64;
        let aborted = Arc::new(AtomicBool::new(false));
        // A slot can only queue behind whole rounds of earlier slots, each
        // bounded by `limit`. Waiting longer means the pool is wedged.
        let threads = self.threads().max(1);
        let rounds = (requests.len() + threads - 1) / threads;
        let queue_limit = limit * rounds.max(1) as u32;

        let pending = requests
            .into_iter()
            .map(|request| {
                let slot = request.slot;
                let side = request.side;
                let queued = QueuedRequest::new(request, Arc::clone(&aborted));
                let job = queued.clone_handle();
                let extractor = Arc::clone(extractor);
                let (started_tx, started_rx) = oneshot::channel();
                let (tx, rx) = oneshot::channel();
                self.pool.spawn(move || {
                    let Some(request) = job.take_unless_aborted() else {
                        return;
                    };
                    let _ = started_tx.send(());
                    let outcome =
                        panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(&request)))
                            .unwrap_or_else(|_| {
                                Err(extraction_error(format!(
                                    "player slot {slot} extractor panicked"
                                )))
                            });
                    drop(request);
                    let failed = outcome.is_err();
                    let _ = tx.send(outcome);
                    if failed {
                        job.abort();
                    }
                });

                async move {
                    let _queued = queued;
                    match timeout(queue_limit, started_rx).await {
                        Ok(Ok(())) => {}
                        // Withdrawn after another slot failed; that failure
                        // resolves the batch.
                        Ok(Err(_)) => return future::pending().await,
                        Err(_) => return Err(SpectraError::WorkerTimeout { slot, timeout_ms }),
                    }
                    match timeout(limit, rx).await {
                        Ok(Ok(outcome)) => outcome.and_then(|state| check_slot(slot, side, state)),
                        Ok(Err(_)) => Err(extraction_error(format!(
                            "player slot {slot} worker exited without a result"
                        ))),
                        Err(_) => Err(SpectraError::WorkerTimeout { slot, timeout_ms }),
                    }
                }
            })
            .collect::<Vec<_>>();

        let outcome = try_join_all(pending).await;
        if outcome.is_err() {
            aborted.store(true, Ordering::Release);
        }
        let states = outcome?;
        debug!("Collected {} player states", states.len());
        Ok(states)
    }
}

/// A request parked for one pool job.
///
/// The pool takes it out when the job starts. Dropping the owning handle on
/// the async side withdraws a request no thread has picked up yet, releasing
/// its frame handle immediately.
struct QueuedRequest {
    request: Arc<Mutex<Option<PlayerRequest>>>,
    aborted: Arc<AtomicBool>,
    owner: bool,
}

impl QueuedRequest {
    fn new(request: PlayerRequest, aborted: Arc<AtomicBool>) -> Self {
        Self {
            request: Arc::new(Mutex::new(Some(request))),
            aborted,
            owner: true,
        }
    }

    fn clone_handle(&self) -> Self {
        Self {
            request: Arc::clone(&self.request),
            aborted: Arc::clone(&self.aborted),
            owner: false,
        }
    }

    fn take(&self) -> Option<PlayerRequest> {
        self.request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// `None` once the batch has failed; the owner drops the request unseen.
    fn take_unless_aborted(&self) -> Option<PlayerRequest> {
        if self.aborted.load(Ordering::Acquire) {
            return None;
        }
        self.take()
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }
}

impl Drop for QueuedRequest {
    fn drop(&mut self) {
        if self.owner {
            drop(self.take());
        }
    }
}

fn check_slot(slot: usize, side: TeamSide, state: PlayerState) -> Result<PlayerState> {
    if state.slot != slot || state.side != side {
        return Err(extraction_error(format!(
            "player slot {slot} returned state for slot {} ({:?})",
            state.slot, state.side
        )));
    }
    Ok(state)
}

fn default_parallelism() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

/// One request per player slot, 0-5 left team then 6-11 right team.
pub fn player_requests(
    ctx: &MatchContext,
    frame: &Arc<RgbImage>,
    templates: &Arc<AvatarTemplates>,
) -> Vec<PlayerRequest> {
    let setup = ctx.setup();
    (0..PLAYER_SLOTS)
        .map(|slot| {
            let side = TeamSide::of_slot(slot);
            PlayerRequest {
                slot,
                side,
                game_type: ctx.game_type(),
                player_name: setup.player_name(slot).to_string(),
                team_name: setup.team_name(side).to_string(),
                avatars: SlotAvatars::new(Arc::clone(templates), side),
                frame: Arc::clone(frame),
                references: Arc::clone(ctx.references()),
            }
        })
        .collect()
}
