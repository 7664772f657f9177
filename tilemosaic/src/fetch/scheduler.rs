//! Concurrent tile download scheduler.
//!
//! # Lanes
//!
//! Requests are split into lanes before the batch starts:
//!
//! - the **open lane** holds every request for providers without rate limits;
//!   each one runs as its own task as soon as a permit is free, so a finished
//!   download is replaced immediately rather than waiting for a round to end
//! - each **paced lane** holds the requests for one rate-limited provider and
//!   runs them one after another, sleeping a randomized pause after every
//!   network request
//!
//! All lanes draw from one semaphore sized to the configured concurrency.
//! A paced lane releases its permit before pausing, so its pauses never slow
//! down other providers.
//!
//! Outcomes are funnelled through a channel to a single collector, which owns
//! the summary and invokes the progress callback in completion order.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use futures::FutureExt;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::SchedulerConfig;
use super::error::FetchError;
use super::http::{AsyncHttpClient, HttpResponse, TransportError};
use super::identity::IdentityPool;
use super::outcome::{FailureReason, FetchOutcome, FetchProgress, FetchSummary};
use super::request::FetchRequest;
use super::store::write_atomic;

/// Callback receiving a progress snapshot after every completed request.
pub type ProgressCallback = Arc<dyn Fn(FetchProgress) + Send + Sync>;

type Completion = (FetchRequest, FetchOutcome);

/// Downloads batches of tiles with bounded concurrency.
pub struct FetchScheduler<C: AsyncHttpClient> {
    worker: Arc<TileWorker<C>>,
    config: SchedulerConfig,
    progress: Option<ProgressCallback>,
    cancel: CancellationToken,
    rng: Mutex<StdRng>,
}

impl<C: AsyncHttpClient> FetchScheduler<C> {
    /// Creates a scheduler using the default identity pool.
    pub fn new(client: C, config: SchedulerConfig) -> Self {
        Self {
            worker: Arc::new(TileWorker {
                client,
                identities: IdentityPool::fixed(),
                config: config.clone(),
            }),
            config,
            progress: None,
            cancel: CancellationToken::new(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Rotates user agents from the given pool.
    pub fn with_identities(mut self, identities: IdentityPool) -> Self {
        self.rebuild_worker(|worker| worker.identities = identities);
        self
    }

    /// Registers a progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(FetchProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Uses an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Seeds the randomness used for politeness pauses.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Token that cancels the running batch when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn rebuild_worker(&mut self, update: impl FnOnce(&mut TileWorker<C>)) {
        // Builders run before any batch, so the worker is not shared yet.
        if let Some(worker) = Arc::get_mut(&mut self.worker) {
            update(worker);
        }
    }

    /// Runs a batch to completion or cancellation.
    ///
    /// Individual tile failures never abort the batch; they are reported in
    /// the returned summary. The only error is an output directory that
    /// cannot be created.
    pub async fn run(&self, requests: Vec<FetchRequest>) -> Result<FetchSummary, FetchError> {
        let started = Instant::now();
        let requests = dedupe(requests);
        let mut summary = FetchSummary::new(requests.len());

        create_output_dirs(&requests).await?;

        if requests.is_empty() {
            return Ok(summary);
        }

        let (open, paced) = split_lanes(requests);
        info!(
            total = summary.total,
            open = open.len(),
            paced_lanes = paced.len(),
            concurrency = self.config.concurrency(),
            "Starting tile fetch"
        );

        let permits = Arc::new(Semaphore::new(self.config.concurrency()));
        let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

        let mut lanes = Vec::with_capacity(paced.len() + 1);
        lanes.push(tokio::spawn(run_open_lane(
            Arc::clone(&self.worker),
            open,
            Arc::clone(&permits),
            tx.clone(),
            self.cancel.clone(),
        )));
        for (provider, queue) in paced {
            let rng = StdRng::from_rng(&mut *self.rng.lock());
            lanes.push(tokio::spawn(run_paced_lane(
                Arc::clone(&self.worker),
                provider,
                queue,
                Arc::clone(&permits),
                tx.clone(),
                self.cancel.clone(),
                rng,
            )));
        }
        drop(tx);

        while let Some((request, outcome)) = rx.recv().await {
            summary.record(&request, &outcome);
            if let Some(callback) = &self.progress {
                callback(FetchProgress::from(&summary));
            }
        }

        for result in join_all(lanes).await {
            if let Err(e) = result {
                warn!(error = %e, "Fetch lane ended abnormally");
            }
        }

        summary.cancelled = self.cancel.is_cancelled() && summary.completed() < summary.total;
        summary.elapsed = started.elapsed();

        info!(
            saved = summary.saved,
            skipped = summary.skipped,
            failed = summary.failed_count(),
            cancelled = summary.cancelled,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Tile fetch finished"
        );

        Ok(summary)
    }
}

/// Drops repeated destinations, keeping the first request for each.
fn dedupe(requests: Vec<FetchRequest>) -> Vec<FetchRequest> {
    let mut seen = HashSet::new();
    requests
        .into_iter()
        .filter(|r| {
            let fresh = seen.insert(r.destination.clone());
            if !fresh {
                debug!(destination = %r.destination.display(), "Dropping duplicate request");
            }
            fresh
        })
        .collect()
}

async fn create_output_dirs(requests: &[FetchRequest]) -> Result<(), FetchError> {
    let dirs: HashSet<PathBuf> = requests
        .iter()
        .filter_map(|r| r.destination.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .collect();

    for dir in dirs {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| FetchError::OutputDirectory { path: dir, source })?;
    }
    Ok(())
}

fn split_lanes(
    requests: Vec<FetchRequest>,
) -> (VecDeque<FetchRequest>, BTreeMap<&'static str, VecDeque<FetchRequest>>) {
    let mut open = VecDeque::new();
    let mut paced: BTreeMap<&'static str, VecDeque<FetchRequest>> = BTreeMap::new();
    for request in requests {
        if request.spec.is_rate_limited() {
            paced
                .entry(request.spec.provider_name())
                .or_default()
                .push_back(request);
        } else {
            open.push_back(request);
        }
    }
    (open, paced)
}

async fn run_open_lane<C: AsyncHttpClient>(
    worker: Arc<TileWorker<C>>,
    mut queue: VecDeque<FetchRequest>,
    permits: Arc<Semaphore>,
    tx: mpsc::UnboundedSender<Completion>,
    cancel: CancellationToken,
) {
    let mut tasks = JoinSet::new();

    while let Some(request) = queue.pop_front() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&permits).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let worker = Arc::clone(&worker);
        let tx = tx.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let result = fetch_guarded(&worker, &request, &cancel).await;
            drop(permit);
            if let Some((outcome, _)) = result {
                let _ = tx.send((request, outcome));
            }
        });

        // Reap finished tasks so the set stays bounded by the permit count.
        while let Some(result) = tasks.try_join_next() {
            if let Err(e) = result {
                warn!(error = %e, "Download task ended abnormally");
            }
        }
    }

    // In-flight tasks observe the token themselves and stop at the next
    // network wait, so joining here never leaves a half-written tile.
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "Download task ended abnormally");
        }
    }
}

async fn run_paced_lane<C: AsyncHttpClient>(
    worker: Arc<TileWorker<C>>,
    provider: &'static str,
    mut queue: VecDeque<FetchRequest>,
    permits: Arc<Semaphore>,
    tx: mpsc::UnboundedSender<Completion>,
    cancel: CancellationToken,
    mut rng: StdRng,
) {
    let politeness = worker.config.politeness();

    while let Some(request) = queue.pop_front() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = permits.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let result = fetch_guarded(&worker, &request, &cancel).await;
        drop(permit);

        let Some((outcome, contacted)) = result else {
            break;
        };
        let _ = tx.send((request, outcome));

        if contacted && !queue.is_empty() && !politeness.is_disabled() {
            let pause = politeness.pause(&mut rng);
            debug!(provider, pause_ms = pause.as_millis() as u64, "Pausing rate-limited provider");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }
}

/// Runs one request, turning a panic below it into a failed tile so the
/// batch still accounts for every request.
async fn fetch_guarded<C: AsyncHttpClient>(
    worker: &TileWorker<C>,
    request: &FetchRequest,
    cancel: &CancellationToken,
) -> Option<(FetchOutcome, bool)> {
    match AssertUnwindSafe(worker.fetch(request, cancel))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!(tile = %request.tile, url = %request.url, "Download task panicked");
            let reason = FailureReason::NetworkError("download task panicked".to_string());
            Some((FetchOutcome::Failed(reason), true))
        }
    }
}

/// Shared per-request logic: dedup check, retries, classification, storage.
struct TileWorker<C: AsyncHttpClient> {
    client: C,
    identities: IdentityPool,
    config: SchedulerConfig,
}

impl<C: AsyncHttpClient> TileWorker<C> {
    /// Processes one request.
    ///
    /// Returns `None` when cancelled before reaching an outcome. The flag
    /// reports whether the server was contacted.
    async fn fetch(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Option<(FetchOutcome, bool)> {
        if tokio::fs::try_exists(&request.destination)
            .await
            .unwrap_or(false)
        {
            debug!(tile = %request.tile, "Tile already present, skipping");
            return Some((FetchOutcome::Skipped(request.destination.clone()), false));
        }

        let mut attempt = 0;
        loop {
            let outcome = self.attempt(request, cancel).await?;
            match &outcome {
                FetchOutcome::Failed(reason)
                    if reason.is_retryable() && attempt < self.config.max_retries() =>
                {
                    attempt += 1;
                    let delay = self.config.retry_delay(attempt);
                    debug!(
                        tile = %request.tile,
                        attempt,
                        reason = %reason,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying tile"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return None,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                FetchOutcome::Failed(reason) => {
                    warn!(tile = %request.tile, url = %request.url, reason = %reason, "Tile fetch failed");
                    return Some((outcome, true));
                }
                _ => {
                    debug!(tile = %request.tile, "Tile saved");
                    return Some((outcome, true));
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Option<FetchOutcome> {
        let mut headers = request.headers.clone();
        headers.push(("User-Agent".to_string(), self.identities.pick()));

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            result = tokio::time::timeout(
                self.config.request_timeout(),
                self.client.get(&request.url, &headers),
            ) => result,
        };

        let response = match result {
            Err(_) | Ok(Err(TransportError::Timeout)) => {
                return Some(FetchOutcome::Failed(FailureReason::Timeout))
            }
            Ok(Err(TransportError::Connection(msg))) => {
                return Some(FetchOutcome::Failed(FailureReason::NetworkError(msg)))
            }
            Ok(Ok(response)) => response,
        };

        if let Err(reason) = classify(&response) {
            return Some(FetchOutcome::Failed(reason));
        }

        // Not cancellable: the tile is either fully stored or absent.
        let outcome = match write_atomic(&request.destination, &response.body).await {
            Ok(()) => FetchOutcome::Saved(request.destination.clone()),
            Err(e) => FetchOutcome::Failed(FailureReason::WriteFailed(e.to_string())),
        };
        Some(outcome)
    }
}

/// Decides whether a response body is a storable tile.
fn classify(response: &HttpResponse) -> Result<(), FailureReason> {
    if !response.is_success() {
        return Err(FailureReason::NetworkError(format!(
            "HTTP {}",
            response.status
        )));
    }
    if response.is_html() {
        return Err(FailureReason::ForbiddenResponse);
    }
    if response.body.is_empty() {
        return Err(FailureReason::NetworkError("empty response body".to_string()));
    }
    if response.is_image() || image::guess_format(&response.body).is_ok() {
        return Ok(());
    }
    Err(FailureReason::NetworkError(format!(
        "unexpected content type '{}'",
        response.content_type.as_deref().unwrap_or("none")
    )))
}
