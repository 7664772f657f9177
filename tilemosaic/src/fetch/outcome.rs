//! Per-tile outcomes and the batch summary.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::request::FetchRequest;
use crate::coord::TileCoord;

/// Why a tile could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Connection failure, non-2xx status, or an unusable body
    NetworkError(String),
    /// The server answered with an HTML page instead of a tile
    ForbiddenResponse,
    /// The request did not finish within the timeout
    Timeout,
    /// The tile arrived but could not be stored
    WriteFailed(String),
}

impl FailureReason {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureReason::NetworkError(_) | FailureReason::Timeout)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NetworkError(msg) => write!(f, "network error: {}", msg),
            FailureReason::ForbiddenResponse => write!(f, "forbidden (HTML response)"),
            FailureReason::Timeout => write!(f, "timed out"),
            FailureReason::WriteFailed(msg) => write!(f, "write failed: {}", msg),
        }
    }
}

/// Result of processing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Downloaded and stored at the path
    Saved(PathBuf),
    /// Already present on disk; no request was made
    Skipped(PathBuf),
    Failed(FailureReason),
}

/// A tile that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTile {
    pub tile: TileCoord,
    pub url: String,
    pub reason: FailureReason,
}

/// Tally of a finished (or cancelled) batch.
#[derive(Debug, Clone, Default)]
pub struct FetchSummary {
    /// Number of distinct requests in the batch
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: Vec<FailedTile>,
    /// The batch was cancelled before every request completed
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl FetchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record(&mut self, request: &FetchRequest, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Saved(_) => self.saved += 1,
            FetchOutcome::Skipped(_) => self.skipped += 1,
            FetchOutcome::Failed(reason) => self.failed.push(FailedTile {
                tile: request.tile,
                url: request.url.clone(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Requests that reached a final outcome.
    pub fn completed(&self) -> usize {
        self.saved + self.skipped + self.failed.len()
    }

    /// True when every tile is now on disk.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failed.is_empty() && self.completed() == self.total
    }

    /// Completed fraction in `0.0..=1.0`; an empty batch counts as done.
    pub fn progress_ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed() as f64 / self.total as f64
        }
    }
}

impl fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} saved, {} skipped, {} failed of {} tiles",
            self.saved,
            self.skipped,
            self.failed.len(),
            self.total
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// Progress snapshot delivered after each completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub completed: usize,
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FetchProgress {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

impl From<&FetchSummary> for FetchProgress {
    fn from(summary: &FetchSummary) -> Self {
        Self {
            completed: summary.completed(),
            total: summary.total,
            saved: summary.saved,
            skipped: summary.skipped,
            failed: summary.failed.len(),
        }
    }
}
