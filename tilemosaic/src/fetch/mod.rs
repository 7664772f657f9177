//! Tile download pipeline.
//!
//! The [`FetchScheduler`] takes resolved [`FetchRequest`]s and stores each
//! tile body under its destination path:
//!
//! ```text
//! FetchRequest ─► exists on disk? ──yes──► Skipped
//!                      │no
//!                      ▼
//!             GET (+ rotated User-Agent, timeout, retries)
//!                      │
//!          ┌───────────┼──────────────┐
//!          ▼           ▼              ▼
//!       text/html    non-2xx,      image body
//!       Forbidden    transport     write .part ─► rename ─► Saved
//!                    NetworkError
//! ```
//!
//! Failures are per-tile and never abort the batch. Rate-limited providers
//! are paced with a [`PolitenessPolicy`].

mod config;
mod error;
mod http;
mod identity;
mod outcome;
mod politeness;
mod request;
mod scheduler;
mod store;

pub use config::{
    SchedulerConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_RETRY_DELAY,
};
pub use error::FetchError;
pub use http::{AsyncHttpClient, HttpResponse, ReqwestClient, TransportError};
pub use identity::{IdentityPool, DEFAULT_USER_AGENT};
pub use outcome::{FailedTile, FailureReason, FetchOutcome, FetchProgress, FetchSummary};
pub use politeness::{PolitenessPolicy, DEFAULT_POLITE_DELAY, DEFAULT_POLITE_JITTER};
pub use request::FetchRequest;
pub use scheduler::{FetchScheduler, ProgressCallback};
pub use store::write_atomic;
