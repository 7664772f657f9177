//! User-agent rotation.
//!
//! Some tile servers block clients that send many requests with the same
//! identity. The pool hands out a randomly chosen user agent per request.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::io;
use std::path::Path;

/// User agent sent when no pool is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; U; Intel Mac OS X 10_6_9; us-at) AppleWebKit/533.23.1 (KHTML, like Gecko) Version/5.0.5 Safari/533.21.3";

/// Pool of user-agent strings with an injectable random source.
pub struct IdentityPool {
    agents: Vec<String>,
    rng: Mutex<StdRng>,
}

impl IdentityPool {
    /// A pool that always yields [`DEFAULT_USER_AGENT`].
    pub fn fixed() -> Self {
        Self::new(Vec::new())
    }

    /// Creates a pool from the given agents; blank entries are dropped.
    pub fn new(agents: Vec<String>) -> Self {
        Self::with_rng(agents, StdRng::from_os_rng())
    }

    /// Creates a pool with a deterministic random source.
    pub fn with_seed(agents: Vec<String>, seed: u64) -> Self {
        Self::with_rng(agents, StdRng::seed_from_u64(seed))
    }

    fn with_rng(agents: Vec<String>, rng: StdRng) -> Self {
        let agents = agents
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Self {
            agents,
            rng: Mutex::new(rng),
        }
    }

    /// Loads one user agent per line. Blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let agents = content
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .map(str::to_string)
            .collect();
        Ok(Self::new(agents))
    }

    /// Picks a user agent for the next request.
    pub fn pick(&self) -> String {
        let mut rng = self.rng.lock();
        self.agents
            .choose(&mut *rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self::fixed()
    }
}
