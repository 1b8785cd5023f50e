//! Short unique id generation for tasks and initiatives.
//!
//! Ids are the first hex characters of a SHA-256 over a seed (the display
//! name), a monotonic counter, the current time, and random salt. Callers
//! retry on collision with the existing ids.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Number of hex characters in a generated id.
pub const ID_LENGTH: usize = 6;

/// Attempts before giving up on finding a free id.
pub const MAX_ATTEMPTS: usize = 32;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Produces candidate ids for one creation request.
#[derive(Debug)]
pub struct IdGenerator {
    seed: String,
    attempts: usize,
}

impl IdGenerator {
    /// Create a generator seeded with a display name.
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            attempts: 0,
        }
    }

    /// Next candidate id, or `None` once the attempt budget is spent.
    ///
    /// Later attempts use longer ids to escape dense collision ranges.
    pub fn next_id(&mut self) -> Option<String> {
        if self.attempts >= MAX_ATTEMPTS {
            return None;
        }
        self.attempts += 1;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let salt: u64 = rand::random();

        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update(sequence.to_le_bytes());
        hasher.update(nanos.to_le_bytes());
        hasher.update(salt.to_le_bytes());
        let digest = hasher.finalize();

        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        let len = ID_LENGTH + self.attempts / 8;
        Some(hex[..len.min(hex.len())].to_string())
    }

    /// First candidate that `is_taken` rejects, or `None` if every attempt
    /// collided.
    pub fn find_free(&mut self, is_taken: impl Fn(&str) -> bool) -> Option<String> {
        while let Some(id) = self.next_id() {
            if !is_taken(&id) {
                return Some(id);
            }
        }
        None
    }
}
