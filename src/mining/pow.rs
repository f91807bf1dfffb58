//! Proof-of-work nonce search
//!
//! Finds the smallest nonce such that `sha256(identifier ++ decimal(nonce))`
//! rendered as hex starts with `difficulty` '0' characters.

use crate::crypto::{has_zero_prefix, meets_difficulty, sha256, sha256_hex, SHA256_HEX_LEN};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Nonces hashed between two deadline checks
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Sentinel for "no solution found yet"
const NO_SOLUTION: u64 = u64::MAX;

/// Errors returned by the bounded searches
#[derive(Error, Debug)]
pub enum PowError {
    #[error("no nonce found within {attempts} attempts ({elapsed:?})")]
    NotFound { attempts: u64, elapsed: Duration },
    #[error("difficulty {0} exceeds the 64 hex characters of a SHA-256 digest")]
    Unsatisfiable(usize),
}

/// Bounds applied to a search. The default is unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimit {
    /// Only nonces `0..max_iterations` are tried
    pub max_iterations: Option<u64>,
    /// Wall-clock budget for the whole search
    pub timeout: Option<Duration>,
}

impl SearchLimit {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn is_unbounded(&self) -> bool {
        self.max_iterations.is_none() && self.timeout.is_none()
    }
}

/// Result of a successful search
#[derive(Debug, Clone, Serialize)]
pub struct PowSolution {
    /// Exact string that was hashed
    pub content: String,
    pub nonce: u64,
    /// Full digest as lowercase hex
    pub hash: String,
    pub difficulty: usize,
    /// Number of hashes computed across all workers
    pub attempts: u64,
    pub elapsed: Duration,
}

impl PowSolution {
    /// The matched zero prefix of the digest
    pub fn prefix(&self) -> &str {
        self.hash.get(..self.difficulty).unwrap_or(&self.hash)
    }

    /// Hashes per second over the whole search
    pub fn hash_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            self.attempts as f64
        }
    }

    /// Recompute the digest of `content` and check it against `hash`
    pub fn verify(&self) -> bool {
        sha256_hex(self.content.as_bytes()) == self.hash
            && has_zero_prefix(&self.hash, self.difficulty)
    }
}

/// Reusable buffer holding `identifier ++ decimal(nonce)`
struct Candidate {
    buf: String,
    base_len: usize,
}

impl Candidate {
    fn new(identifier: &str) -> Self {
        let mut buf = String::with_capacity(identifier.len() + 20);
        buf.push_str(identifier);
        Self {
            base_len: identifier.len(),
            buf,
        }
    }

    fn set_nonce(&mut self, nonce: u64) -> &str {
        self.buf.truncate(self.base_len);
        // Writing into a String cannot fail
        let _ = write!(self.buf, "{}", nonce);
        &self.buf
    }
}

/// Build the content string for a nonce
pub fn candidate_content(identifier: &str, nonce: u64) -> String {
    format!("{}{}", identifier, nonce)
}

/// Check a claimed nonce without searching
pub fn check_proof(identifier: &str, nonce: u64, difficulty: usize) -> bool {
    let digest = sha256(candidate_content(identifier, nonce).as_bytes());
    meets_difficulty(&digest, difficulty)
}

/// Unbounded sequential search.
///
/// Blocks until a nonce is found; a difficulty above 64 never terminates.
/// Use [`ProofOfWork::solve_within`] when the search must be bounded.
pub fn find_proof_of_work(identifier: &str, difficulty: usize) -> PowSolution {
    let start = Instant::now();
    let mut candidate = Candidate::new(identifier);
    let mut nonce = 0u64;

    loop {
        let digest = sha256(candidate.set_nonce(nonce).as_bytes());
        if meets_difficulty(&digest, difficulty) {
            return PowSolution {
                content: candidate.buf,
                nonce,
                hash: hex::encode(digest),
                difficulty,
                attempts: nonce.wrapping_add(1),
                elapsed: start.elapsed(),
            };
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Proof-of-work puzzle for a fixed identifier and difficulty
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    pub identifier: String,
    pub difficulty: usize,
}

impl ProofOfWork {
    pub fn new(identifier: &str, difficulty: usize) -> Self {
        Self {
            identifier: identifier.to_string(),
            difficulty,
        }
    }

    /// Unbounded single-threaded search
    pub fn solve(&self) -> PowSolution {
        info!(
            "Searching nonce for '{}' with difficulty {}...",
            self.identifier, self.difficulty
        );
        let solution = find_proof_of_work(&self.identifier, self.difficulty);
        log_solution(&solution);
        solution
    }

    /// Single-threaded search that gives up when `limit` is reached
    pub fn solve_within(&self, limit: SearchLimit) -> Result<PowSolution, PowError> {
        self.solve_parallel(limit, 1)
    }

    /// Search split across `threads` workers.
    ///
    /// Worker `w` tries nonces `w, w + threads, w + 2 * threads, ...`. The
    /// lowest winning nonce is tracked in a shared atomic and a worker stops
    /// once its next nonce is above it, so the result is the same minimal
    /// nonce a sequential scan returns. If any worker runs out of time before
    /// a hit exists the search reports [`PowError::NotFound`], since the
    /// nonces it skipped may hold a smaller solution.
    pub fn solve_parallel(
        &self,
        limit: SearchLimit,
        threads: usize,
    ) -> Result<PowSolution, PowError> {
        if self.difficulty > SHA256_HEX_LEN {
            return Err(PowError::Unsatisfiable(self.difficulty));
        }

        let threads = threads.max(1);
        info!(
            "Searching nonce for '{}' with difficulty {} on {} thread(s)...",
            self.identifier, self.difficulty, threads
        );
        if limit.is_unbounded() {
            debug!("No search limit set");
        }

        let start = Instant::now();
        // A deadline past what `Instant` can represent means no deadline
        let deadline = limit.timeout.and_then(|t| start.checked_add(t));
        let best = AtomicU64::new(NO_SOLUTION);
        let timed_out = AtomicBool::new(false);

        let attempts: u64 = if threads == 1 {
            self.scan(0, 1, limit.max_iterations, deadline, &best, &timed_out)
        } else {
            std::thread::scope(|scope| {
                let handles: Vec<_> = (0..threads as u64)
                    .map(|worker| {
                        let best = &best;
                        let timed_out = &timed_out;
                        scope.spawn(move || {
                            debug!("Worker {} started", worker);
                            let attempts = self.scan(
                                worker,
                                threads as u64,
                                limit.max_iterations,
                                deadline,
                                best,
                                timed_out,
                            );
                            debug!("Worker {} stopped after {} attempts", worker, attempts);
                            attempts
                        })
                    })
                    .collect();

                sum_attempts(handles.into_iter().map(|handle| handle.join()))
            })
        };

        let elapsed = start.elapsed();
        let nonce = best.load(Ordering::Acquire);

        if nonce == NO_SOLUTION || timed_out.load(Ordering::Acquire) {
            warn!(
                "Search for '{}' at difficulty {} exhausted its limit after {} attempts",
                self.identifier, self.difficulty, attempts
            );
            return Err(PowError::NotFound { attempts, elapsed });
        }

        let content = candidate_content(&self.identifier, nonce);
        let hash = sha256_hex(content.as_bytes());
        let solution = PowSolution {
            content,
            nonce,
            hash,
            difficulty: self.difficulty,
            attempts,
            elapsed,
        };
        log_solution(&solution);
        Ok(solution)
    }

    /// Try nonces `first, first + step, ...` below `end`, returning the
    /// number of hashes computed. Publishes a hit into `best`.
    fn scan(
        &self,
        first: u64,
        step: u64,
        end: Option<u64>,
        deadline: Option<Instant>,
        best: &AtomicU64,
        timed_out: &AtomicBool,
    ) -> u64 {
        let mut candidate = Candidate::new(&self.identifier);
        let mut attempts = 0u64;
        let mut nonce = first;

        loop {
            if end.is_some_and(|end| nonce >= end) {
                break;
            }
            let current_best = best.load(Ordering::Acquire);
            if nonce > current_best {
                break;
            }

            let digest = sha256(candidate.set_nonce(nonce).as_bytes());
            attempts += 1;

            if meets_difficulty(&digest, self.difficulty) {
                best.fetch_min(nonce, Ordering::AcqRel);
                break;
            }

            // Once any worker has a hit the range below it is finite, so
            // the deadline only applies while nothing has been found
            if current_best == NO_SOLUTION
                && attempts % DEADLINE_CHECK_INTERVAL == 0
                && deadline.is_some_and(|d| Instant::now() >= d)
            {
                timed_out.store(true, Ordering::Release);
                break;
            }

            nonce = match nonce.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }

        attempts
    }
}

/// Total the workers' attempt counts. A panicked worker leaves its stride
/// unsearched, so the panic is re-raised rather than trusting the others.
fn sum_attempts(results: impl Iterator<Item = std::thread::Result<u64>>) -> u64 {
    results
        .map(|result| match result {
            Ok(attempts) => attempts,
            Err(payload) => std::panic::resume_unwind(payload),
        })
        .sum()
}

fn log_solution(solution: &PowSolution) {
    info!(
        "Found nonce {} in {:?} ({} attempts, {:.2} H/s)",
        solution.nonce,
        solution.elapsed,
        solution.attempts,
        solution.hash_rate()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_minimal(identifier: &str, solution: &PowSolution) -> bool {
        (0..solution.nonce).all(|n| !check_proof(identifier, n, solution.difficulty))
    }

    #[test]
    fn test_difficulty_zero_returns_nonce_zero() {
        let solution = find_proof_of_work("ruochen", 0);
        assert_eq!(solution.nonce, 0);
        assert_eq!(solution.content, "ruochen0");
        assert_eq!(solution.prefix(), "");
    }

    #[test]
    fn test_solution_has_prefix_and_is_minimal() {
        for difficulty in 1..=3 {
            let solution = find_proof_of_work("alice", difficulty);
            assert!(has_zero_prefix(&solution.hash, difficulty));
            assert!(solution.verify());
            assert!(is_minimal("alice", &solution));
            assert_eq!(solution.attempts, solution.nonce + 1);
        }
    }

    #[test]
    fn test_content_format() {
        let solution = find_proof_of_work("bob", 2);
        assert_eq!(solution.content, format!("bob{}", solution.nonce));
        assert_eq!(solution.hash, sha256_hex(solution.content.as_bytes()));
    }

    #[test]
    fn test_empty_identifier() {
        let solution = find_proof_of_work("", 2);
        assert_eq!(solution.content, solution.nonce.to_string());
        assert!(is_minimal("", &solution));
    }

    #[test]
    fn test_ruochen_difficulty_4() {
        let solution = ProofOfWork::new("ruochen", 4).solve();
        let recomputed = sha256_hex(solution.content.as_bytes());
        assert_eq!(&recomputed[..4], "0000");
        assert_eq!(recomputed, solution.hash);
        assert_eq!(solution.prefix(), "0000");
    }

    #[test]
    fn test_ruochen_difficulty_5() {
        let solution = ProofOfWork::new("ruochen", 5).solve();
        let recomputed = sha256_hex(solution.content.as_bytes());
        assert_eq!(&recomputed[..5], "00000");
        assert!(solution.content.starts_with("ruochen"));
    }

    #[test]
    fn test_bounded_matches_unbounded() {
        let pow = ProofOfWork::new("carol", 3);
        let bounded = pow
            .solve_within(SearchLimit::unbounded().with_max_iterations(1_000_000))
            .unwrap();
        let unbounded = find_proof_of_work("carol", 3);
        assert_eq!(bounded.nonce, unbounded.nonce);
        assert_eq!(bounded.hash, unbounded.hash);
    }

    #[test]
    fn test_iteration_limit_exhausted() {
        let expected = find_proof_of_work("dave", 3).nonce;
        let pow = ProofOfWork::new("dave", 3);

        // Range 0..expected excludes the winner
        match pow.solve_within(SearchLimit::unbounded().with_max_iterations(expected)) {
            Err(PowError::NotFound { attempts, .. }) => assert_eq!(attempts, expected),
            other => panic!("expected NotFound, got {:?}", other),
        }

        // One more includes it
        let solution = pow
            .solve_within(SearchLimit::unbounded().with_max_iterations(expected + 1))
            .unwrap();
        assert_eq!(solution.nonce, expected);
    }

    #[test]
    fn test_huge_timeout_means_no_deadline() {
        let limit = SearchLimit::unbounded().with_timeout(Duration::from_secs(u64::MAX));
        let pow = ProofOfWork::new("ruochen", 1);

        let solution = pow.solve_within(limit).unwrap();
        assert_eq!(solution.nonce, find_proof_of_work("ruochen", 1).nonce);

        let parallel = pow.solve_parallel(limit, 4).unwrap();
        assert_eq!(parallel.nonce, solution.nonce);
    }

    #[test]
    fn test_sum_attempts() {
        let results: Vec<std::thread::Result<u64>> = vec![Ok(3), Ok(4)];
        assert_eq!(sum_attempts(results.into_iter()), 7);
    }

    #[test]
    #[should_panic(expected = "worker failed")]
    fn test_sum_attempts_reraises_worker_panic() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("worker failed");
        let results: Vec<std::thread::Result<u64>> = vec![Ok(3), Err(payload)];
        sum_attempts(results.into_iter());
    }

    #[test]
    fn test_prefix_out_of_range() {
        let mut solution = find_proof_of_work("oscar", 1);
        solution.difficulty = SHA256_HEX_LEN + 6;
        assert_eq!(solution.prefix(), solution.hash);
        assert!(!solution.verify());
    }

    #[test]
    fn test_timeout_exhausted() {
        let pow = ProofOfWork::new("erin", 40);
        let limit = SearchLimit::unbounded().with_timeout(Duration::from_millis(50));
        assert!(matches!(pow.solve_within(limit), Err(PowError::NotFound { .. })));
        assert!(matches!(pow.solve_parallel(limit, 4), Err(PowError::NotFound { .. })));
    }

    #[test]
    fn test_unsatisfiable_difficulty() {
        let pow = ProofOfWork::new("frank", SHA256_HEX_LEN + 1);
        assert!(matches!(
            pow.solve_within(SearchLimit::unbounded()),
            Err(PowError::Unsatisfiable(65))
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        for identifier in ["ruochen", "grace", "heidi"] {
            let sequential = find_proof_of_work(identifier, 3);
            for threads in [2, 3, 8] {
                let parallel = ProofOfWork::new(identifier, 3)
                    .solve_parallel(SearchLimit::unbounded(), threads)
                    .unwrap();
                assert_eq!(parallel.nonce, sequential.nonce);
                assert_eq!(parallel.content, sequential.content);
                assert!(parallel.verify());
            }
        }
    }

    #[test]
    fn test_parallel_iteration_limit() {
        let expected = find_proof_of_work("ivan", 3).nonce;
        let result = ProofOfWork::new("ivan", 3)
            .solve_parallel(SearchLimit::unbounded().with_max_iterations(expected), 4);
        assert!(matches!(result, Err(PowError::NotFound { .. })));
    }

    #[test]
    fn test_check_proof() {
        let solution = find_proof_of_work("judy", 2);
        assert!(check_proof("judy", solution.nonce, 2));
        assert!(!check_proof("judy", solution.nonce, SHA256_HEX_LEN + 1));
    }

    #[test]
    fn test_verify_rejects_forged_hash() {
        let mut solution = find_proof_of_work("mallory", 2);
        solution.content = "mallory-forged".to_string();
        assert!(!solution.verify());
    }

    #[test]
    fn test_solution_serializes() {
        let solution = find_proof_of_work("niaj", 1);
        let json = serde_json::to_value(&solution).unwrap();
        assert_eq!(json["nonce"], solution.nonce);
        assert_eq!(json["content"], solution.content);
    }
}
