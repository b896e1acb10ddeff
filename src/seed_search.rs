// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Parallel brute force over the seed space.
//!
//! The interval of candidate seeds is split into contiguous slices, one
//! per worker thread. Each worker replays the observations against freshly
//! seeded generators and collects candidates locally; results are merged
//! only after the workers are joined, so the hot path takes no locks. A
//! shared completion flag latches once any worker finds a perfect match
//! or the reporter sees the whole space covered.

use std::io::Write as _;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::{rngs, stats, strings, utils};

const REPORT_INTERVAL: Duration = Duration::from_millis(150);

/// Candidate seed paired with the share of observations it replayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Answer {
    pub seed: u32,
    pub confidence: f64,
}

/// Divide the seed space among the workers. The first (work mod workers)
/// slices take one extra seed.
pub fn divide_labor(size_of_work: u64, number_of_workers: u64) -> Vec<u64> {
    let work = size_of_work / number_of_workers;
    let mut leftover = size_of_work % number_of_workers;
    (0..number_of_workers)
        .map(|_| {
            if leftover > 0 {
                leftover -= 1;
                work + 1
            } else {
                work
            }
        })
        .collect()
}

/// Test every seed in [start, end). Observations are consumed in order but
/// non-matching outputs in between are skipped, so a candidate scores by
/// how much of the observation list appears as an ordered subsequence of
/// its first `depth` outputs.
#[allow(clippy::too_many_arguments)]
fn brute_force(
    observations: &[u32],
    rng_name: &str,
    start: u64,
    end: u64,
    depth: u32,
    minimum_confidence: f64,
    completed: &AtomicBool,
    progress: &AtomicU64,
) -> Vec<Answer> {
    let mut generator = match rngs::from_name(rng_name) {
        Ok(generator) => generator,
        Err(_) => return Vec::new(),
    };
    let total = observations.len();
    let mut answers = Vec::new();
    for candidate in start..end {
        generator.seed(candidate as u32);
        let mut matches = 0usize;
        for _ in 0..depth {
            if generator.random() == observations[matches] {
                matches += 1;
                if matches == total {
                    break;
                }
            }
        }
        if completed.load(Ordering::Relaxed) {
            break; // another worker already found the seed
        }
        progress.store(candidate - start + 1, Ordering::Relaxed);
        let confidence = stats::confidence(matches, total);
        if confidence >= minimum_confidence {
            answers.push(Answer {
                seed: candidate as u32,
                confidence,
            });
        }
        if matches == total {
            completed.store(true, Ordering::Relaxed);
        }
    }
    answers
}

/// Aggregate worker progress every 150ms onto one overwriting stderr row.
/// Latches the completion flag once the whole space has been covered and
/// exits as soon as the flag is set, from whatever cause.
fn report_progress(completed: &AtomicBool, progress: &[AtomicU64], total_work: u64) {
    let start = Instant::now();
    while !completed.load(Ordering::Relaxed) {
        let sum: u64 = progress.iter().map(|slot| slot.load(Ordering::Relaxed)).sum();
        let percent = (sum as f64 / total_work as f64) * 100.0;
        if percent >= 100.0 {
            completed.store(true, Ordering::Relaxed);
        }
        eprint!(
            "\r{}Progress: {:.2}% ({}s elapsed)",
            strings::CLEAR_LINE,
            percent,
            start.elapsed().as_secs()
        );
        let _ = std::io::stderr().flush();
        thread::sleep(REPORT_INTERVAL);
    }
    eprint!("\r{}", strings::CLEAR_LINE);
    let _ = std::io::stderr().flush();
}

/// Fan the seed interval [lower, upper] out over worker threads and
/// collect every candidate at or above the confidence floor, in
/// worker-then-discovery order.
pub fn find_seed(
    observations: &[u32],
    rng_name: &str,
    threads: usize,
    minimum_confidence: f64,
    lower: u32,
    upper: u32,
    depth: u32,
) -> Vec<Answer> {
    let span_start = lower as u64;
    let span_end = upper as u64 + 1;
    let total_work = span_end.saturating_sub(span_start);
    if total_work == 0 || observations.is_empty() {
        return Vec::new();
    }
    info!(rng = rng_name, threads, lower, upper, "brute forcing for seed");
    let started = Instant::now();
    let completed = AtomicBool::new(false);
    let progress: Vec<AtomicU64> = (0..threads).map(|_| AtomicU64::new(0)).collect();
    let labor = divide_labor(total_work, threads as u64);
    let mut answers = Vec::new();
    thread::scope(|scope| {
        let completed = &completed;
        let progress = &progress;
        let mut handles = Vec::with_capacity(threads);
        let mut start = span_start;
        for (id, &share) in labor.iter().enumerate() {
            let end = start + share;
            let slot = &progress[id];
            handles.push(scope.spawn(move || {
                brute_force(
                    observations,
                    rng_name,
                    start,
                    end,
                    depth,
                    minimum_confidence,
                    completed,
                    slot,
                )
            }));
            start = end;
        }
        scope.spawn(move || report_progress(completed, progress, total_work));
        for handle in handles {
            answers.extend(handle.join().expect("brute force worker panicked"));
        }
        completed.store(true, Ordering::Relaxed);
    });
    info!(
        elapsed = %utils::format_elapsed_time(started.elapsed()),
        candidates = answers.len(),
        "seed search finished"
    );
    answers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rngs;

    fn sample(rng_name: &str, seed: u32, depth: usize) -> Vec<u32> {
        let mut g = rngs::from_name(rng_name).expect("known name");
        g.seed(seed);
        (0..depth).map(|_| g.random()).collect()
    }

    #[test]
    fn labor_is_split_evenly_with_remainder_up_front() {
        for (work, workers) in [(100u64, 7u64), (10, 3), (0, 5), (5, 8), (4_294_967_296, 3)] {
            let labor = divide_labor(work, workers);
            assert_eq!(labor.len(), workers as usize);
            assert_eq!(labor.iter().sum::<u64>(), work);
            let max = *labor.iter().max().unwrap();
            let min = *labor.iter().min().unwrap();
            assert!(max - min <= 1);
            assert!(labor.windows(2).all(|pair| pair[0] >= pair[1]));
        }
    }

    #[test]
    fn brute_force_recovers_glibc_seed() {
        let observations = sample("glibc-rand", 1234, 10);
        let answers = find_seed(&observations, "glibc-rand", 4, 100.0, 0, 10_000, 10);
        assert!(answers.contains(&Answer {
            seed: 1234,
            confidence: 100.0
        }));
    }

    #[test]
    fn sparse_observations_match_as_subsequence() {
        let stream = sample("glibc-rand", 1234, 10);
        let observations = vec![stream[0], stream[2], stream[5], stream[9]];
        let answers = find_seed(&observations, "glibc-rand", 4, 100.0, 0, 10_000, 10);
        assert!(answers.contains(&Answer {
            seed: 1234,
            confidence: 100.0
        }));
    }

    #[test]
    fn shallow_depth_cannot_fake_a_perfect_match() {
        let stream = sample("glibc-rand", 1234, 20);
        let observations = stream[15..].to_vec();
        let answers = find_seed(&observations, "glibc-rand", 2, 100.0, 0, 10_000, 5);
        assert!(!answers.iter().any(|answer| answer.seed == 1234));
    }

    #[test]
    fn thread_count_does_not_change_the_answer_set() {
        let observations = sample("glibc-rand", 4321, 12);
        let mut single = find_seed(&observations, "glibc-rand", 1, 100.0, 0, 10_000, 12);
        let mut multi = find_seed(&observations, "glibc-rand", 4, 100.0, 0, 10_000, 12);
        single.sort_by_key(|answer| answer.seed);
        multi.sort_by_key(|answer| answer.seed);
        assert_eq!(single, multi);
    }

    #[test]
    fn empty_result_when_nothing_matches() {
        let observations = vec![1, 2, 3, 4];
        let answers = find_seed(&observations, "glibc-rand", 2, 100.0, 0, 1_000, 5);
        assert!(answers.is_empty());
    }
}
