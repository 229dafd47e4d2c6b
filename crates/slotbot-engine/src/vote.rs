//! Stabilization by voting: turn a flickering slot list into one
//! trustworthy snapshot.
//!
//! The slot container can re-render several times after a click — loading
//! placeholder, first data, corrected data. Instead of trusting the first
//! or last render, the extraction is sampled repeatedly and each distinct
//! ordered tuple of times collects votes; the mode wins. When no tuple
//! reaches the vote threshold the longest sample wins instead: an
//! undercount is worse than carrying one spurious extra value.

use std::collections::HashMap;
use std::time::Duration;

use slotbot_config::SiteMarkers;
use slotbot_protocols::EngineError;

use crate::probe::text;
use crate::site::SitePage;

/// One voting pass configuration.
#[derive(Debug, Clone, Copy)]
pub struct VoteParams {
    pub tries: usize,
    pub interval: Duration,
    pub min_votes: usize,
}

impl VoteParams {
    /// Main pass.
    pub fn main() -> Self {
        Self {
            tries: 26,
            interval: Duration::from_millis(200),
            min_votes: 2,
        }
    }

    /// Short confirmation pass after an initial OK result, to catch
    /// last-moment corrections.
    pub fn confirm() -> Self {
        Self {
            tries: 10,
            interval: Duration::from_millis(180),
            min_votes: 1,
        }
    }

    /// Single pass after the full-reload fallback.
    pub fn fallback() -> Self {
        Self {
            tries: 28,
            interval: Duration::from_millis(200),
            min_votes: 1,
        }
    }
}

/// Sample the slot extraction `params.tries` times and elect a winner.
///
/// Samples taken while the container shows a server-error state are
/// skipped entirely — they are noise, not votes. Returns an empty vector
/// when nothing non-empty was ever observed.
pub async fn sample_times(
    page: &dyn SitePage,
    markers: &SiteMarkers,
    params: VoteParams,
) -> Result<Vec<String>, EngineError> {
    let mut samples: Vec<Vec<String>> = Vec::new();

    for _ in 0..params.tries {
        if !text::is_server_error(&page.slots_text().await?, markers) {
            let current = page.extract_times().await?;
            if !current.is_empty() {
                samples.push(current);
            }
        }
        tokio::time::sleep(params.interval).await;
    }

    Ok(elect(&samples, params.min_votes))
}

/// Pick the winning tuple: the most frequent one, ties broken by first
/// appearance; below `min_votes`, the longest sample observed.
pub fn elect(samples: &[Vec<String>], min_votes: usize) -> Vec<String> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<&[String], usize> = HashMap::new();
    for sample in samples {
        *counts.entry(sample.as_slice()).or_insert(0) += 1;
    }

    let mut best: &[String] = &samples[0];
    let mut best_votes = 0;
    for sample in samples {
        let votes = counts[sample.as_slice()];
        if votes > best_votes {
            best = sample;
            best_votes = votes;
        }
    }

    if best_votes < min_votes {
        best = samples
            .iter()
            .max_by_key(|s| s.len())
            .map(Vec::as_slice)
            .unwrap_or(best);
    }

    best.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn majority_tuple_wins() {
        let samples = vec![
            t(&["14:00", "15:00"]),
            t(&["14:00"]),
            t(&["14:00", "15:00"]),
            t(&["14:00", "15:00"]),
        ];
        assert_eq!(elect(&samples, 2), t(&["14:00", "15:00"]));
    }

    #[test]
    fn below_threshold_longest_sample_wins() {
        // All samples distinct: no tuple reaches two votes.
        let samples = vec![
            t(&["14:00"]),
            t(&["14:00", "15:00", "16:00"]),
            t(&["15:00", "16:00"]),
        ];
        assert_eq!(elect(&samples, 2), t(&["14:00", "15:00", "16:00"]));
    }

    #[test]
    fn min_votes_one_accepts_single_sample() {
        let samples = vec![t(&["9:30"])];
        assert_eq!(elect(&samples, 1), t(&["9:30"]));
    }

    #[test]
    fn tie_at_max_votes_prefers_first_seen() {
        let samples = vec![
            t(&["10:00"]),
            t(&["11:00"]),
            t(&["10:00"]),
            t(&["11:00"]),
        ];
        assert_eq!(elect(&samples, 2), t(&["10:00"]));
    }

    #[test]
    fn no_samples_elects_nothing() {
        assert!(elect(&[], 2).is_empty());
    }

    #[test]
    fn order_is_part_of_the_tuple_identity() {
        let samples = vec![
            t(&["14:00", "15:00"]),
            t(&["15:00", "14:00"]),
            t(&["14:00", "15:00"]),
        ];
        assert_eq!(elect(&samples, 2), t(&["14:00", "15:00"]));
    }
}
