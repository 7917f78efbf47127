//! Arrival-rate estimation and paced release of batched comments.
//!
//! Sources deliver comments in bursts (one batch per poll response). The
//! pacer spreads each batch evenly over the recent average interval between
//! batches so comments trickle in instead of landing all at once.

use crate::model::RawComment;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::info;

/// Number of intervals the estimator averages over.
pub const RATE_WINDOW: usize = 5;

/// Rolling average of the last [`RATE_WINDOW`] inter-batch intervals.
///
/// Zero intervals are never recorded. Until something is recorded the
/// average falls back to the configured default period.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    window: [Duration; RATE_WINDOW],
    cursor: usize,
    default_period: Duration,
}

impl RateEstimator {
    /// Empty estimator falling back to `default_period`.
    pub fn new(default_period: Duration) -> Self {
        Self {
            window: [Duration::ZERO; RATE_WINDOW],
            cursor: 0,
            default_period,
        }
    }

    /// Record one interval, overwriting the oldest slot.
    pub fn record(&mut self, interval: Duration) {
        if interval.is_zero() {
            return;
        }
        self.window[self.cursor] = interval;
        self.cursor = (self.cursor + 1) % RATE_WINDOW;
    }

    /// Mean of the recorded intervals, or the default period if none.
    pub fn average(&self) -> Duration {
        let recorded: Vec<Duration> = self.window.iter().copied().filter(|d| !d.is_zero()).collect();
        match u32::try_from(recorded.len()) {
            Ok(0) | Err(_) => self.default_period,
            Ok(count) => recorded.iter().sum::<Duration>() / count,
        }
    }

    /// Fallback period.
    pub fn default_period(&self) -> Duration {
        self.default_period
    }
}

/// Measured throughput of one ingested batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSample {
    /// Comments in the batch divided by the average interval.
    pub comments_per_sec: f64,
    /// Comments in the batch.
    pub batch_len: usize,
    /// Average interval the batch is spread over.
    #[serde(skip)]
    pub period: Duration,
}

/// Schedules batched comments for evenly spaced release.
#[derive(Debug)]
pub struct Pacer {
    estimator: RateEstimator,
    queue: VecDeque<(Instant, RawComment)>,
    last_batch: Option<Instant>,
    next_slot: Option<Instant>,
    latest: Option<RateSample>,
}

impl Pacer {
    /// Pacer whose estimator falls back to `default_period`.
    pub fn new(default_period: Duration) -> Self {
        Self {
            estimator: RateEstimator::new(default_period),
            queue: VecDeque::new(),
            last_batch: None,
            next_slot: None,
            latest: None,
        }
    }

    /// Queue `batch`, which arrived at `now`.
    ///
    /// For a live source the interval since the previous batch is recorded;
    /// replayed input has no meaningful arrival times, so the default period
    /// stands in. Empty batches update the estimate but schedule nothing.
    pub fn ingest(&mut self, batch: Vec<RawComment>, now: Instant, live: bool) -> RateSample {
        let observed = self.last_batch.replace(now).map(|t| now.duration_since(t));
        let interval = match (live, observed) {
            (true, Some(elapsed)) => elapsed,
            _ => self.estimator.default_period(),
        };
        self.estimator.record(interval);

        let period = self.estimator.average();
        let batch_len = batch.len();
        let comments_per_sec = if period.is_zero() {
            0.0
        } else {
            batch_len as f64 / period.as_secs_f64()
        };
        let sample = RateSample {
            comments_per_sec,
            batch_len,
            period,
        };

        if batch_len > 0 {
            let spacing = period / u32::try_from(batch_len).unwrap_or(u32::MAX);
            let mut slot = self.next_slot.map_or(now, |next| next.max(now));
            for comment in batch {
                self.queue.push_back((slot, comment));
                slot += spacing;
            }
            self.next_slot = Some(slot);
            info!(
                comments = batch_len,
                comments_per_sec,
                period_ms = period.as_millis() as u64,
                "scheduled batch"
            );
        }

        self.latest = Some(sample);
        sample
    }

    /// Pop every comment whose release time has come, in order.
    pub fn due(&mut self, now: Instant) -> Vec<RawComment> {
        let mut released = Vec::new();
        while self.queue.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, comment)) = self.queue.pop_front() {
                released.push(comment);
            }
        }
        released
    }

    /// Comments still waiting for their slot.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Sample from the most recent batch.
    pub fn latest(&self) -> Option<RateSample> {
        self.latest
    }
}
