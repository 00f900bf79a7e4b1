//! FSRS (Free Spaced Repetition Scheduler) implementation
//!
//! Parameter-level scheduler over the published 17-weight FSRS-4.5
//! vector. Stability is the interval at which predicted recall decays
//! to the requested retention; difficulty drifts toward a
//! rating-dependent target with mean reversion.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::models::{CardState, CueLevel, FsrsCard};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MIN_STABILITY: f64 = 0.1;

/// Rating for a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    fn value(&self) -> i32 {
        *self as i32
    }

    /// Derive a rating from a raw graded response when the caller does
    /// not supply one: failures rate Again, cued successes Hard, slow
    /// cue-free successes Good, everything else Easy.
    pub fn derive(correct: bool, cue_level: CueLevel, response_time_ms: u64) -> Self {
        if !correct {
            Self::Again
        } else if cue_level.is_cued() {
            Self::Hard
        } else if response_time_ms > 5000 {
            Self::Good
        } else {
            Self::Easy
        }
    }
}

/// FSRS parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsrsParams {
    /// Target recall probability at review time
    pub request_retention: f64,
    /// Upper bound on scheduled intervals, in days
    pub maximum_interval_days: u32,
    /// The 17-weight FSRS-4.5 parameter vector
    pub w: [f64; 17],
}

impl Default for FsrsParams {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval_days: 36500, // 100 years
            w: [
                0.4, 0.6, 2.4, 5.8, // w0-w3: initial stability per rating
                4.93, 0.94, // w4-w5: initial difficulty
                0.86, 0.01, // w6-w7: difficulty drift and mean reversion
                1.49, 0.14, 0.94, // w8-w10: recall stability growth
                2.18, 0.05, 0.34, 1.26, // w11-w14: post-lapse stability
                0.29, 2.61, // w15-w16: hard penalty, easy bonus
            ],
        }
    }
}

impl FsrsParams {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            request_retention: config.request_retention,
            maximum_interval_days: config.maximum_interval_days,
            ..Self::default()
        }
    }
}

/// Outcome of scheduling one review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub card: FsrsCard,
    /// Recall probability at the moment of the review
    pub retrievability: f64,
    /// Days until the next review
    pub interval_days: u32,
    pub next_review: DateTime<Utc>,
}

/// FSRS scheduler
#[derive(Debug, Clone)]
pub struct FsrsScheduler {
    params: FsrsParams,
}

impl Default for FsrsScheduler {
    fn default() -> Self {
        Self::new(FsrsParams::default())
    }
}

impl FsrsScheduler {
    pub fn new(params: FsrsParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FsrsParams {
        &self.params
    }

    /// Predicted recall probability at `now`.
    ///
    /// A card that has never been reviewed has no memory trace yet and
    /// reports 0 by convention, as does a zero-stability card.
    pub fn retrievability(&self, card: &FsrsCard, now: DateTime<Utc>) -> f64 {
        let last = match card.last_review {
            Some(last) => last,
            None => return 0.0,
        };
        if card.stability <= 0.0 {
            return 0.0;
        }
        let elapsed = elapsed_days(last, now);
        (self.params.request_retention.ln() * elapsed / card.stability).exp()
    }

    /// Interval at which recall decays to the requested retention,
    /// rounded to whole days and clamped to [1, maximum_interval].
    pub fn next_interval(&self, stability: f64) -> u32 {
        let raw = stability * self.params.request_retention.ln() / 0.9_f64.ln();
        (raw.round() as i64).clamp(1, self.params.maximum_interval_days as i64) as u32
    }

    /// Apply one rated review to a card.
    pub fn review(&self, card: &FsrsCard, rating: Rating, now: DateTime<Utc>) -> ReviewOutcome {
        let retrievability = self.retrievability(card, now);
        let w = &self.params.w;

        let mut next = card.clone();
        if card.is_new() {
            next.stability = initial_stability(w, rating);
            next.difficulty = initial_difficulty(w, rating);
            next.state = match rating {
                Rating::Again | Rating::Hard => CardState::Learning,
                Rating::Good | Rating::Easy => CardState::Review,
            };
        } else {
            next.difficulty = next_difficulty(w, card.difficulty, rating);
            if rating == Rating::Again {
                next.stability = forget_stability(w, card.difficulty, card.stability, retrievability);
                next.state = CardState::Relearning;
            } else {
                next.stability =
                    recall_stability(w, card.difficulty, card.stability, retrievability, rating);
                next.state = CardState::Review;
            }
        }
        if rating == Rating::Again {
            next.lapses += 1;
        }
        next.reps += 1;
        next.last_review = Some(now);

        let interval_days = self.next_interval(next.stability);
        ReviewOutcome {
            card: next,
            retrievability,
            interval_days,
            next_review: now + Duration::days(interval_days as i64),
        }
    }
}

fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0)
}

fn initial_stability(w: &[f64; 17], rating: Rating) -> f64 {
    w[(rating.value() - 1) as usize].max(MIN_STABILITY)
}

fn initial_difficulty(w: &[f64; 17], rating: Rating) -> f64 {
    (w[4] - (rating.value() - 3) as f64 * w[5]).clamp(1.0, 10.0)
}

fn next_difficulty(w: &[f64; 17], difficulty: f64, rating: Rating) -> f64 {
    let drifted = difficulty - w[6] * (rating.value() - 3) as f64;
    // Mean reversion toward the initial difficulty of a Good rating
    let target = w[4] - w[5];
    (w[7] * target + (1.0 - w[7]) * drifted).clamp(1.0, 10.0)
}

fn recall_stability(w: &[f64; 17], difficulty: f64, stability: f64, r: f64, rating: Rating) -> f64 {
    let hard_penalty = if rating == Rating::Hard { w[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { w[16] } else { 1.0 };
    let growth = w[8].exp()
        * (11.0 - difficulty)
        * stability.powf(-w[9])
        * ((w[10] * (1.0 - r)).exp_m1())
        * hard_penalty
        * easy_bonus;
    (stability * (1.0 + growth)).max(MIN_STABILITY)
}

fn forget_stability(w: &[f64; 17], difficulty: f64, stability: f64, r: f64) -> f64 {
    let s = w[11]
        * difficulty.powf(-w[12])
        * ((stability + 1.0).powf(w[13]) - 1.0)
        * (w[14] * (1.0 - r)).exp();
    s.clamp(MIN_STABILITY, stability)
}
