//! Per-learner, per-item mastery state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// FSRS card lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    New,
    Learning,
    Review,
    Relearning,
}

/// FSRS memory card (stability, difficulty and review bookkeeping)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsrsCard {
    /// Item difficulty on the FSRS 1-10 scale
    pub difficulty: f64,
    /// Memory stability in days; the interval at which recall
    /// probability decays to the requested retention
    pub stability: f64,
    pub last_review: Option<DateTime<Utc>>,
    pub reps: u32,
    pub lapses: u32,
    pub state: CardState,
}

impl Default for FsrsCard {
    fn default() -> Self {
        Self {
            difficulty: 5.0,
            stability: 0.0,
            last_review: None,
            reps: 0,
            lapses: 0,
            state: CardState::New,
        }
    }
}

impl FsrsCard {
    pub fn is_new(&self) -> bool {
        self.reps == 0
    }
}

/// Mastery record for one (learner, item) pair.
///
/// Created at first encounter with stage 0 and mutated on every
/// response; never deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub learner_id: String,
    pub item_id: String,
    /// Mastery stage 0-4
    pub stage: u8,
    pub card: FsrsCard,
    /// Running accuracy over cue-free presentations
    pub cue_free_accuracy: f64,
    /// Running accuracy over cue-assisted presentations
    pub cue_assisted_accuracy: f64,
    pub cue_free_attempts: u32,
    pub cue_assisted_attempts: u32,
    /// Total presentations of this item
    pub exposures: u32,
    pub consecutive_correct: u32,
    pub consecutive_incorrect: u32,
    /// Derived from the FSRS card after each review
    pub next_review: Option<DateTime<Utc>>,
}

impl MasteryRecord {
    pub fn new(learner_id: String, item_id: String) -> Self {
        Self {
            learner_id,
            item_id,
            stage: 0,
            card: FsrsCard::default(),
            cue_free_accuracy: 0.0,
            cue_assisted_accuracy: 0.0,
            cue_free_attempts: 0,
            cue_assisted_attempts: 0,
            exposures: 0,
            consecutive_correct: 0,
            consecutive_incorrect: 0,
            next_review: None,
        }
    }

    /// Scaffolding gap: how much better the learner does with cues
    /// than without. Never negative.
    pub fn scaffolding_gap(&self) -> f64 {
        (self.cue_assisted_accuracy - self.cue_free_accuracy).max(0.0)
    }

    /// Fold one response into the running accuracies and streaks.
    /// `cued` marks whether any cue was shown for the presentation.
    pub fn record_attempt(&mut self, correct: bool, cued: bool) {
        let score = if correct { 1.0 } else { 0.0 };
        if cued {
            self.cue_assisted_attempts += 1;
            let n = self.cue_assisted_attempts as f64;
            self.cue_assisted_accuracy += (score - self.cue_assisted_accuracy) / n;
        } else {
            self.cue_free_attempts += 1;
            let n = self.cue_free_attempts as f64;
            self.cue_free_accuracy += (score - self.cue_free_accuracy) / n;
        }
        self.exposures += 1;
        if correct {
            self.consecutive_correct += 1;
            self.consecutive_incorrect = 0;
        } else {
            self.consecutive_incorrect += 1;
            self.consecutive_correct = 0;
        }
    }
}
