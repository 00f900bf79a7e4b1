//! Study queue building and session composition
//!
//! Scores every eligible item, sorts by final score, and composes
//! sessions from a configurable mix of due reviews and fresh material.
//! Queue building never mutates its inputs and is fully deterministic;
//! the optional presentation picker takes an explicit seed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::algorithms::priority::{effective_priority, PriorityBreakdown};
use crate::config::{PriorityConfig, QueueConfig};
use crate::models::{ComponentKind, LearnableItem, LearnerLevel, MasteryRecord};
use crate::transfer::TransferProfile;

/// One scored entry in the study queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub item_id: String,
    /// Effective priority in [0, 1]
    pub priority: f64,
    /// Raw urgency in [0, 3]
    pub urgency: f64,
    /// priority * (1 + urgency); the sort key
    pub final_score: f64,
    /// True when the item has never been reviewed
    pub fresh: bool,
}

impl QueueEntry {
    fn from_breakdown(item_id: String, breakdown: &PriorityBreakdown, fresh: bool) -> Self {
        Self {
            item_id,
            priority: breakdown.score,
            urgency: breakdown.urgency,
            final_score: breakdown.score * (1.0 + breakdown.urgency),
            fresh,
        }
    }
}

/// Score and rank every item for a learner.
///
/// The sort is descending by final score with item id as the
/// tie-break, so two runs over the same inputs produce the same order.
#[allow(clippy::too_many_arguments)]
pub fn build_queue(
    items: &[LearnableItem],
    mastery: &HashMap<String, MasteryRecord>,
    level: LearnerLevel,
    transfer: &TransferProfile,
    bottleneck: Option<ComponentKind>,
    now: DateTime<Utc>,
    config: &PriorityConfig,
) -> Vec<QueueEntry> {
    let mut entries: Vec<QueueEntry> = items
        .iter()
        .map(|item| {
            let record = mastery.get(&item.id);
            let breakdown = effective_priority(
                item,
                record,
                level,
                transfer.gain(item.component),
                bottleneck,
                now,
                config,
            );
            let fresh = record.map(|r| r.card.is_new()).unwrap_or(true);
            QueueEntry::from_breakdown(item.id.clone(), &breakdown, fresh)
        })
        .collect();

    entries.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    entries
}

/// Compose a session from a ranked queue: the configured fraction of
/// slots go to due reviews, the remainder to fresh items. When either
/// pool runs short the other fills in, preserving queue order.
pub fn compose_session(queue: &[QueueEntry], config: &QueueConfig) -> Vec<QueueEntry> {
    let size = config.session_size.min(queue.len());
    let due_slots = (size as f64 * config.due_fraction).round() as usize;

    let due: Vec<&QueueEntry> = queue
        .iter()
        .filter(|e| !e.fresh && e.urgency > 0.0)
        .collect();
    let fresh: Vec<&QueueEntry> = queue.iter().filter(|e| e.fresh).collect();

    let mut session: Vec<QueueEntry> = Vec::with_capacity(size);
    session.extend(due.iter().take(due_slots).map(|e| (*e).clone()));
    session.extend(
        fresh
            .iter()
            .take(size - session.len())
            .map(|e| (*e).clone()),
    );
    // Fill remaining slots from whichever pool still has material
    if session.len() < size {
        for entry in queue {
            if session.len() >= size {
                break;
            }
            if !session.iter().any(|e| e.item_id == entry.item_id) {
                session.push(entry.clone());
            }
        }
    }
    session
}

/// Weighted presentation picker over the top of the queue.
///
/// With randomness 0 it always takes the head; higher randomness
/// widens the candidate window and flattens the exponential-decay
/// weights. A fixed seed makes the pick reproducible.
pub struct SessionPicker {
    randomness: f32,
    seed: u64,
}

impl SessionPicker {
    pub fn new(randomness: f32, seed: u64) -> Self {
        Self {
            randomness: randomness.clamp(0.0, 1.0),
            seed,
        }
    }

    /// Pick the next entry to present.
    pub fn pick<'a>(&self, entries: &'a [QueueEntry]) -> Option<&'a QueueEntry> {
        if entries.is_empty() {
            return None;
        }
        if self.randomness <= 0.05 {
            return entries.first();
        }

        let window = ((entries.len() as f32) * self.randomness).ceil() as usize;
        let window = window.clamp(1, entries.len());

        // Exponential decay keeps the pick biased toward the head
        let decay = 0.55 + (1.0 - self.randomness as f64) * 0.35;
        let weights: Vec<f64> = (0..window).map(|i| decay.powi(i as i32)).collect();
        let total: f64 = weights.iter().sum();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut roll = rng.gen_range(0.0..total);
        for (index, weight) in weights.iter().enumerate() {
            if roll < *weight {
                return entries.get(index);
            }
            roll -= weight;
        }
        entries.first()
    }
}
