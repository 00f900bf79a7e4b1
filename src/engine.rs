//! Engine facade
//!
//! Owns the item catalog and per-learner state (profiles, mastery
//! records, recent-response windows) keyed by id, and wires the
//! per-response pipeline in its canonical order: evaluate, update the
//! FSRS card, update abilities, recompute the mastery stage, append to
//! the response log. Stage recomputation must come after the FSRS and
//! accuracy updates because its thresholds read both.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::fsrs::{FsrsParams, FsrsScheduler, Rating};
use crate::algorithms::irt::{estimate_theta_eap, estimate_theta_mle, Observation, ThetaEstimate};
use crate::algorithms::mastery::{next_stage, recommended_cue_level};
use crate::algorithms::quadrature::QuadratureTable;
use crate::algorithms::queue::{build_queue, compose_session, QueueEntry};
use crate::bottleneck::{analyze_bottleneck, BottleneckReport};
use crate::config::EngineConfig;
use crate::error::{GlossaError, Result};
use crate::models::{
    ComponentKind, CueLevel, GradedResponse, LanguageFamily, LearnableItem, LearnerProfile,
    MasteryRecord, Response, TaskSpec, TaskType,
};
use crate::tasks::calibration::{update_abilities, CalibrationTarget, CalibrationUpdate};
use crate::tasks::evaluation::{evaluate_task, ComponentEvaluations};
use crate::tasks::selector::build_task;
use crate::transfer::TransferProfile;

/// Everything that changed as a result of one response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub rating: Rating,
    pub interval_days: u32,
    pub next_review: DateTime<Utc>,
    pub calibration: CalibrationUpdate,
    pub stage_before: u8,
    pub stage_after: u8,
    /// Scaffolding recommendation for the next presentation
    pub next_cue_level: CueLevel,
}

/// The adaptive learning engine.
///
/// Purely computational: every time-reading operation takes `now`
/// explicitly, and no method performs I/O. Learners are independent
/// arenas; callers may shard by learner id.
pub struct Engine {
    config: EngineConfig,
    scheduler: FsrsScheduler,
    /// Target language family, for transfer lookups
    l2: LanguageFamily,
    items: HashMap<String, LearnableItem>,
    profiles: HashMap<String, LearnerProfile>,
    mastery: HashMap<(String, String), MasteryRecord>,
    responses: HashMap<String, VecDeque<GradedResponse>>,
    /// Last flagged bottleneck per learner, consumed by priority
    bottlenecks: HashMap<String, ComponentKind>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_l2(config, LanguageFamily::Germanic)
    }

    /// Build an engine for a target language in the given family.
    pub fn with_l2(config: EngineConfig, l2: LanguageFamily) -> Result<Self> {
        config.validate()?;
        let scheduler = FsrsScheduler::new(FsrsParams::from_config(&config.scheduler));
        Ok(Self {
            config,
            scheduler,
            l2,
            items: HashMap::new(),
            profiles: HashMap::new(),
            mastery: HashMap::new(),
            responses: HashMap::new(),
            bottlenecks: HashMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ingest or replace a catalog item. Items failing parameter
    /// validation are rejected and the catalog is left untouched.
    pub fn upsert_item(&mut self, item: LearnableItem) -> Result<()> {
        item.validate()?;
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    pub fn item(&self, item_id: &str) -> Option<&LearnableItem> {
        self.items.get(item_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Create a learner profile. A fresh profile starts at theta 0
    /// with wide standard errors.
    pub fn create_profile(
        &mut self,
        learner_id: Option<String>,
        l1: Option<LanguageFamily>,
    ) -> LearnerProfile {
        let profile = LearnerProfile::new(learner_id, l1);
        self.profiles
            .insert(profile.learner_id.clone(), profile.clone());
        profile
    }

    pub fn profile(&self, learner_id: &str) -> Option<&LearnerProfile> {
        self.profiles.get(learner_id)
    }

    pub fn mastery(&self, learner_id: &str, item_id: &str) -> Option<&MasteryRecord> {
        self.mastery
            .get(&(learner_id.to_string(), item_id.to_string()))
    }

    /// Apply one single-item response through the full pipeline.
    pub fn apply_response(
        &mut self,
        learner_id: &str,
        response: &Response,
        now: DateTime<Utc>,
    ) -> Result<ApplyOutcome> {
        let item = self
            .items
            .get(&response.item_id)
            .cloned()
            .ok_or_else(|| GlossaError::UnknownItem(response.item_id.clone()))?;
        if !self.profiles.contains_key(learner_id) {
            return Err(GlossaError::UnknownLearner(learner_id.to_string()));
        }

        // Evaluate: partial credit for the item's component, from the
        // supplied per-component scores or the binary correct flag
        let credit = response
            .scores
            .get(item.component)
            .unwrap_or(if response.correct { 1.0 } else { 0.0 });

        let target = CalibrationTarget {
            component: item.component,
            weight: 1.0,
            discrimination: item.irt.discrimination,
            difficulty: item.irt.difficulty,
            credit,
        };
        self.apply_graded_target(
            learner_id,
            &item,
            response.correct,
            response.cue_level,
            response.response_time_ms,
            &[target],
            TaskType::RecallFree,
            now,
        )
    }

    /// Apply a full task response: grade the answers, then run every
    /// target item through the pipeline with its Q-matrix weight.
    pub fn apply_task_response(
        &mut self,
        learner_id: &str,
        task: &TaskSpec,
        answers: &[String],
        cue_level: CueLevel,
        response_time_ms: u64,
        now: DateTime<Utc>,
    ) -> Result<(ComponentEvaluations, Vec<ApplyOutcome>)> {
        task.validate()?;
        if !self.profiles.contains_key(learner_id) {
            return Err(GlossaError::UnknownLearner(learner_id.to_string()));
        }
        let evaluation = evaluate_task(task, answers);

        let mut outcomes = Vec::with_capacity(task.targets.len());
        for (target, graded) in task.targets.iter().zip(evaluation.targets.iter()) {
            let item = self
                .items
                .get(&target.item_id)
                .cloned()
                .ok_or_else(|| GlossaError::UnknownItem(target.item_id.clone()))?;
            let calibration_target = CalibrationTarget {
                component: target.component,
                weight: target.weight,
                discrimination: item.irt.discrimination,
                difficulty: item.irt.difficulty,
                credit: graded.credit,
            };
            let outcome = self.apply_graded_target(
                learner_id,
                &item,
                graded.correct,
                cue_level,
                response_time_ms,
                &[calibration_target],
                task.task_type,
                now,
            )?;
            outcomes.push(outcome);
        }
        Ok((evaluation, outcomes))
    }

    /// Shared per-item pipeline: FSRS, abilities, stage, response log.
    #[allow(clippy::too_many_arguments)]
    fn apply_graded_target(
        &mut self,
        learner_id: &str,
        item: &LearnableItem,
        correct: bool,
        cue_level: CueLevel,
        response_time_ms: u64,
        targets: &[CalibrationTarget],
        task_type: TaskType,
        now: DateTime<Utc>,
    ) -> Result<ApplyOutcome> {
        let key = (learner_id.to_string(), item.id.clone());
        let mut record = self
            .mastery
            .remove(&key)
            .unwrap_or_else(|| MasteryRecord::new(learner_id.to_string(), item.id.clone()));
        let stage_before = record.stage;

        // FSRS scheduling from the derived rating
        let rating = Rating::derive(correct, cue_level, response_time_ms);
        let review = self.scheduler.review(&record.card, rating, now);
        record.card = review.card.clone();
        record.next_review = Some(review.next_review);

        // Ability updates
        let profile = self
            .profiles
            .get_mut(learner_id)
            .ok_or_else(|| GlossaError::UnknownLearner(learner_id.to_string()))?;
        let calibration = update_abilities(profile, targets);

        // Accuracy, streaks and the streak-gated stage transition
        record.record_attempt(correct, cue_level.is_cued());
        record.stage = next_stage(&record, &self.config.stages);
        let stage_after = record.stage;
        if stage_after != stage_before {
            debug!(
                item = %item.id,
                stage_before,
                stage_after,
                "mastery stage transition"
            );
        }
        let next_cue_level = recommended_cue_level(&record);
        self.mastery.insert(key, record);

        // Response window for bottleneck analysis; one same-day
        // session bucket per calendar date
        let window = self.responses.entry(learner_id.to_string()).or_default();
        window.push_back(GradedResponse {
            component: item.component,
            correct,
            task_type,
            timestamp: now,
            session_id: Some(now.date_naive().to_string()),
        });
        while window.len() > self.config.response_window {
            window.pop_front();
        }

        Ok(ApplyOutcome {
            rating,
            interval_days: review.interval_days,
            next_review: review.next_review,
            calibration,
            stage_before,
            stage_after,
            next_cue_level,
        })
    }

    /// Rank the whole catalog for a learner.
    pub fn build_queue(&self, learner_id: &str, now: DateTime<Utc>) -> Result<Vec<QueueEntry>> {
        let profile = self
            .profiles
            .get(learner_id)
            .ok_or_else(|| GlossaError::UnknownLearner(learner_id.to_string()))?;

        let items: Vec<LearnableItem> = self.items.values().cloned().collect();
        let mastery: HashMap<String, MasteryRecord> = self
            .mastery
            .iter()
            .filter(|((learner, _), _)| learner == learner_id)
            .map(|((_, item_id), record)| (item_id.clone(), record.clone()))
            .collect();
        let transfer = TransferProfile::new(profile.l1, self.l2);
        // The profile's own weight recipe wins over the engine default
        let priority = crate::config::PriorityConfig {
            weights: profile.priority_weights,
            ..self.config.priority.clone()
        };

        Ok(build_queue(
            &items,
            &mastery,
            profile.level(),
            &transfer,
            self.bottlenecks.get(learner_id).copied(),
            now,
            &priority,
        ))
    }

    /// Compose a study session from the ranked queue.
    pub fn build_session(&self, learner_id: &str, now: DateTime<Utc>) -> Result<Vec<QueueEntry>> {
        let queue = self.build_queue(learner_id, now)?;
        Ok(compose_session(&queue, &self.config.queue))
    }

    /// Select the next task for an item, honoring the learner's stage
    /// and recent task-type history.
    pub fn select_task(
        &self,
        learner_id: &str,
        item_id: &str,
        history: &[TaskType],
    ) -> Result<TaskSpec> {
        let item = self
            .items
            .get(item_id)
            .ok_or_else(|| GlossaError::UnknownItem(item_id.to_string()))?;
        let record = self.mastery(learner_id, item_id);
        Ok(build_task(item, record, history))
    }

    /// Grade a task response without applying any state changes.
    pub fn evaluate(&self, task: &TaskSpec, answers: &[String]) -> ComponentEvaluations {
        evaluate_task(task, answers)
    }

    /// Estimate ability from scored observations: maximum likelihood
    /// when the response pattern supports it, otherwise EAP with the
    /// configured quadrature rule. Never fails; extreme patterns pull
    /// toward the prior instead of diverging.
    pub fn estimate_ability(
        &self,
        observations: &[Observation],
        prior_mean: f64,
        prior_sd: f64,
    ) -> ThetaEstimate {
        match estimate_theta_mle(observations, prior_mean) {
            Ok(estimate) => estimate,
            Err(error) => {
                debug!(%error, "MLE unavailable, falling back to EAP");
                let table = QuadratureTable::of_size(self.config.quadrature_nodes);
                estimate_theta_eap(observations, prior_mean, prior_sd, table)
            }
        }
    }

    /// Analyze the learner's recent responses and remember the flagged
    /// bottleneck for subsequent queue builds.
    pub fn analyze_bottleneck(&mut self, learner_id: &str) -> Result<BottleneckReport> {
        if !self.profiles.contains_key(learner_id) {
            return Err(GlossaError::UnknownLearner(learner_id.to_string()));
        }
        let window = self.responses.get(learner_id);
        let responses: Vec<GradedResponse> = window
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default();
        let report = analyze_bottleneck(&responses, &self.config.bottleneck);
        match report.primary {
            Some(component) => {
                self.bottlenecks.insert(learner_id.to_string(), component);
            }
            None => {
                self.bottlenecks.remove(learner_id);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureVector, IrtParams};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    fn catalog_item(id: &str, component: ComponentKind) -> LearnableItem {
        let mut item = LearnableItem::new(
            id.to_string(),
            component,
            IrtParams::new(1.0, 0.0),
            FeatureVector {
                frequency: 0.5,
                ..Default::default()
            },
            t0(),
        );
        item.id = id.to_string();
        item
    }

    fn correct_response(item_id: &str) -> Response {
        Response::new(
            "task".to_string(),
            item_id.to_string(),
            true,
            1500,
            CueLevel::None,
            t0(),
        )
    }

    #[test]
    fn test_upsert_rejects_invalid_item() {
        let mut engine = engine();
        let mut item = catalog_item("bad", ComponentKind::Lexical);
        item.irt.discrimination = 0.0;
        assert!(matches!(
            engine.upsert_item(item),
            Err(GlossaError::InvalidItem { .. })
        ));
        assert_eq!(engine.item_count(), 0);
    }

    #[test]
    fn test_new_card_correct_response_pipeline() {
        let mut engine = engine();
        engine.upsert_item(catalog_item("w1", ComponentKind::Lexical)).unwrap();
        let profile = engine.create_profile(Some("ana".to_string()), None);
        assert_eq!(profile.theta_global, 0.0);

        let outcome = engine
            .apply_response("ana", &correct_response("w1"), t0())
            .unwrap();

        // Fast cue-free success on a new card
        assert_eq!(outcome.rating, Rating::Easy);
        assert!(outcome.next_review > t0());
        assert!(outcome.calibration.global_delta > 0.0);
        assert!(outcome.calibration.global_delta <= 0.5);

        let record = engine.mastery("ana", "w1").unwrap();
        assert!(record.card.stability > 0.0);
        assert_eq!(record.exposures, 1);
        let profile = engine.profile("ana").unwrap();
        assert!(profile.abilities.lexical.theta > 0.0);
    }

    #[test]
    fn test_unknown_item_and_learner_errors() {
        let mut engine = engine();
        engine.create_profile(Some("ana".to_string()), None);
        assert!(matches!(
            engine.apply_response("ana", &correct_response("ghost"), t0()),
            Err(GlossaError::UnknownItem(_))
        ));
        engine.upsert_item(catalog_item("w1", ComponentKind::Lexical)).unwrap();
        assert!(matches!(
            engine.apply_response("bob", &correct_response("w1"), t0()),
            Err(GlossaError::UnknownLearner(_))
        ));
    }

    #[test]
    fn test_exposure_counts_accumulate() {
        let mut engine = engine();
        engine.upsert_item(catalog_item("w1", ComponentKind::Lexical)).unwrap();
        engine.create_profile(Some("ana".to_string()), None);
        engine.apply_response("ana", &correct_response("w1"), t0()).unwrap();
        engine.apply_response("ana", &correct_response("w1"), t0()).unwrap();
        assert_eq!(engine.mastery("ana", "w1").unwrap().exposures, 2);
    }

    #[test]
    fn test_queue_requires_known_learner() {
        let engine = engine();
        assert!(engine.build_queue("nobody", t0()).is_err());
    }

    #[test]
    fn test_queue_and_session() {
        let mut engine = engine();
        for i in 0..5 {
            engine
                .upsert_item(catalog_item(&format!("w{}", i), ComponentKind::Lexical))
                .unwrap();
        }
        engine.create_profile(Some("ana".to_string()), None);
        let queue = engine.build_queue("ana", t0()).unwrap();
        assert_eq!(queue.len(), 5);
        let session = engine.build_session("ana", t0()).unwrap();
        assert!(!session.is_empty());
    }

    #[test]
    fn test_select_task_for_new_learner_is_receptive() {
        let mut engine = engine();
        engine.upsert_item(catalog_item("w1", ComponentKind::Lexical)).unwrap();
        engine.create_profile(Some("ana".to_string()), None);
        let task = engine.select_task("ana", "w1", &[]).unwrap();
        assert_eq!(task.task_type.minimum_stage(), 0);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn test_estimate_ability_falls_back_on_extreme_pattern() {
        let engine = engine();
        let observations: Vec<Observation> = (0..5)
            .map(|_| Observation {
                params: IrtParams::new(1.0, 0.0),
                correct: true,
            })
            .collect();
        // All-correct has no MLE maximum; the estimate must still be
        // finite and above the prior mean
        let estimate = engine.estimate_ability(&observations, 0.0, 1.0);
        assert!(estimate.theta.is_finite());
        assert!(estimate.theta > 0.0);
        assert!(estimate.se > 0.0);
    }

    #[test]
    fn test_bottleneck_feeds_queue_boost() {
        let mut engine = engine();
        engine
            .upsert_item(catalog_item("phon", ComponentKind::Phonological))
            .unwrap();
        engine
            .upsert_item(catalog_item("lex", ComponentKind::Lexical))
            .unwrap();
        engine.create_profile(Some("ana".to_string()), None);

        // Fail phonology and lexis in the same sessions, repeatedly
        for _ in 0..12 {
            let mut response = correct_response("phon");
            response.correct = false;
            engine.apply_response("ana", &response, t0()).unwrap();
            let mut response = correct_response("lex");
            response.correct = false;
            engine.apply_response("ana", &response, t0()).unwrap();
        }
        let report = engine.analyze_bottleneck("ana").unwrap();
        assert_eq!(report.primary, Some(ComponentKind::Phonological));

        let queue = engine.build_queue("ana", t0()).unwrap();
        let phon = queue.iter().find(|e| e.item_id == "phon").unwrap();
        let lex = queue.iter().find(|e| e.item_id == "lex").unwrap();
        assert!(phon.priority > lex.priority);
    }
}
