//! Engine configuration
//!
//! All tunable knobs recognized by the engine, grouped by layer. Every
//! section has literal defaults matching the published recipes; a config
//! is validated once at engine construction and treated as immutable
//! afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{GlossaError, Result};

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Spaced repetition scheduling
    pub scheduler: SchedulerConfig,
    /// Priority weighting
    pub priority: PriorityConfig,
    /// Mastery stage thresholds
    pub stages: StageConfig,
    /// Bottleneck detection
    pub bottleneck: BottleneckConfig,
    /// Queue / session composition
    pub queue: QueueConfig,
    /// Number of Gauss-Hermite quadrature nodes for EAP (5, 11, 21 or 41)
    pub quadrature_nodes: usize,
    /// How many recent responses to retain per learner
    pub response_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            priority: PriorityConfig::default(),
            stages: StageConfig::default(),
            bottleneck: BottleneckConfig::default(),
            queue: QueueConfig::default(),
            quadrature_nodes: 21,
            response_window: 100,
        }
    }
}

impl EngineConfig {
    /// Validate all sections, returning the first violation found.
    pub fn validate(&self) -> Result<()> {
        let r = self.scheduler.request_retention;
        if !(r > 0.0 && r < 1.0) {
            return Err(GlossaError::InvalidConfig(format!(
                "request_retention must be in (0, 1), got {}",
                r
            )));
        }
        if self.scheduler.maximum_interval_days < 1 {
            return Err(GlossaError::InvalidConfig(
                "maximum_interval_days must be at least 1".to_string(),
            ));
        }
        if !matches!(self.quadrature_nodes, 5 | 11 | 21 | 41) {
            return Err(GlossaError::InvalidConfig(format!(
                "quadrature_nodes must be one of 5, 11, 21, 41, got {}",
                self.quadrature_nodes
            )));
        }
        if !(0.0..=1.0).contains(&self.bottleneck.error_rate_threshold) {
            return Err(GlossaError::InvalidConfig(
                "bottleneck.error_rate_threshold must be in [0, 1]".to_string(),
            ));
        }
        if self.bottleneck.min_responses == 0 {
            return Err(GlossaError::InvalidConfig(
                "bottleneck.min_responses must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.queue.due_fraction) {
            return Err(GlossaError::InvalidConfig(
                "queue.due_fraction must be in [0, 1]".to_string(),
            ));
        }
        if self.response_window < self.bottleneck.min_responses {
            return Err(GlossaError::InvalidConfig(
                "response_window must hold at least bottleneck.min_responses entries".to_string(),
            ));
        }
        self.stages.validate()?;
        Ok(())
    }
}

/// FSRS scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Target recall probability at review time (0.0 - 1.0 exclusive)
    pub request_retention: f64,
    /// Upper bound on any scheduled interval, in days
    pub maximum_interval_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            request_retention: 0.9,
            maximum_interval_days: 36500, // 100 years
        }
    }
}

/// Weights for the seven feature-vector components of base priority.
///
/// The defaults sum to 0.72 so urgency and bottleneck boosts have
/// headroom before the final clamp to [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriorityWeights {
    pub frequency: f64,
    pub relational: f64,
    pub domain: f64,
    pub morphological: f64,
    pub phonological: f64,
    pub syntactic: f64,
    pub pragmatic: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            frequency: 0.18,
            relational: 0.14,
            domain: 0.14,
            morphological: 0.09,
            phonological: 0.09,
            syntactic: 0.08,
            pragmatic: 0.08,
        }
    }
}

/// Priority engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Base weights used at intermediate level
    pub weights: PriorityWeights,
    /// Multiplier applied to the urgency term
    pub urgency_weight: f64,
    /// Additive boost for items in the flagged bottleneck component
    pub bottleneck_boost: f64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            weights: PriorityWeights::default(),
            urgency_weight: 0.18,
            bottleneck_boost: 0.10,
        }
    }
}

/// Thresholds for one mastery stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StageThreshold {
    /// Minimum cue-assisted accuracy, if required
    pub cue_assisted: Option<f64>,
    /// Minimum cue-free accuracy, if required
    pub cue_free: Option<f64>,
    /// Minimum FSRS stability in days, if required
    pub stability: Option<f64>,
    /// Maximum scaffolding gap (cue-assisted minus cue-free), if required
    pub max_gap: Option<f64>,
}

/// Mastery stage machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Entry thresholds for stages 1 through 4
    pub thresholds: [StageThreshold; 4],
    /// Consecutive correct responses required to advance a stage
    pub advance_streak: u32,
    /// Consecutive incorrect responses required to regress a stage
    pub regress_streak: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            thresholds: [
                // Stage 1: recognition with cues
                StageThreshold {
                    cue_assisted: Some(0.5),
                    cue_free: None,
                    stability: None,
                    max_gap: None,
                },
                // Stage 2: cue-free recall holding for at least a day
                StageThreshold {
                    cue_assisted: None,
                    cue_free: Some(0.6),
                    stability: Some(1.0),
                    max_gap: None,
                },
                // Stage 3: reliable recall across a week
                StageThreshold {
                    cue_assisted: None,
                    cue_free: Some(0.75),
                    stability: Some(7.0),
                    max_gap: None,
                },
                // Stage 4: durable mastery, scaffolding gap closed
                StageThreshold {
                    cue_assisted: None,
                    cue_free: Some(0.9),
                    stability: Some(30.0),
                    max_gap: Some(0.1),
                },
            ],
            advance_streak: 3,
            regress_streak: 3,
        }
    }
}

impl StageConfig {
    fn validate(&self) -> Result<()> {
        // Cue-free thresholds must be monotone across stages 2-4
        let mut prev = 0.0;
        for t in &self.thresholds {
            if let Some(cf) = t.cue_free {
                if cf < prev {
                    return Err(GlossaError::InvalidConfig(
                        "stage cue-free thresholds must be non-decreasing".to_string(),
                    ));
                }
                prev = cf;
            }
        }
        if self.advance_streak == 0 || self.regress_streak == 0 {
            return Err(GlossaError::InvalidConfig(
                "stage streak requirements must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bottleneck analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleneckConfig {
    /// Minimum responses before analysis produces a primary bottleneck
    pub min_responses: usize,
    /// Error rate at or above which a component is considered struggling
    pub error_rate_threshold: f64,
}

impl Default for BottleneckConfig {
    fn default() -> Self {
        Self {
            min_responses: 20,
            error_rate_threshold: 0.3,
        }
    }
}

/// Queue building configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Fraction of a session reserved for due items (the rest is fresh material)
    pub due_fraction: f64,
    /// Default number of items composed into a session
    pub session_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            due_fraction: 0.7,
            session_size: 20,
        }
    }
}
