//! Task selection, evaluation and multi-component calibration

pub mod calibration;
pub mod evaluation;
pub mod qmatrix;
pub mod selector;

pub use calibration::{
    allocate_weights, composite_difficulty, success_probability, update_abilities,
    CalibrationUpdate, MirtModel,
};
pub use evaluation::{
    classify_error, evaluate_task, normalize_answer, partial_credit, ComponentEvaluations,
    ErrorKind, TargetEvaluation,
};
pub use qmatrix::{baseline_weights, ComponentWeights};
pub use selector::{
    allowed_task_types, contextual_difficulty, select_format, select_modality,
    select_task_type, build_task, VARIETY_WINDOW,
};
