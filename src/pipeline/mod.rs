//! Training pipeline abstractions
//!
//! This module provides:
//! - The episode loop driving any [`Learner`] in any [`Environment`]
//! - Greedy rollouts of learned policies
//! - Observers recording progress, metrics and learning curves

pub mod observers;
pub mod training;

pub use observers::{
    CurvePoint, JsonlObserver, LearningCurveObserver, MetricsObserver, MetricsSummary,
    ProgressObserver,
};
pub use training::{
    Rollout, TrainingConfig, TrainingMetadata, TrainingPipeline, TrainingResult, rollout,
};

pub use crate::ports::{Environment, Learner, Observer};
