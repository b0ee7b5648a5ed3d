//! Core infrastructure: errors, configuration, and validation.

pub mod config;
pub mod errors;
pub mod validation;

pub use config::{
    ConfigFormat, ConfigLoader, ExpansionRatios, FilterBoosts, FilterBoundsTable,
    ImportanceWeights, PipelineConfig, TextRefineRatios, ZoneBounds, ZoneThresholds,
};
pub use errors::{ProcessingStage, SplitError, SplitResult};
